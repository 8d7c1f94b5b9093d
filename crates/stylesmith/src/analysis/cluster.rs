//! Grouping of similar patterns.
//!
//! Each candidate is treated as a set of `property:value` tokens, and two
//! candidates are as similar as the Jaccard index of their token sets.
//! Clusters are built bottom-up with complete linkage: the similarity between
//! two clusters is that of their *least* similar pair of members, so every
//! pair inside a finished cluster is at least `minimum_cohesion` similar.

use std::collections::BTreeSet;

use serde::Serialize;

use super::detect::{NodeRef, PatternCandidate};
use super::options::AnalysisOptions;
use super::signature::Signature;
use crate::tree::Declaration;

/// A group of mutually similar patterns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Member patterns, in input order.
    pub members: Vec<PatternCandidate>,
    /// Lowest pairwise similarity between members (1.0 for one member).
    pub cohesion: f64,
    /// Signature of the most frequent member.
    pub representative: Signature,
}

impl Cluster {
    /// Combined frequency of all members.
    pub fn total_frequency(&self) -> usize {
        self.members.iter().map(|m| m.frequency).sum()
    }

    /// Declarations every member has, canonically ordered.
    pub fn shared_declarations(&self) -> Vec<Declaration> {
        let Some((first, rest)) = self.members.split_first() else {
            return Vec::new();
        };
        first
            .declarations
            .iter()
            .filter(|d| rest.iter().all(|m| m.declarations.contains(d)))
            .cloned()
            .collect()
    }

    /// Every node carrying one of the member patterns, deduplicated by path.
    pub fn occurrences(&self) -> Vec<&NodeRef> {
        let mut seen = BTreeSet::new();
        self.members
            .iter()
            .flat_map(|m| m.occurrences.iter())
            .filter(|o| seen.insert(&o.path))
            .collect()
    }
}

/// Complete-linkage agglomerative clustering.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterAnalyzer;

impl ClusterAnalyzer {
    /// Creates an analyzer.
    pub fn new() -> Self {
        Self
    }

    /// Clusters candidates.
    ///
    /// Output is ordered by cohesion, then combined frequency (both
    /// descending), then representative signature.
    pub fn cluster(&self, candidates: &[PatternCandidate], options: &AnalysisOptions) -> Vec<Cluster> {
        let minimum = options.minimum_cohesion();
        let tokens: Vec<BTreeSet<String>> = candidates.iter().map(token_set).collect();

        let n = candidates.len();
        let mut similarity = vec![vec![1.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let s = jaccard(&tokens[i], &tokens[j]);
                similarity[i][j] = s;
                similarity[j][i] = s;
            }
        }

        let link = |a: &[usize], b: &[usize]| -> f64 {
            a.iter()
                .flat_map(|&i| b.iter().map(move |&j| (i, j)))
                .map(|(i, j)| similarity[i][j])
                .fold(f64::INFINITY, f64::min)
        };

        let mut groups: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
        loop {
            let mut best: Option<(usize, usize, f64)> = None;
            for a in 0..groups.len() {
                for b in (a + 1)..groups.len() {
                    let score = link(&groups[a], &groups[b]);
                    if score < minimum {
                        continue;
                    }
                    if best.map_or(true, |(_, _, top)| score > top) {
                        best = Some((a, b, score));
                    }
                }
            }

            let Some((a, b, score)) = best else {
                break;
            };
            let absorbed = groups.remove(b);
            groups[a].extend(absorbed);
            groups[a].sort_unstable();
            tracing::trace!(into = a, from = b, linkage = score, "merged clusters");
        }

        let mut clusters: Vec<Cluster> = groups
            .into_iter()
            .filter_map(|members| {
                let cohesion = cohesion_of(&members, &similarity);
                let members: Vec<PatternCandidate> =
                    members.iter().map(|&i| candidates[i].clone()).collect();
                let representative = representative_of(&members)?;
                Some(Cluster {
                    members,
                    cohesion,
                    representative,
                })
            })
            .filter(|c| c.cohesion >= minimum)
            .filter(|c| c.members.len() > 1 || c.total_frequency() >= options.minimum_frequency())
            .collect();

        clusters.sort_by(|a, b| {
            b.cohesion
                .total_cmp(&a.cohesion)
                .then_with(|| b.total_frequency().cmp(&a.total_frequency()))
                .then_with(|| a.representative.cmp(&b.representative))
        });

        tracing::debug!(
            candidates = n,
            clusters = clusters.len(),
            "clustering done"
        );
        clusters
    }
}

fn token_set(candidate: &PatternCandidate) -> BTreeSet<String> {
    candidate
        .declarations
        .iter()
        .map(|d| format!("{}:{}", d.property, d.value))
        .collect()
}

/// Jaccard index; two empty sets are identical.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

fn cohesion_of(members: &[usize], similarity: &[Vec<f64>]) -> f64 {
    let mut cohesion = 1.0_f64;
    for (k, &i) in members.iter().enumerate() {
        for &j in &members[k + 1..] {
            cohesion = cohesion.min(similarity[i][j]);
        }
    }
    cohesion
}

fn representative_of(members: &[PatternCandidate]) -> Option<Signature> {
    members
        .iter()
        .min_by(|a, b| {
            b.frequency
                .cmp(&a.frequency)
                .then_with(|| a.signature.cmp(&b.signature))
        })
        .map(|m| m.signature.clone())
}
