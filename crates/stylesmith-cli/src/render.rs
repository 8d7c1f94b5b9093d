//! Human-readable terminal output.

use std::fmt::Write;

use console::Style;
use stylesmith::{AnalysisReport, Severity, ValidationError};

fn heading(title: &str, count: usize) -> String {
    format!("{} ({})\n", Style::new().bold().apply_to(title), count)
}

pub fn finding(finding: &ValidationError) -> String {
    let label = match finding.severity {
        Severity::Error => Style::new().red().bold().apply_to("error"),
        Severity::Warning => Style::new().yellow().bold().apply_to("warning"),
    };
    format!(
        "{}: {} {}",
        label,
        finding.message,
        Style::new().dim().apply_to(format!("[{}]", finding.path))
    )
}

pub fn report(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let dim = Style::new().dim();

    if !report.warnings.is_empty() {
        out.push_str(&heading("Warnings", report.warnings.len()));
        for warning in &report.warnings {
            let _ = writeln!(out, "  {}", finding(warning));
        }
        out.push('\n');
    }

    out.push_str(&heading("Repeated patterns", report.candidates.len()));
    for candidate in &report.candidates {
        let declarations: Vec<String> = candidate.declarations.iter().map(|d| d.to_string()).collect();
        let selectors: Vec<&str> = candidate.occurrences.iter().map(|o| o.selector.as_str()).collect();
        let _ = writeln!(
            out,
            "  {:>3}×  {}\n        {}",
            candidate.frequency,
            declarations.join("; "),
            dim.apply_to(selectors.join(", "))
        );
    }
    out.push('\n');

    out.push_str(&heading("Clusters", report.clusters.len()));
    for cluster in &report.clusters {
        let shared: Vec<String> = cluster
            .shared_declarations()
            .iter()
            .map(|d| d.to_string())
            .collect();
        let _ = writeln!(
            out,
            "  cohesion {:.2}  members {}  frequency {}  {}",
            cluster.cohesion,
            cluster.members.len(),
            cluster.total_frequency(),
            dim.apply_to(format!("representative {}", cluster.representative.short()))
        );
        if !shared.is_empty() {
            let _ = writeln!(out, "        shared: {}", shared.join("; "));
        }
    }
    out.push('\n');

    out.push_str(&heading("Naming violations", report.naming_violations.len()));
    for violation in &report.naming_violations {
        let _ = writeln!(
            out,
            "  {} {} {}",
            Style::new().yellow().apply_to(&violation.class_name),
            dim.apply_to(format!("[{}]", violation.kind)),
            violation.message
        );
    }
    out.push('\n');

    let m = &report.metrics;
    let p = &report.performance;
    let _ = writeln!(out, "{}", Style::new().bold().apply_to("Metrics"));
    let _ = writeln!(
        out,
        "  declarations  {} ({} in clusters, {:.1}% duplicated)",
        m.total_declarations,
        m.covered_declarations,
        m.duplication_ratio * 100.0
    );
    let _ = writeln!(
        out,
        "  selectors     {} (about {} after extraction)",
        m.selector_count, m.estimated_selector_count
    );
    let _ = writeln!(
        out,
        "  specificity   avg {:.1}, max {}",
        m.average_specificity, m.max_specificity
    );
    let _ = writeln!(
        out,
        "  render cost   {} (longest chain {}, {} universal)",
        p.estimated_render_cost, p.longest_selector_chain, p.universal_selectors
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylesmith::StylePipeline;

    #[test]
    fn test_report_sections() {
        console::set_colors_enabled(false);
        let yaml = ".a:\n  color: red\n.b:\n  color: red\n.c__x__y:\n  margin: 0\n";
        let result = StylePipeline::default().run(yaml).unwrap();
        let text = report(&result.analysis.unwrap());

        assert!(text.contains("Repeated patterns (1)"));
        assert!(text.contains("color: red"));
        assert!(text.contains(".a, .b"));
        assert!(text.contains("Naming violations (1)"));
        assert!(text.contains("[multiple-elements]"));
        assert!(text.contains("selectors     3"));
    }

    #[test]
    fn test_finding_line() {
        console::set_colors_enabled(false);
        let finding_line = finding(&ValidationError::error(".a", "color", "'color' has an empty value"));
        assert_eq!(finding_line, "error: 'color' has an empty value [.a]");
    }
}
