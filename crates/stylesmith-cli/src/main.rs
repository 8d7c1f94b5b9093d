mod cli;
mod render;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use stylesmith::{
    parse_stylesheet_file, Compiler, PipelineResult, StylePipeline, StyleTree, ValidationError,
    Validator,
};

use cli::{Args, Command, Format, Tuning};

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // RUST_LOG wins; otherwise -v switches this crate's spans to debug
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if args.verbose {
        EnvFilter::new("stylesmith=debug")
    } else {
        EnvFilter::new("stylesmith=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    debug!("Logging initialized (verbose={})", args.verbose);

    match args.command {
        Command::Check { file } => check(&file),
        Command::Compile { file, output } => compile(&file, output.as_deref()),
        Command::Analyze {
            file,
            format,
            tuning,
        } => analyze(&file, format, &tuning),
    }
}

fn load(file: &Path) -> Result<StyleTree> {
    parse_stylesheet_file(file).with_context(|| format!("cannot load {}", file.display()))
}

fn print_findings(findings: &[ValidationError]) {
    for finding in findings {
        eprintln!("{}", render::finding(finding));
    }
}

fn check(file: &Path) -> Result<ExitCode> {
    let tree = load(file)?;
    let findings = Validator::new().validate(&tree);
    print_findings(&findings);

    let errors = findings.iter().filter(|f| f.is_error()).count();
    let warnings = findings.len() - errors;
    eprintln!(
        "{}: {} error(s), {} warning(s)",
        file.display(),
        errors,
        warnings
    );
    Ok(if errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn compile(file: &Path, output: Option<&Path>) -> Result<ExitCode> {
    let tree = load(file)?;
    let findings = Validator::new().validate(&tree);
    print_findings(&findings);
    if stylesmith::validate::has_errors(&findings) {
        return Ok(ExitCode::FAILURE);
    }

    let css = Compiler::new()
        .compile(&tree)
        .context("compilation failed")?
        .to_css();
    match output {
        Some(path) => std::fs::write(path, css)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => print!("{}", css),
    }
    Ok(ExitCode::SUCCESS)
}

fn analyze(file: &Path, format: Format, tuning: &Tuning) -> Result<ExitCode> {
    let pipeline = StylePipeline::builder()
        .options(tuning.options()?)
        .cache_capacity(tuning.cache_capacity)
        .build();
    let tree = load(file)?;
    let PipelineResult {
        validation,
        analysis,
        ..
    } = pipeline.run_tree(tree)?;

    let Some(report) = analysis else {
        print_findings(&validation);
        return Ok(ExitCode::FAILURE);
    };

    match format {
        Format::Text => print!("{}", render::report(&report)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&*report)?),
        Format::Yaml => print!("{}", serde_yaml::to_string(&*report)?),
    }
    Ok(ExitCode::SUCCESS)
}
