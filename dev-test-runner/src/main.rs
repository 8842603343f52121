//! Fixture runner: derive every schema fixture and compare against the
//! recorded expectations.
//!
//! ```text
//! cargo run -p dev-test-runner -- --fixtures 'dev-test-runner/fixtures/**/*.json' --filter ref
//! ```
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use colored::Colorize;
use json_metatype::{derive, DeriveOptions, MetaType};
use rayon::prelude::*;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// derive meta-types for JSON Schema fixtures and check them
#[derive(Parser, Debug)]
struct CommandLineInterface {
    /// quoted glob pattern selecting fixture files
    #[arg(long, default_value = "dev-test-runner/fixtures/**/*.json")]
    fixtures: String,

    /// only run fixtures whose name matches this regex
    #[arg(long)]
    filter: Option<String>,

    /// print the narrowed meta-type of each fixture as well
    #[arg(long, default_value_t = false)]
    narrow: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Fixture {
    name: String,
    schema: Value,
    #[serde(default)]
    options: DeriveOptions,
    /// derived meta-type, before narrowing
    expected: Option<Expectation>,
    /// meta-type after `narrow()`
    narrowed: Option<Expectation>,
    /// substring of the expected error message
    error: Option<String>,
}

/// Either the rendered form (`"(1 | 2)"`) or the full serialized shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Expectation {
    Rendered(String),
    Shape(MetaType),
}

struct Outcome {
    name: String,
    path: PathBuf,
    failures: Vec<String>,
    report: Option<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Expectation {
    fn check(&self, label: &str, actual: &MetaType) -> Option<String> {
        let matches = match self {
            Expectation::Rendered(rendered) => actual.to_string() == *rendered,
            Expectation::Shape(shape) => actual == shape,
        };
        if matches {
            return None;
        }
        let wanted = match self {
            Expectation::Rendered(rendered) => rendered.clone(),
            Expectation::Shape(shape) => shape.to_string(),
        };
        Some(format!("{label}: expected `{wanted}`, got `{actual}`"))
    }
}

impl Fixture {
    fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("failed to read fixture {}", path.display()))?;
        json_metatype::path_de::from_slice_with_path(&bytes)
            .with_context(|| format!("failed to parse fixture {}", path.display()))
    }

    fn run(self, path: PathBuf, show_narrowed: bool) -> Outcome {
        let _span = tracing::debug_span!("fixture", name = %self.name).entered();
        let mut failures = Vec::new();
        let mut report = None;

        match (derive(&self.schema, &self.options), &self.error) {
            (Err(error), Some(wanted)) => {
                let message = error.to_string();
                if !message.contains(wanted.as_str()) {
                    failures.push(format!("error: expected `{wanted}` in `{message}`"));
                }
            }
            (Err(error), None) => failures.push(format!("unexpected error: {error}")),
            (Ok(actual), Some(wanted)) => {
                failures.push(format!("expected error `{wanted}`, derived `{actual}`"));
            }
            (Ok(actual), None) => {
                let narrowed = actual.narrow();
                tracing::debug!(derived = %actual, narrowed = %narrowed);
                failures.extend(self.expected.as_ref().and_then(|e| e.check("derived", &actual)));
                failures.extend(self.narrowed.as_ref().and_then(|e| e.check("narrowed", &narrowed)));
                if show_narrowed {
                    report = Some(narrowed.to_string());
                }
            }
        }

        Outcome { name: self.name, path, failures, report }
    }
}

impl CommandLineInterface {
    fn run(&self) -> anyhow::Result<bool> {
        let filter = self
            .filter
            .as_deref()
            .map(Regex::new)
            .transpose()
            .context("invalid --filter regex")?;

        let paths = resolve_fixture_paths(&self.fixtures)?;
        let mut fixtures = Vec::with_capacity(paths.len());
        for path in paths {
            let fixture = Fixture::load(&path)?;
            if filter.as_ref().is_none_or(|re| re.is_match(&fixture.name)) {
                fixtures.push((path, fixture));
            }
        }
        tracing::info!(count = fixtures.len(), "running fixtures");

        let mut outcomes: Vec<Outcome> = fixtures
            .into_par_iter()
            .map(|(path, fixture)| fixture.run(path, self.narrow))
            .collect();
        outcomes.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.name.cmp(&b.name)));

        let mut failed = 0usize;
        for outcome in &outcomes {
            if outcome.failures.is_empty() {
                println!("{} {}", "✓".green(), outcome.name);
            } else {
                failed += 1;
                println!("{} {} ({})", "✗".red(), outcome.name.bold(), outcome.path.display());
                for failure in &outcome.failures {
                    println!("    {}", failure.red());
                }
            }
            if let Some(report) = &outcome.report {
                println!("    {}", report.dimmed());
            }
        }

        let summary = format!("{} passed, {} failed", outcomes.len() - failed, failed);
        if failed == 0 {
            println!("{}", summary.green().bold());
        } else {
            println!("{}", summary.red().bold());
        }
        Ok(failed == 0)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let command_line_interface = CommandLineInterface::parse();
    if command_line_interface.run()? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_fixture_paths(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
        out.push(entry?);
    }
    if out.is_empty() {
        bail!("glob pattern matched no files: {pattern}");
    }
    out.sort();
    Ok(out)
}
