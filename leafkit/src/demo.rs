//! Fixed-sample walkthrough of the three operations.
//!
//! Steps are independent: a failing step is reported and the next one runs.

use std::io::{self, Write};

use tracing::warn;

use crate::average::average_of_doubled_positives;
use crate::config::parse_flat_config;
use crate::credentials::format_credential_query;

pub const SAMPLE_VALUES: [i64; 5] = [1, 2, 3, -1, 4];
pub const SAMPLE_IDENTIFIER: &str = "admin";
pub const SAMPLE_SECRET: &str = "pass123";
pub const SAMPLE_CONFIG: &str = "key1=value1\nkey2=value2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoStep {
    Average,
    FlatConfig,
}

impl DemoStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemoStep::Average => "average",
            DemoStep::FlatConfig => "flat-config",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoReport {
    pub failed: Vec<DemoStep>,
}

impl DemoReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs the built-in samples and writes results to `out`.
pub fn run<W: Write>(out: &mut W) -> io::Result<DemoReport> {
    run_with(out, &SAMPLE_VALUES, SAMPLE_IDENTIFIER, SAMPLE_SECRET, SAMPLE_CONFIG)
}

/// Runs the walkthrough over caller-supplied inputs.
pub fn run_with<W: Write>(
    out: &mut W,
    values: &[i64],
    identifier: &str,
    secret: &str,
    config_blob: &str,
) -> io::Result<DemoReport> {
    let mut report = DemoReport::default();

    match average_of_doubled_positives(values) {
        Ok(avg) => writeln!(out, "Result: {avg:.6}")?,
        Err(err) => step_failed(out, &mut report, DemoStep::Average, &err)?,
    }

    writeln!(out, "{}", format_credential_query(identifier, secret))?;

    match parse_flat_config(config_blob) {
        Ok(config) => writeln!(out, "{config}")?,
        Err(err) => step_failed(out, &mut report, DemoStep::FlatConfig, &err)?,
    }

    Ok(report)
}

fn step_failed<W: Write>(
    out: &mut W,
    report: &mut DemoReport,
    step: DemoStep,
    err: &dyn std::error::Error,
) -> io::Result<()> {
    warn!(step = step.as_str(), error = %err, "demo step failed");
    report.failed.push(step);
    writeln!(out, "{} failed: {err}", step.as_str())
}
