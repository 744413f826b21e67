// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario commands

use crate::output::{self, OutputFormat};
use crate::render::Renderer;
use anyhow::Context;
use berth_core::{Report, Runner, Scenario, StepOutcome};
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args)]
pub struct RunArgs {
    /// Scenario file (TOML)
    pub path: PathBuf,
}

pub fn demo(format: OutputFormat) -> anyhow::Result<ExitCode> {
    execute(&Scenario::reference(), format)
}

pub fn run(args: RunArgs, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let scenario = Scenario::load(&args.path)
        .with_context(|| format!("failed to load scenario {}", args.path.display()))?;
    execute(&scenario, format)
}

/// Run a scenario and report it; rejected steps make the exit code non-zero
fn execute(scenario: &Scenario, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let report = Runner::new().run(scenario)?;

    match format {
        OutputFormat::Json => output::print_json(&report)?,
        OutputFormat::Text => print_text(&report),
    }

    if report.rejected().next().is_some() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_text(report: &Report) {
    let renderer = Renderer::new(report.agents.iter().map(|a| (&a.id, a.carrier)));

    for step in report.rejected() {
        if let StepOutcome::Rejected { error } = &step.outcome {
            eprintln!("step {} ({} {}) rejected: {}", step.step, step.agent, step.action, error);
        }
    }

    output::print_lines(
        report.events().filter_map(|e| renderer.line(e)),
        &report.snapshot,
    );
}
