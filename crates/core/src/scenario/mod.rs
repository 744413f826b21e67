// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenarios: scripted request/consume/release sequences
//!
//! A scenario names a resource, declares agents, and lists steps. The
//! [`Runner`] replays it against a fresh [`Engine`](crate::engine::Engine)
//! and reports what happened at each step.

mod parser;
mod runner;

pub use parser::{Action, AgentDef, Scenario, Step};
pub use runner::{Report, Runner, StepOutcome, StepReport};

use crate::error::CoordinationError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or starting a scenario
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// TOML syntax error
    #[error("TOML syntax error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error reading file
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scenario declares no agents")]
    NoAgents,

    #[error("agent '{0}' declared more than once")]
    DuplicateAgent(String),

    #[error("step {step} references undeclared agent '{agent}'")]
    UnknownAgent { step: usize, agent: String },

    /// Agents could not be wired to the coordinator
    #[error("setup failed: {0}")]
    Setup(#[from] CoordinationError),
}
