// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by coordination state machines

use crate::agent::{AgentId, AgentState};
use thiserror::Error;

/// Precondition violations surfaced to the caller.
///
/// Denial of a request while the resource is busy is not an error; it is
/// reported as `granted = false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinationError {
    #[error(
        "agent {agent} released '{resource}' but the holder is {current}",
        current = holder_label(.holder)
    )]
    InvalidRelease {
        resource: String,
        agent: AgentId,
        holder: Option<AgentId>,
    },
    #[error("agent {agent} already holds '{resource}'")]
    AlreadyHolding { resource: String, agent: AgentId },
    #[error("agent {agent} is already waiting for '{resource}' at position {position}")]
    AlreadyWaiting {
        resource: String,
        agent: AgentId,
        position: usize,
    },
    #[error("agent {agent} cannot {action} while {state}")]
    InvalidTransition {
        agent: AgentId,
        state: AgentState,
        action: &'static str,
    },
    #[error("agent {agent} is wired to coordinator '{actual}', expected '{expected}'")]
    WrongCoordinator {
        agent: AgentId,
        expected: String,
        actual: String,
    },
    #[error("agent not registered: {0}")]
    UnknownAgent(AgentId),
    #[error("agent already registered: {0}")]
    DuplicateAgent(AgentId),
    #[error("invariant violated on '{resource}': {detail}")]
    Invariant { resource: String, detail: String },
}

fn holder_label(holder: &Option<AgentId>) -> String {
    match holder {
        Some(h) => h.to_string(),
        None => "nobody".to_string(),
    }
}
