// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects and events for state machine orchestration

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};

/// Effects are side effects that state machines request from their host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Emit an event for other components to observe
    Emit(Event),
    /// Wake a queued agent that was just handed the resource
    Resume { agent: AgentId },
}

/// Events emitted by state machines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    // Resource events
    AccessGranted {
        resource: String,
        agent: String,
    },
    AccessDenied {
        resource: String,
        agent: String,
        holder: String,
        /// 1-based position in the wait queue
        position: usize,
    },
    ResourceReleased {
        resource: String,
        agent: String,
    },
    HandOff {
        resource: String,
        from: String,
        to: String,
    },
    ReleaseRejected {
        resource: String,
        agent: String,
        holder: Option<String>,
    },

    // Agent events
    AgentRegistered {
        agent: String,
        carrier: String,
    },
    AgentResumed {
        agent: String,
    },
    AgentConsumed {
        agent: String,
    },
    AgentReset {
        agent: String,
    },
}

impl Event {
    /// Routing name used by event patterns
    pub fn name(&self) -> String {
        match self {
            Event::AccessGranted { .. } => "resource:granted".to_string(),
            Event::AccessDenied { .. } => "resource:denied".to_string(),
            Event::ResourceReleased { .. } => "resource:released".to_string(),
            Event::HandOff { .. } => "resource:handoff".to_string(),
            Event::ReleaseRejected { .. } => "resource:rejected".to_string(),

            Event::AgentRegistered { .. } => "agent:registered".to_string(),
            Event::AgentResumed { .. } => "agent:resumed".to_string(),
            Event::AgentConsumed { .. } => "agent:consumed".to_string(),
            Event::AgentReset { .. } => "agent:reset".to_string(),
        }
    }

    /// The agent this event is about (the recipient, for hand-offs)
    pub fn agent(&self) -> &str {
        match self {
            Event::AccessGranted { agent, .. }
            | Event::AccessDenied { agent, .. }
            | Event::ResourceReleased { agent, .. }
            | Event::ReleaseRejected { agent, .. }
            | Event::AgentRegistered { agent, .. }
            | Event::AgentResumed { agent }
            | Event::AgentConsumed { agent }
            | Event::AgentReset { agent } => agent,
            Event::HandOff { to, .. } => to,
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
