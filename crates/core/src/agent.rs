// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent state machine
//!
//! An agent is one independent requester of the coordinated resource. It
//! carries a carrier label for display only; every carrier follows the same
//! protocol.

use crate::coordination::Coordinator;
use crate::effect::{Effect, Event};
use crate::error::CoordinationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an agent
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        AgentId(s)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        AgentId(s.to_string())
    }
}

/// Descriptive identity of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Carrier {
    Ups,
    FedEx,
}

impl Carrier {
    pub const ALL: [Carrier; 2] = [Carrier::Ups, Carrier::FedEx];

    pub fn label(&self) -> &'static str {
        match self {
            Carrier::Ups => "UPS",
            Carrier::FedEx => "FedEx",
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle of a single use cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    /// No outstanding request
    Idle,
    /// Request denied, queued behind the holder
    Waiting,
    /// Request granted, resource in use
    Holding,
    /// Consumed and released
    Done,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentState::Idle => "idle",
            AgentState::Waiting => "waiting",
            AgentState::Holding => "holding",
            AgentState::Done => "done",
        };
        f.write_str(s)
    }
}

/// Inputs that drive agent transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentInput {
    /// The coordinator granted a request
    Granted,
    /// The coordinator queued a request
    Denied,
    /// The coordinator handed the resource over on release
    Resumed,
    /// The agent used the resource
    Consumed,
    /// The agent gave the resource back
    Released,
    /// Start a new use cycle
    Reset,
}

impl AgentInput {
    pub fn action(&self) -> &'static str {
        match self {
            AgentInput::Granted | AgentInput::Denied => "request",
            AgentInput::Resumed => "resume",
            AgentInput::Consumed => "consume",
            AgentInput::Released => "release",
            AgentInput::Reset => "reset",
        }
    }
}

/// A requester bound to one coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub carrier: Carrier,
    /// Name of the coordinator this agent was built against
    pub coordinator: String,
    pub state: AgentState,
}

impl Agent {
    pub fn new(id: impl Into<AgentId>, carrier: Carrier, coordinator: &Coordinator) -> Self {
        Self {
            id: id.into(),
            carrier,
            coordinator: coordinator.name().to_string(),
            state: AgentState::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == AgentState::Idle
    }

    pub fn is_waiting(&self) -> bool {
        self.state == AgentState::Waiting
    }

    pub fn is_holding(&self) -> bool {
        self.state == AgentState::Holding
    }

    pub fn is_done(&self) -> bool {
        self.state == AgentState::Done
    }

    /// Fail unless the agent may issue a fresh request
    pub fn ensure_can_request(&self) -> Result<(), CoordinationError> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(self.invalid("request"))
        }
    }

    /// Fail unless the agent is fresh enough to join a coordinator
    pub fn ensure_can_register(&self) -> Result<(), CoordinationError> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(self.invalid("register"))
        }
    }

    /// Pure state transition function
    pub fn transition(&self, input: AgentInput) -> Result<(Agent, Vec<Effect>), CoordinationError> {
        let mut agent = self.clone();
        let mut effects = Vec::new();

        agent.state = match (self.state, input) {
            (AgentState::Idle, AgentInput::Granted) => AgentState::Holding,
            // A waiting agent denied again keeps its place at the tail
            (AgentState::Idle | AgentState::Waiting, AgentInput::Denied) => AgentState::Waiting,
            (AgentState::Waiting, AgentInput::Resumed) => {
                effects.push(Effect::Emit(Event::AgentResumed {
                    agent: self.id.0.clone(),
                }));
                AgentState::Holding
            }
            (AgentState::Holding, AgentInput::Consumed) => {
                effects.push(Effect::Emit(Event::AgentConsumed {
                    agent: self.id.0.clone(),
                }));
                AgentState::Holding
            }
            (AgentState::Holding, AgentInput::Released) => AgentState::Done,
            (AgentState::Done, AgentInput::Reset) => {
                effects.push(Effect::Emit(Event::AgentReset {
                    agent: self.id.0.clone(),
                }));
                AgentState::Idle
            }
            _ => return Err(self.invalid(input.action())),
        };

        Ok((agent, effects))
    }

    fn invalid(&self, action: &'static str) -> CoordinationError {
        CoordinationError::InvalidTransition {
            agent: self.id.clone(),
            state: self.state,
            action,
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
