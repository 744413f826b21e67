// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TOML scenario format
//!
//! ```toml
//! resource = "packing"
//!
//! [[agent]]
//! name = "ups"
//! carrier = "ups"
//!
//! [[step]]
//! agent = "ups"
//! action = "request"
//! ```

use super::ScenarioError;
use crate::agent::Carrier;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

fn default_resource() -> String {
    "packing".to_string()
}

/// A scripted run against one coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default = "default_resource")]
    pub resource: String,
    #[serde(default, rename = "agent")]
    pub agents: Vec<AgentDef>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentDef {
    pub name: String,
    pub carrier: Carrier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub agent: String,
    pub action: Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Request,
    Consume,
    Release,
    /// Consume then release
    Deliver,
    Reset,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Request => "request",
            Action::Consume => "consume",
            Action::Release => "release",
            Action::Deliver => "deliver",
            Action::Reset => "reset",
        };
        f.write_str(s)
    }
}

impl Scenario {
    /// Parse and validate a scenario from TOML content
    pub fn parse(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Parse and validate a scenario file
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScenarioError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Two carriers contending for the packing slot: UPS ships, FedEx is
    /// blocked, and UPS's delivery hands the slot to FedEx.
    pub fn reference() -> Self {
        let step = |agent: &str, action| Step {
            agent: agent.to_string(),
            action,
        };
        Self {
            resource: default_resource(),
            agents: vec![
                AgentDef {
                    name: "ups".to_string(),
                    carrier: Carrier::Ups,
                },
                AgentDef {
                    name: "fedex".to_string(),
                    carrier: Carrier::FedEx,
                },
            ],
            steps: vec![
                step("ups", Action::Request),
                step("fedex", Action::Request),
                step("ups", Action::Deliver),
            ],
        }
    }

    /// Check agent declarations and step references
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.agents.is_empty() {
            return Err(ScenarioError::NoAgents);
        }

        let mut names = HashSet::new();
        for agent in &self.agents {
            if !names.insert(agent.name.as_str()) {
                return Err(ScenarioError::DuplicateAgent(agent.name.clone()));
            }
        }

        for (i, step) in self.steps.iter().enumerate() {
            if !names.contains(step.agent.as_str()) {
                return Err(ScenarioError::UnknownAgent {
                    step: i + 1,
                    agent: step.agent.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
