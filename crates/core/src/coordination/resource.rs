// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The exclusive slot owned by a coordinator

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};

/// Resource state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Resource {
    /// Resource is available
    #[default]
    Free,
    /// Resource is held by an agent
    Busy { holder: AgentId },
}

impl Resource {
    /// Check if the resource is currently free
    pub fn is_free(&self) -> bool {
        matches!(self, Resource::Free)
    }

    /// Check if the resource is held by a specific agent
    pub fn is_held_by(&self, agent: &AgentId) -> bool {
        matches!(self, Resource::Busy { holder } if holder == agent)
    }

    /// Get the current holder, if any
    pub fn holder(&self) -> Option<&AgentId> {
        match self {
            Resource::Free => None,
            Resource::Busy { holder } => Some(holder),
        }
    }
}
