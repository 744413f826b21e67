// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator state machine
//!
//! Owns one exclusive [`Resource`] and the FIFO queue of agents waiting for
//! it. Both fields change together inside a single method call, so the
//! resource is never left free while agents are queued.

use super::resource::Resource;
use crate::agent::AgentId;
use crate::effect::{Effect, Event};
use crate::error::CoordinationError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info, warn};

/// Arbiter of one exclusive resource
#[derive(Clone, Debug)]
pub struct Coordinator {
    name: String,
    resource: Resource,
    queue: VecDeque<AgentId>,
}

/// Point-in-time view of a coordinator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorSnapshot {
    pub resource: String,
    pub holder: Option<AgentId>,
    pub queue: Vec<AgentId>,
}

impl Coordinator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource: Resource::Free,
            queue: VecDeque::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn holder(&self) -> Option<&AgentId> {
        self.resource.holder()
    }

    /// Waiting agents, head first
    pub fn queue(&self) -> impl Iterator<Item = &AgentId> {
        self.queue.iter()
    }

    /// 1-based queue position of a waiting agent
    pub fn position(&self, agent: &AgentId) -> Option<usize> {
        self.queue.iter().position(|a| a == agent).map(|i| i + 1)
    }

    pub fn is_waiting(&self, agent: &AgentId) -> bool {
        self.position(agent).is_some()
    }

    /// Grant the resource if free, otherwise queue the agent at the tail.
    ///
    /// Returns whether the request was granted. Requests from the current
    /// holder or from an agent already in the queue are rejected without
    /// touching state.
    pub fn request_access(
        &mut self,
        agent: &AgentId,
    ) -> Result<(bool, Vec<Effect>), CoordinationError> {
        if self.resource.is_held_by(agent) {
            return Err(CoordinationError::AlreadyHolding {
                resource: self.name.clone(),
                agent: agent.clone(),
            });
        }
        if let Some(position) = self.position(agent) {
            return Err(CoordinationError::AlreadyWaiting {
                resource: self.name.clone(),
                agent: agent.clone(),
                position,
            });
        }

        match &self.resource {
            Resource::Free => {
                self.resource = Resource::Busy {
                    holder: agent.clone(),
                };
                debug!(resource = %self.name, agent = %agent, "access granted");
                Ok((
                    true,
                    vec![Effect::Emit(Event::AccessGranted {
                        resource: self.name.clone(),
                        agent: agent.0.clone(),
                    })],
                ))
            }
            Resource::Busy { holder } => {
                let holder = holder.clone();
                self.queue.push_back(agent.clone());
                let position = self.queue.len();
                debug!(resource = %self.name, agent = %agent, %holder, position, "access denied, queued");
                Ok((
                    false,
                    vec![Effect::Emit(Event::AccessDenied {
                        resource: self.name.clone(),
                        agent: agent.0.clone(),
                        holder: holder.0,
                        position,
                    })],
                ))
            }
        }
    }

    /// Release the resource and hand it to the head of the queue.
    ///
    /// The head's request is re-issued on its behalf before returning, so a
    /// non-empty queue always ends with a new holder and an
    /// [`Effect::Resume`] for the host to deliver.
    pub fn release_and_notify(&mut self, agent: &AgentId) -> Result<Vec<Effect>, CoordinationError> {
        if !self.resource.is_held_by(agent) {
            let holder = self.resource.holder().cloned();
            warn!(resource = %self.name, agent = %agent, holder = ?holder, "release by non-holder rejected");
            return Err(CoordinationError::InvalidRelease {
                resource: self.name.clone(),
                agent: agent.clone(),
                holder,
            });
        }

        self.resource = Resource::Free;
        let mut effects = vec![Effect::Emit(Event::ResourceReleased {
            resource: self.name.clone(),
            agent: agent.0.clone(),
        })];

        if let Some(next) = self.queue.pop_front() {
            info!(resource = %self.name, from = %agent, to = %next, "handing off");
            effects.push(Effect::Emit(Event::HandOff {
                resource: self.name.clone(),
                from: agent.0.clone(),
                to: next.0.clone(),
            }));

            // Slot was freed above, so the head is granted here
            let (granted, grant_effects) = self.request_access(&next)?;
            effects.extend(grant_effects);
            if granted {
                effects.push(Effect::Resume { agent: next });
            }
        }

        Ok(effects)
    }

    pub fn snapshot(&self) -> CoordinatorSnapshot {
        CoordinatorSnapshot {
            resource: self.name.clone(),
            holder: self.resource.holder().cloned(),
            queue: self.queue.iter().cloned().collect(),
        }
    }

    /// Verify the resting-state invariants
    pub fn check_invariants(&self) -> Result<(), CoordinationError> {
        let violation = |detail: String| CoordinationError::Invariant {
            resource: self.name.clone(),
            detail,
        };

        if self.resource.is_free() && !self.queue.is_empty() {
            return Err(violation(format!(
                "free with {} queued agent(s)",
                self.queue.len()
            )));
        }
        if let Some(holder) = self.resource.holder() {
            if self.queue.contains(holder) {
                return Err(violation(format!("holder {} is also queued", holder)));
            }
        }
        for (i, agent) in self.queue.iter().enumerate() {
            if self.queue.iter().skip(i + 1).any(|a| a == agent) {
                return Err(violation(format!("{} queued more than once", agent)));
            }
        }
        Ok(())
    }
}

impl fmt::Display for CoordinatorSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.holder {
            Some(holder) => write!(f, "{}: busy (holder {})", self.resource, holder)?,
            None => write!(f, "{}: free", self.resource)?,
        }
        let queue: Vec<&str> = self.queue.iter().map(AgentId::as_str).collect();
        write!(f, ", queue [{}]", queue.join(", "))
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
