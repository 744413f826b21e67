// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-threaded engine for a coordinator and its registered agents
//!
//! Every call runs to completion before returning: the coordinator mutates
//! its state, then the engine executes the returned effects in order. A
//! release that hands the resource off wakes exactly one agent within the
//! same call.

use crate::agent::{Agent, AgentId, AgentInput};
use crate::coordination::Coordinator;
use crate::effect::{Effect, Event};
use crate::error::CoordinationError;
use crate::events::{EventBus, EventPattern, EventReceiver, Subscription};
use std::collections::HashMap;
use tracing::{debug, info};

/// The engine owns one coordinator and the agents wired to it
pub struct Engine {
    coordinator: Coordinator,
    agents: HashMap<AgentId, Agent>,
    /// Registration order, for stable listings
    order: Vec<AgentId>,
    event_bus: EventBus,
}

impl Engine {
    pub fn new(coordinator: Coordinator) -> Self {
        Self {
            coordinator,
            agents: HashMap::new(),
            order: Vec::new(),
            event_bus: EventBus::new(),
        }
    }

    /// Publish on an existing bus instead of a private one
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = bus;
        self
    }

    /// Get the event bus for subscriptions
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Subscribe to events matching patterns
    pub fn subscribe(&self, id: &str, patterns: Vec<&str>, description: &str) -> EventReceiver {
        let subscription = Subscription::new(
            id,
            patterns.into_iter().map(EventPattern::new).collect(),
            description,
        );
        self.event_bus.subscribe(subscription)
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Registered agents in registration order
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.order.iter().filter_map(|id| self.agents.get(id))
    }

    /// Register an agent built against this engine's coordinator
    pub fn register(&mut self, agent: Agent) -> Result<(), CoordinationError> {
        if agent.coordinator != self.coordinator.name() {
            return Err(CoordinationError::WrongCoordinator {
                agent: agent.id,
                expected: self.coordinator.name().to_string(),
                actual: agent.coordinator,
            });
        }
        if self.agents.contains_key(&agent.id) {
            return Err(CoordinationError::DuplicateAgent(agent.id));
        }
        agent.ensure_can_register()?;

        debug!(agent = %agent.id, carrier = %agent.carrier, "agent registered");
        self.event_bus.publish(Event::AgentRegistered {
            agent: agent.id.0.clone(),
            carrier: agent.carrier.label().to_string(),
        });
        self.order.push(agent.id.clone());
        self.agents.insert(agent.id.clone(), agent);
        Ok(())
    }

    /// Request the resource for an agent; `false` means it was queued
    pub fn request(&mut self, id: &AgentId) -> Result<bool, CoordinationError> {
        self.get(id)?.ensure_can_request()?;

        let (granted, effects) = self.coordinator.request_access(id)?;
        let input = if granted {
            AgentInput::Granted
        } else {
            AgentInput::Denied
        };
        self.execute(effects)?;
        self.apply(id, input)?;
        Ok(granted)
    }

    pub fn consume(&mut self, id: &AgentId) -> Result<(), CoordinationError> {
        self.apply(id, AgentInput::Consumed)
    }

    /// Release the resource held by an agent, waking the next in line
    pub fn release(&mut self, id: &AgentId) -> Result<(), CoordinationError> {
        let agent = self.get(id)?;
        // Only the holder moves to done; anyone else is turned away below
        let released = if self.coordinator.holder() == Some(id) {
            Some(agent.transition(AgentInput::Released)?)
        } else {
            None
        };

        let effects = match self.coordinator.release_and_notify(id) {
            Ok(effects) => effects,
            Err(err) => {
                if let CoordinationError::InvalidRelease { holder, .. } = &err {
                    self.event_bus.publish(Event::ReleaseRejected {
                        resource: self.coordinator.name().to_string(),
                        agent: id.0.clone(),
                        holder: holder.as_ref().map(|h| h.0.clone()),
                    });
                }
                return Err(err);
            }
        };

        if let Some((agent, agent_effects)) = released {
            self.agents.insert(id.clone(), agent);
            self.execute(agent_effects)?;
        }
        self.execute(effects)
    }

    /// Consume and release in one step
    pub fn deliver(&mut self, id: &AgentId) -> Result<(), CoordinationError> {
        self.consume(id)?;
        self.release(id)
    }

    /// Return a finished agent to idle so it can request again
    pub fn reset(&mut self, id: &AgentId) -> Result<(), CoordinationError> {
        self.apply(id, AgentInput::Reset)
    }

    fn get(&self, id: &AgentId) -> Result<&Agent, CoordinationError> {
        self.agents
            .get(id)
            .ok_or_else(|| CoordinationError::UnknownAgent(id.clone()))
    }

    fn apply(&mut self, id: &AgentId, input: AgentInput) -> Result<(), CoordinationError> {
        let (agent, effects) = self.get(id)?.transition(input)?;
        self.agents.insert(id.clone(), agent);
        self.execute(effects)
    }

    fn execute(&mut self, effects: Vec<Effect>) -> Result<(), CoordinationError> {
        for effect in effects {
            match effect {
                Effect::Emit(event) => {
                    debug!(event = %event.name(), agent = %event.agent(), "event emitted");
                    self.event_bus.publish(event);
                }
                // Agents only emit events, so this recurses at most once
                Effect::Resume { agent } => {
                    info!(agent = %agent, resource = %self.coordinator.name(), "resuming agent");
                    self.apply(&agent, AgentInput::Resumed)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
