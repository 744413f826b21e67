// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator service for concurrently running agents
//!
//! A single tokio task owns the [`Coordinator`]; every request and release
//! is a message to that task, so the resource and its queue are mutated by
//! one writer only. Hand-off never calls into agent code: the service sends
//! a [`Notice`] on the woken agent's channel after its own state change is
//! complete, and the agent's task picks it up on its own schedule.

use super::coordinator::{Coordinator, CoordinatorSnapshot};
use crate::agent::{Agent, AgentId, AgentInput};
use crate::effect::{Effect, Event};
use crate::error::CoordinationError;
use crate::events::EventBus;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Coordination(#[from] CoordinationError),
    #[error("coordinator service has shut down")]
    Closed,
}

/// Messages delivered to a waiting agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The resource was handed to this agent
    Granted { resource: String },
}

type Reply<T> = oneshot::Sender<Result<T, CoordinationError>>;

enum Command {
    Register {
        agent: Agent,
        notices: mpsc::UnboundedSender<Notice>,
        reply: Reply<()>,
    },
    Request {
        agent: AgentId,
        reply: Reply<bool>,
    },
    Release {
        agent: AgentId,
        reply: Reply<()>,
    },
    Snapshot {
        reply: oneshot::Sender<CoordinatorSnapshot>,
    },
    Shutdown,
}

/// Actor that owns a coordinator
pub struct CoordinatorService {
    coordinator: Coordinator,
    notices: HashMap<AgentId, mpsc::UnboundedSender<Notice>>,
    bus: EventBus,
    rx: mpsc::UnboundedReceiver<Command>,
}

impl CoordinatorService {
    /// Start the service on the current tokio runtime.
    ///
    /// The join handle yields the coordinator once the service stops, either
    /// through [`ServiceHandle::shutdown`] or when every handle is dropped.
    pub fn spawn(coordinator: Coordinator, bus: EventBus) -> (ServiceHandle, JoinHandle<Coordinator>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = Self {
            coordinator,
            notices: HashMap::new(),
            bus: bus.clone(),
            rx,
        };
        let task = tokio::spawn(service.run());
        (ServiceHandle { tx, bus }, task)
    }

    async fn run(mut self) -> Coordinator {
        while let Some(command) = self.rx.recv().await {
            match command {
                Command::Register {
                    agent,
                    notices,
                    reply,
                } => {
                    let _ = reply.send(self.register(agent, notices));
                }
                Command::Request { agent, reply } => {
                    let _ = reply.send(self.request(&agent));
                }
                Command::Release { agent, reply } => {
                    let result = self.release(&agent);
                    let _ = reply.send(result);
                }
                Command::Snapshot { reply } => {
                    let _ = reply.send(self.coordinator.snapshot());
                }
                Command::Shutdown => break,
            }
        }
        debug!(resource = %self.coordinator.name(), "coordinator service stopped");
        self.coordinator
    }

    fn register(
        &mut self,
        agent: Agent,
        notices: mpsc::UnboundedSender<Notice>,
    ) -> Result<(), CoordinationError> {
        if agent.coordinator != self.coordinator.name() {
            return Err(CoordinationError::WrongCoordinator {
                agent: agent.id,
                expected: self.coordinator.name().to_string(),
                actual: agent.coordinator,
            });
        }
        if self.notices.contains_key(&agent.id) {
            return Err(CoordinationError::DuplicateAgent(agent.id));
        }
        agent.ensure_can_register()?;

        self.bus.publish(Event::AgentRegistered {
            agent: agent.id.0.clone(),
            carrier: agent.carrier.label().to_string(),
        });
        self.notices.insert(agent.id, notices);
        Ok(())
    }

    fn ensure_registered(&self, agent: &AgentId) -> Result<(), CoordinationError> {
        if self.notices.contains_key(agent) {
            Ok(())
        } else {
            Err(CoordinationError::UnknownAgent(agent.clone()))
        }
    }

    fn request(&mut self, agent: &AgentId) -> Result<bool, CoordinationError> {
        self.ensure_registered(agent)?;
        let (granted, effects) = self.coordinator.request_access(agent)?;
        self.execute(effects);
        Ok(granted)
    }

    fn release(&mut self, agent: &AgentId) -> Result<(), CoordinationError> {
        self.ensure_registered(agent)?;
        match self.coordinator.release_and_notify(agent) {
            Ok(effects) => {
                self.execute(effects);
                Ok(())
            }
            Err(err) => {
                if let CoordinationError::InvalidRelease { holder, .. } = &err {
                    self.bus.publish(Event::ReleaseRejected {
                        resource: self.coordinator.name().to_string(),
                        agent: agent.0.clone(),
                        holder: holder.as_ref().map(|h| h.0.clone()),
                    });
                }
                Err(err)
            }
        }
    }

    fn execute(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Emit(event) => self.bus.publish(event),
                Effect::Resume { agent } => {
                    let notice = Notice::Granted {
                        resource: self.coordinator.name().to_string(),
                    };
                    let delivered = self
                        .notices
                        .get(&agent)
                        .is_some_and(|tx| tx.send(notice).is_ok());
                    if !delivered {
                        warn!(resource = %self.coordinator.name(), %agent, "hand-off notice undeliverable");
                    }
                }
            }
        }
    }
}

/// Cloneable handle for talking to a running service
#[derive(Clone)]
pub struct ServiceHandle {
    tx: mpsc::UnboundedSender<Command>,
    bus: EventBus,
}

impl ServiceHandle {
    /// Register an agent and return the link its task drives
    pub async fn register(&self, agent: Agent) -> Result<AgentLink, ServiceError> {
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();
        let (reply, rx) = oneshot::channel();
        self.send(Command::Register {
            agent: agent.clone(),
            notices: notices_tx,
            reply,
        })?;
        rx.await.map_err(|_| ServiceError::Closed)??;

        Ok(AgentLink {
            agent,
            handle: self.clone(),
            notices: notices_rx,
        })
    }

    /// Ask for the resource; `false` means the agent was queued
    pub async fn request(&self, agent: &AgentId) -> Result<bool, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Request {
            agent: agent.clone(),
            reply,
        })?;
        Ok(rx.await.map_err(|_| ServiceError::Closed)??)
    }

    pub async fn release(&self, agent: &AgentId) -> Result<(), ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Release {
            agent: agent.clone(),
            reply,
        })?;
        Ok(rx.await.map_err(|_| ServiceError::Closed)??)
    }

    pub async fn snapshot(&self) -> Result<CoordinatorSnapshot, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply })?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    /// Stop the service after already queued commands are handled
    pub fn shutdown(&self) -> Result<(), ServiceError> {
        self.send(Command::Shutdown)
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    fn send(&self, command: Command) -> Result<(), ServiceError> {
        self.tx.send(command).map_err(|_| ServiceError::Closed)
    }
}

/// An agent's side of the service, owned by the agent's own task
pub struct AgentLink {
    agent: Agent,
    handle: ServiceHandle,
    notices: mpsc::UnboundedReceiver<Notice>,
}

impl AgentLink {
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Request the resource, waiting in the queue until it is handed over
    pub async fn acquire(&mut self) -> Result<(), ServiceError> {
        self.agent.ensure_can_request()?;
        let granted = self.agent.transition(AgentInput::Granted)?;
        let denied = self.agent.transition(AgentInput::Denied)?;

        if self.handle.request(&self.agent.id).await? {
            self.commit(granted);
            return Ok(());
        }
        self.commit(denied);

        match self.notices.recv().await {
            Some(Notice::Granted { .. }) => self.apply(AgentInput::Resumed),
            None => Err(ServiceError::Closed),
        }
    }

    pub fn consume(&mut self) -> Result<(), ServiceError> {
        self.apply(AgentInput::Consumed)
    }

    /// Release the resource; the link only moves to done once the
    /// coordinator has accepted the release
    pub async fn release(&mut self) -> Result<(), ServiceError> {
        let released = self.agent.transition(AgentInput::Released)?;
        self.handle.release(&self.agent.id).await?;
        self.commit(released);
        Ok(())
    }

    /// Start a new use cycle after a release
    pub fn reset(&mut self) -> Result<(), ServiceError> {
        self.apply(AgentInput::Reset)
    }

    fn apply(&mut self, input: AgentInput) -> Result<(), ServiceError> {
        let next = self.agent.transition(input)?;
        self.commit(next);
        Ok(())
    }

    fn commit(&mut self, (agent, effects): (Agent, Vec<Effect>)) {
        self.agent = agent;
        for effect in effects {
            if let Effect::Emit(event) = effect {
                self.handle.bus.publish(event);
            }
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
