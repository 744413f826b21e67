// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replays a scenario against a fresh engine

use super::parser::{Action, Scenario};
use super::ScenarioError;
use crate::agent::{Agent, AgentId};
use crate::coordination::{Coordinator, CoordinatorSnapshot};
use crate::effect::Event;
use crate::engine::Engine;
use crate::error::CoordinationError;
use crate::events::{EventBus, EventReceiver};
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

/// What a single step did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Request granted immediately
    Granted,
    /// Request denied, agent queued
    Queued,
    /// Consume, release, deliver or reset succeeded
    Completed,
    /// Precondition violated; state was left unchanged
    Rejected {
        #[serde(serialize_with = "serialize_error")]
        error: CoordinationError,
    },
}

fn serialize_error<S: Serializer>(error: &CoordinationError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// 1-based step number
    pub step: usize,
    pub agent: AgentId,
    pub action: Action,
    #[serde(flatten)]
    pub outcome: StepOutcome,
    /// Events emitted while the step ran, in order
    pub events: Vec<Event>,
}

/// Result of a full scenario run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub steps: Vec<StepReport>,
    pub agents: Vec<Agent>,
    pub snapshot: CoordinatorSnapshot,
}

impl Report {
    pub fn rejected(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Rejected { .. }))
    }

    /// All step events in order
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.steps.iter().flat_map(|s| s.events.iter())
    }
}

/// Runs scenarios, publishing every event on its bus as it happens
#[derive(Clone, Default)]
pub struct Runner {
    bus: EventBus,
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    /// Run every step. A rejected step is recorded and the run continues.
    pub fn run(&self, scenario: &Scenario) -> Result<Report, ScenarioError> {
        scenario.validate()?;

        let mut engine =
            Engine::new(Coordinator::new(scenario.resource.as_str())).with_event_bus(self.bus.clone());
        for def in &scenario.agents {
            let agent = Agent::new(def.name.as_str(), def.carrier, engine.coordinator());
            engine.register(agent)?;
        }
        let mut trace = engine.subscribe("scenario-runner", vec!["resource:**", "agent:**"], "scenario trace");

        let mut steps = Vec::with_capacity(scenario.steps.len());
        for (i, step) in scenario.steps.iter().enumerate() {
            let agent = AgentId::new(step.agent.as_str());
            let outcome = match execute(&mut engine, &agent, step.action) {
                Ok(outcome) => outcome,
                Err(error) => {
                    warn!(step = i + 1, %agent, action = %step.action, %error, "step rejected");
                    StepOutcome::Rejected { error }
                }
            };
            debug!(step = i + 1, %agent, action = %step.action, ?outcome, "step finished");

            steps.push(StepReport {
                step: i + 1,
                agent,
                action: step.action,
                outcome,
                events: drain(&mut trace),
            });
        }

        Ok(Report {
            steps,
            agents: engine.agents().cloned().collect(),
            snapshot: engine.coordinator().snapshot(),
        })
    }
}

fn execute(
    engine: &mut Engine,
    agent: &AgentId,
    action: Action,
) -> Result<StepOutcome, CoordinationError> {
    match action {
        Action::Request => Ok(if engine.request(agent)? {
            StepOutcome::Granted
        } else {
            StepOutcome::Queued
        }),
        Action::Consume => engine.consume(agent).map(|_| StepOutcome::Completed),
        Action::Release => engine.release(agent).map(|_| StepOutcome::Completed),
        Action::Deliver => engine.deliver(agent).map(|_| StepOutcome::Completed),
        Action::Reset => engine.reset(agent).map(|_| StepOutcome::Completed),
    }
}

fn drain(rx: &mut EventReceiver) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
