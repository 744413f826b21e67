// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! berth-core: exclusive resource coordination
//!
//! This crate provides:
//! - A pure `Coordinator` state machine arbitrating one exclusive resource with a FIFO wait queue
//! - `Agent` state machines that request, consume and release the resource
//! - A single-threaded `Engine` that executes effects, and an async `CoordinatorService` actor
//! - TOML scenarios for driving the engine end to end

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod id;

// State machines (order matters for dependencies)
pub mod effect;
pub mod agent;
pub mod coordination;

pub mod engine;
pub mod events;
pub mod scenario;

// Re-exports
pub use agent::{Agent, AgentId, AgentInput, AgentState, Carrier};
pub use coordination::{
    AgentLink, Coordinator, CoordinatorService, CoordinatorSnapshot, Notice, Resource,
    ServiceError, ServiceHandle,
};
pub use effect::{Effect, Event};
pub use engine::Engine;
pub use error::CoordinationError;
pub use events::{EventBus, EventPattern, EventReceiver, Subscription};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use scenario::{Action, Report, Runner, Scenario, ScenarioError, StepOutcome};
