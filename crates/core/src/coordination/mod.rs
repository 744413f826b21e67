// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination primitives for exclusive resource access
//!
//! This module provides:
//! - **Resource** - Binary slot tracking the current holder
//! - **Coordinator** - Sole arbiter of the resource and its FIFO wait queue
//! - **CoordinatorService** - Actor that owns a coordinator for concurrent agents

pub mod coordinator;
pub mod resource;
pub mod service;

pub use coordinator::{Coordinator, CoordinatorSnapshot};
pub use resource::Resource;
pub use service::{AgentLink, CoordinatorService, Notice, ServiceError, ServiceHandle};
