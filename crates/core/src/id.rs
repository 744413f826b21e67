// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent ID generation

use crate::agent::AgentId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generates unique agent identifiers
pub trait IdGen: Clone + Send + Sync {
    fn next(&self) -> AgentId;
}

/// UUID-based ID generator for agents created without a name
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> AgentId {
        AgentId::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Sequential ID generator with a readable prefix
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("agent")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> AgentId {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        AgentId::new(format!("{}-{}", self.prefix, n))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
