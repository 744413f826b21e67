// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bus for routing events to subscribers

use super::subscription::{SubscriberId, Subscription};
use crate::effect::Event;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;
use tracing::trace;

/// Sender for event delivery
pub type EventSender = mpsc::UnboundedSender<Event>;
/// Receiver for event delivery
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

#[derive(Default)]
struct Registry {
    subscribers: Vec<(Subscription, EventSender)>,
    /// Receives every event regardless of name
    global: Option<EventSender>,
}

/// Routes events to matching subscribers.
///
/// Clones share the same registry. A subscriber whose receiver has been
/// dropped is pruned the next time an event matches it.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<RwLock<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to events matching the subscription's patterns.
    /// A subscription with an existing id replaces the old one.
    pub fn subscribe(&self, subscription: Subscription) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
        registry
            .subscribers
            .retain(|(existing, _)| existing.id != subscription.id);
        registry.subscribers.push((subscription, tx));
        rx
    }

    pub fn unsubscribe(&self, id: &SubscriberId) {
        let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
        registry.subscribers.retain(|(existing, _)| &existing.id != id);
    }

    /// Receive every published event (used by drivers for tracing)
    pub fn set_global_handler(&self) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
        registry.global = Some(tx);
        rx
    }

    /// Publish an event to the global handler and all matching subscribers
    pub fn publish(&self, event: Event) {
        let name = event.name();
        trace!(event = %name, agent = %event.agent(), "publish");

        let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
        if let Some(tx) = &registry.global {
            if tx.send(event.clone()).is_err() {
                registry.global = None;
            }
        }
        registry.subscribers.retain(|(subscription, tx)| {
            !subscription.matches(&name) || tx.send(event.clone()).is_ok()
        });
    }

    /// Get count of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.registry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .subscribers
            .len()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
