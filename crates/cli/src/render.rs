// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable trace lines for coordination events

use berth_core::{AgentId, Carrier, Event};
use std::collections::HashMap;

/// Renders events using each agent's carrier label.
///
/// When a carrier appears only once the label alone names the agent
/// ("UPS Package"); otherwise the agent id is appended.
pub struct Renderer {
    names: HashMap<String, String>,
}

impl Renderer {
    pub fn new<'a>(agents: impl IntoIterator<Item = (&'a AgentId, Carrier)>) -> Self {
        let agents: Vec<(&AgentId, Carrier)> = agents.into_iter().collect();
        let mut per_carrier: HashMap<Carrier, usize> = HashMap::new();
        for (_, carrier) in &agents {
            *per_carrier.entry(*carrier).or_default() += 1;
        }

        let names = agents
            .into_iter()
            .map(|(id, carrier)| {
                let name = if per_carrier.get(&carrier).copied().unwrap_or(0) > 1 {
                    format!("{} Package {}", carrier.label(), id)
                } else {
                    format!("{} Package", carrier.label())
                };
                (id.0.clone(), name)
            })
            .collect();

        Self { names }
    }

    fn name<'a>(&'a self, agent: &'a str) -> &'a str {
        self.names.get(agent).map(String::as_str).unwrap_or(agent)
    }

    /// Trace line for an event, or `None` for bookkeeping events
    pub fn line(&self, event: &Event) -> Option<String> {
        let line = match event {
            Event::AccessGranted { agent, .. } => format!("{} Shipped", self.name(agent)),
            Event::AccessDenied {
                agent, position, ..
            } => format!(
                "{} Shipping blocked...waiting (queue position {})",
                self.name(agent),
                position
            ),
            Event::ResourceReleased { resource, agent } => {
                format!("{} released the {} slot", self.name(agent), resource)
            }
            Event::HandOff { to, .. } => format!("{}: Ready to ship", self.name(to)),
            Event::ReleaseRejected {
                resource,
                agent,
                holder,
            } => format!(
                "{} cannot release the {} slot (held by {})",
                self.name(agent),
                resource,
                holder.as_deref().map(|h| self.name(h)).unwrap_or("nobody")
            ),
            Event::AgentConsumed { agent } => format!("Delivering {}", self.name(agent)),
            Event::AgentReset { agent } => {
                format!("{} ready for another shipment", self.name(agent))
            }
            Event::AgentRegistered { .. } | Event::AgentResumed { .. } => return None,
        };
        Some(line)
    }
}
