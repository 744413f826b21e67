// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concurrent agents against the coordinator service

use crate::output::{self, OutputFormat};
use crate::render::Renderer;
use berth_core::{
    Agent, Carrier, Coordinator, CoordinatorService, EventBus, IdGen, SequentialIdGen,
    ServiceError,
};
use clap::Args;
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Barrier;
use tracing::debug;

#[derive(Args)]
pub struct RaceArgs {
    /// Number of agents, alternating UPS and FedEx
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..))]
    pub agents: u16,

    /// Name of the contended resource
    #[arg(long, default_value = "packing")]
    pub resource: String,
}

pub async fn race(args: RaceArgs, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let bus = EventBus::new();
    let mut trace = bus.set_global_handler();

    let coordinator = Coordinator::new(args.resource);
    let ups_ids = SequentialIdGen::new("ups");
    let fedex_ids = SequentialIdGen::new("fedex");
    let agents: Vec<Agent> = (0..usize::from(args.agents))
        .map(|i| {
            let carrier = Carrier::ALL[i % Carrier::ALL.len()];
            let id = match carrier {
                Carrier::Ups => ups_ids.next(),
                Carrier::FedEx => fedex_ids.next(),
            };
            Agent::new(id, carrier, &coordinator)
        })
        .collect();

    let (handle, service) = CoordinatorService::spawn(coordinator, bus);

    // Every agent is registered before any task starts. The barrier lines
    // the tasks up, and each holder keeps the slot until everyone still
    // pending is queued, so every release after the first is a hand-off.
    let mut links = Vec::with_capacity(agents.len());
    for agent in &agents {
        links.push(handle.register(agent.clone()).await?);
    }

    let start = Arc::new(Barrier::new(links.len()));
    let pending = Arc::new(AtomicUsize::new(links.len()));
    let tasks: Vec<_> = links
        .into_iter()
        .map(|mut link| {
            let start = Arc::clone(&start);
            let pending = Arc::clone(&pending);
            let handle = handle.clone();
            tokio::spawn(async move {
                start.wait().await;
                link.acquire().await?;
                link.consume()?;
                let behind = pending.load(Ordering::SeqCst).saturating_sub(1);
                while handle.snapshot().await?.queue.len() < behind {
                    tokio::task::yield_now().await;
                }
                pending.fetch_sub(1, Ordering::SeqCst);
                link.release().await?;
                Ok::<_, ServiceError>(())
            })
        })
        .collect();
    debug!(agents = tasks.len(), "agents spawned");

    for task in tasks {
        task.await??;
    }

    let snapshot = handle.snapshot().await?;
    handle.shutdown()?;
    service.await?;

    let mut events = Vec::new();
    while let Ok(event) = trace.try_recv() {
        events.push(event);
    }

    match format {
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "events": events,
            "snapshot": snapshot,
        }))?,
        OutputFormat::Text => {
            let renderer = Renderer::new(agents.iter().map(|a| (&a.id, a.carrier)));
            output::print_lines(events.iter().filter_map(|e| renderer.line(e)), &snapshot);
        }
    }

    Ok(ExitCode::SUCCESS)
}
