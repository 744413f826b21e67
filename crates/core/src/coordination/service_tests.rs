// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::agent::{AgentState, Carrier};
use crate::events::{EventPattern, Subscription};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn start() -> (ServiceHandle, JoinHandle<Coordinator>, Coordinator) {
    let coordinator = Coordinator::new("packing");
    let template = coordinator.clone();
    let (handle, task) = CoordinatorService::spawn(coordinator, EventBus::new());
    (handle, task, template)
}

async fn wait_for_queue(handle: &ServiceHandle, len: usize) {
    loop {
        if handle.snapshot().await.unwrap().queue.len() == len {
            return;
        }
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn waiting_agent_is_woken_on_release() {
    let (handle, _task, coordinator) = start();
    let mut ups = handle
        .register(Agent::new("ups", Carrier::Ups, &coordinator))
        .await
        .unwrap();
    let mut fedex = handle
        .register(Agent::new("fedex", Carrier::FedEx, &coordinator))
        .await
        .unwrap();

    ups.acquire().await.unwrap();
    assert!(ups.agent().is_holding());

    let waiter = tokio::spawn(async move {
        fedex.acquire().await.unwrap();
        fedex
    });
    wait_for_queue(&handle, 1).await;

    ups.consume().unwrap();
    ups.release().await.unwrap();
    assert!(ups.agent().is_done());

    let fedex = waiter.await.unwrap();
    assert!(fedex.agent().is_holding());

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.holder, Some(AgentId::new("fedex")));
    assert!(snapshot.queue.is_empty());
}

#[tokio::test]
async fn queued_agents_are_granted_in_request_order() {
    let (handle, _task, coordinator) = start();
    let mut grants = handle.events().subscribe(Subscription::new(
        "grants",
        vec![EventPattern::new("resource:granted")],
        "grant order",
    ));

    let mut first = handle
        .register(Agent::new("first", Carrier::Ups, &coordinator))
        .await
        .unwrap();
    first.acquire().await.unwrap();

    let mut waiters = Vec::new();
    for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
        let mut link = handle
            .register(Agent::new(*name, Carrier::FedEx, &coordinator))
            .await
            .unwrap();
        waiters.push(tokio::spawn(async move {
            link.acquire().await.unwrap();
            link.release().await.unwrap();
        }));
        wait_for_queue(&handle, i + 1).await;
    }

    first.release().await.unwrap();
    for waiter in waiters {
        waiter.await.unwrap();
    }

    let mut order = Vec::new();
    while let Ok(event) = grants.try_recv() {
        order.push(event.agent().to_string());
    }
    assert_eq!(order, vec!["first", "a", "b", "c", "d"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_agents_never_overlap() {
    let (handle, _task, coordinator) = start();
    let in_use = Arc::new(AtomicUsize::new(0));
    let mut tasks = Vec::new();

    for i in 0..16 {
        let carrier = Carrier::ALL[i % 2];
        let mut link = handle
            .register(Agent::new(format!("agent-{i}"), carrier, &coordinator))
            .await
            .unwrap();
        let in_use = Arc::clone(&in_use);
        tasks.push(tokio::spawn(async move {
            link.acquire().await.unwrap();
            assert_eq!(in_use.fetch_add(1, Ordering::SeqCst), 0);
            link.consume().unwrap();
            tokio::task::yield_now().await;
            in_use.fetch_sub(1, Ordering::SeqCst);
            link.release().await.unwrap();
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }

    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.holder.is_none());
    assert!(snapshot.queue.is_empty());
}

#[tokio::test]
async fn release_by_non_holder_is_rejected() {
    let (handle, _task, coordinator) = start();
    let mut rejected = handle.events().subscribe(Subscription::new(
        "rejected",
        vec![EventPattern::new("resource:rejected")],
        "misuse",
    ));
    let mut ups = handle
        .register(Agent::new("ups", Carrier::Ups, &coordinator))
        .await
        .unwrap();
    ups.acquire().await.unwrap();
    handle
        .register(Agent::new("fedex", Carrier::FedEx, &coordinator))
        .await
        .unwrap();

    let err = handle.release(&AgentId::new("fedex")).await.unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Coordination(CoordinationError::InvalidRelease { .. })
    ));
    assert!(matches!(
        rejected.try_recv().unwrap(),
        Event::ReleaseRejected { holder: Some(h), .. } if h == "ups"
    ));
    assert_eq!(
        handle.snapshot().await.unwrap().holder,
        Some(AgentId::new("ups"))
    );
}

#[tokio::test]
async fn registration_checks_wiring() {
    let (handle, _task, coordinator) = start();
    let elsewhere = Coordinator::new("loading");

    let err = handle
        .register(Agent::new("ups", Carrier::Ups, &elsewhere))
        .await
        .err()
        .unwrap();
    assert!(matches!(
        err,
        ServiceError::Coordination(CoordinationError::WrongCoordinator { .. })
    ));

    handle
        .register(Agent::new("ups", Carrier::Ups, &coordinator))
        .await
        .unwrap();
    let err = handle
        .register(Agent::new("ups", Carrier::FedEx, &coordinator))
        .await
        .err()
        .unwrap();
    assert!(matches!(
        err,
        ServiceError::Coordination(CoordinationError::DuplicateAgent(_))
    ));
}

#[tokio::test]
async fn registration_requires_an_idle_agent() {
    let (handle, _task, coordinator) = start();
    let mut agent = Agent::new("ups", Carrier::Ups, &coordinator);
    agent.state = AgentState::Waiting;

    let err = handle.register(agent).await.err().unwrap();

    assert!(matches!(
        err,
        ServiceError::Coordination(CoordinationError::InvalidTransition { action: "register", .. })
    ));
    assert!(matches!(
        handle.request(&AgentId::new("ups")).await,
        Err(ServiceError::Coordination(CoordinationError::UnknownAgent(_)))
    ));
}

#[tokio::test]
async fn unregistered_ids_cannot_take_the_resource() {
    let (handle, _task, coordinator) = start();
    let mut ups = handle
        .register(Agent::new("ups", Carrier::Ups, &coordinator))
        .await
        .unwrap();
    let ghost = AgentId::new("ghost");

    assert!(matches!(
        handle.request(&ghost).await,
        Err(ServiceError::Coordination(CoordinationError::UnknownAgent(id))) if id == ghost
    ));
    assert!(matches!(
        handle.release(&ghost).await,
        Err(ServiceError::Coordination(CoordinationError::UnknownAgent(_)))
    ));

    tokio::time::timeout(std::time::Duration::from_secs(1), ups.acquire())
        .await
        .unwrap()
        .unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.holder, Some(AgentId::new("ups")));
    assert!(snapshot.queue.is_empty());
}

#[tokio::test]
async fn link_release_out_of_step_leaves_coordinator_untouched() {
    let (handle, _task, coordinator) = start();
    let mut a = handle
        .register(Agent::new("a", Carrier::Ups, &coordinator))
        .await
        .unwrap();
    // Granted behind the link's back, so the link still thinks it is idle
    assert!(handle.request(&AgentId::new("a")).await.unwrap());

    let err = a.release().await.unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Coordination(CoordinationError::InvalidTransition { action: "release", .. })
    ));
    assert!(a.agent().is_idle());
    assert_eq!(
        handle.snapshot().await.unwrap().holder,
        Some(AgentId::new("a"))
    );
}

#[tokio::test]
async fn link_acquire_out_of_step_sends_nothing() {
    let (handle, _task, coordinator) = start();
    let mut a = handle
        .register(Agent::new("a", Carrier::Ups, &coordinator))
        .await
        .unwrap();
    a.acquire().await.unwrap();
    a.release().await.unwrap();

    assert!(a.acquire().await.is_err());
    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.holder.is_none());
    assert!(snapshot.queue.is_empty());
}

#[tokio::test]
async fn agent_can_reacquire_after_reset() {
    let (handle, _task, coordinator) = start();
    let mut ups = handle
        .register(Agent::new("ups", Carrier::Ups, &coordinator))
        .await
        .unwrap();

    ups.acquire().await.unwrap();
    ups.release().await.unwrap();
    assert!(matches!(
        ups.acquire().await,
        Err(ServiceError::Coordination(CoordinationError::InvalidTransition { .. }))
    ));

    ups.reset().unwrap();
    ups.acquire().await.unwrap();
    assert!(ups.agent().is_holding());
}

#[tokio::test]
async fn shutdown_returns_coordinator() {
    let (handle, task, coordinator) = start();
    let mut ups = handle
        .register(Agent::new("ups", Carrier::Ups, &coordinator))
        .await
        .unwrap();
    ups.acquire().await.unwrap();

    handle.shutdown().unwrap();
    let coordinator = task.await.unwrap();

    assert_eq!(coordinator.holder(), Some(&AgentId::new("ups")));
    assert!(matches!(
        handle.snapshot().await,
        Err(ServiceError::Closed)
    ));
}
