// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine module for hosting a coordinator and its agents in one thread

pub mod runtime;

// Re-exports
pub use runtime::Engine;
