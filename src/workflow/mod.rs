// SPDX-License-Identifier: MIT

//! Graph-based workflow execution
//!
//! This module provides the generic engine: a state record, a declarative
//! [`StateGraph`] that compiles into a validated [`CompiledGraph`], and the
//! executor that walks it one node at a time.

pub mod builder;
pub mod executor;
pub mod state;
pub mod types;

pub use builder::StateGraph;
pub use executor::{CompiledGraph, Execution};
pub use state::{Blog, StateUpdate, WorkflowState};
pub use types::{FnNode, Node, RouteLabel, END};
