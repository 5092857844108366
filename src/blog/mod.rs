// SPDX-License-Identifier: MIT

//! Blog generation pipeline
//!
//! - [language] - supported translation languages and the branch router
//! - [postprocess] - summary-section stripping
//! - [nodes] - title, content, route and translation nodes
//! - [pipeline] - the two graph topologies and request validation

pub mod language;
pub mod nodes;
pub mod pipeline;
pub mod postprocess;

pub use language::{route_language, Language};
pub use pipeline::{BlogPipeline, BlogRequest, Usecase};
