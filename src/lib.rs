// SPDX-License-Identifier: MIT

//! quill-rs - graph-driven blog generation
//!
//! - [workflow] - generic graph engine: state, nodes, compiler, executor
//! - [blog] - the blog pipeline built on that engine
//! - [llm] - text-generation models
//! - [config] - settings
//! - [server] - HTTP API

pub mod blog;
pub mod config;
pub mod error;
pub mod llm;
pub mod server;
pub mod workflow;

pub use error::QuillError;
