//! Common test utilities for worker integration tests
//!
//! In-memory fakes for the media server, the model and the sleep timer,
//! plus a configuration builder.

#![allow(dead_code)]

pub mod fakes;
pub mod fixtures;

pub use fakes::*;
pub use fixtures::*;
