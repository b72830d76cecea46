//! Shared test utilities for progress-journal integration tests.
//!
//! - `FakeApi`: an in-process `JournalApi` that records every call
//! - `TestHarness`: temp-dir backed session store, toast capture, fixed clock
//! - `responder`: a one-shot HTTP server for driving the real client

pub mod builders;
pub mod fake_api;
pub mod harness;
pub mod responder;

pub use builders::*;
pub use fake_api::{ApiCall, FakeApi};
pub use harness::TestHarness;
