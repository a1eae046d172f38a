//! Test utilities for `subnet-miner`.

mod state;
pub use state::MockState;

mod pool;
pub use pool::MockPool;

mod chain;
pub use chain::MockChain;

mod engine;
pub use engine::MockEngine;

mod clock;
pub use clock::MockClock;

mod metrics;
pub use metrics::MockMetrics;

mod tracing;
pub use tracing::{CollectingLayer, TraceStorage, TracedEvent};

/// An error returned by the mock collaborators.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct MockError(pub alloc::string::String);
