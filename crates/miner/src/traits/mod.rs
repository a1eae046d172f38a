//! Traits describing the collaborators of the block builder.

mod state;
pub use state::StateDb;

mod chain;
pub use chain::ChainReader;

mod pool;
pub use pool::{PendingFilter, TxPool};

mod engine;
pub use engine::{ExecutionEngine, TxContext};

mod clock;
pub use clock::Clock;
#[cfg(feature = "std")]
pub use clock::SystemClock;

mod metrics;
pub use metrics::{MinerMetrics, NoopMinerMetrics, SkipReason};
