#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

#[macro_use]
extern crate tracing;

mod errors;
pub use errors::{ConfigError, MinerError, MinerResult, TxExecutionError, TxRejection};

mod traits;
#[cfg(feature = "std")]
pub use traits::SystemClock;
pub use traits::{
    ChainReader, Clock, ExecutionEngine, MinerMetrics, NoopMinerMetrics, PendingFilter,
    SkipReason, StateDb, TxContext, TxPool,
};

mod config;
pub use config::{MinerConfig, DEFAULT_TARGET_TXS_SIZE};

mod cancel;
pub use cancel::CancellationToken;

mod gas_pool;
pub use gas_pool::GasPool;

mod ordering;
pub use ordering::{LazyTransaction, TransactionsByPriceAndNonce};

mod lanes;
pub use lanes::{HighestTip, Lane, LaneKind, LaneSelector};

mod predicate;
pub use predicate::{
    check_predicates, prepare_predicate_storage_slots, PredicateContext, PredicateResults,
    PredicateResultsError, Predicater, Predicaters, PREDICATE_RESULTS_CODEC_VERSION,
};

mod environment;
pub use environment::{EnvSnapshot, Environment};

mod worker;
pub use worker::{GeneratedBlock, Miner, MinerBuilder};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
