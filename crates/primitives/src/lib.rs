#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod header;
pub use header::{Header, SealedHeader};

mod transaction;
pub use transaction::{PooledTransaction, Transaction, TransactionError, TxType};

mod receipt;
pub use receipt::{Receipt, ReceiptLog};

mod block;
pub use block::{Block, SealedBlock};

/// Gas consumed by each blob attached to a blob transaction.
pub use alloy_eips::eip4844::DATA_GAS_PER_BLOB;
