#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
extern crate tracing;

mod errors;
pub use errors::{FeeConfigError, FeeError, FeeResult};

pub mod constants;

mod config;
pub use config::{ChainConfig, FeeConfig, PrecompileUpgrade, Rules};

mod window;
pub use window::LongWindow;

mod base_fee;
pub use base_fee::{calc_base_fee, estimate_next_base_fee};

mod block_gas_cost;
pub use block_gas_cost::{block_gas_cost, calc_block_gas_cost};

mod gas_limit;
pub use gas_limit::{calc_gas_limit, verify_gas_limit};

mod verify;
pub use verify::{min_required_tip, verify_block_fee, verify_header_gas_fields};
