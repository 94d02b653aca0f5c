//! Transaction-application core for a decentralized payment-ledger node.
//!
//! This crate implements the state-transition logic for NFT and MPT
//! lifecycle transactions over a paged, ordered ledger store: validating a
//! transaction in isolation (`preflight`), then applying it against a
//! mutable ledger view (`apply`). See `SPEC_FULL.md` for the full module
//! and invariant catalog.
//!
//! Module layout, grounded in the teacher's flat top-level module tree
//! (`core/`, `host/`, `types/`): each concern gets its own top-level module
//! rather than a deep tree, with `tx` further split one submodule per
//! transaction type.

pub mod amendments;
pub mod config;
pub mod directory;
pub mod error;
pub mod keylet;
pub mod ledger;
pub mod nft_page;
pub mod result;
pub mod tx;
pub mod types;
pub mod value_transfer;

pub use config::Config;
pub use error::CoreError;
pub use result::ResultCode;
pub use tx::{ApplyContext, TxHandler};
