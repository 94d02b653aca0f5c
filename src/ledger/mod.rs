//! The ledger view: the seam every transaction handler goes through to read
//! and mutate state. Grounded in the teacher's trait-at-the-seam pattern for
//! `HostBindings`/`LedgerObjectFieldGetter` (`core/ledger_objects/traits.rs`,
//! `host/host_bindings_trait.rs`), which exists so production FFI and a
//! `mockall` mock can stand in for each other. Here the seam is a typed view
//! over ledger entries rather than a raw host ABI, since the wire codec and
//! key-value store are external collaborators (see `SPEC_FULL.md` §1, §6).

pub mod entries;
pub mod memory;

pub use entries::LedgerEntry;
pub use memory::InMemoryLedgerView;

use crate::types::hash::Hash256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    NotFound,
    AlreadyExists,
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Mirrors the teacher's `test-host-bindings` pattern: production code calls
/// through this trait, and unit tests can either use `InMemoryLedgerView` or
/// a `mockall`-generated mock when they need to assert exact call sequences.
#[cfg_attr(test, mockall::automock)]
pub trait LedgerView {
    fn exists(&self, key: Hash256) -> bool;
    fn read(&self, key: Hash256) -> LedgerResult<LedgerEntry>;
    fn insert(&mut self, key: Hash256, entry: LedgerEntry) -> LedgerResult<()>;
    fn update(&mut self, key: Hash256, entry: LedgerEntry) -> LedgerResult<()>;
    fn erase(&mut self, key: Hash256) -> LedgerResult<()>;
}
