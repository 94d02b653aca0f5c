//! Transaction handlers: one module per transaction type, each exposing
//! `preflight` (pure validation) and `apply` (state mutation) following the
//! three-phase pipeline described in spec §2 and §4.6/§4.7.
//!
//! Grounded in the teacher's trait-at-the-seam style
//! (`LedgerObjectFieldGetter`/`CurrentTxFieldGetter` in
//! `core/ledger_objects/traits.rs`): a flat trait implemented once per
//! concrete handler type, no virtual-inheritance chains.

pub mod mptoken_authorize;
pub mod mptoken_issuance_create;
pub mod mptoken_issuance_destroy;
pub mod mptoken_issuance_set;
pub mod nftoken_accept_offer;
pub mod nftoken_burn;
pub mod nftoken_cancel_offer;
pub mod nftoken_create_offer;
pub mod nftoken_mint;
pub mod nftoken_modify;

use crate::amendments::rules::RulesView;
use crate::config::Config;
use crate::keylet;
use crate::ledger::entries::{AccountRoot, LedgerEntry};
use crate::ledger::LedgerView;
use crate::result::ResultCode;
use crate::types::account_id::AccountID;

/// Everything a handler's `apply` needs: the submitter's identity and
/// account (mutated in place per DESIGN.md's "submitter owner-count
/// dualism" decision), a ledger view for every other entry, the enabled
/// amendment set, and ledger-wide parameters.
pub struct ApplyContext<'a> {
    pub account_id: AccountID,
    pub account: &'a mut AccountRoot,
    pub view: &'a mut dyn LedgerView,
    pub rules: &'a RulesView,
    pub config: &'a Config,
}

impl<'a> ApplyContext<'a> {
    /// Adjusts the submitter's owner-count by `delta`, logging at `debug`
    /// the way the teacher's trace call sites name the branch taken.
    pub fn adjust_owner_count(&mut self, delta: i32) {
        if delta > 0 {
            self.account.owner_count += delta as u32;
        } else {
            self.account.owner_count = self.account.owner_count.saturating_sub((-delta) as u32);
        }
        log::debug!(
            "account {} owner_count now {}",
            self.account_id,
            self.account.owner_count
        );
    }

    pub fn has_reserve_for(&self, extra_objects: u32) -> bool {
        self.account.balance >= self.config.account_reserve(self.account.owner_count + extra_objects)
    }

    /// Writes the context-local submitter account through to the view's copy
    /// of it. Call before handing the view to a helper (trust-line credit,
    /// native payment) that may read or mutate an arbitrary account by key,
    /// including possibly the submitter's, so that helper sees current state.
    pub fn push_self(&mut self) {
        let _ = self
            .view
            .update(keylet::account(self.account_id), LedgerEntry::AccountRoot(self.account.clone()));
    }

    /// Reloads the context-local submitter account from the view, undoing
    /// any divergence a helper call in between `push_self` and this call may
    /// have introduced into the view's copy.
    pub fn pull_self(&mut self) {
        if let Some(root) = self
            .view
            .read(keylet::account(self.account_id))
            .ok()
            .and_then(|e| e.as_account_root().cloned())
        {
            *self.account = root;
        }
    }
}

/// A transaction handler's fallible pipeline. `preflight` never touches the
/// ledger; `apply` is the only phase allowed to mutate it.
pub trait TxHandler {
    fn preflight(&self) -> Result<(), ResultCode>;
    fn apply(&self, ctx: &mut ApplyContext) -> Result<(), ResultCode>;
}
