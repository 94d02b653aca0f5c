//! `MPTokenIssuanceSet`: spec §4.7.3. Locks or unlocks either an entire
//! issuance or one holder's `MPToken`, gated by the issuance's `CanLock`
//! flag regardless of whether `SingleAssetVault` is enabled (DESIGN.md Open
//! Question decision #3).

use crate::keylet;
use crate::ledger::entries::{LedgerEntry, mpt_issuance_flags, mptoken_flags};
use crate::result::ResultCode;
use crate::tx::{ApplyContext, TxHandler};
use crate::types::account_id::AccountID;
use crate::types::mpt_id::MptId;

pub struct MPTokenIssuanceSet {
    pub account: AccountID,
    pub mpt_id: MptId,
    pub holder: Option<AccountID>,
    pub lock: bool,
}

impl TxHandler for MPTokenIssuanceSet {
    fn preflight(&self) -> Result<(), ResultCode> {
        Ok(())
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<(), ResultCode> {
        let issuance_key = keylet::mpt_issuance(self.mpt_id);
        let issuance = ctx
            .view
            .read(issuance_key)
            .ok()
            .and_then(|e| e.as_mpt_issuance().cloned())
            .ok_or(ResultCode::TecMptIssuanceNotFound)?;

        if issuance.issuer != self.account {
            return Err(ResultCode::TecNoPermission);
        }
        if !issuance.has_flag(mpt_issuance_flags::CAN_LOCK) {
            return Err(ResultCode::TecNoPermission);
        }

        match self.holder {
            Some(holder) => {
                let token_key = keylet::mpt_token(issuance_key, holder);
                let mut token = ctx
                    .view
                    .read(token_key)
                    .ok()
                    .and_then(|e| e.as_mptoken().cloned())
                    .ok_or(ResultCode::TecNoEntry)?;
                if self.lock {
                    token.flags |= mptoken_flags::LOCKED;
                } else {
                    token.flags &= !mptoken_flags::LOCKED;
                }
                ctx.view
                    .update(token_key, LedgerEntry::MPToken(token))
                    .map_err(|_| ResultCode::TefInternal)
            }
            None => {
                let mut issuance = issuance;
                if self.lock {
                    issuance.flags |= mpt_issuance_flags::LOCKED;
                } else {
                    issuance.flags &= !mpt_issuance_flags::LOCKED;
                }
                ctx.view
                    .update(issuance_key, LedgerEntry::MPTokenIssuance(issuance))
                    .map_err(|_| ResultCode::TefInternal)
            }
        }
    }
}
