//! `MPTokenAuthorize`: spec §4.7.4. A holder opts in (or out) of holding an
//! MPT by creating (or deleting) its own `MPToken` object; separately, an
//! issuer whose issuance requires authorization flips a specific holder's
//! `Authorized` flag.

use crate::directory;
use crate::keylet;
use crate::ledger::entries::{LedgerEntry, MPToken, mpt_issuance_flags, mptoken_flags};
use crate::result::ResultCode;
use crate::tx::{ApplyContext, TxHandler};
use crate::types::account_id::AccountID;
use crate::types::mpt_id::MptId;

pub struct MPTokenAuthorize {
    pub account: AccountID,
    pub mpt_id: MptId,
    /// Set only when the issuer is authorizing someone else's holding.
    pub holder: Option<AccountID>,
    pub delete: bool,
}

impl TxHandler for MPTokenAuthorize {
    fn preflight(&self) -> Result<(), ResultCode> {
        if self.holder.is_some() && self.delete {
            return Err(ResultCode::TemMalformed);
        }
        if self.holder == Some(self.account) {
            return Err(ResultCode::TemInvalid);
        }
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

        match self.holder {
            Some(holder) => {
                if issuance.issuer != self.account {
                    return Err(ResultCode::TecNoPermission);
                }
                let token_key = keylet::mpt_token(issuance_key, holder);
                let mut token = ctx
                    .view
                    .read(token_key)
                    .ok()
                    .and_then(|e| e.as_mptoken().cloned())
                    .ok_or(ResultCode::TecNoEntry)?;
                token.flags |= mptoken_flags::AUTHORIZED;
                ctx.view
                    .update(token_key, LedgerEntry::MPToken(token))
                    .map_err(|_| ResultCode::TefInternal)
            }
            None => {
                let holder = self.account;
                let token_key = keylet::mpt_token(issuance_key, holder);
                if self.delete {
                    self.delete_own_token(ctx, token_key, holder)
                } else {
                    self.create_own_token(ctx, &issuance, token_key, holder)
                }
            }
        }
    }
}

impl MPTokenAuthorize {
    fn delete_own_token(
        &self,
        ctx: &mut ApplyContext,
        token_key: crate::types::hash::Hash256,
        holder: AccountID,
    ) -> Result<(), ResultCode> {
        let token = ctx
            .view
            .read(token_key)
            .ok()
            .and_then(|e| e.as_mptoken().cloned())
            .ok_or(ResultCode::TecNoEntry)?;
        if token.amount != 0 {
            return Err(ResultCode::TecHasObligations);
        }
        let owner_dir = keylet::owner_dir(holder);
        directory::remove(ctx.view, owner_dir, token.owner_node, token_key, true)
            .map_err(ResultCode::from)?;
        ctx.view.erase(token_key).map_err(|_| ResultCode::TefInternal)?;
        ctx.adjust_owner_count(-1);
        Ok(())
    }

    fn create_own_token(
        &self,
        ctx: &mut ApplyContext,
        issuance: &crate::ledger::entries::MPTokenIssuance,
        token_key: crate::types::hash::Hash256,
        holder: AccountID,
    ) -> Result<(), ResultCode> {
        if ctx.view.exists(token_key) {
            return Err(ResultCode::TecDuplicate);
        }
        let owner_dir = keylet::owner_dir(holder);
        let owner_node =
            directory::insert(ctx.view, owner_dir, holder, token_key).map_err(ResultCode::from)?;
        let authorized = issuance.flags & mpt_issuance_flags::REQUIRE_AUTH == 0;
        let token = MPToken {
            holder,
            mpt_id: self.mpt_id,
            flags: if authorized { mptoken_flags::AUTHORIZED } else { 0 },
            amount: 0,
            locked_amount: 0,
            owner_node,
        };
        ctx.view
            .insert(token_key, LedgerEntry::MPToken(token))
            .map_err(|_| ResultCode::TefInternal)?;
        ctx.adjust_owner_count(1);
        if !ctx.has_reserve_for(0) {
            return Err(ResultCode::TecInsufficientReserve);
        }
        Ok(())
    }
}
