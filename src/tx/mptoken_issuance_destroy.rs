//! `MPTokenIssuanceDestroy`: spec §4.7.2.

use crate::directory;
use crate::keylet;
use crate::result::ResultCode;
use crate::tx::{ApplyContext, TxHandler};
use crate::types::account_id::AccountID;
use crate::types::mpt_id::MptId;

pub struct MPTokenIssuanceDestroy {
    pub account: AccountID,
    pub mpt_id: MptId,
}

impl TxHandler for MPTokenIssuanceDestroy {
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
        if issuance.outstanding_amount != 0 {
            return Err(ResultCode::TecHasObligations);
        }

        let owner_dir = keylet::owner_dir(self.account);
        directory::remove(ctx.view, owner_dir, issuance.owner_node, issuance_key, true)
            .map_err(ResultCode::from)?;
        ctx.view.erase(issuance_key).map_err(|_| ResultCode::TefInternal)?;
        ctx.adjust_owner_count(-1);
        Ok(())
    }
}
