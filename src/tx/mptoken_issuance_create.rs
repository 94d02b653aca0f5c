//! `MPTokenIssuanceCreate`: spec §4.7.1.

use crate::directory;
use crate::keylet;
use crate::ledger::entries::{LedgerEntry, MPTokenIssuance, mpt_issuance_flags};
use crate::result::ResultCode;
use crate::tx::{ApplyContext, TxHandler};
use crate::types::account_id::AccountID;
use crate::types::mpt_id::make_mpt_id;

pub const MAX_TRANSFER_FEE: u16 = 50_000;
pub const MAX_METADATA_LEN: usize = 1024;

pub struct MPTokenIssuanceCreate {
    pub account: AccountID,
    pub asset_scale: u8,
    pub transfer_fee: u16,
    pub maximum_amount: Option<u64>,
    pub flags: u32,
    pub metadata: Option<Vec<u8>>,
}

impl TxHandler for MPTokenIssuanceCreate {
    fn preflight(&self) -> Result<(), ResultCode> {
        let known_flags = mpt_issuance_flags::CAN_LOCK
            | mpt_issuance_flags::REQUIRE_AUTH
            | mpt_issuance_flags::CAN_ESCROW
            | mpt_issuance_flags::CAN_TRADE
            | mpt_issuance_flags::CAN_TRANSFER
            | mpt_issuance_flags::CAN_CLAWBACK;
        if self.flags & !known_flags != 0 {
            return Err(ResultCode::TemInvalidFlag);
        }
        if self.transfer_fee > MAX_TRANSFER_FEE {
            return Err(ResultCode::TemBadTransferFee);
        }
        if self.transfer_fee != 0 && self.flags & mpt_issuance_flags::CAN_TRANSFER == 0 {
            return Err(ResultCode::TemBadTransferFee);
        }
        if self.maximum_amount == Some(0) {
            return Err(ResultCode::TemMalformed);
        }
        if let Some(metadata) = &self.metadata {
            if metadata.is_empty() || metadata.len() > MAX_METADATA_LEN {
                return Err(ResultCode::TemMalformed);
            }
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<(), ResultCode> {
        let mpt_id = make_mpt_id(ctx.account.sequence, self.account);
        let issuance_key = keylet::mpt_issuance(mpt_id);
        if ctx.view.exists(issuance_key) {
            return Err(ResultCode::TefInternal);
        }

        let owner_dir = keylet::owner_dir(self.account);
        let owner_node =
            directory::insert(ctx.view, owner_dir, self.account, issuance_key).map_err(ResultCode::from)?;

        let issuance = MPTokenIssuance {
            mpt_id,
            issuer: self.account,
            sequence: ctx.account.sequence,
            flags: self.flags,
            asset_scale: self.asset_scale,
            transfer_fee: self.transfer_fee,
            maximum_amount: self.maximum_amount,
            outstanding_amount: 0,
            locked_amount: 0,
            metadata: self.metadata.clone(),
            owner_node,
        };
        ctx.view
            .insert(issuance_key, LedgerEntry::MPTokenIssuance(issuance))
            .map_err(|_| ResultCode::TefInternal)?;

        ctx.adjust_owner_count(1);
        if !ctx.has_reserve_for(0) {
            return Err(ResultCode::TecInsufficientReserve);
        }
        Ok(())
    }
}
