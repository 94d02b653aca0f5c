//! `NFTokenCancelOffer`: spec §4.6.4.

use crate::directory;
use crate::keylet;
use crate::ledger::entries::LedgerEntry;
use crate::result::ResultCode;
use crate::tx::{ApplyContext, TxHandler};
use crate::types::account_id::AccountID;
use crate::types::hash::Hash256;
use std::collections::HashSet;

/// Largest offer-ID list a single cancel may name.
const MAX_OFFER_IDS: usize = 500;

pub struct NFTokenCancelOffer {
    pub account: AccountID,
    pub offer_ids: Vec<Hash256>,
}

impl TxHandler for NFTokenCancelOffer {
    fn preflight(&self) -> Result<(), ResultCode> {
        if self.offer_ids.is_empty() || self.offer_ids.len() > MAX_OFFER_IDS {
            return Err(ResultCode::TemMalformed);
        }
        let mut seen = HashSet::with_capacity(self.offer_ids.len());
        if !self.offer_ids.iter().all(|id| seen.insert(*id)) {
            return Err(ResultCode::TemMalformed);
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<(), ResultCode> {
        for offer_key in &self.offer_ids {
            let offer = ctx
                .view
                .read(*offer_key)
                .ok()
                .and_then(|e| e.as_nftoken_offer().cloned())
                .ok_or(ResultCode::TecNoEntry)?;

            let expired = offer
                .expiration
                .is_some_and(|e| e <= ctx.config.parent_close_time);
            if offer.owner != self.account && !expired {
                return Err(ResultCode::TecNoPermission);
            }

            let token_dir = if offer.is_sell_offer() {
                keylet::nft_sells(offer.token_id)
            } else {
                keylet::nft_buys(offer.token_id)
            };
            let owner_dir = keylet::owner_dir(offer.owner);

            directory::remove(ctx.view, owner_dir, offer.owner_node, *offer_key, true)
                .map_err(ResultCode::from)?;
            directory::remove(ctx.view, token_dir, offer.token_directory_node, *offer_key, false)
                .map_err(ResultCode::from)?;
            ctx.view.erase(*offer_key).map_err(|_| ResultCode::TefInternal)?;

            if offer.owner == ctx.account_id {
                ctx.adjust_owner_count(-1);
            } else {
                let owner_key = keylet::account(offer.owner);
                let mut owner_root = ctx
                    .view
                    .read(owner_key)
                    .ok()
                    .and_then(|e| e.as_account_root().cloned())
                    .ok_or(ResultCode::TefInternal)?;
                owner_root.owner_count = owner_root.owner_count.saturating_sub(1);
                ctx.view
                    .update(owner_key, LedgerEntry::AccountRoot(owner_root))
                    .map_err(|_| ResultCode::TefInternal)?;
            }
        }
        Ok(())
    }
}
