//! `NFTokenCreateOffer`: spec §4.6.3.

use crate::directory;
use crate::keylet;
use crate::ledger::entries::{LedgerEntry, NFTokenOffer, nftoken_offer_flags};
use crate::nft_page;
use crate::result::ResultCode;
use crate::tx::{ApplyContext, TxHandler};
use crate::types::account_id::AccountID;
use crate::types::amount::Amount;
use crate::types::nft_id::NFTokenID;

pub struct NFTokenCreateOffer {
    pub account: AccountID,
    pub token_id: NFTokenID,
    pub amount: Amount,
    pub sell_offer: bool,
    /// For a buy offer: the account that currently owns the token. Ignored
    /// (and must be absent) for a sell offer, whose owner is the submitter.
    pub owner: Option<AccountID>,
    pub destination: Option<AccountID>,
    pub expiration: Option<u32>,
}

impl TxHandler for NFTokenCreateOffer {
    fn preflight(&self) -> Result<(), ResultCode> {
        if self.destination == Some(self.account) {
            return Err(ResultCode::TemInvalid);
        }
        if self.amount.is_negative() {
            return Err(ResultCode::TemBadAmount);
        }
        if self.token_id.flags().is_only_xrp() && !self.amount.is_native() {
            return Err(ResultCode::TemBadAmount);
        }
        if self.sell_offer {
            if self.owner.is_some() {
                return Err(ResultCode::TemMalformed);
            }
        } else {
            if self.amount.is_zero() {
                return Err(ResultCode::TemBadAmount);
            }
            match self.owner {
                None => return Err(ResultCode::TemMalformed),
                Some(owner) if owner == self.account => return Err(ResultCode::TemInvalid),
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<(), ResultCode> {
        if !self.token_id.flags().is_transferable() && self.token_id.issuer() != self.account {
            let counterparty = if self.sell_offer { self.account } else { self.owner.unwrap() };
            if counterparty != self.token_id.issuer() {
                return Err(ResultCode::TefNftTokenIsNotTransferable);
            }
        }

        let owner = if self.sell_offer {
            self.account
        } else {
            self.owner.unwrap()
        };

        if self.sell_offer {
            nft_page::find_token(ctx.view, owner, self.token_id)
                .ok_or(ResultCode::TecNoEntry)?;
        }

        if let Some(expiration) = self.expiration {
            if expiration <= ctx.config.parent_close_time {
                return Err(ResultCode::TecExpired);
            }
        }

        let offer_key = keylet::nftoken_offer(self.account, ctx.account.sequence);
        let owner_dir = keylet::owner_dir(self.account);
        let token_dir = if self.sell_offer {
            keylet::nft_sells(self.token_id)
        } else {
            keylet::nft_buys(self.token_id)
        };

        let owner_node =
            directory::insert(ctx.view, owner_dir, self.account, offer_key).map_err(ResultCode::from)?;
        let token_node =
            directory::insert(ctx.view, token_dir, self.account, offer_key).map_err(ResultCode::from)?;

        let flags = if self.sell_offer { nftoken_offer_flags::SELL_NFTOKEN } else { 0 };
        let offer = NFTokenOffer {
            owner: self.account,
            token_id: self.token_id,
            amount: self.amount,
            flags,
            destination: self.destination,
            expiration: self.expiration,
            owner_node,
            token_directory_node: token_node,
        };
        ctx.view
            .insert(offer_key, LedgerEntry::NFTokenOffer(offer))
            .map_err(|_| ResultCode::TefInternal)?;

        ctx.adjust_owner_count(1);
        if !ctx.has_reserve_for(0) {
            return Err(ResultCode::TecInsufficientReserve);
        }
        Ok(())
    }
}
