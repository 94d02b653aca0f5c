//! `NFTokenMint`: spec §4.6.1.

use crate::keylet;
use crate::ledger::entries::{LedgerEntry, NFTokenOffer, nftoken_offer_flags};
use crate::nft_page;
use crate::result::ResultCode;
use crate::tx::{ApplyContext, TxHandler};
use crate::types::account_id::AccountID;
use crate::types::amount::Amount;
use crate::types::nft_id::{NFTokenID, flags as nft_flags};

pub const MAX_TRANSFER_FEE: u16 = 50_000;
pub const MAX_URI_LEN: usize = 256;

pub struct NFTokenMint {
    pub account: AccountID,
    pub issuer: Option<AccountID>,
    pub transfer_fee: u16,
    pub taxon: u32,
    pub uri: Option<Vec<u8>>,
    pub token_flags: u16,
    pub amount: Option<Amount>,
    pub destination: Option<AccountID>,
    pub expiration: Option<u32>,
}

impl TxHandler for NFTokenMint {
    fn preflight(&self) -> Result<(), ResultCode> {
        let known_flags = nft_flags::BURNABLE
            | nft_flags::ONLY_XRP
            | nft_flags::TRUST_LINE
            | nft_flags::TRANSFERABLE
            | nft_flags::MUTABLE;
        if self.token_flags & !known_flags != 0 {
            return Err(ResultCode::TemInvalidFlag);
        }
        if self.transfer_fee > MAX_TRANSFER_FEE {
            return Err(ResultCode::TemBadNftokenTransferFee);
        }
        let transferable = self.token_flags & nft_flags::TRANSFERABLE != 0;
        if self.transfer_fee != 0 && !transferable {
            return Err(ResultCode::TemBadNftokenTransferFee);
        }
        if let Some(issuer) = self.issuer {
            if issuer == self.account {
                return Err(ResultCode::TemInvalid);
            }
        }
        if let Some(uri) = &self.uri {
            if uri.is_empty() || uri.len() > MAX_URI_LEN {
                return Err(ResultCode::TemInvalid);
            }
        }
        let has_offer_fields =
            self.destination.is_some() || self.expiration.is_some() || self.amount.is_some();
        if has_offer_fields && self.amount.is_none() {
            return Err(ResultCode::TemMalformed);
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<(), ResultCode> {
        let issuer_is_self = self.issuer.is_none() || self.issuer == Some(self.account);

        let (issuer_account_id, sequence) = if issuer_is_self {
            (self.account, ctx.account.minted_nftokens)
        } else {
            let issuer_id = self.issuer.unwrap();
            let issuer_key = keylet::account(issuer_id);
            let issuer_root = ctx
                .view
                .read(issuer_key)
                .ok()
                .and_then(|e| e.as_account_root().cloned())
                .ok_or(ResultCode::TecNoIssuer)?;
            if issuer_root.nftoken_minter != Some(self.account) {
                return Err(ResultCode::TecNoPermission);
            }
            (issuer_id, issuer_root.minted_nftokens)
        };

        let next_sequence = sequence.checked_add(1).ok_or(ResultCode::TecMaxSequenceReached)?;

        let mut token_flags = self.token_flags;
        if ctx.rules.fix_remove_nftoken_auto_trustline() {
            token_flags &= !nft_flags::TRUST_LINE;
        }

        let token_id =
            NFTokenID::derive(token_flags, self.transfer_fee, issuer_account_id, self.taxon, sequence);

        let delta = nft_page::insert_token(ctx.view, self.account, token_id, self.uri.clone())
            .map_err(ResultCode::from)?;
        ctx.adjust_owner_count(delta.0);

        if issuer_is_self {
            ctx.account.minted_nftokens = next_sequence;
        } else {
            let issuer_key = keylet::account(issuer_account_id);
            let mut issuer_root = ctx
                .view
                .read(issuer_key)
                .ok()
                .and_then(|e| e.as_account_root().cloned())
                .ok_or(ResultCode::TecNoIssuer)?;
            issuer_root.minted_nftokens = next_sequence;
            ctx.view
                .update(issuer_key, LedgerEntry::AccountRoot(issuer_root))
                .map_err(|_| ResultCode::TefInternal)?;
        }

        if delta.0 > 0 && !ctx.has_reserve_for(0) {
            return Err(ResultCode::TecInsufficientReserve);
        }

        if ctx.rules.nftoken_mint_offer() {
            if let Some(amount) = &self.amount {
                let sequence = ctx.account.sequence;
                let offer_key = keylet::nftoken_offer(self.account, sequence);
                let owner_dir = keylet::owner_dir(self.account);
                let sells_dir = keylet::nft_sells(token_id);
                let owner_node = crate::directory::insert(ctx.view, owner_dir, self.account, offer_key)
                    .map_err(ResultCode::from)?;
                let token_node = crate::directory::insert(ctx.view, sells_dir, self.account, offer_key)
                    .map_err(ResultCode::from)?;
                let offer = NFTokenOffer {
                    owner: self.account,
                    token_id,
                    amount: amount.clone(),
                    flags: nftoken_offer_flags::SELL_NFTOKEN,
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
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amendments::rules::RulesView;
    use crate::config::Config;
    use crate::keylet;
    use crate::ledger::entries::AccountRoot;
    use crate::ledger::memory::InMemoryLedgerView;

    fn config() -> Config {
        Config {
            parent_close_time: 0,
            reserve_base: 10_000_000,
            reserve_increment: 2_000_000,
        }
    }

    fn new_account(account: AccountID) -> AccountRoot {
        AccountRoot {
            account,
            balance: 1_000_000_000,
            owner_count: 0,
            sequence: 1,
            flags: 0,
            minted_nftokens: 0,
            burned_nftokens: 0,
            nftoken_minter: None,
            transfer_rate: 1_000_000_000,
        }
    }

    #[test]
    fn preflight_rejects_unknown_flags() {
        let mint = NFTokenMint {
            account: AccountID::from([1u8; 20]),
            issuer: None,
            transfer_fee: 0,
            taxon: 0,
            uri: None,
            token_flags: 0x8000,
            amount: None,
            destination: None,
            expiration: None,
        };
        assert_eq!(mint.preflight(), Err(ResultCode::TemInvalidFlag));
    }

    #[test]
    fn preflight_rejects_fee_without_transferable() {
        let mint = NFTokenMint {
            account: AccountID::from([1u8; 20]),
            issuer: None,
            transfer_fee: 1,
            taxon: 0,
            uri: None,
            token_flags: nft_flags::BURNABLE,
            amount: None,
            destination: None,
            expiration: None,
        };
        assert_eq!(mint.preflight(), Err(ResultCode::TemBadNftokenTransferFee));
    }

    #[test]
    fn apply_mints_scenario_1_token() {
        let mut view = InMemoryLedgerView::new();
        let account_id = AccountID::from([0xAB; 20]);
        let mut account = new_account(account_id);
        view.insert(
            keylet::account(account_id),
            LedgerEntry::AccountRoot(account.clone()),
        )
        .unwrap();
        let rules = RulesView::genesis();
        let cfg = config();
        let mut ctx = ApplyContext {
            account_id,
            account: &mut account,
            view: &mut view,
            rules: &rules,
            config: &cfg,
        };

        let mint = NFTokenMint {
            account: account_id,
            issuer: None,
            transfer_fee: 500,
            taxon: 7,
            uri: None,
            token_flags: nft_flags::BURNABLE | nft_flags::TRANSFERABLE,
            amount: None,
            destination: None,
            expiration: None,
        };
        assert!(mint.preflight().is_ok());
        assert!(mint.apply(&mut ctx).is_ok());
        assert_eq!(account.minted_nftokens, 1);
        assert_eq!(account.owner_count, 1);

        let token_id = NFTokenID::derive(
            nft_flags::BURNABLE | nft_flags::TRANSFERABLE,
            500,
            account_id,
            7,
            0,
        );
        assert_eq!(&token_id.as_bytes()[0..2], &[0x00, 0x09]);
        assert_eq!(&token_id.as_bytes()[2..4], &[0x01, 0xF4]);
        assert!(nft_page::find_token(&view, account_id, token_id).is_some());
    }
}
