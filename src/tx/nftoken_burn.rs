//! `NFTokenBurn`: spec §4.6.2.

use crate::directory;
use crate::keylet;
use crate::ledger::entries::LedgerEntry;
use crate::nft_page;
use crate::result::ResultCode;
use crate::tx::{ApplyContext, TxHandler};
use crate::types::account_id::AccountID;
use crate::types::hash::Hash256;
use crate::types::nft_id::NFTokenID;

/// Per-transaction cap on how many outstanding offers a burn will tear down.
const MAX_OFFERS_TO_DELETE: usize = 500;

pub struct NFTokenBurn {
    pub account: AccountID,
    pub token_id: NFTokenID,
    /// Present when the submitter is burning a token it does not currently
    /// hold; only the token's issuer may do this, and only when the token
    /// was minted burnable.
    pub owner: Option<AccountID>,
}

impl TxHandler for NFTokenBurn {
    fn preflight(&self) -> Result<(), ResultCode> {
        Ok(())
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<(), ResultCode> {
        let owner = self.owner.unwrap_or(self.account);

        if owner != self.account {
            if self.token_id.issuer() != self.account {
                return Err(ResultCode::TecNoPermission);
            }
            if !self.token_id.flags().is_burnable() {
                return Err(ResultCode::TecNoPermission);
            }
        }

        let sells_dir = keylet::nft_sells(self.token_id);
        let buys_dir = keylet::nft_buys(self.token_id);

        if !ctx.rules.fix_v1_2() {
            let mut total = 0usize;
            directory::for_each(ctx.view, sells_dir, |_| total += 1);
            directory::for_each(ctx.view, buys_dir, |_| total += 1);
            if total > MAX_OFFERS_TO_DELETE {
                return Err(ResultCode::TefTooBig);
            }
        }

        let delta = nft_page::remove_token(ctx.view, owner, self.token_id, ctx.rules.fix_page_links())
            .map_err(ResultCode::from)?;

        if owner == self.account {
            ctx.adjust_owner_count(delta.0);
        } else {
            adjust_other_owner_count(ctx, owner, delta.0)?;
        }

        remove_offers(ctx, sells_dir, buys_dir)?;

        let issuer = self.token_id.issuer();
        if issuer == ctx.account_id {
            ctx.account.burned_nftokens = ctx.account.burned_nftokens.saturating_add(1);
        } else {
            let issuer_key = keylet::account(issuer);
            let mut issuer_root = ctx
                .view
                .read(issuer_key)
                .ok()
                .and_then(|e| e.as_account_root().cloned())
                .ok_or(ResultCode::TefInternal)?;
            issuer_root.burned_nftokens = issuer_root.burned_nftokens.saturating_add(1);
            ctx.view
                .update(issuer_key, LedgerEntry::AccountRoot(issuer_root))
                .map_err(|_| ResultCode::TefInternal)?;
        }

        Ok(())
    }
}

fn adjust_other_owner_count(
    ctx: &mut ApplyContext,
    owner: AccountID,
    delta: i32,
) -> Result<(), ResultCode> {
    let owner_key = keylet::account(owner);
    let mut owner_root = ctx
        .view
        .read(owner_key)
        .ok()
        .and_then(|e| e.as_account_root().cloned())
        .ok_or(ResultCode::TefInternal)?;
    if delta > 0 {
        owner_root.owner_count += delta as u32;
    } else {
        owner_root.owner_count = owner_root.owner_count.saturating_sub((-delta) as u32);
    }
    ctx.view
        .update(owner_key, LedgerEntry::AccountRoot(owner_root))
        .map_err(|_| ResultCode::TefInternal)
}

/// Tears down outstanding offers for a token that is about to be burned,
/// refunding the reserve each offer's owner was carrying for it. Sell offers
/// are processed before buy offers, capped at `MAX_OFFERS_TO_DELETE` combined
/// so a token with an unbounded offer book can't make a burn unbounded.
fn remove_offers(ctx: &mut ApplyContext, sells_dir: Hash256, buys_dir: Hash256) -> Result<(), ResultCode> {
    let mut offer_keys: Vec<(Hash256, Hash256)> = Vec::new();
    for dir_root in [sells_dir, buys_dir] {
        if offer_keys.len() >= MAX_OFFERS_TO_DELETE {
            break;
        }
        let mut collected = Vec::new();
        directory::for_each(ctx.view, dir_root, |key| collected.push(key));
        for key in collected {
            if offer_keys.len() >= MAX_OFFERS_TO_DELETE {
                break;
            }
            offer_keys.push((dir_root, key));
        }
    }

    for (dir_root, offer_key) in offer_keys {
        let offer = match ctx
            .view
            .read(offer_key)
            .ok()
            .and_then(|e| e.as_nftoken_offer().cloned())
        {
            Some(offer) => offer,
            None => continue,
        };

        let owner_dir = keylet::owner_dir(offer.owner);
        directory::remove(ctx.view, owner_dir, offer.owner_node, offer_key, true)
            .map_err(ResultCode::from)?;
        directory::remove(ctx.view, dir_root, offer.token_directory_node, offer_key, false)
            .map_err(ResultCode::from)?;
        ctx.view.erase(offer_key).map_err(|_| ResultCode::TefInternal)?;

        if offer.owner == ctx.account_id {
            ctx.adjust_owner_count(-1);
        } else {
            adjust_other_owner_count(ctx, offer.owner, -1)?;
        }
    }
    Ok(())
}
