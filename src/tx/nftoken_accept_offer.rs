//! `NFTokenAcceptOffer`: spec §4.6.5, covering direct-sell, direct-buy, and
//! brokered acceptance.

use crate::directory;
use crate::keylet;
use crate::ledger::entries::{LedgerEntry, NFTokenOffer};
use crate::nft_page;
use crate::result::ResultCode;
use crate::tx::{ApplyContext, TxHandler};
use crate::types::account_id::AccountID;
use crate::types::amount::Amount;
use crate::types::hash::Hash256;
use crate::types::iou_amount::IouAmount;
use crate::types::nft_id::TRANSFER_FEE_DENOMINATOR;
use crate::value_transfer;

pub struct NFTokenAcceptOffer {
    pub account: AccountID,
    pub sell_offer_id: Option<Hash256>,
    pub buy_offer_id: Option<Hash256>,
    pub broker_fee: Option<Amount>,
}

impl TxHandler for NFTokenAcceptOffer {
    fn preflight(&self) -> Result<(), ResultCode> {
        if self.sell_offer_id.is_none() && self.buy_offer_id.is_none() {
            return Err(ResultCode::TemMalformed);
        }
        let brokered = self.sell_offer_id.is_some() && self.buy_offer_id.is_some();
        if self.broker_fee.is_some() && !brokered {
            return Err(ResultCode::TemMalformed);
        }
        if let Some(fee) = &self.broker_fee {
            if fee.is_negative() {
                return Err(ResultCode::TemBadAmount);
            }
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<(), ResultCode> {
        match (self.sell_offer_id, self.buy_offer_id) {
            (Some(sell_key), None) => self.direct_sell(ctx, sell_key),
            (None, Some(buy_key)) => self.direct_buy(ctx, buy_key),
            (Some(sell_key), Some(buy_key)) => self.brokered(ctx, sell_key, buy_key),
            (None, None) => Err(ResultCode::TemMalformed),
        }
    }
}

fn read_offer(ctx: &ApplyContext, key: Hash256) -> Result<NFTokenOffer, ResultCode> {
    ctx.view
        .read(key)
        .ok()
        .and_then(|e| e.as_nftoken_offer().cloned())
        .ok_or(ResultCode::TecNoEntry)
}

fn check_not_expired(ctx: &ApplyContext, offer: &NFTokenOffer) -> Result<(), ResultCode> {
    if offer.expiration.is_some_and(|e| e <= ctx.config.parent_close_time) {
        return Err(ResultCode::TecExpired);
    }
    Ok(())
}

/// Compares the numeric value of two amounts already known to share an
/// asset (same currency/issuer, or both native, or both the same MPT).
fn amount_value_lt(a: &Amount, b: &Amount) -> bool {
    match (a, b) {
        (Amount::Native { drops: da }, Amount::Native { drops: db }) => da < db,
        (Amount::IOU { amount: ia, .. }, Amount::IOU { amount: ib, .. }) => ia < ib,
        (Amount::MPT { amount: ma, .. }, Amount::MPT { amount: mb, .. }) => ma < mb,
        _ => false,
    }
}

/// True if `sell + fee` would exceed `buy`, meaning the broker is trying to
/// keep more than the buy/sell spread allows.
fn broker_fee_exceeds_spread(buy: &Amount, sell: &Amount, fee: &Amount) -> bool {
    match (buy, sell, fee) {
        (Amount::Native { drops: b }, Amount::Native { drops: s }, Amount::Native { drops: f }) => {
            match s.checked_add(*f) {
                Some(total) => *b < total,
                None => true,
            }
        }
        (Amount::IOU { amount: b, .. }, Amount::IOU { amount: s, .. }, Amount::IOU { amount: f, .. }) => {
            match s.checked_add(f) {
                Some(total) => *b < total,
                None => true,
            }
        }
        (Amount::MPT { amount: b, .. }, Amount::MPT { amount: s, .. }, Amount::MPT { amount: f, .. }) => {
            match s.checked_add(*f) {
                Some(total) => *b < total,
                None => true,
            }
        }
        _ => true,
    }
}

/// Removes an offer's directory bookkeeping and ledger entry, refunding the
/// reserve it was holding to its owner (which may or may not be the
/// submitter).
fn tear_down_offer(ctx: &mut ApplyContext, key: Hash256, offer: &NFTokenOffer) -> Result<(), ResultCode> {
    let token_dir = if offer.is_sell_offer() {
        keylet::nft_sells(offer.token_id)
    } else {
        keylet::nft_buys(offer.token_id)
    };
    let owner_dir = keylet::owner_dir(offer.owner);
    directory::remove(ctx.view, owner_dir, offer.owner_node, key, true).map_err(ResultCode::from)?;
    directory::remove(ctx.view, token_dir, offer.token_directory_node, key, false).map_err(ResultCode::from)?;
    ctx.view.erase(key).map_err(|_| ResultCode::TefInternal)?;

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
    Ok(())
}

fn settle(ctx: &mut ApplyContext, from: AccountID, to: AccountID, amount: &Amount) -> Result<(), ResultCode> {
    if amount.is_zero() {
        return Ok(());
    }
    let touches_self = from == ctx.account_id || to == ctx.account_id;
    if touches_self {
        ctx.push_self();
    }
    let result = value_transfer::pay_amount(ctx.view, ctx.rules, from, to, amount).map_err(ResultCode::from);
    if touches_self {
        ctx.pull_self();
    }
    result
}

fn scale_rounding_up_u64(value: u64, numerator: u64, denominator: u64) -> u64 {
    let scaled = value as u128 * numerator as u128;
    let mut quotient = scaled / denominator as u128;
    if scaled % denominator as u128 != 0 {
        quotient += 1;
    }
    quotient as u64
}

/// The issuer's cut of `amount` at `transfer_fee` (numerator over
/// `TRANSFER_FEE_DENOMINATOR`), rounded up.
fn transfer_fee_cut(amount: &Amount, transfer_fee: u16) -> Amount {
    match *amount {
        Amount::Native { drops } => Amount::Native {
            drops: scale_rounding_up_u64(drops as u64, transfer_fee as u64, TRANSFER_FEE_DENOMINATOR as u64) as i64,
        },
        Amount::IOU { amount, issuer, currency } => Amount::IOU {
            amount: amount.scale_rounding_up(transfer_fee as u64, TRANSFER_FEE_DENOMINATOR as u64),
            issuer,
            currency,
        },
        Amount::MPT { amount, mpt_id } => Amount::MPT {
            amount: scale_rounding_up_u64(amount, transfer_fee as u64, TRANSFER_FEE_DENOMINATOR as u64),
            mpt_id,
        },
    }
}

/// `a - b`, assuming both share the same asset (as `transfer_fee_cut`
/// guarantees for its output against its input).
fn amount_sub(a: &Amount, b: &Amount) -> Amount {
    match (*a, *b) {
        (Amount::Native { drops: da }, Amount::Native { drops: db }) => Amount::Native { drops: da - db },
        (Amount::IOU { amount: ia, issuer, currency }, Amount::IOU { amount: ib, .. }) => Amount::IOU {
            amount: ia.checked_sub(&ib).unwrap_or(IouAmount::ZERO),
            issuer,
            currency,
        },
        (Amount::MPT { amount: ma, mpt_id }, Amount::MPT { amount: mb, .. }) => Amount::MPT {
            amount: ma.saturating_sub(mb),
            mpt_id,
        },
        _ => *a,
    }
}

/// Pays `amount` from `payer` to `payee`, routing the NFT transfer-fee cut to
/// `issuer` first unless the issuer is one of the two parties (who would
/// otherwise just be paying themselves).
fn settle_with_fee(
    ctx: &mut ApplyContext,
    payer: AccountID,
    payee: AccountID,
    issuer: AccountID,
    amount: &Amount,
    transfer_fee: u16,
) -> Result<(), ResultCode> {
    if transfer_fee == 0 || issuer == payer || issuer == payee {
        return settle(ctx, payer, payee, amount);
    }
    let cut = transfer_fee_cut(amount, transfer_fee);
    let remainder = amount_sub(amount, &cut);
    settle(ctx, payer, issuer, &cut)?;
    settle(ctx, payer, payee, &remainder)
}

/// Under `fix-enforce-nftoken-trustline-v2`, checks trust-line authorization
/// for every account that would touch an IOU-denominated sale: buyer, seller,
/// the NFT issuer (when a transfer fee applies and it differs from the IOU
/// issuer), and the broker-fee recipient, if any.
fn check_iou_preclaim(
    ctx: &ApplyContext,
    amount: &Amount,
    buyer: AccountID,
    seller: AccountID,
    nft_issuer: AccountID,
    transfer_fee: u16,
    broker: Option<AccountID>,
) -> Result<(), ResultCode> {
    let (iou_issuer, currency) = match *amount {
        Amount::IOU { issuer, currency, .. } => (issuer, currency),
        _ => return Ok(()),
    };
    let mut parties = vec![buyer, seller];
    if transfer_fee > 0 && nft_issuer != iou_issuer {
        parties.push(nft_issuer);
    }
    if let Some(broker) = broker {
        parties.push(broker);
    }
    for party in parties {
        let authorized = value_transfer::check_trustline_authorized(ctx.view, iou_issuer, party, currency)
            .map_err(ResultCode::from)?;
        if !authorized {
            return Err(ResultCode::TecNoAuth);
        }
    }
    Ok(())
}

/// Moves the token from `seller` to `buyer`, refunding the page-occupancy
/// delta to whichever owner isn't the submitter via direct view mutation.
fn transfer_token(
    ctx: &mut ApplyContext,
    seller: AccountID,
    buyer: AccountID,
    offer: &NFTokenOffer,
) -> Result<(), ResultCode> {
    let (from_delta, to_delta) = nft_page::transfer_token(
        ctx.view,
        seller,
        buyer,
        offer.token_id,
        None,
        ctx.rules.fix_page_links(),
    )
    .map_err(ResultCode::from)?;

    for (owner, delta) in [(seller, from_delta.0), (buyer, to_delta.0)] {
        if delta == 0 {
            continue;
        }
        if owner == ctx.account_id {
            ctx.adjust_owner_count(delta);
        } else {
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
                .map_err(|_| ResultCode::TefInternal)?;
        }
    }
    Ok(())
}

impl NFTokenAcceptOffer {
    fn direct_sell(&self, ctx: &mut ApplyContext, sell_key: Hash256) -> Result<(), ResultCode> {
        let offer = read_offer(ctx, sell_key)?;
        if !offer.is_sell_offer() {
            return Err(ResultCode::TecNftokenOfferTypeMismatch);
        }
        check_not_expired(ctx, &offer)?;
        if offer.owner == self.account {
            return Err(ResultCode::TecCantAcceptOwnNftokenOffer);
        }
        if let Some(destination) = offer.destination {
            if destination != self.account {
                return Err(ResultCode::TecNoPermission);
            }
        }

        let seller = offer.owner;
        let buyer = self.account;
        let issuer = offer.token_id.issuer();
        let fee = offer.token_id.transfer_fee();
        if ctx.rules.enforce_trustline_v2() {
            check_iou_preclaim(ctx, &offer.amount, buyer, seller, issuer, fee, None)?;
        }
        settle_with_fee(ctx, buyer, seller, issuer, &offer.amount, fee)?;
        transfer_token(ctx, seller, buyer, &offer)?;
        tear_down_offer(ctx, sell_key, &offer)
    }

    fn direct_buy(&self, ctx: &mut ApplyContext, buy_key: Hash256) -> Result<(), ResultCode> {
        let offer = read_offer(ctx, buy_key)?;
        if offer.is_sell_offer() {
            return Err(ResultCode::TecNftokenOfferTypeMismatch);
        }
        check_not_expired(ctx, &offer)?;
        if offer.owner == self.account {
            return Err(ResultCode::TecCantAcceptOwnNftokenOffer);
        }

        nft_page::find_token(ctx.view, self.account, offer.token_id).ok_or(ResultCode::TecNoEntry)?;

        let buyer = offer.owner;
        let seller = self.account;
        let issuer = offer.token_id.issuer();
        let fee = offer.token_id.transfer_fee();
        if ctx.rules.enforce_trustline_v2() {
            check_iou_preclaim(ctx, &offer.amount, buyer, seller, issuer, fee, None)?;
        }
        settle_with_fee(ctx, buyer, seller, issuer, &offer.amount, fee)?;
        transfer_token(ctx, seller, buyer, &offer)?;
        tear_down_offer(ctx, buy_key, &offer)
    }

    fn brokered(&self, ctx: &mut ApplyContext, sell_key: Hash256, buy_key: Hash256) -> Result<(), ResultCode> {
        let sell_offer = read_offer(ctx, sell_key)?;
        let buy_offer = read_offer(ctx, buy_key)?;
        if !sell_offer.is_sell_offer() || buy_offer.is_sell_offer() {
            return Err(ResultCode::TecNftokenOfferTypeMismatch);
        }
        if sell_offer.token_id != buy_offer.token_id {
            return Err(ResultCode::TecNftokenBuySellMismatch);
        }
        check_not_expired(ctx, &sell_offer)?;
        check_not_expired(ctx, &buy_offer)?;
        if sell_offer.owner == buy_offer.owner {
            return Err(ResultCode::TecCantAcceptOwnNftokenOffer);
        }
        if !sell_offer.amount.same_asset(&buy_offer.amount) {
            return Err(ResultCode::TecNftokenBuySellMismatch);
        }
        if amount_value_lt(&buy_offer.amount, &sell_offer.amount) {
            return Err(ResultCode::TecInsufficientPayment);
        }
        if let Some(destination) = sell_offer.destination {
            if destination != buy_offer.owner {
                return Err(ResultCode::TecNoPermission);
            }
        }

        let seller = sell_offer.owner;
        let buyer = buy_offer.owner;
        let issuer = sell_offer.token_id.issuer();
        let fee_rate = sell_offer.token_id.transfer_fee();

        if let Some(fee) = &self.broker_fee {
            if !fee.same_asset(&sell_offer.amount) {
                return Err(ResultCode::TemMalformed);
            }
            if broker_fee_exceeds_spread(&buy_offer.amount, &sell_offer.amount, fee) {
                return Err(ResultCode::TecInsufficientPayment);
            }
        }

        if ctx.rules.enforce_trustline_v2() {
            check_iou_preclaim(
                ctx,
                &buy_offer.amount,
                buyer,
                seller,
                issuer,
                fee_rate,
                Some(self.account),
            )?;
        }

        let proceeds = match &self.broker_fee {
            Some(fee) if !fee.is_zero() => {
                settle(ctx, buyer, self.account, fee)?;
                amount_sub(&buy_offer.amount, fee)
            }
            _ => buy_offer.amount,
        };
        settle_with_fee(ctx, buyer, seller, issuer, &proceeds, fee_rate)?;

        transfer_token(ctx, seller, buyer, &sell_offer)?;
        tear_down_offer(ctx, sell_key, &sell_offer)?;
        tear_down_offer(ctx, buy_key, &buy_offer)
    }
}
