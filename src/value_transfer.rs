//! IOU value transfer: trust-line lookup/auto-create, transfer-rate
//! application, and authorization checks. Grounded in spec §4.5; the
//! arithmetic itself lives in [`crate::types::iou_amount`].

use crate::amendments::rules::RulesView;
use crate::directory;
use crate::error::{CoreError, CoreResult};
use crate::keylet;
use crate::ledger::entries::{LedgerEntry, RippleState, mptoken_flags, ripple_state_flags};
use crate::ledger::LedgerView;
use crate::types::account_id::AccountID;
use crate::types::amount::Amount;
use crate::types::currency::Currency;
use crate::types::iou_amount::{IouAmount, QUALITY_ONE};
use crate::types::mpt_id::MptId;

fn read_account_root(
    view: &dyn LedgerView,
    account: AccountID,
) -> CoreResult<crate::ledger::entries::AccountRoot> {
    let key = keylet::account(account);
    view.read(key)
        .ok()
        .and_then(|e| e.as_account_root().cloned())
        .ok_or(CoreError::EntryNotFound)
}

fn read_line(view: &dyn LedgerView, a: AccountID, b: AccountID, currency: Currency) -> Option<RippleState> {
    let key = keylet::line(a, b, currency);
    view.read(key).ok().and_then(|e| e.as_ripple_state().cloned())
}

/// Auto-creates the trust line between `sender` and `receiver` for
/// `currency`, with the initial balance reflecting `initial_credit` flowing
/// from `sender` to `receiver`. The receiver bears the reserve; `NoRipple`
/// is set independently on each side according to whether that account has
/// `DefaultRipple`.
pub fn auto_create_trust_line(
    view: &mut dyn LedgerView,
    sender: AccountID,
    receiver: AccountID,
    currency: Currency,
    initial_credit: IouAmount,
) -> CoreResult<()> {
    let (low, high) = if sender < receiver {
        (sender, receiver)
    } else {
        (receiver, sender)
    };

    let sender_is_low = sender == low;
    let balance = if sender_is_low {
        initial_credit.negate()
    } else {
        initial_credit
    };

    let mut flags = 0u32;
    let low_account = read_account_root(view, low)?;
    let high_account = read_account_root(view, high)?;
    if !low_account.has_default_ripple() {
        flags |= ripple_state_flags::LOW_NO_RIPPLE;
    }
    if !high_account.has_default_ripple() {
        flags |= ripple_state_flags::HIGH_NO_RIPPLE;
    }
    flags |= if receiver == low {
        ripple_state_flags::LOW_RESERVE
    } else {
        ripple_state_flags::HIGH_RESERVE
    };

    let state = RippleState {
        low,
        high,
        currency,
        balance,
        low_limit: IouAmount::ZERO,
        high_limit: IouAmount::ZERO,
        flags,
        low_node: 0,
        high_node: 0,
    };

    let key = keylet::line(low, high, currency);
    let low_dir = keylet::owner_dir(low);
    let high_dir = keylet::owner_dir(high);
    let low_node = directory::insert(view, low_dir, low, key)?;
    let high_node = directory::insert(view, high_dir, high, key)?;

    let mut state = state;
    state.low_node = low_node;
    state.high_node = high_node;

    view.insert(key, LedgerEntry::RippleState(state))
        .map_err(|_| CoreError::EntryAlreadyExists)?;

    let mut receiver_root = read_account_root(view, receiver)?;
    receiver_root.owner_count += 1;
    view.update(
        keylet::account(receiver),
        LedgerEntry::AccountRoot(receiver_root),
    )
    .map_err(|_| CoreError::EntryNotFound)
}

/// Moves `amount` of `currency` from `sender` to `receiver` over their trust
/// line, auto-creating it if absent. Balance sign follows the low/high
/// convention: subtract when `sender` is the low account, add otherwise.
pub fn ripple_credit(
    view: &mut dyn LedgerView,
    sender: AccountID,
    receiver: AccountID,
    currency: Currency,
    amount: IouAmount,
) -> CoreResult<()> {
    if amount.is_zero() {
        return Ok(());
    }
    let key = keylet::line(sender, receiver, currency);
    match read_line(view, sender, receiver, currency) {
        None => auto_create_trust_line(view, sender, receiver, currency, amount),
        Some(mut state) => {
            let delta = if state.is_low(sender) {
                amount.negate()
            } else {
                amount
            };
            state.balance = state
                .balance
                .checked_add(&delta)
                .ok_or(CoreError::Overflow)?;
            view.update(key, LedgerEntry::RippleState(state))
                .map_err(|_| CoreError::EntryNotFound)
        }
    }
}

/// True if `issuer`'s authorization policy allows `holder` to hold its IOU.
pub fn check_trustline_authorized(
    view: &dyn LedgerView,
    issuer: AccountID,
    holder: AccountID,
    currency: Currency,
) -> CoreResult<bool> {
    if issuer == holder {
        return Ok(true);
    }
    let issuer_root = read_account_root(view, issuer)?;
    if !issuer_root.has_require_auth() {
        return Ok(true);
    }
    match read_line(view, issuer, holder, currency) {
        None => Ok(false),
        Some(state) => Ok(state.has_flag(state.auth_flag_for(issuer))),
    }
}

/// Sends `amount` of an IOU from `from` to `to`. When neither party is the
/// issuer, the issuer's transfer rate is applied: `from` is charged the
/// amount scaled up (rounded up) and `to` receives exactly `amount`.
pub fn account_send_iou(
    view: &mut dyn LedgerView,
    from: AccountID,
    to: AccountID,
    issuer: AccountID,
    currency: Currency,
    amount: IouAmount,
) -> CoreResult<()> {
    if amount.is_zero() || from == to {
        return Ok(());
    }

    if from == issuer || to == issuer {
        return ripple_credit(view, from, to, currency, amount);
    }

    let issuer_root = read_account_root(view, issuer)?;
    let rate = issuer_root.transfer_rate;
    let charged = if rate == QUALITY_ONE {
        amount
    } else {
        amount.scale_rounding_up(rate as u64, QUALITY_ONE as u64)
    };

    ripple_credit(view, from, issuer, currency, charged)?;
    ripple_credit(view, issuer, to, currency, amount)
}

/// Wraps [`account_send_iou`] with a fund check on the payer. Under
/// `fix-non-fungible-tokens-v1-2` this is a post-hoc signum check: after the
/// transfer, neither party's resulting balance may be negative. Without the
/// amendment, the check instead runs before the transfer, reading the
/// payer's current trust-line balance directly (`account_holds` semantics,
/// no exception for the issuer itself).
pub fn pay_iou(
    view: &mut dyn LedgerView,
    rules: &RulesView,
    from: AccountID,
    to: AccountID,
    issuer: AccountID,
    currency: Currency,
    amount: IouAmount,
) -> CoreResult<()> {
    if rules.fix_v1_2() {
        account_send_iou(view, from, to, issuer, currency, amount)?;
        for account in [from, to] {
            if account == issuer {
                continue;
            }
            if let Some(state) = read_line(view, account, issuer, currency) {
                let account_balance = if state.is_low(account) {
                    state.balance
                } else {
                    state.balance.negate()
                };
                if account_balance.is_negative() {
                    return Err(CoreError::InsufficientFunds);
                }
            }
        }
        Ok(())
    } else {
        let held = match read_line(view, from, issuer, currency) {
            None => IouAmount::ZERO,
            Some(state) => {
                let balance = if state.is_low(from) {
                    state.balance
                } else {
                    state.balance.negate()
                };
                if balance.is_negative() { IouAmount::ZERO } else { balance }
            }
        };
        if held < amount {
            return Err(CoreError::InsufficientFunds);
        }
        account_send_iou(view, from, to, issuer, currency, amount)
    }
}

/// Moves native drops directly between two account balances, with no trust
/// line or transfer rate involved.
fn pay_native(view: &mut dyn LedgerView, from: AccountID, to: AccountID, drops: i64) -> CoreResult<()> {
    if drops == 0 {
        return Ok(());
    }
    let mut from_root = read_account_root(view, from)?;
    let mut to_root = read_account_root(view, to)?;
    from_root.balance = from_root
        .balance
        .checked_sub(drops)
        .ok_or(CoreError::InsufficientFunds)?;
    if from_root.balance < 0 {
        return Err(CoreError::InsufficientFunds);
    }
    to_root.balance = to_root.balance.checked_add(drops).ok_or(CoreError::Overflow)?;
    view.update(keylet::account(from), LedgerEntry::AccountRoot(from_root))
        .map_err(|_| CoreError::EntryNotFound)?;
    view.update(keylet::account(to), LedgerEntry::AccountRoot(to_root))
        .map_err(|_| CoreError::EntryNotFound)
}

/// Moves MPT units between two holders. Both sides must already hold an
/// `MPToken` object (created by `MPTokenAuthorize`); this function never
/// auto-creates one, unlike the trust-line IOU path.
fn pay_mpt(view: &mut dyn LedgerView, from: AccountID, to: AccountID, mpt_id: MptId, amount: u64) -> CoreResult<()> {
    if amount == 0 {
        return Ok(());
    }
    let issuance_key = keylet::mpt_issuance(mpt_id);
    let from_key = keylet::mpt_token(issuance_key, from);
    let to_key = keylet::mpt_token(issuance_key, to);

    let mut from_token = view
        .read(from_key)
        .ok()
        .and_then(|e| e.as_mptoken().cloned())
        .ok_or(CoreError::EntryNotFound)?;
    let mut to_token = view
        .read(to_key)
        .ok()
        .and_then(|e| e.as_mptoken().cloned())
        .ok_or(CoreError::NotAuthorized)?;
    if !to_token.has_flag(mptoken_flags::AUTHORIZED) {
        return Err(CoreError::NotAuthorized);
    }

    from_token.amount = from_token
        .amount
        .checked_sub(amount)
        .ok_or(CoreError::InsufficientFunds)?;
    to_token.amount = to_token.amount.checked_add(amount).ok_or(CoreError::Overflow)?;

    view.update(from_key, LedgerEntry::MPToken(from_token))
        .map_err(|_| CoreError::EntryNotFound)?;
    view.update(to_key, LedgerEntry::MPToken(to_token))
        .map_err(|_| CoreError::EntryNotFound)
}

/// Dispatches a payment of any asset kind from `from` to `to`, used by the
/// NFT offer-acceptance handlers to settle a sale in whatever currency the
/// offer was denominated in.
pub fn pay_amount(
    view: &mut dyn LedgerView,
    rules: &RulesView,
    from: AccountID,
    to: AccountID,
    amount: &Amount,
) -> CoreResult<()> {
    match *amount {
        Amount::Native { drops } => pay_native(view, from, to, drops),
        Amount::IOU { amount, issuer, currency } => pay_iou(view, rules, from, to, issuer, currency, amount),
        Amount::MPT { amount, mpt_id } => pay_mpt(view, from, to, mpt_id, amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::entries::AccountRoot;
    use crate::ledger::memory::InMemoryLedgerView;
    use crate::types::iou_amount::MIN_MANTISSA;

    fn make_account(account: AccountID, default_ripple: bool) -> AccountRoot {
        AccountRoot {
            account,
            balance: 1_000_000_000,
            owner_count: 0,
            sequence: 1,
            flags: if default_ripple {
                crate::ledger::entries::account_root_flags::DEFAULT_RIPPLE
            } else {
                0
            },
            minted_nftokens: 0,
            burned_nftokens: 0,
            nftoken_minter: None,
            transfer_rate: QUALITY_ONE,
        }
    }

    fn seed(view: &mut InMemoryLedgerView, account: AccountID, default_ripple: bool) {
        view.insert(
            keylet::account(account),
            LedgerEntry::AccountRoot(make_account(account, default_ripple)),
        )
        .unwrap();
    }

    #[test]
    fn ripple_credit_auto_creates_trust_line_with_receiver_reserve() {
        let mut view = InMemoryLedgerView::new();
        let a = AccountID::from([1u8; 20]);
        let b = AccountID::from([2u8; 20]);
        seed(&mut view, a, true);
        seed(&mut view, b, true);
        let usd = Currency::from(*b"USD");
        let amount = IouAmount::new(MIN_MANTISSA, -14);

        ripple_credit(&mut view, a, b, usd, amount).unwrap();

        let b_root = read_account_root(&view, b).unwrap();
        assert_eq!(b_root.owner_count, 1);
        let a_root = read_account_root(&view, a).unwrap();
        assert_eq!(a_root.owner_count, 0);
    }

    #[test]
    fn send_then_reverse_credit_returns_balance_to_zero() {
        let mut view = InMemoryLedgerView::new();
        let a = AccountID::from([3u8; 20]);
        let b = AccountID::from([4u8; 20]);
        seed(&mut view, a, true);
        seed(&mut view, b, true);
        let usd = Currency::from(*b"USD");
        let amount = IouAmount::new(MIN_MANTISSA, -14);

        ripple_credit(&mut view, a, b, usd, amount).unwrap();
        ripple_credit(&mut view, b, a, usd, amount).unwrap();

        let state = read_line(&view, a, b, usd).unwrap();
        assert!(state.balance.is_zero());
    }

    #[test]
    fn transfer_rate_charges_sender_more_than_receiver_gets() {
        let mut view = InMemoryLedgerView::new();
        let issuer = AccountID::from([5u8; 20]);
        let sender = AccountID::from([6u8; 20]);
        let receiver = AccountID::from([7u8; 20]);
        seed(&mut view, sender, true);
        seed(&mut view, receiver, true);
        let mut issuer_root = make_account(issuer, true);
        issuer_root.transfer_rate = QUALITY_ONE + QUALITY_ONE / 10; // 10% fee
        view.insert(keylet::account(issuer), LedgerEntry::AccountRoot(issuer_root))
            .unwrap();
        let usd = Currency::from(*b"USD");
        let amount = IouAmount::new(MIN_MANTISSA, -14);

        account_send_iou(&mut view, sender, receiver, issuer, usd, amount).unwrap();

        let sender_issuer_line = read_line(&view, sender, issuer, usd).unwrap();
        let sender_balance = if sender_issuer_line.is_low(sender) {
            sender_issuer_line.balance
        } else {
            sender_issuer_line.balance.negate()
        };
        assert!(sender_balance.is_negative());
        assert!(sender_balance.negate() > amount);
    }

    #[test]
    fn issuer_side_transfer_has_no_rate_applied() {
        let mut view = InMemoryLedgerView::new();
        let issuer = AccountID::from([8u8; 20]);
        let holder = AccountID::from([9u8; 20]);
        seed(&mut view, holder, true);
        let mut issuer_root = make_account(issuer, true);
        issuer_root.transfer_rate = QUALITY_ONE * 2;
        view.insert(keylet::account(issuer), LedgerEntry::AccountRoot(issuer_root))
            .unwrap();
        let usd = Currency::from(*b"USD");
        let amount = IouAmount::new(MIN_MANTISSA, -14);

        account_send_iou(&mut view, issuer, holder, issuer, usd, amount).unwrap();
        let state = read_line(&view, issuer, holder, usd).unwrap();
        let holder_balance = if state.is_low(holder) {
            state.balance
        } else {
            state.balance.negate()
        };
        assert_eq!(holder_balance, amount);
    }

    #[test]
    fn authorization_required_when_issuer_requires_auth_and_no_line_exists() {
        let mut view = InMemoryLedgerView::new();
        let issuer = AccountID::from([10u8; 20]);
        let holder = AccountID::from([11u8; 20]);
        let mut issuer_root = make_account(issuer, true);
        issuer_root.flags |= crate::ledger::entries::account_root_flags::REQUIRE_AUTH;
        view.insert(keylet::account(issuer), LedgerEntry::AccountRoot(issuer_root))
            .unwrap();
        let usd = Currency::from(*b"USD");
        assert!(!check_trustline_authorized(&view, issuer, holder, usd).unwrap());
    }

    #[test]
    fn issuer_holding_its_own_currency_is_always_authorized() {
        let mut view = InMemoryLedgerView::new();
        let issuer = AccountID::from([12u8; 20]);
        seed(&mut view, issuer, true);
        let usd = Currency::from(*b"USD");
        assert!(check_trustline_authorized(&view, issuer, issuer, usd).unwrap());
    }

    #[test]
    fn pay_native_moves_drops_between_balances() {
        let mut view = InMemoryLedgerView::new();
        let a = AccountID::from([13u8; 20]);
        let b = AccountID::from([14u8; 20]);
        seed(&mut view, a, true);
        seed(&mut view, b, true);
        pay_native(&mut view, a, b, 1_000).unwrap();
        assert_eq!(read_account_root(&view, a).unwrap().balance, 999_999_000);
        assert_eq!(read_account_root(&view, b).unwrap().balance, 1_000_001_000);
    }

    #[test]
    fn pay_mpt_requires_recipient_authorization() {
        use crate::ledger::entries::MPToken;
        use crate::types::mpt_id::MptId;

        let mut view = InMemoryLedgerView::new();
        let holder_a = AccountID::from([15u8; 20]);
        let holder_b = AccountID::from([16u8; 20]);
        let issuer = AccountID::from([17u8; 20]);
        let mpt_id = MptId::new(1, issuer);
        let issuance_key = keylet::mpt_issuance(mpt_id);

        view.insert(
            keylet::mpt_token(issuance_key, holder_a),
            LedgerEntry::MPToken(MPToken {
                holder: holder_a,
                mpt_id,
                flags: crate::ledger::entries::mptoken_flags::AUTHORIZED,
                amount: 500,
                locked_amount: 0,
                owner_node: 0,
            }),
        )
        .unwrap();

        assert_eq!(
            pay_mpt(&mut view, holder_a, holder_b, mpt_id, 100),
            Err(CoreError::NotAuthorized)
        );

        view.insert(
            keylet::mpt_token(issuance_key, holder_b),
            LedgerEntry::MPToken(MPToken {
                holder: holder_b,
                mpt_id,
                flags: crate::ledger::entries::mptoken_flags::AUTHORIZED,
                amount: 0,
                locked_amount: 0,
                owner_node: 0,
            }),
        )
        .unwrap();
        pay_mpt(&mut view, holder_a, holder_b, mpt_id, 100).unwrap();
        assert_eq!(
            view.read(keylet::mpt_token(issuance_key, holder_b))
                .unwrap()
                .as_mptoken()
                .unwrap()
                .amount,
            100
        );
    }

    #[test]
    fn pre_v1_2_pay_iou_rejects_payer_with_no_funds() {
        use crate::amendments::rules::RulesView;

        let mut view = InMemoryLedgerView::new();
        let issuer = AccountID::from([18u8; 20]);
        let payer = AccountID::from([19u8; 20]);
        let payee = AccountID::from([20u8; 20]);
        seed(&mut view, payer, true);
        seed(&mut view, payee, true);
        let mut issuer_root = make_account(issuer, true);
        issuer_root.transfer_rate = QUALITY_ONE;
        view.insert(keylet::account(issuer), LedgerEntry::AccountRoot(issuer_root))
            .unwrap();
        let usd = Currency::from(*b"USD");
        let amount = IouAmount::new(MIN_MANTISSA, -14);

        let rules = RulesView::empty();
        assert_eq!(
            pay_iou(&mut view, &rules, payer, payee, issuer, usd, amount),
            Err(CoreError::InsufficientFunds)
        );
    }

    #[test]
    fn pre_v1_2_pay_iou_allows_issuer_as_payer_regardless_of_balance() {
        use crate::amendments::rules::RulesView;

        let mut view = InMemoryLedgerView::new();
        let issuer = AccountID::from([21u8; 20]);
        let holder = AccountID::from([22u8; 20]);
        seed(&mut view, holder, true);
        let mut issuer_root = make_account(issuer, true);
        issuer_root.transfer_rate = QUALITY_ONE;
        view.insert(keylet::account(issuer), LedgerEntry::AccountRoot(issuer_root))
            .unwrap();
        let usd = Currency::from(*b"USD");
        let amount = IouAmount::new(MIN_MANTISSA, -14);

        let rules = RulesView::empty();
        pay_iou(&mut view, &rules, issuer, holder, issuer, usd, amount).unwrap();
        let state = read_line(&view, issuer, holder, usd).unwrap();
        let holder_balance = if state.is_low(holder) {
            state.balance
        } else {
            state.balance.negate()
        };
        assert_eq!(holder_balance, amount);
    }
}
