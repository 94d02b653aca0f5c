//! The three asset representations a value-transfer operation can move:
//! native drops, IOU balances, and MPT units.

use crate::types::account_id::AccountID;
use crate::types::currency::Currency;
use crate::types::iou_amount::IouAmount;
use crate::types::mpt_id::MptId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    /// XRP, denominated in drops (1 XRP = 1,000,000 drops).
    Native { drops: i64 },
    IOU {
        amount: IouAmount,
        issuer: AccountID,
        currency: Currency,
    },
    MPT {
        amount: u64,
        mpt_id: MptId,
    },
}

impl Amount {
    pub fn is_zero(&self) -> bool {
        match self {
            Amount::Native { drops } => *drops == 0,
            Amount::IOU { amount, .. } => amount.is_zero(),
            Amount::MPT { amount, .. } => *amount == 0,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Amount::Native { drops } => *drops < 0,
            Amount::IOU { amount, .. } => amount.is_negative(),
            Amount::MPT { .. } => false,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Amount::Native { .. })
    }

    /// True when `other` denotes the same currency/issuer (for IOU) or the
    /// same issuance (for MPT) or is also native.
    pub fn same_asset(&self, other: &Amount) -> bool {
        match (self, other) {
            (Amount::Native { .. }, Amount::Native { .. }) => true,
            (
                Amount::IOU {
                    issuer: i1,
                    currency: c1,
                    ..
                },
                Amount::IOU {
                    issuer: i2,
                    currency: c2,
                    ..
                },
            ) => i1 == i2 && c1 == c2,
            (Amount::MPT { mpt_id: m1, .. }, Amount::MPT { mpt_id: m2, .. }) => m1 == m2,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_zero_detection() {
        assert!(Amount::Native { drops: 0 }.is_zero());
        assert!(!Amount::Native { drops: 1 }.is_zero());
    }

    #[test]
    fn same_asset_requires_matching_issuer_and_currency() {
        let issuer = AccountID::from([1u8; 20]);
        let other_issuer = AccountID::from([2u8; 20]);
        let usd = Currency::from(*b"USD");
        let a = Amount::IOU {
            amount: IouAmount::ZERO,
            issuer,
            currency: usd,
        };
        let b = Amount::IOU {
            amount: IouAmount::ZERO,
            issuer,
            currency: usd,
        };
        let c = Amount::IOU {
            amount: IouAmount::ZERO,
            issuer: other_issuer,
            currency: usd,
        };
        assert!(a.same_asset(&b));
        assert!(!a.same_asset(&c));
    }

    #[test]
    fn native_and_iou_are_never_the_same_asset() {
        let native = Amount::Native { drops: 5 };
        let iou = Amount::IOU {
            amount: IouAmount::ZERO,
            issuer: AccountID::ZERO,
            currency: Currency::from(*b"USD"),
        };
        assert!(!native.same_asset(&iou));
    }
}
