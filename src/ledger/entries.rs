//! Typed ledger entries. Field names follow the public XRPL ledger-object
//! schema, matching the naming used by the client-side models in
//! `other_examples/` (e.g. `MintedNFTokens`, `TransferRate`) translated to
//! idiomatic snake_case.

use crate::types::account_id::AccountID;
use crate::types::amount::Amount;
use crate::types::currency::Currency;
use crate::types::hash::{Hash192, Hash256};
use crate::types::mpt_id::MptId;
use crate::types::nft_id::NFTokenID;

pub mod account_root_flags {
    pub const DEFAULT_RIPPLE: u32 = 0x0080_0000;
    pub const REQUIRE_AUTH: u32 = 0x0004_0000;
    pub const DISALLOW_XRP: u32 = 0x0008_0000;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRoot {
    pub account: AccountID,
    pub balance: i64,
    pub owner_count: u32,
    pub sequence: u32,
    pub flags: u32,
    pub minted_nftokens: u32,
    pub burned_nftokens: u32,
    pub nftoken_minter: Option<AccountID>,
    pub transfer_rate: u32,
}

impl AccountRoot {
    pub fn has_default_ripple(&self) -> bool {
        self.flags & account_root_flags::DEFAULT_RIPPLE != 0
    }

    pub fn has_require_auth(&self) -> bool {
        self.flags & account_root_flags::REQUIRE_AUTH != 0
    }
}

pub mod ripple_state_flags {
    pub const LOW_RESERVE: u32 = 0x0001_0000;
    pub const HIGH_RESERVE: u32 = 0x0002_0000;
    pub const LOW_AUTH: u32 = 0x0004_0000;
    pub const HIGH_AUTH: u32 = 0x0008_0000;
    pub const LOW_NO_RIPPLE: u32 = 0x0010_0000;
    pub const HIGH_NO_RIPPLE: u32 = 0x0020_0000;
}

/// A trust line, always stored with the numerically lower `AccountID` as the
/// "low" side. A positive `balance` means the low account holds the IOU
/// obligation (the high account owes the low account).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RippleState {
    pub low: AccountID,
    pub high: AccountID,
    pub currency: Currency,
    pub balance: crate::types::iou_amount::IouAmount,
    pub low_limit: crate::types::iou_amount::IouAmount,
    pub high_limit: crate::types::iou_amount::IouAmount,
    pub flags: u32,
    pub low_node: u64,
    pub high_node: u64,
}

impl RippleState {
    pub fn is_low(&self, account: AccountID) -> bool {
        account == self.low
    }

    pub fn reserve_flag_for(&self, account: AccountID) -> u32 {
        if self.is_low(account) {
            ripple_state_flags::LOW_RESERVE
        } else {
            ripple_state_flags::HIGH_RESERVE
        }
    }

    pub fn auth_flag_for(&self, account: AccountID) -> u32 {
        if self.is_low(account) {
            ripple_state_flags::LOW_AUTH
        } else {
            ripple_state_flags::HIGH_AUTH
        }
    }

    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
}

/// A directory page: a fixed-capacity set of entry keys plus linked-list
/// pointers to the previous and next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    pub owner: AccountID,
    pub indexes: Vec<Hash256>,
    pub index_previous: Option<Hash256>,
    pub index_next: Option<Hash256>,
}

pub const DIRECTORY_PAGE_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NFTokenEntry {
    pub token_id: NFTokenID,
    pub uri: Option<Vec<u8>>,
}

/// Up to 32 NFTs, sorted by page key then full token ID, plus linked-list
/// pointers to the previous and next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NFTokenPage {
    pub owner: AccountID,
    pub tokens: Vec<NFTokenEntry>,
    pub previous_page_min: Option<Hash256>,
    pub next_page_min: Option<Hash256>,
}

pub const NFTOKEN_PAGE_CAPACITY: usize = 32;

pub mod nftoken_offer_flags {
    pub const SELL_NFTOKEN: u32 = 0x0000_0001;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NFTokenOffer {
    pub owner: AccountID,
    pub token_id: NFTokenID,
    pub amount: Amount,
    pub flags: u32,
    pub destination: Option<AccountID>,
    pub expiration: Option<u32>,
    pub owner_node: u64,
    pub token_directory_node: u64,
}

impl NFTokenOffer {
    pub fn is_sell_offer(&self) -> bool {
        self.flags & nftoken_offer_flags::SELL_NFTOKEN != 0
    }
}

pub mod mpt_issuance_flags {
    pub const CAN_LOCK: u32 = 0x0000_0001;
    pub const REQUIRE_AUTH: u32 = 0x0000_0002;
    pub const CAN_ESCROW: u32 = 0x0000_0004;
    pub const CAN_TRADE: u32 = 0x0000_0008;
    pub const CAN_TRANSFER: u32 = 0x0000_0010;
    pub const CAN_CLAWBACK: u32 = 0x0000_0020;
    pub const LOCKED: u32 = 0x0000_0040;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MPTokenIssuance {
    pub mpt_id: MptId,
    pub issuer: AccountID,
    pub sequence: u32,
    pub flags: u32,
    pub asset_scale: u8,
    pub transfer_fee: u16,
    pub maximum_amount: Option<u64>,
    pub outstanding_amount: u64,
    pub locked_amount: u64,
    pub metadata: Option<Vec<u8>>,
    pub owner_node: u64,
}

impl MPTokenIssuance {
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
}

pub mod mptoken_flags {
    pub const AUTHORIZED: u32 = 0x0000_0001;
    pub const LOCKED: u32 = 0x0000_0002;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MPToken {
    pub holder: AccountID,
    pub mpt_id: MptId,
    pub flags: u32,
    pub amount: u64,
    pub locked_amount: u64,
    pub owner_node: u64,
}

impl MPToken {
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
}

/// A stand-in for `Hash192` imports elsewhere in the crate that want the
/// issuance-ID type name rather than `MptId` directly.
pub type MPTokenIssuanceId = Hash192;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEntry {
    AccountRoot(AccountRoot),
    RippleState(RippleState),
    DirectoryNode(DirectoryNode),
    NFTokenPage(NFTokenPage),
    NFTokenOffer(NFTokenOffer),
    MPTokenIssuance(MPTokenIssuance),
    MPToken(MPToken),
}

macro_rules! entry_accessors {
    ($variant:ident, $ty:ty, $getter:ident, $getter_mut:ident) => {
        impl LedgerEntry {
            pub fn $getter(&self) -> Option<&$ty> {
                match self {
                    LedgerEntry::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            pub fn $getter_mut(&mut self) -> Option<&mut $ty> {
                match self {
                    LedgerEntry::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

entry_accessors!(AccountRoot, AccountRoot, as_account_root, as_account_root_mut);
entry_accessors!(RippleState, RippleState, as_ripple_state, as_ripple_state_mut);
entry_accessors!(
    DirectoryNode,
    DirectoryNode,
    as_directory_node,
    as_directory_node_mut
);
entry_accessors!(NFTokenPage, NFTokenPage, as_nftoken_page, as_nftoken_page_mut);
entry_accessors!(
    NFTokenOffer,
    NFTokenOffer,
    as_nftoken_offer,
    as_nftoken_offer_mut
);
entry_accessors!(
    MPTokenIssuance,
    MPTokenIssuance,
    as_mpt_issuance,
    as_mpt_issuance_mut
);
entry_accessors!(MPToken, MPToken, as_mptoken, as_mptoken_mut);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_root_flag_helpers() {
        let root = AccountRoot {
            account: AccountID::ZERO,
            balance: 0,
            owner_count: 0,
            sequence: 0,
            flags: account_root_flags::DEFAULT_RIPPLE,
            minted_nftokens: 0,
            burned_nftokens: 0,
            nftoken_minter: None,
            transfer_rate: 1_000_000_000,
        };
        assert!(root.has_default_ripple());
        assert!(!root.has_require_auth());
    }

    #[test]
    fn ripple_state_reserve_flag_depends_on_side() {
        let low = AccountID::from([1u8; 20]);
        let high = AccountID::from([2u8; 20]);
        let state = RippleState {
            low,
            high,
            currency: Currency::from(*b"USD"),
            balance: crate::types::iou_amount::IouAmount::ZERO,
            low_limit: crate::types::iou_amount::IouAmount::ZERO,
            high_limit: crate::types::iou_amount::IouAmount::ZERO,
            flags: 0,
            low_node: 0,
            high_node: 0,
        };
        assert_eq!(state.reserve_flag_for(low), ripple_state_flags::LOW_RESERVE);
        assert_eq!(
            state.reserve_flag_for(high),
            ripple_state_flags::HIGH_RESERVE
        );
    }

    #[test]
    fn ledger_entry_accessor_returns_none_for_wrong_variant() {
        let entry = LedgerEntry::MPToken(MPToken {
            holder: AccountID::ZERO,
            mpt_id: MptId::new(0, AccountID::ZERO),
            flags: 0,
            amount: 0,
            locked_amount: 0,
            owner_node: 0,
        });
        assert!(entry.as_account_root().is_none());
        assert!(entry.as_mptoken().is_some());
    }
}
