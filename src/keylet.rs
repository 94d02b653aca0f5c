//! Pure keylet derivation: maps (entity type, identifiers) to the 256-bit
//! storage key the ledger view indexes entries by.
//!
//! Grounded in the teacher's `core/types/keylets.rs` function catalog and
//! naming (`account_keylet`, `check_keylet`, ...), but made pure: the teacher
//! delegates every keylet to a host FFI call (`unsafe { host::*_keylet(...) }`)
//! because a WASM guest cannot itself derive ledger storage keys. This crate
//! is the component that a host like that would call into, so it computes
//! the hash itself.
//!
//! Each non-page keylet mixes a one-byte *space* tag into the hash input so
//! that different entity types never collide even when the remaining input
//! happens to coincide (e.g. an `Account` keylet and an `OwnerDir` keylet for
//! the same `AccountID` land in disjoint namespaces).

use crate::types::account_id::AccountID;
use crate::types::currency::Currency;
use crate::types::hash::Hash256;
use crate::types::mpt_id::MptId;
use crate::types::nft_id::NFTokenID;
use sha2::{Digest, Sha512};

pub mod space {
    pub const ACCOUNT: u8 = b'a';
    pub const RIPPLE_STATE: u8 = b'r';
    pub const OWNER_DIR: u8 = b'O';
    pub const NFTOKEN_OFFER: u8 = b'q';
    pub const NFTOKEN_BUYS: u8 = b'h';
    pub const NFTOKEN_SELLS: u8 = b'i';
    pub const MPTOKEN_ISSUANCE: u8 = b'~';
    pub const MPTOKEN: u8 = b't';
}

fn sha512half(parts: &[&[u8]]) -> Hash256 {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[0..32]);
    Hash256::from(out)
}

pub fn account(id: AccountID) -> Hash256 {
    sha512half(&[&[space::ACCOUNT], id.as_bytes()])
}

/// Trust-line keylet, canonicalized so `line(a, b, c) == line(b, a, c)`: the
/// two account IDs are ordered before hashing.
pub fn line(a: AccountID, b: AccountID, currency: Currency) -> Hash256 {
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    sha512half(&[
        &[space::RIPPLE_STATE],
        low.as_bytes(),
        high.as_bytes(),
        currency.as_bytes(),
    ])
}

pub fn owner_dir(owner: AccountID) -> Hash256 {
    sha512half(&[&[space::OWNER_DIR], owner.as_bytes()])
}

pub fn nftoken_offer(account: AccountID, sequence: u32) -> Hash256 {
    sha512half(&[
        &[space::NFTOKEN_OFFER],
        account.as_bytes(),
        &sequence.to_be_bytes(),
    ])
}

pub fn nft_buys(token_id: NFTokenID) -> Hash256 {
    sha512half(&[&[space::NFTOKEN_BUYS], token_id.as_bytes()])
}

pub fn nft_sells(token_id: NFTokenID) -> Hash256 {
    sha512half(&[&[space::NFTOKEN_SELLS], token_id.as_bytes()])
}

pub fn mpt_issuance(mpt_id: MptId) -> Hash256 {
    sha512half(&[&[space::MPTOKEN_ISSUANCE], mpt_id.as_bytes()])
}

pub fn mpt_token(issuance_key: Hash256, holder: AccountID) -> Hash256 {
    sha512half(&[
        &[space::MPTOKEN],
        issuance_key.as_bytes(),
        holder.as_bytes(),
    ])
}

/// NFT page keys are constructed, not hashed: the low 20 bytes identify the
/// owner and the high 12 bytes carry the page's sort/partition key, so that
/// key ordering matches the intended page linked-list ordering.
fn nftoken_page_key(owner: AccountID, suffix: [u8; 12]) -> Hash256 {
    let mut bytes = [0u8; 32];
    bytes[0..20].copy_from_slice(owner.as_bytes());
    bytes[20..32].copy_from_slice(&suffix);
    Hash256::from(bytes)
}

pub fn nftoken_page_min(owner: AccountID) -> Hash256 {
    nftoken_page_key(owner, [0u8; 12])
}

pub fn nftoken_page_max(owner: AccountID) -> Hash256 {
    nftoken_page_key(owner, [0xFFu8; 12])
}

pub fn nftoken_page_for_token(owner: AccountID, token_id: NFTokenID) -> Hash256 {
    nftoken_page_key(owner, token_id.page_key())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_is_symmetric_in_its_two_accounts() {
        let a = AccountID::from([1u8; 20]);
        let b = AccountID::from([2u8; 20]);
        let usd = Currency::from(*b"USD");
        assert_eq!(line(a, b, usd), line(b, a, usd));
    }

    #[test]
    fn account_and_owner_dir_keylets_never_collide() {
        let a = AccountID::from([9u8; 20]);
        assert_ne!(account(a), owner_dir(a));
    }

    #[test]
    fn page_max_key_is_owner_bytes_then_all_ff() {
        let owner = AccountID::from([0x11; 20]);
        let key = nftoken_page_max(owner);
        assert_eq!(&key.as_bytes()[0..20], owner.as_bytes());
        assert_eq!(&key.as_bytes()[20..32], &[0xFF; 12]);
    }

    #[test]
    fn page_for_token_uses_the_tokens_page_key() {
        let owner = AccountID::from([0x22; 20]);
        let token = NFTokenID::derive(0, 0, owner, 7, 3);
        let key = nftoken_page_for_token(owner, token);
        assert_eq!(&key.as_bytes()[20..32], &token.page_key());
    }

    #[test]
    fn distinct_sequences_give_distinct_offer_keylets() {
        let account_id = AccountID::from([3u8; 20]);
        assert_ne!(
            nftoken_offer(account_id, 1),
            nftoken_offer(account_id, 2)
        );
    }

    #[test]
    fn mpt_issuance_keylet_is_deterministic() {
        let mpt_id = MptId::new(1, AccountID::from([4u8; 20]));
        assert_eq!(mpt_issuance(mpt_id), mpt_issuance(mpt_id));
    }
}
