//! NFTokenID derivation and field layout.
//!
//! ## NFTokenID Structure
//!
//! An NFTokenID is a 32-byte identifier with the following structure:
//!
//! ```text
//! 000B 0539 C35B55AA096BA6D87A6E6C965A6534150DC56E5E 12C5D09E 0000000C
//! +--- +--- +--------------------------------------- +------- +-------
//! |    |    |                                        |        |
//! |    |    |                                        |        └─> Sequence (32 bits)
//! |    |    |                                        └─> Ciphered taxon (32 bits)
//! |    |    └─> Issuer Address (160 bits / 20 bytes)
//! |    └─> Transfer Fee (16 bits)
//! └─> Flags (16 bits)
//! ```

use crate::types::account_id::{ACCOUNT_ID_SIZE, AccountID};

pub const NFT_ID_SIZE: usize = 32;

/// Denominator against which a token's stored `transfer_fee` is a numerator
/// (so a fee of 50000 is 50%).
pub const TRANSFER_FEE_DENOMINATOR: u32 = 100_000;

/// NFToken flags - see <https://xrpl.org/docs/references/protocol/data-types/nftoken>.
pub mod flags {
    /// The issuer (or an entity it authorizes) may destroy the token even if
    /// it does not currently hold it. The owner can always burn it.
    pub const BURNABLE: u16 = 0x0001;
    /// The token may only be bought or sold for XRP.
    pub const ONLY_XRP: u16 = 0x0002;
    /// Deprecated: automatically create trust lines to hold transfer fees.
    /// Invalid to set once `fix-remove-nftoken-auto-trustline` is enabled.
    pub const TRUST_LINE: u16 = 0x0004;
    /// The token may be transferred to accounts other than the issuer.
    pub const TRANSFERABLE: u16 = 0x0008;
    /// The token's URI may be changed by `NFTokenModify` (requires `DynamicNFT`).
    pub const MUTABLE: u16 = 0x0010;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NftFlags(u16);

impl NftFlags {
    #[inline]
    pub const fn new(flags: u16) -> Self {
        NftFlags(flags)
    }

    #[inline]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn is_burnable(&self) -> bool {
        self.0 & flags::BURNABLE != 0
    }

    #[inline]
    pub const fn is_only_xrp(&self) -> bool {
        self.0 & flags::ONLY_XRP != 0
    }

    #[inline]
    pub const fn is_trust_line(&self) -> bool {
        self.0 & flags::TRUST_LINE != 0
    }

    #[inline]
    pub const fn is_transferable(&self) -> bool {
        self.0 & flags::TRANSFERABLE != 0
    }

    #[inline]
    pub const fn is_mutable(&self) -> bool {
        self.0 & flags::MUTABLE != 0
    }
}

/// The multiplier and XOR constant used to scramble the taxon so that tokens
/// minted under the same taxon do not sort adjacently on an NFT page. The
/// operation is involutive: applying it twice with the same sequence number
/// returns the original value.
const TAXON_XOR_CONSTANT: u32 = 384_160_001;
const TAXON_MULTIPLIER: u32 = 2_357_503_715;

/// Scrambles (or unscrambles - the operation is its own inverse) a taxon
/// value against a token sequence number.
#[inline]
pub fn cipher_taxon(sequence: u32, taxon: u32) -> u32 {
    taxon ^ ((sequence ^ TAXON_XOR_CONSTANT).wrapping_mul(TAXON_MULTIPLIER))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(C)]
pub struct NFTokenID(pub [u8; NFT_ID_SIZE]);

impl NFTokenID {
    pub fn derive(
        flags: u16,
        transfer_fee: u16,
        issuer: AccountID,
        taxon: u32,
        sequence: u32,
    ) -> Self {
        let mut bytes = [0u8; NFT_ID_SIZE];
        bytes[0..2].copy_from_slice(&flags.to_be_bytes());
        bytes[2..4].copy_from_slice(&transfer_fee.to_be_bytes());
        bytes[4..24].copy_from_slice(issuer.as_bytes());
        bytes[24..28].copy_from_slice(&cipher_taxon(sequence, taxon).to_be_bytes());
        bytes[28..32].copy_from_slice(&sequence.to_be_bytes());
        NFTokenID(bytes)
    }

    pub fn flags(&self) -> NftFlags {
        NftFlags::new(u16::from_be_bytes([self.0[0], self.0[1]]))
    }

    pub fn transfer_fee(&self) -> u16 {
        u16::from_be_bytes([self.0[2], self.0[3]])
    }

    pub fn issuer(&self) -> AccountID {
        let mut account_bytes = [0u8; ACCOUNT_ID_SIZE];
        account_bytes.copy_from_slice(&self.0[4..24]);
        AccountID::from(account_bytes)
    }

    pub fn taxon(&self) -> u32 {
        let ciphered = u32::from_be_bytes([self.0[24], self.0[25], self.0[26], self.0[27]]);
        cipher_taxon(self.sequence(), ciphered)
    }

    pub fn sequence(&self) -> u32 {
        u32::from_be_bytes([self.0[28], self.0[29], self.0[30], self.0[31]])
    }

    /// The low 96 bits, used as the NFT page sort/partition key. Tokens
    /// sharing a page key must live on the same page.
    pub fn page_key(&self) -> [u8; 12] {
        let mut key = [0u8; 12];
        key.copy_from_slice(&self.0[20..32]);
        key
    }

    pub fn as_bytes(&self) -> &[u8; NFT_ID_SIZE] {
        &self.0
    }
}

impl From<[u8; NFT_ID_SIZE]> for NFTokenID {
    fn from(value: [u8; NFT_ID_SIZE]) -> Self {
        NFTokenID(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cipher_is_involutive() {
        for seq in [0u32, 1, 7, 384_160_001, u32::MAX] {
            for taxon in [0u32, 7, 42, u32::MAX] {
                let ciphered = cipher_taxon(seq, taxon);
                assert_eq!(cipher_taxon(seq, ciphered), taxon);
            }
        }
    }

    #[test]
    fn derive_round_trips_every_field() {
        let issuer = AccountID::from([0x42; 20]);
        let id = NFTokenID::derive(0x0009, 0x01F4, issuer, 7, 0);
        assert_eq!(id.flags().as_u16(), 0x0009);
        assert!(id.flags().is_burnable());
        assert!(id.flags().is_transferable());
        assert_eq!(id.transfer_fee(), 500);
        assert_eq!(id.issuer(), issuer);
        assert_eq!(id.taxon(), 7);
        assert_eq!(id.sequence(), 0);
    }

    #[test]
    fn byte_layout_matches_scenario_1() {
        let issuer = AccountID::from([0xAB; 20]);
        let id = NFTokenID::derive(0x0009, 0x01F4, issuer, 7, 0);
        let bytes = id.as_bytes();
        assert_eq!(&bytes[0..2], &[0x00, 0x09]);
        assert_eq!(&bytes[2..4], &[0x01, 0xF4]);
        assert_eq!(&bytes[4..24], &[0xAB; 20]);
        assert_eq!(&bytes[24..28], &cipher_taxon(0, 7).to_be_bytes());
        assert_eq!(&bytes[28..32], &[0, 0, 0, 0]);
    }

    #[test]
    fn page_key_is_low_96_bits() {
        let issuer = AccountID::from([0x11; 20]);
        let id = NFTokenID::derive(0, 0, issuer, 1, 2);
        assert_eq!(&id.page_key(), &id.as_bytes()[20..32]);
    }
}
