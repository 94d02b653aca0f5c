//! The protocol-feature catalog. Every behavioral variation this crate
//! implements is gated through an [`crate::amendments::rules::RulesView`]
//! built from this registry.
//!
//! Grounded in the teacher's dense const-table-plus-helper-function style
//! (`host/error_codes.rs`): a flat list of named entries, looked up by name
//! or by ID, each exhaustively unit-tested.

pub mod rules;

use crate::types::Hash256;
use sha2::{Digest, Sha512};
use std::collections::HashMap;
use std::sync::OnceLock;

pub type AmendmentId = Hash256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultVote {
    Yes,
    No,
    /// The amendment has been folded into the protocol baseline and can no
    /// longer be disabled.
    Obsolete,
}

#[derive(Debug, Clone, Copy)]
pub struct Amendment {
    pub name: &'static str,
    pub id: AmendmentId,
    pub default_vote: DefaultVote,
    pub retired: bool,
}

/// The first 32 bytes of SHA-512 over the UTF-8 amendment name. This is the
/// on-wire amendment identifier; changing it breaks compatibility.
pub fn amendment_id(name: &str) -> AmendmentId {
    let digest = Sha512::digest(name.as_bytes());
    let mut id = [0u8; 32];
    id.copy_from_slice(&digest[0..32]);
    Hash256::from(id)
}

macro_rules! amendment {
    ($name:expr, $vote:expr) => {
        Amendment {
            name: $name,
            id: amendment_id_const($name),
            default_vote: $vote,
            retired: false,
        }
    };
    ($name:expr, $vote:expr, retired) => {
        Amendment {
            name: $name,
            id: amendment_id_const($name),
            default_vote: $vote,
            retired: true,
        }
    };
}

// `Sha512::digest` is not `const fn`, so the static table below is built at
// first use rather than at compile time; `amendment_id_const` exists only to
// keep the macro's call shape readable at the table definition site.
fn amendment_id_const(name: &'static str) -> AmendmentId {
    amendment_id(name)
}

fn build_table() -> Vec<Amendment> {
    vec![
        amendment!("NonFungibleTokensV1_1", DefaultVote::Obsolete, retired),
        amendment!("fixNFTokenPageLinks", DefaultVote::Yes),
        amendment!("fixNonFungibleTokensV1_2", DefaultVote::Yes),
        amendment!("fixRemoveNFTokenAutoTrustLine", DefaultVote::Yes),
        amendment!("fixEnforceNFTokenTrustlineV2", DefaultVote::Yes),
        amendment!("nftoken-mint-offer", DefaultVote::Yes),
        amendment!("DynamicNFT", DefaultVote::Yes),
        amendment!("MPTokensV1", DefaultVote::Yes),
        amendment!("SingleAssetVault", DefaultVote::No),
    ]
}

struct Registry {
    by_name: HashMap<&'static str, Amendment>,
    by_id: HashMap<AmendmentId, Amendment>,
}

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let table = build_table();
        let mut by_name = HashMap::with_capacity(table.len());
        let mut by_id = HashMap::with_capacity(table.len());
        for entry in table {
            by_name.insert(entry.name, entry);
            by_id.insert(entry.id, entry);
        }
        Registry { by_name, by_id }
    })
}

pub fn by_name(name: &str) -> Option<Amendment> {
    registry().by_name.get(name).copied()
}

pub fn by_id(id: AmendmentId) -> Option<Amendment> {
    registry().by_id.get(&id).copied()
}

pub fn all() -> Vec<Amendment> {
    let mut entries: Vec<_> = registry().by_name.values().copied().collect();
    entries.sort_by_key(|a| a.name);
    entries
}

/// Entries enabled by default at genesis: everything voted `Yes`, plus every
/// retired (obsolete) entry, which can never be voted off.
pub fn genesis_enabled() -> Vec<AmendmentId> {
    all()
        .into_iter()
        .filter(|a| a.retired || matches!(a.default_vote, DefaultVote::Yes))
        .map(|a| a.id)
        .collect()
}
