//! An immutable view of which amendments are enabled for the ledger a
//! transaction is being applied against. Handlers consult this instead of
//! branching on raw amendment IDs so behavior-selection reads as intent
//! ("enforce_trustline_v2()") rather than ID comparisons scattered through
//! the handler bodies.

use crate::amendments::{self, AmendmentId};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesView {
    enabled: HashSet<AmendmentId>,
}

impl RulesView {
    pub fn new(enabled: HashSet<AmendmentId>) -> Self {
        RulesView { enabled }
    }

    /// All genesis-supported (non-opt-in) amendments enabled, as a sane
    /// default for tests exercising current-protocol behavior.
    pub fn genesis() -> Self {
        RulesView::new(amendments::genesis_enabled().into_iter().collect())
    }

    pub fn empty() -> Self {
        RulesView::new(HashSet::new())
    }

    pub fn enabled(&self, id: AmendmentId) -> bool {
        self.enabled.contains(&id)
    }

    pub fn enabled_by_name(&self, name: &str) -> bool {
        match amendments::by_name(name) {
            Some(a) => self.enabled(a.id),
            None => false,
        }
    }

    // Derived, named predicates used throughout the transaction handlers so
    // call sites read as intent rather than amendment-name string literals.

    pub fn fix_page_links(&self) -> bool {
        self.enabled_by_name("fixNFTokenPageLinks")
    }

    pub fn fix_v1_2(&self) -> bool {
        self.enabled_by_name("fixNonFungibleTokensV1_2")
    }

    pub fn fix_remove_nftoken_auto_trustline(&self) -> bool {
        self.enabled_by_name("fixRemoveNFTokenAutoTrustLine")
    }

    pub fn enforce_trustline_v2(&self) -> bool {
        self.enabled_by_name("fixEnforceNFTokenTrustlineV2")
    }

    pub fn nftoken_mint_offer(&self) -> bool {
        self.enabled_by_name("nftoken-mint-offer")
    }

    pub fn dynamic_nft(&self) -> bool {
        self.enabled_by_name("DynamicNFT")
    }

    pub fn mpt_tokens_v1(&self) -> bool {
        self.enabled_by_name("MPTokensV1")
    }

    pub fn single_asset_vault(&self) -> bool {
        self.enabled_by_name("SingleAssetVault")
    }
}

/// Constructs a `RulesView` from amendment names, for building specific
/// scenarios in tests without hand-computing IDs.
pub struct RulesBuilder {
    names: Vec<&'static str>,
}

impl RulesBuilder {
    pub fn new() -> Self {
        RulesBuilder { names: Vec::new() }
    }

    pub fn with(mut self, name: &'static str) -> Self {
        self.names.push(name);
        self
    }

    pub fn build(self) -> RulesView {
        let enabled = self
            .names
            .into_iter()
            .filter_map(|n| amendments::by_name(n).map(|a| a.id))
            .collect();
        RulesView::new(enabled)
    }
}

impl Default for RulesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rules_enable_nothing() {
        let rules = RulesView::empty();
        assert!(!rules.fix_page_links());
        assert!(!rules.dynamic_nft());
    }

    #[test]
    fn builder_enables_named_amendments_only() {
        let rules = RulesBuilder::new().with("DynamicNFT").build();
        assert!(rules.dynamic_nft());
        assert!(!rules.mpt_tokens_v1());
    }

    #[test]
    fn genesis_includes_retired_amendment() {
        let rules = RulesView::genesis();
        assert!(rules.enabled_by_name("NonFungibleTokensV1_1"));
    }

    #[test]
    fn unknown_amendment_name_is_never_enabled() {
        let rules = RulesBuilder::new().with("DynamicNFT").build();
        assert!(!rules.enabled_by_name("NotReal"));
    }
}
