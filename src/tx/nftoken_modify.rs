//! `NFTokenModify`: spec §4.6.6, gated behind the `DynamicNFT` amendment.

use crate::ledger::entries::LedgerEntry;
use crate::nft_page;
use crate::result::ResultCode;
use crate::tx::{ApplyContext, TxHandler};
use crate::types::account_id::AccountID;
use crate::types::nft_id::NFTokenID;

pub const MAX_URI_LEN: usize = 256;

pub struct NFTokenModify {
    pub account: AccountID,
    pub token_id: NFTokenID,
    pub owner: Option<AccountID>,
    pub uri: Option<Vec<u8>>,
}

impl TxHandler for NFTokenModify {
    fn preflight(&self) -> Result<(), ResultCode> {
        if let Some(uri) = &self.uri {
            if uri.len() > MAX_URI_LEN {
                return Err(ResultCode::TemInvalid);
            }
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<(), ResultCode> {
        if !ctx.rules.dynamic_nft() {
            return Err(ResultCode::TemDisabled);
        }
        if !self.token_id.flags().is_mutable() {
            return Err(ResultCode::TecNoPermission);
        }
        if self.token_id.issuer() != self.account {
            return Err(ResultCode::TecNoPermission);
        }

        let owner = self.owner.unwrap_or(self.account);
        let (page_key, mut page, position) =
            nft_page::find_token(ctx.view, owner, self.token_id).ok_or(ResultCode::TecNoEntry)?;
        page.tokens[position].uri = self.uri.clone();
        ctx.view
            .update(page_key, LedgerEntry::NFTokenPage(page))
            .map_err(|_| ResultCode::TefInternal)
    }
}
