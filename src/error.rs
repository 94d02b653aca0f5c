//! Internal error type for fallible helpers (directory bookkeeping, NFT page
//! arithmetic, value transfer). Handlers convert a `CoreError` into the final
//! `ResultCode` they return to the host at the point where they know which
//! transaction-level meaning applies.

use crate::result::ResultCode;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    #[error("ledger entry not found")]
    EntryNotFound,
    #[error("ledger entry already exists")]
    EntryAlreadyExists,
    #[error("ledger entry has an unexpected type for this operation")]
    WrongEntryType,
    #[error("directory page is full")]
    DirectoryFull,
    #[error("NFT page has no room and no suitable split point exists")]
    NoSuitableNftokenPage,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("insufficient funds for the requested transfer")]
    InsufficientFunds,
    #[error("trust line is not authorized for this transfer")]
    NotAuthorized,
    #[error("account does not have enough reserve for a new object")]
    InsufficientReserve,
}

impl From<CoreError> for ResultCode {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EntryNotFound => ResultCode::TecObjectNotFound,
            CoreError::EntryAlreadyExists => ResultCode::TecDuplicate,
            CoreError::WrongEntryType => ResultCode::TefInternal,
            CoreError::DirectoryFull => ResultCode::TecDirFull,
            CoreError::NoSuitableNftokenPage => ResultCode::TecNoSuitableNftokenPage,
            CoreError::Overflow => ResultCode::TefInternal,
            CoreError::InsufficientFunds => ResultCode::TecInsufficientFunds,
            CoreError::NotAuthorized => ResultCode::TecNoAuth,
            CoreError::InsufficientReserve => ResultCode::TecInsufficientReserve,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_expected_tec_codes() {
        assert_eq!(
            ResultCode::from(CoreError::EntryNotFound),
            ResultCode::TecObjectNotFound
        );
        assert_eq!(
            ResultCode::from(CoreError::InsufficientReserve),
            ResultCode::TecInsufficientReserve
        );
    }

    #[test]
    fn internal_errors_map_to_tef() {
        assert_eq!(ResultCode::from(CoreError::WrongEntryType), ResultCode::TefInternal);
        assert_eq!(ResultCode::from(CoreError::Overflow), ResultCode::TefInternal);
    }
}
