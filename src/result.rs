//! Wire-level transaction result codes.
//!
//! Mirrors the shape of the teacher's hand-rolled `host::Error` enum
//! (`#[repr(i32)]` discriminants plus a `from_code`/`code()` round trip) but
//! catalogs the five on-wire result classes instead of host FFI failure
//! reasons: `tes` (success), `tem` (malformed), `tef` (failed/internal),
//! `tec` (claimed - fee consumed), and `tel`/`ter` (local/retriable, never
//! produced by this crate but reserved so the enum matches the host's wire
//! vocabulary).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ResultCode {
    TesSuccess = 0,

    TemMalformed = -299,
    TemInvalid = -273,
    TemInvalidFlag = -198,
    TemBadAmount = -292,
    TemBadExpiration = -280,
    TemBadTransferFee = -268,
    TemBadNftokenTransferFee = -267,
    TemDisabled = -266,

    TefInternal = -199,
    TefBadLedger = -189,
    TefTooBig = -181,
    TefNftTokenIsNotTransferable = -193,

    TecClaim = 100,
    TecNoEntry = 130,
    TecNoIssuer = 145,
    TecNoPermission = 139,
    TecNoDst = 124,
    TecNoLine = 135,
    TecNoAuth = 134,
    TecObjectNotFound = 160,
    TecHasObligations = 156,
    TecInsufficientReserve = 141,
    TecInsufficientFunds = 165,
    TecInsufficientPayment = 161,
    TecMaxSequenceReached = 154,
    TecExpired = 162,
    TecDuplicate = 149,
    TecDirFull = 121,
    TecNftokenOfferTypeMismatch = 166,
    TecCantAcceptOwnNftokenOffer = 167,
    TecNftokenBuySellMismatch = 168,
    TecNoSuitableNftokenPage = 169,
    TecMptIssuanceNotFound = 170,

    TelLocal = -399,
    TerRetry = -99,
}

impl ResultCode {
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn is_success(self) -> bool {
        matches!(self, ResultCode::TesSuccess)
    }

    pub const fn is_malformed(self) -> bool {
        matches!(
            self,
            ResultCode::TemMalformed
                | ResultCode::TemInvalid
                | ResultCode::TemInvalidFlag
                | ResultCode::TemBadAmount
                | ResultCode::TemBadExpiration
                | ResultCode::TemBadTransferFee
                | ResultCode::TemBadNftokenTransferFee
                | ResultCode::TemDisabled
        )
    }

    pub const fn is_failure(self) -> bool {
        matches!(
            self,
            ResultCode::TefInternal
                | ResultCode::TefBadLedger
                | ResultCode::TefTooBig
                | ResultCode::TefNftTokenIsNotTransferable
        )
    }

    pub const fn is_claimed(self) -> bool {
        matches!(
            self,
            ResultCode::TecClaim
                | ResultCode::TecNoEntry
                | ResultCode::TecNoIssuer
                | ResultCode::TecNoPermission
                | ResultCode::TecNoDst
                | ResultCode::TecNoLine
                | ResultCode::TecNoAuth
                | ResultCode::TecObjectNotFound
                | ResultCode::TecHasObligations
                | ResultCode::TecInsufficientReserve
                | ResultCode::TecInsufficientFunds
                | ResultCode::TecInsufficientPayment
                | ResultCode::TecMaxSequenceReached
                | ResultCode::TecExpired
                | ResultCode::TecDuplicate
                | ResultCode::TecDirFull
                | ResultCode::TecNftokenOfferTypeMismatch
                | ResultCode::TecCantAcceptOwnNftokenOffer
                | ResultCode::TecNftokenBuySellMismatch
                | ResultCode::TecNoSuitableNftokenPage
                | ResultCode::TecMptIssuanceNotFound
        )
    }

    pub const fn is_retriable(self) -> bool {
        matches!(self, ResultCode::TerRetry | ResultCode::TelLocal)
    }

    /// `tec`/`tem`/`tef` share the property that, once returned, the apply
    /// pipeline must not have left partial state mutations committed beyond
    /// fee collection (which only `tec` permits).
    pub const fn consumes_fee(self) -> bool {
        self.is_success() || self.is_claimed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_neither_malformed_nor_claimed() {
        assert!(ResultCode::TesSuccess.is_success());
        assert!(!ResultCode::TesSuccess.is_malformed());
        assert!(!ResultCode::TesSuccess.is_claimed());
    }

    #[test]
    fn tec_codes_consume_fee_but_are_not_success() {
        assert!(ResultCode::TecNoPermission.is_claimed());
        assert!(ResultCode::TecNoPermission.consumes_fee());
        assert!(!ResultCode::TecNoPermission.is_success());
    }

    #[test]
    fn tem_and_tef_never_consume_fee() {
        assert!(!ResultCode::TemMalformed.consumes_fee());
        assert!(!ResultCode::TefInternal.consumes_fee());
    }

    #[test]
    fn categories_are_mutually_exclusive_for_sampled_codes() {
        let codes = [
            ResultCode::TesSuccess,
            ResultCode::TemMalformed,
            ResultCode::TefInternal,
            ResultCode::TecNoPermission,
            ResultCode::TerRetry,
        ];
        for c in codes {
            let flags = [c.is_success(), c.is_malformed(), c.is_failure(), c.is_claimed()];
            assert!(flags.iter().filter(|f| **f).count() <= 1);
        }
    }
}
