//! Assertion helpers for claim state

use domain_claims::{Claim, ClaimStatus};

/// Asserts the status and that the timestamps agree with it
pub fn assert_claim_state(claim: &Claim, expected: ClaimStatus) {
    assert_eq!(claim.status(), expected, "claim {} has the wrong status", claim.id);
    assert!(
        claim.is_consistent(),
        "claim {} is {} but approved_at={:?} denied_at={:?}",
        claim.id,
        claim.status(),
        claim.approved_at(),
        claim.denied_at()
    );
    if expected != ClaimStatus::Denied && expected != ClaimStatus::Refiled {
        assert!(claim.denial_reason().is_none(), "unexpected denial reason on {}", claim.id);
    }
}
