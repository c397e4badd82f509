//! Persistence port for the claims domain
//!
//! The store is a plain create/read/update collaborator. It never decides
//! anything; the orchestrator reads a claim, asks the policy, and writes the
//! result back through this trait.

use async_trait::async_trait;

use core_kernel::{ClaimId, DomainPort, EobId, PatientId, PortError};
use crate::claim::Claim;
use crate::eob::EobRecord;
use crate::patient::Patient;

/// Storage for patients, claims and EOB records
#[async_trait]
pub trait ClaimsStore: DomainPort {
    async fn insert_patient(&self, patient: &Patient) -> Result<(), PortError>;

    async fn get_patient(&self, id: PatientId) -> Result<Patient, PortError>;

    async fn insert_claim(&self, claim: &Claim) -> Result<(), PortError>;

    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError>;

    /// Replaces the stored claim with the same id
    async fn update_claim(&self, claim: &Claim) -> Result<(), PortError>;

    /// Fails with `NotFound` when the referenced claim does not exist
    async fn insert_eob(&self, eob: &EobRecord) -> Result<(), PortError>;

    async fn get_eob(&self, id: EobId) -> Result<EobRecord, PortError>;

    async fn update_eob(&self, eob: &EobRecord) -> Result<(), PortError>;

    /// EOBs for a claim, oldest first
    async fn eobs_for_claim(&self, claim_id: ClaimId) -> Result<Vec<EobRecord>, PortError>;
}

/// In-memory store for tests and the command-line tool
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[derive(Debug, Default)]
    pub struct MockClaimsStore {
        patients: Arc<RwLock<HashMap<PatientId, Patient>>>,
        claims: Arc<RwLock<HashMap<ClaimId, Claim>>>,
        eobs: Arc<RwLock<HashMap<EobId, EobRecord>>>,
        fail_eob_inserts: AtomicBool,
    }

    impl MockClaimsStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with claims for testing
        pub async fn with_claims(claims: Vec<Claim>) -> Self {
            let store = Self::new();
            for claim in claims {
                store.claims.write().await.insert(claim.id, claim);
            }
            store
        }

        /// Makes every later `insert_eob` fail with a connection error
        pub fn fail_eob_inserts(&self, fail: bool) {
            self.fail_eob_inserts.store(fail, Ordering::SeqCst);
        }

        pub async fn eob_count(&self) -> usize {
            self.eobs.read().await.len()
        }
    }

    impl DomainPort for MockClaimsStore {}

    #[async_trait]
    impl ClaimsStore for MockClaimsStore {
        async fn insert_patient(&self, patient: &Patient) -> Result<(), PortError> {
            let mut patients = self.patients.write().await;
            if patients.contains_key(&patient.id) {
                return Err(PortError::conflict(format!("patient {} already exists", patient.id)));
            }
            patients.insert(patient.id, patient.clone());
            Ok(())
        }

        async fn get_patient(&self, id: PatientId) -> Result<Patient, PortError> {
            self.patients
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Patient", id))
        }

        async fn insert_claim(&self, claim: &Claim) -> Result<(), PortError> {
            let mut claims = self.claims.write().await;
            if claims.contains_key(&claim.id) {
                return Err(PortError::conflict(format!("claim {} already exists", claim.id)));
            }
            claims.insert(claim.id, claim.clone());
            Ok(())
        }

        async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
            self.claims
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Claim", id))
        }

        async fn update_claim(&self, claim: &Claim) -> Result<(), PortError> {
            let mut claims = self.claims.write().await;
            match claims.get_mut(&claim.id) {
                Some(stored) => {
                    *stored = claim.clone();
                    Ok(())
                }
                None => Err(PortError::not_found("Claim", claim.id)),
            }
        }

        async fn insert_eob(&self, eob: &EobRecord) -> Result<(), PortError> {
            if self.fail_eob_inserts.load(Ordering::SeqCst) {
                return Err(PortError::connection("eob table unavailable"));
            }
            if !self.claims.read().await.contains_key(&eob.claim_id) {
                return Err(PortError::not_found("Claim", eob.claim_id));
            }
            self.eobs.write().await.insert(eob.id, eob.clone());
            Ok(())
        }

        async fn get_eob(&self, id: EobId) -> Result<EobRecord, PortError> {
            self.eobs
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("EOB", id))
        }

        async fn update_eob(&self, eob: &EobRecord) -> Result<(), PortError> {
            let mut eobs = self.eobs.write().await;
            match eobs.get_mut(&eob.id) {
                Some(stored) => {
                    *stored = eob.clone();
                    Ok(())
                }
                None => Err(PortError::not_found("EOB", eob.id)),
            }
        }

        async fn eobs_for_claim(&self, claim_id: ClaimId) -> Result<Vec<EobRecord>, PortError> {
            let mut eobs: Vec<EobRecord> = self
                .eobs
                .read()
                .await
                .values()
                .filter(|eob| eob.claim_id == claim_id)
                .cloned()
                .collect();
            eobs.sort_by_key(|eob| eob.created_at);
            Ok(eobs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockClaimsStore;
    use super::*;
    use crate::assessment::EobDraft;
    use crate::claim::NewClaim;
    use crate::eob::EobStatus;
    use chrono::Utc;
    use core_kernel::{Currency, Money};
    use rust_decimal_macros::dec;

    fn claim() -> Claim {
        Claim::submit(NewClaim {
            patient_id: PatientId::new(),
            claim_amount: Money::new(dec!(500), Currency::USD),
            claim_type: "Lab".to_string(),
            description: "Blood panel".to_string(),
        })
        .unwrap()
    }

    fn draft() -> EobDraft {
        EobDraft {
            amount: Money::new(dec!(400), Currency::USD),
            status: EobStatus::Partial,
            eob_date: Utc::now().date_naive(),
            payer: "HealthPlus Insurance".to_string(),
            summary: "Standard coverage".to_string(),
            denial_reasons: vec![],
            refile_required: false,
            degraded: true,
        }
    }

    #[tokio::test]
    async fn test_eob_requires_existing_claim() {
        let store = MockClaimsStore::new();
        let orphan = EobRecord::issue(&claim(), &draft());
        let err = store.insert_eob(&orphan).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_eobs_listed_per_claim() {
        let claim = claim();
        let store = MockClaimsStore::with_claims(vec![claim.clone()]).await;
        store.insert_eob(&EobRecord::issue(&claim, &draft())).await.unwrap();
        store.insert_eob(&EobRecord::issue(&claim, &draft())).await.unwrap();

        assert_eq!(store.eobs_for_claim(claim.id).await.unwrap().len(), 2);
        assert!(store.eobs_for_claim(ClaimId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_injected_eob_failure() {
        let claim = claim();
        let store = MockClaimsStore::with_claims(vec![claim.clone()]).await;
        store.fail_eob_inserts(true);
        assert!(store.insert_eob(&EobRecord::issue(&claim, &draft())).await.is_err());
        assert_eq!(store.eob_count().await, 0);
    }

    #[tokio::test]
    async fn test_update_unknown_claim_fails() {
        let store = MockClaimsStore::new();
        assert!(store.update_claim(&claim()).await.unwrap_err().is_not_found());
    }
}
