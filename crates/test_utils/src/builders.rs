//! Test Data Builders
//!
//! Builders for registrations, claims and scripted gateways. Tests set only
//! the fields they care about; everything else is plausible fake data.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, PatientId};
use domain_claims::{NewClaim, PatientRegistration};
use infra_ai::transport::mock::ScriptedTransport;
use infra_ai::InferenceGateway;

/// Builder for a valid registration form
pub struct RegistrationBuilder {
    registration: PatientRegistration,
}

impl Default for RegistrationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationBuilder {
    pub fn new() -> Self {
        let year: i32 = (1940..2005).fake();
        let month: u32 = (1..13).fake();
        let day: u32 = (1..29).fake();
        let digits: u32 = (1000..10000).fake();

        Self {
            registration: PatientRegistration {
                first_name: FirstName().fake(),
                last_name: LastName().fake(),
                email: SafeEmail().fake(),
                phone: format!("555-{digits}"),
                date_of_birth: NaiveDate::from_ymd_opt(year, month, day)
                    .unwrap_or_else(|| NaiveDate::from_ymd_opt(1980, 1, 1).unwrap()),
                insurance_id: format!("INS-{digits}"),
                insurance_provider: "HealthPlus Insurance".to_string(),
            },
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.registration.email = email.into();
        self
    }

    pub fn with_date_of_birth(mut self, date: NaiveDate) -> Self {
        self.registration.date_of_birth = date;
        self
    }

    pub fn with_insurance_id(mut self, id: impl Into<String>) -> Self {
        self.registration.insurance_id = id.into();
        self
    }

    pub fn build(self) -> PatientRegistration {
        self.registration
    }
}

/// Builder for a claim submission
pub struct ClaimBuilder {
    patient_id: PatientId,
    amount: Decimal,
    currency: Currency,
    claim_type: String,
    description: String,
}

impl ClaimBuilder {
    pub fn for_patient(patient_id: PatientId) -> Self {
        Self {
            patient_id,
            amount: dec!(1200.00),
            currency: Currency::USD,
            claim_type: "Outpatient".to_string(),
            description: "MRI of the left knee".to_string(),
        }
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn build(self) -> NewClaim {
        NewClaim {
            patient_id: self.patient_id,
            claim_amount: Money::new(self.amount, self.currency),
            claim_type: self.claim_type,
            description: self.description,
        }
    }
}

/// Gateway over a scripted primary, with an optional scripted fallback
pub fn scripted_gateway(
    primary: Arc<ScriptedTransport>,
    fallback: Option<Arc<ScriptedTransport>>,
) -> Arc<InferenceGateway> {
    let gateway = InferenceGateway::new(primary, Duration::from_secs(5));
    Arc::new(match fallback {
        Some(fallback) => gateway.with_fallback(fallback),
        None => gateway,
    })
}
