//! Patient registration

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::PatientId;
use crate::assessment::RegistrationAssessment;
use crate::decision::{DecisionKind, DecisionRequest};
use crate::error::ClaimError;

/// Registration form as submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PatientRegistration {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 7, max = 20))]
    pub phone: String,
    pub date_of_birth: NaiveDate,
    #[validate(length(min = 1, max = 50))]
    pub insurance_id: String,
    #[validate(length(min = 1, max = 100))]
    pub insurance_provider: String,
}

impl PatientRegistration {
    /// Runs field validation, flattening the errors into one message
    pub fn check(&self) -> Result<(), ClaimError> {
        self.validate()
            .map_err(|errors| ClaimError::InvalidRegistration(errors.to_string()))?;
        if self.date_of_birth > Utc::now().date_naive() {
            return Err(ClaimError::InvalidRegistration(
                "date_of_birth: must not be in the future".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_request(&self) -> DecisionRequest {
        DecisionRequest::new(DecisionKind::Registration)
            .with("first_name", self.first_name.as_str())
            .with("last_name", self.last_name.as_str())
            .with("email", self.email.as_str())
            .with("phone", self.phone.as_str())
            .with("date_of_birth", self.date_of_birth.format("%Y-%m-%d").to_string())
            .with("insurance_id", self.insurance_id.as_str())
            .with("insurance_provider", self.insurance_provider.as_str())
    }
}

/// A registered patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub insurance_id: String,
    pub insurance_provider: String,
    /// Registration assessment echoed for audit
    pub ai_analysis: Option<RegistrationAssessment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    pub fn register(registration: PatientRegistration, assessment: RegistrationAssessment) -> Self {
        let now = Utc::now();
        Self {
            id: PatientId::new(),
            first_name: registration.first_name,
            last_name: registration.last_name,
            email: registration.email,
            phone: registration.phone,
            date_of_birth: registration.date_of_birth,
            insurance_id: registration.insurance_id,
            insurance_provider: registration.insurance_provider,
            ai_analysis: Some(assessment),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> PatientRegistration {
        PatientRegistration {
            first_name: "Ada".to_string(),
            last_name: "Okafor".to_string(),
            email: "ada.okafor@example.com".to_string(),
            phone: "555-010-2030".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1984, 3, 9).unwrap(),
            insurance_id: "HP-448812".to_string(),
            insurance_provider: "HealthPlus".to_string(),
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        let form = registration();
        assert!(form.check().is_ok());
        assert!(form.to_request().validate().is_ok());
    }

    #[test]
    fn test_bad_email_is_rejected() {
        let mut form = registration();
        form.email = "not-an-email".to_string();
        let err = form.check().unwrap_err();
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn test_future_birth_date_is_rejected() {
        let mut form = registration();
        form.date_of_birth = NaiveDate::from_ymd_opt(2999, 1, 1).unwrap();
        assert!(matches!(form.check(), Err(ClaimError::InvalidRegistration(_))));
    }

    #[test]
    fn test_register_keeps_assessment() {
        let patient = Patient::register(registration(), RegistrationAssessment::default());
        assert_eq!(patient.full_name(), "Ada Okafor");
        assert!(patient.ai_analysis.is_some());
    }
}
