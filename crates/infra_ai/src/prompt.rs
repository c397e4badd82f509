//! Prompt builder
//!
//! Renders a `DecisionRequest` into one instruction string: task framing,
//! the literal context values, and the exact JSON shape the model must
//! answer with. Building never fails; optional fields that are absent are
//! written as `unknown`.

use domain_claims::{DecisionKind, DecisionRequest};

/// Placeholder for optional context the caller did not supply
pub const UNKNOWN_VALUE: &str = "unknown";

/// A rendered prompt, ready for any transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: DecisionKind,
    pub text: String,
    /// One-line description sent alongside the prompt to delegation services
    pub summary: String,
}

pub fn build(request: &DecisionRequest) -> Prompt {
    let kind = request.kind;
    let mut text = String::with_capacity(2048);

    text.push_str(framing(kind));
    text.push_str("\n\nContext:\n");
    for line in context_lines(request) {
        text.push_str(&line);
        text.push('\n');
    }
    text.push_str(
        "\nRespond with ONLY a JSON object and no other text. Use exactly this structure; \
         where a field lists values separated by |, pick one of them:\n",
    );
    text.push_str(schema(kind));

    Prompt {
        kind,
        text,
        summary: summary(request),
    }
}

fn context_lines(request: &DecisionRequest) -> Vec<String> {
    let kind = request.kind;
    let listed = kind.required_fields().iter().chain(kind.optional_fields());

    let mut lines: Vec<String> = listed
        .clone()
        .map(|field| {
            let value = request
                .get(field)
                .map(ToString::to_string)
                .unwrap_or_else(|| UNKNOWN_VALUE.to_string());
            format!("- {}: {}", label(field), value)
        })
        .collect();

    let listed: Vec<&&str> = listed.collect();
    for (key, value) in &request.context {
        if !listed.iter().any(|field| **field == key.as_str()) {
            lines.push(format!("- {}: {}", label(key), value));
        }
    }
    lines
}

/// `claim_amount` -> `Claim Amount`, `eob_id` -> `EOB ID`
fn label(field: &str) -> String {
    field
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| match word {
            "id" | "eob" => word.to_ascii_uppercase(),
            _ => {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn summary(request: &DecisionRequest) -> String {
    let subject = ["claim_id", "eob_id", "patient_id", "insurance_id"]
        .iter()
        .find_map(|key| request.get(key))
        .map(|value| format!(" for {value}"))
        .unwrap_or_default();
    format!("{}{}", request.kind, subject)
}

fn framing(kind: DecisionKind) -> &'static str {
    match kind {
        DecisionKind::Registration => {
            "You are an insurance intake analyst. Assess the risk, data quality and insurance \
             details of this new patient registration."
        }
        DecisionKind::ClaimAdjudication => {
            "You are a healthcare claims adjudicator. Validate this claim, check coverage and \
             assess fraud risk. Give each of the three a separate verdict."
        }
        DecisionKind::DenialAnalysis => {
            "You are a claims resolution specialist. Explain why this claim was denied and what \
             would be needed to get it approved."
        }
        DecisionKind::EobGeneration => {
            "You are a payer's benefits processor. Produce the explanation of benefits for this \
             claim: how much is paid, by whom, and why."
        }
        DecisionKind::EobAnalysis => {
            "You are a billing analyst. Review this explanation of benefits and decide whether \
             the claim should be refiled."
        }
        DecisionKind::Refile => {
            "You are a claims resubmission specialist. Recommend how to refile this claim."
        }
        DecisionKind::ClaimSuggestions => {
            "You are a claims quality reviewer. Suggest concrete improvements that would help \
             this claim get approved."
        }
        DecisionKind::Chat => {
            "You are the assistant for a healthcare claims platform. Answer the user's message \
             briefly and suggest useful follow-up questions."
        }
    }
}

fn schema(kind: DecisionKind) -> &'static str {
    match kind {
        DecisionKind::Registration => REGISTRATION_SCHEMA,
        DecisionKind::ClaimAdjudication => CLAIM_SCHEMA,
        DecisionKind::DenialAnalysis => DENIAL_SCHEMA,
        DecisionKind::EobGeneration => EOB_SCHEMA,
        DecisionKind::EobAnalysis => EOB_ANALYSIS_SCHEMA,
        DecisionKind::Refile => REFILE_SCHEMA,
        DecisionKind::ClaimSuggestions => SUGGESTIONS_SCHEMA,
        DecisionKind::Chat => CHAT_SCHEMA,
    }
}

const REGISTRATION_SCHEMA: &str = r#"{
  "riskAssessment": {
    "insuranceEligibility": "Eligible|Not Eligible|Pending Review",
    "riskLevel": "Low|Medium|High",
    "justification": "short explanation"
  },
  "dataQualityAnalysis": {
    "completeness": "Complete|Incomplete|Partial",
    "formatConsistency": "Consistent|Inconsistent|Mixed",
    "overallQuality": "High|Medium|Low"
  },
  "insuranceVerification": {
    "providerValid": "Valid|Invalid|Pending Verification",
    "idFormat": "Valid|Invalid|Needs Review",
    "coverageStatus": "Active|Inactive|Unknown"
  },
  "verificationRecommendations": ["recommendation"],
  "potentialFraudIndicators": ["indicator, or empty array"]
}"#;

const CLAIM_SCHEMA: &str = r#"{
  "validation": {
    "status": "Valid|Invalid|Pending",
    "completeness": "Complete|Incomplete|Partial",
    "issues": ["issue, or empty array"]
  },
  "coverageCheck": {
    "policyCoverage": "Covered|Not Covered|Partially Covered",
    "medicalNecessity": "Medically Necessary|Not Medically Necessary|Under Review",
    "coverageDecision": "Approved|Denied|Pending Review"
  },
  "fraudRiskAssessment": {
    "riskLevel": "Low|Medium|High",
    "riskFactors": ["risk factor, or empty array"],
    "recommendation": "Approve|Deny|Manual Review Required"
  },
  "approvalRequirements": {
    "requiredDocuments": ["document"],
    "preAuthorization": "Required|Not Required|Already Obtained"
  },
  "nextSteps": ["step"]
}"#;

const DENIAL_SCHEMA: &str = r#"{
  "rootCauseAnalysis": "why the claim was denied",
  "requiredDocumentation": ["document"],
  "resolutionSteps": ["step"],
  "successLikelihood": "High|Medium|Low",
  "alternativeOptions": ["option"],
  "priority": "High|Medium|Low"
}"#;

const EOB_SCHEMA: &str = r#"{
  "eob_amount": 0.0,
  "status": "approved|denied|partial",
  "eob_date": "YYYY-MM-DD",
  "insurance_company": "payer name",
  "ai_analysis": {
    "summary": "short summary of the decision",
    "coverage_details": "what was covered"
  },
  "denial_reasons": ["reason, only if denied"],
  "refile_required": false
}"#;

const EOB_ANALYSIS_SCHEMA: &str = r#"{
  "summary": "overall summary",
  "coverage_analysis": "coverage detail",
  "denial_reasons": ["reason"],
  "recommendations": ["recommendation"],
  "refile_required": false,
  "refile_priority": "high|medium|low",
  "next_steps": ["step"],
  "confidence_score": 0
}"#;

const REFILE_SCHEMA: &str = r#"{
  "refile_justification": "why the claim should be refiled",
  "required_documents": ["document"],
  "modifications_needed": ["modification"],
  "priority": "high|medium|low",
  "estimated_success": 0,
  "timeline": "expected processing time",
  "next_steps": ["step"]
}"#;

const SUGGESTIONS_SCHEMA: &str = r#"{
  "root_cause": "main obstacle to approval",
  "suggestions": ["suggestion"],
  "priority": "High|Medium|Low",
  "estimated_impact": "expected effect of the changes"
}"#;

const CHAT_SCHEMA: &str = r#"{
  "response": "your answer",
  "suggestions": ["follow-up question"],
  "actionData": {"type": "none|navigate|system_info", "data": {}}
}"#;
