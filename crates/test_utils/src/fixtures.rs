//! Canned Model Replies
//!
//! Model text as the inference services actually return it: prose around a
//! fenced or bare JSON object, sometimes with a reasoning preamble. Each
//! reply is paired with the envelope shapes the providers wrap it in.

use serde_json::{json, Value};

/// Claim adjudication replies
pub struct AdjudicationReplies;

impl AdjudicationReplies {
    /// All three signals affirm
    pub fn approve() -> String {
        "<reasoning>Low risk, covered service, complete claim.</reasoning>\n\
         Assessment follows.\n```json\n{\
         \"fraudRiskAssessment\": {\"riskLevel\": \"Low\", \"recommendation\": \"Approve\", \"riskFactors\": []},\
         \"coverageCheck\": {\"coverageDecision\": \"Approved\"},\
         \"validation\": {\"status\": \"Valid\", \"issues\": []},\
         \"nextSteps\": [\"Issue EOB\"]}\n```"
            .to_string()
    }

    /// Validation vetoes with a specific issue
    pub fn deny(issue: &str) -> String {
        json!({
            "fraudRiskAssessment": {"riskLevel": "Medium", "recommendation": "Review", "riskFactors": []},
            "coverageCheck": {"coverageDecision": "Approved"},
            "validation": {"status": "Invalid", "issues": [issue]}
        })
        .to_string()
    }

    /// Fraud signal asks for a human
    pub fn review() -> String {
        format!(
            "Decision below.\n{}",
            json!({
                "fraudRiskAssessment": {"riskLevel": "High", "recommendation": "Review", "riskFactors": ["Unusual amount"]},
                "coverageCheck": {"coverageDecision": "Approved"},
                "validation": {"status": "Valid", "issues": []},
                "approvalRequirements": {"requiredDocuments": ["Itemized bill"]}
            })
        )
    }
}

/// Replies for the advisory and EOB kinds
pub struct AdvisoryReplies;

impl AdvisoryReplies {
    pub fn eob_paid(amount: &str) -> String {
        format!(
            "EOB:\n```json\n{}\n```",
            json!({
                "eob_amount": amount,
                "status": "Paid",
                "insurance_company": "Acme Health",
                "eob_date": "2026-10-01",
                "denial_reasons": [],
                "refile_required": false,
                "ai_analysis": {"summary": "Paid in full"}
            })
        )
    }

    pub fn eob_review_refile() -> String {
        json!({
            "summary": "Payer applied the wrong modifier",
            "coverage_analysis": "Partially covered",
            "denial_reasons": ["Modifier 25 missing"],
            "recommendations": ["Add modifier 25"],
            "refile_required": true,
            "refile_priority": "high",
            "next_steps": ["Correct coding", "Refile within 30 days"],
            "confidence_score": 91.6
        })
        .to_string()
    }

    pub fn denial_analysis() -> String {
        json!({
            "rootCauseAnalysis": "Referral was not on file",
            "requiredDocumentation": ["Referral letter"],
            "resolutionSteps": ["Obtain referral", "Resubmit"],
            "successLikelihood": "High",
            "alternativeOptions": [],
            "priority": "High"
        })
        .to_string()
    }

    pub fn refile() -> String {
        json!({
            "refile_justification": "Coding error corrected",
            "required_documents": ["Corrected claim form"],
            "modifications_needed": ["Add modifier 25"],
            "priority": "High",
            "estimated_success": 85,
            "timeline": "2-3 weeks",
            "next_steps": ["Submit corrected claim"]
        })
        .to_string()
    }

    pub fn suggestions() -> String {
        json!({
            "rootCause": "Description too vague",
            "suggestions": ["Add CPT codes", "Attach physician notes"],
            "priority": "Medium",
            "estimatedImpact": "Faster approval"
        })
        .to_string()
    }

    pub fn chat(response: &str) -> String {
        json!({
            "response": response,
            "suggestions": ["Submit a claim"],
            "actionData": {"type": "navigate", "target": "claims"}
        })
        .to_string()
    }
}

/// Model text with no decodable object
pub fn garbled_reply() -> String {
    "I'm sorry, I could not assess this claim {because the record was incomplete.".to_string()
}

/// Provider envelope shapes around a model text
pub struct Envelopes;

impl Envelopes {
    /// Chat-completion style
    pub fn chat_completion(text: &str) -> Value {
        json!({"choices": [{"message": {"role": "assistant", "content": text}}]})
    }

    /// Content-array style
    pub fn content_array(text: &str) -> Value {
        json!({"content": [{"type": "text", "text": text}]})
    }

    /// Function invocation with a nested JSON body
    pub fn function_body(text: &str) -> Value {
        let body = json!({"analysis": text}).to_string();
        json!({"statusCode": 200, "body": body})
    }
}
