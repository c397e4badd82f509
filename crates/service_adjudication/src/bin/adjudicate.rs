//! Claim Adjudication - command-line entry point
//!
//! Runs one decision (or one intake) against the configured inference
//! services and prints the result as JSON. State lives in memory for the
//! duration of the invocation only.
//!
//! # Usage
//!
//! ```bash
//! adjudicate decide --kind claim_adjudication \
//!     --context '{"patient_id":"PAT-1","claim_amount":1200,"claim_type":"Outpatient","description":"Knee MRI"}'
//!
//! adjudicate chat "Why was my claim denied?"
//!
//! adjudicate intake --registration patient.json --claim claim.json
//! ```
//!
//! # Environment Variables
//!
//! * `INFERENCE_*` - inference endpoints, model and timeouts (see `infra_ai::config`)
//! * `INFERENCE_LOG_LEVEL` - trace, debug, info, warn, error (default: info)
//! * `ADJUDICATION_AUTO_EOB` - issue an EOB on automatic approval (default: true)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::{Currency, Money};
use domain_claims::ports::mock::MockClaimsStore;
use domain_claims::{ClaimStatus, ContextValue, DecisionKind, DecisionRequest, NewClaim, PatientRegistration};
use infra_ai::InferenceConfig;
use service_adjudication::{Orchestrator, OrchestratorConfig};

#[derive(Parser)]
#[command(name = "adjudicate", version, about = "AI-assisted claim adjudication")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single decision and print its outcome
    Decide {
        /// Decision kind, e.g. claim_adjudication or eob_generation
        #[arg(long)]
        kind: DecisionKind,
        /// Context fields as a JSON object of strings and numbers
        #[arg(long, default_value = "{}")]
        context: String,
        /// Current claim status
        #[arg(long, default_value = "pending", value_parser = parse_status)]
        current: ClaimStatus,
    },

    /// Ask the assistant a question
    Chat {
        message: String,
    },

    /// Register a patient and submit one claim for them
    Intake {
        /// Patient registration JSON
        #[arg(long)]
        registration: PathBuf,
        /// Claim JSON: claim_amount, claim_type, description
        #[arg(long)]
        claim: PathBuf,
    },
}

#[derive(Debug, Deserialize)]
struct ClaimForm {
    claim_amount: String,
    #[serde(default)]
    currency: Option<Currency>,
    claim_type: String,
    description: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let inference = InferenceConfig::from_env().context("reading INFERENCE_* configuration")?;
    init_tracing(&inference.log_level, cli.log_json);
    let config = OrchestratorConfig::from_env().context("reading ADJUDICATION_* configuration")?;

    tracing::info!(
        reasoning = %inference.reasoning_url,
        delegation = %inference.delegation_url,
        model = %inference.model_id,
        "starting adjudication"
    );

    let store = Arc::new(MockClaimsStore::new());
    let orchestrator = Orchestrator::from_config(&inference, store, config)?;

    match cli.command {
        Command::Decide { kind, context, current } => {
            let context: BTreeMap<String, ContextValue> =
                serde_json::from_str(&context).context("--context must be a JSON object of strings and numbers")?;
            let request = DecisionRequest { kind, context };
            print_json(&orchestrator.decide(&request, current).await?)
        }
        Command::Chat { message } => print_json(&orchestrator.chat(&message).await?),
        Command::Intake { registration, claim } => {
            let registration: PatientRegistration = read_json(&registration)?;
            let form: ClaimForm = read_json(&claim)?;

            let registered = orchestrator.register_patient(registration).await?;
            let currency = form.currency.unwrap_or(Currency::USD);
            let new_claim = NewClaim {
                patient_id: registered.patient.id,
                claim_amount: Money::parse_lenient(&form.claim_amount, currency)?,
                claim_type: form.claim_type,
                description: form.description,
            };
            let decided = orchestrator.process_claim(new_claim).await?;
            print_json(&serde_json::json!({
                "registration": registered,
                "claim": decided,
            }))
        }
    }
}

fn parse_status(text: &str) -> Result<ClaimStatus, String> {
    serde_json::from_value(Value::String(text.trim().to_ascii_lowercase()))
        .map_err(|_| format!("unknown claim status: {text}"))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
