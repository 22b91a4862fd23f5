//! Chat-style answers about the store's numbers.

use kasir_core::AnalystSnapshot;
use tracing::{debug, warn};

use crate::error::{AdvisorError, AdvisorResult};
use crate::oracle::{Oracle, OracleRequest};

/// Shown whenever the analyst cannot answer.
pub const UNAVAILABLE_MESSAGE: &str =
    "The AI analyst is currently unavailable. Please try again later.";

/// Answers `question` using the store snapshot as context.
///
/// Never fails: any problem yields [`UNAVAILABLE_MESSAGE`].
pub async fn ask_analyst(oracle: &dyn Oracle, question: &str, snapshot: &AnalystSnapshot) -> String {
    match try_ask(oracle, question, snapshot).await {
        Ok(answer) => answer,
        Err(e) => {
            warn!(oracle = oracle.name(), error = %e, "Analyst request failed");
            UNAVAILABLE_MESSAGE.to_string()
        }
    }
}

async fn try_ask(
    oracle: &dyn Oracle,
    question: &str,
    snapshot: &AnalystSnapshot,
) -> AdvisorResult<String> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AdvisorError::InvalidRequest("question must not be empty".into()));
    }

    let context = serde_json::to_string_pretty(snapshot)?;
    debug!(question_len = question.len(), context_len = context.len(), "Asking analyst");

    let prompt = format!(
        "You are a retail business analyst for a small Indonesian grocery store. \
         Amounts are in rupiah. Use only the data below; say so if it is not enough.\n\n\
         Store data (JSON):\n{context}\n\n\
         Question: {question}\n\n\
         Answer concisely in markdown."
    );

    let answer = oracle.generate(OracleRequest::text(prompt)).await?;
    Ok(answer.trim().to_string())
}
