//! BI analysis over Pirate Funnel data.
//!
//! Builds one analysis prompt from a truncated slice of the caller's data
//! context plus the full query, runs a single completion, and returns the
//! cleaned text as-is. The prompt asks for a JSON-like results object
//! embedded in prose, but the response is not parsed or validated here —
//! downstream consumers read it as free text.

use tracing::info;

use crate::error::BoxsightError;
use crate::llm::CompletionBackend;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Token budget for one analysis.
const ANALYSIS_MAX_TOKENS: u32 = 1000;

/// Sampling temperature. Analysis wants some variety, unlike scoring.
const ANALYSIS_TEMPERATURE: f64 = 0.7;

/// Only the first slice of the data context goes into the prompt; the model
/// is told to extrapolate trends from it.
const CONTEXT_PREVIEW_CHARS: usize = 1000;

// ---------------------------------------------------------------------------
// Prompt construction
// ---------------------------------------------------------------------------

/// Build the BI analysis prompt. The data context is truncated to its first
/// `CONTEXT_PREVIEW_CHARS` characters; the query is embedded in full.
pub fn build_analysis_prompt(data_context: &str, query: &str) -> String {
    let preview = truncate_chars(data_context, CONTEXT_PREVIEW_CHARS);
    format!(
        r#"You are a BI expert for Goodiebox, a Danish subscription business selling beauty product boxes across 10+ European markets. Analyze the provided data to answer the query. Use clear, concise language suitable for business stakeholders. Return numerical results (if applicable) and a brief explanation.

**Data Context**:
- Data Source: Pirate Funnel data (daily metrics per market).
- Metrics: Intake (new members, reactivations), CAC (cost per acquisition, €), ad spend (€), sales (daily actuals).
- Markets: Denmark, Germany, Sweden, Norway, Poland, Finland, Netherlands, Belgium, Switzerland, Austria.
- Time Period: January to June 2025.
- Example Data: {preview}... (truncated for brevity; use trends and patterns).
- Notes: Belgium price change on March 10, 2025 (base price from €12.48 to €11.98, delivery from €0 to €1.99).

**Query**:
{query}

**Instructions**:
- For numerical results (e.g., averages, deltas), return in a JSON-like format: {{"results": {{"metric": value, ...}}}}.
- Provide a concise explanation (2-3 sentences) of the results or trends.
- If the query is open-ended, focus on key drivers (e.g., price perception, ad spend, market dynamics).
- If data is insufficient, note limitations and provide a reasonable estimate or suggestion."#
    )
}

/// First `limit` characters of `text`, cut on a char boundary.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Answer a BI query against the supplied data context.
pub async fn analyze(
    llm: &dyn CompletionBackend,
    data_context: &str,
    query: &str,
) -> Result<String, BoxsightError> {
    let prompt = build_analysis_prompt(data_context, query);
    let analysis = llm
        .complete(&prompt, ANALYSIS_MAX_TOKENS, ANALYSIS_TEMPERATURE)
        .await?;
    info!(chars = analysis.len(), "BI analysis complete");
    Ok(analysis)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
