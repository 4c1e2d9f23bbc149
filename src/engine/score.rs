//! Future-box satisfaction score simulation.
//!
//! Builds one deterministic prompt embedding historical box data and the
//! candidate box, samples the completion API five times at temperature 0,
//! validates each sample against the 1–5 satisfaction scale, and reports
//! the arithmetic mean to two decimal places. A single invalid sample
//! aborts the whole estimate — the loop is an averaging strategy, not a
//! retry strategy.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::BoxsightError;
use crate::llm::CompletionBackend;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Number of completion samples averaged per estimate.
pub const SAMPLE_COUNT: usize = 5;

/// Token budget per sample. The model is asked for a bare number.
const SCORE_MAX_TOKENS: u32 = 50;

/// Sampling temperature. Zero keeps the samples as stable as the API allows.
const SCORE_TEMPERATURE: f64 = 0.0;

const SCORE_MIN: Decimal = dec!(1.0);
const SCORE_MAX: Decimal = dec!(5.0);

// ---------------------------------------------------------------------------
// Prompt construction
// ---------------------------------------------------------------------------

/// Build the satisfaction-score prompt. Both inputs are embedded verbatim;
/// no size limit is enforced.
pub fn build_score_prompt(historical_data: &str, future_box_info: &str) -> String {
    format!(
        r#"You are a Goodiebox satisfaction expert simulating a member satisfaction score for a future subscription box. Use this data context:
**Data Explanation**:
- Historical Data: Past boxes with details like:
  - Box SKU: Unique box identifier (e.g., DK-2504-CLA-2L).
  - Products: Number of items, listed as Product SKUs.
  - Total Retail Value: Sum of product retail prices in €.
  - Unique Categories: Number of distinct product categories (e.g., skincare, makeup).
  - Full-size/Premium: Counts of full-size items and those > €20.
  - Total Weight: Sum of product weights in grams.
  - Avg Brand/Category Ratings: Average ratings (out of 5).
  - Historical Score: Past average box rating (out of 5, e.g., 4.23).
- Future Box Info: Details of a new box (same format, no historical score yet).
**Inputs**:
Historical Data: {historical_data}
Future Box Info: {future_box_info}
Simulate the score by analyzing trends in past member reactions, product variety, retail value, brand reputation, category ratings, and surprise value. Return a satisfaction score on a 1-5 scale, with exactly two decimal places (e.g., 4.23). Return only the numerical score (e.g., 4.23)."#
    )
}

// ---------------------------------------------------------------------------
// Estimation
// ---------------------------------------------------------------------------

/// Simulate a 1–5 satisfaction score for a future box.
///
/// Issues `SAMPLE_COUNT` sequential completions and returns the mean
/// formatted with exactly two decimal digits, e.g. `"4.20"`.
pub async fn estimate_score(
    llm: &dyn CompletionBackend,
    historical_data: &str,
    future_box_info: &str,
) -> Result<String, BoxsightError> {
    let prompt = build_score_prompt(historical_data, future_box_info);

    let mut samples = Vec::with_capacity(SAMPLE_COUNT);
    for round in 0..SAMPLE_COUNT {
        let text = llm
            .complete(&prompt, SCORE_MAX_TOKENS, SCORE_TEMPERATURE)
            .await?;
        let sample = parse_sample(&text)?;
        debug!(round = round + 1, sample = %sample, "Collected score sample");
        samples.push(sample);
    }

    let score = format_mean(&samples)?;
    info!(score = %score, samples = samples.len(), "Averaged box score");
    Ok(score)
}

/// Parse one completion as a score sample on the 1–5 scale.
fn parse_sample(text: &str) -> Result<Decimal, BoxsightError> {
    Decimal::from_str(text.trim())
        .ok()
        .filter(|value| (SCORE_MIN..=SCORE_MAX).contains(value))
        .ok_or_else(|| BoxsightError::InvalidScoreFormat(text.to_string()))
}

/// Mean of the collected samples, rescaled to two decimal places.
fn format_mean(samples: &[Decimal]) -> Result<String, BoxsightError> {
    if samples.is_empty() {
        return Err(BoxsightError::NoValidScores);
    }
    let sum: Decimal = samples.iter().copied().sum();
    let mut mean = (sum / Decimal::from(samples.len() as u64)).round_dp(2);
    mean.rescale(2);
    Ok(mean.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
