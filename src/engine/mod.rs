//! Core features: score simulation and BI analysis.
//!
//! Both modules build their prompts as pure functions and share the single
//! `CompletionBackend` seam — no hidden state between requests.

pub mod analysis;
pub mod score;
