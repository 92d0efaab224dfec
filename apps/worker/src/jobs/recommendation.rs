//! Recommendation request
//!
//! Sends the sampled history to the language model and splits its answer
//! into candidate titles and a short rationale.

use tracing::{debug, info};

use crate::error::{WorkerError, WorkerResult};
use crate::jobs::history_sample::join_titles;
use crate::services::CompletionBackend;

/// Separates the title list from the rationale in the model's answer
pub const DELIMITER: &str = "+++";

/// Parsed model answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationResponse {
    /// Titles in the order the model gave them; may contain duplicates
    pub titles: Vec<String>,
    /// Becomes the collection summary
    pub rationale: String,
}

/// Prompt asking for `amount` recommendations based on `watched`
pub fn build_prompt(watched: &str, amount: usize) -> String {
    format!(
        "Can you give me movie recommendations based on what I've watched? \
         I've watched {watched}. \
         Can you base your recommendations solely on what I've watched already? \
         I need around {amount}. \
         Please give me the comma separated result, and then a very brief explanation \
         separated from the movie values, separated by 3 pluses like '{DELIMITER}'. \
         Not a numbered list."
    )
}

/// Split a raw answer into titles and rationale
///
/// Only the first delimiter splits; anything after it, including further
/// delimiters, is rationale.
pub fn parse_recommendations(raw: &str) -> WorkerResult<RecommendationResponse> {
    let (list, rationale) = raw.split_once(DELIMITER).ok_or_else(|| {
        WorkerError::MalformedResponse(format!("no '{}' delimiter in model answer", DELIMITER))
    })?;

    let titles = list
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    Ok(RecommendationResponse {
        titles,
        rationale: rationale.trim().to_string(),
    })
}

/// Execute the recommendation job
///
/// Returns `Ok(None)` without calling the model when there is no history.
pub async fn execute<B>(
    backend: &B,
    watched: &[String],
    recommended_amount: usize,
) -> WorkerResult<Option<RecommendationResponse>>
where
    B: CompletionBackend + ?Sized,
{
    if watched.is_empty() {
        info!("No watch history, skipping recommendations");
        return Ok(None);
    }

    let prompt = build_prompt(&join_titles(watched), recommended_amount);
    let answer = backend.complete(&prompt).await?;
    debug!(answer = %answer, "Model answered");

    let response = parse_recommendations(&answer)?;
    info!(
        count = response.titles.len(),
        "Received {} recommendations",
        response.titles.len()
    );
    Ok(Some(response))
}
