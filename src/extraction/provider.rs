//! The extraction provider: a text-in, structured-object-out language model
//! call with a fixed schema contract.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use time::Date;

use crate::{
    Error,
    transaction::TransactionType,
    transaction::category::{DEFAULT_CATEGORY, EXPENSE_CATEGORIES, INCOME_CATEGORIES},
};

/// The raw structured output of the extraction provider, before validation.
///
/// `original_text` is deliberately absent: the caller attaches it after the
/// provider responds, so the provider cannot tamper with the audit copy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractedTransaction {
    /// Whether the utterance described income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The amount mentioned in the utterance.
    pub amount: f64,
    /// The inferred category; must be validated against the set for the type.
    pub category: String,
    /// The store or person mentioned, if any.
    #[serde(default)]
    pub vendor: Option<String>,
    /// The calendar date named in the utterance, if any.
    #[serde(default)]
    pub date: Option<Date>,
}

/// Converts a free-text utterance into an [ExtractedTransaction].
///
/// `current_date` anchors relative dates like "yesterday" and is the default
/// when the utterance names no date.
#[async_trait]
pub trait TransactionExtractor: Send + Sync {
    /// Run the extraction.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::Upstream] if the provider call fails or times out,
    /// - or [Error::InvalidExtraction] if the provider's output cannot be
    ///   parsed against the schema.
    async fn extract(&self, text: &str, current_date: Date)
    -> Result<ExtractedTransaction, Error>;
}

const CHAT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// A fast model is enough for short-utterance parsing, and keeps the voice
/// entry flow snappy.
const MODEL: &str = "llama-3.1-8b-instant";

/// How long to wait for the extraction provider before treating the call as a
/// processing failure.
const EXTRACT_TIMEOUT: Duration = Duration::from_secs(30);

/// Extracts transaction drafts with the Groq chat completions API.
pub struct GroqExtractor {
    api_key: String,
    client: Client,
}

impl GroqExtractor {
    /// Create an extractor that authenticates with `api_key`.
    ///
    /// # Errors
    /// Returns an [Error::Upstream] if the HTTP client cannot be constructed.
    pub fn new(api_key: &str) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(EXTRACT_TIMEOUT)
            .build()
            .map_err(|error| Error::Upstream(error.to_string()))?;

        Ok(Self {
            api_key: api_key.to_owned(),
            client,
        })
    }
}

#[async_trait]
impl TransactionExtractor for GroqExtractor {
    async fn extract(
        &self,
        text: &str,
        current_date: Date,
    ) -> Result<ExtractedTransaction, Error> {
        let body = json!({
            "model": MODEL,
            // Zero temperature for strict schema adherence.
            "temperature": 0,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": build_system_prompt(current_date) },
                { "role": "user", "content": text },
            ],
        });

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                tracing::error!("Extraction provider request failed: {error}");
                Error::Upstream(error.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::error!("Extraction provider returned HTTP {status}: {detail}");
            return Err(Error::Upstream(format!(
                "extraction provider returned HTTP {status}"
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|error| {
            tracing::error!("Could not read extraction provider response: {error}");
            Error::Upstream(error.to_string())
        })?;

        parse_completion(&completion)
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Pull the JSON object out of the completion and parse it against the schema.
fn parse_completion(completion: &ChatCompletionResponse) -> Result<ExtractedTransaction, Error> {
    let content = completion
        .choices
        .first()
        .map(|choice| choice.message.content.as_str())
        .ok_or_else(|| Error::InvalidExtraction("completion contained no choices".to_owned()))?;

    serde_json::from_str(content)
        .map_err(|error| Error::InvalidExtraction(format!("{error}: {content}")))
}

/// Build the system prompt, anchored on `current_date`.
///
/// The wording mirrors the client-facing contract: type inferred from
/// spending/receiving language, category constrained per type with "Other" as
/// the fallback, and relative dates resolved against the current date.
fn build_system_prompt(current_date: Date) -> String {
    format!(
        "You are an expert at extracting transaction data from user text. \
        Today's date is {current_date}. \
        Respond with a JSON object with the keys \"type\", \"amount\", \"category\", \
        \"vendor\", and \"date\". \
        You must extract the amount, vendor, category, and date. \
        If the user mentions spending, the type is \"expense\". \
        If the user mentions \"credit\", \"salary\", or \"received\", the type is \"income\". \
        If type is \"income\", the category MUST be one of: {}. \
        If type is \"expense\", the category MUST be one of: {}. \
        If no specific category is mentioned, use \"{DEFAULT_CATEGORY}\". \
        The vendor is the store or person, or null if not mentioned. \
        If the user says \"today\", use {current_date}. If they say \"yesterday\", calculate \
        and use the previous day's date in YYYY-MM-DD format. \
        If no date is mentioned, the date field must be {current_date} in YYYY-MM-DD format.",
        INCOME_CATEGORIES.join(", "),
        EXPENSE_CATEGORIES.join(", "),
    )
}
