//! Credential verification against the external identity provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::Error;

/// A verified identity, extracted from a bearer credential by the identity
/// provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// The provider's stable subject ID for this identity.
    pub subject: String,
    /// The email address attached to the identity.
    pub email: String,
    /// The display name attached to the identity, if any.
    pub display_name: Option<String>,
    /// The phone number attached to the identity, if any.
    pub phone: Option<String>,
}

/// Verifies a bearer credential and yields a stable identity.
///
/// Abstracting the provider behind a trait keeps the auth middleware and the
/// handlers testable without network access.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Verify `token` with the identity provider.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::CredentialExpired] if the credential was valid once but has expired,
    /// - [Error::Unauthenticated] if the provider rejects the credential,
    /// - or [Error::Upstream] if the provider call itself fails.
    async fn verify(&self, token: &str) -> Result<Identity, Error>;
}

const LOOKUP_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts:lookup";

/// How long to wait for the identity provider before treating the request as
/// failed.
const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Verifies Firebase ID tokens via the Identity Toolkit `accounts:lookup` endpoint.
pub struct FirebaseVerifier {
    api_key: String,
    client: Client,
}

impl FirebaseVerifier {
    /// Create a verifier that authenticates lookups with `api_key`.
    ///
    /// # Errors
    /// Returns an [Error::Upstream] if the HTTP client cannot be constructed.
    pub fn new(api_key: &str) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(VERIFY_TIMEOUT)
            .build()
            .map_err(|error| Error::Upstream(error.to_string()))?;

        Ok(Self {
            api_key: api_key.to_owned(),
            client,
        })
    }
}

#[async_trait]
impl CredentialVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, Error> {
        let response = self
            .client
            .post(LOOKUP_URL)
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({ "idToken": token }))
            .send()
            .await
            .map_err(|error| {
                tracing::error!("Identity provider request failed: {error}");
                Error::Upstream(error.to_string())
            })?;

        let status_ok = response.status().is_success();
        let body = response.text().await.map_err(|error| {
            tracing::error!("Could not read identity provider response: {error}");
            Error::Upstream(error.to_string())
        })?;

        parse_lookup_response(status_ok, &body)
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: String,
    display_name: Option<String>,
    phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupError {
    error: LookupErrorDetail,
}

#[derive(Debug, Deserialize)]
struct LookupErrorDetail {
    message: String,
}

/// Translate the raw `accounts:lookup` response into an [Identity].
///
/// Expired tokens get their own error so the client can refresh instead of
/// re-authenticating.
fn parse_lookup_response(status_ok: bool, body: &str) -> Result<Identity, Error> {
    if !status_ok {
        let message = serde_json::from_str::<LookupError>(body)
            .map(|rejection| rejection.error.message)
            .unwrap_or_default();

        return match message.as_str() {
            "TOKEN_EXPIRED" => Err(Error::CredentialExpired),
            "INVALID_ID_TOKEN" | "USER_NOT_FOUND" | "USER_DISABLED" => {
                Err(Error::Unauthenticated)
            }
            _ => {
                tracing::error!("Unexpected identity provider rejection: {message}");
                Err(Error::Upstream(message))
            }
        };
    }

    let lookup: LookupResponse = serde_json::from_str(body).map_err(|error| {
        tracing::error!("Could not parse identity provider response: {error}");
        Error::Upstream(error.to_string())
    })?;

    let user = lookup.users.into_iter().next().ok_or(Error::Unauthenticated)?;

    Ok(Identity {
        subject: user.local_id,
        email: user.email,
        display_name: user.display_name,
        phone: user.phone_number,
    })
}
