//! Vera fact-check adapter.
//!
//! One outbound request per call, bounded timeout, no retries. Whatever
//! `(status, body)` comes back is handed verbatim to the decoder. Auth
//! header and body field spelling differ between Vera deployments, so both
//! are configuration, not constants.

use crate::adapters::factcheck::decoder;
use crate::domain::{FactCheckRequest, FactCheckResult, FailureKind};
use crate::ports::FactCheckPort;
use crate::shared::config::{AuthScheme, UserField};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

/// Vera API adapter. Stateless after construction; shared across tasks.
pub struct VeraAdapter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    auth: AuthScheme,
    user_field: UserField,
    timeout: Duration,
}

impl VeraAdapter {
    pub fn new(
        api_url: String,
        api_key: String,
        auth: AuthScheme,
        user_field: UserField,
        timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            auth,
            user_field,
            timeout,
        }
    }

    /// JSON body for one request, with the deployment's user-field spelling.
    fn payload(&self, request: &FactCheckRequest) -> Value {
        let user_key = match self.user_field {
            UserField::Snake => "user_id",
            UserField::Camel => "userId",
        };
        json!({
            "query": request.query,
            user_key: request.user_id,
            "stream": request.streaming,
        })
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth {
            AuthScheme::Bearer => builder.header("Authorization", format!("Bearer {}", self.api_key)),
            AuthScheme::ApiKey => builder.header("X-API-Key", self.api_key.as_str()),
        }
    }

    /// Fixed instruction line joining several claims into one query.
    fn combined_query(claims: &[String]) -> String {
        let mut q = String::from("Vérifie ces affirmations:");
        for claim in claims {
            q.push_str("\n- ");
            q.push_str(claim);
        }
        q
    }
}

#[async_trait::async_trait]
impl FactCheckPort for VeraAdapter {
    async fn fact_check(&self, query: &str, user_id: &str) -> FactCheckResult {
        let request = FactCheckRequest::new(user_id, query);
        info!(user_id, query_len = query.len(), "sending fact-check query");

        let builder = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&self.payload(&request));

        let response = match self.apply_auth(builder).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(user_id, "fact-check request timed out");
                return FactCheckResult::fail(
                    FailureKind::Timeout,
                    format!("Timeout de l'API Vera après {}s", self.timeout.as_secs()),
                );
            }
            Err(e) => {
                warn!(user_id, error = %e, "fact-check request failed");
                return FactCheckResult::fail(FailureKind::Network, format!("Erreur Vera: {e}"));
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                warn!(user_id, error = %e, "failed to read fact-check body");
                return FactCheckResult::fail(FailureKind::Network, format!("Erreur Vera: {e}"));
            }
        };

        let result = decoder::decode(status, &body);
        if result.succeeded {
            info!(user_id, answer_len = result.answer.len(), "fact-check succeeded");
        } else {
            warn!(user_id, kind = ?result.failure_kind, "fact-check failed");
        }
        result
    }

    async fn fact_check_many(&self, claims: &[String], user_id: &str) -> FactCheckResult {
        self.fact_check(&Self::combined_query(claims), user_id)
            .await
    }
}
