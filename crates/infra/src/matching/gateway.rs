//! Model gateway client implementing the match provider port
//!
//! Posts a chat-completion request asking the model for a fixed JSON
//! shape and parses the first balanced JSON object found in the reply
//! text. The model is free to wrap the object in prose or code fences;
//! anything unparseable is an upstream error the service degrades to an
//! empty candidate list.

use std::time::Duration;

use async_trait::async_trait;
use clinica_core::matching::ports::MatchProvider;
use clinica_domain::{ClinicaError, MatchQuery, MatchResponse, MatchingConfig, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::http::HttpClient;

/// Configuration for the model gateway client
#[derive(Debug, Clone)]
pub struct ModelGatewayConfig {
    /// Base URL of the gateway
    pub gateway_url: String,
    /// Bearer key for the gateway
    pub api_key: String,
    /// Model identifier forwarded with each request
    pub model: String,
    /// Request timeout; matching calls are slow but bounded
    pub timeout: Duration,
}

impl ModelGatewayConfig {
    /// Build a gateway config from the application matching section.
    pub fn from_matching_config(config: &MatchingConfig) -> Self {
        Self {
            gateway_url: config.gateway_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

const SYSTEM_PROMPT: &str = "You are a physician-matching assistant. Given a patient's query, \
return ONLY a JSON object of the form {\"physicians\": [{\"id\": string, \"name\": string, \
\"specialty\": string, \"rating\": number, \"distance\": string, \"availability\": string, \
\"matchScore\": number, \"bio\": string, \"education\": string, \"certifications\": [string], \
\"experience\": string}]} with at most five candidates.";

/// HTTP client for the hosted model gateway
pub struct ModelGatewayClient {
    http: HttpClient,
    config: ModelGatewayConfig,
}

impl ModelGatewayClient {
    /// Create a new gateway client.
    pub fn new(config: ModelGatewayConfig) -> Result<Self> {
        let http = HttpClient::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.config.gateway_url.trim_end_matches('/'))
    }

    fn user_prompt(query: &MatchQuery) -> Result<String> {
        let query_json = serde_json::to_string(query)
            .map_err(|err| ClinicaError::Internal(format!("failed to encode query: {err}")))?;
        Ok(format!("Find matching physicians for this patient query: {query_json}"))
    }
}

#[async_trait]
impl MatchProvider for ModelGatewayClient {
    async fn find_candidates(&self, query: &MatchQuery) -> Result<MatchResponse> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT.to_string() },
                ChatMessage { role: "user", content: Self::user_prompt(query)? },
            ],
            temperature: 0.2,
        };

        debug!(model = %self.config.model, "forwarding matching query to model gateway");
        let request = self
            .http
            .request(Method::POST, self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body);
        let response = self.http.send(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClinicaError::Upstream(format!("model gateway returned {status}")));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|err| ClinicaError::Upstream(format!("unreadable gateway response: {err}")))?;
        let content = chat
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| ClinicaError::Upstream("gateway response had no choices".into()))?;

        let object = extract_first_json(content).ok_or_else(|| {
            warn!("model reply contained no JSON object");
            ClinicaError::Upstream("model reply contained no JSON object".into())
        })?;
        serde_json::from_str(object)
            .map_err(|err| ClinicaError::Upstream(format!("model reply was not the expected shape: {err}")))
    }
}

/// Find the first balanced JSON object in free-form model output.
///
/// Tracks brace depth outside of string literals so braces inside
/// candidate bios do not truncate the object.
fn extract_first_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use clinica_domain::Urgency;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(uri: &str) -> ModelGatewayConfig {
        ModelGatewayConfig {
            gateway_url: uri.into(),
            api_key: "gw-key".into(),
            model: "match-1".into(),
            timeout: Duration::from_secs(2),
        }
    }

    fn query() -> MatchQuery {
        MatchQuery {
            chief_concern: "intermittent chest pain".into(),
            location: "Boston, MA".into(),
            urgency: Urgency::Soon,
            specialty: Some("cardiology".into()),
            insurance_provider: None,
            preferred_gender: None,
            language_preference: None,
            virtual_visit: Some(false),
            accepting_new_patients: Some(true),
        }
    }

    fn chat_reply(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
    }

    #[test]
    fn extracts_a_bare_object() {
        let text = r#"{"physicians": []}"#;
        assert_eq!(extract_first_json(text), Some(text));
    }

    #[test]
    fn extracts_an_object_wrapped_in_prose_and_fences() {
        let text = "Here are your matches:\n```json\n{\"physicians\": [{\"id\": \"d1\", \
                    \"name\": \"Dr. A {cardio}\", \"specialty\": \"Cardiology\"}]}\n```\nHope it helps!";
        let object = extract_first_json(text).unwrap();
        assert!(object.starts_with('{') && object.ends_with('}'));
        let parsed: MatchResponse = serde_json::from_str(object).unwrap();
        assert_eq!(parsed.physicians.len(), 1);
    }

    #[test]
    fn reports_nothing_for_json_free_text() {
        assert!(extract_first_json("I could not find any matches, sorry.").is_none());
        assert!(extract_first_json("unbalanced { \"physicians\": [").is_none());
    }

    #[tokio::test]
    async fn parses_candidates_out_of_a_chatty_reply() {
        let server = MockServer::start().await;
        let content = "Sure! {\"physicians\": [{\"id\": \"d1\", \"name\": \"Dr. Alice Hart\", \
                       \"specialty\": \"Cardiology\", \"rating\": 4.8, \"matchScore\": 0.91}]}";
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer gw-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(content)))
            .expect(1)
            .mount(&server)
            .await;

        let client = ModelGatewayClient::new(config(&server.uri())).unwrap();
        let response = client.find_candidates(&query()).await.unwrap();
        assert_eq!(response.physicians.len(), 1);
        assert_eq!(response.physicians[0].name, "Dr. Alice Hart");
    }

    #[tokio::test]
    async fn non_ok_gateway_status_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = ModelGatewayClient::new(config(&server.uri())).unwrap();
        let result = client.find_candidates(&query()).await;
        assert!(matches!(result, Err(ClinicaError::Upstream(_))));
    }

    #[tokio::test]
    async fn json_free_model_reply_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_reply("I'm unable to help with that.")),
            )
            .mount(&server)
            .await;

        let client = ModelGatewayClient::new(config(&server.uri())).unwrap();
        let result = client.find_candidates(&query()).await;
        assert!(matches!(result, Err(ClinicaError::Upstream(_))));
    }
}
