use async_trait::async_trait;
use serde_json::{Value, json};

use super::{GenerationError, ResponseGenerator};
use crate::email::Email;

const SYSTEM_MESSAGE: &str = "You are a customer support agent. Write a helpful, professional reply to the customer email you are given. Address the customer by name when it is known, acknowledge their issue, propose concrete next steps and sign off as \"Support Team\". Reply with the email body only.";

/// Drafts replies with an OpenAI compatible chat completions endpoint.
#[derive(Clone, Debug)]
pub struct OpenAiGenerator {
    api_hostname: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiGenerator {
    pub fn new(api_hostname: &str, api_key: &str, model: &str) -> Self {
        Self {
            api_hostname: api_hostname.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn prompt(email: &Email) -> String {
        let mut prompt = format!(
            "From: {}\nSubject: {}\nPriority: {}\nSentiment: {}\n",
            email.sender, email.subject, email.priority, email.sentiment
        );
        if !email.tags.is_empty() {
            prompt.push_str(&format!("Tags: {}\n", email.tags.join(", ")));
        }
        if let Some(company) = email.contact_info.as_ref().and_then(|c| c.company.as_ref()) {
            prompt.push_str(&format!("Company: {}\n", company));
        }
        prompt.push_str(&format!("\n{}", email.body));
        prompt
    }
}

fn upstream<E: std::fmt::Display>(err: E) -> GenerationError {
    GenerationError::Upstream(err.to_string())
}

#[async_trait]
impl ResponseGenerator for OpenAiGenerator {
    async fn generate(&self, email: &Email) -> Result<String, GenerationError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_MESSAGE },
                { "role": "user", "content": Self::prompt(email) },
            ],
        });
        let url = format!(
            "{}/v1/chat/completions",
            self.api_hostname.trim_end_matches('/')
        );

        tracing::debug!("Requesting draft for email {} from {}", email.id, url);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(upstream)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Upstream(format!(
                "completion request failed with {}: {}",
                status, body
            )));
        }

        let body: Value = response.json().await.map_err(upstream)?;
        body["choices"][0]["message"]["content"]
            .as_str()
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| GenerationError::Upstream(format!("completion missing content: {}", body)))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
