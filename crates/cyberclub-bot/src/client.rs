//! Typed HTTP client for the content API.
//!
//! Every call enforces the configured request timeout, so a hung gateway
//! fails the operation instead of wedging a command handler or a job tick.
//! Status codes map back onto the error taxonomy: 404 → NotFound,
//! 422 → Validation, anything else non-2xx → Http.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use cyberclub_core::config::ClientConfig;
use cyberclub_core::error::{ClubError, Result};
use cyberclub_core::traits::{ContentApi, EventsApi, FactsApi, JokesApi, QuizzesApi, QuotesApi};
use cyberclub_core::types::{
    Event, EventPatch, Fact, FactPatch, Joke, JokePatch, QuizItem, QuizPatch, Quote, QuotePatch,
};

pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClubError::Http(format!("HTTP client build failed: {e}")))?;
        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClubError::Timeout(format!("request to {url} timed out"))
            } else {
                ClubError::Http(format!("request to {url} failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| v["detail"].as_str().map(String::from))
                .unwrap_or_else(|| status.to_string());
            return Err(classify_status(status, detail));
        }

        response
            .json()
            .await
            .map_err(|e| ClubError::Http(format!("invalid response from {url}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<T, Value>(Method::GET, path, None).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.request::<Value, Value>(Method::DELETE, path, None)
            .await
            .map(|_| ())
    }
}

fn classify_status(status: StatusCode, detail: String) -> ClubError {
    match status {
        StatusCode::NOT_FOUND => ClubError::NotFound(detail),
        StatusCode::UNPROCESSABLE_ENTITY => ClubError::Validation(detail),
        _ => ClubError::Http(format!("{status}: {detail}")),
    }
}

fn encode(identity: &str) -> String {
    urlencoding::encode(identity).into_owned()
}

#[async_trait]
impl EventsApi for ApiClient {
    async fn list_events(&self) -> Result<Vec<Event>> {
        self.get_json("/events").await
    }

    async fn get_event(&self, title: &str) -> Result<Event> {
        self.get_json(&format!("/events/{}", encode(title))).await
    }

    async fn create_event(&self, event: &Event) -> Result<Event> {
        self.request(Method::POST, "/events", Some(event)).await
    }

    async fn update_event(&self, title: &str, patch: &EventPatch) -> Result<Event> {
        self.request(Method::PUT, &format!("/events/{}", encode(title)), Some(patch))
            .await
    }

    async fn delete_event(&self, title: &str) -> Result<()> {
        self.delete(&format!("/events/{}", encode(title))).await
    }
}

#[async_trait]
impl FactsApi for ApiClient {
    async fn list_facts(&self) -> Result<Vec<Fact>> {
        self.get_json("/facts").await
    }

    async fn get_fact(&self, id: &str) -> Result<Fact> {
        self.get_json(&format!("/facts/{}", encode(id))).await
    }

    async fn create_fact(&self, fact: &Fact) -> Result<Fact> {
        self.request(Method::POST, "/facts", Some(fact)).await
    }

    async fn update_fact(&self, id: &str, patch: &FactPatch) -> Result<Fact> {
        self.request(Method::PUT, &format!("/facts/{}", encode(id)), Some(patch))
            .await
    }

    async fn delete_fact(&self, id: &str) -> Result<()> {
        self.delete(&format!("/facts/{}", encode(id))).await
    }
}

#[async_trait]
impl JokesApi for ApiClient {
    async fn list_jokes(&self) -> Result<Vec<Joke>> {
        self.get_json("/jokes").await
    }

    async fn get_joke(&self, id: &str) -> Result<Joke> {
        self.get_json(&format!("/jokes/{}", encode(id))).await
    }

    async fn create_joke(&self, joke: &Joke) -> Result<Joke> {
        self.request(Method::POST, "/jokes", Some(joke)).await
    }

    async fn update_joke(&self, id: &str, patch: &JokePatch) -> Result<Joke> {
        self.request(Method::PUT, &format!("/jokes/{}", encode(id)), Some(patch))
            .await
    }

    async fn delete_joke(&self, id: &str) -> Result<()> {
        self.delete(&format!("/jokes/{}", encode(id))).await
    }
}

#[async_trait]
impl QuotesApi for ApiClient {
    async fn list_quotes(&self) -> Result<Vec<Quote>> {
        self.get_json("/quotes").await
    }

    async fn get_quote(&self, id: &str) -> Result<Quote> {
        self.get_json(&format!("/quotes/{}", encode(id))).await
    }

    async fn create_quote(&self, quote: &Quote) -> Result<Quote> {
        self.request(Method::POST, "/quotes", Some(quote)).await
    }

    async fn update_quote(&self, id: &str, patch: &QuotePatch) -> Result<Quote> {
        self.request(Method::PUT, &format!("/quotes/{}", encode(id)), Some(patch))
            .await
    }

    async fn delete_quote(&self, id: &str) -> Result<()> {
        self.delete(&format!("/quotes/{}", encode(id))).await
    }
}

#[async_trait]
impl QuizzesApi for ApiClient {
    async fn list_quizzes(&self) -> Result<Vec<QuizItem>> {
        self.get_json("/quiz").await
    }

    async fn get_quiz(&self, id: &str) -> Result<QuizItem> {
        self.get_json(&format!("/quiz/{}", encode(id))).await
    }

    async fn create_quiz(&self, quiz: &QuizItem) -> Result<QuizItem> {
        self.request(Method::POST, "/quiz", Some(quiz)).await
    }

    async fn update_quiz(&self, id: &str, patch: &QuizPatch) -> Result<QuizItem> {
        self.request(Method::PUT, &format!("/quiz/{}", encode(id)), Some(patch))
            .await
    }

    async fn delete_quiz(&self, id: &str) -> Result<()> {
        self.delete(&format!("/quiz/{}", encode(id))).await
    }
}

#[async_trait]
impl ContentApi for ApiClient {
    async fn get_about(&self) -> Result<Value> {
        self.get_json("/about").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "event 'x'".into()),
            ClubError::NotFound(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::UNPROCESSABLE_ENTITY, "too few options".into()),
            ClubError::Validation(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, "upstream".into()),
            ClubError::Http(_)
        ));
    }

    #[test]
    fn test_identity_encoding() {
        assert_eq!(encode("CTF Night"), "CTF%20Night");
        assert_eq!(encode("plain"), "plain");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new(&ClientConfig {
            api_base_url: "http://localhost:8000/".into(),
            request_timeout_secs: 5,
        })
        .expect("client");
        assert_eq!(client.base_url, "http://localhost:8000");
    }
}
