//! HTTP client for the Protocolo 7D backend.

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::types::{
    CompleteDayRequest, CompleteStepResponse, LoginRequest, LoginResponse, OnboardingRequest,
    SaveToolDataRequest, UserProfile,
};
use crate::error::{CoreError, NetworkError};
use crate::progress::{ProgressSnapshot, ToolAnswers};
use crate::storage::Config;

/// One request, one response. No retries, no idempotency keys.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the server root; every path gets an `/api` prefix.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// initialisation).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, NetworkError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::from_reqwest("<client>", e))?;
        Ok(Self {
            http,
            base_url: format!("{}/api", base_url.trim_end_matches('/')),
        })
    }

    /// Build from configuration, honouring the environment override.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, CoreError> {
        let base_url = config.backend_url()?;
        Ok(Self::new(&base_url, config.api.timeout())?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Response, NetworkError> {
        tracing::debug!(path, "sending backend request");
        let resp = request.send().await.map_err(|e| {
            tracing::warn!(path, error = %e, "backend request failed");
            NetworkError::from_reqwest(path, e)
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        let detail = error_detail(&text);
        tracing::warn!(path, status = status.as_u16(), %detail, "backend rejected request");
        Err(NetworkError::Status {
            path: path.to_string(),
            status: status.as_u16(),
            detail,
        })
    }

    async fn decode<T: DeserializeOwned>(path: &str, resp: Response) -> Result<T, NetworkError> {
        let text = resp
            .text()
            .await
            .map_err(|e| NetworkError::from_reqwest(path, e))?;
        serde_json::from_str(&text).map_err(|e| NetworkError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Response, NetworkError> {
        self.send(path, self.http.post(self.url(path)).json(body))
            .await
    }

    async fn get(&self, path: &str) -> Result<Response, NetworkError> {
        self.send(path, self.http.get(self.url(path))).await
    }

    /// `POST /auth/login`. Creates the account on first use.
    pub async fn login(&self, email: &str) -> Result<LoginResponse, NetworkError> {
        let path = "/auth/login";
        let resp = self.post(path, &LoginRequest { email }).await?;
        Self::decode(path, resp).await
    }

    /// `POST /auth/onboarding`. Also starts the clean-time counter server-side.
    pub async fn complete_onboarding(
        &self,
        email: &str,
        target_behavior: &str,
    ) -> Result<(), NetworkError> {
        self.post(
            "/auth/onboarding",
            &OnboardingRequest {
                email,
                vicio_alvo: target_behavior,
            },
        )
        .await?;
        Ok(())
    }

    /// `GET /user/{email}`.
    pub async fn get_user(&self, email: &str) -> Result<UserProfile, NetworkError> {
        let path = format!("/user/{}", urlencoding::encode(email));
        let resp = self.get(&path).await?;
        Self::decode(&path, resp).await
    }

    /// `GET /progress/{email}`.
    pub async fn get_progress(&self, email: &str) -> Result<ProgressSnapshot, NetworkError> {
        let path = format!("/progress/{}", urlencoding::encode(email));
        let resp = self.get(&path).await?;
        Self::decode(&path, resp).await
    }

    /// `POST /progress/complete-day`.
    ///
    /// Not idempotent across retries: a repeated call after a lost response
    /// may award points twice.
    pub async fn complete_step(
        &self,
        email: &str,
        step: u32,
        points: u32,
    ) -> Result<CompleteStepResponse, NetworkError> {
        let path = "/progress/complete-day";
        let resp = self
            .post(
                path,
                &CompleteDayRequest {
                    email,
                    dia: step,
                    pontos: points,
                },
            )
            .await?;
        Self::decode(path, resp).await
    }

    /// `POST /progress/save-tool-data`. Overwrites whatever was stored for the step.
    pub async fn save_tool_answers(
        &self,
        email: &str,
        step: u32,
        answers: &ToolAnswers,
    ) -> Result<(), NetworkError> {
        self.post(
            "/progress/save-tool-data",
            &SaveToolDataRequest {
                email,
                dia: step,
                data: answers,
            },
        )
        .await?;
        Ok(())
    }
}

/// FastAPI puts the reason in `{"detail": ...}`; fall back to the raw body.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(obj)) => match obj.get("detail") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        _ => body.to_string(),
    }
}
