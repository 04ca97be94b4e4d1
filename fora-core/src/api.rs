//! Request/response contracts of the remote analysis service.
//!
//! [`AnalysisService`] is the seam the controller talks to; [`HttpAnalysisClient`]
//! implements it over HTTP with JSON bodies. All mutating calls carry the
//! cross-site-request token from a [`CredentialSource`].
//!
//! The service reports application failures as `{"success": false, "error": ...}`,
//! often with a 4xx/5xx status, so bodies are decoded before the status is judged.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::ids::{InterviewId, TopicId};
use crate::types::{null_as_default, Answer, ChatMessage, ThemeDraft, TopicResult};

/// Header carrying the cross-site-request token on mutating calls.
pub const CSRF_HEADER: &str = "X-CSRFToken";

#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn list_results(&self) -> Result<Vec<TopicResult>, ApiError>;
    async fn list_answers(&self, topic: &TopicId) -> Result<Vec<Answer>, ApiError>;
    async fn run(&self, topic: &TopicId) -> Result<(), ApiError>;
    async fn discover(&self, topic: &TopicId, custom_prompt: &str) -> Result<Vec<ThemeDraft>, ApiError>;
    async fn classify(&self, topic: &TopicId, themes: &[ThemeDraft]) -> Result<(), ApiError>;
    async fn chat(&self, message: &str, history: &[ChatMessage]) -> Result<String, ApiError>;
}

/// Source of request credentials. Retrieval is opaque to the client.
pub trait CredentialSource: Send + Sync {
    fn csrf_token(&self) -> Option<String>;

    fn session_cookie(&self) -> Option<String> {
        None
    }
}

/// Credentials fixed at startup (from config or environment).
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    pub csrf_token: Option<String>,
    pub session_cookie: Option<String>,
}

impl CredentialSource for StaticCredentials {
    fn csrf_token(&self) -> Option<String> {
        self.csrf_token.clone()
    }

    fn session_cookie(&self) -> Option<String> {
        self.session_cookie.clone()
    }
}

/// The six service routes.
#[derive(Debug, Clone, Copy)]
pub enum Endpoint<'a> {
    Results,
    Answers(&'a TopicId),
    Run(&'a TopicId),
    Discover(&'a TopicId),
    Classify(&'a TopicId),
    Chat,
}

impl Endpoint<'_> {
    pub fn path(&self, interview: &InterviewId) -> String {
        match self {
            Endpoint::Results => format!("/results/{interview}/api/results/"),
            Endpoint::Answers(topic) => format!("/results/api/answers/{topic}/"),
            Endpoint::Run(topic) => format!("/results/api/run/{topic}/"),
            Endpoint::Discover(topic) => format!("/results/api/discover/{topic}/"),
            Endpoint::Classify(topic) => format!("/results/api/classify/{topic}/"),
            Endpoint::Chat => format!("/results/{interview}/api/chat/"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResultsBody {
    #[serde(default, deserialize_with = "null_as_default")]
    results: Vec<TopicResult>,
}

#[derive(Debug, Deserialize)]
struct AnswersBody {
    #[serde(default, deserialize_with = "null_as_default")]
    answers: Vec<Answer>,
}

/// Response of every mutating route; unused fields stay at their defaults.
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    proposed_themes: Vec<ThemeDraft>,
    #[serde(default)]
    response: Option<String>,
}

#[derive(Serialize)]
struct DiscoverRequest<'a> {
    custom_prompt: &'a str,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    themes: &'a [ThemeDraft],
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    message: &'a str,
    history: &'a [ChatMessage],
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Decodes a listing response. A non-2xx status is always a failure, using the
/// body's `error` field as the message when there is one.
fn decode_listing<T: serde::de::DeserializeOwned>(status: u16, bytes: &[u8]) -> Result<T, ApiError> {
    if !is_success(status) {
        let message = serde_json::from_slice::<Envelope>(bytes).ok().and_then(|e| e.error);
        return Err(match message {
            Some(message) => ApiError::rejected(Some(message)),
            None => ApiError::Status { status },
        });
    }
    Ok(serde_json::from_slice(bytes)?)
}

/// Decodes a mutating call's envelope and turns `success: false` into `Rejected`.
fn decode_envelope(status: u16, bytes: &[u8]) -> Result<Envelope, ApiError> {
    let envelope: Envelope = match serde_json::from_slice(bytes) {
        Ok(envelope) => envelope,
        Err(_) if !is_success(status) => return Err(ApiError::Status { status }),
        Err(err) => return Err(err.into()),
    };
    if envelope.success {
        Ok(envelope)
    } else {
        Err(ApiError::rejected(envelope.error))
    }
}

/// HTTP implementation of [`AnalysisService`].
pub struct HttpAnalysisClient {
    http: reqwest::Client,
    base_url: String,
    interview: InterviewId,
    credentials: Arc<dyn CredentialSource>,
}

impl HttpAnalysisClient {
    /// Builds a client for `interview` rooted at `base_url` (scheme + host, no path).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the TLS backend cannot be initialised.
    pub fn new(
        base_url: &str,
        interview: InterviewId,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("fora/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            interview,
            credentials,
        })
    }

    pub fn interview(&self) -> &InterviewId {
        &self.interview
    }

    pub fn url(&self, endpoint: Endpoint<'_>) -> String {
        format!("{}{}", self.base_url, endpoint.path(&self.interview))
    }

    fn cookie_header(&self, with_csrf: bool) -> Option<String> {
        let mut parts = Vec::new();
        if with_csrf {
            if let Some(token) = self.credentials.csrf_token() {
                parts.push(format!("csrftoken={token}"));
            }
        }
        if let Some(session) = self.credentials.session_cookie() {
            parts.push(format!("sessionid={session}"));
        }
        (!parts.is_empty()).then(|| parts.join("; "))
    }

    async fn get(&self, endpoint: Endpoint<'_>) -> Result<(u16, Vec<u8>), ApiError> {
        let url = self.url(endpoint);
        debug!(%url, "GET");
        let mut request = self.http.get(&url);
        if let Some(cookie) = self.cookie_header(false) {
            request = request.header(COOKIE, cookie);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        Ok((status, response.bytes().await?.to_vec()))
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint<'_>,
        body: Option<&B>,
    ) -> Result<(u16, Vec<u8>), ApiError> {
        let url = self.url(endpoint);
        debug!(%url, "POST");
        let mut request = self.http.post(&url).header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.credentials.csrf_token() {
            request = request.header(CSRF_HEADER, token);
        }
        if let Some(cookie) = self.cookie_header(true) {
            request = request.header(COOKIE, cookie);
        }
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        Ok((status, response.bytes().await?.to_vec()))
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisClient {
    async fn list_results(&self) -> Result<Vec<TopicResult>, ApiError> {
        let (status, bytes) = self.get(Endpoint::Results).await?;
        Ok(decode_listing::<ResultsBody>(status, &bytes)?.results)
    }

    async fn list_answers(&self, topic: &TopicId) -> Result<Vec<Answer>, ApiError> {
        let (status, bytes) = self.get(Endpoint::Answers(topic)).await?;
        Ok(decode_listing::<AnswersBody>(status, &bytes)?.answers)
    }

    async fn run(&self, topic: &TopicId) -> Result<(), ApiError> {
        let (status, bytes) = self.post::<()>(Endpoint::Run(topic), None).await?;
        decode_envelope(status, &bytes).map(|_| ())
    }

    async fn discover(&self, topic: &TopicId, custom_prompt: &str) -> Result<Vec<ThemeDraft>, ApiError> {
        let body = DiscoverRequest { custom_prompt };
        let (status, bytes) = self.post(Endpoint::Discover(topic), Some(&body)).await?;
        Ok(decode_envelope(status, &bytes)?.proposed_themes)
    }

    async fn classify(&self, topic: &TopicId, themes: &[ThemeDraft]) -> Result<(), ApiError> {
        let body = ClassifyRequest { themes };
        let (status, bytes) = self.post(Endpoint::Classify(topic), Some(&body)).await?;
        decode_envelope(status, &bytes).map(|_| ())
    }

    async fn chat(&self, message: &str, history: &[ChatMessage]) -> Result<String, ApiError> {
        let body = ChatRequestBody { message, history };
        let (status, bytes) = self.post(Endpoint::Chat, Some(&body)).await?;
        Ok(decode_envelope(status, &bytes)?.response.unwrap_or_default())
    }
}
