//! An analysis service backed by the bias analyzer's HTTP API.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use jdbias_service::{
    AnalysisReply, AnalysisRequest, AnalysisService, AnalysisServiceError,
    ErrorKind,
};
use mime::Mime;
use reqwest::{Client, Response, header};
use serde::de::DeserializeOwned;

pub use config::{HttpServiceConfig, HttpServiceConfigBuilder};
use proto::{ChatMessage, ChatResponse, HealthResponse};

/// Error type for [`HttpAnalysisService`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_status() {
            ErrorKind::Server
        } else if err.is_decode() {
            ErrorKind::InvalidReply
        } else if err.is_timeout() || err.is_connect() || err.is_request() {
            ErrorKind::Transport
        } else {
            ErrorKind::Other
        };
        Self::new(format!("{err}"), kind)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl AnalysisServiceError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// HTTP analysis service.
#[derive(Clone, Debug)]
pub struct HttpAnalysisService {
    client: Client,
    config: Arc<HttpServiceConfig>,
}

impl HttpAnalysisService {
    /// Creates a new `HttpAnalysisService` with the given configuration.
    pub fn new(config: HttpServiceConfig) -> Result<Self, Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Returns the configuration of this service.
    #[inline]
    pub fn config(&self) -> &HttpServiceConfig {
        &self.config
    }

    /// Asks the server whether it is ready to take requests.
    pub fn check_health(
        &self,
    ) -> impl Future<Output = Result<(), Error>> + Send + 'static {
        let resp_fut = self
            .client
            .get(self.config.endpoint("/health"))
            .header(header::ACCEPT, "application/json")
            .send();

        async move {
            let health: HealthResponse = read_json(resp_fut.await).await?;
            if !health.is_healthy() {
                return Err(Error::new(
                    format!("server reported status {:?}", health.status),
                    ErrorKind::Server,
                ));
            }
            Ok(())
        }
    }
}

impl AnalysisService for HttpAnalysisService {
    type Error = Error;

    fn send_analysis(
        &self,
        req: &AnalysisRequest,
    ) -> impl Future<Output = Result<AnalysisReply, Self::Error>> + Send + 'static
    {
        let resp_fut = self
            .client
            .post(self.config.endpoint("/chat"))
            .header(header::ACCEPT, "application/json")
            .json(&ChatMessage::from(req))
            .send();

        async move {
            let resp: ChatResponse = read_json(resp_fut.await).await?;
            trace!("got a reply for conversation {}", resp.conversation_id);
            Ok(resp.into())
        }
    }
}

async fn read_json<T: DeserializeOwned>(
    resp_or_err: reqwest::Result<Response>,
) -> Result<T, Error> {
    let resp = resp_or_err.and_then(Response::error_for_status)?;

    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let is_json = content_type
        .and_then(|v| v.parse().ok())
        .map(|m: Mime| m.essence_str() == mime::APPLICATION_JSON.essence_str())
        .unwrap_or(false);
    if !is_json {
        return Err(Error::new(
            format!("Unexpected content type: {content_type:?}"),
            ErrorKind::InvalidReply,
        ));
    }

    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(|err| {
        debug!("undecodable body: {}", String::from_utf8_lossy(&body));
        Error::new(format!("{err}"), ErrorKind::InvalidReply)
    })
}
