use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: vec![("accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: vec![
                ("accept".to_string(), "application/json".to_string()),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body: Some(body),
        }
    }

    /// One-line rendering (`METHOD url body`) used for logging and stub matching.
    pub fn describe(&self) -> String {
        match &self.body {
            Some(body) => format!("{} {} {}", self.method, self.url, body),
            None => format!("{} {}", self.method, self.url),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound HTTP seam. The production implementation wraps reqwest; tests
/// inject a scripted transport.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("baseboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

/// Bounds every outbound call with its own timeout.
///
/// The timer lives inside the `tokio::time::timeout` future, so it is
/// released whether the call completes, fails, times out or is dropped by
/// a caller that lost a race.
#[derive(Clone)]
pub struct FetchGate {
    transport: Arc<dyn HttpTransport>,
}

impl FetchGate {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn fetch(
        &self,
        label: &str,
        request: HttpRequest,
        timeout: Duration,
    ) -> Result<HttpResponse> {
        tracing::debug!("{} -> {}", label, request.describe());
        match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout {
                label: label.to_string(),
                after_ms: timeout.as_millis() as u64,
            }),
        }
    }

    /// `fetch` plus status check and JSON decoding.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        label: &str,
        request: HttpRequest,
        timeout: Duration,
    ) -> Result<T> {
        let response = self.fetch(label, request, timeout).await?;
        decode_json(label, &response)
    }

    /// Like `fetch_json`, but HTTP 404 means "nothing here" and yields `None`.
    pub async fn fetch_json_or_none<T: DeserializeOwned>(
        &self,
        label: &str,
        request: HttpRequest,
        timeout: Duration,
    ) -> Result<Option<T>> {
        let response = self.fetch(label, request, timeout).await?;
        if response.status == 404 {
            return Ok(None);
        }
        decode_json(label, &response).map(Some)
    }
}

fn decode_json<T: DeserializeOwned>(label: &str, response: &HttpResponse) -> Result<T> {
    if !response.is_success() {
        return Err(AppError::ExternalApi(format!(
            "{} returned HTTP {}",
            label, response.status
        )));
    }
    serde_json::from_str(&response.body)
        .map_err(|e| AppError::Parse(format!("{} response: {}", label, e)))
}

#[cfg(test)]
pub mod testing {
    //! Scripted transport for resolver and aggregator tests.

    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    pub enum StubReply {
        Json(u16, serde_json::Value),
        Text(u16, String),
        Fail(String),
        Hang,
        Delayed(Duration, Box<StubReply>),
    }

    impl StubReply {
        pub fn ok(body: serde_json::Value) -> Self {
            StubReply::Json(200, body)
        }

        /// JSON-RPC success envelope.
        pub fn rpc(result: serde_json::Value) -> Self {
            StubReply::Json(
                200,
                serde_json::json!({ "jsonrpc": "2.0", "id": 1, "result": result }),
            )
        }

        pub fn after(self, delay: Duration) -> Self {
            StubReply::Delayed(delay, Box::new(self))
        }
    }

    /// Routes are matched in registration order against
    /// `HttpRequest::describe()`; every pattern of a route must occur in it.
    #[derive(Default)]
    pub struct StubTransport {
        routes: Vec<(Vec<String>, StubReply)>,
        calls: Mutex<Vec<String>>,
    }

    impl StubTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn route(mut self, patterns: &[&str], reply: StubReply) -> Self {
            self.routes
                .push((patterns.iter().map(|p| p.to_string()).collect(), reply));
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls_matching(&self, pattern: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|call| call.contains(pattern))
                .count()
        }

        fn reply_for(&self, described: &str) -> StubReply {
            self.routes
                .iter()
                .find(|(patterns, _)| patterns.iter().all(|p| described.contains(p.as_str())))
                .map(|(_, reply)| reply.clone())
                .unwrap_or_else(|| StubReply::Fail(format!("no stub route for {}", described)))
        }
    }

    #[async_trait::async_trait]
    impl HttpTransport for StubTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            let described = request.describe();
            self.calls.lock().unwrap().push(described.clone());
            let mut reply = self.reply_for(&described);
            loop {
                match reply {
                    StubReply::Delayed(delay, inner) => {
                        tokio::time::sleep(delay).await;
                        reply = *inner;
                    }
                    StubReply::Json(status, body) => {
                        return Ok(HttpResponse {
                            status,
                            body: body.to_string(),
                        })
                    }
                    StubReply::Text(status, body) => return Ok(HttpResponse { status, body }),
                    StubReply::Fail(message) => return Err(AppError::Network(message)),
                    StubReply::Hang => std::future::pending::<()>().await,
                }
            }
        }
    }

    pub fn gate(transport: &Arc<StubTransport>) -> FetchGate {
        FetchGate::new(transport.clone())
    }
}
