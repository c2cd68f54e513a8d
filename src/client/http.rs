// ABOUTME: HTTP/1.1 implementation of PipelineClient on top of hyper.
// ABOUTME: JSON requests, newline-delimited JSON log streaming, bearer-token auth.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Incoming};
use hyper::{Method, Request, Response, StatusCode, Uri, header};
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use snafu::ResultExt;
use std::time::Duration;
use tokio::net::TcpStream;

use super::error::{
    BodySnafu, BuildRequestSnafu, ClientError, ConnectSnafu, HandshakeSnafu, SendSnafu,
    TransportError,
};
use super::{
    Action, DeploySpec, LogLine, LogLineStream, PipelineClient, ResourceStatus,
    ResourceStatusSnapshot, StatusKind,
};
use crate::types::{ActionId, PipelineName};

const DEFAULT_ACTION_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Control-plane client speaking plain HTTP/1.1.
///
/// Every request opens its own connection, so the client holds no
/// connection state and can be shared freely between tasks.
#[derive(Debug, Clone)]
pub struct HttpClient {
    addr: String,
    host_header: String,
    base_path: String,
    namespace: String,
    token: Option<String>,
    action_poll_interval: Duration,
}

#[derive(Deserialize)]
struct DeployResponse {
    action: Action,
}

#[derive(Deserialize)]
struct ResourcesResponse {
    resources: ResourceStatusSnapshot,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    image: Option<String>,
}

impl HttpClient {
    /// Create a client for `endpoint` (`http://host[:port][/base]`) acting
    /// on `namespace`.
    pub fn new(endpoint: &str, namespace: &str) -> Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };

        let uri: Uri = endpoint.parse().map_err(|e| invalid(format!("{e}")))?;
        match uri.scheme_str() {
            Some("http") => {}
            Some(other) => {
                return Err(invalid(format!(
                    "unsupported scheme '{other}', only http is supported"
                )));
            }
            None => return Err(invalid("missing scheme".to_string())),
        }

        let host = uri
            .host()
            .ok_or_else(|| invalid("missing host".to_string()))?;
        let port = uri.port_u16().unwrap_or(80);
        let host_header = match uri.port_u16() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(Self {
            addr: format!("{host}:{port}"),
            host_header,
            base_path: uri.path().trim_end_matches('/').to_string(),
            namespace: namespace.to_string(),
            token: None,
            action_poll_interval: DEFAULT_ACTION_POLL_INTERVAL,
        })
    }

    /// Authenticate requests with a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// How often `wait_for_action` checks the action status.
    pub fn with_action_poll_interval(mut self, interval: Duration) -> Self {
        self.action_poll_interval = interval;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn pipelines_path(&self) -> String {
        format!(
            "{}/namespaces/{}/pipelines",
            self.base_path,
            urlencoding::encode(&self.namespace)
        )
    }

    fn pipeline_path(&self, name: &PipelineName) -> String {
        format!(
            "{}/{}",
            self.pipelines_path(),
            urlencoding::encode(name.as_str())
        )
    }

    fn action_path(&self, name: &PipelineName, action: &ActionId) -> String {
        format!(
            "{}/actions/{}",
            self.pipeline_path(name),
            urlencoding::encode(action.as_str())
        )
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Response<Incoming>, TransportError> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .context(ConnectSnafu { addr: &self.addr })?;

        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .context(HandshakeSnafu { addr: &self.addr })?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!("control plane connection error: {}", e);
            }
        });

        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::HOST, &self.host_header)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(bytes) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Full::new(Bytes::from(bytes))
            }
            None => Full::new(Bytes::new()),
        };
        let request = builder.body(body).context(BuildRequestSnafu)?;

        tracing::debug!("{} {}", request.method(), path);
        sender
            .send_request(request)
            .await
            .context(SendSnafu { path })
    }

    /// Send a request and decode a successful JSON response.
    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<T, ClientError> {
        let response = self.send(method, path, body).await?;
        let status = response.status();
        let bytes = read_body(response).await?;

        if !status.is_success() {
            return Err(remote_error(status, &bytes));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn action(&self, name: &PipelineName, action: &ActionId) -> Result<Action, ClientError> {
        self.request_json(Method::GET, &self.action_path(name, action), None)
            .await
    }

    async fn poll_action(&self, name: &PipelineName, action: &ActionId) -> Result<(), ClientError> {
        let mut ticker = tokio::time::interval(self.action_poll_interval);
        loop {
            ticker.tick().await;
            let current = self.action(name, action).await?;
            tracing::debug!("action {} is {}", action, current.status);
            match ResourceStatus::new(current.status).kind() {
                StatusKind::Error => {
                    return Err(ClientError::ActionFailed {
                        action: action.to_string(),
                    });
                }
                StatusKind::Transitioning => {}
                StatusKind::Stable => return Ok(()),
            }
        }
    }
}

#[async_trait]
impl PipelineClient for HttpClient {
    async fn deploy(&self, spec: &DeploySpec) -> Result<Action, ClientError> {
        let body = serde_json::to_vec(spec)?;
        let response: DeployResponse = self
            .request_json(Method::POST, &self.pipelines_path(), Some(body))
            .await?;
        Ok(response.action)
    }

    async fn stream_logs(
        &self,
        name: &PipelineName,
        action: &ActionId,
    ) -> Result<LogLineStream, ClientError> {
        let path = format!("{}/logs", self.action_path(name, action));
        let response = self.send(Method::GET, &path, None).await?;

        let status = response.status();
        if !status.is_success() {
            let bytes = read_body(response).await?;
            return Err(remote_error(status, &bytes));
        }

        Ok(Box::pin(ndjson_lines(response.into_body())))
    }

    async fn wait_for_action(
        &self,
        name: &PipelineName,
        action: &ActionId,
        timeout: Option<Duration>,
    ) -> Result<(), ClientError> {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, self.poll_action(name, action))
                .await
                .map_err(|_| ClientError::ActionTimeout {
                    action: action.to_string(),
                    timeout: limit.into(),
                })?,
            None => self.poll_action(name, action).await,
        }
    }

    async fn resource_status(
        &self,
        name: &PipelineName,
    ) -> Result<ResourceStatusSnapshot, ClientError> {
        let path = format!("{}/resources", self.pipeline_path(name));
        let response = self.send(Method::GET, &path, None).await?;
        let status = response.status();
        let bytes = read_body(response).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(name.to_string()));
        }
        if !status.is_success() {
            return Err(remote_error(status, &bytes));
        }
        let decoded: ResourcesResponse = serde_json::from_slice(&bytes)?;
        Ok(decoded.resources)
    }

    async fn exists(&self, name: &PipelineName) -> Result<bool, ClientError> {
        let response = self
            .send(Method::GET, &self.pipeline_path(name), None)
            .await?;
        let status = response.status();
        let bytes = read_body(response).await?;

        if status.is_success() {
            Ok(true)
        } else if status == StatusCode::NOT_FOUND {
            Ok(false)
        } else {
            Err(remote_error(status, &bytes))
        }
    }
}

async fn read_body(response: Response<Incoming>) -> Result<Bytes, TransportError> {
    let collected = response.into_body().collect().await.context(BodySnafu)?;
    Ok(collected.to_bytes())
}

/// Build the error for a non-success response, preferring the JSON
/// `{"error": ..., "image": ...}` body the control plane sends.
fn remote_error(status: StatusCode, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => ClientError::Remote {
            status: status.as_u16(),
            message: parsed.error,
            image: parsed.image,
        },
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            ClientError::Remote {
                status: status.as_u16(),
                message: if text.is_empty() {
                    status.to_string()
                } else {
                    text
                },
                image: None,
            }
        }
    }
}

struct LineReader<B> {
    body: B,
    buf: Vec<u8>,
    done: bool,
}

/// Turn a streaming body of newline-delimited JSON into log lines.
///
/// Blank and malformed lines are skipped. A trailing line without a newline
/// is still emitted when the body ends. After a body error the stream ends.
fn ndjson_lines<B>(body: B) -> impl Stream<Item = Result<LogLine, ClientError>> + Send
where
    B: Body<Data = Bytes, Error = hyper::Error> + Send + Unpin + 'static,
{
    let reader = LineReader {
        body,
        buf: Vec::new(),
        done: false,
    };

    futures::stream::unfold(reader, |mut reader| async move {
        loop {
            if let Some(pos) = reader.buf.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = reader.buf.drain(..=pos).collect();
                if let Some(line) = parse_line(&line) {
                    return Some((Ok(line), reader));
                }
                continue;
            }

            if reader.done {
                let rest = std::mem::take(&mut reader.buf);
                return parse_line(&rest).map(|line| (Ok(line), reader));
            }

            match reader.body.frame().await {
                Some(Ok(frame)) => {
                    if let Ok(data) = frame.into_data() {
                        reader.buf.extend_from_slice(&data);
                    }
                }
                Some(Err(source)) => {
                    reader.done = true;
                    reader.buf.clear();
                    return Some((Err(TransportError::Body { source }.into()), reader));
                }
                None => reader.done = true,
            }
        }
    })
}

fn parse_line(line: &[u8]) -> Option<LogLine> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str(text) {
        Ok(line) => Some(line),
        Err(e) => {
            tracing::debug!("skipping malformed log line {:?}: {}", text, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_endpoint_with_base_path() {
        let client = HttpClient::new("http://control.local:8080/api/", "dev").unwrap();
        assert_eq!(client.addr, "control.local:8080");
        assert_eq!(client.host_header, "control.local:8080");
        assert_eq!(client.pipelines_path(), "/api/namespaces/dev/pipelines");
    }

    #[test]
    fn default_port_is_80() {
        let client = HttpClient::new("http://control.local", "dev").unwrap();
        assert_eq!(client.addr, "control.local:80");
        assert_eq!(client.host_header, "control.local");
    }

    #[test]
    fn rejects_https() {
        let err = HttpClient::new("https://control.local", "dev").unwrap_err();
        assert!(err.to_string().contains("only http is supported"));
    }

    #[test]
    fn path_segments_are_encoded() {
        let client = HttpClient::new("http://h", "team a").unwrap();
        let name = PipelineName::new("movies").unwrap();
        let action = ActionId::new("a#1");
        assert_eq!(
            client.action_path(&name, &action),
            "/namespaces/team%20a/pipelines/movies/actions/a%231"
        );
    }

    #[test]
    fn remote_error_prefers_json_body() {
        let err = remote_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"error":"insufficient_scope: authorization failed","image":"app:1"}"#,
        );
        match err {
            ClientError::Remote {
                status,
                message,
                image,
            } => {
                assert_eq!(status, 500);
                assert_eq!(message, "insufficient_scope: authorization failed");
                assert_eq!(image.as_deref(), Some("app:1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn remote_error_falls_back_to_status_text() {
        let err = remote_error(StatusCode::BAD_GATEWAY, b"");
        assert_eq!(err.to_string(), "502 Bad Gateway");
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert!(parse_line(b"   \n").is_none());
        let line = parse_line(b"{\"message\":\"hi\"}\n").unwrap();
        assert_eq!(line.message, "hi");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        assert!(parse_line(b"{\"message\":\n").is_none());
        assert!(parse_line(b"plain text output\n").is_none());
    }
}
