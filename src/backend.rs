use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::protocol::{DiagramRequest, DiagramResponse, ErrorBody};

/// Why a diagram request failed. `Display` is the banner text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The backend could not be reached or the connection broke.
    #[error("could not reach the diagram service: {0}")]
    Transport(String),
    /// The backend answered with a non-2xx status.
    #[error("diagram service error {status}: {message}")]
    Server { status: u16, message: String },
    /// 2xx, but the body was not `{"mermaid": "<markup>"}`.
    #[error("unexpected response from the diagram service: {0}")]
    Protocol(String),
    /// The request task ended without reporting a result.
    #[error("request aborted")]
    Aborted,
}

/// Something that turns a description into diagram markup.
#[async_trait]
pub trait DiagramBackend: Send + Sync {
    async fn generate(&self, request: &DiagramRequest) -> Result<String, RequestError>;
}

/// HTTP client for `POST /generate_mermaid`.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    url: String,
}

impl HttpBackend {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl DiagramBackend for HttpBackend {
    async fn generate(&self, request: &DiagramRequest) -> Result<String, RequestError> {
        debug!(url = %self.url, chars = request.text.len(), "posting diagram request");

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| transport_error(&e))?;
        interpret_response(status, &body)
    }
}

fn transport_error(e: &reqwest::Error) -> RequestError {
    warn!(error = %e, "diagram request transport failure");
    let message = e.to_string();
    if message.trim().is_empty() {
        RequestError::Transport("failed to generate diagram".into())
    } else {
        RequestError::Transport(message)
    }
}

/// Map a status and raw body to markup or an error.
pub fn interpret_response(status: StatusCode, body: &[u8]) -> Result<String, RequestError> {
    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message())
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "request failed".into());
        return Err(RequestError::Server {
            status: status.as_u16(),
            message,
        });
    }

    match serde_json::from_slice::<DiagramResponse>(body) {
        Ok(parsed) => Ok(parsed.mermaid),
        Err(e) if e.is_data() => Err(RequestError::Protocol("missing diagram markup".into())),
        Err(_) => Err(RequestError::Protocol("body is not valid JSON".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_success_body() {
        let markup = interpret_response(StatusCode::OK, br#"{"mermaid":"graph TD; A-->B"}"#);
        assert_eq!(markup, Ok("graph TD; A-->B".to_string()));
    }

    #[test]
    fn test_any_2xx_is_success() {
        let markup = interpret_response(StatusCode::CREATED, br#"{"mermaid":"graph LR; X"}"#);
        assert_eq!(markup, Ok("graph LR; X".to_string()));
    }

    #[test]
    fn test_missing_field_is_protocol_error() {
        let err = interpret_response(StatusCode::OK, b"{}").unwrap_err();
        assert!(matches!(err, RequestError::Protocol(_)));
    }

    #[test]
    fn test_non_string_field_is_protocol_error() {
        let err = interpret_response(StatusCode::OK, br#"{"mermaid":null}"#).unwrap_err();
        assert!(matches!(err, RequestError::Protocol(_)));
        let err = interpret_response(StatusCode::OK, br#"{"mermaid":42}"#).unwrap_err();
        assert!(matches!(err, RequestError::Protocol(_)));
    }

    #[test]
    fn test_garbage_body_is_protocol_error() {
        let err = interpret_response(StatusCode::OK, b"<html>oops</html>").unwrap_err();
        assert_eq!(err, RequestError::Protocol("body is not valid JSON".into()));
    }

    #[test]
    fn test_server_error_uses_status_text() {
        let err = interpret_response(StatusCode::INTERNAL_SERVER_ERROR, b"").unwrap_err();
        assert_eq!(
            err,
            RequestError::Server {
                status: 500,
                message: "Internal Server Error".into()
            }
        );
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_server_error_prefers_detail() {
        let err = interpret_response(
            StatusCode::BAD_REQUEST,
            br#"{"detail":"Text input required."}"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "diagram service error 400: Text input required."
        );
    }

    /// Serve one canned HTTP response, reading the full request first.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/generate_mermaid", addr)
    }

    fn request(text: &str) -> DiagramRequest {
        DiagramRequest::from_input(text).unwrap()
    }

    #[tokio::test]
    async fn test_http_backend_success() {
        let url = serve_once("200 OK", r#"{"mermaid":"graph TD; A-->B"}"#).await;
        let backend = HttpBackend::new(url);
        let markup = backend.generate(&request("flowchart for login")).await;
        assert_eq!(markup, Ok("graph TD; A-->B".to_string()));
    }

    #[tokio::test]
    async fn test_http_backend_server_error() {
        let url = serve_once("500 Internal Server Error", r#"{"detail":"model offline"}"#).await;
        let backend = HttpBackend::new(url);
        let err = backend.generate(&request("x")).await.unwrap_err();
        assert_eq!(
            err,
            RequestError::Server {
                status: 500,
                message: "model offline".into()
            }
        );
    }

    #[tokio::test]
    async fn test_http_backend_transport_error() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpBackend::new(format!("http://{}/generate_mermaid", addr));
        let err = backend.generate(&request("x")).await.unwrap_err();
        assert!(matches!(err, RequestError::Transport(_)));
    }
}
