//! Webhook dispatcher: build, send, log, swallow.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use docrelay_events::{ChangeEvent, ChangeHandler, EventError};

use crate::config::{WebhookConfig, WebhookSecret};
use crate::delivery::DeliveryReport;
use crate::error::{WebhookError, WebhookResult};
use crate::request::WebhookRequest;

/// Delivers change events to the configured webhook endpoint.
///
/// Each call makes exactly one attempt bounded by the configured timeout.
/// Failures are logged and reported in the returned [`DeliveryReport`] but
/// never surface as errors. Cloning is cheap and shares the connection pool.
#[derive(Clone)]
pub struct WebhookDispatcher {
    client: reqwest::Client,
    url: reqwest::Url,
    secret: WebhookSecret,
    config: Arc<WebhookConfig>,
}

impl WebhookDispatcher {
    /// Creates a dispatcher. Fails if the configuration has no usable secret
    /// or an invalid URL.
    pub fn new(config: WebhookConfig) -> WebhookResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Self::with_client(config, client)
    }

    /// Creates a dispatcher with a caller-provided HTTP client.
    ///
    /// The configured timeout is still applied per request.
    pub fn with_client(config: WebhookConfig, client: reqwest::Client) -> WebhookResult<Self> {
        let url = config.validate()?;
        let secret = config
            .secret
            .clone()
            .ok_or_else(|| WebhookError::ConfigError("webhook secret is not configured".to_string()))?;

        Ok(Self {
            client,
            url,
            secret,
            config: Arc::new(config),
        })
    }

    /// Delivers one change event. Never fails; the outcome is in the report.
    pub async fn dispatch(&self, event: &ChangeEvent) -> DeliveryReport {
        tracing::info!(
            source_id = %event.source_id,
            operation = %event.operation,
            collection = %event.collection,
            document_id = %event.document_id,
            "[{}] Starting webhook call: {} {}:{}",
            event.source_id.to_uppercase(),
            event.operation,
            event.collection,
            event.document_id
        );

        let start = Instant::now();
        let result = self.send(event).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok((status, body)) => {
                tracing::info!(
                    source_id = %event.source_id,
                    operation = %event.operation,
                    collection = %event.collection,
                    document_id = %event.document_id,
                    status,
                    duration_ms,
                    "[{}] Webhook success: {} {}:{}",
                    event.source_id.to_uppercase(),
                    event.operation,
                    event.collection,
                    event.document_id
                );
                DeliveryReport::success(event, status, body, duration_ms)
            }
            Err(err) => {
                tracing::error!(
                    source_id = %event.source_id,
                    operation = %event.operation,
                    collection = %event.collection,
                    document_id = %event.document_id,
                    url = %self.url,
                    status = err.status_code(),
                    response_body = err.response_body(),
                    error = %err,
                    duration_ms,
                    "[{}] Webhook failed: {} {}:{}",
                    event.source_id.to_uppercase(),
                    event.operation,
                    event.collection,
                    event.document_id
                );
                DeliveryReport::failure(event, &err, duration_ms)
            }
        }
    }

    /// Performs the POST and returns status and body of a 2xx response.
    async fn send(&self, event: &ChangeEvent) -> WebhookResult<(u16, String)> {
        let body = WebhookRequest::from_event(event, &self.secret).to_json()?;

        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.config.timeout())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "Webhook response: {}", status);

        let text = response.text().await;

        if !status.is_success() {
            // Keep the status even when the body cannot be read.
            return Err(WebhookError::HttpStatus {
                status: status.as_u16(),
                body: text.unwrap_or_default(),
            });
        }

        let text = text?;

        tracing::debug!(body = %text, "Webhook response body");
        Ok((status.as_u16(), text))
    }
}

impl std::fmt::Debug for WebhookDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookDispatcher")
            .field("url", &self.url.as_str())
            .field("secret", &self.secret)
            .field("timeout_ms", &self.config.timeout_ms)
            .finish()
    }
}

#[async_trait]
impl ChangeHandler for WebhookDispatcher {
    fn id(&self) -> &str {
        "webhook-dispatcher"
    }

    async fn handle(&self, event: &ChangeEvent) -> Result<(), EventError> {
        self.dispatch(event).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrelay_events::{Operation, Payload};
    use serde_json::json;
    use std::io::Write;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn alice_created() -> ChangeEvent {
        let payload = json!({"name": "Alice"}).as_object().cloned().unwrap();
        ChangeEvent::new(Operation::Create, "bookings", "auburn", "abc123", payload)
    }

    /// Log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Serves one request with a 500 whose body is cut short.
    async fn truncated_error_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            // Drain the request: headers, then Content-Length bytes of body.
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }

            socket
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\npartial")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/api/sync")
    }

    fn dispatcher_for(server: &MockServer) -> WebhookDispatcher {
        let config = WebhookConfig::new(format!("{}/api/sync", server.uri())).secret("s3cr3t");
        WebhookDispatcher::new(config).unwrap()
    }

    #[test]
    fn test_new_requires_secret() {
        let err = WebhookDispatcher::new(WebhookConfig::new("http://localhost:9/hook")).unwrap_err();
        assert!(matches!(err, WebhookError::ConfigError(_)));

        let err = WebhookDispatcher::new(WebhookConfig::new("http://localhost:9/hook").secret("fallback-secret"))
            .unwrap_err();
        assert!(matches!(err, WebhookError::ConfigError(_)));
    }

    #[test]
    fn test_debug_hides_secret() {
        let dispatcher =
            WebhookDispatcher::new(WebhookConfig::new("http://localhost:9/hook").secret("s3cr3t")).unwrap();
        assert!(!format!("{:?}", dispatcher).contains("s3cr3t"));
    }

    #[tokio::test]
    async fn test_successful_delivery() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/sync"))
            .and(header("content-type", "application/json"))
            .and(header("user-agent", crate::config::DEFAULT_USER_AGENT))
            .and(body_json(json!({
                "operation": "CREATE",
                "data": {"name": "Alice"},
                "id": "abc123",
                "collection": "bookings",
                "campus": "auburn",
                "secret": "s3cr3t"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("indexed"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let report = dispatcher_for(&mock_server).dispatch(&alice_created()).await;

        assert!(report.is_delivered());
        assert_eq!(report.status_code, Some(200));
        assert_eq!(report.response_body.as_deref(), Some("indexed"));
    }

    #[tokio::test]
    async fn test_server_error_is_swallowed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("index unavailable"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let event = alice_created();
        let report = dispatcher_for(&mock_server).dispatch(&event).await;

        assert!(!report.is_delivered());
        assert_eq!(report.status_code, Some(500));
        assert_eq!(report.response_body.as_deref(), Some("index unavailable"));
        assert_eq!(report.operation, Operation::Create);
        assert_eq!(report.collection, "bookings");
        assert_eq!(report.document_id, "abc123");
        assert_eq!(report.source_id, "auburn");
        assert!(report.error.unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_server_error_is_logged_with_context() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("index unavailable"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        dispatcher_for(&mock_server).dispatch(&alice_created()).await;

        let output = logs.contents();
        let line = output
            .lines()
            .find(|line| line.contains("ERROR"))
            .expect("an error line is logged");

        assert!(line.contains("Webhook failed: CREATE bookings:abc123"));
        assert!(line.contains("operation=CREATE"));
        assert!(line.contains("collection=bookings"));
        assert!(line.contains("document_id=abc123"));
        assert!(line.contains("source_id=auburn"));
        assert!(line.contains("status=500"));
        assert!(line.contains("index unavailable"));
        assert!(line.contains(&format!("url={}/api/sync", mock_server.uri())));
    }

    #[tokio::test]
    async fn test_error_status_kept_when_body_is_unreadable() {
        let url = truncated_error_server().await;
        let dispatcher = WebhookDispatcher::new(WebhookConfig::new(url).secret("s3cr3t")).unwrap();

        let report = dispatcher.dispatch(&alice_created()).await;

        assert!(!report.is_delivered());
        assert_eq!(report.status_code, Some(500));
        assert_eq!(report.response_body.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1_000)))
            .mount(&mock_server)
            .await;

        let config = WebhookConfig::new(format!("{}/api/sync", mock_server.uri()))
            .secret("s3cr3t")
            .timeout_ms(100);
        let dispatcher = WebhookDispatcher::new(config).unwrap();

        let report = dispatcher.dispatch(&alice_created()).await;

        assert!(!report.is_delivered());
        assert_eq!(report.status_code, None);
        assert_eq!(report.error.as_deref(), Some("Request timeout"));
        assert!(report.duration_ms < 1_000);
    }

    #[tokio::test]
    async fn test_network_error_is_swallowed() {
        // Nothing listens on port 9.
        let config = WebhookConfig::new("http://127.0.0.1:9/api/sync").secret("s3cr3t");
        let dispatcher = WebhookDispatcher::new(config).unwrap();

        let report = dispatcher.dispatch(&alice_created()).await;

        assert!(!report.is_delivered());
        assert_eq!(report.status_code, None);
        assert!(report.error.is_some());
    }

    #[tokio::test]
    async fn test_handler_always_succeeds() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dispatcher = dispatcher_for(&mock_server);
        let event = ChangeEvent::new(Operation::Delete, "bookingDrafts", "oxford", "d-1", Payload::new());

        assert!(dispatcher.handle(&event).await.is_ok());
        assert_eq!(dispatcher.id(), "webhook-dispatcher");
    }
}
