// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report HTTP server — accepts `POST /api/pdf/generate` with a multipart form
// and answers with the generated PDF.
//
// The server listens on raw TCP and parses just enough HTTP/1.1 to read one
// request per connection: the headers, then exactly Content-Length body
// bytes. Report generation is CPU-bound and synchronous, so it runs on the
// blocking thread pool while the accept loop keeps serving.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Local;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use reportwerk_core::GeneratedReport;
use reportwerk_core::error::{ReportError, Result};
use reportwerk_document::ReportGenerator;

use crate::config::ServerConfig;
use crate::http::{self, MAX_HEAD_BYTES, MultipartForm, RequestHead, Response};
use crate::ingest::ReportRequest;

/// The single route served.
pub const GENERATE_PATH: &str = "/api/pdf/generate";

const READ_CHUNK: usize = 8192;

// ---------------------------------------------------------------------------
// Shared state passed to connection handlers
// ---------------------------------------------------------------------------

struct SharedState {
    config: ServerConfig,
    generator: ReportGenerator,
}

// ---------------------------------------------------------------------------
// ReportServer
// ---------------------------------------------------------------------------

pub struct ReportServer {
    config: ServerConfig,
    /// Notification handle used to signal a graceful shutdown.
    shutdown_signal: Arc<Notify>,
    /// Handle to the Tokio task running the accept loop.
    task_handle: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl ReportServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            shutdown_signal: Arc::new(Notify::new()),
            task_handle: None,
            local_addr: None,
        }
    }

    /// The bound address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Bind the listener and spawn the accept loop.
    ///
    /// Returns the bound address, which differs from the configured one when
    /// port 0 was requested.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        if let Some(addr) = self.local_addr.filter(|_| self.is_running()) {
            debug!(%addr, "report server already running");
            return Ok(addr);
        }

        let bind_addr = self.config.socket_addr();
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|e| ReportError::Server(format!("bind {bind_addr}: {e}")))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ReportError::Server(format!("local address: {e}")))?;

        info!(addr = %local_addr, "report server listening");

        let shared = Arc::new(SharedState {
            generator: ReportGenerator::new(self.config.layout.clone()),
            config: self.config.clone(),
        });
        let shutdown = Arc::clone(&self.shutdown_signal);

        self.task_handle = Some(tokio::spawn(async move {
            Self::accept_loop(listener, shutdown, shared).await;
        }));
        self.local_addr = Some(local_addr);
        Ok(local_addr)
    }

    /// Signal the accept loop to exit and wait for it. Connections already
    /// accepted finish on their own tasks.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.task_handle.take() else {
            return Ok(());
        };

        info!(addr = ?self.local_addr, "stopping report server");
        self.shutdown_signal.notify_one();
        handle
            .await
            .map_err(|e| ReportError::Server(format!("task join: {e}")))?;

        self.local_addr = None;
        info!("report server stopped");
        Ok(())
    }

    async fn accept_loop(listener: TcpListener, shutdown: Arc<Notify>, shared: Arc<SharedState>) {
        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    debug!("accept loop received shutdown signal");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            let state = Arc::clone(&shared);
                            let span = info_span!("request", id = %Uuid::new_v4(), peer = %peer_addr);
                            tokio::spawn(
                                async move {
                                    if let Err(e) = Self::handle_connection(stream, state).await {
                                        warn!(error = %e, "connection handler error");
                                    }
                                }
                                .instrument(span),
                            );
                        }
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                        }
                    }
                }
            }
        }
    }

    /// Read one request, answer it, close.
    async fn handle_connection(mut stream: TcpStream, state: Arc<SharedState>) -> Result<()> {
        let mut buf = Vec::with_capacity(READ_CHUNK);

        let head_len = loop {
            if let Some(end) = http::head_end(&buf) {
                break end;
            }
            if buf.len() > MAX_HEAD_BYTES {
                return send_response(&mut stream, &Response::text(431, "Request headers too large.")).await;
            }
            if read_chunk(&mut stream, &mut buf).await? == 0 {
                if !buf.is_empty() {
                    debug!(bytes = buf.len(), "connection closed mid-headers");
                }
                return Ok(());
            }
        };

        let Some(head) = RequestHead::parse(&buf[..head_len - 4]) else {
            return send_response(&mut stream, &Response::text(400, "Malformed HTTP request.")).await;
        };
        info!(method = %head.method, path = %head.path, "request received");

        let body_len = match route(&head, state.config.max_request_bytes) {
            Ok(len) => len,
            Err(response) => {
                info!(status = response.status, "request rejected");
                return send_response(&mut stream, &response).await;
            }
        };

        while buf.len() < head_len + body_len {
            if read_chunk(&mut stream, &mut buf).await? == 0 {
                return send_response(&mut stream, &Response::text(400, "Incomplete request body."))
                    .await;
            }
        }
        buf.truncate(head_len + body_len);
        let body = buf.split_off(head_len);
        let content_type = head.header("content-type").unwrap_or_default().to_string();

        let span = tracing::Span::current();
        let response = tokio::task::spawn_blocking(move || {
            span.in_scope(|| respond(&state, &content_type, &body))
        })
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "report generation task failed");
            Response::text(500, format!("Internal server error: {e}"))
        });

        info!(status = response.status, bytes = response.body.len(), "response ready");
        send_response(&mut stream, &response).await
    }
}

/// Check path, method and declared size. Returns the body length to read.
fn route(head: &RequestHead, max_request_bytes: usize) -> std::result::Result<usize, Response> {
    if head.path != GENERATE_PATH {
        return Err(Response::text(404, "Not found."));
    }
    if head.method != "POST" {
        return Err(Response::text(405, "Method not allowed.").with_header("Allow", "POST"));
    }
    match head.content_length() {
        None => Ok(0),
        Some(Ok(len)) if len > max_request_bytes => Err(Response::text(
            413,
            format!("Request body exceeds {max_request_bytes} bytes."),
        )),
        Some(Ok(len)) => Ok(len),
        Some(Err(_)) => Err(Response::text(400, "Invalid Content-Length header.")),
    }
}

/// Decode the form, generate the report and map the outcome to a response.
fn respond(state: &SharedState, content_type: &str, body: &[u8]) -> Response {
    match generate(state, content_type, body) {
        Ok(report) => {
            info!(file_name = %report.file_name, bytes = report.bytes.len(), "report generated");
            Response::report(report)
        }
        Err(err) if err.is_client_error() => {
            warn!(error = %err, "rejected report request");
            Response::from_error(&err)
        }
        Err(err) => {
            error!(error = %err, "report generation failed");
            Response::from_error(&err)
        }
    }
}

fn generate(state: &SharedState, content_type: &str, body: &[u8]) -> Result<GeneratedReport> {
    let form = MultipartForm::parse(content_type, body)?;
    let request = ReportRequest::from_form(&form, &state.config, Local::now().date_naive())?;
    state
        .generator
        .generate(&request.image, &request.table, &request.header, &request.footer)
}

async fn read_chunk(stream: &mut TcpStream, buf: &mut Vec<u8>) -> Result<usize> {
    let mut chunk = [0u8; READ_CHUNK];
    let n = stream
        .read(&mut chunk)
        .await
        .map_err(|e| ReportError::Server(format!("read: {e}")))?;
    buf.extend_from_slice(&chunk[..n]);
    Ok(n)
}

async fn send_response(stream: &mut TcpStream, response: &Response) -> Result<()> {
    stream
        .write_all(&response.to_bytes())
        .await
        .map_err(|e| ReportError::Server(format!("write response: {e}")))?;
    stream
        .flush()
        .await
        .map_err(|e| ReportError::Server(format!("flush: {e}")))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::{content_type, multipart_body};
    use crate::http::{MALFORMED_TABLE_MESSAGE, MISSING_INPUT_MESSAGE};
    use crate::ingest::{IMAGE_FIELD, METADATA_FIELD, TABLE_FIELD};
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::net::{IpAddr, Ipv4Addr};

    fn png() -> Vec<u8> {
        let mut bytes = Vec::new();
        RgbImage::from_pixel(120, 60, Rgb([10, 80, 160]))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn state() -> SharedState {
        let config = ServerConfig {
            logo_path: "no/such/logo.png".into(),
            ..ServerConfig::default()
        };
        SharedState {
            generator: ReportGenerator::new(config.layout.clone()),
            config,
        }
    }

    fn head(method: &str, path: &str, length: Option<usize>) -> RequestHead {
        let mut text = format!("{method} {path} HTTP/1.1\r\nHost: localhost");
        if let Some(length) = length {
            text.push_str(&format!("\r\nContent-Length: {length}"));
        }
        RequestHead::parse(text.as_bytes()).unwrap()
    }

    fn body_text(response: &Response) -> String {
        String::from_utf8_lossy(&response.body).into_owned()
    }

    #[test]
    fn routes_only_post_to_generate() {
        assert_eq!(route(&head("POST", GENERATE_PATH, Some(10)), 100), Ok(10));
        assert_eq!(route(&head("GET", "/", None), 100).unwrap_err().status, 404);

        let wrong_method = route(&head("GET", GENERATE_PATH, None), 100).unwrap_err();
        assert_eq!(wrong_method.status, 405);
        assert!(wrong_method.headers.contains(&("Allow", "POST".to_string())));

        assert_eq!(
            route(&head("POST", GENERATE_PATH, Some(101)), 100).unwrap_err().status,
            413
        );
    }

    #[test]
    fn generates_pdf_for_complete_form() {
        let image = png();
        let body = multipart_body(&[
            (IMAGE_FIELD, Some("chart.png"), image.as_slice()),
            (TABLE_FIELD, Some("data.csv"), &b"Name,Score\nAlice,10\n"[..]),
            (METADATA_FIELD, None, &br#"["Scores","R. Diaz","Q4 2023"]"#[..]),
        ]);

        let response = respond(&state(), &content_type(), &body);
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "application/pdf");
        assert!(response.body.starts_with(b"%PDF-"));

        let (_, disposition) = &response.headers[0];
        assert!(disposition.starts_with("attachment; filename=\"Scores_"));
        assert!(disposition.ends_with(".pdf\""));
    }

    #[test]
    fn missing_part_is_bad_request() {
        let body = multipart_body(&[
            (TABLE_FIELD, Some("data.csv"), &b"Name,Score\nAlice,10\n"[..]),
            (METADATA_FIELD, None, &b"[]"[..]),
        ]);
        let response = respond(&state(), &content_type(), &body);
        assert_eq!(response.status, 400);
        assert_eq!(body_text(&response), MISSING_INPUT_MESSAGE);
    }

    #[test]
    fn header_only_csv_is_bad_request() {
        let image = png();
        let body = multipart_body(&[
            (IMAGE_FIELD, Some("chart.png"), image.as_slice()),
            (TABLE_FIELD, Some("data.csv"), &b"Name,Score\n"[..]),
            (METADATA_FIELD, None, &b"[]"[..]),
        ]);
        let response = respond(&state(), &content_type(), &body);
        assert_eq!(response.status, 400);
        assert_eq!(body_text(&response), MALFORMED_TABLE_MESSAGE);
    }

    #[test]
    fn invalid_metadata_is_bad_request() {
        let image = png();
        let body = multipart_body(&[
            (IMAGE_FIELD, Some("chart.png"), image.as_slice()),
            (TABLE_FIELD, Some("data.csv"), &b"Name,Score\nAlice,10\n"[..]),
            (METADATA_FIELD, None, &b"{oops"[..]),
        ]);
        let response = respond(&state(), &content_type(), &body);
        assert_eq!(response.status, 400);
        assert!(body_text(&response).starts_with("Invalid JSON format for metadata: "));
    }

    #[test]
    fn undecodable_image_is_server_error() {
        let body = multipart_body(&[
            (IMAGE_FIELD, Some("chart.png"), &b"not an image"[..]),
            (TABLE_FIELD, Some("data.csv"), &b"Name,Score\nAlice,10\n"[..]),
            (METADATA_FIELD, None, &b"[]"[..]),
        ]);
        let response = respond(&state(), &content_type(), &body);
        assert_eq!(response.status, 500);
        assert!(body_text(&response).starts_with("Internal server error: "));
    }

    #[tokio::test]
    async fn serves_over_tcp_and_stops() {
        let config = ServerConfig {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            ..ServerConfig::default()
        };
        let mut server = ReportServer::new(config);
        let addr = server.start().await.unwrap();
        assert!(server.is_running());

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let mut reply = Vec::new();
        stream.read_to_end(&mut reply).await.unwrap();
        assert!(reply.starts_with(b"HTTP/1.1 404 Not Found\r\n"));

        server.stop().await.unwrap();
        assert!(!server.is_running());
        assert_eq!(server.local_addr(), None);
    }
}
