// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Minimal HTTP/1.1 framing and multipart/form-data decoding.
//
// The service answers exactly one request per connection, so only the
// request line, headers and a Content-Length body are understood. Chunked
// transfer encoding and keep-alive are not supported.

use std::num::ParseIntError;

use reportwerk_core::GeneratedReport;
use reportwerk_core::error::{ReportError, Result};

/// Upper bound on the size of the request line plus headers.
pub const MAX_HEAD_BYTES: usize = 16 * 1024;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Request line and headers of an incoming request.
#[derive(Debug)]
pub struct RequestHead {
    pub method: String,
    pub path: String,
    headers: Vec<(String, String)>,
}

impl RequestHead {
    /// Parse the bytes before the blank line that ends the headers.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(data).ok()?;
        let mut lines = text.split("\r\n");

        let mut request_line = lines.next()?.split_whitespace();
        let method = request_line.next()?.to_string();
        let target = request_line.next()?;
        request_line.next().filter(|version| version.starts_with("HTTP/"))?;

        // Query strings are ignored for routing.
        let path = target.split('?').next().unwrap_or(target).to_string();

        let headers = lines
            .filter(|line| !line.is_empty())
            .filter_map(|line| {
                let (name, value) = line.split_once(':')?;
                Some((name.trim().to_ascii_lowercase(), value.trim().to_string()))
            })
            .collect();

        Some(Self {
            method,
            path,
            headers,
        })
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The Content-Length value, if the header is present.
    pub fn content_length(&self) -> Option<std::result::Result<usize, ParseIntError>> {
        self.header("content-length").map(str::parse)
    }
}

/// Offset just past the blank line ending the headers, if present yet.
pub fn head_end(data: &[u8]) -> Option<usize> {
    find_subsequence(data, b"\r\n\r\n").map(|index| index + 4)
}

/// Find the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

// ---------------------------------------------------------------------------
// Multipart forms
// ---------------------------------------------------------------------------

/// One named part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

/// A decoded `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    /// Decode `body` using the boundary named in `content_type`.
    pub fn parse(content_type: &str, body: &[u8]) -> Result<Self> {
        let boundary = boundary(content_type).ok_or_else(|| {
            ReportError::MissingInput("request is not multipart/form-data".into())
        })?;
        let opening = format!("--{boundary}").into_bytes();
        let closing = format!("\r\n--{boundary}").into_bytes();

        let mut pos = find_subsequence(body, &opening).ok_or_else(|| malformed("no opening boundary"))?
            + opening.len();
        let mut parts = Vec::new();

        loop {
            let rest = &body[pos..];
            if rest.starts_with(b"--") {
                break;
            }
            let rest = rest
                .strip_prefix(b"\r\n")
                .ok_or_else(|| malformed("boundary not followed by CRLF"))?;
            let head_len =
                find_subsequence(rest, b"\r\n\r\n").ok_or_else(|| malformed("unterminated part headers"))?;
            let head = String::from_utf8_lossy(&rest[..head_len]);

            let data_start = body.len() - rest.len() + head_len + 4;
            let data_len = find_subsequence(&body[data_start..], &closing)
                .ok_or_else(|| malformed("missing closing boundary"))?;
            let data = body[data_start..data_start + data_len].to_vec();
            pos = data_start + data_len + closing.len();

            if let Some((name, file_name)) = disposition(&head) {
                parts.push(FormPart {
                    name,
                    file_name,
                    data,
                });
            }
        }

        Ok(Self { parts })
    }

    pub fn part(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|part| part.name == name)
    }

    /// A part decoded as UTF-8 text.
    pub fn text(&self, name: &str) -> Option<String> {
        self.part(name)
            .map(|part| String::from_utf8_lossy(&part.data).into_owned())
    }
}

fn malformed(detail: &str) -> ReportError {
    ReportError::MissingInput(format!("malformed multipart body: {detail}"))
}

/// The `boundary` parameter of a multipart Content-Type.
fn boundary(content_type: &str) -> Option<String> {
    let mut params = content_type.split(';');
    let mime = params.next()?.trim();
    if !mime.eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }
    params
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Field name and optional file name from a part's Content-Disposition.
fn disposition(head: &str) -> Option<(String, Option<String>)> {
    let line = head.split("\r\n").find(|line| {
        line.split_once(':')
            .is_some_and(|(name, _)| name.trim().eq_ignore_ascii_case("content-disposition"))
    })?;
    let (_, value) = line.split_once(':')?;

    let mut name = None;
    let mut file_name = None;
    for param in value.split(';').skip(1) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let raw = raw.trim().trim_matches('"').to_string();
        match key.trim().to_ascii_lowercase().as_str() {
            "name" => name = Some(raw),
            "filename" => file_name = Some(raw),
            _ => {}
        }
    }
    Some((name?, file_name))
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

pub const MISSING_INPUT_MESSAGE: &str = "Missing image, CSV file, or metadata.";
pub const MALFORMED_TABLE_MESSAGE: &str =
    "CSV must contain a header row and at least one data row.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn text(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            headers: Vec::new(),
            body: message.into().into_bytes(),
        }
    }

    /// A PDF download.
    pub fn report(report: GeneratedReport) -> Self {
        let file_name: String = report
            .file_name
            .chars()
            .filter(|ch| !matches!(ch, '"' | '\r' | '\n'))
            .collect();
        Self {
            status: 200,
            content_type: GeneratedReport::MIME_TYPE,
            headers: vec![(
                "Content-Disposition",
                format!("attachment; filename=\"{file_name}\""),
            )],
            body: report.bytes,
        }
    }

    /// Map a failure to its status code and user-facing message.
    pub fn from_error(err: &ReportError) -> Self {
        match err {
            ReportError::MissingInput(_) => Self::text(400, MISSING_INPUT_MESSAGE),
            ReportError::MalformedTable(_) => Self::text(400, MALFORMED_TABLE_MESSAGE),
            ReportError::InvalidMetadata(detail) => {
                Self::text(400, format!("Invalid JSON format for metadata: {detail}"))
            }
            ReportError::InvalidCsv(detail) => Self::text(400, format!("Invalid CSV file: {detail}")),
            other => Self::text(500, format!("Internal server error: {other}")),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Serialise status line, headers and body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: {}\r\n\
             Content-Length: {}\r\n",
            self.status,
            reason_phrase(self.status),
            self.content_type,
            self.body.len()
        );
        for (name, value) in &self.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str("Connection: close\r\n\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        431 => "Request Header Fields Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
