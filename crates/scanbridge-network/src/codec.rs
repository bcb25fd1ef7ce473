//! Tokio codec for HTTP/1.1 request framing.
//!
//! [`HttpCodec`] turns a TCP byte stream into [`HttpRequest`] values and
//! writes [`HttpResponse`] values back, so a connection can be driven with
//! `Framed` exactly like any other message stream.
//!
//! ```text
//! TCP Stream -> Decoder -> HttpRequest (head parsed by httparse, body by Content-Length)
//! HttpResponse -> Encoder -> TCP Stream (status line, headers, Content-Length, body)
//! ```
//!
//! Only `Content-Length` bodies are accepted. A request whose head or body
//! would exceed the configured maximum is rejected before it is buffered.

use bytes::{Buf, BytesMut};
use httparse::{EMPTY_HEADER, Request, Status};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{HttpError, Result};
use crate::http::{HttpRequest, HttpResponse, reason_phrase};

/// Default maximum request size in bytes (1 MiB), head and body together.
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 1024 * 1024;

/// Maximum number of header fields in a request.
const MAX_HEADERS: usize = 64;

/// Parsed head waiting for its body.
#[derive(Debug)]
struct PendingRequest {
    request: HttpRequest,
    content_length: usize,
}

/// Tokio codec for HTTP/1.1 requests and responses.
#[derive(Debug)]
pub struct HttpCodec {
    pending: Option<PendingRequest>,
    max_request_size: usize,
}

impl HttpCodec {
    /// Create a codec with the default 1 MiB request limit.
    pub fn new() -> Self {
        Self::with_max_request_size(DEFAULT_MAX_REQUEST_SIZE)
    }

    /// Create a codec with a custom request limit.
    pub fn with_max_request_size(max_request_size: usize) -> Self {
        Self {
            pending: None,
            max_request_size,
        }
    }

    pub fn max_request_size(&self) -> usize {
        self.max_request_size
    }

    fn too_large(&self, size: usize) -> HttpError {
        HttpError::RequestTooLarge {
            size,
            max_size: self.max_request_size,
        }
    }

    /// Parse a request head from `src`, consuming it on success.
    fn decode_head(&mut self, src: &mut BytesMut) -> Result<Option<PendingRequest>> {
        let mut headers = [EMPTY_HEADER; MAX_HEADERS];
        let mut parsed = Request::new(&mut headers);

        let head_len = match parsed.parse(&src[..])? {
            Status::Complete(len) => len,
            Status::Partial => {
                if src.len() > self.max_request_size {
                    return Err(self.too_large(src.len()));
                }
                return Ok(None);
            }
        };

        let method = parsed
            .method
            .ok_or_else(|| HttpError::Parse("missing method".to_string()))?
            .to_ascii_uppercase();
        let target = parsed
            .path
            .ok_or_else(|| HttpError::Parse("missing request target".to_string()))?;
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.to_string(), None),
        };
        let version = parsed.version.unwrap_or(1);

        let mut content_length = 0;
        let mut fields = Vec::with_capacity(parsed.headers.len());
        for header in parsed.headers.iter() {
            let value = String::from_utf8_lossy(header.value).trim().to_string();
            if header.name.eq_ignore_ascii_case("Content-Length") {
                content_length = value
                    .parse::<usize>()
                    .map_err(|_| HttpError::Parse(format!("invalid Content-Length: {value}")))?;
            } else if header.name.eq_ignore_ascii_case("Transfer-Encoding")
                && !value.eq_ignore_ascii_case("identity")
            {
                return Err(HttpError::Unsupported(format!("Transfer-Encoding: {value}")));
            }
            fields.push((header.name.to_string(), value));
        }

        let total = head_len.saturating_add(content_length);
        if total > self.max_request_size {
            return Err(self.too_large(total));
        }

        src.advance(head_len);
        Ok(Some(PendingRequest {
            request: HttpRequest {
                method,
                path,
                query,
                version,
                headers: fields,
                body: bytes::Bytes::new(),
            },
            content_length,
        }))
    }
}

impl Default for HttpCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for HttpCodec {
    type Item = HttpRequest;
    type Error = HttpError;

    /// Decode one request from the byte stream.
    ///
    /// Returns `Ok(None)` until the head and the whole body have arrived.
    /// Bytes after the body stay in `src` for the next pipelined request.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        let pending = match self.pending.take() {
            Some(pending) => pending,
            None => match self.decode_head(src)? {
                Some(pending) => pending,
                None => return Ok(None),
            },
        };

        if src.len() < pending.content_length {
            src.reserve(pending.content_length - src.len());
            self.pending = Some(pending);
            return Ok(None);
        }

        let PendingRequest {
            mut request,
            content_length,
        } = pending;
        request.body = src.split_to(content_length).freeze();
        Ok(Some(request))
    }
}

impl Encoder<HttpResponse> for HttpCodec {
    type Error = HttpError;

    fn encode(&mut self, item: HttpResponse, dst: &mut BytesMut) -> Result<()> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", item.status, reason_phrase(item.status));
        for (name, value) in &item.headers {
            if name.eq_ignore_ascii_case("Content-Length") {
                continue;
            }
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str(&format!("Content-Length: {}\r\n\r\n", item.body.len()));

        dst.reserve(head.len() + item.body.len());
        dst.extend_from_slice(head.as_bytes());
        dst.extend_from_slice(&item.body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_default() {
        let codec = HttpCodec::default();
        assert_eq!(codec.max_request_size(), DEFAULT_MAX_REQUEST_SIZE);
    }

    #[test]
    fn test_decode_get_request() {
        let mut codec = HttpCodec::new();
        let mut buffer = BytesMut::from(
            &b"GET /api/fingerprint/health?x=1 HTTP/1.1\r\nHost: localhost\r\n\r\n"[..],
        );

        let request = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/api/fingerprint/health");
        assert_eq!(request.query.as_deref(), Some("x=1"));
        assert_eq!(request.version, 1);
        assert_eq!(request.header("host"), Some("localhost"));
        assert!(request.body.is_empty());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_decode_post_with_body() {
        let mut codec = HttpCodec::new();
        let mut buffer = BytesMut::from(
            &b"POST /api/fingerprint/capture HTTP/1.1\r\nContent-Length: 2\r\n\r\n{}"[..],
        );

        let request = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(&request.body[..], b"{}");
    }

    #[test]
    fn test_decode_partial_head() {
        let mut codec = HttpCodec::new();
        let mut buffer = BytesMut::from(&b"GET /api/finger"[..]);

        assert!(codec.decode(&mut buffer).unwrap().is_none());
        buffer.extend_from_slice(b"print/health HTTP/1.1\r\n\r\n");
        let request = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(request.path, "/api/fingerprint/health");
    }

    #[test]
    fn test_decode_partial_body() {
        let mut codec = HttpCodec::new();
        let mut buffer = BytesMut::from(&b"POST /x HTTP/1.1\r\nContent-Length: 11\r\n\r\n{\"a\":"[..]);

        assert!(codec.decode(&mut buffer).unwrap().is_none());
        buffer.extend_from_slice(b"\"bcd\"}");
        let request = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&request.body[..], b"{\"a\":\"bcd\"}");
    }

    #[test]
    fn test_decode_pipelined_requests() {
        let mut codec = HttpCodec::new();
        let mut buffer = BytesMut::from(
            &b"POST /a HTTP/1.1\r\nContent-Length: 1\r\n\r\nXGET /b HTTP/1.1\r\n\r\n"[..],
        );

        let first = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(first.path, "/a");
        assert_eq!(&first.body[..], b"X");

        let second = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(second.path, "/b");
        assert!(codec.decode(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn test_decode_garbage() {
        let mut codec = HttpCodec::new();
        let mut buffer = BytesMut::from(&b"\x00\x01\x02 nonsense\r\n\r\n"[..]);

        let error = codec.decode(&mut buffer).unwrap_err();
        assert_eq!(error.status(), 400);
    }

    #[test]
    fn test_decode_invalid_content_length() {
        let mut codec = HttpCodec::new();
        let mut buffer = BytesMut::from(&b"POST /x HTTP/1.1\r\nContent-Length: abc\r\n\r\n"[..]);

        assert!(matches!(codec.decode(&mut buffer), Err(HttpError::Parse(_))));
    }

    #[test]
    fn test_decode_body_too_large() {
        let mut codec = HttpCodec::with_max_request_size(64);
        let mut buffer =
            BytesMut::from(&b"POST /x HTTP/1.1\r\nContent-Length: 1000\r\n\r\n"[..]);

        assert!(matches!(
            codec.decode(&mut buffer),
            Err(HttpError::RequestTooLarge { max_size: 64, .. })
        ));
    }

    #[test]
    fn test_decode_content_length_at_usize_max() {
        let mut codec = HttpCodec::new();
        let mut buffer = BytesMut::from(
            &b"POST /x HTTP/1.1\r\nContent-Length: 18446744073709551615\r\n\r\n"[..],
        );

        match codec.decode(&mut buffer) {
            Err(HttpError::RequestTooLarge { size, max_size }) => {
                assert_eq!(size, usize::MAX);
                assert_eq!(max_size, DEFAULT_MAX_REQUEST_SIZE);
            }
            other => panic!("expected RequestTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_head_too_large() {
        let mut codec = HttpCodec::with_max_request_size(32);
        let mut buffer = BytesMut::from(&b"GET /a-very-long-path-that-never-ends-and-keeps-going"[..]);

        assert!(matches!(
            codec.decode(&mut buffer),
            Err(HttpError::RequestTooLarge { .. })
        ));
    }

    #[test]
    fn test_decode_chunked_unsupported() {
        let mut codec = HttpCodec::new();
        let mut buffer =
            BytesMut::from(&b"POST /x HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n"[..]);

        assert!(matches!(
            codec.decode(&mut buffer),
            Err(HttpError::Unsupported(_))
        ));
    }

    #[test]
    fn test_encode_response() {
        let mut codec = HttpCodec::new();
        let mut buffer = BytesMut::new();
        let response = HttpResponse::error(404, "Not found").with_header("Content-Length", "999");

        codec.encode(response, &mut buffer).unwrap();

        let text = String::from_utf8(buffer.to_vec()).unwrap();
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.contains("Content-Length: 21\r\n"));
        assert!(!text.contains("999"));
        assert!(text.ends_with("\r\n\r\n{\"error\":\"Not found\"}"));
    }
}
