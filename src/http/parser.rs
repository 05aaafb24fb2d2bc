//! Bounded HTTP request parsing over a raw byte stream.
//!
//! The request line and headers must fit within a fixed read limit
//! (default 4096 bytes, see [`crate::config::ServerConfig`]); anything larger
//! is rejected outright rather than partially parsed. The body, read only for
//! non-GET requests with a form-urlencoded content type, is consumed from the
//! same stream position, sized exactly by `Content-Length`.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::{Headers, Method, Params, Request};

const CRLF: &[u8] = b"\r\n";
const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Errors produced while parsing a request off the wire.
///
/// Every variant except [`ConnectionClosed`](Self::ConnectionClosed) and
/// [`Io`](Self::Io) describes malformed client input and maps to a single
/// `400 Bad Request` at the connection boundary.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The request line did not split into exactly `method target version`.
    #[error("malformed request line")]
    MalformedRequestLine,

    /// The method is not in the allowed set (GET, POST).
    #[error("unsupported method")]
    UnsupportedMethod,

    /// The request target does not start with `/`.
    #[error("malformed path")]
    MalformedPath,

    /// No `\r\n\r\n` terminator within the bytes read: either truncated
    /// input or a header block larger than the read limit.
    #[error("missing header terminator within read limit")]
    MissingHeaderTerminator,

    /// A form-urlencoded body was declared without a `Content-Length` header.
    #[error("missing Content-Length for request body")]
    MissingContentLength,

    /// The `Content-Length` header value is not a valid length.
    #[error("invalid Content-Length: {value}")]
    InvalidContentLength { value: String },

    /// The peer closed the connection before sending any data.
    #[error("connection closed before any data arrived")]
    ConnectionClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// Returns `true` if this error is malformed client input that should be
    /// answered with `400 Bad Request` (as opposed to a dead connection or an
    /// I/O failure, where no response is sent).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::ConnectionClosed | Self::Io(_))
    }
}

/// Reads and parses one HTTP request from `reader`.
///
/// At most `limit` bytes are buffered for the request-line + header phase.
/// The reader position is left immediately after the consumed request (headers
/// plus any decoded body), so the caller owns whatever the peer sends next,
/// though this server never reads a second request from the same connection.
///
/// # Errors
///
/// See [`ParseError`]. Malformed input never yields a partial `Request`.
pub async fn read_request<R>(reader: &mut R, limit: usize) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; limit];
    let mut filled = 0;

    // Fill until the header terminator shows up, the buffer is full, or EOF.
    while find_sequence(&buf[..filled], HEADER_TERMINATOR, 0).is_none() {
        if filled == limit {
            return Err(ParseError::MissingHeaderTerminator);
        }
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Err(ParseError::ConnectionClosed);
            }
            return Err(ParseError::MissingHeaderTerminator);
        }
        filled += n;
    }

    // Request line: everything up to the first CRLF.
    let line_end =
        find_sequence(&buf[..filled], CRLF, 0).ok_or(ParseError::MissingHeaderTerminator)?;
    let request_line = std::str::from_utf8(&buf[..line_end])
        .map_err(|_| ParseError::MalformedRequestLine)?;

    let tokens: Vec<&str> = request_line.split(' ').collect();
    let (method, target) = match tokens.as_slice() {
        [method, target, _version] => (*method, *target),
        _ => return Err(ParseError::MalformedRequestLine),
    };

    let method = Method::parse(method).ok_or(ParseError::UnsupportedMethod)?;

    let (path, raw_query) = match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    };
    if !path.starts_with('/') {
        return Err(ParseError::MalformedPath);
    }
    let query = Params::parse_urlencoded(raw_query);

    // Header block: scan for the terminator strictly after the request line,
    // within the bytes already read.
    let headers_start = line_end + CRLF.len();
    let headers_end = find_sequence(&buf[..filled], HEADER_TERMINATOR, headers_start)
        .ok_or(ParseError::MissingHeaderTerminator)?;
    let headers = Headers::parse_block(&String::from_utf8_lossy(&buf[headers_start..headers_end]));

    // Body phase. GET carries none.
    let mut body = Params::new();
    let mut multipart = false;
    if method != Method::Get {
        match media_type(headers.get("Content-Type")) {
            Some(ct) if ct.eq_ignore_ascii_case(FORM_URLENCODED) => {
                let length = declared_content_length(&headers)?;
                let body_start = headers_end + HEADER_TERMINATOR.len();
                let bytes = read_body(reader, &buf[body_start..filled], length).await?;
                body = Params::parse_urlencoded(&String::from_utf8_lossy(&bytes));
            }
            Some(ct) if ct.eq_ignore_ascii_case(MULTIPART_FORM_DATA) => {
                // Flagged, never decoded.
                multipart = true;
            }
            _ => {}
        }
    }

    Ok(Request::new(
        method,
        path.to_owned(),
        query,
        headers,
        body,
        multipart,
    ))
}

/// Reads exactly `length` body bytes: first whatever the header-phase read
/// already buffered past the terminator, then the rest from the stream.
async fn read_body<R>(
    reader: &mut R,
    buffered: &[u8],
    length: usize,
) -> Result<Vec<u8>, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::with_capacity(length);
    let take = buffered.len().min(length);
    bytes.extend_from_slice(&buffered[..take]);

    if bytes.len() < length {
        let mut rest = vec![0u8; length - bytes.len()];
        reader.read_exact(&mut rest).await?;
        bytes.extend_from_slice(&rest);
    }
    Ok(bytes)
}

fn declared_content_length(headers: &Headers) -> Result<usize, ParseError> {
    let value = headers
        .get("Content-Length")
        .ok_or(ParseError::MissingContentLength)?;
    value
        .parse()
        .map_err(|_| ParseError::InvalidContentLength {
            value: value.to_owned(),
        })
}

/// Extracts the media type from a `Content-Type` value, dropping any
/// parameters such as `; charset=utf-8` or `; boundary=...`.
fn media_type(content_type: Option<&str>) -> Option<&str> {
    content_type.map(|ct| ct.split(';').next().unwrap_or(ct).trim())
}

/// First occurrence of `needle` in `haystack`, scanning from `from`.
fn find_sequence(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|pos| pos + from)
}
