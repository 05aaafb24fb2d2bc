//! Response writing: the fixed wire shapes this server emits.
//!
//! Every response carries `Connection: close` and is flushed before the
//! connection is torn down; there are no persistent connections.

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::StatusCode;

/// Writes one response to a client socket and guarantees it is flushed.
///
/// A `Responder` is handed to exactly one of: a registered handler, the static
/// fallback, or the connection worker's error path. Whoever holds it writes
/// exactly one response; the sockets close when the worker returns.
///
/// # Examples
///
/// ```
/// use servlite::http::{Responder, StatusCode};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> std::io::Result<()> {
/// let mut sink: Vec<u8> = Vec::new();
/// let mut responder = Responder::new(&mut sink);
/// responder.send_status(StatusCode::NotFound).await?;
///
/// let text = String::from_utf8(sink).unwrap();
/// assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
/// assert!(text.contains("Content-Length: 0\r\n"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Responder<W> {
    sink: W,
}

impl<W> Responder<W>
where
    W: AsyncWrite + Unpin,
{
    /// Wraps an output sink.
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Writes a status-only response: status line, `Content-Length: 0`,
    /// `Connection: close`, blank line, no body.
    pub async fn send_status(&mut self, status: StatusCode) -> std::io::Result<()> {
        let mut buf = BytesMut::with_capacity(64);
        buf.put(
            format!(
                "HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            )
            .as_bytes(),
        );
        self.write_and_flush(&buf).await
    }

    /// Writes a content response: status line, `Content-Type`,
    /// `Content-Length` equal to the body's byte length, `Connection: close`,
    /// blank line, then the body bytes.
    ///
    /// Serves both file-backed and templated responses; for templated content
    /// the caller passes the post-substitution text, so `Content-Length`
    /// reflects the substituted byte length.
    pub async fn send_content(
        &mut self,
        status: StatusCode,
        content_type: &str,
        body: &[u8],
    ) -> std::io::Result<()> {
        let mut buf = BytesMut::with_capacity(128 + body.len());
        buf.put(
            format!(
                "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            )
            .as_bytes(),
        );
        buf.put(body);
        self.write_and_flush(&buf).await
    }

    async fn write_and_flush(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.sink.write_all(bytes).await?;
        self.sink.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn status_only_shape() {
        let mut sink = Vec::new();
        Responder::new(&mut sink)
            .send_status(StatusCode::BadRequest)
            .await
            .unwrap();
        assert_eq!(
            String::from_utf8(sink).unwrap(),
            "HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
    }

    #[tokio::test]
    async fn content_shape() {
        let mut sink = Vec::new();
        Responder::new(&mut sink)
            .send_content(StatusCode::Ok, "text/html", b"<p>hi</p>")
            .await
            .unwrap();
        let s = String::from_utf8(sink).unwrap();
        assert!(s.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(s.contains("Content-Type: text/html\r\n"));
        assert!(s.contains("Content-Length: 9\r\n"));
        assert!(s.contains("Connection: close\r\n"));
        assert!(s.ends_with("\r\n\r\n<p>hi</p>"));
    }

    #[tokio::test]
    async fn content_length_matches_body_bytes() {
        // Multi-byte UTF-8 content. Length is bytes, not chars.
        let body = "café".as_bytes();
        let mut sink = Vec::new();
        Responder::new(&mut sink)
            .send_content(StatusCode::Ok, "text/plain", body)
            .await
            .unwrap();
        let s = String::from_utf8(sink).unwrap();
        assert!(s.contains(&format!("Content-Length: {}\r\n", body.len())));
    }

    #[tokio::test]
    async fn every_shape_closes_the_connection() {
        let mut sink = Vec::new();
        Responder::new(&mut sink)
            .send_status(StatusCode::Created)
            .await
            .unwrap();
        assert!(String::from_utf8(sink).unwrap().contains("Connection: close\r\n"));
    }
}
