//! MCP Transport Layer
//!
//! Newline-delimited JSON-RPC framing over a byte stream. The server runs on
//! stdin/stdout; tests drive it through in-memory pipes.
//!
//! # Architecture
//!
//! The transport layer is responsible only for sending and receiving messages.
//! Parsing and dispatch are handled by the server. Reading and writing are
//! split so that one task can read requests while another serializes
//! responses.

use crate::mcp::protocol::McpResponse;
use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

/// Reads one JSON-RPC message per line
///
/// Lines are yielded as raw bytes. Text decoding belongs to the JSON parser,
/// so a line that is not UTF-8 is a malformed message rather than a broken
/// stream.
pub struct MessageReader<R> {
    reader: R,

    /// Reusable buffer for reading lines
    line_buffer: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> MessageReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_buffer: Vec::new(),
        }
    }

    /// Next non-blank line, or `None` at end of input
    pub async fn next_message(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            self.line_buffer.clear();

            let bytes_read = self
                .reader
                .read_until(b'\n', &mut self.line_buffer)
                .await
                .context("Failed to read from MCP client")?;

            if bytes_read == 0 {
                return Ok(None);
            }

            let line = self.line_buffer.trim_ascii();
            if !line.is_empty() {
                tracing::trace!(bytes = bytes_read, "Received MCP message");
                return Ok(Some(line.to_vec()));
            }
        }
    }
}

/// Writes one JSON-RPC message per line and flushes after each
pub struct MessageWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> MessageWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub async fn send(&mut self, response: &McpResponse) -> Result<()> {
        let mut json =
            serde_json::to_string(response).context("Failed to serialize MCP response to JSON")?;
        json.push('\n');

        self.writer
            .write_all(json.as_bytes())
            .await
            .context("Failed to write to MCP client")?;

        // Flush to ensure the message is sent immediately
        self.writer
            .flush()
            .await
            .context("Failed to flush MCP client stream")?;

        tracing::trace!(bytes = json.len(), "Sent MCP message");
        Ok(())
    }
}

/// Reader and writer bound to the process's stdin and stdout
pub fn stdio() -> (MessageReader<BufReader<Stdin>>, MessageWriter<Stdout>) {
    (
        MessageReader::new(BufReader::new(tokio::io::stdin())),
        MessageWriter::new(tokio::io::stdout()),
    )
}
