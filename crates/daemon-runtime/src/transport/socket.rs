//! # Unix Socket Transport
//!
//! Newline-delimited JSON over a Unix stream socket. Each line is one
//! request [`Envelope`]; each request gets exactly one [`Response`] line.
//! The requester pid comes from the socket's peer credentials.
//!
//! Dispatch may block on storage tools and locks, so it runs on the blocking
//! thread pool.
//!
//! Lines are read as raw bytes up to a size cap. A line that is too long,
//! not UTF-8, or not JSON gets an `InvalidCommand` reply and the connection
//! stays open.

use anyhow::{Context, Result};
use shared_types::{Classified, Envelope, ErrorKind, ErrorReply, Pid, Response};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::dispatch::Dispatcher;

/// Longest accepted request line, newline excluded.
pub const MAX_FRAME_LEN: usize = 1 << 20;

/// A line that is not a request envelope.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed request frame")]
    Malformed(#[from] serde_json::Error),

    #[error("request frame is not UTF-8")]
    NotUtf8(#[from] std::str::Utf8Error),

    #[error("request frame exceeds {limit} bytes")]
    TooLong { limit: usize },
}

impl Classified for FrameError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidCommand
    }
}

pub struct SocketServer {
    path: PathBuf,
    dispatcher: Arc<Dispatcher>,
    max_frame: usize,
}

impl SocketServer {
    pub fn new(path: PathBuf, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            path,
            dispatcher,
            max_frame: MAX_FRAME_LEN,
        }
    }

    /// Override the request line cap.
    pub fn with_max_frame(mut self, limit: usize) -> Self {
        self.max_frame = limit;
        self
    }

    /// Accept clients until `shutdown` flips to `true` or its sender is
    /// dropped, then remove the socket file.
    pub async fn serve(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        // Remove stale socket file
        let _ = std::fs::remove_file(&self.path);
        let listener = UnixListener::bind(&self.path)
            .with_context(|| format!("binding {}", self.path.display()))?;
        info!(path = %self.path.display(), "listening");

        let result = loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, _addr) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => break Err(e.into()),
                    };
                    let dispatcher = self.dispatcher.clone();
                    let max_frame = self.max_frame;
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(dispatcher, stream, max_frame).await {
                            warn!(error = %e, "connection error");
                        }
                    });
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break Ok(());
                    }
                }
            }
        };

        let _ = std::fs::remove_file(&self.path);
        debug!("socket server stopped");
        result
    }
}

fn peer_pid(stream: &UnixStream) -> Result<Pid> {
    let cred = stream.peer_cred().context("reading peer credentials")?;
    cred.pid().context("peer pid unavailable")
}

enum Frame {
    Line(Vec<u8>),
    TooLong,
    Closed,
}

/// Read one newline-terminated line of at most `limit` bytes. The rest of
/// an oversized line is discarded.
async fn read_frame<R: AsyncBufRead + Unpin>(reader: &mut R, limit: usize) -> Result<Frame> {
    let mut buf = Vec::new();
    let n = (&mut *reader)
        .take(limit as u64 + 1)
        .read_until(b'\n', &mut buf)
        .await?;
    if n == 0 {
        return Ok(Frame::Closed);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        return Ok(Frame::Line(buf));
    }
    if buf.len() <= limit {
        return Ok(Frame::Line(buf));
    }

    loop {
        let (used, done) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(Frame::TooLong);
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            }
        };
        reader.consume(used);
        if done {
            return Ok(Frame::TooLong);
        }
    }
}

/// `None` for a blank line.
fn parse_frame(bytes: &[u8]) -> Result<Option<Envelope>, FrameError> {
    let line = std::str::from_utf8(bytes)?.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

async fn handle_connection(
    dispatcher: Arc<Dispatcher>,
    stream: UnixStream,
    max_frame: usize,
) -> Result<()> {
    let pid = peer_pid(&stream)?;
    debug!(pid, "client connected");

    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    loop {
        let parsed = match read_frame(&mut reader, max_frame).await? {
            Frame::Closed => break,
            Frame::TooLong => Err(FrameError::TooLong { limit: max_frame }),
            Frame::Line(bytes) => parse_frame(&bytes),
        };

        let response = match parsed {
            Ok(None) => continue,
            Ok(Some(request)) => {
                let dispatcher = dispatcher.clone();
                tokio::task::spawn_blocking(move || dispatcher.dispatch(request, pid)).await?
            }
            Err(err) => {
                info!(pid, error = %err, "unparseable request");
                Response::Error(ErrorReply::from_error(&err))
            }
        };
        write_line(&mut writer, &response).await?;
    }

    debug!(pid, "client disconnected");
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, response: &Response) -> Result<()> {
    let mut out = serde_json::to_vec(response)?;
    out.push(b'\n');
    writer.write_all(&out).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Backends, Container};
    use shared_types::{fields, CommandTag};
    use std::time::Duration;

    type Started = (tempfile::TempDir, PathBuf, watch::Sender<bool>, tokio::task::JoinHandle<Result<()>>);

    async fn start() -> Started {
        start_with(MAX_FRAME_LEN).await
    }

    async fn start_with(max_frame: usize) -> Started {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.sock");
        let (backends, memory) = Backends::memory();
        memory.storage.add_pool("zones");
        let container = Container::new(backends);

        let (tx, rx) = watch::channel(false);
        let server = SocketServer::new(path.clone(), container.dispatcher()).with_max_frame(max_frame);
        let task = tokio::spawn(server.serve(rx));

        for _ in 0..100 {
            if path.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        (dir, path, tx, task)
    }

    async fn roundtrip(stream: &mut BufReader<UnixStream>, line: &str) -> Response {
        roundtrip_bytes(stream, line.as_bytes()).await
    }

    async fn roundtrip_bytes(stream: &mut BufReader<UnixStream>, line: &[u8]) -> Response {
        stream.get_mut().write_all(line).await.unwrap();
        stream.get_mut().write_all(b"\n").await.unwrap();
        let mut reply = String::new();
        stream.read_line(&mut reply).await.unwrap();
        serde_json::from_str(&reply).unwrap()
    }

    #[tokio::test]
    async fn test_request_reply_over_socket() {
        let (_dir, path, tx, task) = start().await;
        let mut stream = BufReader::new(UnixStream::connect(&path).await.unwrap());

        let request = Envelope::new()
            .with(fields::COMMAND, CommandTag::SetSystemPool.as_i32())
            .with(fields::POOL, "zones");
        let line = serde_json::to_string(&request).unwrap();
        assert!(roundtrip(&mut stream, &line).await.is_success());

        let request = Envelope::new().with(fields::COMMAND, 99);
        let line = serde_json::to_string(&request).unwrap();
        match roundtrip(&mut stream, &line).await {
            Response::Error(reply) => {
                assert_eq!(reply.kind, ErrorKind::InvalidCommand);
                assert_eq!(reply.message, "Invalid command value 99");
            }
            other => panic!("expected error, got {other:?}"),
        }

        tx.send(true).unwrap();
        task.await.unwrap().unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_malformed_line_gets_invalid_command() {
        let (_dir, path, tx, task) = start().await;
        let mut stream = BufReader::new(UnixStream::connect(&path).await.unwrap());

        match roundtrip(&mut stream, "{not json").await {
            Response::Error(reply) => assert_eq!(reply.kind, ErrorKind::InvalidCommand),
            other => panic!("expected error, got {other:?}"),
        }

        let request = Envelope::new().with(fields::COMMAND, CommandTag::ListRecovery.as_i32());
        let line = serde_json::to_string(&request).unwrap();
        assert!(roundtrip(&mut stream, &line).await.is_success());

        tx.send(true).unwrap();
        task.await.unwrap().unwrap();
    }

    fn list_recovery_line() -> String {
        let request = Envelope::new().with(fields::COMMAND, CommandTag::ListRecovery.as_i32());
        serde_json::to_string(&request).unwrap()
    }

    #[tokio::test]
    async fn test_non_utf8_line_keeps_connection() {
        let (_dir, path, tx, task) = start().await;
        let mut stream = BufReader::new(UnixStream::connect(&path).await.unwrap());

        match roundtrip_bytes(&mut stream, b"\xff\xfe{}").await {
            Response::Error(reply) => assert_eq!(reply.kind, ErrorKind::InvalidCommand),
            other => panic!("expected error, got {other:?}"),
        }
        assert!(roundtrip(&mut stream, &list_recovery_line()).await.is_success());

        tx.send(true).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_oversized_line_is_refused_and_skipped() {
        let (_dir, path, tx, task) = start_with(256).await;
        let mut stream = BufReader::new(UnixStream::connect(&path).await.unwrap());

        let huge = format!("{{\"pad\":\"{}\"}}", "x".repeat(4096));
        match roundtrip(&mut stream, &huge).await {
            Response::Error(reply) => {
                assert_eq!(reply.kind, ErrorKind::InvalidCommand);
                assert_eq!(reply.message, "request frame exceeds 256 bytes");
            }
            other => panic!("expected error, got {other:?}"),
        }
        assert!(roundtrip(&mut stream, &list_recovery_line()).await.is_success());

        tx.send(true).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_read_frame_bounds() {
        let mut input: &[u8] = b"short\nabcdefghij\ntail";
        assert!(matches!(read_frame(&mut input, 8).await.unwrap(), Frame::Line(l) if l == b"short"));
        assert!(matches!(read_frame(&mut input, 8).await.unwrap(), Frame::TooLong));
        assert!(matches!(read_frame(&mut input, 8).await.unwrap(), Frame::Line(l) if l == b"tail"));
        assert!(matches!(read_frame(&mut input, 8).await.unwrap(), Frame::Closed));
    }

    #[tokio::test]
    async fn test_stale_socket_file_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.sock");
        std::fs::write(&path, b"stale").unwrap();

        let (backends, _memory) = Backends::memory();
        let container = Container::new(backends);
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(SocketServer::new(path.clone(), container.dispatcher()).serve(rx));

        let mut connected = None;
        for _ in 0..100 {
            if let Ok(stream) = UnixStream::connect(&path).await {
                connected = Some(stream);
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(connected.is_some());

        drop(tx);
        task.await.unwrap().unwrap();
    }
}
