// src/exec/output.rs

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::debug;

use crate::engine::WorkerId;

/// Which worker stream a forwarder reads.
#[derive(Debug, Clone, Copy)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Forward a worker's output to the log, line by line, at debug level.
///
/// Fire-and-forget: the task ends when the pipe closes. Draining the pipe
/// also keeps the worker from blocking on a full buffer.
pub fn forward_output<R>(worker: WorkerId, stream: Stream, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            match stream {
                Stream::Stdout => debug!(worker, "stdout: {}", line),
                Stream::Stderr => debug!(worker, "stderr: {}", line),
            }
        }

        debug!(worker, ?stream, "worker output closed");
    });
}
