//! Chunked upload executor.
//!
//! Each [`UploadOperation`] names a byte range of the source file and a
//! pre-signed destination for it. The executor reads every range from its own
//! file handle and sends it through a [`ChunkTransport`], running at most
//! [`UploadConfig::concurrency`] transfers at once. The first failure cancels
//! the remaining transfers and is returned; chunks are never retried.

use std::path::Path;
use std::sync::Arc;

use asc_core::{RequestContext, UploadOperation};
use bytes::Bytes;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::{TransferError, TransferResult};
use crate::transport::ChunkTransport;

/// Default number of chunks in flight.
pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 4;

/// Upload executor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadConfig {
    concurrency: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_UPLOAD_CONCURRENCY,
        }
    }
}

impl UploadConfig {
    /// Settings with `concurrency` workers; `1` uploads strictly in order.
    pub fn new(concurrency: usize) -> Self {
        Self::default().with_concurrency(concurrency)
    }

    /// Set the worker bound (at least one).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }
}

/// What a finished upload transferred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Operations completed.
    pub operations: usize,
    /// Bytes sent across all operations.
    pub bytes: u64,
}

/// Runs upload operations against a chunk transport.
pub struct UploadExecutor<T: ChunkTransport> {
    transport: Arc<T>,
    config: UploadConfig,
}

impl<T: ChunkTransport + 'static> UploadExecutor<T> {
    pub fn new(transport: T, config: UploadConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config,
        }
    }

    pub const fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Transfer every operation's byte range of `path`.
    ///
    /// Each operation is sent exactly once. The operations are assumed to
    /// partition the file (see [`asc_core::check_partition`]); a range that
    /// runs past the end of the file fails with [`TransferError::ShortRead`].
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        path: &Path,
        operations: &[UploadOperation],
    ) -> TransferResult<UploadReport> {
        ctx.check()?;
        info!(
            path = %path.display(),
            operations = operations.len(),
            concurrency = self.config.concurrency,
            "Starting upload"
        );

        // Cancelled on the first failure so siblings stop promptly.
        let workers = ctx.child();
        let mut tasks: JoinSet<TransferResult<u64>> = JoinSet::new();
        let mut report = UploadReport::default();
        let mut pending = operations.iter().cloned();

        loop {
            while tasks.len() < self.config.concurrency {
                let Some(operation) = pending.next() else { break };
                let transport = Arc::clone(&self.transport);
                let ctx = workers.clone();
                let path = path.to_path_buf();
                tasks.spawn(async move { send_operation(transport.as_ref(), &ctx, &path, &operation).await });
            }

            let Some(joined) = tasks.join_next().await else { break };
            let outcome = match joined {
                Ok(result) => result,
                Err(e) => Err(TransferError::TaskFailed(e.to_string())),
            };

            match outcome {
                Ok(bytes) => {
                    report.operations += 1;
                    report.bytes += bytes;
                }
                Err(err) => {
                    warn!(error = %err, "Chunk upload failed; cancelling remaining chunks");
                    workers.cancel();
                    tasks.abort_all();
                    return Err(err);
                }
            }
        }

        info!(operations = report.operations, bytes = report.bytes, "Upload finished");
        Ok(report)
    }
}

async fn send_operation<T: ChunkTransport + ?Sized>(
    transport: &T,
    ctx: &RequestContext,
    path: &Path,
    operation: &UploadOperation,
) -> TransferResult<u64> {
    let body = ctx.run(read_chunk(path, operation.offset, operation.length)).await??;
    let length = operation.length;

    ctx.run(transport.send_chunk(operation, body)).await??;
    debug!(offset = operation.offset, length, "Chunk uploaded");
    Ok(length)
}

/// Read exactly `length` bytes at `offset` through a fresh file handle.
async fn read_chunk(path: &Path, offset: u64, length: u64) -> TransferResult<Bytes> {
    let mut file = File::open(path)
        .await
        .map_err(|e| TransferError::io("open", path, e))?;

    // Ranges past the end are rejected before anything is allocated for them.
    let file_len = file
        .metadata()
        .await
        .map_err(|e| TransferError::io("inspect", path, e))?
        .len();
    let available = file_len.saturating_sub(offset);
    if length > available {
        return Err(TransferError::ShortRead {
            offset,
            expected: length,
            actual: available,
        });
    }

    file.seek(std::io::SeekFrom::Start(offset))
        .await
        .map_err(|e| TransferError::io("seek in", path, e))?;

    let capacity = usize::try_from(length)
        .map_err(|_| TransferError::InvalidOperation(format!("chunk of {length} bytes is too large")))?;
    let mut buffer = Vec::with_capacity(capacity);
    file.take(length)
        .read_to_end(&mut buffer)
        .await
        .map_err(|e| TransferError::io("read", path, e))?;

    let actual = buffer.len() as u64;
    if actual != length {
        return Err(TransferError::ShortRead {
            offset,
            expected: length,
            actual,
        });
    }
    Ok(Bytes::from(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::RecordingTransport;
    use asc_core::ContextError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source_file(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    fn op(n: u32, offset: u64, length: u64) -> UploadOperation {
        UploadOperation::new("PUT", format!("https://upload.example/part/{n}"), offset, length)
    }

    #[test]
    fn test_upload_config_clamps_to_one() {
        assert_eq!(UploadConfig::new(0).concurrency(), 1);
        assert_eq!(UploadConfig::default().concurrency(), DEFAULT_UPLOAD_CONCURRENCY);
    }

    #[tokio::test]
    async fn test_each_operation_sent_once_with_its_bytes() {
        for concurrency in [1, 4] {
            let file = source_file(b"0123456789");
            let transport = RecordingTransport::new();
            let sent = transport.sent();
            let executor = UploadExecutor::new(transport, UploadConfig::new(concurrency));

            let ops = vec![op(1, 0, 4), op(2, 4, 4), op(3, 8, 2)];
            let report = executor
                .upload(&RequestContext::new(), file.path(), &ops)
                .await
                .unwrap();

            assert_eq!(report, UploadReport { operations: 3, bytes: 10 });

            let mut chunks = sent.lock().unwrap().clone();
            chunks.sort_by_key(|c| c.offset);
            let bodies: Vec<&[u8]> = chunks.iter().map(|c| c.body.as_slice()).collect();
            assert_eq!(bodies, vec![&b"0123"[..], &b"4567"[..], &b"89"[..]]);
        }
    }

    #[tokio::test]
    async fn test_sequential_upload_preserves_order() {
        let file = source_file(b"abcdef");
        let transport = RecordingTransport::new();
        let sent = transport.sent();
        let executor = UploadExecutor::new(transport, UploadConfig::new(1));

        let ops = vec![op(2, 3, 3), op(1, 0, 3)];
        executor
            .upload(&RequestContext::new(), file.path(), &ops)
            .await
            .unwrap();

        let offsets: Vec<u64> = sent.lock().unwrap().iter().map(|c| c.offset).collect();
        assert_eq!(offsets, vec![3, 0]);
    }

    #[tokio::test]
    async fn test_short_read_is_an_error() {
        let file = source_file(b"12345");
        let executor = UploadExecutor::new(RecordingTransport::new(), UploadConfig::default());

        let err = executor
            .upload(&RequestContext::new(), file.path(), &[op(1, 3, 5)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TransferError::ShortRead {
                offset: 3,
                expected: 5,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_oversized_length_is_a_short_read_not_an_allocation() {
        let file = source_file(b"12345");
        let transport = RecordingTransport::new();
        let sent = transport.sent();
        let executor = UploadExecutor::new(transport, UploadConfig::default());

        let err = executor
            .upload(&RequestContext::new(), file.path(), &[op(1, 0, 1 << 50)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TransferError::ShortRead {
                offset: 0,
                expected,
                actual: 5
            } if expected == 1 << 50
        ));
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offset_past_end_is_a_short_read() {
        let file = source_file(b"12345");
        let executor = UploadExecutor::new(RecordingTransport::new(), UploadConfig::default());

        let err = executor
            .upload(&RequestContext::new(), file.path(), &[op(1, 9, 1)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TransferError::ShortRead {
                offset: 9,
                expected: 1,
                actual: 0
            }
        ));
    }

    #[tokio::test]
    async fn test_first_failure_cancels_siblings() {
        let file = source_file(&[7u8; 30]);
        let transport = RecordingTransport::new()
            .failing_on("part/2")
            .hanging_on("part/1");
        let executor = UploadExecutor::new(transport, UploadConfig::new(3));

        let ops = vec![op(1, 0, 10), op(2, 10, 10), op(3, 20, 10)];
        let err = executor
            .upload(&RequestContext::new(), file.path(), &ops)
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::UploadRejected { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let executor = UploadExecutor::new(RecordingTransport::new(), UploadConfig::default());
        let err = executor
            .upload(
                &RequestContext::new(),
                Path::new("/nonexistent/asc-upload-source"),
                &[op(1, 0, 1)],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::Io { operation: "open", .. }));
    }

    #[tokio::test]
    async fn test_cancelled_context_sends_nothing() {
        let file = source_file(b"abc");
        let transport = RecordingTransport::new();
        let sent = transport.sent();
        let executor = UploadExecutor::new(transport, UploadConfig::default());

        let ctx = RequestContext::new();
        ctx.cancel();
        let err = executor.upload(&ctx, file.path(), &[op(1, 0, 3)]).await.unwrap_err();

        assert!(matches!(err, TransferError::Context(ContextError::Cancelled)));
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_operations_is_a_no_op() {
        let file = source_file(b"");
        let executor = UploadExecutor::new(RecordingTransport::new(), UploadConfig::default());
        let report = executor
            .upload(&RequestContext::new(), file.path(), &[])
            .await
            .unwrap();
        assert_eq!(report, UploadReport::default());
    }
}
