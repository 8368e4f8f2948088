//! Safe file output.
//!
//! Downloads land in a temporary file next to the destination and are
//! renamed into place once fully written and synced. The destination is
//! inspected without following symlinks: a symlink or an existing file is
//! only replaced when the caller asked to overwrite, and a directory is
//! never written into.

use std::io;
use std::path::Path;

use asc_core::RequestContext;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{TransferError, TransferResult};

/// Reject destinations that must not be written.
///
/// A missing destination is fine. A directory is always refused; a symlink or
/// regular file is refused unless `overwrite` is set.
pub async fn check_destination(path: &Path, overwrite: bool) -> TransferResult<()> {
    let metadata = match tokio::fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(TransferError::io("inspect", path, e)),
    };

    let file_type = metadata.file_type();
    if file_type.is_dir() {
        return Err(TransferError::IsDirectory(path.to_path_buf()));
    }
    if overwrite {
        return Ok(());
    }
    if file_type.is_symlink() {
        return Err(TransferError::SymlinkRefused(path.to_path_buf()));
    }
    Err(TransferError::AlreadyExists(path.to_path_buf()))
}

/// Write `stream` to `path` atomically, returning the byte count.
///
/// On any error, including cancellation of `ctx`, the temporary file is
/// removed and the destination is left untouched. With `overwrite`, a symlink
/// at `path` is replaced by the new file and its target is never written.
pub async fn write_stream_atomically<S, E>(
    ctx: &RequestContext,
    path: &Path,
    overwrite: bool,
    stream: S,
) -> TransferResult<u64>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<TransferError>,
{
    check_destination(path, overwrite).await?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = tempfile::Builder::new()
        .prefix(".asc-download-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| TransferError::io("create temporary file in", dir, e))?;

    // The TempPath deletes the file on drop until it is persisted.
    let (file, temp_path) = temp.into_parts();
    let mut file = File::from_std(file);

    let written = ctx.run(copy_stream(&mut file, stream, &temp_path)).await??;
    file.sync_all()
        .await
        .map_err(|e| TransferError::io("sync", &temp_path, e))?;
    drop(file);

    if overwrite {
        temp_path
            .persist(path)
            .map_err(|e| TransferError::io("rename into", path, e.error))?;
    } else {
        temp_path.persist_noclobber(path).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                TransferError::AlreadyExists(path.to_path_buf())
            } else {
                TransferError::io("rename into", path, e.error)
            }
        })?;
    }

    debug!(path = %path.display(), bytes = written, "Wrote file");
    Ok(written)
}

async fn copy_stream<S, E>(file: &mut File, stream: S, temp_path: &Path) -> TransferResult<u64>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<TransferError>,
{
    let mut stream = std::pin::pin!(stream);
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(Into::into)?;
        file.write_all(&chunk)
            .await
            .map_err(|e| TransferError::io("write", temp_path, e))?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| TransferError::io("write", temp_path, e))?;
    Ok(written)
}
