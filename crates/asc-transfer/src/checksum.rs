//! Whole-file checksums reported when an upload is committed.

use std::fmt::LowerHex;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use asc_core::{ChecksumAlgorithm, ChecksumResult};
use md5::Md5;
use sha2::digest::Output;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{TransferError, TransferResult};

const BUFFER_SIZE: usize = 1024 * 1024;

/// Hash the whole file at `path`, streaming it in 1 MiB blocks.
///
/// Runs on the blocking thread pool so large files do not stall the runtime.
pub async fn checksum(path: &Path, algorithm: ChecksumAlgorithm) -> TransferResult<ChecksumResult> {
    let path_owned = path.to_path_buf();
    let hash = tokio::task::spawn_blocking(move || match algorithm {
        ChecksumAlgorithm::Md5 => hash_file::<Md5>(&path_owned),
        ChecksumAlgorithm::Sha256 => hash_file::<Sha256>(&path_owned),
    })
    .await
    .map_err(|e| TransferError::TaskFailed(e.to_string()))??;

    debug!(path = %path.display(), %algorithm, "Computed checksum");
    Ok(ChecksumResult { algorithm, hash })
}

fn hash_file<D>(path: &Path) -> TransferResult<String>
where
    D: Digest,
    Output<D>: LowerHex,
{
    let mut file = File::open(path).map_err(|e| TransferError::io("open", path, e))?;
    let mut hasher = D::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let n = file
            .read(&mut buffer)
            .map_err(|e| TransferError::io("read", path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
