//! Main commands enum.

use std::path::PathBuf;
use std::time::Duration;

use asc_client::MAX_PAGE_LIMIT;
use asc_core::ChecksumAlgorithm;
use clap::Subcommand;

use crate::config::parse_duration;

/// Available commands.
///
/// Each command is a thin wrapper over one piece of the runtime.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a resource or collection and print it as JSON
    Get {
        /// Resource path, e.g. /v1/apps
        path: String,
        /// Follow `links.next` and print every page as one document
        #[arg(long)]
        paginate: bool,
        /// Page size to request
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PAGE_LIMIT)))]
        limit: Option<u32>,
    },

    /// Wait for a build run to complete; fails unless it succeeded
    WaitBuildRun {
        /// Build run ID
        id: String,
        /// Time between status checks
        #[arg(long, default_value = "30s", value_parser = parse_duration)]
        interval: Duration,
        /// Give up after this long
        #[arg(long, default_value = "60m", value_parser = parse_duration)]
        timeout: Duration,
    },

    /// Upload a file through pre-signed upload operations and print its MD5
    Upload {
        /// File to upload
        file: PathBuf,
        /// JSON array of upload operations, inline or as a path to a file
        #[arg(long)]
        operations: String,
    },

    /// Compute a file checksum
    Checksum {
        /// File to hash
        file: PathBuf,
        /// md5 or sha256
        #[arg(long, default_value = "md5")]
        algorithm: ChecksumAlgorithm,
    },

    /// Download a URL to a local file
    Download {
        /// URL to fetch
        url: String,
        /// Destination path
        dest: PathBuf,
        /// Replace an existing file or symlink at the destination
        #[arg(long)]
        overwrite: bool,
    },
}
