//! Content hashing for files on disk.
//!
//! Hosts normally supply the content hash themselves. The command-line tool
//! uses these helpers to derive one from the file bytes.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::{fs, io::AsyncReadExt};
use tracing::debug;

use crate::domain::assets::StoredAsset;

const BUF_SIZE: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ContentHashError {
    #[error("failed to read `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContentHashError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// SHA-256 of a buffered payload as lowercase hex.
pub fn hash_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Stream a file through SHA-256 and return the digest as lowercase hex.
///
/// Reads in fixed-size chunks to keep memory bounded for large assets.
pub async fn hash_path(path: &Path) -> Result<String, ContentHashError> {
    let mut file = fs::File::open(path)
        .await
        .map_err(|err| ContentHashError::io(path, err))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    let mut total_bytes: u64 = 0;

    loop {
        let read = file
            .read(&mut buf)
            .await
            .map_err(|err| ContentHashError::io(path, err))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
        total_bytes += read as u64;
    }

    let checksum = hex::encode(hasher.finalize());
    debug!(
        target = "cachebust::content",
        path = %path.display(),
        bytes = total_bytes,
        "content hash computed"
    );
    Ok(checksum)
}

/// Build an asset reference whose content hash is the digest of `path`.
pub async fn asset_for_path(path: &Path, class: &str) -> Result<StoredAsset, ContentHashError> {
    let checksum = hash_path(path).await?;
    Ok(StoredAsset::with_hash(checksum).class(class))
}
