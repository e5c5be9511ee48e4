//! Writing a fetched file to disk via a `.part` file and rename.

use std::path::{Path, PathBuf};

use super::{filename::derive_filename, FetchedFile};
use crate::error::{Error, Result};

/// Temp path used before the final rename: `file.zip` → `file.zip.part`.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(".part");
    PathBuf::from(o)
}

/// Writes `file` to `target` and returns the final path.
///
/// If `target` is an existing directory, the name comes from
/// [`derive_filename`]. The bytes land in a `.part` file first, so the final
/// name only ever holds a complete file.
pub async fn save(target: &Path, file: &FetchedFile) -> Result<PathBuf> {
    let is_dir = tokio::fs::metadata(target)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    let final_path = if is_dir {
        target.join(derive_filename(
            &file.final_url,
            file.content_disposition.as_deref(),
        ))
    } else {
        target.to_path_buf()
    };
    let part = temp_path(&final_path);

    if let Err(e) = tokio::fs::write(&part, &file.bytes).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(
            Error::download(format!("write {}: {}", part.display(), e)).with_source(e)
        );
    }
    if let Err(e) = tokio::fs::rename(&part, &final_path).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(Error::download(format!(
            "rename {} to {}: {}",
            part.display(),
            final_path.display(),
            e
        ))
        .with_source(e));
    }

    tracing::info!("saved {} bytes to {}", file.bytes.len(), final_path.display());
    Ok(final_path)
}
