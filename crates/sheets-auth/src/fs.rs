//! Owner-only file persistence shared by the credential and token files

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Create `dir` (and parents) if missing. New directories are 0700 on unix.
pub(crate) async fn ensure_private_dir(dir: &Path) -> io::Result<()> {
    if tokio::fs::try_exists(dir).await? {
        return Ok(());
    }
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o700);
    builder.create(dir).await?;
    debug!(dir = %dir.display(), "created config directory");
    Ok(())
}

/// Sibling of `path` used while writing it.
pub(crate) fn temp_path(dir: &Path, path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("cell-clip");
    dir.join(format!(".{file_name}.tmp.{}", std::process::id()))
}

/// Replace `path` with `contents`, readable and writable by the owner only.
///
/// Writes a sibling temp file created with 0600 and renames it over the
/// target, so a crash mid-write leaves the previous file intact.
pub(crate) async fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path has no parent directory")
    })?;
    ensure_private_dir(dir).await?;
    let tmp_path = temp_path(dir, path);

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let result = async {
        let mut file = options.open(&tmp_path).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp_path, path).await
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&tmp_path).await;
    }
    result
}
