//! Writing generated content to the output directory

use std::path::{Path, PathBuf};

use aida_core::{Error, Result};

/// Write `content` to `output_dir/filename`, returning the path and byte count
///
/// `filename` must be a plain file name without directory components.
pub async fn save_content(output_dir: &Path, filename: &str, content: &str) -> Result<(PathBuf, usize)> {
    let filename = filename.trim();
    if filename.is_empty()
        || filename.contains(['/', '\\'])
        || filename.contains("..")
        || filename.contains('\0')
        || Path::new(filename).is_absolute()
    {
        return Err(Error::InvalidInput(format!(
            "'{}' is not a plain file name",
            filename
        )));
    }

    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(filename);
    tokio::fs::write(&path, content.as_bytes()).await?;
    tracing::info!(path = %path.display(), bytes = content.len(), "saved content");
    Ok((path, content.len()))
}
