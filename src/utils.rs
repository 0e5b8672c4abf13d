use log::info;
use std::io;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "koppen_rs_cache";

pub fn get_cache_dir() -> io::Result<PathBuf> {
    dirs::cache_dir()
        .map(|p| p.join(CACHE_DIR_NAME))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine system cache directory",
            )
        })
}

pub async fn ensure_cache_dir_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Cache path exists but is not a directory: {}", path.display()),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating cache directory: {}", path.display());
            tokio::fs::create_dir_all(path).await
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_cache_dir() -> io::Result<()> {
        let root = tempfile::tempdir()?;
        let path = root.path().join("nested").join("cache");
        ensure_cache_dir_exists(&path).await?;
        assert!(path.is_dir());
        // Second call is a no-op.
        ensure_cache_dir_exists(&path).await
    }

    #[tokio::test]
    async fn rejects_file_as_cache_dir() -> io::Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        assert!(ensure_cache_dir_exists(file.path()).await.is_err());
        Ok(())
    }
}
