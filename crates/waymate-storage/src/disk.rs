use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{MediaStore, StoredObject};

/// Disk-backed media store.
///
/// Objects live at `{root}/{folder}/{owner_id}/{uuid}` and are served from
/// `{public_base}` by a static file layer or CDN in front of the service.
pub struct DiskStore {
    root: PathBuf,
    public_base: String,
    max_size: usize,
}

impl DiskStore {
    pub async fn new(root: PathBuf, public_base: String, max_size: usize) -> Result<Self> {
        fs::create_dir_all(&root).await?;
        info!("Media storage directory: {}", root.display());
        Ok(Self {
            root,
            public_base: public_base.trim_end_matches('/').to_string(),
            max_size,
        })
    }

    /// Resolve a public id to its on-disk path, rejecting ids that would
    /// escape the storage root.
    fn object_path(&self, public_id: &str) -> Result<PathBuf> {
        let relative = Path::new(public_id);
        if relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            bail!("Invalid object id: {}", public_id);
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStore for DiskStore {
    async fn upload(&self, data: &[u8], folder: &str, owner_id: &str) -> Result<StoredObject> {
        if data.is_empty() {
            bail!("Empty upload");
        }
        if data.len() > self.max_size {
            bail!("Object too large: {} bytes (max {})", data.len(), self.max_size);
        }

        let public_id = format!("{}/{}/{}", folder, owner_id, Uuid::new_v4());
        let path = self.object_path(&public_id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, data).await?;

        debug!(id = %public_id, size = data.len(), "Stored media object");
        Ok(StoredObject {
            url: format!("{}/{}", self.public_base, public_id),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<()> {
        let path = self.object_path(public_id)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(id = %public_id, "Deleted media object");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(id = %public_id, "Media object already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store(max_size: usize) -> (tempfile::TempDir, DiskStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(
            dir.path().to_path_buf(),
            "http://localhost:9000/media".into(),
            max_size,
        )
        .await
        .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn upload_writes_object_and_builds_url() {
        let (_dir, store) = store(1024).await;

        let obj = store.upload(b"jpeg bytes", "trip-photos", "u-1").await.unwrap();
        assert!(obj.public_id.starts_with("trip-photos/u-1/"));
        assert_eq!(obj.url, format!("http://localhost:9000/media/{}", obj.public_id));

        let on_disk = store.object_path(&obj.public_id).unwrap();
        assert_eq!(fs::read(on_disk).await.unwrap(), b"jpeg bytes");
    }

    #[tokio::test]
    async fn upload_rejects_empty_and_oversized() {
        let (_dir, store) = store(4).await;
        assert!(store.upload(b"", "trip-photos", "u-1").await.is_err());
        assert!(store.upload(b"12345", "trip-photos", "u-1").await.is_err());
    }

    #[tokio::test]
    async fn delete_tolerates_missing_object() {
        let (_dir, store) = store(1024).await;

        let obj = store.upload(b"data", "trip-photos", "u-1").await.unwrap();
        store.delete(&obj.public_id).await.unwrap();
        // second delete is a no-op, not an error
        store.delete(&obj.public_id).await.unwrap();
    }

    #[tokio::test]
    async fn delete_rejects_path_traversal() {
        let (_dir, store) = store(1024).await;
        assert!(store.delete("../../etc/passwd").await.is_err());
    }
}
