mod disk;

pub use disk::DiskStore;

use anyhow::Result;
use async_trait::async_trait;

/// Handle to a stored media object: the public URL handed to clients and the
/// provider id needed to delete the object later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    pub public_id: String,
}

/// Binary object storage collaborator.
///
/// `upload` namespaces objects under a logical folder and the owning
/// account's id; `delete` takes the provider id returned by a prior upload
/// and must tolerate objects that are already gone.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, data: &[u8], folder: &str, owner_id: &str) -> Result<StoredObject>;

    async fn delete(&self, public_id: &str) -> Result<()>;
}
