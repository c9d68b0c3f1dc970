//! Remote catalog bridge.
//!
//! The backend exposes two calls: the list of available tracks and a download
//! URL for a stored object. Both require a bearer token obtained beforehand
//! from the auth layer.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Catalog entry exactly as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMediaFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Storage path used to resolve the download URL.
    pub path: String,
}

/// Backend that serves the track catalog and resolves storage paths.
#[async_trait::async_trait]
pub trait CatalogApi: Send + Sync {
    /// List every track in the catalog.
    async fn list_media(&self, token: &str) -> Result<Vec<RemoteMediaFile>>;

    /// Resolve a storage path into a playable (usually signed) URL.
    ///
    /// Returns [`BridgeError::NotFound`](crate::BridgeError::NotFound) when no
    /// object exists at `path`.
    async fn download_url(&self, token: &str, path: &str) -> Result<String>;
}
