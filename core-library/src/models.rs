//! Catalog models exposed to the UI and the playback core.

use bridge_traits::catalog::RemoteMediaFile;
use serde::{Deserialize, Serialize};

/// A playable track from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaFile {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Storage path the download URL is resolved from
    pub path: String,
}

impl MediaFile {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            path: path.into(),
        }
    }
}

impl From<RemoteMediaFile> for MediaFile {
    fn from(remote: RemoteMediaFile) -> Self {
        Self {
            id: remote.id,
            name: remote.name,
            description: remote.description,
            path: remote.path,
        }
    }
}
