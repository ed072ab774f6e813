//! Folder references

use serde::{Deserialize, Serialize};
use std::fmt;

const SCHEME_SEPARATOR: &str = "://";

/// Reference to a folder known to the gateway
///
/// References look like `globus://<id>` or `local://<path>`; the gateway
/// resolves `local://` markers into remote folders when it accepts them.
/// A reference without a scheme is taken whole as the folder id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderRef(String);

impl FolderRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Marker for a local path the gateway still has to resolve
    pub fn local(path: impl AsRef<str>) -> Self {
        Self(format!("local{}{}", SCHEME_SEPARATOR, path.as_ref()))
    }

    pub fn globus(folder_id: impl AsRef<str>) -> Self {
        Self(format!("globus{}{}", SCHEME_SEPARATOR, folder_id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn scheme(&self) -> Option<&str> {
        self.0
            .split_once(SCHEME_SEPARATOR)
            .map(|(scheme, _)| scheme)
    }

    /// The id used to address this folder in `/folder/{id}` routes
    pub fn folder_id(&self) -> &str {
        match self.0.split_once(SCHEME_SEPARATOR) {
            Some((_, id)) => id,
            None => &self.0,
        }
    }

    /// Whether the managed-transfer endpoints can address this folder
    ///
    /// True for `globus://` references and bare ids.
    pub fn is_managed_transfer(&self) -> bool {
        matches!(self.scheme(), None | Some("globus"))
    }

    pub fn is_empty(&self) -> bool {
        self.folder_id().is_empty()
    }
}

impl fmt::Display for FolderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FolderRef {
    fn from(reference: &str) -> Self {
        Self::new(reference)
    }
}

impl From<String> for FolderRef {
    fn from(reference: String) -> Self {
        Self(reference)
    }
}
