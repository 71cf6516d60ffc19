use std::path::{Path, PathBuf};

/// Handle to one image's externally stored, mutable pixel data.
///
/// The domain layer never decodes pixels; collaborators (detector, mutator)
/// address the data through this handle and mutate it in place. Each
/// normalization owns its own work image, so handles are never shared
/// across pipeline runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkImage(PathBuf);

impl WorkImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for WorkImage {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}
