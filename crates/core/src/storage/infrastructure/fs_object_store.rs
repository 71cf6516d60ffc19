use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::work_image::WorkImage;
use crate::storage::domain::object_store::{ObjectMetadata, ObjectStore, StorageArea};

type StoreError = Box<dyn std::error::Error + Send + Sync>;

const META_SUFFIX: &str = ".meta.json";

/// Filesystem-backed object store for local runs and tests.
///
/// Layout: `<root>/{input,interim,output}/<key>`, with per-object metadata
/// in `<key>.meta.json` sidecars that never show up in listings. `url`
/// returns a `file://` URL, standing in for the public URL a cloud bucket
/// would serve.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, area: StorageArea, key: &str) -> PathBuf {
        self.root.join(area.name()).join(key)
    }

    fn meta_path(&self, area: StorageArea, key: &str) -> PathBuf {
        self.root
            .join(area.name())
            .join(format!("{key}{META_SUFFIX}"))
    }

    fn ensure_parent(path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn write_meta(
        &self,
        area: StorageArea,
        key: &str,
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError> {
        let path = self.meta_path(area, key);
        fs::write(path, serde_json::to_vec(metadata)?)?;
        Ok(())
    }

    fn read_meta(&self, area: StorageArea, key: &str) -> Result<ObjectMetadata, StoreError> {
        let path = self.meta_path(area, key);
        if !path.exists() {
            return Ok(ObjectMetadata::default());
        }
        Ok(serde_json::from_slice(&fs::read(path)?)?)
    }
}

impl ObjectStore for FsObjectStore {
    fn list(&self, area: StorageArea, prefix: &str) -> Result<Vec<String>, StoreError> {
        let area_root = self.root.join(area.name());
        if !area_root.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        let mut pending = vec![area_root.clone()];
        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                let key = path
                    .strip_prefix(&area_root)
                    .map_err(|e| format!("listing escaped area root: {e}"))?
                    .to_string_lossy()
                    .into_owned();
                if key.starts_with(prefix) && !key.ends_with(META_SUFFIX) {
                    keys.push(key);
                }
            }
        }
        Ok(keys)
    }

    fn put(
        &self,
        area: StorageArea,
        key: &str,
        bytes: &[u8],
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError> {
        let path = self.object_path(area, key);
        Self::ensure_parent(&path)?;
        fs::write(path, bytes)?;
        self.write_meta(area, key, metadata)
    }

    fn fetch(
        &self,
        area: StorageArea,
        key: &str,
        dest: &Path,
    ) -> Result<ObjectMetadata, StoreError> {
        Self::ensure_parent(dest)?;
        fs::copy(self.object_path(area, key), dest)?;
        self.read_meta(area, key)
    }

    fn put_file(
        &self,
        area: StorageArea,
        key: &str,
        source: &WorkImage,
    ) -> Result<(), StoreError> {
        let path = self.object_path(area, key);
        Self::ensure_parent(&path)?;
        fs::copy(source.path(), path)?;
        self.write_meta(area, key, &ObjectMetadata::default())
    }

    fn delete(&self, area: StorageArea, key: &str) -> Result<(), StoreError> {
        fs::remove_file(self.object_path(area, key))?;
        // Metadata sidecar is optional.
        let meta = self.meta_path(area, key);
        if meta.exists() {
            fs::remove_file(meta)?;
        }
        Ok(())
    }

    fn url(&self, area: StorageArea, key: &str) -> String {
        format!("file://{}", self.object_path(area, key).display())
    }
}
