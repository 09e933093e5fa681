use std::path::{Component, Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, ResultError};
use crate::storage::{Credentials, Locator, ObjectStore};

/// Filesystem-backed object store, laid out as
/// `<base_dir>/<backend>/<bucket>/<filepath>`. Credentials are ignored.
#[derive(Debug)]
pub struct FsObjectStore {
    base_dir: PathBuf,
}

impl FsObjectStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    fn object_path(&self, locator: &Locator) -> Result<PathBuf> {
        let escapes = |p: &str| {
            Path::new(p)
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        };
        if locator.bucket.is_empty() || escapes(&locator.bucket) {
            return Err(ResultError::Storage(format!(
                "invalid bucket name: {:?}",
                locator.bucket
            )));
        }
        if locator.filepath.is_empty() || escapes(&locator.filepath) {
            return Err(ResultError::Storage(format!(
                "invalid object path: {:?}",
                locator.filepath
            )));
        }

        Ok(self
            .base_dir
            .join(locator.backend.to_string())
            .join(&locator.bucket)
            .join(&locator.filepath))
    }
}

impl ObjectStore for FsObjectStore {
    fn get(&self, locator: &Locator, _credentials: Option<&Credentials>) -> Result<Vec<u8>> {
        let path = self.object_path(locator)?;
        debug!(path = %path.display(), "Reading object");
        Ok(std::fs::read(&path)?)
    }

    fn put(
        &self,
        locator: &Locator,
        data: &[u8],
        _credentials: Option<&Credentials>,
    ) -> Result<()> {
        let path = self.object_path(locator)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(format!(".{}.tmp", Uuid::new_v4()));
        let tmp_path = PathBuf::from(tmp_name);

        std::fs::write(&tmp_path, data)?;
        std::fs::rename(&tmp_path, &path)?;
        debug!(path = %path.display(), bytes = data.len(), "Wrote object");

        Ok(())
    }

    fn exists(&self, locator: &Locator, _credentials: Option<&Credentials>) -> Result<bool> {
        Ok(self.object_path(locator)?.is_file())
    }
}
