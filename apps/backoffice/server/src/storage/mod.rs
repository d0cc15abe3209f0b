//! Public file storage for uploaded PDFs, receipts and tour images
//!
//! Files live under a single root directory and are addressed by a relative
//! path such as `terms_conditions/1700000000_terms.pdf`. The same relative
//! path is stored in the database and served under `/storage/`.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use chrono::Utc;

use crate::error::{BackofficeError, Result};
use crate::utils::format::sanitize_file_name;

/// A file written to storage
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: String,
    pub size: u64,
}

const MAX_NAME_ATTEMPTS: u32 = 1000;

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
    app_url: String,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>, app_url: impl Into<String>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            app_url: app_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL of a stored file.
    pub fn url(&self, path: &str) -> String {
        format!("{}/storage/{}", self.app_url, path.trim_start_matches('/'))
    }

    /// Store an upload as `<dir>/<unix time>_<sanitised client name>`.
    pub fn store_upload(&self, dir: &str, client_name: &str, bytes: &[u8]) -> Result<StoredFile> {
        let file_name = format!(
            "{}_{}",
            Utc::now().timestamp(),
            sanitize_file_name(client_name)
        );
        self.store_as(dir, &file_name, bytes)
    }

    /// Store bytes as `file_name` inside `dir`. An existing file is never
    /// replaced; the name gets a `_1`, `_2`, ... suffix before the extension.
    pub fn store_as(&self, dir: &str, file_name: &str, bytes: &[u8]) -> Result<StoredFile> {
        let dir = dir.trim_matches('/');
        let (stem, ext) = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (file_name, None),
        };

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = match (attempt, ext) {
                (0, _) => file_name.to_string(),
                (n, Some(ext)) => format!("{stem}_{n}.{ext}"),
                (n, None) => format!("{stem}_{n}"),
            };
            let relative = format!("{dir}/{name}");
            let absolute = self.resolve(&relative)?;
            if let Some(parent) = absolute.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&absolute) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };
            if let Err(e) = file.write_all(bytes) {
                drop(file);
                let _ = fs::remove_file(&absolute);
                return Err(e.into());
            }
            tracing::debug!(path = %relative, size = bytes.len(), "stored file");
            return Ok(StoredFile {
                path: relative,
                size: bytes.len() as u64,
            });
        }
        Err(BackofficeError::General(format!(
            "no free storage name for {dir}/{file_name}"
        )))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }

    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.resolve(path)?)?)
    }

    /// Remove a stored file. Missing files are not an error.
    pub fn delete(&self, path: &str) -> Result<bool> {
        let absolute = self.resolve(path)?;
        if !absolute.is_file() {
            return Ok(false);
        }
        fs::remove_file(&absolute)?;
        tracing::debug!(path, "deleted file");
        Ok(true)
    }

    /// Delete and log instead of failing; used once the row is already gone.
    pub fn delete_quietly(&self, path: &str) {
        if let Err(e) = self.delete(path) {
            tracing::warn!(path, error = %e, "failed to delete stored file");
        }
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let relative = Path::new(relative);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(BackofficeError::bad_request("Invalid storage path"));
        }
        Ok(self.root.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path(), "http://localhost:8080/").expect("storage");
        (dir, storage)
    }

    #[test]
    fn test_store_upload_sanitises_name() {
        let (_dir, storage) = storage();
        let stored = storage
            .store_upload("terms_conditions", "My Terms (final).pdf", b"%PDF-1.4")
            .expect("store");

        assert!(stored.path.starts_with("terms_conditions/"));
        assert!(stored.path.ends_with("_MyTermsfinal.pdf"));
        assert_eq!(stored.size, 8);
        assert!(storage.exists(&stored.path));
        assert_eq!(storage.read(&stored.path).expect("read"), b"%PDF-1.4");
    }

    #[test]
    fn test_delete_and_url() {
        let (_dir, storage) = storage();
        let stored = storage.store_as("tours", "1_boracay.jpg", b"jpg").expect("store");

        assert_eq!(
            storage.url(&stored.path),
            "http://localhost:8080/storage/tours/1_boracay.jpg"
        );
        assert!(storage.delete(&stored.path).expect("delete"));
        assert!(!storage.delete(&stored.path).expect("second delete"));
    }

    #[test]
    fn test_same_name_never_overwrites() {
        let (_dir, storage) = storage();
        let first = storage.store_as("tours", "1_coron.png", b"first").expect("store");
        let second = storage.store_as("tours", "1_coron.png", b"second").expect("store");
        let third = storage.store_as("tours", "1_coron.png", b"third").expect("store");

        assert_eq!(first.path, "tours/1_coron.png");
        assert_eq!(second.path, "tours/1_coron_1.png");
        assert_eq!(third.path, "tours/1_coron_2.png");
        assert_eq!(storage.read(&first.path).expect("read"), b"first");
        assert_eq!(storage.read(&second.path).expect("read"), b"second");

        let a = storage
            .store_upload("payment_receipts", "receipt.pdf", b"%PDF-a")
            .expect("store");
        let b = storage
            .store_upload("payment_receipts", "receipt.pdf", b"%PDF-b")
            .expect("store");
        assert_ne!(a.path, b.path);
        assert_eq!(storage.read(&a.path).expect("read"), b"%PDF-a");
        assert_eq!(storage.read(&b.path).expect("read"), b"%PDF-b");

        let bare = storage.store_as("misc", "README", b"x").expect("store");
        let bare_again = storage.store_as("misc", "README", b"y").expect("store");
        assert_eq!(bare_again.path, "misc/README_1");
        assert_ne!(bare.path, bare_again.path);
    }

    #[test]
    fn test_rejects_paths_outside_root() {
        let (_dir, storage) = storage();
        assert!(storage.read("../etc/passwd").is_err());
        assert!(storage.delete("/etc/passwd").is_err());
        assert!(!storage.exists("tours/../../x"));
    }
}
