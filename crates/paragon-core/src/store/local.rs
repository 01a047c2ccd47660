//! Local filesystem implementation of the receipt store.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::models::config::StorageConfig;

use super::{FileKind, ReceiptStore, Result, StoredFile};

/// A watched folder with `archive/` and `errors/` subfolders.
///
/// Only direct children of the source folder are pending; moving a file into
/// a subfolder removes it from the pending set.
pub struct LocalFolderStore {
    source: PathBuf,
    archive: PathBuf,
    errors: PathBuf,
    log_file: String,
}

impl LocalFolderStore {
    /// Open the folder layout, creating the subfolders if needed.
    pub fn open(config: &StorageConfig) -> std::io::Result<Self> {
        let source = config.source_dir.clone();
        let archive = source.join(&config.archive_subdir);
        let errors = source.join(&config.error_subdir);
        fs::create_dir_all(&archive)?;
        fs::create_dir_all(&errors)?;
        Ok(Self {
            source,
            archive,
            errors,
            log_file: config.log_file.clone(),
        })
    }

    /// Absolute path of the run-log file inside the source folder.
    pub fn log_path(&self) -> PathBuf {
        self.source.join(&self.log_file)
    }

    fn source_path(&self, file: &StoredFile) -> PathBuf {
        self.source.join(&file.id)
    }

    fn rename_into(&self, file: &StoredFile, dest_dir: &Path) -> Result<()> {
        let from = self.source_path(file);
        let to = dest_dir.join(&file.id);
        fs::rename(&from, &to).map_err(|e| StoreError::Move {
            file: file.id.clone(),
            dest: dest_dir.to_path_buf(),
            source: e,
        })
    }
}

impl ReceiptStore for LocalFolderStore {
    fn list_pending(&self) -> Result<Vec<StoredFile>> {
        let entries = fs::read_dir(&self.source).map_err(|e| StoreError::List {
            path: self.source.clone(),
            source: e,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::List {
                path: self.source.clone(),
                source: e,
            })?;
            if !entry.path().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(String::from) else {
                warn!("skipping file with non-UTF-8 name in {}", self.source.display());
                continue;
            };
            if name == self.log_file {
                continue;
            }
            let ext = Path::new(&name)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase();
            let Some(kind) = FileKind::from_extension(&ext) else {
                debug!("skipping non-receipt file {}", name);
                continue;
            };
            files.push(StoredFile {
                id: name.clone(),
                name,
                kind,
            });
        }

        files.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(files)
    }

    fn read(&self, file: &StoredFile) -> Result<Vec<u8>> {
        fs::read(self.source_path(file)).map_err(|e| StoreError::Read {
            file: file.id.clone(),
            source: e,
        })
    }

    fn archive(&self, file: &StoredFile) -> Result<()> {
        self.rename_into(file, &self.archive)
    }

    fn quarantine(&self, file: &StoredFile) -> Result<()> {
        self.rename_into(file, &self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store_in(dir: &Path) -> LocalFolderStore {
        let config = StorageConfig {
            source_dir: dir.to_path_buf(),
            ..StorageConfig::default()
        };
        LocalFolderStore::open(&config).unwrap()
    }

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"bytes").unwrap();
    }

    #[test]
    fn lists_only_receipt_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        touch(dir.path(), "b.pdf");
        touch(dir.path(), "a.jpg");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "run_log.txt");

        let pending = store.list_pending().unwrap();
        let ids: Vec<&str> = pending.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a.jpg", "b.pdf"]);
        assert_eq!(pending[0].kind, FileKind::Jpeg);
        assert_eq!(pending[1].kind, FileKind::Pdf);
    }

    #[test]
    fn archived_files_are_not_relisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        touch(dir.path(), "done.png");

        let pending = store.list_pending().unwrap();
        assert_eq!(pending.len(), 1);

        store.archive(&pending[0]).unwrap();
        assert!(store.list_pending().unwrap().is_empty());
        assert!(dir.path().join("archive/done.png").exists());
    }

    #[test]
    fn quarantined_files_are_not_relisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        touch(dir.path(), "bad.jpeg");

        let pending = store.list_pending().unwrap();
        store.quarantine(&pending[0]).unwrap();

        assert!(store.list_pending().unwrap().is_empty());
        assert!(dir.path().join("errors/bad.jpeg").exists());
    }

    #[test]
    fn read_returns_file_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        touch(dir.path(), "r.webp");

        let pending = store.list_pending().unwrap();
        assert_eq!(store.read(&pending[0]).unwrap(), b"bytes");
    }

    #[test]
    fn archiving_twice_is_a_move_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        touch(dir.path(), "once.pdf");

        let pending = store.list_pending().unwrap();
        store.archive(&pending[0]).unwrap();
        assert!(matches!(
            store.archive(&pending[0]),
            Err(StoreError::Move { .. })
        ));
    }
}
