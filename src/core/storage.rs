//! core::storage
//!
//! The storage collaborator as the engine sees it: an opaque file path.
//!
//! Note CRUD lives elsewhere. The engine never opens the database; it only
//! stages and commits the file the storage layer owns.

use std::path::{Path, PathBuf};

/// File name of the notes database inside the notes directory.
pub const DB_FILENAME: &str = "terminotes.sqlite3";

/// Anything that owns the database file the engine commits.
pub trait Storage {
    /// Path of the database file.
    fn path(&self) -> &Path;
}

/// The default SQLite file layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteFile {
    path: PathBuf,
}

impl SqliteFile {
    /// The database at `<dir>/terminotes.sqlite3`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(DB_FILENAME),
        }
    }

    /// Whether the file has been created yet.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl Storage for SqliteFile {
    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lives_in_notes_dir() {
        let db = SqliteFile::in_dir(Path::new("/home/me/notes"));
        assert_eq!(db.path(), Path::new("/home/me/notes/terminotes.sqlite3"));
    }

    #[test]
    fn exists_tracks_the_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = SqliteFile::in_dir(dir.path());
        assert!(!db.exists());
        std::fs::write(db.path(), b"SQLite format 3\0").unwrap();
        assert!(db.exists());
    }
}
