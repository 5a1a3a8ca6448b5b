use std::path::PathBuf;

/// Journal mode applied when the database is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalMode {
    Delete,
    Truncate,
    Persist,
    Memory,
    Wal,
    Off,
}

impl JournalMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JournalMode::Delete => "DELETE",
            JournalMode::Truncate => "TRUNCATE",
            JournalMode::Persist => "PERSIST",
            JournalMode::Memory => "MEMORY",
            JournalMode::Wal => "WAL",
            JournalMode::Off => "OFF",
        }
    }
}

/// Durability mode for the `synchronous` pragma.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynchronousMode {
    Extra,
    Full,
    Normal,
    Off,
}

impl SynchronousMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SynchronousMode::Extra => "EXTRA",
            SynchronousMode::Full => "FULL",
            SynchronousMode::Normal => "NORMAL",
            SynchronousMode::Off => "OFF",
        }
    }
}

/// Overwrite-on-delete behaviour for the `secure_delete` pragma.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecureDeleteMode {
    On,
    Off,
    Fast,
}

impl SecureDeleteMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SecureDeleteMode::On => "ON",
            SecureDeleteMode::Off => "OFF",
            SecureDeleteMode::Fast => "FAST",
        }
    }
}

/// Options applied once when a database file is opened or created.
///
/// Journal and synchronous modes persist in the file or apply per
/// connection as the engine defines; cache size and secure-delete are per
/// connection, so every open re-applies the full set.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub journal_mode: JournalMode,
    pub synchronous: SynchronousMode,
    pub cache_size_pages: i64,
    pub secure_delete: SecureDeleteMode,
    pub wal_autocheckpoint_pages: i64,
}

impl DatabaseConfig {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            journal_mode: JournalMode::Wal,
            synchronous: SynchronousMode::Full,
            cache_size_pages: 2000,
            secure_delete: SecureDeleteMode::Off,
            wal_autocheckpoint_pages: 1000,
        }
    }

    #[must_use]
    pub fn journal_mode(mut self, mode: JournalMode) -> Self {
        self.journal_mode = mode;
        self
    }

    #[must_use]
    pub fn synchronous(mut self, mode: SynchronousMode) -> Self {
        self.synchronous = mode;
        self
    }

    #[must_use]
    pub fn cache_size_pages(mut self, pages: i64) -> Self {
        self.cache_size_pages = pages;
        self
    }

    #[must_use]
    pub fn secure_delete(mut self, mode: SecureDeleteMode) -> Self {
        self.secure_delete = mode;
        self
    }

    #[must_use]
    pub fn wal_autocheckpoint_pages(mut self, pages: i64) -> Self {
        self.wal_autocheckpoint_pages = pages;
        self
    }
}
