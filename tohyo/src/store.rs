use crate::*;
use fs2::FileExt;
use log::debug;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Persistent home of an election between operations
pub trait Store {
    /// Load the election, if one has been saved
    fn load(&self) -> Result<Option<Election>, Error>;

    /// Replace the saved election
    fn save(&mut self, election: &Election) -> Result<(), Error>;

    /// Load the election, failing if none has been saved
    fn get_election(&self) -> Result<Election, Error> {
        self.load()?.ok_or(Error::ElectionNotFound)
    }
}

/// A simple store that keeps the election in memory
#[derive(Default, Clone)]
pub struct MemStore {
    inner: Option<Election>,
}

impl Store for MemStore {
    fn load(&self) -> Result<Option<Election>, Error> {
        Ok(self.inner.clone())
    }

    fn save(&mut self, election: &Election) -> Result<(), Error> {
        self.inner = Some(election.clone());
        Ok(())
    }
}

/// On-disk encoding of a saved election
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Format {
    Json,
    Cbor,
}

/// A store backed by a single file
///
/// Writes in the configured format; reads either JSON or CBOR.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    format: Format,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        FileStore {
            path: path.into(),
            format: Format::Json,
        }
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the lock file guarding this store, `<state>.lock`
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Take the exclusive lock on this store, blocking until it is free.
    ///
    /// Hold the returned guard across a load-modify-save sequence so that no other
    /// process or thread can interleave with it. The lock is released when the guard
    /// is dropped, or by the OS if the process dies.
    pub fn lock(&self) -> Result<StoreLock, Error> {
        self.ensure_parent()?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(self.lock_path())?;
        FileExt::lock_exclusive(&file)?;
        debug!("locked {}", self.path.display());
        Ok(StoreLock { file })
    }

    fn ensure_parent(&self) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

/// Exclusive lock on a [`FileStore`], released on drop
#[derive(Debug)]
pub struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl Store for FileStore {
    fn load(&self) -> Result<Option<Election>, Error> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        debug!("loaded {} bytes from {}", bytes.len(), self.path.display());
        Ok(Some(election_from_bytes(&bytes)?))
    }

    fn save(&mut self, election: &Election) -> Result<(), Error> {
        let bytes = match self.format {
            Format::Json => serde_json::to_vec_pretty(election)?,
            Format::Cbor => serde_cbor::to_vec(election)?,
        };
        self.ensure_parent()?;

        // Readers only ever see the old file or the new one, never a partial write
        let mut tmp = tempfile::NamedTempFile::new_in(self.dir())?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!("saved election to {}", self.path.display());
        Ok(())
    }
}

/// Unpack an election from JSON or CBOR bytes
pub fn election_from_bytes(bytes: &[u8]) -> Result<Election, Error> {
    // If it starts with `{` then it's JSON
    let election: Election = match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => serde_json::from_slice(bytes)?,
        Some(_) => serde_cbor::from_slice(bytes)?,
        None => return Err(Error::DeserializationUnknownFormat),
    };
    election.validate()?;
    Ok(election)
}
