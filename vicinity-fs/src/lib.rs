//! Capability-based file helpers for the Vicinity tools.
//!
//! Paths are UTF-8 throughout (`camino`). Lookups go through a `cap-std`
//! directory handle opened with ambient authority at the leading root,
//! prefix, or parent components of the path, so the remainder is resolved
//! inside that directory. Replacement writes stage into a uniquely named
//! `tempfile` sibling.
#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{self, BufReader, Write};

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised while reading or writing JSON documents.
#[derive(Debug, Error)]
pub enum JsonFileError {
    /// The file could not be opened.
    #[error("failed to open {path:?}: {source}")]
    Open {
        /// File that was requested.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
    /// The file is not valid JSON for the expected type.
    #[error("failed to parse JSON at {path:?}: {source}")]
    Parse {
        /// File that was read.
        path: Utf8PathBuf,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// The value could not be encoded.
    #[error("failed to serialise JSON for {path:?}: {source}")]
    Serialise {
        /// Intended destination.
        path: Utf8PathBuf,
        /// Encoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// The encoded document could not be stored.
    #[error("failed to write {path:?}: {source}")]
    Write {
        /// Intended destination.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
}

/// Open a UTF-8 file path using ambient authority.
///
/// # Errors
/// Returns the IO error raised by the open.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Return whether `path` exists and is a regular file.
///
/// # Errors
/// Returns [`io::ErrorKind::NotFound`] when the path or its directory is
/// missing, and other IO errors when inspection fails.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Create every missing directory above `path`.
///
/// # Errors
/// Returns the IO error raised while opening the base directory or
/// creating the missing ones.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    let (base, relative) = split_ambient(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&relative)
}

/// Read a JSON document into `T`.
///
/// # Errors
/// Returns [`JsonFileError::Open`] when the file cannot be opened and
/// [`JsonFileError::Parse`] when its contents do not decode as `T`.
///
/// # Examples
/// ```
/// use camino::Utf8Path;
/// use vicinity_fs::{JsonFileError, read_json};
///
/// let missing = read_json::<Vec<u32>>(Utf8Path::new("does/not/exist.json"));
/// assert!(matches!(missing, Err(JsonFileError::Open { .. })));
/// ```
pub fn read_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, JsonFileError> {
    let file = open_utf8_file(path).map_err(|source| JsonFileError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| JsonFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `value` as pretty JSON, replacing `path` atomically.
///
/// Missing parent directories are created. The document is written to a
/// hidden, uniquely named sibling first and renamed into place, so readers
/// never observe a truncated file and concurrent writers never share a
/// staging file.
///
/// # Errors
/// Returns [`JsonFileError::Serialise`] when encoding fails and
/// [`JsonFileError::Write`] when any filesystem step fails.
pub fn write_json<T: Serialize>(path: &Utf8Path, value: &T) -> Result<(), JsonFileError> {
    let write_error = |source| JsonFileError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut payload =
        serde_json::to_vec_pretty(value).map_err(|source| JsonFileError::Serialise {
            path: path.to_path_buf(),
            source,
        })?;
    payload.push(b'\n');

    ensure_parent_dir(path).map_err(write_error)?;
    let name = file_name(path).map_err(write_error)?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let mut staging = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(write_error)?;
    staging.write_all(&payload).map_err(write_error)?;
    staging.as_file().sync_all().map_err(write_error)?;
    staging
        .persist(path)
        .map_err(|failure| write_error(failure.error))?;
    Ok(())
}

/// Exclusive lock on a document, released when dropped.
#[derive(Debug)]
pub struct DocumentLock {
    _file: File,
}

/// Block until this process holds the exclusive lock for `path`.
///
/// The lock is an advisory lock on a hidden `.{name}.lock` sibling. The
/// sibling is never replaced, so the lock stays valid while
/// [`write_json`] swaps the document underneath it. Only callers that take
/// the same lock are serialised.
///
/// # Errors
/// Returns [`io::ErrorKind::NotFound`] when the document's directory is
/// missing, and the IO error raised while opening the lock file or
/// acquiring the lock otherwise.
pub fn lock_document(path: &Utf8Path) -> io::Result<DocumentLock> {
    let (dir, name) = open_dir_and_file(path)?;
    let mut options = cap_std::fs::OpenOptions::new();
    options.create(true).write(true);
    let file = dir.open_with(format!(".{name}.lock"), &options)?.into_std();
    file.lock()?;
    Ok(DocumentLock { _file: file })
}

fn file_name(path: &Utf8Path) -> io::Result<String> {
    path.file_name()
        .map(str::to_owned)
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))
}

/// Open the directory holding `path` and return it with the file name.
fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let name = file_name(path)?;
    let parent = path.parent().unwrap_or_else(|| Utf8Path::new(""));
    let (base, relative) = split_ambient(parent)?;
    let dir = if relative.as_str().is_empty() {
        base
    } else {
        base.open_dir(&relative)?
    };
    Ok((dir, name))
}

/// Split `path` into an ambient base directory and the part below it.
fn split_ambient(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let (base, relative) = split_base(path);
    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    Ok((dir, relative))
}

/// Leading prefix, root, current, and parent components form the base; the
/// rest must stay inside it.
fn split_base(path: &Utf8Path) -> (Utf8PathBuf, Utf8PathBuf) {
    let mut base = Utf8PathBuf::new();
    let mut relative = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::Prefix(_)
            | Utf8Component::RootDir
            | Utf8Component::CurDir
            | Utf8Component::ParentDir
                if relative.as_str().is_empty() =>
            {
                base.push(component);
            }
            other => relative.push(other),
        }
    }
    if base.as_str().is_empty() {
        base.push(".");
    }
    (base, relative)
}
