use crate::errors::{FileOperation, IoError};
use indexmap::IndexMap;
use miette::Diagnostic;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error, Diagnostic)]
pub enum VolumeError {
    #[error("can't load volume '{volume}'")]
    #[diagnostic(code(cfgenerator::volume::io))]
    Io {
        volume: PathBuf,
        #[source]
        #[diagnostic_source]
        source: IoError,
    },

    #[error("volume '{path}' is neither a regular file nor a directory")]
    #[diagnostic(
        code(cfgenerator::volume::unsupported_entry),
        help("Volume paths must point to a file or to a flat directory of files")
    )]
    UnsupportedEntry { path: PathBuf },

    #[error("unable to derive a variable name from '{path}'")]
    #[diagnostic(
        code(cfgenerator::volume::invalid_name),
        help("File names are used as variable names and must be valid UTF-8")
    )]
    InvalidName { path: PathBuf },
}

/// Variables collected from volumes, keyed by file name.
///
/// The mapping is built once by [`collect`] and is read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables(IndexMap<String, String>);
impl Variables {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    // last writer wins, the first insertion keeps its position
    fn insert(&mut self, name: String, value: String) {
        if let Some(previous) = self.0.insert(name, value) {
            log::debug!("...overwriting previous value ({} bytes)", previous.len());
        }
    }
}
impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut variables = Variables::default();
        for (name, value) in iter {
            variables.insert(name.into(), value.into());
        }
        variables
    }
}

fn file_name(path: &Path) -> Result<String, VolumeError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .ok_or_else(|| VolumeError::InvalidName {
            path: path.to_path_buf(),
        })
}

fn io_error(
    volume: &Path,
    operation: FileOperation,
    path: &Path,
    error: std::io::Error,
) -> VolumeError {
    VolumeError::Io {
        volume: volume.to_path_buf(),
        source: IoError::new(operation, path.to_path_buf(), error),
    }
}

/// Bytes that are not valid UTF-8 are replaced rather than rejected, so a binary key
/// in a mounted secret does not prevent loading the others.
fn load_file(variables: &mut Variables, volume: &Path, path: &Path) -> Result<(), VolumeError> {
    let name = file_name(path)?;

    let bytes =
        fs::read(path).map_err(|error| io_error(volume, FileOperation::Read, path, error))?;

    log::debug!("...loaded '{}' ({} bytes)", name, bytes.len());

    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(error) => {
            log::warn!("'{}' is not valid UTF-8, invalid bytes replaced", path.display());
            String::from_utf8_lossy(error.as_bytes()).into_owned()
        }
    };

    variables.insert(name, content);

    Ok(())
}

/// Loads every regular file sitting directly inside `directory`.
///
/// Symlinks are followed so that projected Kubernetes volumes (where each key is a
/// link into a hidden `..data` directory) resolve to their files. Anything that
/// resolves to a directory is skipped without descending into it.
fn load_directory(variables: &mut Variables, directory: &Path) -> Result<(), VolumeError> {
    let walker = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(error) => {
                let path = error.path().unwrap_or(directory).to_path_buf();

                return Err(io_error(directory, FileOperation::List, &path, error.into()));
            }
        };

        if !entry.file_type().is_file() {
            log::debug!("...skipping '{}'", entry.path().display());
            continue;
        }

        load_file(variables, directory, entry.path())?;
    }

    Ok(())
}

/// Builds the [`Variables`] mapping from a list of volume paths.
///
/// Each path is either a file, loaded under its base name, or a flat directory whose
/// direct regular files are loaded under their own names. Paths are processed in
/// order and a later name overwrites an earlier one.
///
/// # Errors
///
/// Returns a [`VolumeError`] as soon as any path cannot be inspected or read; no
/// partial mapping is returned.
pub fn collect<P: AsRef<Path>>(paths: &[P]) -> Result<Variables, VolumeError> {
    let mut variables = Variables::default();

    for path in paths {
        let path = path.as_ref();

        log::debug!("Scanning volume: {}", path.display());

        let metadata =
            fs::metadata(path).map_err(|error| io_error(path, FileOperation::Stat, path, error))?;

        if metadata.is_file() {
            load_file(&mut variables, path, path)?;
        } else if metadata.is_dir() {
            load_directory(&mut variables, path)?;
        } else {
            return Err(VolumeError::UnsupportedEntry {
                path: path.to_path_buf(),
            });
        }
    }

    Ok(variables)
}
