// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Loading the ordered manifest set from literals and a directory

use crate::constants::manifests::{DOCUMENT_SEPARATOR, FILE_SUFFIX};
use crate::error::{OperatorError, Result};
use crate::manifests::ManifestDocument;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// The documents applied on every trigger, in apply order
#[derive(Clone, Debug, Default)]
pub struct ManifestSet {
    documents: Vec<ManifestDocument>,
}

impl ManifestSet {
    pub fn new(documents: Vec<ManifestDocument>) -> Self {
        Self { documents }
    }

    /// Build the set from literal documents followed by the `*.yaml` files in `dir`.
    ///
    /// Literals are kept as given. Files are read in file name order and split
    /// on separator lines; blank fragments are kept. Any listing or read error
    /// fails the whole load.
    #[instrument(skip(literals), fields(literals = literals.len()))]
    pub fn load(dir: Option<&Path>, literals: &[String]) -> Result<Self> {
        let mut documents: Vec<ManifestDocument> = literals
            .iter()
            .enumerate()
            .map(|(i, raw)| ManifestDocument::new(raw.clone(), format!("literal[{}]", i)))
            .collect();

        if let Some(dir) = dir {
            debug!("Loading manifests from directory {}", dir.display());
            for path in list_manifest_files(dir)? {
                let content = fs::read_to_string(&path).map_err(|source| OperatorError::LoadError {
                    path: path.clone(),
                    source,
                })?;
                let fragments = split_documents(&content);
                debug!("{}: {} documents", path.display(), fragments.len());
                documents.extend(
                    fragments
                        .into_iter()
                        .enumerate()
                        .map(|(i, raw)| ManifestDocument::new(raw, format!("{}#{}", path.display(), i))),
                );
            }
        }

        info!("Loaded {} manifest documents", documents.len());
        Ok(Self { documents })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestDocument> {
        self.documents.iter()
    }
}

impl<'a> IntoIterator for &'a ManifestSet {
    type Item = &'a ManifestDocument;
    type IntoIter = std::slice::Iter<'a, ManifestDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

/// Split text into documents on separator lines. A comment or tag after the
/// marker (`--- # next`, `--- !tag`) is dropped with it; other trailing
/// content starts the next document.
pub fn split_documents(text: &str) -> Vec<String> {
    let mut documents = Vec::new();
    let mut current = String::new();

    for line in text.split_inclusive('\n') {
        if let Some(rest) = separator_remainder(line) {
            documents.push(std::mem::take(&mut current));
            current.push_str(rest);
        } else {
            current.push_str(line);
        }
    }
    documents.push(current);

    documents
}

/// For a marker line (`---` alone or followed by whitespace) returns the
/// content that belongs to the next document. `---foo` is not a marker.
fn separator_remainder(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(DOCUMENT_SEPARATOR)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let content = rest.trim_start_matches([' ', '\t']);
    if content.trim().is_empty() || content.starts_with('#') || content.starts_with('!') {
        Some("")
    } else {
        Some(content)
    }
}

/// Regular files directly under `dir` ending in `.yaml`, sorted by file name.
/// Subdirectories (e.g. the versioned data dirs of ConfigMap mounts) are skipped.
fn list_manifest_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let load_error = |source| OperatorError::LoadError {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(load_error)? {
        let entry = entry.map_err(load_error)?;
        let path = entry.path();

        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(FILE_SUFFIX));
        if !matches {
            continue;
        }

        // follows symlinks
        let metadata = fs::metadata(&path).map_err(|source| OperatorError::LoadError {
            path: path.clone(),
            source,
        })?;
        if metadata.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
