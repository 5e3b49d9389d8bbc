// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Corpus access: file enumeration and file content providers.
//!
//! The mining orchestrator only ever sees a list of paths and a
//! [`ContentSource`]; tests substitute an in-memory source so mining logic
//! is exercised without a filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::error::Error;

/// Provides file contents for mining workers.
pub trait ContentSource: Send + Sync {
    /// Reads the complete contents of `path`.
    fn read(&self, path: &Path) -> Result<Vec<u8>, Error>;
}

/// Reads file contents from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsContentSource;

impl ContentSource for FsContentSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, Error> {
        fs::read(path)
            .map_err(|err| Error::io("unable to read file", err).with_context("path", path.display()))
    }
}

/// Enumerates the regular files under the given roots.
///
/// Directories are walked recursively. Symlinks are resolved and kept when
/// the target is a regular file; the resolved path is returned. Unreadable
/// entries are logged and skipped rather than aborting the enumeration.
pub fn collect_files<P: AsRef<Path>>(roots: &[P]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for root in roots {
        let root = root.as_ref();
        match fs::metadata(root) {
            Ok(meta) if meta.is_dir() => collect_dir(root, &mut files),
            Ok(_) => push_if_regular(root, &mut files),
            Err(err) => warn!(path = %root.display(), %err, "skipping unreadable root"),
        }
    }
    files
}

fn collect_dir(root: &Path, files: &mut Vec<PathBuf>) {
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(path = %root.display(), %err, "skipping unwalkable entry");
                continue;
            }
        };
        let file_type = entry.file_type();
        if file_type.is_file() {
            files.push(entry.into_path());
        } else if file_type.is_symlink() {
            push_if_regular(entry.path(), files);
        }
    }
}

/// Pushes `path` if it is, or resolves through symlinks to, a regular file.
fn push_if_regular(path: &Path, files: &mut Vec<PathBuf>) {
    match fs::canonicalize(path) {
        Ok(resolved) => match fs::metadata(&resolved) {
            Ok(meta) if meta.is_file() => files.push(resolved),
            Ok(_) => {}
            Err(err) => warn!(path = %path.display(), %err, "skipping unresolvable link"),
        },
        Err(err) => warn!(path = %path.display(), %err, "skipping unresolvable link"),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    /// In-memory content source for mining tests.
    pub(crate) struct MemorySource {
        files: HashMap<PathBuf, Vec<u8>>,
    }

    impl MemorySource {
        pub(crate) fn new(files: &[(&str, &[u8])]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(path, content)| (PathBuf::from(path), content.to_vec()))
                    .collect(),
            }
        }
    }

    impl ContentSource for MemorySource {
        fn read(&self, path: &Path) -> Result<Vec<u8>, Error> {
            self.files.get(path).cloned().ok_or_else(|| {
                Error::io(
                    "unable to read file",
                    std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
                )
                .with_context("path", path.display())
            })
        }
    }

    #[test]
    fn walks_directories_and_keeps_files() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();

        let mut f1 = fs::File::create(dir.path().join("a.bin")).unwrap();
        f1.write_all(b"aaaa").unwrap();
        let mut f2 = fs::File::create(sub.join("b.bin")).unwrap();
        f2.write_all(b"bbbb").unwrap();

        let mut files = collect_files(&[dir.path()]);
        files.sort();
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|p| p.ends_with("a.bin")));
        assert!(files.iter().any(|p| p.ends_with("b.bin")));
    }

    #[test]
    fn keeps_plain_file_roots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("root.bin");
        fs::write(&path, b"data").unwrap();

        let files = collect_files(&[&path]);
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn missing_roots_are_skipped() {
        let files = collect_files(&[Path::new("/no/such/path/anywhere")]);
        assert!(files.is_empty());
    }

    #[test]
    fn fs_source_reads_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.bin");
        fs::write(&path, b"content").unwrap();

        let source = FsContentSource;
        assert_eq!(source.read(&path).unwrap(), b"content");
        assert!(source.read(&dir.path().join("missing")).is_err());
    }
}
