//! File-system collaborator.
//!
//! Everything the service touches on disk goes through [`FileSystem`], so a host editor can
//! route reads and writes through its own virtual file system.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use regex::Regex;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{ApiError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileType {
    Unknown,
    File,
    Directory,
    SymbolicLink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStat {
    pub kind: FileType,
    pub size: u64,
    /// Milliseconds since the Unix epoch, 0 when unknown.
    pub mtime: u64,
}

pub trait FileSystem: Send + Sync {
    /// Files under `cwd` whose `/`-separated relative path matches `pattern`, as sorted absolute paths.
    fn glob(&self, pattern: &str, cwd: &Path) -> Result<Vec<PathBuf>>;
    /// `None` when nothing exists at `path`.
    fn stat(&self, path: &Path) -> Result<Option<FileStat>>;
    fn read_directory(&self, path: &Path) -> Result<Vec<(String, FileType)>>;
    fn read_file(&self, path: &Path) -> Result<String>;
    fn write_file(&self, path: &Path, content: &str) -> Result<()>;
    /// Removes a file or a whole directory tree.
    fn rm(&self, path: &Path) -> Result<()>;

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.stat(path)?.is_some())
    }

    fn read_json(&self, path: &Path) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.read_file(path)?)?)
    }
}

/// Translates a glob into an anchored regex over `/`-separated relative paths.
pub fn glob_regex(pattern: &str) -> Result<Regex> {
    let mut re = String::from("^");
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2) == Some(&'/') {
                    re.push_str("(?:.*/)?");
                    i += 3;
                } else {
                    re.push_str(".*");
                    i += 2;
                }
                continue;
            }
            '*' => re.push_str("[^/]*"),
            '?' => re.push_str("[^/]"),
            c => re.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }
    re.push('$');
    Regex::new(&re).map_err(|e| ApiError::Validation(format!("glob `{}`: {}", pattern, e)))
}

fn file_type(meta: &std::fs::Metadata) -> FileType {
    let ty = meta.file_type();
    if ty.is_symlink() {
        FileType::SymbolicLink
    } else if ty.is_dir() {
        FileType::Directory
    } else if ty.is_file() {
        FileType::File
    } else {
        FileType::Unknown
    }
}

/// [`FileSystem`] over the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFileSystem;

impl FileSystem for NativeFileSystem {
    fn glob(&self, pattern: &str, cwd: &Path) -> Result<Vec<PathBuf>> {
        let matcher = glob_regex(pattern)?;
        let mut files: Vec<PathBuf> = WalkDir::new(cwd)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                let relative = e.path().strip_prefix(cwd).unwrap_or(e.path());
                let relative = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                matcher.is_match(&relative)
            })
            .map(|e| {
                let path = e.into_path();
                std::fs::canonicalize(&path).unwrap_or(path)
            })
            .collect();
        files.sort();
        Ok(files)
    }

    fn stat(&self, path: &Path) -> Result<Option<FileStat>> {
        let meta = match std::fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Ok(Some(FileStat {
            kind: file_type(&meta),
            size: meta.len(),
            mtime,
        }))
    }

    fn read_directory(&self, path: &Path) -> Result<Vec<(String, FileType)>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let kind = entry
                .metadata()
                .map(|m| file_type(&m))
                .unwrap_or(FileType::Unknown);
            entries.push((entry.file_name().to_string_lossy().to_string(), kind));
        }
        entries.sort();
        Ok(entries)
    }

    fn read_file(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(std::fs::write(path, content)?)
    }

    fn rm(&self, path: &Path) -> Result<()> {
        if std::fs::symlink_metadata(path)?.is_dir() {
            std::fs::remove_dir_all(path)?;
        } else {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_regex() {
        let re = glob_regex("src/**/api.ts").unwrap();
        assert!(re.is_match("src/api.ts"));
        assert!(re.is_match("src/components/my-button/api.ts"));
        assert!(!re.is_match("src/components/my-button/api.tsx"));
        assert!(!re.is_match("lib/api.ts"));

        let re = glob_regex("src/*/index.?s").unwrap();
        assert!(re.is_match("src/foo/index.ts"));
        assert!(re.is_match("src/foo/index.js"));
        assert!(!re.is_match("src/foo/bar/index.ts"));
    }

    #[test]
    fn test_native_fs_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let fs = NativeFileSystem;
        let file = dir.path().join("src/components/foo/api.ts");

        assert!(fs.stat(&file).unwrap().is_none());
        fs.write_file(&file, "export {};\n").unwrap();

        let stat = fs.stat(&file).unwrap().unwrap();
        assert_eq!(stat.kind, FileType::File);
        assert_eq!(stat.size, 11);
        assert_eq!(fs.read_file(&file).unwrap(), "export {};\n");

        let found = fs.glob("src/**/api.ts", dir.path()).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("src/components/foo/api.ts"));

        let listing = fs.read_directory(&dir.path().join("src/components")).unwrap();
        assert_eq!(listing, vec![("foo".to_string(), FileType::Directory)]);

        fs.rm(&dir.path().join("src/components/foo")).unwrap();
        assert!(!fs.exists(&file).unwrap());
    }

    #[test]
    fn test_read_json() {
        let dir = tempfile::tempdir().unwrap();
        let fs = NativeFileSystem;
        let file = dir.path().join("package.json");
        fs.write_file(&file, r#"{ "name": "lib" }"#).unwrap();
        assert_eq!(fs.read_json(&file).unwrap()["name"], "lib");
    }
}
