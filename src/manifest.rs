//! Dependency manifest reading
//!
//! The manifest is handed to the installer untouched; it is only read here
//! to report what is about to be installed and to skip the installer when
//! there is nothing to install.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{BootError, Result};

/// One non-comment line of the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestEntry {
    /// A package specifier such as `fastapi>=0.110`
    Package { name: String, spec: String },
    /// An installer option line such as `--index-url ...` or `-r other.txt`
    Option(String),
}

#[derive(Debug, Clone)]
pub struct Manifest {
    pub path: PathBuf,
    pub entries: Vec<ManifestEntry>,
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._-]*)").expect("valid regex"))
}

impl Manifest {
    /// Read a manifest file. A missing or unreadable file is an install
    /// failure; bytes that are not valid UTF-8 are replaced, the installer
    /// still gets the original file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(BootError::DependencyInstall {
                detail: format!("dependency manifest not found: {}", path.display()),
                code: 1,
            });
        }
        let bytes = fs::read(path).map_err(|e| BootError::DependencyInstall {
            detail: format!("cannot read dependency manifest {}: {}", path.display(), e),
            code: 1,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            entries: parse_entries(&String::from_utf8_lossy(&bytes)),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Package names in manifest order
    pub fn package_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                ManifestEntry::Package { name, .. } => Some(name.as_str()),
                ManifestEntry::Option(_) => None,
            })
            .collect()
    }
}

pub fn parse_entries(content: &str) -> Vec<ManifestEntry> {
    content
        .lines()
        .map(strip_comment)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| {
            if line.starts_with('-') {
                return ManifestEntry::Option(line.to_string());
            }
            let name = name_regex()
                .captures(line)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| line.to_string());
            ManifestEntry::Package {
                name,
                spec: line.to_string(),
            }
        })
        .collect()
}

fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    // Inline comments need leading whitespace; `#` is legal inside URLs.
    match line.find(" #").or_else(|| line.find("\t#")) {
        Some(pos) => &line[..pos],
        None => line,
    }
}
