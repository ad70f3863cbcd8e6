//! Configuration types

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Directories scanned when nothing else is configured
pub const DEFAULT_ROOTS: &[&str] = &["/usr/include"];

/// Include search path handed to the front end by default
pub const DEFAULT_INCLUDE_DIRS: &[&str] = &["/usr/include"];

/// File name suffix that marks a header
pub const DEFAULT_HEADER_SUFFIX: &str = ".h";

/// Which C front end parses the headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrontendKind {
    /// `clang -E -dD` subprocess
    #[default]
    Clang,
    /// In-process tree-sitter-c parse
    TreeSitter,
}

impl FrontendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrontendKind::Clang => "clang",
            FrontendKind::TreeSitter => "tree-sitter",
        }
    }
}

impl std::str::FromStr for FrontendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "clang" => Ok(FrontendKind::Clang),
            "tree-sitter" | "treesitter" | "ts" => Ok(FrontendKind::TreeSitter),
            _ => Err(Error::Config(format!("unknown front end: {}", s))),
        }
    }
}

impl std::fmt::Display for FrontendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scan configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directories walked for headers
    pub roots: Vec<PathBuf>,

    /// Include search path (-I)
    pub include_dirs: Vec<PathBuf>,

    /// Suffix a file name must end with to be scanned
    pub header_suffix: String,

    /// Front end used to parse each header
    pub frontend: FrontendKind,

    /// Explicit clang executable; auto-detected when unset
    pub clang_path: Option<PathBuf>,

    /// Additional front end arguments
    pub extra_args: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roots: DEFAULT_ROOTS.iter().map(PathBuf::from).collect(),
            include_dirs: DEFAULT_INCLUDE_DIRS.iter().map(PathBuf::from).collect(),
            header_suffix: DEFAULT_HEADER_SUFFIX.to_string(),
            frontend: FrontendKind::default(),
            clang_path: None,
            extra_args: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Load a YAML config file. Missing fields keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|source| Error::ConfigFile {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_yaml_str(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Check the config is usable for a scan
    pub fn validate(&self) -> Result<()> {
        if self.roots.is_empty() {
            return Err(Error::Config("no root directories to scan".into()));
        }
        if self.header_suffix.is_empty() {
            return Err(Error::Config("header suffix must not be empty".into()));
        }
        Ok(())
    }
}
