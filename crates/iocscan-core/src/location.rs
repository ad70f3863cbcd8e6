//! Source code location types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A position inside a source file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path
    pub file: PathBuf,
    /// Line (1-based)
    pub line: u32,
    /// Column (1-based)
    pub column: u32,
}

impl Location {
    /// Create a new location
    pub fn new(file: impl AsRef<Path>, line: u32, column: u32) -> Self {
        Self {
            file: file.as_ref().to_path_buf(),
            line,
            column,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let loc = Location::new("/usr/include/asm-generic/ioctls.h", 12, 9);
        assert_eq!(loc.to_string(), "/usr/include/asm-generic/ioctls.h:12:9");
    }
}
