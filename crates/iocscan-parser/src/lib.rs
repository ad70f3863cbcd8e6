//! iocscan Parser
//!
//! C front ends that turn a header file into a [`TranslationUnit`]: a cursor
//! tree with macro definitions plus the diagnostics produced while parsing.
//!
//! ## Modules
//!
//! - `clang` - `clang -E -dD` subprocess front end
//! - `treesitter` - in-process tree-sitter-c front end
//! - `cursor` - translation units and cursor trees
//! - `diagnostic` - diagnostics and severities
//! - `lexer` - raw C tokenization of macro definitions

pub mod clang;
pub mod cursor;
pub mod diagnostic;
pub mod lexer;
pub mod treesitter;

pub use clang::ClangFrontend;
pub use cursor::{Cursor, CursorKind, TranslationUnit};
pub use diagnostic::{Diagnostic, Severity};
pub use lexer::{Token, TokenKind};
pub use treesitter::TreeSitterFrontend;

use iocscan_core::{FrontendKind, ScanConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors a front end cannot express as a diagnostic
#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("Clang not found. Please install clang.")]
    ClangNotFound,

    #[error("Failed to run {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load C grammar: {0}")]
    Grammar(String),

    #[error("Parser produced no tree for {}", .0.display())]
    NoTree(PathBuf),
}

impl From<FrontendError> for iocscan_core::Error {
    fn from(err: FrontendError) -> Self {
        iocscan_core::Error::Frontend(err.to_string())
    }
}

/// How a header is parsed
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Include search path (-I flags)
    pub include_dirs: Vec<PathBuf>,
    /// Additional front end arguments
    pub extra_args: Vec<String>,
    /// Record macro definitions as cursors
    pub detailed_preprocessing_record: bool,
    /// Do not build cursors for function bodies
    pub skip_function_bodies: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            include_dirs: Vec::new(),
            extra_args: Vec::new(),
            detailed_preprocessing_record: true,
            skip_function_bodies: true,
        }
    }
}

impl ParseOptions {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            include_dirs: config.include_dirs.clone(),
            extra_args: config.extra_args.clone(),
            ..Self::default()
        }
    }
}

/// A C front end
pub trait Frontend {
    /// Parse one header. Problems in the header itself are reported as
    /// diagnostics on the returned unit; `Err` means the front end failed.
    fn parse(
        &mut self,
        path: &Path,
        options: &ParseOptions,
    ) -> Result<TranslationUnit, FrontendError>;

    /// Front end name
    fn name(&self) -> &str;
}

/// Build the front end selected by `config`
pub fn create_frontend(config: &ScanConfig) -> Result<Box<dyn Frontend>, FrontendError> {
    match config.frontend {
        FrontendKind::Clang => {
            let clang = match &config.clang_path {
                Some(path) => {
                    let clang = ClangFrontend::with_path(path.clone());
                    if !clang.is_available() {
                        warn!("Configured clang {:?} did not answer --version", path);
                    }
                    clang
                }
                None => ClangFrontend::new()?,
            };
            debug!("Using {} ({:?})", clang.clang_path().display(), clang.version());
            Ok(Box::new(clang))
        }
        FrontendKind::TreeSitter => Ok(Box::new(TreeSitterFrontend::new()?)),
    }
}
