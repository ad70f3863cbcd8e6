//! Translation units and their cursor trees

use iocscan_core::Location;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::diagnostic::Diagnostic;
use crate::lexer::{self, Token};

/// Kind of node in a translation unit tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorKind {
    TranslationUnit,
    MacroDefinition,
    InclusionDirective,
    Unexposed,
}

/// A node in a translation unit tree
#[derive(Debug, Clone)]
pub struct Cursor {
    kind: CursorKind,
    spelling: String,
    extent: Range<usize>,
    location: Option<Location>,
    children: Vec<Cursor>,
}

impl Cursor {
    pub fn new(kind: CursorKind, spelling: impl Into<String>, extent: Range<usize>) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            extent,
            location: None,
            children: Vec::new(),
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn push_child(&mut self, child: Cursor) {
        self.children.push(child);
    }

    pub fn kind(&self) -> CursorKind {
        self.kind
    }

    /// Name of the entity (the macro name for macro definitions)
    pub fn spelling(&self) -> &str {
        &self.spelling
    }

    /// Byte range of the cursor in the translation unit text
    pub fn extent(&self) -> Range<usize> {
        self.extent.clone()
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn children(&self) -> &[Cursor] {
        &self.children
    }

    /// Visit this cursor and all descendants, parents before children
    pub fn walk_preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }
}

/// Pre-order iterator over a cursor tree
pub struct Preorder<'a> {
    stack: Vec<&'a Cursor>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Cursor;

    fn next(&mut self) -> Option<&'a Cursor> {
        let cursor = self.stack.pop()?;
        self.stack.extend(cursor.children.iter().rev());
        Some(cursor)
    }
}

/// A parsed header: its text, cursor tree and diagnostics
#[derive(Debug)]
pub struct TranslationUnit {
    path: PathBuf,
    text: String,
    root: Cursor,
    diagnostics: Vec<Diagnostic>,
}

impl TranslationUnit {
    pub fn new(path: &Path, text: String, root: Cursor, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            path: path.to_path_buf(),
            text,
            root,
            diagnostics,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Root cursor of kind `TranslationUnit`
    pub fn cursor(&self) -> &Cursor {
        &self.root
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// True when any diagnostic is worse than a warning
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    pub fn walk_preorder(&self) -> Preorder<'_> {
        self.root.walk_preorder()
    }

    /// Raw tokens covered by `cursor`
    pub fn tokens(&self, cursor: &Cursor) -> Vec<Token> {
        self.text
            .get(cursor.extent())
            .map(lexer::tokenize)
            .unwrap_or_default()
    }
}
