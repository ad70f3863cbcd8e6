//! Tree-sitter front end
//!
//! Parses a header in-process with tree-sitter-c. Nothing is preprocessed,
//! so definitions in every conditional branch show up, and includes are
//! never followed.

use iocscan_core::Location;
use std::path::Path;
use tracing::debug;
use tree_sitter::{Node, Parser as TSParser};

use crate::cursor::{Cursor, CursorKind, TranslationUnit};
use crate::diagnostic::{Diagnostic, Severity};
use crate::{Frontend, FrontendError, ParseOptions};

/// Tree-sitter based front end
pub struct TreeSitterFrontend {
    parser: TSParser,
}

impl TreeSitterFrontend {
    /// Create a new tree-sitter front end for C
    pub fn new() -> Result<Self, FrontendError> {
        let mut parser = TSParser::new();
        parser
            .set_language(&tree_sitter_c::LANGUAGE.into())
            .map_err(|e| FrontendError::Grammar(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse header text that did not come from disk
    pub fn parse_source(
        &mut self,
        text: String,
        path: &Path,
        options: &ParseOptions,
    ) -> Result<TranslationUnit, FrontendError> {
        // tree-sitter-c rejects comments inside directive bodies
        let masked = blank_comments(&text);
        let tree = self
            .parser
            .parse(&masked, None)
            .ok_or_else(|| FrontendError::NoTree(path.to_path_buf()))?;
        let root_node = tree.root_node();
        let lines = LineIndex::new(&text);

        let mut diagnostics = Vec::new();
        if root_node.has_error() {
            collect_errors(root_node, path, &lines, &mut diagnostics);
        }

        let root = Builder {
            source: &text,
            path,
            lines: &lines,
            options,
        }
        .build(root_node);

        Ok(TranslationUnit::new(path, text, root, diagnostics))
    }
}

impl Frontend for TreeSitterFrontend {
    fn parse(
        &mut self,
        path: &Path,
        options: &ParseOptions,
    ) -> Result<TranslationUnit, FrontendError> {
        debug!("Parsing {:?} with tree-sitter", path);

        let text = match std::fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                let diag = Diagnostic::new(Severity::Fatal, format!("cannot read file: {}", e));
                let root =
                    Cursor::new(CursorKind::TranslationUnit, path.display().to_string(), 0..0);
                return Ok(TranslationUnit::new(path, String::new(), root, vec![diag]));
            }
        };

        self.parse_source(text, path, options)
    }

    fn name(&self) -> &str {
        "tree-sitter"
    }
}

/// Replace every comment with spaces, keeping byte offsets.
///
/// Newlines inside a block comment survive unless the comment sits in a
/// directive, where the preprocessor would have joined the lines.
fn blank_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0;
    let mut line_start = true;
    let mut in_directive = false;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                line_start = true;
                in_directive = false;
                i += 1;
            }
            b'\\' if bytes.get(i + 1) == Some(&b'\n') => i += 2,
            b' ' | b'\t' | b'\r' | b'\x0c' => i += 1,
            b'#' if line_start => {
                line_start = false;
                in_directive = true;
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    out[i] = b' ';
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = text[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |pos| i + 2 + pos + 2);
                for byte in &mut out[i..end] {
                    if *byte != b'\n' || in_directive {
                        *byte = b' ';
                    }
                }
                i = end;
            }
            quote @ (b'"' | b'\'') => {
                line_start = false;
                i += 1;
                while i < bytes.len() && bytes[i] != quote && bytes[i] != b'\n' {
                    i += if bytes[i] == b'\\' { 2 } else { 1 };
                }
                if bytes.get(i) == Some(&quote) {
                    i += 1;
                }
            }
            _ => {
                line_start = false;
                i += 1;
            }
        }
    }

    // Only whole comments were replaced, so the bytes are still UTF-8
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Byte offset to 1-based line and column in the original text
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn location(&self, path: &Path, offset: usize) -> Location {
        let line = self.starts.partition_point(|&start| start <= offset);
        let column = offset - self.starts[line - 1] + 1;
        Location::new(path, line as u32, column as u32)
    }
}

/// Report every ERROR and MISSING node as an error diagnostic
fn collect_errors(
    node: Node,
    path: &Path,
    lines: &LineIndex,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let location = || lines.location(path, node.start_byte());
    if node.is_error() {
        diagnostics.push(Diagnostic::new(Severity::Error, "syntax error").at(location()));
    } else if node.is_missing() {
        diagnostics.push(
            Diagnostic::new(Severity::Error, format!("missing '{}'", node.kind())).at(location()),
        );
    }

    if !node.has_error() {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_errors(child, path, lines, diagnostics);
    }
}

struct Builder<'a> {
    source: &'a str,
    path: &'a Path,
    lines: &'a LineIndex,
    options: &'a ParseOptions,
}

impl Builder<'_> {
    fn text(&self, node: Node) -> &str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }

    fn location(&self, node: Node) -> Location {
        self.lines.location(self.path, node.start_byte())
    }

    fn build(&self, node: Node) -> Cursor {
        let mut cursor = self.make_cursor(node);

        if self.options.skip_function_bodies && node.kind() == "function_definition" {
            self.push_directives(node, &mut cursor);
            return cursor;
        }

        let mut walker = node.walk();
        for child in node.named_children(&mut walker) {
            if self.wanted(child) {
                cursor.push_child(self.build(child));
            }
        }

        cursor
    }

    /// Directives anywhere below `node`, without the code around them
    fn push_directives(&self, node: Node, cursor: &mut Cursor) {
        let mut walker = node.walk();
        for child in node.named_children(&mut walker) {
            if !child.kind().starts_with("preproc_") {
                self.push_directives(child, cursor);
            } else if self.wanted(child) {
                cursor.push_child(self.build(child));
            }
        }
    }

    fn wanted(&self, node: Node) -> bool {
        self.options.detailed_preprocessing_record || !is_macro_definition(node)
    }

    fn make_cursor(&self, node: Node) -> Cursor {
        let location = self.location(node);

        match node.kind() {
            "translation_unit" => Cursor::new(
                CursorKind::TranslationUnit,
                self.path.display().to_string(),
                node.byte_range(),
            ),
            _ if is_macro_definition(node) => match node.child_by_field_name("name") {
                // Extent starts at the name so tokens exclude `#define`
                Some(name) => Cursor::new(
                    CursorKind::MacroDefinition,
                    self.text(name),
                    name.start_byte()..node.end_byte(),
                )
                .with_location(self.location(name)),
                None => Cursor::new(CursorKind::Unexposed, "", node.byte_range())
                    .with_location(location),
            },
            "preproc_include" => {
                let target = node
                    .child_by_field_name("path")
                    .map(|p| self.text(p))
                    .unwrap_or_default();
                Cursor::new(CursorKind::InclusionDirective, target, node.byte_range())
                    .with_location(location)
            }
            _ => Cursor::new(CursorKind::Unexposed, "", node.byte_range()).with_location(location),
        }
    }
}

fn is_macro_definition(node: Node) -> bool {
    matches!(node.kind(), "preproc_def" | "preproc_function_def")
}
