//! Clang Front End
//!
//! Runs `clang -E -dD` on a header. The preprocessed output keeps every
//! `#define` seen while preprocessing (built-ins, the header itself and
//! everything it includes), interleaved with line markers that say which
//! file each definition came from. Diagnostics are read back from stderr.

use iocscan_core::Location;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::cursor::{Cursor, CursorKind, TranslationUnit};
use crate::diagnostic::{Diagnostic, Severity};
use crate::lexer::{self, TokenKind};
use crate::{Frontend, FrontendError, ParseOptions};

const DEFINE_PREFIX: &str = "#define ";

fn located_diagnostic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(.+?):(\d+):(\d+): (fatal error|error|warning|note|remark): (.*)$")
            .expect("valid diagnostic regex")
    })
}

fn driver_diagnostic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^:\s]+: (fatal error|error|warning|note|remark): (.*)$")
            .expect("valid diagnostic regex")
    })
}

fn line_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^# (\d+) "((?:[^"\\]|\\.)*)""#).expect("valid line marker regex")
    })
}

/// Clang subprocess front end
pub struct ClangFrontend {
    /// Path to clang executable
    clang_path: PathBuf,
}

impl ClangFrontend {
    /// Create a front end, auto-detecting clang location
    pub fn new() -> Result<Self, FrontendError> {
        let clang_path = Self::find_clang()?;
        debug!("Found clang at: {:?}", clang_path);
        Ok(Self { clang_path })
    }

    /// Create a front end with a specific clang path
    pub fn with_path(clang_path: PathBuf) -> Self {
        Self { clang_path }
    }

    pub fn clang_path(&self) -> &Path {
        &self.clang_path
    }

    /// Find clang executable
    fn find_clang() -> Result<PathBuf, FrontendError> {
        let candidates = [
            "clang",
            "/usr/bin/clang",
            "/usr/local/bin/clang",
            "/opt/homebrew/bin/clang",
            "/opt/homebrew/opt/llvm/bin/clang",
        ];

        for candidate in candidates {
            if let Ok(output) = Command::new(candidate).arg("--version").output() {
                if output.status.success() {
                    return Ok(PathBuf::from(candidate));
                }
            }
        }

        Err(FrontendError::ClangNotFound)
    }

    /// Check if clang is available
    pub fn is_available(&self) -> bool {
        Command::new(&self.clang_path)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Get clang version
    pub fn version(&self) -> Option<String> {
        Command::new(&self.clang_path)
            .arg("--version")
            .output()
            .ok()
            .and_then(|o| {
                String::from_utf8(o.stdout)
                    .ok()
                    .and_then(|s| s.lines().next().map(|l| l.to_string()))
            })
    }

    /// Build clang command line arguments
    fn build_args(&self, options: &ParseOptions) -> Vec<String> {
        let mut args = vec!["-E".to_string()];

        if options.detailed_preprocessing_record {
            args.push("-dD".to_string());
        }

        args.extend(["-x", "c", "-fno-color-diagnostics"].map(String::from));

        for include in &options.include_dirs {
            args.push(format!("-I{}", include.display()));
        }

        args.extend(options.extra_args.iter().cloned());

        args
    }
}

impl Frontend for ClangFrontend {
    fn parse(
        &mut self,
        path: &Path,
        options: &ParseOptions,
    ) -> Result<TranslationUnit, FrontendError> {
        let args = self.build_args(options);
        debug!("Preprocessing {:?} with args: {:?}", path, args);

        let output = Command::new(&self.clang_path)
            .args(&args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| FrontendError::Spawn {
                program: self.clang_path.clone(),
                source,
            })?;

        let mut diagnostics = parse_diagnostics(&String::from_utf8_lossy(&output.stderr));
        if !output.status.success() && !diagnostics.iter().any(|d| d.severity.is_error()) {
            warn!(
                "{} exited with {} without reporting an error",
                self.clang_path.display(),
                output.status
            );
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                format!("clang exited with {}", output.status),
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        let root = build_macro_tree(&text, path);
        Ok(TranslationUnit::new(path, text, root, diagnostics))
    }

    fn name(&self) -> &str {
        "clang"
    }
}

/// Parse clang's stderr into diagnostics
fn parse_diagnostics(stderr: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for line in stderr.lines() {
        if let Some(caps) = located_diagnostic_re().captures(line) {
            let Some(severity) = Severity::from_clang_label(&caps[4]) else {
                continue;
            };
            let location = Location::new(
                &caps[1],
                caps[2].parse().unwrap_or(0),
                caps[3].parse().unwrap_or(0),
            );
            diagnostics.push(Diagnostic::new(severity, &caps[5]).at(location));
        } else if let Some(caps) = driver_diagnostic_re().captures(line) {
            if let Some(severity) = Severity::from_clang_label(&caps[1]) {
                diagnostics.push(Diagnostic::new(severity, &caps[2]));
            }
        }
    }

    diagnostics
}

/// Turn `-dD` output into a translation unit cursor holding one
/// `MacroDefinition` child per `#define` line, in output order.
fn build_macro_tree(text: &str, path: &Path) -> Cursor {
    let mut root = Cursor::new(
        CursorKind::TranslationUnit,
        path.display().to_string(),
        0..text.len(),
    );

    let mut file = path.to_path_buf();
    let mut line_no: u32 = 1;
    let mut offset = 0;

    for raw in text.split_inclusive('\n') {
        let start = offset;
        offset += raw.len();
        let line = raw.trim_end_matches(['\n', '\r']);

        // A marker names the file and line of the line after it
        if let Some(caps) = line_marker_re().captures(line) {
            line_no = caps[1].parse().unwrap_or(1);
            file = PathBuf::from(unescape_marker_path(&caps[2]));
            continue;
        }

        let name = line.strip_prefix(DEFINE_PREFIX).and_then(lexer::first_token);
        if let Some(name) = name {
            if matches!(name.kind, TokenKind::Identifier | TokenKind::Keyword) {
                let name_start = start + DEFINE_PREFIX.len();
                let column = DEFINE_PREFIX.len() as u32 + 1;
                root.push_child(
                    Cursor::new(
                        CursorKind::MacroDefinition,
                        name.spelling,
                        name_start..start + line.len(),
                    )
                    .with_location(Location::new(&file, line_no, column)),
                );
            }
        }

        line_no += 1;
    }

    root
}

fn unescape_marker_path(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DD_OUTPUT: &str = r#"# 1 "/usr/include/sys/ttycom.h"
# 1 "<built-in>" 1
#define __STDC__ 1
#define __clang__ 1
# 1 "<command line>" 1
# 1 "<built-in>" 2
# 1 "/usr/include/sys/ttycom.h" 2
#define _SYS_TTYCOM_H_

# 1 "/usr/include/sys/ioccom.h" 1 3
#define _IOC(inout,group,num,len) (inout | ((len & IOCPARM_MASK) << 16) | ((group) << 8) | (num))
# 5 "/usr/include/sys/ttycom.h" 2

struct winsize {
 unsigned short ws_row;
};
#define TIOCGWINSZ _IOR('t', 104, struct winsize)
"#;

    fn macro_names(root: &Cursor) -> Vec<String> {
        root.walk_preorder()
            .filter(|c| c.kind() == CursorKind::MacroDefinition)
            .map(|c| c.spelling().to_string())
            .collect()
    }

    #[test]
    fn test_build_args() {
        let frontend = ClangFrontend::with_path(PathBuf::from("clang"));
        let mut options = ParseOptions::default();
        options.include_dirs.push(PathBuf::from("/usr/include"));
        options.extra_args.push("-D__APPLE__".into());

        let args = frontend.build_args(&options);

        assert_eq!(&args[..4], &["-E", "-dD", "-x", "c"]);
        assert!(args.contains(&"-I/usr/include".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("-D__APPLE__"));
    }

    #[test]
    fn test_build_args_without_macro_record() {
        let frontend = ClangFrontend::with_path(PathBuf::from("clang"));
        let options = ParseOptions {
            detailed_preprocessing_record: false,
            ..ParseOptions::default()
        };
        assert!(!frontend.build_args(&options).contains(&"-dD".to_string()));
    }

    #[test]
    fn test_parse_diagnostics() {
        let stderr = r#"In file included from /usr/include/net/if.h:3:
/usr/include/linux/if.h:22:10: fatal error: 'linux/types.h' file not found
   22 | #include <linux/types.h>
      |          ^~~~~~~~~~~~~~~
/usr/include/a.h:4:9: warning: 'FOO' macro redefined [-Wmacro-redefined]
/usr/include/a.h:2:9: note: previous definition is here
1 warning and 1 error generated.
clang: error: no such file or directory: 'missing.h'
"#;
        let diags = parse_diagnostics(stderr);
        let severities: Vec<_> = diags.iter().map(|d| d.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Fatal, Severity::Warning, Severity::Note, Severity::Error]
        );

        assert_eq!(diags[0].message, "'linux/types.h' file not found");
        assert_eq!(
            diags[0].location,
            Some(Location::new("/usr/include/linux/if.h", 22, 10))
        );
        assert_eq!(diags[3].location, None);
    }

    #[test]
    fn test_warnings_only_is_clean() {
        let diags = parse_diagnostics(
            "/usr/include/a.h:4:9: warning: 'FOO' macro redefined [-Wmacro-redefined]\n",
        );
        assert!(!diags.iter().any(|d| d.severity.is_error()));
    }

    #[test]
    fn test_build_macro_tree_order() {
        let root = build_macro_tree(DD_OUTPUT, Path::new("/usr/include/sys/ttycom.h"));
        assert_eq!(root.kind(), CursorKind::TranslationUnit);
        assert_eq!(
            macro_names(&root),
            vec!["__STDC__", "__clang__", "_SYS_TTYCOM_H_", "_IOC", "TIOCGWINSZ"]
        );
    }

    #[test]
    fn test_macro_names_are_identifier_tokens() {
        let text = "#define inline __inline__\n#define $IOC 1\n#define 42 x\n";
        let root = build_macro_tree(text, Path::new("odd.h"));
        assert_eq!(macro_names(&root), vec!["inline", "$IOC"]);
        assert_eq!(root.children()[1].extent(), 34..40);
    }

    #[test]
    fn test_build_macro_tree_locations() {
        let root = build_macro_tree(DD_OUTPUT, Path::new("/usr/include/sys/ttycom.h"));
        let locations: Vec<_> = root
            .children()
            .iter()
            .map(|c| c.location().cloned().unwrap())
            .collect();

        assert_eq!(locations[0], Location::new("<built-in>", 1, 9));
        assert_eq!(locations[1], Location::new("<built-in>", 2, 9));
        assert_eq!(locations[2], Location::new("/usr/include/sys/ttycom.h", 1, 9));
        assert_eq!(locations[3], Location::new("/usr/include/sys/ioccom.h", 1, 9));
        assert_eq!(locations[4], Location::new("/usr/include/sys/ttycom.h", 9, 9));
    }

    #[test]
    fn test_macro_tokens_from_output() {
        let path = Path::new("/usr/include/sys/ttycom.h");
        let root = build_macro_tree(DD_OUTPUT, path);
        let unit = TranslationUnit::new(path, DD_OUTPUT.to_string(), root, Vec::new());

        let tiocgwinsz = unit
            .walk_preorder()
            .find(|c| c.spelling() == "TIOCGWINSZ")
            .unwrap();
        let tokens: Vec<_> = unit
            .tokens(tiocgwinsz)
            .into_iter()
            .map(|t| t.spelling)
            .collect();
        assert_eq!(
            tokens,
            vec!["TIOCGWINSZ", "_IOR", "(", "'t'", ",", "104", ",", "struct", "winsize", ")"]
        );

        let ioc = unit.walk_preorder().find(|c| c.spelling() == "_IOC").unwrap();
        let tokens = unit.tokens(ioc);
        assert_eq!(tokens[0].spelling, "_IOC");
        assert_eq!(tokens[1].spelling, "(");
    }

    #[test]
    fn test_unescape_marker_path() {
        assert_eq!(unescape_marker_path(r#"C:\\sdk\\x.h"#), r"C:\sdk\x.h");
        assert_eq!(unescape_marker_path(r#"we\"ird.h"#), r#"we"ird.h"#);
    }

    #[test]
    fn test_spawn_failure_is_frontend_error() {
        let mut frontend =
            ClangFrontend::with_path(PathBuf::from("/nonexistent/bin/clang-iocscan"));
        assert!(!frontend.is_available());

        let err = frontend
            .parse(Path::new("/usr/include/stdio.h"), &ParseOptions::default())
            .unwrap_err();
        assert!(matches!(err, FrontendError::Spawn { .. }));
    }
}
