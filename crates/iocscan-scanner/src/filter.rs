//! Macro name filter
//!
//! A macro is an ioctl candidate when its name contains `IOC` and has no
//! lowercase letters. Digits and underscores do not affect the case check,
//! so `MY_IOCTL_CMD` and `IOC2` match while `SomethingIOC` does not. Names
//! like `IOCBAR` that have nothing to do with ioctls also match.

use iocscan_parser::{Cursor, CursorKind, TranslationUnit};

/// Substring every candidate name must contain
pub const IOCTL_MARKER: &str = "IOC";

/// Whether `name` passes the ioctl heuristic
pub fn is_ioctl_name(name: &str) -> bool {
    name.contains(IOCTL_MARKER) && is_upper(name)
}

/// At least one cased character, and every cased character upper case
fn is_upper(s: &str) -> bool {
    let mut cased = false;
    for c in s.chars() {
        if c.is_lowercase() || is_titlecase(c) {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Cased but neither upper nor lower case, like `ǅ`
fn is_titlecase(c: char) -> bool {
    !c.is_uppercase() && !c.is_lowercase() && c.to_uppercase().ne(std::iter::once(c))
}

/// Macro definition cursors of `unit` that pass the heuristic, in pre-order
pub fn candidate_cursors(unit: &TranslationUnit) -> impl Iterator<Item = &Cursor> {
    unit.walk_preorder()
        .filter(|c| c.kind() == CursorKind::MacroDefinition && is_ioctl_name(c.spelling()))
}
