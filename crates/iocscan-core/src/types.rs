//! Core type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// A macro definition that passed the ioctl-name heuristic.
///
/// `tokens` holds the spelling of every token in the definition, starting
/// with the macro name itself, so it is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateMacro {
    pub name: String,
    pub tokens: Vec<String>,
}

impl CandidateMacro {
    pub fn new(name: impl Into<String>, tokens: Vec<String>) -> Self {
        Self {
            name: name.into(),
            tokens,
        }
    }
}

/// Renders the token list as `["NAME", "tok", ...]`.
impl fmt::Display for CandidateMacro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_token_list() {
        let mac = CandidateMacro::new(
            "SIOCGIFFLAGS",
            vec!["SIOCGIFFLAGS".to_string(), "0x8913".to_string()],
        );
        assert_eq!(mac.to_string(), r#"["SIOCGIFFLAGS", "0x8913"]"#);
    }

    #[test]
    fn test_display_escapes_quotes() {
        let mac = CandidateMacro::new(
            "IOC_NAME",
            vec!["IOC_NAME".to_string(), "\"dev\"".to_string()],
        );
        assert_eq!(mac.to_string(), r#"["IOC_NAME", "\"dev\""]"#);
    }
}
