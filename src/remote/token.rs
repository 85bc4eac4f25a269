use std::fmt;

/// Prefixes GitHub uses for classic and fine-grained personal access tokens.
const KNOWN_PREFIXES: [&str; 2] = ["ghp_", "github_pat_"];

/// A bearer token for the contents API.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Advisory check only; unknown prefixes are still sent as-is.
    pub fn has_known_prefix(&self) -> bool {
        KNOWN_PREFIXES
            .iter()
            .any(|prefix| self.0.starts_with(prefix))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(****)")
    }
}
