use regex::{NoExpand, Regex};
use std::sync::OnceLock;

use crate::error::TagpathExpectedError;

/// Characters that may never appear in a value substituted into a path.
pub const FORBIDDEN_CHARS: &[char] = &['{', '}', '/', '|', '\\', '<', ':', '>', '?', '*', '"'];

pub const DEFAULT_PLACEHOLDER: &str = "_";

static FORBIDDEN_CHARS_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_forbidden_chars_regex() -> &'static Regex {
    // One match per character: a run of three forbidden characters becomes three placeholders.
    FORBIDDEN_CHARS_REGEX.get_or_init(|| Regex::new(r#"[{}/|\\<:>?*"]"#).unwrap())
}

/// Replace every forbidden character in `text` with `placeholder`. The placeholder is not checked;
/// outside this crate, go through [`Sanitizer`].
pub(crate) fn sanitize(text: &str, placeholder: &str) -> String {
    get_forbidden_chars_regex().replace_all(text, NoExpand(placeholder)).into_owned()
}

pub fn is_path_safe(text: &str) -> bool {
    !get_forbidden_chars_regex().is_match(text)
}

/// A sanitizer bound to a validated placeholder. The placeholder must itself be path safe, which
/// keeps sanitization idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitizer {
    placeholder: String,
}

impl Sanitizer {
    pub fn new(placeholder: impl Into<String>) -> Result<Self, TagpathExpectedError> {
        let placeholder = placeholder.into();
        if placeholder.is_empty() || !is_path_safe(&placeholder) {
            return Err(TagpathExpectedError::InvalidPlaceholder { placeholder });
        }
        Ok(Sanitizer { placeholder })
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn sanitize(&self, text: &str) -> String {
        sanitize(text, &self.placeholder)
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Sanitizer {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}
