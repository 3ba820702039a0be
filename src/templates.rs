/// The templates module compiles path patterns such as
/// `{album_artist}/{orig_year?year+ – }{album}/{track} – {title}.{extension}` into filenames.
///
/// A token is `{name}`, optionally followed by `?fallback` and/or `+addendum` before the closing
/// brace:
///
/// - `{name}` emits the sanitized value of `name`, or the placeholder when it is absent.
/// - `{name?other}` emits the value of `name`; when it is absent, `other` is resolved as if it were
///   a fresh token (and may itself be followed by `?another`).
/// - `{name+text}` emits the value of `name` followed by `text` verbatim. When `name` is absent,
///   nothing at all is emitted.
///
/// The addendum only fires when the primary tag itself is present. Everything outside braces is
/// copied verbatim; there is no escape for `{`, `}`, `?` or `+`, and a bare `}`, `?` or `+` outside
/// a token is an error.
///
/// Compilation is a single left-to-right pass over the pattern, linear in its length, driven by an
/// explicit [`ScanState`] that is threaded through each step.
use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::metadata::MetadataProvider;
use crate::sanitize::Sanitizer;
use crate::tags::Tag;

pub const DEFAULT_PATTERN: &str = "{album_artist}/{orig_year?year+ – }{album}/{disc+-}{track?track_number} – {title}.{extension}";

const OPENER: char = '{';
const CLOSER: char = '}';
const FALLBACK: char = '?';
const ADDENDUM: char = '+';

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathTemplate(pub String);

impl Default for PathTemplate {
    fn default() -> Self {
        PathTemplate(DEFAULT_PATTERN.to_string())
    }
}

impl PathTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        PathTemplate(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    pub fn compile<P>(&self, provider: &P, sanitizer: &Sanitizer) -> Result<Vec<Segment>, TemplateError>
    where
        P: MetadataProvider + ?Sized,
    {
        compile(&self.0, provider, sanitizer)
    }

    /// Check the pattern for errors that do not depend on any particular file.
    ///
    /// Whether a region of a token is composed, piled or skipped depends only on which tags are
    /// present. With every tag absent, every fallback name in a chain gets composed; with every tag
    /// present, every addendum gets piled. Any region that some file could make the scanner compose
    /// is composed in one of those two runs, so a pattern that passes here compiles for every file.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let sanitizer = Sanitizer::default();
        compile(&self.0, &AllAbsent, &sanitizer)?;
        compile(&self.0, &AllPresent, &sanitizer)?;
        Ok(())
    }
}

/// One fragment of compiled output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Pattern text outside of tokens, copied verbatim.
    Literal(String),
    /// A sanitized tag value (primary or fallback).
    Value(String),
    /// Addendum text from a `+` section, copied verbatim.
    Addendum(String),
    /// Stand-in for a tag whose value (and fallback) is absent.
    Placeholder(String),
}

impl Segment {
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Literal(s) | Segment::Value(s) | Segment::Addendum(s) | Segment::Placeholder(s) => s,
        }
    }
}

/// Concatenate compiled segments into the final relative path.
pub fn assemble(segments: &[Segment]) -> String {
    segments.iter().map(Segment::as_str).collect()
}

/// Scanner states. `start` is always the index of the `{` that opened the current token.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanState {
    /// Copying literal text.
    Plain,
    /// Accumulating a tag name. `fallback` is set once the primary tag turned out to be absent.
    Composing { start: usize, name: String, fallback: bool },
    /// Discarding characters up to the next `}`.
    SkipToClose { start: usize },
    /// Accumulating addendum text up to the next marker.
    PileLiteral { start: usize, text: String },
}

struct Scanner<'a, P: ?Sized> {
    provider: &'a P,
    sanitizer: &'a Sanitizer,
    segments: Vec<Segment>,
}

impl<'a, P> Scanner<'a, P>
where
    P: MetadataProvider + ?Sized,
{
    fn step(&mut self, state: ScanState, index: usize, c: char) -> Result<ScanState, TemplateError> {
        match state {
            ScanState::Plain => match c {
                OPENER => Ok(ScanState::Composing {
                    start: index,
                    name: String::new(),
                    fallback: false,
                }),
                CLOSER | FALLBACK | ADDENDUM => Err(TemplateError::UnexpectedCloser { index, found: c }),
                _ => {
                    self.push_literal(c);
                    Ok(ScanState::Plain)
                }
            },
            ScanState::Composing { start, mut name, fallback } => match c {
                OPENER => Err(TemplateError::NestedOpener { index }),
                CLOSER | FALLBACK | ADDENDUM => self.resolve(start, &name, fallback, c),
                _ => {
                    name.push(c);
                    Ok(ScanState::Composing { start, name, fallback })
                }
            },
            ScanState::SkipToClose { start } => match c {
                CLOSER => Ok(ScanState::Plain),
                _ => Ok(ScanState::SkipToClose { start }),
            },
            ScanState::PileLiteral { start, mut text } => match c {
                CLOSER => {
                    self.segments.push(Segment::Addendum(text));
                    Ok(ScanState::Plain)
                }
                FALLBACK | ADDENDUM => Ok(ScanState::SkipToClose { start }),
                _ => {
                    text.push(c);
                    Ok(ScanState::PileLiteral { start, text })
                }
            },
        }
    }

    /// Resolve a completed tag name. `marker` is the character that ended the name.
    fn resolve(&mut self, start: usize, name: &str, fallback: bool, marker: char) -> Result<ScanState, TemplateError> {
        let tag = Tag::resolve(name)?;
        let provider = self.provider;

        if let Some(value) = provider.lookup(tag) {
            self.segments.push(Segment::Value(self.sanitizer.sanitize(value)));
            return Ok(match marker {
                CLOSER => ScanState::Plain,
                ADDENDUM if !fallback => ScanState::PileLiteral {
                    start,
                    text: String::new(),
                },
                _ => ScanState::SkipToClose { start },
            });
        }

        Ok(match marker {
            FALLBACK => ScanState::Composing {
                start,
                name: String::new(),
                fallback: true,
            },
            // An absent primary tag swallows its addendum without leaving a trace.
            ADDENDUM if !fallback => ScanState::SkipToClose { start },
            ADDENDUM => {
                self.push_placeholder();
                ScanState::SkipToClose { start }
            }
            _ => {
                self.push_placeholder();
                ScanState::Plain
            }
        })
    }

    fn push_literal(&mut self, c: char) {
        if let Some(Segment::Literal(text)) = self.segments.last_mut() {
            text.push(c);
        } else {
            self.segments.push(Segment::Literal(c.to_string()));
        }
    }

    fn push_placeholder(&mut self) {
        self.segments.push(Segment::Placeholder(self.sanitizer.placeholder().to_string()));
    }
}

/// Compile `pattern` against one file's metadata into an ordered list of segments.
pub fn compile<P>(pattern: &str, provider: &P, sanitizer: &Sanitizer) -> Result<Vec<Segment>, TemplateError>
where
    P: MetadataProvider + ?Sized,
{
    let mut scanner = Scanner {
        provider,
        sanitizer,
        segments: Vec::new(),
    };

    let mut state = ScanState::Plain;
    for (index, c) in pattern.chars().enumerate() {
        state = scanner.step(state, index, c)?;
    }

    match state {
        ScanState::Plain => {
            tracing::debug!("Compiled pattern {pattern:?} into {} segments", scanner.segments.len());
            Ok(scanner.segments)
        }
        ScanState::Composing { start, .. } | ScanState::SkipToClose { start } | ScanState::PileLiteral { start, .. } => {
            Err(TemplateError::UnterminatedToken { index: start })
        }
    }
}

/// Compile `template` and concatenate the result into a relative path.
pub fn evaluate_template<P>(template: &PathTemplate, provider: &P, sanitizer: &Sanitizer) -> Result<String, TemplateError>
where
    P: MetadataProvider + ?Sized,
{
    Ok(assemble(&template.compile(provider, sanitizer)?))
}

struct AllAbsent;

impl MetadataProvider for AllAbsent {
    fn lookup(&self, _tag: Tag) -> Option<&str> {
        None
    }
}

struct AllPresent;

impl MetadataProvider for AllPresent {
    fn lookup(&self, tag: Tag) -> Option<&str> {
        Some(tag.as_str())
    }
}
