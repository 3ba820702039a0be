pub mod config;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod plan;
pub mod sanitize;
pub mod tags;
pub mod templates;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Result, TagpathError, TagpathExpectedError, TemplateError};
pub use metadata::{MetadataProvider, TagDictionary};
pub use sanitize::Sanitizer;
pub use tags::Tag;
pub use templates::{assemble, compile, evaluate_template, PathTemplate, Segment};

#[cfg(test)]
mod logging_test;
