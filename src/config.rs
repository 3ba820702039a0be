/// The config module parses the configuration file into a validated [`Config`].
///
/// Every error names the offending key and the configuration file, and unrecognized keys are
/// reported as warnings rather than silently dropped.
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

use crate::error::{Result, TagpathError, TagpathExpectedError};
use crate::sanitize::{Sanitizer, DEFAULT_PLACEHOLDER};
use crate::templates::PathTemplate;

pub const DEFAULT_AUDIO_EXTENSIONS: &[&str] = &["flac", "mp3", "m4a", "ogg", "opus", "wav", "aiff", "wv", "ape"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory the rendered relative paths are joined onto.
    pub destination_dir: PathBuf,
    pub path_template: PathTemplate,
    pub sanitizer: Sanitizer,
    /// Maximum worker threads for batch planning. Defaults to nproc/2.
    pub max_proc: usize,
    /// Lower-cased, without the leading dot.
    pub audio_extensions: Vec<String>,
}

impl Config {
    /// Location of the config file when no override is given.
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "tagpath")
            .ok_or_else(|| TagpathExpectedError::Generic("Failed to get project directories".to_string()))?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    pub fn parse(config_path_override: Option<&Path>) -> Result<Config> {
        let cfgpath = match config_path_override {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };
        let cfgtext = fs::read_to_string(&cfgpath).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TagpathExpectedError::ConfigNotFound { path: cfgpath.clone() }.into(),
            _ => TagpathError::Io(e),
        })?;
        Self::from_toml_str(&cfgtext, &cfgpath)
    }

    /// Parse configuration text. `cfgpath` is only used in error messages.
    pub fn from_toml_str(cfgtext: &str, cfgpath: &Path) -> Result<Config> {
        // As we parse, delete consumed values from the table. If any are left over at the end,
        // warn that unknown config keys were found.
        let mut data: Table =
            toml::from_str(cfgtext).map_err(|e| TagpathExpectedError::ConfigDecode(e.to_string()))?;

        let destination_dir = match data.remove("destination_dir") {
            Some(Value::String(s)) => PathBuf::from(shellexpand::tilde(&s).into_owned()),
            Some(_) => {
                return Err(invalid_value(cfgpath, "destination_dir", "must be a path"));
            }
            None => {
                return Err(TagpathExpectedError::MissingConfigKey(format!(
                    "Missing key destination_dir in configuration file ({})",
                    cfgpath.display()
                ))
                .into());
            }
        };

        let path_template = match data.remove("pattern") {
            Some(Value::String(s)) => PathTemplate::new(s),
            Some(_) => return Err(invalid_value(cfgpath, "pattern", "must be a string")),
            None => PathTemplate::default(),
        };
        path_template
            .validate()
            .map_err(|source| TagpathExpectedError::InvalidPathTemplate {
                key: "pattern".to_string(),
                source,
            })?;
        if path_template.text().starts_with('/') {
            return Err(invalid_value(cfgpath, "pattern", "must be relative to destination_dir"));
        }

        let sanitizer = match data.remove("placeholder") {
            Some(Value::String(s)) => {
                Sanitizer::new(s).map_err(|e| invalid_value(cfgpath, "placeholder", &e.to_string()))?
            }
            Some(_) => return Err(invalid_value(cfgpath, "placeholder", "must be a string")),
            None => Sanitizer::new(DEFAULT_PLACEHOLDER)?,
        };

        let max_proc = match data.remove("max_proc") {
            Some(Value::Integer(n)) if n > 0 => n as usize,
            Some(_) => return Err(invalid_value(cfgpath, "max_proc", "must be a positive integer")),
            None => std::cmp::max(1, num_cpus::get() / 2),
        };

        let audio_extensions = match data.remove("audio_extensions") {
            Some(Value::Array(values)) => {
                let mut exts = Vec::with_capacity(values.len());
                for v in values {
                    match v {
                        Value::String(s) => exts.push(s.trim_start_matches('.').to_lowercase()),
                        other => {
                            return Err(invalid_value(
                                cfgpath,
                                "audio_extensions",
                                &format!("Each extension must be of type str: got {}", other.type_str()),
                            ));
                        }
                    }
                }
                exts
            }
            Some(other) => {
                return Err(invalid_value(
                    cfgpath,
                    "audio_extensions",
                    &format!("Must be a list[str]: got {}", other.type_str()),
                ));
            }
            None => DEFAULT_AUDIO_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        };

        if !data.is_empty() {
            let unrecognized: Vec<&str> = data.keys().map(String::as_str).collect();
            tracing::warn!(
                "Unrecognized options found in configuration file ({}): {}",
                cfgpath.display(),
                unrecognized.join(", ")
            );
        }

        Ok(Config {
            destination_dir,
            path_template,
            sanitizer,
            max_proc,
            audio_extensions,
        })
    }
}

fn invalid_value(cfgpath: &Path, key: &str, message: &str) -> TagpathError {
    TagpathExpectedError::InvalidConfigValue(format!(
        "Invalid value for {key} in configuration file ({}): {message}",
        cfgpath.display()
    ))
    .into()
}
