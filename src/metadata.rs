/// The metadata module defines the lookup capability the template engine consumes, and the per-file
/// tag dictionary that implements it.
///
/// A dictionary is built fresh for every input file, either from raw key/value pairs, from the JSON
/// that ffprobe prints, or by reading the file's tags directly. The output extension is not file
/// metadata: the caller injects it explicitly before compiling.
use lofty::config::ParseOptions;
use lofty::file::FileType;
use lofty::flac::FlacFile;
use lofty::ogg::{OpusFile, SpeexFile, VorbisFile};
use lofty::prelude::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::TagType;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Seek};
use std::path::Path;

use crate::error::{Result, TagpathExpectedError};
use crate::tags::Tag;

pub trait MetadataProvider {
    /// Look up the value of `tag` for the current file. `None` means the tag is absent, which is a
    /// normal outcome rather than an error.
    fn lookup(&self, tag: Tag) -> Option<&str>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDictionary {
    values: HashMap<Tag, String>,
    extension: Option<String>,
}

impl TagDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.set_extension(extension);
        self
    }

    pub fn set_extension(&mut self, extension: impl Into<String>) {
        self.extension = Some(extension.into());
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Set a tag's value, replacing any previous one. Inserting [`Tag::Extension`] sets the
    /// extension.
    pub fn insert(&mut self, tag: Tag, value: impl Into<String>) -> Option<String> {
        if tag == Tag::Extension {
            return self.extension.replace(value.into());
        }
        self.values.insert(tag, value.into())
    }

    /// Insert a value under a raw metadata key such as `album_artist` or `YEAR`. Returns whether the
    /// value was kept. Unknown keys are ignored, as is the reserved `extension` key. The first value
    /// for a tag wins, so aliases (`DATE` and `YEAR`) never clobber each other.
    pub fn insert_raw(&mut self, key: &str, value: impl Into<String>) -> bool {
        let tag = match Tag::resolve(key) {
            Ok(Tag::Extension) => {
                tracing::debug!("Ignoring reserved metadata key {key:?}");
                return false;
            }
            Ok(tag) => tag,
            Err(_) => {
                tracing::debug!("Ignoring unknown metadata key {key:?}");
                return false;
            }
        };
        if self.values.contains_key(&tag) {
            tracing::debug!("Ignoring duplicate metadata key {key:?}: {tag} already set");
            return false;
        }
        self.values.insert(tag, value.into());
        true
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut dictionary = Self::new();
        for (key, value) in pairs {
            dictionary.insert_raw(key.as_ref(), value);
        }
        dictionary
    }

    pub fn get(&self, tag: Tag) -> Option<&str> {
        if tag == Tag::Extension {
            return self.extension.as_deref();
        }
        self.values.get(&tag).map(String::as_str)
    }

    /// Number of metadata tags held, not counting the extension.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a dictionary from `ffprobe -print_format json -show_format -show_streams` output.
    /// Container-level tags take precedence over stream-level tags; Ogg and Opus files carry their
    /// comments on the audio stream, so both are consulted.
    pub fn from_ffprobe_json(json: &str) -> Result<Self> {
        let output: ProbeOutput = serde_json::from_str(json)
            .map_err(|e| TagpathExpectedError::Generic(format!("Failed to parse ffprobe output: {e}")))?;

        let mut dictionary = Self::new();
        let sections = output.format.into_iter().chain(output.streams);
        for section in sections {
            for (key, value) in section.tags {
                dictionary.insert_raw(&key, value);
            }
        }
        Ok(dictionary)
    }

    /// Read the tags of an audio file. The extension is preset to the file's own (lower-cased)
    /// extension; callers that transcode should override it with the output extension.
    ///
    /// Every key goes through [`TagDictionary::insert_raw`], so aliases such as `YEAR` or
    /// `ORIGINALYEAR` resolve the same way they do in [`TagDictionary::from_pairs`]. Vorbis comments
    /// (FLAC, Ogg Vorbis, Opus, Speex) are read with their raw keys; other formats go through
    /// lofty's generic tag, whose keys are mapped to their Vorbis names first.
    pub fn from_file(p: &Path) -> Result<Self> {
        let tag_read_error = |message: String| TagpathExpectedError::TagRead {
            path: p.to_path_buf(),
            message,
        };

        let probe = Probe::open(p)
            .map_err(|e| tag_read_error(format!("Failed to open file: {e}")))?
            .guess_file_type()
            .map_err(|e| tag_read_error(format!("Failed to guess file type: {e}")))?;

        let mut dictionary = Self::new();
        if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
            dictionary.set_extension(ext.to_lowercase());
        }

        let pairs = match probe.file_type() {
            Some(file_type @ (FileType::Flac | FileType::Opus | FileType::Vorbis | FileType::Speex)) => {
                let mut reader = probe.into_inner();
                read_vorbis_comments(&mut reader, file_type)
                    .map_err(|e| tag_read_error(format!("Failed to read file: {e}")))?
            }
            _ => {
                let tagged_file = probe.read().map_err(|e| tag_read_error(format!("Failed to read file: {e}")))?;
                let mut pairs = Vec::new();
                if let Some(file_tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
                    for item in file_tag.items() {
                        let key = item.key().map_key(TagType::VorbisComments, true);
                        if let (Some(key), Some(text)) = (key, item.value().text()) {
                            pairs.push((key.to_string(), text.to_string()));
                        }
                    }
                }
                pairs
            }
        };

        if pairs.is_empty() {
            tracing::debug!("No tags found in {}", p.display());
        }
        for (key, value) in pairs {
            dictionary.insert_raw(&key, value);
        }

        tracing::debug!("Read {} tags from {}", dictionary.len(), p.display());
        Ok(dictionary)
    }
}

/// Raw `(key, value)` comment pairs, in file order. A FLAC file without a comment block has none.
fn read_vorbis_comments<R>(reader: &mut R, file_type: FileType) -> lofty::error::Result<Vec<(String, String)>>
where
    R: Read + Seek,
{
    let options = ParseOptions::new();
    let comments = match file_type {
        FileType::Flac => FlacFile::read_from(reader, options)?.remove_vorbis_comments(),
        FileType::Opus => Some(OpusFile::read_from(reader, options)?.remove_vorbis_comments()),
        FileType::Vorbis => Some(VorbisFile::read_from(reader, options)?.remove_vorbis_comments()),
        FileType::Speex => Some(SpeexFile::read_from(reader, options)?.remove_vorbis_comments()),
        _ => None,
    };
    Ok(comments
        .map(|c| c.items().map(|(k, v)| (k.to_string(), v.to_string())).collect())
        .unwrap_or_default())
}

impl MetadataProvider for TagDictionary {
    fn lookup(&self, tag: Tag) -> Option<&str> {
        self.get(tag)
    }
}

impl MetadataProvider for HashMap<Tag, String> {
    fn lookup(&self, tag: Tag) -> Option<&str> {
        self.get(&tag).map(String::as_str)
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: Option<ProbeSection>,
    #[serde(default)]
    streams: Vec<ProbeSection>,
}

#[derive(Debug, Deserialize)]
struct ProbeSection {
    // Sorted so alias collisions inside one section resolve the same way every run.
    #[serde(default)]
    tags: BTreeMap<String, String>,
}
