use std::fs;
use std::path::Path;
use std::sync::Once;
use tempfile::TempDir;

use crate::config::Config;
use crate::metadata::TagDictionary;
use crate::sanitize::Sanitizer;
use crate::tags::Tag;
use crate::templates::PathTemplate;

static INIT: Once = Once::new();

pub fn init() -> TempDir {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
    TempDir::new().expect("failed to create temp dir")
}

/// A config rooted in `base`, using the default pattern and placeholder.
pub fn config(base: &Path) -> Config {
    Config {
        destination_dir: base.join("dest"),
        path_template: PathTemplate::default(),
        sanitizer: Sanitizer::default(),
        max_proc: 2,
        audio_extensions: vec!["flac".to_string(), "mp3".to_string(), "opus".to_string()],
    }
}

/// Tags for a track off a single-disc album with both an original and a reissue year.
pub fn sample_dictionary() -> TagDictionary {
    let mut d = TagDictionary::new().with_extension("flac");
    d.insert(Tag::AlbumArtist, "Air");
    d.insert(Tag::Album, "Moon Safari");
    d.insert(Tag::OrigYear, "1998");
    d.insert(Tag::Date, "2018");
    d.insert(Tag::DiscNumber, "1");
    d.insert(Tag::TrackNumber, "03");
    d.insert(Tag::Title, "Kelly Watch the Stars");
    d
}

/// Write a FLAC file with no audio frames whose only metadata besides STREAMINFO is a Vorbis
/// comment block holding `comments` verbatim, in order.
pub fn write_flac(path: &Path, comments: &[(&str, &str)]) {
    let mut bytes = b"fLaC".to_vec();
    // STREAMINFO: 4096-sample blocks, 44.1 kHz, stereo, 16 bit, zero samples, no MD5.
    bytes.extend([0x00, 0x00, 0x00, 0x22]);
    bytes.extend([0x10, 0x00, 0x10, 0x00, 0, 0, 0, 0, 0, 0]);
    bytes.extend([0x0A, 0xC4, 0x42, 0xF0, 0, 0, 0, 0]);
    bytes.extend([0; 16]);

    let mut block = Vec::new();
    let vendor = b"tagpath";
    block.extend((vendor.len() as u32).to_le_bytes());
    block.extend(vendor);
    block.extend((comments.len() as u32).to_le_bytes());
    for (key, value) in comments {
        let comment = format!("{key}={value}");
        block.extend((comment.len() as u32).to_le_bytes());
        block.extend(comment.as_bytes());
    }
    // VORBIS_COMMENT, flagged as the last metadata block.
    bytes.push(0x84);
    bytes.extend(&(block.len() as u32).to_be_bytes()[1..]);
    bytes.extend(block);

    fs::write(path, bytes).unwrap();
}

/// Write a two-sample mono WAV file carrying a RIFF INFO list with `info` (four-character keys).
pub fn write_wav(path: &Path, info: &[(&str, &str)]) {
    fn chunk(id: &[u8], content: &[u8]) -> Vec<u8> {
        let mut out = id.to_vec();
        out.extend((content.len() as u32).to_le_bytes());
        out.extend(content);
        out
    }

    let mut fmt = Vec::new();
    fmt.extend(1u16.to_le_bytes()); // PCM
    fmt.extend(1u16.to_le_bytes());
    fmt.extend(44100u32.to_le_bytes());
    fmt.extend(88200u32.to_le_bytes());
    fmt.extend(2u16.to_le_bytes());
    fmt.extend(16u16.to_le_bytes());

    let mut list = b"INFO".to_vec();
    for (key, value) in info {
        // NUL-terminated, padded with another NUL to keep every chunk even-sized.
        let mut text = value.as_bytes().to_vec();
        text.push(0);
        if text.len() % 2 != 0 {
            text.push(0);
        }
        list.extend(chunk(key.as_bytes(), &text));
    }

    let mut body = b"WAVE".to_vec();
    body.extend(chunk(b"fmt ", &fmt));
    body.extend(chunk(b"data", &[0; 4]));
    body.extend(chunk(b"LIST", &list));

    fs::write(path, chunk(b"RIFF", &body)).unwrap();
}
