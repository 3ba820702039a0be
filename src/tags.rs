/// The tags module holds the closed registry of tag identifiers that patterns may reference, and the
/// single normalizing boundary that turns the raw text inside a `{...}` token (or a raw metadata key)
/// into one of them.
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::TemplateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Tag {
    AcoustId,
    Album,
    AlbumArtist,
    AlbumArtistSort,
    AlbumSort,
    Arranger,
    Artist,
    Artists,
    ArtistSort,
    Asin,
    Barcode,
    Bpm,
    CatalogNumber,
    Comment,
    Compilation,
    Composer,
    ComposerSort,
    Conductor,
    Copyright,
    Date,
    Description,
    DiscNumber,
    DiscSubtitle,
    DiscTotal,
    DjMixer,
    EncodedBy,
    Encoder,
    Engineer,
    Genre,
    Grouping,
    InitialKey,
    Isrc,
    Label,
    Language,
    License,
    Lyricist,
    Lyrics,
    Media,
    Mixer,
    Mood,
    Movement,
    MovementName,
    MovementTotal,
    MusicBrainzAlbumArtistId,
    MusicBrainzAlbumId,
    MusicBrainzArtistId,
    MusicBrainzReleaseGroupId,
    MusicBrainzReleaseTrackId,
    MusicBrainzTrackId,
    MusicBrainzWorkId,
    OriginalDate,
    OrigYear,
    Performer,
    Producer,
    Publisher,
    Rating,
    ReleaseCountry,
    ReleaseStatus,
    ReleaseType,
    Remixer,
    Script,
    Subtitle,
    Title,
    TitleSort,
    TrackNumber,
    TrackTotal,
    Version,
    Website,
    Work,
    Writer,
    /// The output file extension. Never read from file metadata; the caller supplies it.
    Extension,
}

impl Tag {
    pub const ALL: [Tag; 71] = [
        Tag::AcoustId,
        Tag::Album,
        Tag::AlbumArtist,
        Tag::AlbumArtistSort,
        Tag::AlbumSort,
        Tag::Arranger,
        Tag::Artist,
        Tag::Artists,
        Tag::ArtistSort,
        Tag::Asin,
        Tag::Barcode,
        Tag::Bpm,
        Tag::CatalogNumber,
        Tag::Comment,
        Tag::Compilation,
        Tag::Composer,
        Tag::ComposerSort,
        Tag::Conductor,
        Tag::Copyright,
        Tag::Date,
        Tag::Description,
        Tag::DiscNumber,
        Tag::DiscSubtitle,
        Tag::DiscTotal,
        Tag::DjMixer,
        Tag::EncodedBy,
        Tag::Encoder,
        Tag::Engineer,
        Tag::Genre,
        Tag::Grouping,
        Tag::InitialKey,
        Tag::Isrc,
        Tag::Label,
        Tag::Language,
        Tag::License,
        Tag::Lyricist,
        Tag::Lyrics,
        Tag::Media,
        Tag::Mixer,
        Tag::Mood,
        Tag::Movement,
        Tag::MovementName,
        Tag::MovementTotal,
        Tag::MusicBrainzAlbumArtistId,
        Tag::MusicBrainzAlbumId,
        Tag::MusicBrainzArtistId,
        Tag::MusicBrainzReleaseGroupId,
        Tag::MusicBrainzReleaseTrackId,
        Tag::MusicBrainzTrackId,
        Tag::MusicBrainzWorkId,
        Tag::OriginalDate,
        Tag::OrigYear,
        Tag::Performer,
        Tag::Producer,
        Tag::Publisher,
        Tag::Rating,
        Tag::ReleaseCountry,
        Tag::ReleaseStatus,
        Tag::ReleaseType,
        Tag::Remixer,
        Tag::Script,
        Tag::Subtitle,
        Tag::Title,
        Tag::TitleSort,
        Tag::TrackNumber,
        Tag::TrackTotal,
        Tag::Version,
        Tag::Website,
        Tag::Work,
        Tag::Writer,
        Tag::Extension,
    ];

    /// The canonical name: the key under which the tag is stored in file metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::AcoustId => "ACOUSTID_ID",
            Tag::Album => "ALBUM",
            Tag::AlbumArtist => "ALBUMARTIST",
            Tag::AlbumArtistSort => "ALBUMARTISTSORT",
            Tag::AlbumSort => "ALBUMSORT",
            Tag::Arranger => "ARRANGER",
            Tag::Artist => "ARTIST",
            Tag::Artists => "ARTISTS",
            Tag::ArtistSort => "ARTISTSORT",
            Tag::Asin => "ASIN",
            Tag::Barcode => "BARCODE",
            Tag::Bpm => "BPM",
            Tag::CatalogNumber => "CATALOGNUMBER",
            Tag::Comment => "COMMENT",
            Tag::Compilation => "COMPILATION",
            Tag::Composer => "COMPOSER",
            Tag::ComposerSort => "COMPOSERSORT",
            Tag::Conductor => "CONDUCTOR",
            Tag::Copyright => "COPYRIGHT",
            Tag::Date => "DATE",
            Tag::Description => "DESCRIPTION",
            Tag::DiscNumber => "DISCNUMBER",
            Tag::DiscSubtitle => "DISCSUBTITLE",
            Tag::DiscTotal => "DISCTOTAL",
            Tag::DjMixer => "DJMIXER",
            Tag::EncodedBy => "ENCODEDBY",
            Tag::Encoder => "ENCODER",
            Tag::Engineer => "ENGINEER",
            Tag::Genre => "GENRE",
            Tag::Grouping => "GROUPING",
            Tag::InitialKey => "INITIALKEY",
            Tag::Isrc => "ISRC",
            Tag::Label => "LABEL",
            Tag::Language => "LANGUAGE",
            Tag::License => "LICENSE",
            Tag::Lyricist => "LYRICIST",
            Tag::Lyrics => "LYRICS",
            Tag::Media => "MEDIA",
            Tag::Mixer => "MIXER",
            Tag::Mood => "MOOD",
            Tag::Movement => "MOVEMENT",
            Tag::MovementName => "MOVEMENTNAME",
            Tag::MovementTotal => "MOVEMENTTOTAL",
            Tag::MusicBrainzAlbumArtistId => "MUSICBRAINZ_ALBUMARTISTID",
            Tag::MusicBrainzAlbumId => "MUSICBRAINZ_ALBUMID",
            Tag::MusicBrainzArtistId => "MUSICBRAINZ_ARTISTID",
            Tag::MusicBrainzReleaseGroupId => "MUSICBRAINZ_RELEASEGROUPID",
            Tag::MusicBrainzReleaseTrackId => "MUSICBRAINZ_RELEASETRACKID",
            Tag::MusicBrainzTrackId => "MUSICBRAINZ_TRACKID",
            Tag::MusicBrainzWorkId => "MUSICBRAINZ_WORKID",
            Tag::OriginalDate => "ORIGINALDATE",
            Tag::OrigYear => "ORIGYEAR",
            Tag::Performer => "PERFORMER",
            Tag::Producer => "PRODUCER",
            Tag::Publisher => "PUBLISHER",
            Tag::Rating => "RATING",
            Tag::ReleaseCountry => "RELEASECOUNTRY",
            Tag::ReleaseStatus => "RELEASESTATUS",
            Tag::ReleaseType => "RELEASETYPE",
            Tag::Remixer => "REMIXER",
            Tag::Script => "SCRIPT",
            Tag::Subtitle => "SUBTITLE",
            Tag::Title => "TITLE",
            Tag::TitleSort => "TITLESORT",
            Tag::TrackNumber => "TRACKNUMBER",
            Tag::TrackTotal => "TRACKTOTAL",
            Tag::Version => "VERSION",
            Tag::Website => "WEBSITE",
            Tag::Work => "WORK",
            Tag::Writer => "WRITER",
            Tag::Extension => "extension",
        }
    }

    /// Resolve raw token text to a tag. The first underscore is stripped and the remainder is
    /// upper-cased before the lookup, so `album_artist`, `AlbumArtist` and `ALBUMARTIST` all name
    /// the same tag.
    pub fn resolve(raw: &str) -> Result<Tag, TemplateError> {
        REGISTRY
            .get(normalize(raw).as_str())
            .copied()
            .ok_or_else(|| TemplateError::MalformedToken { raw: raw.to_string() })
    }
}

fn normalize(raw: &str) -> String {
    raw.replacen('_', "", 1).to_uppercase()
}

/// Extra spellings accepted on top of each tag's own (normalized) canonical name.
const ALIASES: &[(&str, Tag)] = &[
    ("DISC", Tag::DiscNumber),
    ("TRACK", Tag::TrackNumber),
    ("YEAR", Tag::Date),
    ("ORIGINALYEAR", Tag::OrigYear),
    ("TOTALTRACKS", Tag::TrackTotal),
    ("TOTALDISCS", Tag::DiscTotal),
    ("KEY", Tag::InitialKey),
];

/// Normalized name -> tag. Canonical names pass through the same normalization as raw input, so
/// `MUSICBRAINZ_ALBUMID` is keyed as `MUSICBRAINZALBUMID` and `extension` as `EXTENSION`.
static REGISTRY: Lazy<HashMap<String, Tag>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tag in Tag::ALL {
        map.insert(normalize(tag.as_str()), tag);
    }
    for (alias, tag) in ALIASES {
        map.insert((*alias).to_string(), *tag);
    }
    map
});

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tag {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::resolve(s)
    }
}

impl TryFrom<String> for Tag {
    type Error = TemplateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Tag::resolve(&value)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.as_str().to_string()
    }
}
