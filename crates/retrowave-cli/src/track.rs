use serde::{Deserialize, Serialize};
use std::fmt;

/// Which commentary sections the host wants
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Three short on-air lines per track
    #[default]
    Broadcast,
    /// Three research paragraphs per track
    Prep,
    /// Both
    Double,
}

impl OutputMode {
    pub fn shows_broadcast(&self) -> bool {
        matches!(self, OutputMode::Broadcast | OutputMode::Double)
    }

    pub fn shows_prep(&self) -> bool {
        matches!(self, OutputMode::Prep | OutputMode::Double)
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputMode::Broadcast => "Broadcast",
            OutputMode::Prep => "Prep",
            OutputMode::Double => "Double",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastData {
    pub artist: String,
    pub release: String,
    pub fusion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepData {
    pub artist_background: String,
    pub release_context: String,
    pub global_significance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub song_title: String,
    pub artist_name: String,
    pub broadcast: BroadcastData,
    pub prep: PrepData,
    pub spotify_url: String,
    pub artwork_url: String,
    pub album_title: String,
    pub sources: Vec<String>,
}

/// The message sent for a batch of `'Song Title' — Artist` lines
pub fn build_prompt(mode: OutputMode, tracks: &str) -> String {
    format!("Mode: {}\n{}", mode, tracks)
}
