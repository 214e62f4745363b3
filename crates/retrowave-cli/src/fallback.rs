use crate::track::{BroadcastData, PrepData, Track};
use crate::transport::ChatResponse;

pub const INVALID_RESPONSE_WARNING: &str =
    "Received an invalid response. Displaying mock data as a fallback.";
pub const LIVE_CALL_FAILED_WARNING: &str =
    "Live API call failed (API keys may be missing). Displaying mock data as a fallback.";

/// What to show the host for one request
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub tracks: Vec<Track>,
    pub warning: Option<&'static str>,
}

/// Turn a relay response into tracks to display, substituting the sample set
/// whenever the live answer is unusable
pub fn resolve(response: &ChatResponse) -> Outcome {
    let content = match response.content.as_deref() {
        Some(content) if response.success && !content.is_empty() => content,
        _ => return with_warning(LIVE_CALL_FAILED_WARNING),
    };

    match serde_json::from_str::<Vec<Track>>(content) {
        Ok(tracks) => Outcome {
            tracks,
            warning: None,
        },
        Err(_) => with_warning(INVALID_RESPONSE_WARNING),
    }
}

fn with_warning(warning: &'static str) -> Outcome {
    Outcome {
        tracks: sample_tracks(),
        warning: Some(warning),
    }
}

pub fn sample_tracks() -> Vec<Track> {
    vec![
        Track {
            id: "track-1".to_string(),
            song_title: "Chan Chan".to_string(),
            artist_name: "Buena Vista Social Club".to_string(),
            broadcast: BroadcastData {
                artist: "Cuban collective revived by Ry Cooder, showcasing legendary son musicians.".to_string(),
                release: "1997, World Circuit/Nonesuch, from their iconic self-titled Havana sessions album.".to_string(),
                fusion: "Traditional son cubano that achieved massive global crossover success and acclaim.".to_string(),
            },
            prep: PrepData {
                artist_background: "The Buena Vista Social Club was a project initiated by World Circuit executive Nick Gold, produced by Ry Cooder. It brought together veteran Cuban musicians, many of whom were retired, to record an album that revived pre-revolutionary Cuban music styles.".to_string(),
                release_context: "The self-titled album, recorded in just six days in Havana in 1996 and released in 1997, became a surprise international bestseller. It won a Grammy Award and led to a Wim Wenders documentary, further catapulting the artists to global fame.".to_string(),
                global_significance: "The project is a landmark in world music, responsible for a worldwide revival of interest in traditional Cuban music. It represents a powerful moment of cultural preservation meeting international exchange, inspiring a generation of musicians and listeners.".to_string(),
            },
            spotify_url: "https://open.spotify.com/track/3zBhihYUHBmGd2bcQIobrF".to_string(),
            artwork_url: "https://i.scdn.co/image/ab67616d0000b273b9d4f6b9b4fdc7d9a3b2d2a4".to_string(),
            album_title: "Buena Vista Social Club".to_string(),
            sources: vec![
                "AllMusic".to_string(),
                "Discogs".to_string(),
                "World Circuit Records".to_string(),
                "Spotify oEmbed".to_string(),
            ],
        },
        Track {
            id: "track-2".to_string(),
            song_title: "Jóga".to_string(),
            artist_name: "Björk".to_string(),
            broadcast: BroadcastData {
                artist: "Icelandic innovator merging avant-garde classical arrangements with powerful electronic beats.".to_string(),
                release: "1997, One Little Indian, a pivotal lead single from her album *Homogenic*.".to_string(),
                fusion: "A unique fusion of lush, romantic orchestral strings with gritty, UK-inspired electronic textures.".to_string(),
            },
            prep: PrepData {
                artist_background: "Björk is an Icelandic singer, songwriter, composer, and producer known for her genre-defying work that bridges pop, avant-garde, and electronica. Her expressive voice and constant innovation have made her one of music's most respected and eclectic artists.".to_string(),
                release_context: "Released as the first single from her 1997 masterpiece *Homogenic*, 'Jóga' was co-produced with electronic artist Mark Bell. The song is dedicated to her best friend and is described by Björk as a tribute to Iceland's landscapes, with 'volcanic beats'.".to_string(),
                global_significance: "The track is a prime example of Björk's ability to blend disparate worlds. It masterfully combines Nordic orchestral sensibilities with the cutting-edge, club-driven electronic sounds of the UK, creating a sound that was both emotionally raw and sonically futuristic, influencing countless artists.".to_string(),
            },
            spotify_url: "https://open.spotify.com/track/3SktMqZmo3M9zbB7oKMIF7".to_string(),
            artwork_url: "https://i.scdn.co/image/ab67616d0000b273b2f8a73b1b0f7b5a0e9d8b4f".to_string(),
            album_title: "Homogenic".to_string(),
            sources: vec![
                "AllMusic".to_string(),
                "Pitchfork".to_string(),
                "Discogs".to_string(),
                "One Little Independent".to_string(),
                "Spotify oEmbed".to_string(),
            ],
        },
    ]
}
