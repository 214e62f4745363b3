use console::style;
use std::fmt::Write;

use crate::track::{OutputMode, Track};

/// One track as terminal text, with the sections the mode asks for
pub fn format_track(track: &Track, mode: OutputMode) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}",
        style(format!("{} — {}", track.song_title, track.artist_name))
            .bold()
            .magenta()
    );
    let _ = writeln!(out, "{} {}", style("Album:").dim(), track.album_title);

    if mode.shows_broadcast() {
        let _ = writeln!(out, "\n{}", style("Broadcast Bullets").cyan().bold());
        field(&mut out, "Artist", &track.broadcast.artist);
        field(&mut out, "Release", &track.broadcast.release);
        field(&mut out, "Fusion", &track.broadcast.fusion);
    }

    if mode.shows_prep() {
        let _ = writeln!(out, "\n{}", style("Prep Notes").cyan().bold());
        field(&mut out, "Artist Background", &track.prep.artist_background);
        field(&mut out, "Release Context", &track.prep.release_context);
        field(&mut out, "Global Significance", &track.prep.global_significance);
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} {}",
        style("Listen on Spotify:").dim(),
        style(&track.spotify_url).underlined()
    );
    let _ = writeln!(out, "{} {}", style("Artwork:").dim(), track.artwork_url);
    let _ = writeln!(
        out,
        "{} {}",
        style("Sources:").dim(),
        track.sources.join("; ")
    );
    out
}

fn field(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "  {} {}", style(format!("{}:", label)).bold(), value);
}

pub fn render(tracks: &[Track], mode: OutputMode) {
    for track in tracks {
        println!("{}", format_track(track, mode));
    }
}
