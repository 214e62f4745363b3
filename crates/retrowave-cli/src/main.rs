use anyhow::{bail, Context, Result};
use clap::Parser;
use cliclack::{input, spinner};
use console::style;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod fallback;
mod render;
mod track;
mod transport;

use track::{build_prompt, OutputMode};
use transport::{ChatService, DEFAULT_SERVER};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the retrowave relay
    #[arg(short, long, default_value = DEFAULT_SERVER)]
    server: String,

    /// Which commentary to generate
    #[arg(short, long, value_enum, default_value_t = OutputMode::Broadcast)]
    mode: OutputMode,

    /// Read tracks from a file, one `'Song Title' — Artist` per line
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Print the raw answer as it arrives
    #[arg(long)]
    stream: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    cliclack::intro(style(" retrowave radio ").on_magenta().black())?;

    let tracks = match &cli.file {
        Some(path) => read_track_file(path)?,
        None => require_tracks(
            input("Which tracks are on the playlist?")
                .placeholder("'Chan Chan' — Buena Vista Social Club")
                .multiline()
                .interact()?,
        )?,
    };

    let service = ChatService::new(&cli.server);
    let prompt = build_prompt(cli.mode, &tracks);

    let response = if cli.stream {
        let response = service
            .send_message_streaming(&prompt, |chunk| {
                print!("{}", style(chunk).dim());
                let _ = io::stdout().flush();
            })
            .await;
        println!();
        response
    } else {
        let spin = spinner();
        spin.start("researching tracks");
        let response = service.send_message(&prompt).await;
        spin.stop("research complete");
        response
    };

    let outcome = fallback::resolve(&response);
    if let Some(warning) = outcome.warning {
        cliclack::log::warning(warning)?;
    }
    if outcome.tracks.is_empty() {
        cliclack::log::info("The answer did not contain any tracks")?;
    }

    render::render(&outcome.tracks, cli.mode);

    cliclack::outro(format!("session {}", style(service.session_id()).dim()))?;
    Ok(())
}

fn read_track_file(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tracks from {}", path.display()))?;
    require_tracks(text)
}

fn require_tracks(text: String) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        bail!("Enter at least one track, e.g. 'Jóga' — Björk");
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input_is_rejected() {
        assert!(require_tracks("  \n\t".to_string()).is_err());
        assert_eq!(
            require_tracks("\n'Jóga' — Björk\n".to_string()).unwrap(),
            "'Jóga' — Björk"
        );
    }

    #[test]
    fn test_read_track_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "'Chan Chan' — Buena Vista Social Club").unwrap();
        writeln!(file, "'Jóga' — Björk").unwrap();

        let tracks = read_track_file(file.path()).unwrap();
        assert_eq!(
            tracks,
            "'Chan Chan' — Buena Vista Social Club\n'Jóga' — Björk"
        );
    }

    #[test]
    fn test_empty_track_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(read_track_file(file.path()).is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["retrowave"]);
        assert_eq!(cli.server, "http://127.0.0.1:3000");
        assert_eq!(cli.mode, OutputMode::Broadcast);
        assert!(cli.file.is_none());
        assert!(!cli.stream);

        let cli = Cli::parse_from(["retrowave", "--mode", "double", "--stream"]);
        assert_eq!(cli.mode, OutputMode::Double);
        assert!(cli.stream);
    }
}
