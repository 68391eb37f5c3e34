//! CLI command definitions and handlers.
//!
//! Each subcommand is implemented as a function that takes the parsed arguments
//! and returns an `anyhow::Result<()>`.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use crate::catalog::{self, AssetUrls, Catalog, playlist_rows};
use crate::config::{self, Config};
use crate::error::{Error, ResultExt};
use crate::player::{
    IconVariant, ObserverKind, PlaybackController, PlaybackState, RenderFrame, SimulatedMedia,
    TrackRef, identity,
};

/// Playdeck CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to the OS config directory)
    #[arg(long, global = true, env = config::CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Directory that relative catalog paths are resolved against
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// List the playlist in navigation order
    Playlist {
        /// Sectioned track list (overrides the config)
        #[arg(long)]
        data: Option<PathBuf>,
        /// Track metadata file (overrides the config)
        #[arg(long)]
        meta: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show how a track reference resolves against the playlist
    Resolve {
        /// Track reference, encoded or not
        reference: String,
    },
    /// Run a headless playback session and print every rendered frame
    Simulate {
        /// Steps: select:<ref>, loaded:<secs>, advance:<secs>, end, next,
        /// prev, toggle, seek:<fraction>, volume:<v>, fail:<message>
        #[arg(required = true)]
        steps: Vec<SimStep>,
        /// Don't autoplay the first playlist entry, even if configured
        #[arg(long)]
        no_autoplay: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML
    Config {
        /// Also save it to the config file
        #[arg(long)]
        write: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };

    match &cli.command {
        Commands::Playlist { data, meta, json } => {
            let mut config = config;
            if let Some(data) = data {
                config.catalog.songs_data = data.clone();
            }
            if let Some(meta) = meta {
                config.catalog.songs_meta = meta.clone();
            }
            cmd_playlist(&config, &cli.root, *json)
        }
        Commands::Resolve { reference } => cmd_resolve(&config, &cli.root, reference),
        Commands::Simulate {
            steps,
            no_autoplay,
            json,
        } => cmd_simulate(&config, &cli.root, steps, *no_autoplay, *json),
        Commands::Config { write } => cmd_config(&config, cli.config.as_deref(), *write),
    }
}

fn load_catalog(config: &Config, root: &Path) -> anyhow::Result<Catalog> {
    let catalog = catalog::load_catalog(&config.catalog, root)
        .with_context(format!("Failed to load catalog under {:?}", root))?;
    Ok(catalog)
}

fn cmd_config(config: &Config, path: Option<&Path>, write: bool) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    if !write {
        return Ok(());
    }

    let saved = match path {
        Some(path) => config::save_to(config, path),
        None => config::save(config),
    };
    saved.with_context("Failed to save config")?;
    println!("\nConfig saved.");
    Ok(())
}

fn cmd_playlist(config: &Config, root: &Path, json: bool) -> anyhow::Result<()> {
    let catalog = load_catalog(config, root)?;
    let assets = AssetUrls::new(&config.assets);
    let rows = playlist_rows(&catalog.playlist, &assets);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in &rows {
        match catalog.metadata.lookup(row.track.as_str()) {
            Some(meta) => println!(
                "{:>3}  {}  ({} - {})  {}",
                row.index,
                row.display_name,
                meta.title,
                meta.artists.join(", "),
                row.url
            ),
            None => println!("{:>3}  {}  {}", row.index, row.display_name, row.url),
        }
    }
    println!("\n{} tracks.", rows.len());
    Ok(())
}

fn cmd_resolve(config: &Config, root: &Path, reference: &str) -> anyhow::Result<()> {
    let catalog = load_catalog(config, root)?;
    let track = TrackRef::from(reference);

    println!("Reference:     {}", track);
    println!("Decoded:       {}", identity::percent_decode(track.as_str()));
    println!("Canonical key: {}", track.key());
    println!("Bare filename: {}", identity::bare_filename(track.as_str()));

    match catalog.playlist.locate(track.as_str()) {
        Some(index) => {
            let entry = catalog
                .playlist
                .get(index)
                .map(TrackRef::as_str)
                .unwrap_or_default();
            println!("Playlist:      #{} ({})", index, entry);
            if let Some(meta) = catalog.metadata.lookup(entry) {
                println!("Title:         {}", meta.title);
                println!("Artists:       {}", meta.artists.join(", "));
            }
        }
        None => println!("Playlist:      not found"),
    }
    Ok(())
}

/// Output of one simulation step.
#[derive(Debug, Serialize)]
struct StepReport {
    step: String,
    frames: Vec<RenderFrame>,
    state: PlaybackState,
}

fn cmd_simulate(
    config: &Config,
    root: &Path,
    steps: &[SimStep],
    no_autoplay: bool,
    json: bool,
) -> anyhow::Result<()> {
    let catalog = load_catalog(config, root)?;
    let assets = AssetUrls::new(&config.assets);
    let (media, events) = SimulatedMedia::new();
    let mut controller = PlaybackController::from_catalog(media, events, catalog, assets);

    controller.start(
        config.playback.volume,
        config.playback.autoplay_first && !no_autoplay,
    );
    let mut reports = vec![StepReport {
        step: "start".to_string(),
        frames: controller.pump(),
        state: controller.state().clone(),
    }];

    for step in steps {
        debug!(step = %step, "Applying step");
        step.apply(&mut controller);
        reports.push(StepReport {
            step: step.to_string(),
            frames: controller.pump(),
            state: controller.state().clone(),
        });
    }
    info!(steps = steps.len(), "Simulation finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    let observers = controller.projector().observers().to_vec();
    for report in &reports {
        println!("> {}", report.step);
        for frame in &report.frames {
            let playing: Vec<String> = observers
                .iter()
                .filter(|(id, _)| frame.icon(*id) == Some(IconVariant::Playing))
                .map(|(_, kind)| describe_observer(kind))
                .collect();
            println!(
                "  {} / {} ({:.1}%)  playing: [{}]{}",
                frame.elapsed,
                frame.total,
                frame.progress_percent,
                playing.join(", "),
                frame
                    .error
                    .as_ref()
                    .map(|e| format!("  error: {}", e))
                    .unwrap_or_default()
            );
        }
        println!(
            "  = loaded: {}, playing: {}, volume: {:.2}",
            report
                .state
                .loaded
                .as_ref()
                .map(TrackRef::as_str)
                .unwrap_or("-"),
            report.state.is_playing,
            report.state.volume
        );
    }
    Ok(())
}

fn describe_observer(kind: &ObserverKind) -> String {
    match kind {
        ObserverKind::MainButton => "main".to_string(),
        ObserverKind::PlaylistRow(track) => format!("row {}", track),
        ObserverKind::Card(track) => format!("card {}", track),
    }
}

// ============================================================================
// Simulation steps
// ============================================================================

/// One scripted action against a simulated session.
#[derive(Debug, Clone, PartialEq)]
pub enum SimStep {
    /// Click a row or card
    Select(TrackRef),
    /// The media primitive finished loading with this duration
    Loaded(f64),
    /// Playback clock advances
    Advance(f64),
    /// Current track plays to the end
    End,
    Next,
    Prev,
    Toggle,
    Seek(f64),
    Volume(f64),
    /// Network/decode failure
    Fail(String),
}

impl SimStep {
    fn apply(&self, controller: &mut PlaybackController<SimulatedMedia>) {
        match self {
            Self::Select(track) => controller.select(track),
            Self::Loaded(secs) => controller.session_mut().media_mut().complete_load(*secs),
            Self::Advance(secs) => controller.session_mut().media_mut().advance(*secs),
            Self::End => controller.session_mut().media_mut().finish(),
            Self::Next => {
                controller.next();
            }
            Self::Prev => {
                controller.previous();
            }
            Self::Toggle => controller.toggle(),
            Self::Seek(fraction) => controller.seek_to_fraction(*fraction),
            Self::Volume(volume) => controller.set_volume(*volume),
            Self::Fail(message) => controller.session_mut().media_mut().fail(message.clone()),
        }
    }
}

fn parse_number(step: &str, value: &str) -> Result<f64, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::invalid_input(format!("{}: expected a number, got {:?}", step, value)))
}

impl FromStr for SimStep {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };

        match (name.trim().to_lowercase().as_str(), arg) {
            ("select", Some(track)) if !track.is_empty() => Ok(Self::Select(TrackRef::from(track))),
            ("loaded", Some(v)) => parse_number(name, v).map(Self::Loaded),
            ("advance", Some(v)) => parse_number(name, v).map(Self::Advance),
            ("seek", Some(v)) => parse_number(name, v).map(Self::Seek),
            ("volume", Some(v)) => parse_number(name, v).map(Self::Volume),
            ("fail", arg) => Ok(Self::Fail(arg.unwrap_or("media error").to_string())),
            ("end", None) => Ok(Self::End),
            ("next", None) => Ok(Self::Next),
            ("prev" | "previous", None) => Ok(Self::Prev),
            ("toggle", None) => Ok(Self::Toggle),
            _ => Err(Error::invalid_input(format!("unknown step {:?}", s))),
        }
    }
}

impl fmt::Display for SimStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(track) => write!(f, "select:{}", track),
            Self::Loaded(secs) => write!(f, "loaded:{}", secs),
            Self::Advance(secs) => write!(f, "advance:{}", secs),
            Self::End => write!(f, "end"),
            Self::Next => write!(f, "next"),
            Self::Prev => write!(f, "prev"),
            Self::Toggle => write!(f, "toggle"),
            Self::Seek(fraction) => write!(f, "seek:{}", fraction),
            Self::Volume(volume) => write!(f, "volume:{}", volume),
            Self::Fail(message) => write!(f, "fail:{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::controller_with;

    #[test]
    fn test_parse_steps() {
        assert_eq!(
            "select:Song%20A.mp3".parse::<SimStep>().unwrap(),
            SimStep::Select(TrackRef::from("Song%20A.mp3"))
        );
        assert_eq!("loaded:180".parse::<SimStep>().unwrap(), SimStep::Loaded(180.0));
        assert_eq!("advance:2.5".parse::<SimStep>().unwrap(), SimStep::Advance(2.5));
        assert_eq!("seek:0.5".parse::<SimStep>().unwrap(), SimStep::Seek(0.5));
        assert_eq!("end".parse::<SimStep>().unwrap(), SimStep::End);
        assert_eq!("previous".parse::<SimStep>().unwrap(), SimStep::Prev);
        assert_eq!(
            "fail:404 not found".parse::<SimStep>().unwrap(),
            SimStep::Fail("404 not found".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_bad_steps() {
        assert!("seek:half".parse::<SimStep>().is_err());
        assert!("select:".parse::<SimStep>().is_err());
        assert!("rewind".parse::<SimStep>().is_err());
        assert!("end:now".parse::<SimStep>().is_err());
    }

    #[test]
    fn test_step_display_parses_back() {
        for text in ["select:B.mp3", "loaded:90", "toggle", "volume:0.3", "fail:decode"] {
            let step: SimStep = text.parse().unwrap();
            assert_eq!(step.to_string(), text);
        }
    }

    #[test]
    fn test_scripted_session() {
        let mut controller = controller_with(&["A.mp3", "B.mp3"]);
        let script = ["select:A.mp3", "loaded:10", "advance:4", "seek:0.5", "end"];
        for text in script {
            text.parse::<SimStep>().unwrap().apply(&mut controller);
            controller.pump();
        }
        assert_eq!(controller.state().loaded, Some(TrackRef::from("B.mp3")));
        assert!(controller.state().is_playing);
    }

    #[test]
    fn test_cli_parses_simulate() {
        let args = [
            "playdeck", "--root", "site", "simulate", "select:A.mp3", "toggle", "--json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.root, PathBuf::from("site"));
        match cli.command {
            Commands::Simulate { steps, json, .. } => {
                assert_eq!(steps.len(), 2);
                assert!(json);
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_config_write_saves_to_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.playback.volume = 0.25;

        cmd_config(&config, Some(&path), true).unwrap();
        assert_eq!(config::load_from(&path), config);
    }

    #[test]
    fn test_missing_catalog_error_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_catalog(&Config::default(), dir.path()).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("Failed to load catalog"));
        assert!(msg.contains("songsData.json"));
    }
}
