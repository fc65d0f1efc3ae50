//! # Ground Station
//!
//! Telemetry ingestion and live video overlay for a drone ground-control
//! dashboard.
//!
//! The binary polls the telemetry record file, keeps the position trail up to
//! date and, while video is playing, annotates every displayed frame with the
//! latest snapshot.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use ground_station::config::Config;
use ground_station::presets::PresetStore;
use ground_station::station::GroundStation;
use ground_station::ticker::Ticker;

/// Configuration file read when `--config` is not given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Number of telemetry ticks between status log messages
const STATUS_LOG_INTERVAL_TICKS: u64 = 100;

/// File name prefix of the daily-rolling application log
const LOG_FILE_PREFIX: &str = "ground-station.log";

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "ground-station", version, about = "Drone ground station telemetry and video overlay")]
struct Args {
    /// Path to the TOML configuration file [default: config/default.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start video playback immediately
    #[arg(long)]
    play: bool,

    /// Video stream URL, overriding the configured one
    #[arg(long, conflicts_with = "preset")]
    video_url: Option<String>,

    /// Name of a saved connection preset to use for video
    #[arg(long)]
    preset: Option<String>,

    /// Save the last displayed frame as PNG on exit
    #[arg(long)]
    save_frame: Option<PathBuf>,
}

/// Main entry point for the ground station
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (defaults when the default file is absent)
///    - Set up logging with tracing subscriber
///    - Resolve the video URL from `--video-url` or `--preset`
///
/// 2. **Main Loop**
///    - Poll telemetry every `poll_interval_ms` and extend the trail
///    - While playing, show an annotated frame every `frame_interval_ms`
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Release the video stream
///    - Optionally save the last frame
///
/// # Errors
///
/// Returns error if the configuration is invalid, the named preset does not
/// exist, or the last frame cannot be saved.
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    let _log_guard = init_logging(&config)?;

    info!("Ground Station v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Some(url) = resolve_video_url(&args, &config)? {
        info!("Using video source {}", url);
        config.video.url = url;
    }

    let mut station = GroundStation::from_config(&config).context("Failed to set up ground station")?;

    let mut telemetry_ticker = Ticker::every(Duration::from_millis(config.telemetry.poll_interval_ms));
    let frame_period = Duration::from_millis(config.video.frame_interval_ms);
    let mut frame_ticker = Ticker::idle();

    if args.play || config.video.autoplay {
        match station.toggle_playback() {
            Ok(true) => frame_ticker.start(frame_period),
            Ok(false) => {}
            Err(e) => warn!("Video unavailable: {}", e),
        }
    }

    info!("Reading telemetry from {} every {}ms",
        config.telemetry.record_path.display(), config.telemetry.poll_interval_ms);
    info!("Press Ctrl+C to exit");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = telemetry_ticker.tick() => {
                let record = station.on_telemetry_tick();
                debug!("Telemetry {:?}: battery {:.2}% at ({:.6}, {:.6})",
                    record.provenance, record.battery_percentage,
                    record.fields.latitude, record.fields.longitude);

                if station.telemetry_ticks() % STATUS_LOG_INTERVAL_TICKS == 0 {
                    log_status(&station);
                }
            }

            _ = frame_ticker.tick() => {
                match station.on_frame_tick() {
                    Ok(Some(_)) => {}
                    Ok(None) => frame_ticker.cancel(),
                    Err(e) => {
                        error!("Video stopped: {}", e);
                        frame_ticker.cancel();
                    }
                }
            }

            result = &mut shutdown => {
                if let Err(e) = result {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
                info!("Shutdown signal received");
                break;
            }
        }
    }

    station.shutdown();

    if let Some(path) = &args.save_frame {
        match station.last_frame() {
            Some(frame) => {
                frame.save(path)
                    .with_context(|| format!("Failed to save frame to {}", path.display()))?;
                info!("Saved last frame to {}", path.display());
            }
            None => warn!("No frame was displayed, nothing saved to {}", path.display()),
        }
    }

    info!("Ground station stopped after {} telemetry ticks and {} frames",
        station.telemetry_ticks(), station.frames_shown());

    Ok(())
}

/// Load the configuration file.
///
/// Without `--config` the default file is read if present, otherwise the
/// built-in defaults apply. A path given explicitly must exist.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Path::new(DEFAULT_CONFIG_PATH),
        None => return Ok(Config::default()),
    };
    Config::load(path).with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Initialize logging to stdout and, when configured, a daily-rolling file.
///
/// The returned guard must be held until exit so buffered file output is flushed.
fn init_logging(config: &Config) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    match &config.logging.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (file_writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::io::stdout.and(file_writer))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            Ok(None)
        }
    }
}

/// Video URL requested on the command line, if any.
fn resolve_video_url(args: &Args, config: &Config) -> Result<Option<String>> {
    if let Some(url) = &args.video_url {
        return Ok(Some(url.clone()));
    }

    let Some(name) = &args.preset else {
        return Ok(None);
    };

    let store = PresetStore::load(&config.presets.path)?;
    let preset = store
        .get(name)
        .ok_or_else(|| anyhow!("No connection preset named '{}' in {}", name, store.path().display()))?;
    Ok(Some(preset.stream_url()))
}

fn log_status<C, R>(station: &GroundStation<C, R>)
where
    C: ground_station::video::VideoConnector,
    R: rand::Rng,
{
    let Some(readouts) = station.readouts() else {
        return;
    };
    let source = match station.latest() {
        Some(record) if record.is_live() => "live",
        _ => "simulated",
    };

    info!("Battery {} | {} | {} | trail {} points | video {} ({})",
        readouts.battery_label,
        readouts.gps_sats_label,
        readouts.position_label.as_deref().unwrap_or("no fix"),
        station.trail().len(),
        if station.is_playing() { "playing" } else { "stopped" },
        source);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use ground_station::presets::ConnectionPreset;
    use tempfile::TempDir;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["ground-station"]).unwrap();
        assert_eq!(args.config, None);
        assert!(!args.play);
        assert!(args.video_url.is_none());
        assert!(args.save_frame.is_none());
    }

    #[test]
    fn test_video_url_conflicts_with_preset() {
        let result = Args::try_parse_from([
            "ground-station", "--video-url", "testsrc://", "--preset", "field",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_status_interval_constant() {
        // At the default 100ms poll rate this is one status line every 10 seconds
        assert_eq!(STATUS_LOG_INTERVAL_TICKS, 100);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_explicit_default_path_is_not_optional() {
        let args = Args::try_parse_from(["ground-station", "--config", DEFAULT_CONFIG_PATH]).unwrap();
        assert_eq!(args.config.as_deref(), Some(Path::new(DEFAULT_CONFIG_PATH)));

        // The same relative path resolved elsewhere must fail rather than fall back
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join(DEFAULT_CONFIG_PATH);
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn test_config_without_flag_loads() {
        let config = load_config(None).unwrap();
        assert_eq!(config.telemetry.poll_interval_ms, 100);
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("station.toml");
        std::fs::write(&path, "[telemetry]\npoll_interval_ms = 250\n").unwrap();
        assert_eq!(load_config(Some(&path)).unwrap().telemetry.poll_interval_ms, 250);
    }

    #[test]
    fn test_resolve_video_url_from_preset() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.presets.path = dir.path().join("connection_presets.txt");

        let mut store = PresetStore::new(&config.presets.path);
        store.insert("field", ConnectionPreset::new("192.168.144.25", "8554")).unwrap();
        store.save().unwrap();

        let args = Args::try_parse_from(["ground-station", "--preset", "field"]).unwrap();
        assert_eq!(
            resolve_video_url(&args, &config).unwrap().as_deref(),
            Some("rtsp://192.168.144.25:8554/main.264")
        );

        let args = Args::try_parse_from(["ground-station", "--preset", "unknown"]).unwrap();
        assert!(resolve_video_url(&args, &config).is_err());
    }

    #[test]
    fn test_resolve_video_url_override() {
        let args = Args::try_parse_from(["ground-station", "--video-url", "testsrc://320x240"]).unwrap();
        assert_eq!(
            resolve_video_url(&args, &Config::default()).unwrap().as_deref(),
            Some("testsrc://320x240")
        );

        let args = Args::try_parse_from(["ground-station"]).unwrap();
        assert_eq!(resolve_video_url(&args, &Config::default()).unwrap(), None);
    }
}
