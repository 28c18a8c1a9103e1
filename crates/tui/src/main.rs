mod renderer;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use periodgrid_core::{GridConfig, Session, View, html};
use periodgrid_protocol::RawMeta;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for periodgrid
#[derive(Parser, Debug)]
#[command(name = "periodgrid")]
#[command(about = "Weekly timetable grid viewer and HTML exporter")]
#[command(version)]
struct Args {
    /// Schedule payload or raw timetable export (JSON)
    schedule: PathBuf,

    /// Grid config file (TOML)
    #[arg(short, long, env = "PERIODGRID_CONFIG")]
    config: Option<PathBuf>,

    /// Entity set shown first: classes or teachers
    #[arg(long, default_value = "classes")]
    view: View,

    /// Open the times row of this day (0-based); repeatable
    #[arg(long = "times", value_name = "DAY")]
    times: Vec<usize>,

    /// Write the grid as a standalone HTML document instead of opening the viewer
    #[arg(long, value_name = "FILE")]
    html: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref(), args.html.is_none())?;

    let config = load_config(args.config.as_deref())?;
    let data = fs::read(&args.schedule)
        .with_context(|| format!("reading {}", args.schedule.display()))?;
    let mut session = Session::load(&data, config)
        .with_context(|| format!("loading schedule from {}", args.schedule.display()))?;

    session.set_view(args.view);
    for &day in &args.times {
        session
            .toggle_times_row(day)
            .with_context(|| format!("opening times row {day}"))?;
    }

    if let Some(out) = &args.html {
        let title = session
            .schedule()
            .meta
            .as_ref()
            .and_then(RawMeta::display_name)
            .unwrap_or(&session.config().unnamed_title);
        let document = html::render_document(&session.render(), title);
        fs::write(out, document).with_context(|| format!("writing {}", out.display()))?;
        info!(path = %out.display(), view = %session.view(), "exported grid");
        return Ok(());
    }

    renderer::render_tui(&mut session)
}

/// The viewer owns the terminal, so interactive runs only log when a file
/// is given.
fn init_tracing(log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("periodgrid=info"));
    let registry = tracing_subscriber::registry().with(filter);
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        None if !interactive => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        None => {}
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GridConfig> {
    let Some(path) = path else {
        return Ok(GridConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}
