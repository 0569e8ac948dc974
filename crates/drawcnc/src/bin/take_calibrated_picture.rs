//! Capture one board picture, fix its perspective and write it out.
//!
//! ```text
//! take-calibrated-picture [OUTPUT] [--device PATH] [--config JSON] [--format FMT]
//! ```
//!
//! With no OUTPUT (or `-`) the image goes to stdout, so it can be piped into
//! a bitmap tracer: `take-calibrated-picture --format pnm | potrace -s`.

use std::path::PathBuf;

use clap::Parser;
use drawcnc::camera::{Camera, CaptureError};
use drawcnc::output::{OutputFormat, OutputTarget};
use drawcnc::{run, PipelineConfig, PipelineError, PipelineReport};

#[derive(Parser, Debug)]
#[command(
    name = "take-calibrated-picture",
    version,
    about = "Capture a board photo and rectify its perspective"
)]
struct Cli {
    /// Output image path; omit or use `-` for stdout.
    output: Option<String>,

    /// Camera device or still frame to read.
    #[arg(long, env = "DRAWCNC_CAMERA")]
    device: Option<PathBuf>,

    /// JSON pipeline configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Force the output encoding (jpeg, png, pnm, bmp).
    #[arg(long, value_parser = parse_format)]
    format: Option<OutputFormat>,

    /// More log output (repeat for more).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only fatal errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) {
    let level = drawcnc::core::level_from_verbosity(cli.verbose, cli.quiet);
    if let Err(err) = drawcnc::core::init_with_level(level) {
        eprintln!("failed to install logger: {err}");
    }
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) {
    // `log` records are bridged into the subscriber by `init_tracing`.
    let level = drawcnc::core::level_from_verbosity(cli.verbose, cli.quiet);
    drawcnc::core::init_tracing(&level.to_string().to_lowercase());
}

// Camera lives only inside this call, so it is released before the process
// exits on any path.
fn capture(cli: &Cli) -> Result<PipelineReport, PipelineError> {
    let cfg = match &cli.config {
        Some(path) => PipelineConfig::load_json(path)?,
        None => PipelineConfig::default(),
    };
    let target = OutputTarget::parse(cli.output.as_deref());
    let mut camera = Camera::open(cli.device.as_deref())?;
    run(&mut camera, &cfg, &target, cli.format)
}

fn fatal_message(err: &PipelineError) -> String {
    match err {
        PipelineError::Capture(CaptureError::NoCamera) => "No camera detected.".to_string(),
        PipelineError::Capture(_) => "Invalid captured frame.".to_string(),
        PipelineError::Correct(inner) => {
            format!("Unable to fix perspective: Error {}. ({inner})", inner.code())
        }
        other => format!("Error: {other}"),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    match capture(&cli) {
        Ok(report) => log::info!(
            "{}x{} {} image, {} bytes",
            report.width,
            report.height,
            report.format,
            report.bytes
        ),
        Err(err) => {
            eprintln!("{}", fatal_message(&err));
            std::process::exit(err.exit_code());
        }
    }
}
