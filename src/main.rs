mod color;
mod config;
mod extractor;
mod logging;
mod pipeline;
mod scheme;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};

use crate::color::ModeRequest;
use crate::config::{Config, validate_alpha};
use crate::extractor::MatugenExtractor;
use crate::pipeline::{GenerateParams, OutputTarget, generate};
use crate::scheme::{PaletteStyle, Selection};

#[derive(Parser, Debug)]
#[command(name = "dcolgen")]
#[command(about = "Derive a .dcol theme descriptor from an image's extracted colors")]
struct Cli {
    /// Image to derive the theme from
    image: PathBuf,

    /// Accent curve style
    #[arg(long, value_enum)]
    palette: Option<PaletteStyle>,

    /// Theme polarity; `auto` classifies the extracted background
    #[arg(long, value_enum)]
    mode: Option<ModeRequest>,

    /// How the four primaries are picked from the extracted roles
    #[arg(long, value_enum)]
    selection: Option<Selection>,

    /// Alpha used for the `_rgba` values (0 to 1)
    #[arg(long, value_parser = parse_alpha)]
    alpha: Option<f64>,

    /// Color extractor program
    #[arg(long)]
    extractor: Option<String>,

    /// Config file (defaults to <config dir>/dcolgen/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the descriptor instead of writing <image>.dcol
    #[arg(long)]
    stdout: bool,

    /// Log debug details
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Flags win over config values.
    fn params(&self, config: &Config) -> GenerateParams {
        GenerateParams {
            image: self.image.clone(),
            style: self.palette.unwrap_or(config.palette),
            mode: self.mode.unwrap_or(config.mode),
            selection: self.selection.unwrap_or(config.selection),
            alpha: self.alpha.unwrap_or(config.alpha),
            target: if self.stdout {
                OutputTarget::Stdout
            } else {
                OutputTarget::File
            },
        }
    }
}

fn parse_alpha(raw: &str) -> Result<f64, String> {
    let alpha: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    validate_alpha(alpha)?;
    Ok(alpha)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose) {
        eprintln!("warning: logging disabled: {e}");
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let extractor_program = cli.extractor.as_deref().unwrap_or(&config.extractor);
    let extractor = MatugenExtractor::new(extractor_program);

    match generate(&cli.params(&config), &extractor) {
        Ok(generated) => {
            info!("Generated {} theme", generated.descriptor.mode);
            if generated.written_to.is_none() {
                let mut stdout = std::io::stdout().lock();
                if let Err(e) = stdout.write_all(generated.text.as_bytes()) {
                    warn!("Failed writing descriptor to stdout: {e}");
                    eprintln!("error: {e}");
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
