use clap::{Parser, Subcommand};
use imgcomp::config::{self, AppConfig};
use imgcomp::debounce::Debouncer;
use imgcomp::ignore_log::IgnoreLog;
use imgcomp::imaging::{CropRatio, ScalingAlgorithm};
use imgcomp::output::{self, ComparisonReport};
use imgcomp::session::{self, ComparisonSession, SessionOptions, Side};
use imgcomp::tools::{self, CommandConverter, TrashService};
use std::io::BufRead;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "imgcomp")]
#[command(about = "Compare two images pixel by pixel")]
#[command(long_about = "\
Compare two images pixel by pixel

Loads two images (PNG, JPEG, TIFF, WebP, GIF, BMP, and JPEG XL through an
external converter), prints their dimensions and sizes, and computes an
amplified difference image with a mean absolute error.

Settings are read from imgcomp.toml in the working directory, or from the file
given with --config. Command-line flags override the file.

Run 'imgcomp gen-config' to generate a documented imgcomp.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./imgcomp.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Interpolation used for every resize
    #[arg(long, value_enum, global = true)]
    scaling_algo: Option<ScalingAlgorithm>,

    /// Move deleted files to the trash instead of removing them
    #[arg(long, global = true)]
    use_trash: bool,

    /// Disable the delete and ignore commands
    #[arg(long, global = true)]
    hide_management_controls: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare two images and report their difference
    Compare {
        first: PathBuf,
        second: PathBuf,
        /// Write the difference image (PNG) here
        #[arg(long)]
        diff_out: Option<PathBuf>,
        /// Write a slider frame (PNG) here
        #[arg(long)]
        slider_out: Option<PathBuf>,
        /// Slider position, 0.0 to 1.0
        #[arg(long, default_value_t = 0.5)]
        ratio: f64,
        /// Flat red for any difference instead of an amplified swatch
        #[arg(long)]
        monochrome: bool,
        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,
    },
    /// Render slider frames for ratios read from stdin, one per line
    Slide {
        first: PathBuf,
        second: PathBuf,
        /// Frame output (PNG), overwritten by each rendered ratio
        #[arg(long)]
        out: PathBuf,
    },
    /// Append a pair to the ignore log
    Ignore { first: PathBuf, second: PathBuf },
    /// Delete an image (to the trash with --use-trash)
    Delete { path: PathBuf },
    /// Print a stock imgcomp.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if matches!(cli.command, Command::GenConfig) {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = resolve_config(&cli)?;
    let trash = tools::require_trash(&config)?;
    let converter = CommandConverter::new(config.tools.converter.clone());
    let options = SessionOptions::from(&config);

    match cli.command {
        Command::Compare {
            first,
            second,
            diff_out,
            slider_out,
            ratio,
            monochrome,
            json,
        } => {
            let mut session = ComparisonSession::new(options, converter);
            session.load_pair(&first, &second)?;

            let result = session.compare(monochrome || config.diff.monochrome)?;
            let ignored = IgnoreLog::new(&config.ignore_log)
                .load()?
                .contains(&first, &second);

            if let Some(path) = &diff_out {
                result.visualization.save(path)?;
                log::info!("wrote difference image to {}", path.display());
            }
            if let Some(path) = &slider_out {
                if result.is_identical() {
                    log::info!("images are identical, no slider frame written");
                } else {
                    session.slider_frame(CropRatio::new(ratio))?.save(path)?;
                    log::info!("wrote slider frame to {}", path.display());
                }
            }

            let (Some(a), Some(b)) = (session.image(Side::First), session.image(Side::Second))
            else {
                return Ok(());
            };
            if json {
                let report = ComparisonReport {
                    first: a.into(),
                    second: b.into(),
                    diff: result.summary(),
                    ignored,
                };
                println!("{}", report.to_json()?);
            } else {
                output::print_image_summary(a);
                println!();
                output::print_image_summary(b);
                println!();
                output::print_diff_message(&result.summary());
                if ignored {
                    println!("Pair is already in {}", config.ignore_log);
                }
            }
        }
        Command::Slide { first, second, out } => {
            let mut session = ComparisonSession::new(options, converter);
            session.load_pair(&first, &second)?;
            run_slider(session, out, &config)?;
        }
        Command::Ignore { first, second } => {
            require_management(&config)?;
            IgnoreLog::new(&config.ignore_log).append(&first, &second)?;
        }
        Command::Delete { path } => {
            require_management(&config)?;
            session::delete_image(&path, trash.as_ref().map(|t| t as &dyn TrashService))?;
        }
        // printed before config loading
        Command::GenConfig => {}
    }

    Ok(())
}

/// Load the config file and apply command-line overrides.
fn resolve_config(cli: &Cli) -> Result<AppConfig, config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(Path::new("."))?,
    };
    if let Some(algo) = cli.scaling_algo {
        config.scaling_algorithm = algo;
    }
    if cli.use_trash {
        config.use_trash = true;
    }
    if cli.hide_management_controls {
        config.show_management_controls = false;
    }
    log::debug!("effective config: {:?}", config);
    Ok(config)
}

fn require_management(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.show_management_controls {
        Ok(())
    } else {
        Err("management controls are disabled (show_management_controls = false)".into())
    }
}

/// Feed stdin ratios through the debouncer; only the last of a burst renders.
fn run_slider(
    session: ComparisonSession<CommandConverter>,
    out: PathBuf,
    config: &AppConfig,
) -> std::io::Result<()> {
    let debouncer = Debouncer::new(config.debounce_window(), move |ratio: CropRatio| {
        match session.slider_frame(ratio) {
            Ok(frame) => match frame.save(&out) {
                Ok(()) => log::info!("ratio {:.3} -> {}", ratio.value(), out.display()),
                Err(e) => log::error!("failed to write {}: {}", out.display(), e),
            },
            Err(e) => log::error!("slider frame failed: {}", e),
        }
    });

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.parse::<f64>() {
            Ok(value) => debouncer.submit(CropRatio::new(value)),
            Err(_) => log::warn!("ignoring invalid ratio {:?}", line),
        }
    }
    debouncer.flush();
    Ok(())
}
