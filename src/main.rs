use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imgfetch::core::config::MAX_WORKERS;
use imgfetch::core::terminal::{self, TerminalReport};
use imgfetch::{
    load_bitmap, CellGridConfig, Color, ColorMode, DitherMode, Pipeline, RenderError, ScaleMode,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an image into the terminal
    Render {
        image: PathBuf,
        #[arg(short, long, value_enum, default_value_t = DitherMode::None)]
        dither: DitherMode,
        #[arg(
            short,
            long,
            default_value = "000000",
            help = "Background for transparent pixels, RRGGBB"
        )]
        matte: String,
        #[arg(
            long,
            value_parser = clap::value_parser!(u16).range(2..),
            help = "Rows to draw instead of the terminal height"
        )]
        rows: Option<u16>,
        #[arg(
            long,
            value_parser = clap::value_parser!(u16).range(2..),
            help = "Columns to draw instead of the terminal width"
        )]
        cols: Option<u16>,
        #[arg(long, value_enum, default_value_t = ScaleMode::Fill)]
        scale: ScaleMode,
        #[arg(long, value_enum, default_value_t = ColorMode::Truecolor)]
        colors: ColorMode,
        #[arg(
            long,
            value_parser = clap::value_parser!(u16).range(1..=MAX_WORKERS as i64),
            help = "Render threads (defaults to the CPU count)"
        )]
        workers: Option<u16>,
        #[arg(
            long,
            default_value_t = false,
            help = "Keep the screen instead of clearing it first"
        )]
        no_clear: bool,
    },
    /// Query the terminal size as crossterm sees it
    TerminalSize,
}

fn main() -> ExitCode {
    // stdout carries the image, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imgfetch=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).without_time())
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err
                .downcast_ref::<RenderError>()
                .map_or(1, RenderError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Render {
            image,
            dither,
            matte,
            rows,
            cols,
            scale,
            colors,
            workers,
            no_clear,
        } => {
            let matte: Color = matte.parse().map_err(RenderError::from)?;

            let detected = match (cols, rows) {
                (Some(cols), Some(rows)) => (cols, rows),
                _ => terminal::detected_size()?,
            };
            let grid = terminal::resolve_grid(detected, cols, rows)?;

            let mut builder = CellGridConfig::builder(grid.cols, grid.rows)
                .matte(matte)
                .scale(scale)
                .dither(dither)
                .color_mode(colors);
            if let Some(workers) = workers {
                builder = builder.workers(usize::from(workers));
            }
            let config = builder.build()?;
            info!(
                cols = grid.cols,
                rows = grid.rows,
                ?dither,
                ?scale,
                ?colors,
                workers = config.workers(),
                "render config"
            );

            let bitmap = load_bitmap(&image).context("Failed to load image")?;
            let stream = Pipeline::new(&config)
                .run(bitmap)
                .context("Failed to render image")?;

            let tty = terminal::is_terminal();
            let mut stdout = io::stdout().lock();
            terminal::write_stream(&mut stdout, &stream, tty && !no_clear, tty)?;
        }
        Commands::TerminalSize => {
            let report = TerminalReport::new(terminal::detected_size()?);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
