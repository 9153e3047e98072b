use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use ocr_format::{Config, Method, Thresholding};

#[derive(Parser, Debug)]
#[command(
    name = "ocr-format",
    version,
    about = "OCR an image and keep its indentation, alignment and spacing"
)]
struct Cli {
    /// Image to run OCR on
    image: PathBuf,

    /// with_format (layout from word boxes), none (engine text) or stackoverflow (block grouping)
    #[arg(short = 'm', long = "method")]
    method: Option<String>,

    /// otsu, otsu_gaussian, adaptative_gaussian or all
    #[arg(short = 't', long = "thresholding")]
    thresholding: Option<String>,

    /// Language code(s) for tesseract, combined with '+' (e.g. eng+fra)
    #[arg(short = 'l', long = "language")]
    language: Option<String>,

    /// Arguments passed to tesseract verbatim
    #[arg(short = 'a', long = "tesseract-args", allow_hyphen_values = true)]
    tesseract_args: Option<String>,

    /// Write the result to this file, replacing its content
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Only print the result, no logs
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Enable debug logging
    #[arg(long = "verbose")]
    verbose: bool,

    /// Write the selected words and line assignment as JSON next to the image
    #[arg(long = "debug-ocr")]
    debug_ocr: bool,

    /// Read extra settings from a local TOML file
    #[arg(short = 's', long = "settings")]
    settings: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    ocr_format::logging::init(cli.quiet, cli.verbose);

    let settings = ocr_format::settings::load_settings(cli.settings.as_deref())
        .with_context(|| "failed to load settings")?;

    let thresholding: Thresholding = cli
        .thresholding
        .as_deref()
        .unwrap_or(&settings.thresholding)
        .parse()?;
    let method: Method = cli.method.as_deref().unwrap_or(&settings.method).parse()?;

    let config = Config {
        image_path: cli.image,
        method,
        thresholding,
        language: cli.language.unwrap_or(settings.language),
        tesseract_args: cli.tesseract_args.unwrap_or(settings.tesseract_args),
        output_path: cli.output,
        quiet: cli.quiet,
        fallback_char_width: settings.fallback_char_width,
        debug_ocr: cli.debug_ocr,
    };

    if let Some(text) = ocr_format::run(&config)? {
        print!("{}", text);
    }
    Ok(())
}
