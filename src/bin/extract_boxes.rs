use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::error;
use pdfboxes::{DirectorySink, ExtractionConfig, OutlineRenderer, extract_document};

#[derive(Debug, Parser)]
#[command(about = "Capture the outermost drawn boxes of PDF pages as PNG files.")]
struct Args {
    /// Input PDF files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory. With several inputs each document gets a subdirectory named after it
    #[arg(short, long, default_value = "output_box")]
    output_dir: PathBuf,

    /// Minimum box width in page units
    #[arg(long)]
    min_width: Option<f32>,

    /// Minimum box height in page units
    #[arg(long)]
    min_height: Option<f32>,

    /// Boxes covering more than this fraction of the page are ignored
    #[arg(long)]
    max_area_fraction: Option<f32>,

    /// Shapes whose origin and size differ by less than this are duplicates
    #[arg(long)]
    dedup_tolerance: Option<f32>,

    /// Margin around each box so strokes are not clipped
    #[arg(long)]
    clip_padding: Option<f32>,

    /// Raster zoom factor
    #[arg(long)]
    scale: Option<f32>,

    /// Also save embedded images that pass the size and duplicate filters
    #[arg(long)]
    images: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = build_config(&args);
    if let Err(err) = config.validate() {
        error!("{err}");
        return ExitCode::FAILURE;
    }

    let renderer = OutlineRenderer::new();
    let mut failed = 0;
    for input in &args.inputs {
        let output = output_dir_for(&args, input);
        let mut sink = DirectorySink::new(&output);
        match extract_document(input, &config, None, &renderer, &mut sink) {
            Ok(summary) => {
                println!("{}", "-".repeat(30));
                println!("Extraction complete: {}", input.display());
                println!("{summary}");
                println!("Output directory: {}", output.display());
            }
            Err(err) => {
                error!("failed to process {}: {err}", input.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn build_config(args: &Args) -> ExtractionConfig {
    let mut config = ExtractionConfig::default().with_images(args.images);

    if let Some(min_width) = args.min_width {
        config.min_width = min_width;
    }

    if let Some(min_height) = args.min_height {
        config.min_height = min_height;
    }

    if let Some(fraction) = args.max_area_fraction {
        config.max_area_fraction = fraction;
    }

    if let Some(tolerance) = args.dedup_tolerance {
        config.dedup_tolerance = tolerance;
    }

    if let Some(padding) = args.clip_padding {
        config.clip_padding = padding;
    }

    if let Some(scale) = args.scale {
        config.render_scale = scale;
    }

    config
}

fn output_dir_for(args: &Args, input: &Path) -> PathBuf {
    if args.inputs.len() == 1 {
        return args.output_dir.clone();
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_owned());
    args.output_dir.join(stem)
}
