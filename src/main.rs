//! Command-line interface for the PDF image recompressor.

use anyhow::Context;
use clap::Parser;
use pdf_compressor::{
    file_ops::compress_pdf_file, CompressOptions, DEFAULT_DEFLATE_LEVEL, DEFAULT_MAX_HEIGHT,
    DEFAULT_MAX_WIDTH,
};
use std::path::PathBuf;

/// Shrink a PDF by downscaling and re-encoding its embedded images
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PDF file path
    #[arg(short, long)]
    input: PathBuf,

    /// Output PDF file path
    #[arg(short, long)]
    output: PathBuf,

    /// JPEG quality (0-100)
    #[arg(short, long)]
    quality: u8,

    /// Maximum image width in pixels
    #[arg(long, default_value_t = DEFAULT_MAX_WIDTH)]
    max_width: u32,

    /// Maximum image height in pixels
    #[arg(long, default_value_t = DEFAULT_MAX_HEIGHT)]
    max_height: u32,

    /// zlib level (0-9) for the container wrap around JPEG payloads; 0 disables it
    #[arg(long, default_value_t = DEFAULT_DEFLATE_LEVEL)]
    deflate_level: u32,

    /// Keep interactive form fields instead of stripping them
    #[arg(long)]
    keep_form_fields: bool,

    /// Keep unreferenced objects instead of pruning them
    #[arg(long)]
    keep_unused_objects: bool,

    /// Verbose output (per-object log lines)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "warn" }),
    )
    .init();

    let options = CompressOptions {
        quality: args.quality,
        max_width: args.max_width,
        max_height: args.max_height,
        deflate_level: args.deflate_level,
        strip_form_fields: !args.keep_form_fields,
        prune_unused: !args.keep_unused_objects,
    };

    let summary = compress_pdf_file(&args.input, &args.output, &options)
        .with_context(|| format!("compressing {:?}", args.input))?;

    println!(
        "Done! {} images found: {} rewritten, {} skipped; {} unused objects pruned",
        summary.total_images,
        summary.rewritten,
        summary.skipped.len(),
        summary.pruned_objects
    );
    println!("Output saved to: {:?}", args.output);

    Ok(())
}
