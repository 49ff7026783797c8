//! PDF image-stream recompression.
//!
//! Walks a document's indirect object table, finds every raster image
//! XObject, downscales it to a maximum bounding box (preserving aspect
//! ratio) and re-encodes it as baseline JPEG at a caller-supplied quality,
//! then rewrites the stream payload and dictionary in place. Non-image
//! structure is left untouched apart from unused-object pruning and
//! optional form-field removal at save time.
//!
//! Transparency is flattened: rewritten images are always opaque
//! `DeviceRGB` with 8 bits per component.

#[cfg(target_arch = "wasm32")]
pub mod wasm;

mod pipeline;
mod plan;
mod raster;
mod recompress;
mod rewrite;
mod scan;

pub use lopdf::ObjectId;
pub use pipeline::{CompressSummary, SkipReason};
pub use plan::{plan_downscale, DownscalePlan};
pub use recompress::EncodedImage;

use lopdf::{Document, SaveOptions};
use std::path::PathBuf;
use thiserror::Error;

/// Default maximum image width in pixels (US Letter at 72 dpi).
pub const DEFAULT_MAX_WIDTH: u32 = 612;

/// Default maximum image height in pixels.
pub const DEFAULT_MAX_HEIGHT: u32 = 816;

/// Default zlib level for the container wrap around re-encoded JPEG bytes.
pub const DEFAULT_DEFLATE_LEVEL: u32 = 9;

/// Options for a compression run.
#[derive(Debug, Clone)]
pub struct CompressOptions {
    /// JPEG quality, conventionally 0-100. Values outside the encoder's
    /// accepted range are clamped by it rather than rejected.
    pub quality: u8,
    /// Images wider than this are scaled down.
    pub max_width: u32,
    /// Images taller than this are scaled down.
    pub max_height: u32,
    /// zlib level (0-9) for wrapping the JPEG payload; 0 disables the wrap.
    pub deflate_level: u32,
    /// Remove interactive form fields during finalization.
    pub strip_form_fields: bool,
    /// Remove unreferenced objects during finalization.
    pub prune_unused: bool,
}

impl CompressOptions {
    /// Options with the documented policy defaults. There is no default
    /// quality; every caller supplies one.
    pub fn new(quality: u8) -> Self {
        CompressOptions {
            quality,
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            deflate_level: DEFAULT_DEFLATE_LEVEL,
            strip_form_fields: true,
            prune_unused: true,
        }
    }
}

/// Document-level fatal errors. Per-image failures are not errors; they are
/// recorded as [`SkipReason`]s in the run summary.
#[derive(Debug, Error)]
pub enum CompressError {
    /// The input could not be read or parsed as a PDF.
    #[error("failed to load PDF: {0}")]
    Load(String),
    /// The document is encrypted and cannot be processed.
    #[error("document is encrypted")]
    Encrypted,
    /// The finalized document could not be written out.
    #[error("failed to save PDF: {0}")]
    Save(String),
    /// An I/O error at a specific filesystem path.
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// The path that triggered the error.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Compress a PDF held in memory and return the compressed bytes together
/// with the run summary.
pub fn compress_pdf_bytes(
    input: &[u8],
    options: &CompressOptions,
) -> Result<(Vec<u8>, CompressSummary), CompressError> {
    let mut doc = Document::load_mem(input).map_err(|e| CompressError::Load(e.to_string()))?;
    if doc.is_encrypted() {
        return Err(CompressError::Encrypted);
    }

    let mut summary = pipeline::process_document(&mut doc, options);
    pipeline::finalize(&mut doc, options, &mut summary);

    let mut output = Vec::new();
    doc.save_with_options(&mut output, full_compression_options())
        .map_err(|e| CompressError::Save(e.to_string()))?;

    Ok((output, summary))
}

/// Object streams plus xref streams, the save-time analogue of a PDF
/// writer's "full compression" mode. Existing stream payloads are not
/// re-compressed, so non-image objects survive byte-for-byte.
fn full_compression_options() -> SaveOptions {
    SaveOptions::builder()
        .use_object_streams(true)
        .use_xref_streams(true)
        .build()
}

#[cfg(not(target_arch = "wasm32"))]
pub mod file_ops {
    use super::*;
    use std::fs::File;
    use std::io::BufWriter;
    use std::path::Path;

    /// Compress the PDF at `input_path` into `output_path`.
    ///
    /// This is the whole-run entry point: load, rewrite every image
    /// XObject, strip form fields, prune unused objects, save with full
    /// compression. A save failure leaves no valid output; whatever was
    /// partially written must not be treated as a result.
    pub fn compress_pdf_file(
        input_path: &Path,
        output_path: &Path,
        options: &CompressOptions,
    ) -> Result<CompressSummary, CompressError> {
        let mut doc = Document::load(input_path)
            .map_err(|e| CompressError::Load(format!("{}: {}", input_path.display(), e)))?;
        if doc.is_encrypted() {
            return Err(CompressError::Encrypted);
        }

        let mut summary = pipeline::process_document(&mut doc, options);
        pipeline::finalize(&mut doc, options, &mut summary);

        let file = File::create(output_path).map_err(|source| CompressError::Io {
            path: output_path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        doc.save_with_options(&mut writer, full_compression_options())
            .map_err(|e| CompressError::Save(format!("{}: {}", output_path.display(), e)))?;

        Ok(summary)
    }
}
