//! WebAssembly bindings for the PDF image recompressor.

use crate::{compress_pdf_bytes, CompressOptions};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Compress a PDF held in memory.
///
/// # Arguments
/// * `pdf_bytes` - The input PDF file as a byte array
/// * `quality` - JPEG quality 0-100 (no default; callers supply one)
/// * `max_width` / `max_height` - Bounding box overrides (default 612x816)
///
/// # Returns
/// The compressed PDF as a byte array, or throws an error
#[wasm_bindgen]
pub fn compress_pdf(
    pdf_bytes: &[u8],
    quality: u8,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> Result<Vec<u8>, JsError> {
    let mut options = CompressOptions::new(quality);
    if let Some(width) = max_width {
        options.max_width = width;
    }
    if let Some(height) = max_height {
        options.max_height = height;
    }

    let (output, _summary) =
        compress_pdf_bytes(pdf_bytes, &options).map_err(|e| JsError::new(&e.to_string()))?;

    Ok(output)
}

/// Compress a PDF and report per-run statistics alongside the bytes.
#[wasm_bindgen]
pub fn compress_pdf_with_summary(
    pdf_bytes: &[u8],
    quality: u8,
) -> Result<CompressResultJs, JsError> {
    let options = CompressOptions::new(quality);
    let (output, summary) =
        compress_pdf_bytes(pdf_bytes, &options).map_err(|e| JsError::new(&e.to_string()))?;

    Ok(CompressResultJs {
        pdf_bytes: output,
        total_images: summary.total_images,
        rewritten_images: summary.rewritten,
        skipped_images: summary.skipped.len(),
        pruned_objects: summary.pruned_objects,
    })
}

/// Result of a compression run with statistics
#[wasm_bindgen]
pub struct CompressResultJs {
    pdf_bytes: Vec<u8>,
    total_images: usize,
    rewritten_images: usize,
    skipped_images: usize,
    pruned_objects: usize,
}

#[wasm_bindgen]
impl CompressResultJs {
    /// Get the compressed PDF bytes
    #[wasm_bindgen(getter)]
    pub fn pdf_bytes(&self) -> Vec<u8> {
        self.pdf_bytes.clone()
    }

    /// Get the total number of image XObjects found
    #[wasm_bindgen(getter)]
    pub fn total_images(&self) -> usize {
        self.total_images
    }

    /// Get the number of images that were rewritten
    #[wasm_bindgen(getter)]
    pub fn rewritten_images(&self) -> usize {
        self.rewritten_images
    }

    /// Get the number of images that were skipped
    #[wasm_bindgen(getter)]
    pub fn skipped_images(&self) -> usize {
        self.skipped_images
    }

    /// Get the number of unreferenced objects pruned at save time
    #[wasm_bindgen(getter)]
    pub fn pruned_objects(&self) -> usize {
        self.pruned_objects
    }
}
