//! Resample a decoded raster into the planned grid and re-encode as JPEG.

use crate::plan::DownscalePlan;
use image::imageops::{self, FilterType};
use image::RgbImage;
use jpeg_encoder::{ColorType, Encoder, SamplingFactor};

/// A freshly encoded JPEG payload and its actual pixel dimensions. The
/// rewriter must use these dimensions, not the plan's.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// Baseline JPEG bytes.
    pub bytes: Vec<u8>,
    /// Encoded grid width.
    pub width: u32,
    /// Encoded grid height.
    pub height: u32,
}

/// Resample `raster` to the plan's target and encode it at `quality`.
///
/// Quality values outside the encoder's accepted 1-100 range are clamped
/// here rather than rejected. A zero-area target is an encode failure,
/// which the driver treats exactly like a decode failure.
pub(crate) fn recompress(
    raster: &RgbImage,
    plan: &DownscalePlan,
    quality: u8,
) -> Result<EncodedImage, String> {
    if plan.target_width == 0 || plan.target_height == 0 {
        return Err("zero-area target grid".to_string());
    }

    let resized = resample(raster, plan);
    let (out_width, out_height) = resized.dimensions();
    let width = u16::try_from(out_width)
        .map_err(|_| format!("width {out_width} exceeds the JPEG limit"))?;
    let height = u16::try_from(out_height)
        .map_err(|_| format!("height {out_height} exceeds the JPEG limit"))?;

    let mut bytes = Vec::new();
    let mut encoder = Encoder::new(&mut bytes, quality.clamp(1, 100));
    encoder.set_sampling_factor(SamplingFactor::R_4_2_0);
    encoder
        .encode(resized.as_raw(), width, height, ColorType::Rgb)
        .map_err(|e| format!("JPEG encode failed: {e}"))?;

    Ok(EncodedImage {
        bytes,
        width: out_width,
        height: out_height,
    })
}

/// Scale the source into the target grid with a quality filter.
///
/// A coarse integer pre-reduction by the plan's sampling hint bounds the
/// working set before the quality pass; it is applied only when it cannot
/// undershoot the target on either axis.
fn resample(raster: &RgbImage, plan: &DownscalePlan) -> RgbImage {
    let (natural_width, natural_height) = raster.dimensions();
    if (natural_width, natural_height) == (plan.target_width, plan.target_height) {
        return raster.clone();
    }

    let mut source: &RgbImage = raster;
    let coarse;
    if plan.sample_factor > 1 {
        let reduced_width = natural_width / plan.sample_factor;
        let reduced_height = natural_height / plan.sample_factor;
        if reduced_width >= plan.target_width && reduced_height >= plan.target_height {
            coarse = imageops::resize(raster, reduced_width, reduced_height, FilterType::Triangle);
            source = &coarse;
        }
    }

    imageops::resize(
        source,
        plan.target_width,
        plan.target_height,
        FilterType::Lanczos3,
    )
}
