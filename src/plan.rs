//! Downscale planning: bounding-box fit plus a decode subsampling hint.

/// Target size and subsampling hint for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownscalePlan {
    /// Planned output width in pixels.
    pub target_width: u32,
    /// Planned output height in pixels.
    pub target_height: u32,
    /// Integer factor >= 1: a decoder may materialize the source at
    /// `natural / sample_factor` resolution without dropping below twice
    /// the target pixel count. Optimization hint only; correctness of the
    /// output depends solely on the target size.
    pub sample_factor: u32,
}

/// Compute the downscale target for an image of the given natural size.
///
/// Images that already fit within the box are left at their natural size.
/// Oversized images are scaled down preserving aspect ratio: the axis that
/// overflows the box relatively more is clamped to its cap and the other
/// axis scaled proportionally. Fractional targets truncate toward zero; a
/// degenerate zero-area target is caught later as an encode failure.
///
/// Returns `None` when either natural dimension is zero, since no aspect
/// ratio exists for such an image.
pub fn plan_downscale(
    natural_width: u32,
    natural_height: u32,
    max_width: u32,
    max_height: u32,
) -> Option<DownscalePlan> {
    if natural_width == 0 || natural_height == 0 {
        return None;
    }

    let mut target_width = natural_width;
    let mut target_height = natural_height;

    if natural_width > max_width || natural_height > max_height {
        let image_ratio = natural_width as f32 / natural_height as f32;
        let box_ratio = max_width as f32 / max_height as f32;

        if image_ratio < box_ratio {
            // Relatively taller than the box: height is the clamped axis.
            let scale = max_height as f32 / natural_height as f32;
            target_width = (scale * natural_width as f32) as u32;
            target_height = max_height;
        } else if image_ratio > box_ratio {
            let scale = max_width as f32 / natural_width as f32;
            target_height = (scale * natural_height as f32) as u32;
            target_width = max_width;
        } else {
            target_width = max_width;
            target_height = max_height;
        }
    }

    Some(DownscalePlan {
        target_width,
        target_height,
        sample_factor: sample_factor(natural_width, natural_height, target_width, target_height),
    })
}

/// Smallest integer factor such that decoding at `natural / factor`
/// resolution stays within twice the target pixel count. The starting
/// guess is the smaller of the rounded per-axis ratios.
fn sample_factor(
    natural_width: u32,
    natural_height: u32,
    target_width: u32,
    target_height: u32,
) -> u32 {
    if target_width == 0 || target_height == 0 {
        return 1;
    }

    let mut factor = 1u32;
    if natural_height > target_height || natural_width > target_width {
        let height_ratio = (natural_height as f32 / target_height as f32).round() as u32;
        let width_ratio = (natural_width as f32 / target_width as f32).round() as u32;
        factor = height_ratio.min(width_ratio).max(1);
    }

    let total_pixels = natural_width as f32 * natural_height as f32;
    let pixel_cap = target_width as f32 * target_height as f32 * 2.0;
    while total_pixels / (factor as f32 * factor as f32) > pixel_cap {
        factor += 1;
    }

    factor
}
