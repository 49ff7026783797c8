//! Decoder adapter: embedded stream payload to a dense RGB pixel grid.

use image::{DynamicImage, ImageFormat, RgbImage};
use lopdf::{Document, Object, Stream};

/// Decode an image stream's embedded payload into an opaque RGB raster.
///
/// The declared filter decides the codec path: `DCTDecode` payloads are
/// JPEG, `JPXDecode` payloads are sniffed, `FlateDecode` payloads are
/// unfiltered by lopdf itself (honoring `DecodeParms`, PNG predictor
/// reversal included) and, like unfiltered payloads, interpreted as raw
/// samples per the dictionary's color space. Alpha channels and soft
/// masks are not merged; transparency is flattened.
///
/// Failure is per-image and recoverable: the caller skips the object and
/// moves on.
pub(crate) fn decode_image_stream(doc: &Document, stream: &Stream) -> Result<RgbImage, String> {
    let content = &stream.content;

    let raw = match primary_filter(stream).as_deref() {
        Some("DCTDecode") => {
            let img = image::load_from_memory_with_format(content, ImageFormat::Jpeg)
                .map_err(|e| format!("JPEG decode failed: {e}"))?;
            return Ok(flatten_to_rgb(img));
        }
        Some("JPXDecode") => {
            let img = image::load_from_memory(content)
                .map_err(|e| format!("JPEG2000 decode failed: {e}"))?;
            return Ok(flatten_to_rgb(img));
        }
        Some("FlateDecode") => stream
            .decompressed_content()
            .map_err(|e| format!("FlateDecode failed: {e}"))?,
        None => content.clone(),
        Some(other) => return Err(format!("unsupported filter: {other}")),
    };

    let width = dict_u32(stream, b"Width")?;
    let height = dict_u32(stream, b"Height")?;
    let bits = dict_u32(stream, b"BitsPerComponent").unwrap_or(8);
    let color_space = color_space_name(doc, stream);

    samples_to_rgb(raw, width, height, bits, &color_space)
}

/// Alpha is dropped against an implicit opaque background.
fn flatten_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// First entry of the declared filter chain, if any.
fn primary_filter(stream: &Stream) -> Option<String> {
    stream.dict.get(b"Filter").ok().and_then(|f| match f {
        Object::Name(n) => Some(String::from_utf8_lossy(n).to_string()),
        Object::Array(arr) => arr.first().and_then(|f| match f {
            Object::Name(n) => Some(String::from_utf8_lossy(n).to_string()),
            _ => None,
        }),
        _ => None,
    })
}

fn dict_u32(stream: &Stream, key: &[u8]) -> Result<u32, String> {
    stream
        .dict
        .get(key)
        .and_then(Object::as_i64)
        .ok()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| format!("missing or invalid /{}", String::from_utf8_lossy(key)))
}

/// Resolve the color-space name, following references and taking the family
/// name from array forms such as `[/ICCBased 12 0 R]`. Reference chains are
/// depth-bounded so a malformed self-referential chain cannot recurse
/// unboundedly.
fn color_space_name(doc: &Document, stream: &Stream) -> String {
    fn name_of(obj: &Object, doc: &Document, depth: u32) -> String {
        if depth == 0 {
            return "Unknown".to_string();
        }
        match obj {
            Object::Name(name) => String::from_utf8_lossy(name).to_string(),
            Object::Array(arr) => match arr.first() {
                Some(Object::Name(name)) => String::from_utf8_lossy(name).to_string(),
                _ => "Unknown".to_string(),
            },
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(resolved) => name_of(resolved, doc, depth - 1),
                Err(_) => "Unknown".to_string(),
            },
            _ => "Unknown".to_string(),
        }
    }

    match stream.dict.get(b"ColorSpace") {
        Ok(cs) => name_of(cs, doc, 8),
        Err(_) => "DeviceRGB".to_string(),
    }
}

/// Interpret raw 8-bit samples per color space, always producing RGB.
fn samples_to_rgb(
    data: Vec<u8>,
    width: u32,
    height: u32,
    bits: u32,
    color_space: &str,
) -> Result<RgbImage, String> {
    if bits != 8 {
        return Err(format!("unsupported bit depth: {bits}"));
    }
    let pixels = width as usize * height as usize;

    match color_space {
        "DeviceRGB" | "CalRGB" => {
            let expected = pixels * 3;
            if data.len() < expected {
                return Err(format!("RGB payload too short: {} < {expected}", data.len()));
            }
            RgbImage::from_raw(width, height, data[..expected].to_vec())
                .ok_or_else(|| "RGB buffer construction failed".to_string())
        }
        "DeviceGray" | "CalGray" => {
            if data.len() < pixels {
                return Err(format!("gray payload too short: {} < {pixels}", data.len()));
            }
            let mut rgb = Vec::with_capacity(pixels * 3);
            for &g in &data[..pixels] {
                rgb.extend_from_slice(&[g, g, g]);
            }
            RgbImage::from_raw(width, height, rgb)
                .ok_or_else(|| "gray buffer construction failed".to_string())
        }
        "DeviceCMYK" => {
            let expected = pixels * 4;
            if data.len() < expected {
                return Err(format!("CMYK payload too short: {} < {expected}", data.len()));
            }
            let mut rgb = Vec::with_capacity(pixels * 3);
            for chunk in data[..expected].chunks_exact(4) {
                let c = chunk[0] as f32 / 255.0;
                let m = chunk[1] as f32 / 255.0;
                let y = chunk[2] as f32 / 255.0;
                let k = chunk[3] as f32 / 255.0;
                rgb.push(((1.0 - c) * (1.0 - k) * 255.0) as u8);
                rgb.push(((1.0 - m) * (1.0 - k) * 255.0) as u8);
                rgb.push(((1.0 - y) * (1.0 - k) * 255.0) as u8);
            }
            RgbImage::from_raw(width, height, rgb)
                .ok_or_else(|| "CMYK buffer construction failed".to_string())
        }
        "ICCBased" => {
            // The profile is not parsed; guess the component count from the
            // payload size.
            if data.len() >= pixels * 3 {
                samples_to_rgb(data, width, height, 8, "DeviceRGB")
            } else if data.len() >= pixels {
                samples_to_rgb(data, width, height, 8, "DeviceGray")
            } else {
                Err("could not determine ICCBased component count".to_string())
            }
        }
        other => Err(format!("unsupported color space: {other}")),
    }
}
