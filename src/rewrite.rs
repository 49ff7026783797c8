//! Rebuild an image stream object around a new JPEG payload.

use crate::recompress::EncodedImage;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{Dictionary, Object, Stream};
use std::io::Write;

/// Build a self-consistent image XObject carrying `encoded`.
///
/// The dictionary is written from scratch, so no key from the previous
/// encoding (an indexed palette, a soft mask, decode arrays) can survive.
/// With a non-zero `deflate_level` the JPEG payload gets a lossless zlib
/// container wrap and the filter chain becomes `[FlateDecode, DCTDecode]`;
/// pixel fidelity is untouched either way.
pub(crate) fn rebuild_image_stream(
    encoded: &EncodedImage,
    deflate_level: u32,
) -> Result<Stream, String> {
    let (filter, content) = if deflate_level > 0 {
        let mut deflater = ZlibEncoder::new(Vec::new(), Compression::new(deflate_level.min(9)));
        deflater
            .write_all(&encoded.bytes)
            .map_err(|e| format!("container deflate failed: {e}"))?;
        let deflated = deflater
            .finish()
            .map_err(|e| format!("container deflate failed: {e}"))?;
        let chain = vec![
            Object::Name(b"FlateDecode".to_vec()),
            Object::Name(b"DCTDecode".to_vec()),
        ];
        (Object::Array(chain), deflated)
    } else {
        (Object::Name(b"DCTDecode".to_vec()), encoded.bytes.clone())
    };

    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Filter", filter);
    dict.set("Width", Object::Integer(encoded.width as i64));
    dict.set("Height", Object::Integer(encoded.height as i64));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));

    // Already filtered; a later document-wide compression pass must not
    // touch this payload.
    Ok(Stream::new(dict, content).with_compression(false))
}
