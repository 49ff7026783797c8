//! Pipeline driver: scan, rewrite object-by-object, finalize.
//!
//! Processing is strictly sequential. Each image object runs the whole
//! decode, plan, recompress, rewrite chain to completion before the next
//! begins, so peak memory is bounded by one decoded image at a time. A
//! recoverable failure at any step skips that object, leaving it stored
//! byte-for-byte as it was.

use crate::{plan, raster, recompress, rewrite, scan, CompressOptions};
use log::{debug, info, warn};
use lopdf::{Document, Object, ObjectId, Stream};
use thiserror::Error;

/// Why a particular image object was left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The embedded payload could not be decoded to pixels.
    #[error("payload not decodable: {0}")]
    NotDecodable(String),
    /// Natural width or height is zero; no aspect ratio exists.
    #[error("zero natural dimension")]
    ZeroDimension,
    /// Resampling, re-encoding or the container wrap failed.
    #[error("re-encode failed: {0}")]
    EncodeFailed(String),
}

/// Outcome of one run over a document. Skips are reported here instead of
/// being silently discarded; they never abort the run.
#[derive(Debug, Clone, Default)]
pub struct CompressSummary {
    /// Image XObjects found in the object table.
    pub total_images: usize,
    /// Images successfully rewritten.
    pub rewritten: usize,
    /// Images left as stored, with the reason for each.
    pub skipped: Vec<(ObjectId, SkipReason)>,
    /// Unreferenced objects removed during finalization.
    pub pruned_objects: usize,
}

/// Run the per-object pipeline over every image XObject in the table.
pub(crate) fn process_document(doc: &mut Document, options: &CompressOptions) -> CompressSummary {
    let mut summary = CompressSummary::default();

    let image_ids: Vec<ObjectId> = scan::image_xobjects(doc).collect();
    info!("found {} image XObjects", image_ids.len());

    for id in image_ids {
        let stream = match doc.get_object(id) {
            Ok(Object::Stream(s)) => s.clone(),
            _ => continue,
        };
        summary.total_images += 1;

        match recompress_object(doc, &stream, options) {
            Ok(rebuilt) => {
                debug!(
                    "object {:?}: rewritten, {} -> {} bytes",
                    id,
                    stream.content.len(),
                    rebuilt.content.len()
                );
                doc.objects.insert(id, Object::Stream(rebuilt));
                summary.rewritten += 1;
            }
            Err(reason) => {
                warn!("object {:?}: skipped: {}", id, reason);
                summary.skipped.push((id, reason));
            }
        }
    }

    summary
}

/// Decode, plan, recompress and rebuild one image stream. The stored
/// object is only replaced when every step succeeds.
fn recompress_object(
    doc: &Document,
    stream: &Stream,
    options: &CompressOptions,
) -> Result<Stream, SkipReason> {
    let raster = raster::decode_image_stream(doc, stream).map_err(SkipReason::NotDecodable)?;
    let (natural_width, natural_height) = raster.dimensions();

    let plan = plan::plan_downscale(
        natural_width,
        natural_height,
        options.max_width,
        options.max_height,
    )
    .ok_or(SkipReason::ZeroDimension)?;

    let encoded =
        recompress::recompress(&raster, &plan, options.quality).map_err(SkipReason::EncodeFailed)?;
    rewrite::rebuild_image_stream(&encoded, options.deflate_level).map_err(SkipReason::EncodeFailed)
}

/// Document-level cleanup before the save: optional form-field stripping
/// and unused-object pruning.
pub(crate) fn finalize(
    doc: &mut Document,
    options: &CompressOptions,
    summary: &mut CompressSummary,
) {
    if options.strip_form_fields {
        strip_form_fields(doc);
    }
    if options.prune_unused {
        summary.pruned_objects = doc.prune_objects().len();
        debug!("pruned {} unused objects", summary.pruned_objects);
    }
}

/// Remove interactive form fields: the `AcroForm` dictionary from the
/// catalog and widget annotations from every page. The field objects
/// themselves become unreferenced and fall to the pruning pass.
fn strip_form_fields(doc: &mut Document) {
    if let Ok(root_id) = doc.trailer.get(b"Root").and_then(Object::as_reference) {
        if let Ok(catalog) = doc.get_object_mut(root_id).and_then(Object::as_dict_mut) {
            catalog.remove(b"AcroForm");
        }
    }

    let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    for page_id in page_ids {
        strip_widget_annotations(doc, page_id);
    }
}

fn strip_widget_annotations(doc: &mut Document, page_id: ObjectId) {
    enum Slot {
        Inline,
        Indirect(ObjectId),
    }

    let (slot, kept) = {
        let Ok(page) = doc.get_dictionary(page_id) else {
            return;
        };
        match page.get(b"Annots") {
            Ok(Object::Array(annots)) => (Slot::Inline, retain_non_widgets(doc, annots)),
            Ok(Object::Reference(annots_id)) => match doc.get_object(*annots_id) {
                Ok(Object::Array(annots)) => {
                    (Slot::Indirect(*annots_id), retain_non_widgets(doc, annots))
                }
                _ => return,
            },
            _ => return,
        }
    };

    match slot {
        Slot::Inline => {
            if let Ok(page) = doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
                if kept.is_empty() {
                    page.remove(b"Annots");
                } else {
                    page.set("Annots", kept);
                }
            }
        }
        Slot::Indirect(annots_id) => {
            doc.objects.insert(annots_id, Object::Array(kept));
        }
    }
}

fn retain_non_widgets(doc: &Document, annots: &[Object]) -> Vec<Object> {
    annots
        .iter()
        .filter(|annot| !is_widget(doc, annot))
        .cloned()
        .collect()
}

fn is_widget(doc: &Document, annot: &Object) -> bool {
    let dict = match annot {
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Dictionary(d)) => d,
            _ => return false,
        },
        Object::Dictionary(d) => d,
        _ => return false,
    };
    dict.get(b"Subtype")
        .and_then(Object::as_name)
        .map(|name| name == b"Widget")
        .unwrap_or(false)
}
