//! Single pass over the indirect object table, yielding image XObjects.

use lopdf::{Document, Object, ObjectId, Stream};

/// Yields the id of every stream object whose `Subtype` is `Image`, in
/// ascending object-id order. Lazy, finite, one pass; non-stream and
/// non-image entries are passed over with no side effect.
pub(crate) fn image_xobjects(doc: &Document) -> impl Iterator<Item = ObjectId> + '_ {
    doc.objects.iter().filter_map(|(id, object)| match object {
        Object::Stream(stream) if is_image(stream) => Some(*id),
        _ => None,
    })
}

fn is_image(stream: &Stream) -> bool {
    stream
        .dict
        .get(b"Subtype")
        .and_then(Object::as_name)
        .map(|name| name == b"Image")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn image_stream() -> Object {
        Object::Stream(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
            },
            vec![0u8],
        ))
    }

    #[test]
    fn yields_only_image_streams_in_ascending_order() {
        let mut doc = Document::with_version("1.5");
        doc.add_object(dictionary! { "Type" => "Catalog" });
        doc.add_object(Object::Stream(Stream::new(
            dictionary! { "Subtype" => "Form" },
            vec![],
        )));
        let first = doc.add_object(image_stream());
        let second = doc.add_object(image_stream());

        let ids: Vec<ObjectId> = image_xobjects(&doc).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn empty_document_yields_nothing() {
        let doc = Document::with_version("1.5");
        assert_eq!(image_xobjects(&doc).count(), 0);
    }

    #[test]
    fn stream_without_subtype_is_skipped() {
        let mut doc = Document::with_version("1.5");
        doc.add_object(Object::Stream(Stream::new(dictionary! {}, vec![1, 2, 3])));
        assert_eq!(image_xobjects(&doc).count(), 0);
    }
}
