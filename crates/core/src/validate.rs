//! Structural validation of slide documents.

use serde_json::Value;

/// Fields every slide must carry.
const REQUIRED_SLIDE_FIELDS: [&str; 4] = ["id", "title", "style", "widget"];

/// Check that a document has the slide-deck structure the renderer expects.
///
/// Presence checks only: `slide_data.slides` must be a sequence, every slide
/// must carry `id`, `title`, `style`, and `widget`, and every widget a
/// `widget_type`. Returns false rather than failing on any mismatch.
pub fn validate(document: &Value) -> bool {
    let Some(slides) = document
        .get("slide_data")
        .and_then(|data| data.get("slides"))
        .and_then(Value::as_array)
    else {
        return false;
    };

    slides.iter().all(|slide| {
        REQUIRED_SLIDE_FIELDS
            .iter()
            .all(|field| slide.get(*field).is_some())
            && slide
                .get("widget")
                .and_then(|widget| widget.get("widget_type"))
                .is_some()
    })
}
