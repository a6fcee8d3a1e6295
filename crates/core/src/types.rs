//! Domain types for the slide-deck document produced by conversion.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level document consumed by the presentation renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideDocument {
    /// Envelope holding the ordered slides.
    pub slide_data: SlideData,
}

impl SlideDocument {
    /// Wrap a list of slides in the renderer's envelope.
    pub fn new(slides: Vec<Slide>) -> Self {
        Self {
            slide_data: SlideData { slides },
        }
    }

    /// The degraded fallback: structurally valid, zero slides.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[Slide] {
        &self.slide_data.slides
    }

    /// Number of slides in the document.
    pub fn slide_count(&self) -> usize {
        self.slide_data.slides.len()
    }
}

/// Inner container for the slide list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideData {
    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

/// A single slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// Identifier assigned during conversion (e.g. `slide_1`).
    pub id: String,

    /// Slide title shown by the renderer.
    pub title: String,

    /// Secondary line under the title.
    pub subtitle: String,

    /// Always empty; slide content comes from the widget.
    pub content: String,

    /// Visual styling.
    pub style: SlideStyle,

    /// The chart widget carried by this slide.
    pub widget: Widget,
}

/// Visual styling applied to a slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideStyle {
    /// Background color as a hex string.
    #[serde(rename = "bgColor")]
    pub bg_color: String,

    /// Text color as a hex string.
    #[serde(rename = "textColor")]
    pub text_color: String,

    /// Horizontal alignment.
    pub align: String,
}

impl Default for SlideStyle {
    fn default() -> Self {
        Self {
            bg_color: "#ffffff".to_string(),
            text_color: "#000000".to_string(),
            align: "center".to_string(),
        }
    }
}

/// Chart widget embedded in a slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Widget {
    /// Always `"chart"`.
    pub widget_type: String,

    /// Display name of the source chart.
    pub widget_name: String,

    /// Output type reported by the source chart.
    pub output_type: String,

    /// Chart data payload, carried through unchanged.
    pub data: Value,

    /// Chart configuration tree with code markers cleaned.
    pub widget_code: Value,
}

impl Widget {
    /// Fixed placeholder substituted when a chart payload cannot be read.
    pub fn degraded() -> Self {
        Self {
            widget_type: "chart".to_string(),
            widget_name: "Error Chart".to_string(),
            output_type: "chart".to_string(),
            data: Value::Object(Map::new()),
            widget_code: Value::Object(Map::new()),
        }
    }
}
