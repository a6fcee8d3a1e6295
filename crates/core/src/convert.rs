//! Chart-document to slide-deck conversion.
//!
//! A chart document arrives in one of three shapes: a single chart object, a
//! list of chart results, or a bare ECharts configuration. Conversion
//! classifies the normalized document once, reshapes it into the slide
//! document consumed by the renderer, and cleans embedded code markers along
//! the way. Every failure path degrades to a structurally valid document.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::normalize::{normalize, RawValue};
use crate::types::{Slide, SlideDocument, SlideStyle, Widget};

/// Keys recognized as ECharts configuration properties.
const ECHARTS_KEYS: [&str; 10] = [
    "title",
    "legend",
    "grid",
    "xAxis",
    "yAxis",
    "series",
    "tooltip",
    "backgroundColor",
    "color",
    "graphic",
];

/// Minimum number of recognized keys for a mapping to count as an ECharts
/// configuration.
const ECHARTS_KEY_THRESHOLD: usize = 2;

/// Tag key marking an embedded code value.
const CODE_MARKER_TAG: &str = "__js_function__";

/// The classified shape of a normalized chart document.
#[derive(Debug)]
pub enum DocumentShape {
    /// A bare ECharts configuration mapping.
    EchartsConfig(Map<String, Value>),
    /// An ordered list of chart result objects.
    ChartList(Vec<Value>),
    /// A single chart object.
    ChartObject(Map<String, Value>),
    /// Anything else (scalars, null); converts to the empty document.
    Unsupported(Value),
}

impl DocumentShape {
    /// Classify a normalized document.
    ///
    /// The ECharts test runs before any other shape test.
    pub fn classify(document: Value) -> Self {
        match document {
            Value::Object(map) => {
                if echarts_key_count(&map) >= ECHARTS_KEY_THRESHOLD {
                    DocumentShape::EchartsConfig(map)
                } else {
                    DocumentShape::ChartObject(map)
                }
            }
            Value::Array(items) => DocumentShape::ChartList(items),
            other => DocumentShape::Unsupported(other),
        }
    }
}

/// True iff `value` is a mapping with at least two recognized ECharts keys.
pub fn is_echarts_config(value: &Value) -> bool {
    match value.as_object() {
        Some(map) => echarts_key_count(map) >= ECHARTS_KEY_THRESHOLD,
        None => false,
    }
}

fn echarts_key_count(map: &Map<String, Value>) -> usize {
    ECHARTS_KEYS.iter().filter(|key| map.contains_key(**key)).count()
}

/// Clean embedded code text.
///
/// Unescapes literal `\n`, `\"`, and `\'` sequences (in that order, one pass
/// each) and trims surrounding whitespace. Non-text input is stringified and
/// returned unchanged.
pub fn clean_code_value(value: &Value) -> String {
    let Some(code) = value.as_str() else {
        return value.to_string();
    };
    code.replace("\\n", "\n")
        .replace("\\\"", "\"")
        .replace("\\'", "'")
        .trim()
        .to_string()
}

/// If `value` is a code marker mapping, return its raw code value.
///
/// A marker requires the tag key equal to boolean `true` and a `value` key
/// present; nothing else qualifies.
fn as_code_marker(value: &Value) -> Option<&Value> {
    let map = value.as_object()?;
    if map.get(CODE_MARKER_TAG) == Some(&Value::Bool(true)) {
        map.get("value")
    } else {
        None
    }
}

/// Rebuild a code marker around cleaned code text. Only the tag and the code
/// survive; extra keys on the source marker are dropped.
fn code_marker(code: String) -> Value {
    let mut map = Map::with_capacity(2);
    map.insert(CODE_MARKER_TAG.to_string(), Value::Bool(true));
    map.insert("value".to_string(), Value::String(code));
    Value::Object(map)
}

/// Walk a tree and clean every code marker found as a mapping value.
///
/// The marker test applies to each value before recursion; a mapping that
/// merely contains a marker deeper down is reached by the recursion, not by
/// a deep scan.
pub fn process_code_markers(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, val) in map {
                match as_code_marker(&val) {
                    Some(code) => {
                        out.insert(key, code_marker(clean_code_value(code)));
                    }
                    None => {
                        out.insert(key, process_code_markers(val));
                    }
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            Value::Array(items.into_iter().map(process_code_markers).collect())
        }
        other => other,
    }
}

/// Fetch a text field, falling back to `default` when absent or non-text.
fn text_field(map: &Map<String, Value>, key: &str, default: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// Whether a chart result should produce a slide.
///
/// The `success` flag defaults to true; non-boolean values count as absent.
fn chart_succeeded(chart: &Map<String, Value>) -> bool {
    chart.get("success").and_then(Value::as_bool).unwrap_or(true)
}

/// Converts chart documents into slide-deck documents.
#[derive(Debug, Clone, Default)]
pub struct SlideConverter;

impl SlideConverter {
    /// Create a new converter.
    pub fn new() -> Self {
        Self
    }

    /// Convert a raw (possibly foreign) chart document into a slide document.
    pub fn convert_document(&self, raw: &RawValue) -> SlideDocument {
        self.convert_value(normalize(raw))
    }

    /// Convert an already-plain chart document into a slide document.
    ///
    /// Never fails: any conversion error is logged and the empty slide
    /// document is returned so the renderer always receives a well-formed
    /// payload.
    pub fn convert_value(&self, document: Value) -> SlideDocument {
        match self.try_convert(document) {
            Ok(doc) => doc,
            Err(e) => {
                log::error!("Chart conversion failed: {}", e);
                SlideDocument::empty()
            }
        }
    }

    /// Parse and convert a JSON document.
    ///
    /// Parse failures degrade to the empty slide document.
    pub fn convert_json_str(&self, input: &str) -> SlideDocument {
        match self.try_convert_json(input) {
            Ok(doc) => doc,
            Err(e) => {
                log::error!("Failed to convert chart document: {}", e);
                SlideDocument::empty()
            }
        }
    }

    fn try_convert_json(&self, input: &str) -> Result<SlideDocument> {
        let document: Value = serde_json::from_str(input)?;
        self.try_convert(document)
    }

    fn try_convert(&self, document: Value) -> Result<SlideDocument> {
        let slides = match DocumentShape::classify(document) {
            DocumentShape::EchartsConfig(config) => vec![self.echarts_slide(config)],
            DocumentShape::ChartList(charts) => {
                let mut slides = Vec::with_capacity(charts.len());
                for (index, chart) in charts.iter().enumerate() {
                    let fields = chart.as_object().ok_or_else(|| {
                        Error::MalformedChart(format!(
                            "list element {} is not a mapping",
                            index
                        ))
                    })?;
                    if chart_succeeded(fields) {
                        // Ids keep the 1-based position of the source
                        // element, including positions of skipped elements.
                        let id = format!("slide_{}", index + 1);
                        slides.push(self.build_slide(chart, Some(&id))?);
                    }
                }
                slides
            }
            DocumentShape::ChartObject(chart) => {
                let chart = Value::Object(chart);
                vec![self.build_slide(&chart, Some("slide_1"))?]
            }
            DocumentShape::Unsupported(other) => {
                return Err(Error::MalformedChart(format!(
                    "document is not a chart object, chart list, or ECharts configuration: {}",
                    other
                )));
            }
        };
        Ok(SlideDocument::new(slides))
    }

    /// Build the single slide for a bare ECharts configuration: the whole
    /// document becomes the widget code.
    fn echarts_slide(&self, config: Map<String, Value>) -> Slide {
        let widget = Widget {
            widget_type: "chart".to_string(),
            widget_name: "ECharts Visualization".to_string(),
            output_type: "chart".to_string(),
            data: Value::Object(Map::new()),
            widget_code: process_code_markers(Value::Object(config)),
        };
        Slide {
            id: "slide_1".to_string(),
            title: "Chart Visualization".to_string(),
            subtitle: "Generated from ECharts configuration".to_string(),
            content: String::new(),
            style: SlideStyle::default(),
            widget,
        }
    }

    /// Create a complete slide from a chart object.
    ///
    /// When `slide_id` is absent the id is derived from the chart's
    /// `widget_name` (default `chart`).
    pub fn build_slide(&self, chart: &Value, slide_id: Option<&str>) -> Result<Slide> {
        let widget = self.build_widget(chart);
        let fields = chart.as_object().ok_or_else(|| {
            Error::MalformedChart(format!("chart payload is not a mapping: {}", chart))
        })?;

        let id = match slide_id {
            Some(id) => id.to_string(),
            None => format!("slide_{}", text_field(fields, "widget_name", "chart")),
        };

        Ok(Slide {
            id,
            title: text_field(fields, "widget_name", "Chart Slide"),
            subtitle: format!(
                "Generated from {}",
                text_field(fields, "output_type", "chart")
            ),
            content: String::new(),
            style: SlideStyle::default(),
            widget,
        })
    }

    /// Extract the chart widget from a chart object.
    ///
    /// A payload without the expected mapping shape degrades to the fixed
    /// error widget rather than failing the slide.
    pub fn build_widget(&self, chart: &Value) -> Widget {
        let Some(fields) = chart.as_object() else {
            log::error!("Chart payload is not a mapping; substituting the error widget");
            return Widget::degraded();
        };

        Widget {
            widget_type: "chart".to_string(),
            widget_name: text_field(fields, "widget_name", "Chart"),
            output_type: text_field(fields, "output_type", "chart"),
            data: fields
                .get("data")
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new())),
            widget_code: process_code_markers(
                fields
                    .get("widget_code")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new())),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_echarts_config_with_two_keys() {
        assert!(is_echarts_config(&json!({"xAxis": {}, "series": []})));
        assert!(is_echarts_config(&json!({
            "title": {}, "legend": {}, "grid": {}, "tooltip": {}
        })));
    }

    #[test]
    fn test_is_echarts_config_needs_two_keys() {
        assert!(!is_echarts_config(&json!({})));
        assert!(!is_echarts_config(&json!({"series": []})));
        assert!(!is_echarts_config(&json!({"series": [], "unrelated": 1})));
    }

    #[test]
    fn test_is_echarts_config_rejects_non_mappings() {
        assert!(!is_echarts_config(&json!([{"series": [], "xAxis": {}}])));
        assert!(!is_echarts_config(&json!("series")));
        assert!(!is_echarts_config(&Value::Null));
    }

    #[test]
    fn test_clean_code_value_unescapes() {
        let raw = json!("function(p)\\n{return \\\"x\\\" + \\'y\\';}  ");
        assert_eq!(
            clean_code_value(&raw),
            "function(p)\n{return \"x\" + 'y';}"
        );
    }

    #[test]
    fn test_clean_code_value_is_idempotent_on_clean_input() {
        let cleaned = clean_code_value(&json!("function(p) { return p.name; }"));
        assert_eq!(clean_code_value(&json!(cleaned.clone())), cleaned);
    }

    #[test]
    fn test_clean_code_value_stringifies_non_text() {
        assert_eq!(clean_code_value(&json!(42)), "42");
        assert_eq!(clean_code_value(&json!({"a": 1})), "{\"a\":1}");
    }

    #[test]
    fn test_process_markers_cleans_nested_marker() {
        let input = json!({
            "a": {"b": {"__js_function__": true, "value": "function(p)\\n{return p.name;}"}}
        });
        let expected = json!({
            "a": {"b": {"__js_function__": true, "value": "function(p)\n{return p.name;}"}}
        });
        assert_eq!(process_code_markers(input), expected);
    }

    #[test]
    fn test_process_markers_requires_exact_shape() {
        // A string tag is not a marker; the mapping is recursed into intact.
        let not_tagged = json!({"formatter": {"__js_function__": "true", "value": "x"}});
        assert_eq!(process_code_markers(not_tagged.clone()), not_tagged);

        // A tag without a value key is not a marker either.
        let no_value = json!({"formatter": {"__js_function__": true}});
        assert_eq!(process_code_markers(no_value.clone()), no_value);
    }

    #[test]
    fn test_process_markers_drops_extra_marker_keys() {
        let input = json!({
            "formatter": {"__js_function__": true, "value": "f()", "origin": "llm"}
        });
        assert_eq!(
            process_code_markers(input),
            json!({"formatter": {"__js_function__": true, "value": "f()"}})
        );
    }

    #[test]
    fn test_process_markers_preserves_arrays_and_scalars() {
        let input = json!({
            "series": [
                {"label": {"formatter": {"__js_function__": true, "value": "a\\nb"}}},
                {"data": [1, 2, 3]},
            ],
            "count": 2,
        });
        let expected = json!({
            "series": [
                {"label": {"formatter": {"__js_function__": true, "value": "a\nb"}}},
                {"data": [1, 2, 3]},
            ],
            "count": 2,
        });
        assert_eq!(process_code_markers(input), expected);
    }

    #[test]
    fn test_convert_single_chart_object() {
        let converter = SlideConverter::new();
        let doc = converter.convert_value(json!({
            "widget_name": "Sales",
            "output_type": "bar",
            "data": {"rows": [1, 2]},
        }));

        assert_eq!(doc.slide_count(), 1);
        let slide = &doc.slides()[0];
        assert_eq!(slide.id, "slide_1");
        assert_eq!(slide.title, "Sales");
        assert_eq!(slide.subtitle, "Generated from bar");
        assert_eq!(slide.content, "");
        assert_eq!(slide.style.bg_color, "#ffffff");
        assert_eq!(slide.widget.widget_type, "chart");
        assert_eq!(slide.widget.data, json!({"rows": [1, 2]}));
    }

    #[test]
    fn test_default_fill_without_slide_id() {
        let converter = SlideConverter::new();
        let slide = converter
            .build_slide(&json!({"widget_name": "Sales"}), None)
            .expect("slide");

        assert_eq!(slide.id, "slide_Sales");
        assert_eq!(slide.title, "Sales");
        assert_eq!(slide.subtitle, "Generated from chart");
        assert_eq!(slide.widget.widget_name, "Sales");
        assert_eq!(slide.widget.output_type, "chart");
        assert_eq!(slide.widget.data, json!({}));
        assert_eq!(slide.widget.widget_code, json!({}));
    }

    #[test]
    fn test_default_id_uses_lowercase_chart_fallback() {
        let converter = SlideConverter::new();
        let slide = converter.build_slide(&json!({}), None).expect("slide");
        assert_eq!(slide.id, "slide_chart");
        assert_eq!(slide.title, "Chart Slide");
    }

    #[test]
    fn test_success_filtering_keeps_source_positions() {
        let converter = SlideConverter::new();
        let doc = converter.convert_value(json!([
            {"widget_name": "A", "success": true},
            {"widget_name": "B", "success": false},
            {"widget_name": "C"},
        ]));

        assert_eq!(doc.slide_count(), 2);
        assert_eq!(doc.slides()[0].id, "slide_1");
        assert_eq!(doc.slides()[0].title, "A");
        assert_eq!(doc.slides()[1].id, "slide_3");
        assert_eq!(doc.slides()[1].title, "C");
    }

    #[test]
    fn test_list_with_non_mapping_element_yields_empty_document() {
        let converter = SlideConverter::new();
        let doc = converter.convert_value(json!([{"widget_name": "A"}, 42]));
        assert_eq!(doc.slide_count(), 0);
    }

    #[test]
    fn test_echarts_document_becomes_widget_code() {
        let converter = SlideConverter::new();
        let doc = converter.convert_value(json!({
            "xAxis": {"type": "category"},
            "series": [{
                "type": "line",
                "label": {"formatter": {"__js_function__": true, "value": "p => p.value\\n"}},
            }],
        }));

        assert_eq!(doc.slide_count(), 1);
        let slide = &doc.slides()[0];
        assert_eq!(slide.id, "slide_1");
        assert_eq!(slide.title, "Chart Visualization");
        assert_eq!(slide.subtitle, "Generated from ECharts configuration");
        assert_eq!(slide.widget.widget_name, "ECharts Visualization");
        assert_eq!(slide.widget.data, json!({}));
        assert_eq!(
            slide.widget.widget_code,
            json!({
                "xAxis": {"type": "category"},
                "series": [{
                    "type": "line",
                    "label": {"formatter": {"__js_function__": true, "value": "p => p.value"}},
                }],
            })
        );
    }

    #[test]
    fn test_malformed_inputs_never_panic() {
        let converter = SlideConverter::new();

        assert_eq!(converter.convert_value(json!({})).slide_count(), 1);
        assert_eq!(converter.convert_value(json!([])).slide_count(), 0);
        assert_eq!(converter.convert_value(Value::Null).slide_count(), 0);
        assert_eq!(converter.convert_value(json!(17)).slide_count(), 0);
        assert_eq!(converter.convert_value(json!("chart")).slide_count(), 0);
    }

    #[test]
    fn test_convert_json_str_parse_failure_degrades() {
        let converter = SlideConverter::new();
        let doc = converter.convert_json_str("{not json");
        assert_eq!(doc.slide_count(), 0);
    }

    #[test]
    fn test_convert_json_str_round_trip() {
        let converter = SlideConverter::new();
        let doc = converter.convert_json_str(r#"{"widget_name": "Doanh thu"}"#);
        assert_eq!(doc.slide_count(), 1);
        assert_eq!(doc.slides()[0].title, "Doanh thu");
    }

    #[test]
    fn test_build_widget_degrades_on_non_mapping() {
        let converter = SlideConverter::new();
        let widget = converter.build_widget(&json!([1, 2, 3]));
        assert_eq!(widget.widget_name, "Error Chart");
        assert_eq!(widget.widget_type, "chart");
        assert_eq!(widget.data, json!({}));
    }

    #[test]
    fn test_non_boolean_success_counts_as_success() {
        let converter = SlideConverter::new();
        let doc = converter.convert_value(json!([
            {"widget_name": "A", "success": "false"},
        ]));
        assert_eq!(doc.slide_count(), 1);
    }

    #[test]
    fn test_convert_document_normalizes_first() {
        let converter = SlideConverter::new();
        let raw = RawValue::from(json!({"widget_name": "Orders"}));
        let doc = converter.convert_document(&raw);
        assert_eq!(doc.slide_count(), 1);
        assert_eq!(doc.slides()[0].title, "Orders");
    }
}
