//! Preview page generation.
//!
//! Submitted slide HTML is embedded into a shell page inside a JavaScript
//! template literal, so backticks and interpolation openers in the content
//! must be escaped before substitution.

/// Shell page hosting the slide HTML in an iframe with fullscreen and
/// download controls.
const PREVIEW_TEMPLATE: &str = include_str!("preview_template.html");

/// Placeholder in the template replaced with the escaped slide HTML.
const CONTENT_SLOT: &str = "__SLIDE_HTML__";

/// Escape HTML for embedding inside a JavaScript template literal.
fn escape_for_template_literal(html: &str) -> String {
    html.replace('`', "\\`").replace("${", "\\${")
}

/// Wrap slide HTML in the preview shell page.
pub fn render_preview_page(html: &str) -> String {
    PREVIEW_TEMPLATE.replace(CONTENT_SLOT, &escape_for_template_literal(html))
}
