use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

static SPAN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").expect("valid selector"));
static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").expect("valid selector"));

/// Visible label of a tree node or action anchor
///
/// The first nested `span` wins: its text, or its `title` when the text is blank.
/// Without a span, the `title` of the first nested `img` is used, and as a last
/// resort the anchor's own text. Whitespace is collapsed; blank labels are `None`.
pub fn derive_label(anchor: ElementRef<'_>) -> Option<String> {
    if let Some(span) = anchor.select(&SPAN).next() {
        let text = collapse_whitespace(&span.text().collect::<String>());
        if !text.is_empty() {
            return Some(text);
        }
        if let Some(title) = non_blank(span.value().attr("title")) {
            return Some(title);
        }
    }

    if let Some(title) = anchor.select(&IMG).find_map(|img| non_blank(img.value().attr("title"))) {
        return Some(title);
    }

    let text = collapse_whitespace(&anchor.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(collapse_whitespace).filter(|v| !v.is_empty())
}

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
