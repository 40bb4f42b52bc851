use crate::dom::label::collapse_whitespace;
use crate::error::{Result, SeiError};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static ANCHORS_WITH_ID: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[id]").expect("valid selector"));
static LIST_ITEMS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").expect("valid selector"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("valid selector"));

/// Read-only parse of one page (or frame) source
///
/// Snapshots are taken after every navigation and never refreshed: a new source
/// means a new snapshot.
pub struct HtmlSnapshot {
    html: Html,
}

impl HtmlSnapshot {
    pub fn parse(source: &str) -> Self {
        Self { html: Html::parse_document(source) }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// All elements matching a CSS selector, in document order
    pub fn select(&self, css: &str) -> Result<Vec<ElementRef<'_>>> {
        let selector = Selector::parse(css).map_err(|e| SeiError::DomParseFailed(format!("selector '{}': {}", css, e)))?;
        Ok(self.html.select(&selector).collect())
    }

    pub fn element_by_id(&self, id: &str) -> Option<ElementRef<'_>> {
        let selector = Selector::parse(&format!("[id=\"{}\"]", id.replace('"', "\\\""))).ok()?;
        self.html.select(&selector).next()
    }

    /// Anchors carrying an `id`, in render order
    pub fn anchors_with_id(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html.select(&ANCHORS_WITH_ID)
    }

    /// `href` of the anchor inside the first `<li>` whose text is exactly `text`
    pub fn menu_link(&self, text: &str) -> Option<String> {
        self.html
            .select(&LIST_ITEMS)
            .filter(|li| collapse_whitespace(&li.text().collect::<String>()) == text)
            .find_map(|li| li.select(&ANCHOR).next()?.value().attr("href").map(str::to_string))
    }

    /// Table rows matching `css`, each split into its `<td>` cells
    pub fn rows(&self, css: &str) -> Result<Vec<Vec<ElementRef<'_>>>> {
        Ok(self.select(css)?.into_iter().map(cells).collect())
    }

    /// Collapsed text content of the element with `id`
    pub fn text_of(&self, id: &str) -> Option<String> {
        self.element_by_id(id).map(|element| collapse_whitespace(&element.text().collect::<String>()))
    }
}

/// Direct `<td>` cells of a row
pub fn cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "td")
        .collect()
}

/// First anchor inside `element`
pub fn first_anchor(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.select(&ANCHOR).next()
}

/// Collapsed text of `element`
pub fn text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}
