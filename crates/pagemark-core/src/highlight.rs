//! Highlight records supplied by the annotation store.

use crate::geometry::Ltwh;
use crate::style::StyleOverride;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier assigned by the annotation store.
pub type HighlightId = String;

/// Where a highlight sits on its page, in document-page space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HighlightPosition {
    /// A free rectangular region.
    Area { bounding_rect: Ltwh },
    /// A text selection, one rectangle per line fragment.
    Text { rects: Vec<Ltwh> },
}

impl HighlightPosition {
    /// Rectangles to paint, in order. An area yields its bounding rect.
    pub fn rects(&self) -> &[Ltwh] {
        match self {
            HighlightPosition::Area { bounding_rect } => std::slice::from_ref(bounding_rect),
            HighlightPosition::Text { rects } => rects,
        }
    }
}

/// A committed highlight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub id: HighlightId,
    pub position: HighlightPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleOverride>,
}

impl Highlight {
    pub fn new(id: impl Into<HighlightId>, position: HighlightPosition) -> Self {
        Self {
            id: id.into(),
            position,
            style: None,
        }
    }

    pub fn with_style(mut self, style: StyleOverride) -> Self {
        self.style = Some(style);
        self
    }
}

/// A pending highlight that has not been committed to the store yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhostHighlight {
    pub position: HighlightPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleOverride>,
}

impl GhostHighlight {
    pub fn new(position: HighlightPosition) -> Self {
        Self {
            position,
            style: None,
        }
    }
}

/// One record in a page's highlight sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageHighlight {
    Committed(Highlight),
    Ghost(GhostHighlight),
}

impl PageHighlight {
    pub fn position(&self) -> &HighlightPosition {
        match self {
            PageHighlight::Committed(h) => &h.position,
            PageHighlight::Ghost(g) => &g.position,
        }
    }

    pub fn style(&self) -> Option<&StyleOverride> {
        match self {
            PageHighlight::Committed(h) => h.style.as_ref(),
            PageHighlight::Ghost(g) => g.style.as_ref(),
        }
    }

    pub fn is_ghost(&self) -> bool {
        matches!(self, PageHighlight::Ghost(_))
    }
}

impl From<Highlight> for PageHighlight {
    fn from(highlight: Highlight) -> Self {
        PageHighlight::Committed(highlight)
    }
}

impl From<GhostHighlight> for PageHighlight {
    fn from(ghost: GhostHighlight) -> Self {
        PageHighlight::Ghost(ghost)
    }
}

/// Highlights keyed by 1-indexed page number, each page in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighlightsByPage {
    pages: BTreeMap<u32, Vec<PageHighlight>>,
}

impl HighlightsByPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records for `page_number`; empty when the page has none.
    pub fn page(&self, page_number: u32) -> &[PageHighlight] {
        self.pages
            .get(&page_number)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Append a record to the end of a page's sequence.
    pub fn push(&mut self, page_number: u32, record: impl Into<PageHighlight>) {
        self.pages
            .entry(page_number)
            .or_default()
            .push(record.into());
    }

    /// Replace a page's whole sequence.
    pub fn set_page(&mut self, page_number: u32, records: Vec<PageHighlight>) {
        if records.is_empty() {
            self.pages.remove(&page_number);
        } else {
            self.pages.insert(page_number, records);
        }
    }

    /// Page numbers that have at least one record.
    pub fn pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(left: f64) -> HighlightPosition {
        HighlightPosition::Area {
            bounding_rect: Ltwh::new(left, 0.0, 10.0, 10.0),
        }
    }

    #[test]
    fn test_position_rects() {
        assert_eq!(area(3.0).rects().len(), 1);
        let text = HighlightPosition::Text {
            rects: vec![Ltwh::default(); 3],
        };
        assert_eq!(text.rects().len(), 3);
        let empty = HighlightPosition::Text { rects: Vec::new() };
        assert!(empty.rects().is_empty());
    }

    #[test]
    fn test_missing_page_is_empty() {
        let highlights = HighlightsByPage::new();
        assert!(highlights.page(4).is_empty());
    }

    fn committed_id(record: &PageHighlight) -> Option<&str> {
        match record {
            PageHighlight::Committed(h) => Some(h.id.as_str()),
            PageHighlight::Ghost(_) => None,
        }
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut highlights = HighlightsByPage::new();
        highlights.push(1, Highlight::new("b", area(2.0)));
        highlights.push(1, GhostHighlight::new(area(1.0)));
        highlights.push(1, Highlight::new("a", area(0.0)));

        let page = highlights.page(1);
        assert_eq!(page.len(), 3);
        assert_eq!(committed_id(&page[0]), Some("b"));
        assert!(page[1].is_ghost());
        assert_eq!(committed_id(&page[2]), Some("a"));
    }

    #[test]
    fn test_set_page_empty_removes() {
        let mut highlights = HighlightsByPage::new();
        highlights.push(2, Highlight::new("x", area(0.0)));
        highlights.set_page(2, Vec::new());
        assert!(highlights.is_empty());
    }

    #[test]
    fn test_deserialize_store_payload() {
        let json = r#"{
            "1": [
                {"id": "h1", "position": {"type": "area", "bounding_rect": {"left": 1, "top": 2, "width": 3, "height": 4}}},
                {"position": {"type": "text", "rects": [
                    {"left": 0, "top": 0, "width": 50, "height": 10},
                    {"left": 0, "top": 12, "width": 30, "height": 10}
                ]}}
            ]
        }"#;
        let highlights: HighlightsByPage = serde_json::from_str(json).unwrap();
        let page = highlights.page(1);
        assert_eq!(page.len(), 2);
        assert!(!page[0].is_ghost());
        assert!(page[1].is_ghost());
        assert_eq!(page[1].position().rects().len(), 2);
        assert_eq!(highlights.pages().collect::<Vec<_>>(), vec![1]);
    }
}
