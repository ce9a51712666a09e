//! Pagination window and range computation.
//!
//! Pure functions, no I/O. Page indices are zero-based throughout; labels
//! shown to people are one-based and produced by `WindowEntry::label`.

use crate::types::PageMetadata;

/// Windows with at most this many pages list every page.
pub const MAX_UNCOLLAPSED_PAGES: u32 = 7;

/// Which gap an ellipsis stands for. The middle regime has two, and they
/// must never collide as list keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EllipsisSlot {
    Leading,
    Trailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowEntry {
    Page(u32),
    Ellipsis(EllipsisSlot),
}

impl WindowEntry {
    /// Stable key, unique within one window.
    pub fn key(&self) -> String {
        match self {
            WindowEntry::Page(index) => format!("page-{index}"),
            WindowEntry::Ellipsis(EllipsisSlot::Leading) => "ellipsis-leading".to_string(),
            WindowEntry::Ellipsis(EllipsisSlot::Trailing) => "ellipsis-trailing".to_string(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            WindowEntry::Page(index) => (index + 1).to_string(),
            WindowEntry::Ellipsis(_) => "…".to_string(),
        }
    }

    pub fn is_navigable(&self) -> bool {
        matches!(self, WindowEntry::Page(_))
    }
}

/// Page indices and ellipsis markers to render for `current_page`.
pub fn compute_window(current_page: u32, total_pages: u32) -> Vec<WindowEntry> {
    use WindowEntry::{Ellipsis, Page};

    if total_pages <= MAX_UNCOLLAPSED_PAGES {
        return (0..total_pages).map(Page).collect();
    }

    let last = total_pages - 1;
    if current_page <= 2 {
        let mut window: Vec<_> = (0..5).map(Page).collect();
        window.push(Ellipsis(EllipsisSlot::Trailing));
        window.push(Page(last));
        window
    } else if current_page >= total_pages - 3 {
        let mut window = vec![Page(0), Ellipsis(EllipsisSlot::Leading)];
        window.extend((total_pages - 5..total_pages).map(Page));
        window
    } else {
        vec![
            Page(0),
            Ellipsis(EllipsisSlot::Leading),
            Page(current_page - 1),
            Page(current_page),
            Page(current_page + 1),
            Ellipsis(EllipsisSlot::Trailing),
            Page(last),
        ]
    }
}

/// One-based inclusive bounds of the records shown on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl std::fmt::Display for PageRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Showing {}–{} of {}", self.start, self.end, self.total)
    }
}

/// Range of records on `current_page`; `None` when there is nothing to show.
pub fn page_range(current_page: u32, page_size: u32, total_elements: u64) -> Option<PageRange> {
    if total_elements == 0 || page_size == 0 {
        return None;
    }
    let size = u64::from(page_size);
    let page = u64::from(current_page);
    Some(PageRange {
        start: page * size + 1,
        end: ((page + 1) * size).min(total_elements),
        total: total_elements,
    })
}

/// Everything a pagination control needs for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationControl {
    pub current_page: u32,
    pub window: Vec<WindowEntry>,
    pub range: PageRange,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PaginationControl {
    /// Build the control for a page, or `None` when zero or one page exists
    /// and no control should be rendered.
    pub fn for_page(metadata: &PageMetadata) -> Option<Self> {
        if metadata.total_pages <= 1 {
            return None;
        }
        let range = page_range(metadata.page, metadata.page_size, metadata.total_elements)?;
        Some(PaginationControl {
            current_page: metadata.page,
            window: compute_window(metadata.page, metadata.total_pages),
            range,
            has_previous: metadata.has_previous(),
            has_next: metadata.has_next(),
        })
    }
}
