//! Cursor pagination shared by admin API collections.
//!
//! Kong pages collections with an opaque `offset` token. A page whose `next` link is absent
//! or empty is the last one; otherwise its `offset` is sent back unchanged to fetch the
//! following page.

use crate::query::QueryParams;

/// Smallest page size requested from the admin API.
pub const MIN_PAGE_SIZE: u32 = 100;

/// Largest page size the admin API accepts.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Clamp a requested page size into [`MIN_PAGE_SIZE`], [`MAX_PAGE_SIZE`].
///
/// Zero and anything below the floor become [`MIN_PAGE_SIZE`]; a smaller page is never
/// requested.
#[must_use]
pub fn normalize_page_size(size: u32) -> u32 {
    size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

/// A single page of a paginated collection.
pub trait Paginated {
    /// The individual item type within a page.
    type Item;

    /// Returns the items from this page.
    fn items(self) -> Vec<Self::Item>;

    /// Returns the `next` link, if any.
    fn next_link(&self) -> Option<&str>;

    /// Returns the cursor to echo back for the following page.
    fn offset(&self) -> Option<&str>;

    /// Returns whether more pages may follow.
    fn has_more(&self) -> bool {
        self.next_link().is_some_and(|next| !next.is_empty())
    }
}

/// Cursor and page size for a collection request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    /// Opaque cursor from a previous page; empty for the first page.
    pub offset: String,
    /// Requested page size, normalized before sending.
    pub size: u32,
}

impl PageQuery {
    /// Query for the first page with the given size.
    #[must_use]
    pub fn with_size(size: u32) -> Self {
        Self {
            offset: String::new(),
            size,
        }
    }

    /// Set the cursor.
    #[must_use]
    pub fn with_offset(mut self, offset: impl Into<String>) -> Self {
        self.offset = offset.into();
        self
    }

    /// Return a copy whose size is clamped into the supported range.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            offset: self.offset.clone(),
            size: normalize_page_size(self.size),
        }
    }

    /// Convert into URL query pairs; an empty cursor is omitted.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = QueryParams::new();
        params.push_non_empty("offset", &self.offset);
        params.push("size", self.size);
        params.into_pairs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Page {
        data: Vec<u32>,
        next: Option<String>,
        offset: Option<String>,
    }

    impl Paginated for Page {
        type Item = u32;

        fn items(self) -> Vec<u32> {
            self.data
        }

        fn next_link(&self) -> Option<&str> {
            self.next.as_deref()
        }

        fn offset(&self) -> Option<&str> {
            self.offset.as_deref()
        }
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(normalize_page_size(0), 100);
        assert_eq!(normalize_page_size(99), 100);
        assert_eq!(normalize_page_size(100), 100);
        assert_eq!(normalize_page_size(640), 640);
        assert_eq!(normalize_page_size(1000), 1000);
        assert_eq!(normalize_page_size(5000), 1000);
    }

    #[test]
    fn has_more_requires_non_empty_next() {
        let mut page = Page {
            data: vec![1],
            next: None,
            offset: None,
        };
        assert!(!page.has_more());

        page.next = Some(String::new());
        assert!(!page.has_more());

        page.next = Some("/services?offset=abc".into());
        page.offset = Some("abc".into());
        assert!(page.has_more());
        assert_eq!(page.offset(), Some("abc"));
        assert_eq!(page.items(), vec![1]);
    }

    #[test]
    fn query_pairs_omit_empty_offset() {
        let query = PageQuery::default().normalized();
        assert_eq!(query.to_pairs(), vec![("size", "100".to_string())]);

        let query = PageQuery::with_size(5000).with_offset("abc").normalized();
        assert_eq!(
            query.to_pairs(),
            vec![("offset", "abc".to_string()), ("size", "1000".to_string())]
        );
    }
}
