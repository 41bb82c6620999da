//! Page slicing for listing pages.
//!
//! Listings show a fixed number of items per page. Page numbers in URLs are
//! 1-based. An empty collection has zero pages, but page 1 of it is still a
//! valid (empty) page so a listing can render its "no posts" message; any
//! other page of an empty collection is invalid.
//!
//! Ordering is the caller's job. This module only slices.

use std::num::NonZeroUsize;

/// Result of paginating a collection for one requested page.
#[derive(Debug, PartialEq, Eq)]
pub struct Paginated<'a, T> {
    /// Items on the requested page. Empty when the request is invalid.
    pub slice: &'a [T],
    /// The page that was asked for, as given.
    pub current_page: i64,
    /// `ceil(len / page_size)`; zero for an empty collection.
    pub total_pages: usize,
    /// Whether the request names an existing page. Invalid requests should
    /// be answered with "not found".
    pub valid: bool,
}

// Only borrows the items, so it copies whatever `T` is.
impl<T> Clone for Paginated<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Paginated<'_, T> {}

impl<'a, T> Paginated<'a, T> {
    pub fn has_previous(&self) -> bool {
        self.valid && self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.valid && (self.current_page as usize) < self.total_pages
    }
}

/// Number of pages needed for `len` items.
pub fn total_pages(len: usize, page_size: NonZeroUsize) -> usize {
    len.div_ceil(page_size.get())
}

/// Slice out page `requested_page` (1-based) of `items`.
pub fn paginate<T>(items: &[T], page_size: NonZeroUsize, requested_page: i64) -> Paginated<'_, T> {
    let total = total_pages(items.len(), page_size);
    let valid = requested_page >= 1
        && if total == 0 {
            requested_page == 1
        } else {
            requested_page as u64 <= total as u64
        };

    let slice = if valid {
        let size = page_size.get();
        let start = (requested_page as usize - 1).saturating_mul(size).min(items.len());
        let end = start.saturating_add(size).min(items.len());
        &items[start..end]
    } else {
        &items[..0]
    };

    Paginated {
        slice,
        current_page: requested_page,
        total_pages: total,
        valid,
    }
}

/// Paginate from the raw page segment of a URL (`"2"` in `/blog/page/2`).
///
/// Anything that is not a plain decimal integer is an invalid page.
pub fn paginate_raw<'a, T>(items: &'a [T], page_size: NonZeroUsize, raw: &str) -> Paginated<'a, T> {
    match parse_page_number(raw) {
        Some(page) => paginate(items, page_size, page),
        None => Paginated {
            slice: &items[..0],
            current_page: 0,
            total_pages: total_pages(items.len(), page_size),
            valid: false,
        },
    }
}

/// Parse a page number, rejecting signs, whitespace and non-digits.
pub fn parse_page_number(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn empty_collection_page_one_is_valid() {
        let items: Vec<u32> = vec![];
        let page = paginate(&items, size(5), 1);
        assert!(page.valid);
        assert!(page.slice.is_empty());
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn empty_collection_page_two_is_invalid() {
        let items: Vec<u32> = vec![];
        assert!(!paginate(&items, size(5), 2).valid);
    }

    #[test]
    fn twelve_items_five_per_page() {
        let items: Vec<u32> = (1..=12).collect();
        let p1 = paginate(&items, size(5), 1);
        let p2 = paginate(&items, size(5), 2);
        let p3 = paginate(&items, size(5), 3);
        let p4 = paginate(&items, size(5), 4);
        assert_eq!(p1.slice, &[1, 2, 3, 4, 5]);
        assert_eq!(p2.slice, &[6, 7, 8, 9, 10]);
        assert_eq!(p3.slice, &[11, 12]);
        assert_eq!(p3.total_pages, 3);
        assert!(!p4.valid);
        assert!(p4.slice.is_empty());
    }

    #[test]
    fn zero_and_negative_pages_invalid() {
        let items: Vec<u32> = (1..=3).collect();
        assert!(!paginate(&items, size(2), 0).valid);
        assert!(!paginate(&items, size(2), -1).valid);
        assert!(!paginate(&items, size(2), i64::MIN).valid);
        assert!(!paginate(&items, size(2), i64::MAX).valid);
    }

    #[test]
    fn total_pages_is_ceiling_and_slices_cover_everything() {
        for n in 0..40usize {
            for p in 1..8usize {
                let items: Vec<usize> = (0..n).collect();
                let total = total_pages(n, size(p));
                assert_eq!(total, n.div_ceil(p), "n={n} p={p}");
                let covered: usize = (1..=total as i64)
                    .map(|page| paginate(&items, size(p), page))
                    .inspect(|page| assert!(page.valid))
                    .map(|page| page.slice.len())
                    .sum();
                assert_eq!(covered, n, "n={n} p={p}");
            }
        }
    }

    #[test]
    fn navigation_flags() {
        let items: Vec<u32> = (1..=12).collect();
        let first = paginate(&items, size(5), 1);
        let middle = paginate(&items, size(5), 2);
        let last = paginate(&items, size(5), 3);
        assert!(!first.has_previous() && first.has_next());
        assert!(middle.has_previous() && middle.has_next());
        assert!(last.has_previous() && !last.has_next());
    }

    #[test]
    fn raw_page_numbers() {
        let items: Vec<u32> = (1..=12).collect();
        assert!(paginate_raw(&items, size(5), "2").valid);
        assert!(!paginate_raw(&items, size(5), "abc").valid);
        assert!(!paginate_raw(&items, size(5), "").valid);
        assert!(!paginate_raw(&items, size(5), "-1").valid);
        assert!(!paginate_raw(&items, size(5), "+2").valid);
        assert!(!paginate_raw(&items, size(5), "2.5").valid);
        assert!(!paginate_raw(&items, size(5), "99999999999999999999999").valid);
        assert_eq!(paginate_raw(&items, size(5), "abc").total_pages, 3);
    }

    #[test]
    fn page_of_owned_values_is_copy() {
        let items: Vec<String> = (1..=7).map(|i| format!("post {i}")).collect();
        let page = paginate(&items, size(5), 2);
        let copy = page;
        assert_eq!(page.slice, copy.slice);
        assert_eq!(copy.slice, ["post 6", "post 7"]);
    }
}
