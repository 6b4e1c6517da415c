use serde::Serialize;

use crate::record::Record;

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// The visible slice of a result set plus its position metadata.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page<'a> {
    pub items: Vec<&'a Record>,
    /// 1-based, always within `1..=total_pages`.
    pub page: usize,
    pub total_pages: usize,
    /// 1-based inclusive bounds of `items` within the result set; both 0 when empty.
    pub range_start: usize,
    pub range_end: usize,
    pub total: usize,
}

impl Page<'_> {
    pub fn is_first(&self) -> bool {
        self.page == 1
    }

    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }
}

pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Slices `records` to the requested page, clamping the page into range.
pub fn paginate<'a>(records: &[&'a Record], page: usize, page_size: usize) -> Page<'a> {
    let page_size = page_size.max(1);
    let total = records.len();
    let total_pages = total_pages(total, page_size);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);
    let items = records[start.min(total)..end].to_vec();

    let (range_start, range_end) = if total == 0 { (0, 0) } else { (start + 1, end) };

    Page {
        items,
        page,
        total_pages,
        range_start,
        range_end,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{normalize, NormalizeOptions};
    use serde_json::Value;

    fn records(n: usize) -> Vec<Record> {
        let raw = Value::Array((0..n).map(|_| Value::Object(Default::default())).collect());
        normalize(&raw, &NormalizeOptions::default())
    }

    #[test]
    fn out_of_range_page_is_clamped_down() {
        let data = records(25);
        let refs: Vec<&Record> = data.iter().collect();
        let page = paginate(&refs, 99, 10);
        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.range_start, 21);
        assert_eq!(page.range_end, 25);
        assert_eq!(page.items[0].id, "row_21");
        assert!(page.is_last());
    }

    #[test]
    fn empty_set_is_one_empty_page() {
        let page = paginate(&[], 4, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
        assert_eq!((page.range_start, page.range_end), (0, 0));
        assert!(page.is_first() && page.is_last());
    }

    #[test]
    fn page_zero_is_first_page() {
        let data = records(3);
        let refs: Vec<&Record> = data.iter().collect();
        let page = paginate(&refs, 0, 2);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 2);
        assert_eq!((page.range_start, page.range_end), (1, 2));
    }

    #[test]
    fn zero_page_size_is_treated_as_one() {
        let data = records(3);
        let refs: Vec<&Record> = data.iter().collect();
        let page = paginate(&refs, 2, 0);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "row_2");
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(21, 10), 3);
        assert_eq!(total_pages(0, 10), 1);
    }
}
