//! Pure helpers for client-side list rendering.
//!
//! Pagination and search used to be re-implemented inline on every list
//! page (clients, meetings, tickets). These are total functions with no
//! I/O; pages call them instead of slicing by hand.

/// Number of pages needed to show `total` items.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// The slice of `items` visible on 1-based `page`.
///
/// Pages below 1 clamp to the first page; pages past the end return an
/// empty slice. Never panics.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Vec<T> {
    if page_size == 0 {
        return Vec::new();
    }
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return Vec::new();
    }
    let end = (start + page_size).min(items.len());
    items[start..end].to_vec()
}

/// Case-insensitive substring search across caller-chosen fields.
///
/// An empty (or whitespace-only) query returns every item.
pub fn filter_by_search<T, F>(items: &[T], query: &str, fields: F) -> Vec<T>
where
    T: Clone,
    F: for<'a> Fn(&'a T) -> Vec<&'a str>,
{
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| {
            fields(item)
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
        })
        .cloned()
        .collect()
}
