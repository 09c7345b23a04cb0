use serde::Serialize;

pub const DEFAULT_PER_PAGE: u32 = 10;

/// Slice of a listing chosen by [`Paginator::locate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u32,
    pub num_pages: u32,
    pub total: u64,
    pub limit: u32,
    pub offset: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub num_pages: u32,
    pub total: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn new(window: PageWindow, items: Vec<T>) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            total: window.total,
            has_previous: window.number > 1,
            has_next: window.number < window.num_pages,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: u32,
}

impl Paginator {
    pub fn new(per_page: u32) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Resolves the raw `page` parameter against a listing of `total` items.
    ///
    /// Garbage falls back to the first page, overshooting lands on the last
    /// one, and an empty listing still has a single page.
    pub fn locate(&self, requested: Option<&str>, total: u64) -> PageWindow {
        let per_page = u64::from(self.per_page);
        let num_pages = total.div_ceil(per_page).max(1);
        let num_pages = u32::try_from(num_pages).unwrap_or(u32::MAX);

        let number = requested.map_or(1, |raw| requested_number(raw.trim(), num_pages));

        PageWindow {
            number,
            num_pages,
            total,
            limit: self.per_page,
            offset: u64::from(number - 1) * per_page,
        }
    }
}

// Digits too long for any integer type still mean "past the end".
fn requested_number(raw: &str, num_pages: u32) -> u32 {
    match raw.parse::<i64>() {
        Ok(n) => u32::try_from(n.clamp(1, i64::from(num_pages))).unwrap_or(1),
        Err(_) => {
            let digits = raw.strip_prefix('+').unwrap_or(raw);
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                num_pages
            } else {
                1
            }
        }
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}
