//! Page bounds for paged reads

/// Clamp a requested page into `1..=page_count`
pub fn clamp_page(page: u32, page_count: u32) -> u32 {
    page.clamp(1, page_count.max(1))
}
