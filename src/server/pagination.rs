use serde::Deserialize;

pub const QUESTIONS_PER_PAGE: usize = 10;

#[derive(Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    /// 1-based page number. Missing, non-numeric and non-positive values mean page 1,
    /// numbers too large for `usize` saturate and land past the end.
    pub fn page(&self) -> usize {
        self.page
            .as_deref()
            .and_then(parse_page_number)
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }
}

fn parse_page_number(value: &str) -> Option<usize> {
    let value = value.trim();
    let digits = value.strip_prefix('+').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // only digits are left, so overflow is the one way parsing can fail
    Some(digits.parse::<usize>().unwrap_or(usize::MAX))
}

/// Returns the `page`th window of `QUESTIONS_PER_PAGE` items, empty past the end.
pub fn paginate<T>(items: Vec<T>, page: usize) -> Vec<T> {
    let start = page.saturating_sub(1).saturating_mul(QUESTIONS_PER_PAGE);
    items
        .into_iter()
        .skip(start)
        .take(QUESTIONS_PER_PAGE)
        .collect()
}
