//! Price text normalization.

use crate::result::{CrawlError, CrawlResult};

/// Parse a displayed price into an integer by keeping only its digits.
///
/// `"1 234 ₽"` becomes `1234`. Text with no ASCII digits, or digits that
/// overflow `u64`, is a [`CrawlError::MalformedPrice`].
pub fn normalize_price(raw: &str) -> CrawlResult<u64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    digits
        .parse::<u64>()
        .map_err(|_| CrawlError::MalformedPrice {
            raw: raw.to_string(),
        })
}
