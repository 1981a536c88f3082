//! # Integer Extraction

use std::sync::LazyLock;

use regex::Regex;

/// A digit run with a non-digit, non-`.` character on each side.
static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.\d](\d+)[^.\d]").expect("valid integer pattern"));

/// The standalone integers in a text.
///
/// `-` signs are dropped and the text is framed with `@` before matching
/// left to right. Matches do not overlap and each one consumes its
/// trailing delimiter, so of two integers split by a single character only
/// the first is found. Runs touching a `.` are decimals and contribute
/// nothing.
///
/// ```
/// use sqldecode::normalize::extract_integers;
///
/// assert_eq!(extract_integers("前10名和第3.5"), vec![10]);
/// assert_eq!(extract_integers("2019-20赛季"), vec![201920]);
/// assert_eq!(extract_integers("1,2"), vec![1]);
/// ```
pub fn extract_integers(text: &str) -> Vec<u64> {
    let framed = format!("@{}@", text.replace('-', ""));
    INTEGER
        .captures_iter(&framed)
        .filter_map(|caps| caps[1].parse::<u64>().ok())
        .collect()
}

/// The number of decimal digits of an integer.
pub fn digit_count(value: u64) -> usize {
    value.checked_ilog10().map_or(1, |d| d as usize + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_integers() {
        assert_eq!(extract_integers("abc"), Vec::<u64>::new());
        assert_eq!(extract_integers("12"), vec![12]);
        assert_eq!(extract_integers("a 12 b 34"), vec![12, 34]);
        assert_eq!(extract_integers("3.14 and 7"), vec![7]);
        assert_eq!(extract_integers("v1.2.3"), Vec::<u64>::new());
        assert_eq!(extract_integers("大于30岁"), vec![30]);
        assert_eq!(extract_integers("1-2"), vec![12]);
    }

    #[test]
    fn test_extract_integers_consumes_delimiter() {
        assert_eq!(extract_integers("1,2"), vec![1]);
        assert_eq!(extract_integers("1, 2"), vec![1, 2]);
        assert_eq!(extract_integers("第1名第2名"), vec![1, 2]);
        assert_eq!(extract_integers("7.0或8"), vec![8]);
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(1_000_000_000), 10);
    }
}
