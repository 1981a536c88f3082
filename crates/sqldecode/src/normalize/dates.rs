//! # Date Extraction
//!
//! Questions mention dates as `24年3月5日`, `3月5日`, or `24年3月`; cells
//! hold them as `24-3-5` (often inside a longer `2024-03-05`). Years are
//! compared on their last two digits.

use std::sync::LazyLock;

use regex::Regex;

static FULL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2})年(\d{1,2})月(\d{1,2})[日号]").expect("valid date pattern")
});

static MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^年\d](\d{1,2})月(\d{1,2})[日号]").expect("valid date pattern")
});

static YEAR_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2})年(\d{1,2})月[^\d]").expect("valid date pattern")
});

static CELL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2})-(\d{1,2})-(\d{1,2})").expect("valid date pattern")
});

/// A `(year, month, day)` date pattern; `0` in any slot matches anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateQuery {
    /// Two-digit year, or `0`.
    pub year: u32,

    /// Month, or `0`.
    pub month: u32,

    /// Day, or `0`.
    pub day: u32,
}

impl DateQuery {
    /// Construct a new date query.
    pub fn new(
        year: u32,
        month: u32,
        day: u32,
    ) -> Self {
        Self { year, month, day }
    }

    /// Does a concrete date satisfy this query?
    pub fn matches(
        &self,
        date: &DateQuery,
    ) -> bool {
        let slot = |want: u32, have: u32| want == 0 || want == have;
        slot(self.year, date.year) && slot(self.month, date.month) && slot(self.day, date.day)
    }
}

fn capture_num(
    caps: &regex::Captures<'_>,
    idx: usize,
) -> Option<u32> {
    caps.get(idx).and_then(|m| m.as_str().parse().ok())
}

/// Collect the date queries mentioned in a question.
///
/// Full dates come first, then month/day pairs, then year/month pairs.
pub fn question_dates(question: &str) -> Vec<DateQuery> {
    let mut dates = Vec::new();
    for caps in FULL_DATE.captures_iter(question) {
        if let (Some(y), Some(m), Some(d)) =
            (capture_num(&caps, 1), capture_num(&caps, 2), capture_num(&caps, 3))
        {
            dates.push(DateQuery::new(y, m, d));
        }
    }
    for caps in MONTH_DAY.captures_iter(question) {
        if let (Some(m), Some(d)) = (capture_num(&caps, 1), capture_num(&caps, 2)) {
            dates.push(DateQuery::new(0, m, d));
        }
    }
    for caps in YEAR_MONTH.captures_iter(question) {
        if let (Some(y), Some(m)) = (capture_num(&caps, 1), capture_num(&caps, 2)) {
            dates.push(DateQuery::new(y, m, 0));
        }
    }
    dates
}

/// The single date a cell holds.
///
/// Cells with no date, or with more than one, yield `None`.
pub fn cell_date(cell: &str) -> Option<DateQuery> {
    let mut found = CELL_DATE.captures_iter(cell);
    let caps = found.next()?;
    if found.next().is_some() {
        return None;
    }
    Some(DateQuery::new(
        capture_num(&caps, 1)?,
        capture_num(&caps, 2)?,
        capture_num(&caps, 3)?,
    ))
}

/// Find the first cell whose date satisfies any date in the question.
///
/// ## Arguments
/// * `question` - The question text.
/// * `cells` - Candidate `(row, text)` cells, in row order.
///
/// ## Returns
/// The matching `(row, text)`, or `None`.
pub fn match_date<'a, I>(
    question: &str,
    cells: I,
) -> Option<(usize, &'a str)>
where
    I: IntoIterator<Item = (usize, &'a str)>,
{
    let queries = question_dates(question);
    if queries.is_empty() {
        return None;
    }
    cells.into_iter().find(|(_, text)| {
        cell_date(text).is_some_and(|date| queries.iter().any(|q| q.matches(&date)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_dates() {
        assert_eq!(
            question_dates("2024年3月5日的票房"),
            vec![DateQuery::new(24, 3, 5)]
        );
        assert_eq!(
            question_dates("在3月15号上映"),
            vec![DateQuery::new(0, 3, 15)]
        );
        assert_eq!(
            question_dates("19年12月的销量"),
            vec![DateQuery::new(19, 12, 0)]
        );
        assert!(question_dates("没有日期").is_empty());
    }

    #[test]
    fn test_month_day_needs_a_lead_char() {
        assert!(question_dates("3月5日").is_empty());
        assert_eq!(question_dates("是3月5日"), vec![DateQuery::new(0, 3, 5)]);
    }

    #[test]
    fn test_cell_date() {
        assert_eq!(cell_date("2024-03-05"), Some(DateQuery::new(24, 3, 5)));
        assert_eq!(cell_date("19-1-2"), Some(DateQuery::new(19, 1, 2)));
        assert_eq!(cell_date("no date"), None);
        assert_eq!(cell_date("19-1-2 to 19-1-9"), None);
    }

    #[test]
    fn test_wildcards() {
        let date = DateQuery::new(24, 3, 5);
        assert!(DateQuery::new(0, 3, 5).matches(&date));
        assert!(DateQuery::new(24, 3, 0).matches(&date));
        assert!(!DateQuery::new(23, 3, 0).matches(&date));
        assert!(!DateQuery::new(0, 3, 6).matches(&date));
    }

    #[test]
    fn test_match_date() {
        let cells = [(0, "2024-03-04"), (1, "2024-03-05"), (2, "2024-03-05")];
        assert_eq!(
            match_date("2024年3月5日", cells.iter().copied()),
            Some((1, "2024-03-05"))
        );
        assert_eq!(match_date("是3月9日", cells.iter().copied()), None);
        assert_eq!(match_date("no dates", cells.iter().copied()), None);
    }
}
