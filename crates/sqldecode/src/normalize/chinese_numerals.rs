//! # Chinese Numerals
//!
//! * [`num2char`] - Arabic numeral string to Chinese numeral string.
//! * [`chn_to_sum`] - Chinese numeral string to a number.
//!
//! The digit and unit tables are constant and shared read-only.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{SDResult, SqlDecodeError};

/// The decimal marker.
pub const DECIMAL_MARKER: char = '点';

const DIGIT_CHARS: [char; 10] = ['零', '一', '二', '三', '四', '五', '六', '七', '八', '九'];

/// Unit suffix for a digit by its position counted from the right (1-based).
const POSITION_UNITS: [&str; 10] = ["", "", "十", "百", "千", "万", "十", "百", "千", "亿"];

/// The longest integer part [`num2char`] renders.
pub const MAX_RENDERED_DIGITS: usize = 9;

/// The digit value of a Chinese digit character.
pub fn chinese_digit(c: char) -> Option<u32> {
    Some(match c {
        '〇' | '零' => 0,
        '一' | '壹' => 1,
        '二' | '贰' | '貮' | '两' => 2,
        '三' | '叁' => 3,
        '四' | '肆' => 4,
        '五' | '伍' => 5,
        '六' | '陆' => 6,
        '七' | '柒' => 7,
        '八' | '捌' => 8,
        '九' | '玖' => 9,
        _ => return None,
    })
}

/// The multiplier of a Chinese unit character.
pub fn chinese_unit(c: char) -> Option<f64> {
    Some(match c {
        '十' | '拾' => 10.0,
        '百' | '佰' => 100.0,
        '千' | '仟' => 1_000.0,
        '万' | '萬' => 10_000.0,
        '亿' | '億' => 100_000_000.0,
        '兆' => 1_000_000_000_000.0,
        '角' => 0.1,
        '分' => 0.01,
        _ => return None,
    })
}

/// Characters that mark a value as a candidate for [`chn_to_sum`].
const NUMERAL_TRIGGERS: &str = "零一二两三四五六七八九十点";

/// Does the text look like it holds a Chinese numeral?
pub fn has_chinese_numeral(text: &str) -> bool {
    text.chars().any(|c| NUMERAL_TRIGGERS.contains(c))
}

/// Zero-collapse rewrites, applied in order.
static ZERO_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        ("零[十百千零]*", "零"),
        ("零万", "万"),
        ("亿万", "亿零"),
        ("零零", "零"),
        (r"零\b", ""),
    ]
    .into_iter()
    .map(|(pattern, rep)| (Regex::new(pattern).expect("valid zero-collapse pattern"), rep))
    .collect()
});

fn render_digit(
    c: char,
    num: &str,
) -> SDResult<char> {
    c.to_digit(10)
        .map(|d| DIGIT_CHARS[d as usize])
        .ok_or_else(|| SqlDecodeError::InvalidNumeral(num.to_string()))
}

/// Render an Arabic numeral string as a Chinese numeral string.
///
/// ```
/// use sqldecode::normalize::num2char;
///
/// assert_eq!(num2char("1005").unwrap(), "一千零五");
/// assert_eq!(num2char("20.5%").unwrap(), "二十点五");
/// ```
///
/// ## Arguments
/// * `num` - Digits with at most one `.` and optional `%` signs; surrounding
///   whitespace is ignored.
///
/// ## Returns
/// The Chinese rendering, or [`SqlDecodeError::InvalidNumeral`] for a
/// non-digit character, an empty integer part, more than one `.`, or more
/// than [`MAX_RENDERED_DIGITS`] integer digits.
pub fn num2char(num: &str) -> SDResult<String> {
    let cleaned: String = num.trim().chars().filter(|&c| c != '%').collect();
    let invalid = || SqlDecodeError::InvalidNumeral(num.to_string());

    let mut parts = cleaned.split('.');
    let int_part = parts.next().unwrap_or_default();
    let frac_part = parts.next();
    if parts.next().is_some() || int_part.is_empty() {
        return Err(invalid());
    }

    let width = int_part.chars().count();
    if width > MAX_RENDERED_DIGITS {
        return Err(invalid());
    }

    let mut text = String::new();
    for (idx, c) in int_part.chars().enumerate() {
        text.push(render_digit(c, num)?);
        text.push_str(POSITION_UNITS[width - idx]);
    }
    for (pattern, rep) in ZERO_RULES.iter() {
        text = pattern.replace_all(&text, *rep).into_owned();
    }

    if let Some(frac) = frac_part {
        text.push(DECIMAL_MARKER);
        for c in frac.chars() {
            text.push(render_digit(c, num)?);
        }
    }
    Ok(text)
}

enum NumeralToken {
    Digit(u32),
    Unit(f64),
}

/// Parse a Chinese numeral string into a number.
///
/// Characters outside the digit and unit tables are ignored. Units combine
/// with the digit before them: a unit larger than the running total scales
/// it (`(total + digit) * unit`), a smaller one adds (`total + digit * unit`).
/// A trailing digit is added as is, and digits after `点` form the fraction.
///
/// ```
/// use sqldecode::normalize::chn_to_sum;
///
/// assert_eq!(chn_to_sum("三千五百").unwrap(), 3500.0);
/// assert_eq!(chn_to_sum("一百万").unwrap(), 1_000_000.0);
/// assert_eq!(chn_to_sum("二点五").unwrap(), 2.5);
/// ```
///
/// ## Returns
/// The value rounded to 2 decimal places; or
/// [`SqlDecodeError::InvalidNumeral`] if there are no numeral characters,
/// if a unit opens the numeral, or if two non-zero digits are adjacent.
pub fn chn_to_sum(chn: &str) -> SDResult<f64> {
    let invalid = || SqlDecodeError::InvalidNumeral(chn.to_string());

    let mut tokens = Vec::new();
    let mut fraction = String::new();
    let mut in_fraction = false;
    for c in chn.chars() {
        if in_fraction {
            if let Some(d) = chinese_digit(c) {
                fraction.push(char::from_digit(d, 10).ok_or_else(invalid)?);
            }
            if let Some(u) = chinese_unit(c) {
                tokens.push(NumeralToken::Unit(u));
            }
        } else if c == DECIMAL_MARKER {
            in_fraction = true;
        } else if let Some(d) = chinese_digit(c) {
            tokens.push(NumeralToken::Digit(d));
        } else if let Some(u) = chinese_unit(c) {
            tokens.push(NumeralToken::Unit(u));
        }
    }
    if tokens.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }

    let mut sum = 0.0;
    let mut prev_digit: Option<u32> = None;
    for (idx, token) in tokens.iter().enumerate() {
        match *token {
            NumeralToken::Digit(d) => {
                if let Some(p) = prev_digit
                    && p != 0
                {
                    return Err(invalid());
                }
                prev_digit = Some(d);
            }
            NumeralToken::Unit(unit) => {
                if idx == 0 {
                    return Err(invalid());
                }
                let digit = prev_digit.take().unwrap_or(0) as f64;
                if unit > sum {
                    sum = (sum + digit) * unit;
                } else {
                    sum += digit * unit;
                }
            }
        }
    }
    if let Some(d) = prev_digit {
        sum += d as f64;
    }
    if !fraction.is_empty() {
        sum += format!("0.{fraction}").parse::<f64>().map_err(|_| invalid())?;
    }

    Ok((sum * 100.0).round() / 100.0)
}
