//! Cell literal recognition.
//!
//! Spreadsheet exports carry numbers in a handful of human formats (`1,234.50`, `$12`,
//! `-3.5e2`) and dates in many more. This module decides whether a raw string is one of
//! those, without ever failing: anything unrecognized is simply text.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use nom::{
    branch::alt,
    bytes::complete::take_while_m_n,
    character::complete::{char, digit0, digit1, one_of},
    combinator::{all_consuming, opt, recognize},
    multi::many1,
    sequence::{pair, preceded, tuple},
    IResult,
};

/// Date formats tried when no custom list is configured
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// `1,234,567`: leading group of 1-3 digits, then at least one `,ddd` group
fn grouped_integer(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while_m_n(1, 3, is_digit),
        many1(preceded(char(','), take_while_m_n(3, 3, is_digit))),
    ))(input)
}

fn integer_part(input: &str) -> IResult<&str, &str> {
    alt((grouped_integer, digit1))(input)
}

fn mantissa(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(pair(integer_part, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ))(input)
}

fn exponent(input: &str) -> IResult<&str, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

/// Full literal: `[sign][currency]mantissa[exponent]`
fn numeric_literal(input: &str) -> IResult<&str, (Option<char>, &str)> {
    let (input, sign) = opt(one_of("+-"))(input)?;
    let (input, _) = opt(one_of("$€£¥"))(input)?;
    let (input, body) = recognize(pair(mantissa, opt(exponent)))(input)?;
    Ok((input, (sign, body)))
}

/// Parse a cell string as a finite number, if it is one.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (_, (sign, body)) = all_consuming(numeric_literal)(trimmed).ok()?;
    let value = body.replace(',', "").parse::<f64>().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if sign == Some('-') { -value } else { value })
}

/// Parse a cell string as a date or date-time using RFC 3339 and `formats`.
pub fn parse_date<S: AsRef<str>>(raw: &str, formats: &[S]) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for fmt in formats {
        let fmt = fmt.as_ref();
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Render a number the way a spreadsheet would show it in a label
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}
