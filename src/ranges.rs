//! Range expressions for question numbers.
//!
//! Teachers type question sets as comma separated intervals such as
//! `"1-5, 8, 10-12"`. This module parses them into sets, cleans them up while
//! they are being typed, and compacts sets back into a canonical string.
//!
//! All functions are permissive: malformed tokens are dropped, never reported.
//! The caller shows the compacted string back to the user as feedback.

use std::collections::BTreeSet;

/// Widest `a-b` interval (`b - a`) a single token may span.
///
/// Wider intervals are treated as malformed so that a typo like
/// `1-99999999` cannot expand into an enormous set. Single numbers are never
/// capped, and [`compact_to_canonical`] splits longer runs so its output
/// always parses back.
pub const MAX_RANGE_SPAN: u32 = 10_000;

/// Parse a range expression into the set of question numbers it names.
///
/// Tokens are separated by commas. Each token is either an integer or an
/// `a-b` interval (inclusive). Reversed intervals, non-numeric tokens and
/// intervals wider than [`MAX_RANGE_SPAN`] are dropped.
///
/// # Examples
///
/// ```
/// use graderight::ranges::parse;
///
/// let questions: Vec<u32> = parse("1-3, 8, x, 7-5").into_iter().collect();
/// assert_eq!(questions, vec![1, 2, 3, 8]);
/// ```
pub fn parse(expr: &str) -> BTreeSet<u32> {
    expr.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(parse_token)
        .flatten()
        .collect()
}

fn parse_token(token: &str) -> Option<std::ops::RangeInclusive<u32>> {
    match token.split_once('-') {
        Some((start, end)) => {
            let start = parse_number(start.trim())?;
            let end = parse_number(end.trim())?;
            (start <= end && end - start <= MAX_RANGE_SPAN).then_some(start..=end)
        }
        None => parse_number(token).map(|n| n..=n),
    }
}

fn parse_number(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<u32>().ok()
}

/// Strip everything except digits, commas and hyphens.
///
/// Used on every keystroke while a range field is being edited.
pub fn sanitize_input(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '-')
        .collect()
}

/// Normalize each token in place without merging.
///
/// Reversed intervals are swapped (`"10-5"` becomes `"5-10"`), plain numbers
/// are kept as typed, anything else is dropped. Used when a range field loses
/// focus.
pub fn reorder_and_format(raw: &str) -> String {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(reorder_token)
        .collect::<Vec<_>>()
        .join(", ")
}

fn reorder_token(token: &str) -> Option<String> {
    if let Some((start, end)) = token.split_once('-') {
        if !is_digits(start) || !is_digits(end) {
            return None;
        }
        let start: u64 = start.parse().ok()?;
        let end: u64 = end.parse().ok()?;
        let (low, high) = if start > end { (end, start) } else { (start, end) };
        return Some(format!("{}-{}", low, high));
    }

    is_digits(token).then(|| token.to_string())
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Compact a set of question numbers into canonical text.
///
/// Numbers are sorted, consecutive runs become `a-b`, singletons stay bare,
/// and the parts are joined with `", "`. An empty set yields `""`. Runs wider
/// than [`MAX_RANGE_SPAN`] are split so that [`parse`] accepts every part.
pub fn compact_to_canonical<I>(numbers: I) -> String
where
    I: IntoIterator<Item = u32>,
{
    let sorted: BTreeSet<u32> = numbers.into_iter().collect();
    let mut parts = Vec::new();
    let mut run: Option<(u32, u32)> = None;

    for n in sorted {
        run = match run {
            Some((start, end)) if end.checked_add(1) == Some(n) && n - start <= MAX_RANGE_SPAN => {
                Some((start, n))
            }
            Some(previous) => {
                parts.push(format_run(previous));
                Some((n, n))
            }
            None => Some((n, n)),
        };
    }
    if let Some(last) = run {
        parts.push(format_run(last));
    }

    parts.join(", ")
}

fn format_run((start, end): (u32, u32)) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}-{}", start, end)
    }
}

/// Parse then compact: the canonical form of any typed expression.
pub fn format_and_compact(expr: &str) -> String {
    compact_to_canonical(parse(expr))
}
