//! Sample-index expression parsing
//!
//! The planner hands indices back in many shapes: bare integers,
//! ordinal words, comma lists, ranges, "all". This module lowers any of
//! them to concrete slot numbers inside the bed domain. Out-of-range
//! values are clamped, never rejected - a command naming slot 9 on a
//! 5-slot bed should still do something sensible rather than fail.

use serde_json::Value;

/// Valid sample-slot range on the bed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleDomain {
    pub min: u8,
    pub max: u8,
}

impl SampleDomain {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    /// Clamp a raw integer into the domain
    pub fn clamp(&self, raw: i64) -> u8 {
        raw.clamp(self.min as i64, self.max as i64) as u8
    }

    /// Every slot in ascending order
    pub fn all(&self) -> Vec<u8> {
        (self.min..=self.max).collect()
    }
}

impl Default for SampleDomain {
    fn default() -> Self {
        Self { min: 1, max: 5 }
    }
}

/// Ordinals and cardinals the planner tends to emit for slots 1-5
const WORD_NUMBERS: &[(&str, i64)] = &[
    ("one", 1),
    ("first", 1),
    ("1st", 1),
    ("two", 2),
    ("second", 2),
    ("2nd", 2),
    ("three", 3),
    ("third", 3),
    ("3rd", 3),
    ("four", 4),
    ("fourth", 4),
    ("4th", 4),
    ("five", 5),
    ("fifth", 5),
    ("5th", 5),
];

fn word_to_number(s: &str) -> Option<i64> {
    WORD_NUMBERS
        .iter()
        .find(|(word, _)| *word == s)
        .map(|(_, n)| *n)
}

/// Resolve a raw index expression to concrete slot numbers.
///
/// Accepts integers, arrays (concatenated in order, duplicates kept),
/// strings containing "all" (full ascending domain), ordinal words,
/// comma-separated lists, ranges ("1-3" / "1..3"; a reversed range is
/// returned ascending rather than rejected), and bare numeric strings.
/// Anything else resolves to an empty sequence, leaving the fallback
/// policy to the caller.
pub fn parse_index_tokens(raw: &Value, domain: SampleDomain) -> Vec<u8> {
    match raw {
        Value::Number(n) => match n.as_i64() {
            Some(v) => vec![domain.clamp(v)],
            None => Vec::new(),
        },
        Value::Array(items) => items
            .iter()
            .flat_map(|item| parse_index_tokens(item, domain))
            .collect(),
        Value::String(s) => parse_index_str(s, domain),
        _ => Vec::new(),
    }
}

fn parse_index_str(raw: &str, domain: SampleDomain) -> Vec<u8> {
    let s = raw.trim().to_lowercase();
    if s.contains("all") {
        return domain.all();
    }
    if let Some(n) = word_to_number(&s) {
        return vec![domain.clamp(n)];
    }
    if s.contains(',') {
        return s
            .split(',')
            .flat_map(|part| parse_index_str(part, domain))
            .collect();
    }
    if s.contains('-') || s.contains("..") {
        let sep = if s.contains('-') { "-" } else { ".." };
        if let Some((a, b)) = s.split_once(sep) {
            if let (Ok(start), Ok(end)) = (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
                let (start, end) = (domain.clamp(start), domain.clamp(end));
                let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
                return (lo..=hi).collect();
            }
        }
        // not a parsable range; fall through to the bare-number attempt
    }
    match s.parse::<i64>() {
        Ok(n) => vec![domain.clamp(n)],
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn parse(raw: Value) -> Vec<u8> {
        parse_index_tokens(&raw, SampleDomain::default())
    }

    #[test]
    fn test_integers_clamp_into_domain() {
        assert_eq!(parse(json!(3)), vec![3]);
        assert_eq!(parse(json!(0)), vec![1]);
        assert_eq!(parse(json!(9)), vec![5]);
        assert_eq!(parse(json!(-2)), vec![1]);
    }

    #[test]
    fn test_all_expands_to_full_domain() {
        assert_eq!(parse(json!("all")), vec![1, 2, 3, 4, 5]);
        assert_eq!(parse(json!("all samples")), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_ordinal_words() {
        assert_eq!(parse(json!("fifth")), vec![5]);
        assert_eq!(parse(json!("two")), vec![2]);
        assert_eq!(parse(json!("3rd")), vec![3]);
        assert_eq!(parse(json!("First")), vec![1]);
    }

    #[test]
    fn test_arrays_concatenate_in_order() {
        assert_eq!(parse(json!([1, "2", "fourth"])), vec![1, 2, 4]);
        assert_eq!(parse(json!([2, 2])), vec![2, 2], "duplicates preserved");
        assert_eq!(parse(json!([[1, 2], 3])), vec![1, 2, 3]);
    }

    #[test]
    fn test_comma_lists() {
        assert_eq!(parse(json!("1,2,4")), vec![1, 2, 4]);
        assert_eq!(parse(json!("1, second ,4")), vec![1, 2, 4]);
    }

    #[test]
    fn test_ranges_are_inclusive() {
        assert_eq!(parse(json!("1-3")), vec![1, 2, 3]);
        assert_eq!(parse(json!("1..3")), vec![1, 2, 3]);
        assert_eq!(parse(json!("2-9")), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_reversed_range_returned_ascending() {
        assert_eq!(parse(json!("3-1")), parse(json!("1-3")));
        assert_eq!(parse(json!("5..2")), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_bare_numeric_strings() {
        assert_eq!(parse(json!("4")), vec![4]);
        assert_eq!(parse(json!(" 2 ")), vec![2]);
        assert_eq!(parse(json!("-3")), vec![1], "negative clamps to min");
    }

    #[test]
    fn test_unparseable_tokens_resolve_empty() {
        assert_eq!(parse(json!("banana")), Vec::<u8>::new());
        assert_eq!(parse(json!(null)), Vec::<u8>::new());
        assert_eq!(parse(json!(2.7)), Vec::<u8>::new());
        assert_eq!(parse(json!({"i": 1})), Vec::<u8>::new());
    }

    #[test]
    fn test_custom_domain() {
        let domain = SampleDomain::new(2, 8);
        assert_eq!(parse_index_tokens(&json!("all"), domain), vec![2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(parse_index_tokens(&json!(1), domain), vec![2]);
    }

    proptest! {
        #[test]
        fn prop_any_integer_resolves_to_its_clamp(n in any::<i64>()) {
            let domain = SampleDomain::default();
            prop_assert_eq!(parse_index_tokens(&json!(n), domain), vec![domain.clamp(n)]);
        }
    }
}
