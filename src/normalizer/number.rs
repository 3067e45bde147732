use std::sync::LazyLock;

use regex::Regex;

static COUNT_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)views?|subscribers?").unwrap());

// Lowercase `g` is not kept, uppercase `G` is.
static NON_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.,KMGBkmb]").unwrap());

static ABBREVIATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([0-9.]+)([KMB])?$").unwrap());

/// Parse a display count such as `"27.2M subscribers"`, `"7,569,331,655 views"`
/// or `"1.4K"` into an integer.
///
/// Returns `None` for absent, blank or unparsable input; that is an expected
/// outcome for optional display fields, not an error.
///
/// A `G` suffix passes the character filter but has no multiplier, so `"3G"`
/// falls through to the plain integer parse and yields `3`.
pub fn parse_human_number(input: Option<&str>) -> Option<u64> {
    let input = input?.trim();
    if input.is_empty() {
        return None;
    }

    let without_words = COUNT_WORDS.replace_all(input, "");
    let cleaned = NON_NUMERIC.replace_all(&without_words, "").replace(',', "");
    if cleaned.is_empty() {
        return None;
    }

    let Some(caps) = ABBREVIATED.captures(&cleaned) else {
        return leading_integer(&cleaned);
    };

    let mut value = leading_float(&caps[1])?;
    match caps.get(2).map(|m| m.as_str().to_ascii_uppercase()).as_deref() {
        Some("K") => value *= 1e3,
        Some("M") => value *= 1e6,
        Some("B") => value *= 1e9,
        _ => {}
    }

    // Float to int casts saturate.
    Some(value.round() as u64)
}

/// Longest prefix that reads as a decimal number: `"1.2.3"` → `1.2`.
fn leading_float(s: &str) -> Option<f64> {
    let end = s
        .char_indices()
        .filter(|&(_, c)| c == '.')
        .nth(1)
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}

fn leading_integer(s: &str) -> Option<u64> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Option<u64> {
        parse_human_number(Some(s))
    }

    #[test]
    fn test_absent_and_blank_input() {
        assert_eq!(parse_human_number(None), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("   "), None);
    }

    #[test]
    fn test_plain_integer() {
        assert_eq!(parse("424"), Some(424));
        assert_eq!(parse("  0 "), Some(0));
    }

    #[test]
    fn test_abbreviated_units() {
        assert_eq!(parse("1.4K"), Some(1_400));
        assert_eq!(parse("1.4k"), Some(1_400));
        assert_eq!(parse("27.2M"), Some(27_200_000));
        assert_eq!(parse("2.5B subscribers"), Some(2_500_000_000));
        assert_eq!(parse("12K views"), Some(12_000));
    }

    #[test]
    fn test_thousands_separators_and_words() {
        assert_eq!(parse("7,569,331,655 views"), Some(7_569_331_655));
        assert_eq!(parse("1 view"), Some(1));
        assert_eq!(parse("1,234 Subscribers"), Some(1_234));
    }

    #[test]
    fn test_rounds_after_multiplier() {
        assert_eq!(parse("1.005K"), Some(1_005));
        assert_eq!(parse("1.0004K"), Some(1_000));
        assert_eq!(parse("0.5"), Some(1));
    }

    #[test]
    fn test_unparsable() {
        assert_eq!(parse("abc"), None);
        assert_eq!(parse("No views"), None);
        assert_eq!(parse("K"), None);
        assert_eq!(parse("."), None);
    }

    #[test]
    fn test_lenient_decimal_prefix() {
        assert_eq!(parse("1.2.3"), Some(1));
        assert_eq!(parse("1.5.0K"), Some(1_500));
    }

    #[test]
    fn test_integer_fallback_for_unmatched_shapes() {
        // Two unit letters never match the abbreviated pattern.
        assert_eq!(parse("12KM"), Some(12));
    }

    #[test]
    fn test_giga_suffix_loses_magnitude() {
        assert_eq!(parse("3G"), Some(3));
        assert_eq!(parse("3g"), Some(3));
    }
}
