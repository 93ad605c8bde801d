use regex::Regex;
use std::sync::LazyLock;

/// Splits a string around its rightmost run of ASCII digits.
///
/// The lazy prefix and the digit-free suffix force the match onto the last
/// maximal run, so `shot010_v2.0042.exr` yields `0042`, not `010` or `2`.
pub static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(.*?)([0-9]+)([^0-9]*)$").unwrap());

/// Numeric-field placeholders: `####`, `%d`, `%04d`, `{item}`, `{item:04d}`.
///
/// Group 1 holds the printf width, group 2 the format-string width.
pub static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#+|%(?:0([0-9]+))?d|\{item(?::0([0-9]+)d)?\}").unwrap()
});

/// Key used for the numeric field in format-string patterns.
pub const FORMAT_KEY: &str = "item";
