use crate::consts::{ITEM_RE, PLACEHOLDER_RE};
use crate::error::{Result, SequenceError};
use crate::types::{Padding, SequenceItem, SequenceKey};
use std::str::FromStr;

/// Parse a string into a sequence item using its rightmost digit run.
///
/// `"frame.0001.exr"` -> prefix `frame.`, digits `0001`, suffix `.exr`.
/// Strings without ASCII digits fail with [`SequenceError::NoMatch`].
pub fn parse_item(input: &str) -> Result<SequenceItem> {
    let caps = ITEM_RE
        .captures(input)
        .ok_or_else(|| SequenceError::NoMatch {
            input: input.to_owned(),
        })?;
    let Some(digits) = caps.get(2) else {
        return Err(SequenceError::NoMatch {
            input: input.to_owned(),
        });
    };
    let value = digits
        .as_str()
        .parse::<u64>()
        .map_err(|_| SequenceError::NumberTooLarge {
            input: input.to_owned(),
        })?;
    let item = SequenceItem::from_parts(input.to_owned(), digits.start(), digits.end(), value);
    tracing::trace!(input, value, padding = ?item.padding());
    Ok(item)
}

impl FromStr for SequenceItem {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self> {
        parse_item(s)
    }
}

/// Parse a placeholder pattern such as `frame.####.exr`, `frame.%04d.exr`
/// or `frame.{item:04d}.exr` into the key it describes.
///
/// The rightmost placeholder is used. A single `#`, `%d` or `{item}` (or a
/// width below 2) means unpadded. Affixes that would themselves contain the
/// rightmost digit run are rejected, since members of such a key could
/// never be parsed back into it.
pub fn parse_pattern(pattern: &str) -> Result<SequenceKey> {
    let invalid = || SequenceError::InvalidPattern {
        pattern: pattern.to_owned(),
    };
    let caps = PLACEHOLDER_RE.captures_iter(pattern).last().ok_or_else(invalid)?;
    let Some(whole) = caps.get(0) else {
        return Err(invalid());
    };

    let width = if whole.as_str().starts_with('#') {
        whole.as_str().len()
    } else if let Some(w) = caps.get(1).or_else(|| caps.get(2)) {
        w.as_str().parse::<usize>().map_err(|_| invalid())?
    } else {
        1
    };

    let prefix = &pattern[..whole.start()];
    let suffix = &pattern[whole.end()..];
    if ends_with_digit(prefix) || has_digit(suffix) {
        return Err(invalid());
    }

    let key = SequenceKey::new(prefix, suffix, Padding::from_width(width));
    tracing::trace!(pattern, key = %key, "parsed sequence pattern");
    Ok(key)
}

pub(crate) fn ends_with_digit(s: &str) -> bool {
    s.as_bytes().last().is_some_and(u8::is_ascii_digit)
}

pub(crate) fn has_digit(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit())
}
