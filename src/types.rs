use crate::consts::FORMAT_KEY;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// How the numeric field of a sequence is rendered.
///
/// - `Fixed(width)`: zero-padded to exactly `width` digits. Only runs that
///   start with a zero and are longer than one digit are fixed, so `width`
///   is always at least 2.
/// - `Variable`: rendered without padding (`7`, `42`, `0`).
///
/// `"7"` and `"007"` therefore never belong to the same sequence.
///
/// # Examples
///
/// ```rust
/// use numseq::types::Padding;
///
/// assert_eq!(Padding::from_digits("0042"), Padding::Fixed(4));
/// assert_eq!(Padding::from_digits("42"), Padding::Variable);
/// assert_eq!(Padding::from_digits("0"), Padding::Variable);
///
/// assert_eq!(Padding::Fixed(4).format(7), "0007");
/// assert_eq!(Padding::Variable.format(7), "7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Padding {
    /// Unpadded numbers.
    Variable,
    /// Zero-padded numbers of the given width.
    Fixed(usize),
}

impl Padding {
    /// Classify a run of ASCII digits.
    pub fn from_digits(digits: &str) -> Self {
        if digits.len() > 1 && digits.starts_with('0') {
            Padding::Fixed(digits.len())
        } else {
            Padding::Variable
        }
    }

    /// Padding for a requested width: widths of 0 or 1 mean unpadded.
    pub fn from_width(width: usize) -> Self {
        if width > 1 {
            Padding::Fixed(width)
        } else {
            Padding::Variable
        }
    }

    /// The fixed width, if any.
    pub fn width(&self) -> Option<usize> {
        match self {
            Padding::Fixed(w) => Some(*w),
            Padding::Variable => None,
        }
    }

    /// Render `value` with this padding.
    pub fn format(&self, value: u64) -> String {
        match self {
            Padding::Fixed(width) => {
                let digits = value.to_string();
                "0".repeat(width.saturating_sub(digits.len())) + &digits
            }
            Padding::Variable => value.to_string(),
        }
    }

    /// Whether `value` renders back into this padding class.
    ///
    /// A fixed field needs a leading zero, so its value must have fewer
    /// digits than the width.
    pub fn fits(&self, value: u64) -> bool {
        match self {
            Padding::Fixed(width) => digit_count(value) < *width,
            Padding::Variable => true,
        }
    }
}

fn digit_count(value: u64) -> usize {
    value.checked_ilog10().map_or(1, |l| l as usize + 1)
}

/// Placeholder notations used to write a whole sequence as one string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternStyle {
    /// `frame.####.exr` (`#` for unpadded)
    #[default]
    Hash,
    /// `frame.%04d.exr` (`%d` for unpadded)
    Printf,
    /// `frame.{item:04d}.exr` (`{item}` for unpadded)
    Format,
    /// An anchored regular expression matching exactly the members.
    Regex,
}

/// The identity of a sequence: everything except the number itself.
///
/// Two items belong to the same sequence iff their keys are equal. Keys are
/// ordered by prefix, then suffix, then padding, which gives grouping a
/// deterministic output order.
///
/// # Examples
///
/// ```rust
/// use numseq::types::{Padding, PatternStyle, SequenceKey};
///
/// let key = SequenceKey::new("render/frame.", ".exr", Padding::Fixed(4));
/// assert_eq!(key.render(12), "render/frame.0012.exr");
/// assert_eq!(key.pattern(PatternStyle::Hash), "render/frame.####.exr");
/// assert_eq!(key.pattern(PatternStyle::Printf), "render/frame.%04d.exr");
/// assert!(key.matches("render/frame.0099.exr").is_some());
/// assert!(key.matches("render/frame.99.exr").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SequenceKey {
    prefix: String,
    suffix: String,
    padding: Padding,
}

impl SequenceKey {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>, padding: Padding) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            padding,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    /// Render the member string for `value`.
    ///
    /// No check is made that `value` fits the padding; see [`Padding::fits`].
    pub fn render(&self, value: u64) -> String {
        format!("{}{}{}", self.prefix, self.padding.format(value), self.suffix)
    }

    /// Render the whole sequence with the numeric field as a placeholder.
    pub fn pattern(&self, style: PatternStyle) -> String {
        let field = match (style, self.padding) {
            (PatternStyle::Hash, Padding::Fixed(w)) => "#".repeat(w),
            (PatternStyle::Hash, Padding::Variable) => "#".to_string(),
            (PatternStyle::Printf, Padding::Fixed(w)) => format!("%0{w}d"),
            (PatternStyle::Printf, Padding::Variable) => "%d".to_string(),
            (PatternStyle::Format, Padding::Fixed(w)) => format!("{{{FORMAT_KEY}:0{w}d}}"),
            (PatternStyle::Format, Padding::Variable) => format!("{{{FORMAT_KEY}}}"),
            (PatternStyle::Regex, padding) => {
                let field = match padding {
                    Padding::Fixed(w) => format!("0[0-9]{{{}}}", w.saturating_sub(1)),
                    Padding::Variable => "(?:0|[1-9][0-9]*)".to_string(),
                };
                return format!(
                    "^{}{}{}$",
                    regex::escape(&self.prefix),
                    field,
                    regex::escape(&self.suffix)
                );
            }
        };
        format!("{}{}{}", self.prefix, field, self.suffix)
    }

    /// Parse `s` and return it as an item if it belongs to this sequence.
    pub fn matches(&self, s: &str) -> Option<SequenceItem> {
        crate::name::parse_item(s)
            .ok()
            .filter(|item| item.has_key(self))
    }
}

impl fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern(PatternStyle::Hash))
    }
}

/// One parsed member of a sequence.
///
/// Holds the original string together with the byte range of its numeric
/// field, the parsed value and the padding class. Items are immutable;
/// build them with [`crate::parse_item`] or `str::parse`.
///
/// # Examples
///
/// ```rust
/// use numseq::types::{Padding, SequenceItem};
///
/// let item: SequenceItem = "shot010_v2.0042.exr".parse().unwrap();
/// assert_eq!(item.prefix(), "shot010_v2.");
/// assert_eq!(item.digits(), "0042");
/// assert_eq!(item.suffix(), ".exr");
/// assert_eq!(item.value(), 42);
/// assert_eq!(item.padding(), Padding::Fixed(4));
/// assert_eq!(item.render(43), "shot010_v2.0043.exr");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceItem {
    source: String,
    start: usize,
    end: usize,
    value: u64,
    padding: Padding,
}

impl SequenceItem {
    pub(crate) fn from_parts(source: String, start: usize, end: usize, value: u64) -> Self {
        let padding = Padding::from_digits(&source[start..end]);
        Self {
            source,
            start,
            end,
            value,
            padding,
        }
    }

    /// The original string.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn prefix(&self) -> &str {
        &self.source[..self.start]
    }

    /// The numeric field exactly as written.
    pub fn digits(&self) -> &str {
        &self.source[self.start..self.end]
    }

    pub fn suffix(&self) -> &str {
        &self.source[self.end..]
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn key(&self) -> SequenceKey {
        SequenceKey::new(self.prefix(), self.suffix(), self.padding)
    }

    /// Whether this item belongs to the sequence identified by `key`.
    pub fn has_key(&self, key: &SequenceKey) -> bool {
        self.padding == key.padding && self.prefix() == key.prefix && self.suffix() == key.suffix
    }

    /// Whether both items belong to the same sequence.
    pub fn same_sequence(&self, other: &SequenceItem) -> bool {
        self.padding == other.padding
            && self.prefix() == other.prefix()
            && self.suffix() == other.suffix()
    }

    /// Render a sibling of this item with another value and the same padding.
    pub fn render(&self, value: u64) -> String {
        format!("{}{}{}", self.prefix(), self.padding.format(value), self.suffix())
    }
}

impl Ord for SequenceItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.prefix()
            .cmp(other.prefix())
            .then_with(|| self.suffix().cmp(other.suffix()))
            .then_with(|| self.padding.cmp(&other.padding))
            .then_with(|| self.value.cmp(&other.value))
    }
}

impl PartialOrd for SequenceItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SequenceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl AsRef<str> for SequenceItem {
    fn as_ref(&self) -> &str {
        &self.source
    }
}

impl Serialize for SequenceItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("SequenceItem", 6)?;
        s.serialize_field("path", self.as_str())?;
        s.serialize_field("prefix", self.prefix())?;
        s.serialize_field("digits", self.digits())?;
        s.serialize_field("suffix", self.suffix())?;
        s.serialize_field("value", &self.value)?;
        s.serialize_field("padding", &self.padding)?;
        s.end()
    }
}
