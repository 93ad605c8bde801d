use crate::error::{Result, SequenceError};
use crate::name::{ends_with_digit, has_digit};
use crate::sequence::SequenceGroup;
use crate::types::{Padding, SequenceKey};
use serde::Serialize;
use std::collections::BTreeMap;

/// What a sequence should be renamed to.
///
/// Every field left as `None` keeps the current value, so the default
/// target is a no-op. `start` is the new value of the first member; all
/// other members keep their distance from it, gaps included.
///
/// # Examples
///
/// ```rust
/// use numseq::{RenameTarget, group_sequences};
///
/// let groups = group_sequences(["shot.0001.exr", "shot.0002.exr", "shot.0004.exr"]);
/// let target = RenameTarget::new("plate.", ".exr", 101);
/// let plan = groups[0].plan_rename(&target).unwrap();
///
/// let targets: Vec<&str> = plan.renames().iter().map(|r| r.to.as_str()).collect();
/// assert_eq!(targets, ["plate.0104.exr", "plate.0102.exr", "plate.0101.exr"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameTarget {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub start: Option<u64>,
    pub padding: Option<Padding>,
}

impl RenameTarget {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>, start: u64) -> Self {
        Self {
            prefix: Some(prefix.into()),
            suffix: Some(suffix.into()),
            start: Some(start),
            padding: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = Some(padding);
        self
    }
}

/// One planned move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rename {
    pub from: String,
    pub to: String,
    pub from_value: u64,
    pub to_value: u64,
}

impl Rename {
    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

/// A complete, conflict-free mapping for one sequence.
///
/// `renames` holds one entry per member, in an order that is safe to run
/// one at a time: when values move up the highest member goes first,
/// otherwise the lowest, so no step lands on a member that hasn't moved yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamePlan {
    pub source: SequenceKey,
    pub target: SequenceKey,
    renames: Vec<Rename>,
}

impl RenamePlan {
    pub fn renames(&self) -> &[Rename] {
        &self.renames
    }

    /// The renames that actually change a name.
    pub fn changes(&self) -> impl Iterator<Item = &Rename> {
        self.renames.iter().filter(|r| !r.is_identity())
    }

    pub fn is_noop(&self) -> bool {
        self.changes().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }
}

/// Build the plan for `group`. `occupied` reports names that exist outside
/// the group and must not be overwritten.
pub(crate) fn plan_rename(
    group: &SequenceGroup,
    target: &RenameTarget,
    occupied: impl Fn(&str) -> bool,
) -> Result<RenamePlan> {
    let source = group.key().clone();
    let prefix = target.prefix.as_deref().unwrap_or(source.prefix());
    let suffix = target.suffix.as_deref().unwrap_or(source.suffix());
    let padding = target.padding.unwrap_or(source.padding());

    if ends_with_digit(prefix) {
        return Err(SequenceError::AmbiguousAffix {
            affix: prefix.to_owned(),
        });
    }
    if has_digit(suffix) {
        return Err(SequenceError::AmbiguousAffix {
            affix: suffix.to_owned(),
        });
    }
    if let Padding::Fixed(width) = padding
        && width < 2
    {
        return Err(SequenceError::InvalidPadding { width });
    }

    let first = group.first()?.value();
    let start = target.start.unwrap_or(first);
    let key = SequenceKey::new(prefix, suffix, padding);

    let mut renames = Vec::with_capacity(group.len());
    for item in group {
        let to_value = if start >= first {
            item.value().checked_add(start - first)
        } else {
            Some(item.value() - (first - start))
        }
        .ok_or_else(|| SequenceError::NumberTooLarge {
            input: item.as_str().to_owned(),
        })?;

        if let Padding::Fixed(width) = padding
            && !padding.fits(to_value)
        {
            return Err(SequenceError::WidthOverflow {
                value: to_value,
                width,
            });
        }

        renames.push(Rename {
            from: item.as_str().to_owned(),
            to: key.render(to_value),
            from_value: item.value(),
            to_value,
        });
    }

    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for r in &renames {
        *seen.entry(r.to.as_str()).or_default() += 1;
    }
    let conflicts: Vec<String> = seen
        .into_iter()
        .filter(|(to, count)| *count > 1 || occupied(*to))
        .map(|(to, _)| to.to_owned())
        .collect();
    if !conflicts.is_empty() {
        tracing::debug!(sequence = %source, conflicts = conflicts.len(), "rename rejected");
        return Err(SequenceError::Conflict { targets: conflicts });
    }

    if start > first {
        renames.reverse();
    }

    tracing::debug!(from = %source, to = %key, renames = renames.len(), "planned sequence rename");
    Ok(RenamePlan {
        source,
        target: key,
        renames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{Catalog, group_sequences};

    fn group(paths: &[&str]) -> SequenceGroup {
        let mut groups = group_sequences(paths);
        assert_eq!(groups.len(), 1);
        groups.remove(0)
    }

    fn pairs(plan: &RenamePlan) -> Vec<(&str, &str)> {
        plan.renames()
            .iter()
            .map(|r| (r.from.as_str(), r.to.as_str()))
            .collect()
    }

    #[test]
    fn shift_down_runs_ascending() {
        let g = group(&["f.0010.exr", "f.0011.exr", "f.0013.exr"]);
        let plan = g.plan_rename(&RenameTarget::default().with_start(1)).unwrap();
        assert_eq!(
            pairs(&plan),
            vec![
                ("f.0010.exr", "f.0001.exr"),
                ("f.0011.exr", "f.0002.exr"),
                ("f.0013.exr", "f.0004.exr"),
            ]
        );
    }

    #[test]
    fn shift_up_runs_descending() {
        let g = group(&["f.1", "f.2", "f.3"]);
        let plan = g.plan_rename(&RenameTarget::default().with_start(2)).unwrap();
        assert_eq!(
            pairs(&plan),
            vec![("f.3", "f.4"), ("f.2", "f.3"), ("f.1", "f.2")]
        );
    }

    #[test]
    fn default_target_is_noop() {
        let g = group(&["f.1", "f.2"]);
        let plan = g.plan_rename(&RenameTarget::default()).unwrap();
        assert_eq!(plan.len(), 2);
        assert!(plan.is_noop());
        assert_eq!(plan.source, plan.target);
    }

    #[test]
    fn repadding() {
        let g = group(&["f.0001", "f.0002"]);
        let plan = g
            .plan_rename(&RenameTarget::default().with_padding(Padding::Fixed(6)))
            .unwrap();
        assert_eq!(pairs(&plan), vec![("f.0001", "f.000001"), ("f.0002", "f.000002")]);

        let plan = g
            .plan_rename(&RenameTarget::default().with_padding(Padding::Variable))
            .unwrap();
        assert_eq!(pairs(&plan), vec![("f.0001", "f.1"), ("f.0002", "f.2")]);
    }

    #[test]
    fn width_overflow() {
        let g = group(&["f.098", "f.099"]);
        let err = g
            .plan_rename(&RenameTarget::default().with_start(99))
            .unwrap_err();
        assert_eq!(err, SequenceError::WidthOverflow { value: 100, width: 3 });
    }

    #[test]
    fn repadding_wider_than_format_widths() {
        let g = group(&["f.01", "f.02"]);
        let plan = g
            .plan_rename(&RenameTarget::default().with_padding(Padding::Fixed(70_000)))
            .unwrap();
        let to = &plan.renames()[0].to;
        assert_eq!(to.len(), "f.".len() + 70_000);
        assert!(to.ends_with("01"));
    }

    #[test]
    fn invalid_padding() {
        let g = group(&["f.1"]);
        let err = g
            .plan_rename(&RenameTarget::default().with_padding(Padding::Fixed(1)))
            .unwrap_err();
        assert_eq!(err, SequenceError::InvalidPadding { width: 1 });
    }

    #[test]
    fn ambiguous_affixes() {
        let g = group(&["f.1.exr"]);
        assert!(matches!(
            g.plan_rename(&RenameTarget::default().with_prefix("shot2")),
            Err(SequenceError::AmbiguousAffix { .. })
        ));
        assert!(matches!(
            g.plan_rename(&RenameTarget::default().with_suffix("_v2.exr")),
            Err(SequenceError::AmbiguousAffix { .. })
        ));
        // digits earlier in the prefix are fine
        assert!(g
            .plan_rename(&RenameTarget::default().with_prefix("shot2_"))
            .is_ok());
    }

    #[test]
    fn shift_overflow() {
        let max = format!("f.{}", u64::MAX);
        let g = group(&["f.1", max.as_str()]);
        assert!(matches!(
            g.plan_rename(&RenameTarget::default().with_start(2)),
            Err(SequenceError::NumberTooLarge { .. })
        ));
    }

    #[test]
    fn conflict_with_outside_input() {
        let catalog = Catalog::build(["a.1", "a.2", "b.1"]);
        let a = catalog.find("a.1").unwrap();
        let err = catalog
            .plan_rename(a, &RenameTarget::default().with_prefix("b."))
            .unwrap_err();
        assert_eq!(
            err,
            SequenceError::Conflict {
                targets: vec!["b.1".to_string()]
            }
        );
        // the group alone knows nothing about b.1
        assert!(a.plan_rename(&RenameTarget::default().with_prefix("b.")).is_ok());
    }

    #[test]
    fn overlap_with_own_members_is_fine() {
        let catalog = Catalog::build(["a.1", "a.2", "a.3"]);
        let a = catalog.find("a.1").unwrap();
        let plan = catalog
            .plan_rename(a, &RenameTarget::default().with_start(2))
            .unwrap();
        assert_eq!(plan.changes().count(), 3);
    }

    #[test]
    fn idempotent_planning() {
        let catalog = Catalog::build(["s.001.dpx", "s.002.dpx", "s.005.dpx", "other.txt"]);
        let g = catalog.find("s.###.dpx").unwrap();
        let target = RenameTarget::new("t.", ".dpx", 10);
        let a = catalog.plan_rename(g, &target).unwrap();
        let b = catalog.plan_rename(g, &target).unwrap();
        assert_eq!(a, b);
    }
}
