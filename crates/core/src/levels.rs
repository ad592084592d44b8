//! Level brackets and bracket selection.
//!
//! Brackets are inclusive `[min_points, max_points]` ranges. A `None`
//! upper bound marks an open-ended top bracket. When no bracket contains a
//! total, selection falls back to the last bracket in `min_points` order
//! and reports it as [`LevelSelection::Fallback`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::LevelId;

/// A configured level bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub min_points: i64,
    /// Inclusive upper bound. `None` means unbounded.
    pub max_points: Option<i64>,
    pub name: Option<String>,
    pub badge: Option<String>,
}

impl Level {
    pub fn contains(&self, total: i64) -> bool {
        total >= self.min_points && self.max_points.map_or(true, |max| total <= max)
    }

    /// Human-readable label, e.g. for level-up notifications.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Level {}", self.id),
        }
    }
}

/// Outcome of [`select_level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelSelection<'a> {
    /// The total falls inside this bracket.
    Bracket(&'a Level),
    /// No bracket contains the total; the last bracket was chosen.
    Fallback(&'a Level),
}

impl<'a> LevelSelection<'a> {
    pub fn level(&self) -> &'a Level {
        match self {
            Self::Bracket(level) | Self::Fallback(level) => level,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Sort brackets ascending by `min_points`, breaking ties on `id`.
pub fn sort_brackets(levels: &mut [Level]) {
    levels.sort_by_key(|l| (l.min_points, l.id));
}

/// Pick the bracket containing `total`.
///
/// `levels` must be sorted ascending by `min_points` (see
/// [`sort_brackets`]). The first containing bracket wins. An empty table is
/// a configuration error.
pub fn select_level(levels: &[Level], total: i64) -> Result<LevelSelection<'_>, CoreError> {
    if let Some(level) = levels.iter().find(|l| l.contains(total)) {
        return Ok(LevelSelection::Bracket(level));
    }
    levels
        .last()
        .map(LevelSelection::Fallback)
        .ok_or_else(|| CoreError::Configuration("No levels are configured".to_string()))
}

/// A structural problem in the bracket table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BracketIssue {
    /// `max_points < min_points`.
    Inverted { level: LevelId },
    /// Points strictly between two brackets belong to neither.
    Gap { below: LevelId, above: LevelId },
    /// Two brackets share at least one point value.
    Overlap { lower: LevelId, upper: LevelId },
    /// An open-ended bracket that is not the last one.
    UnboundedBeforeEnd { level: LevelId },
}

/// Check a sorted bracket table for gaps, overlaps and inverted ranges.
pub fn bracket_issues(levels: &[Level]) -> Vec<BracketIssue> {
    let mut issues = Vec::new();

    for level in levels {
        if level.max_points.is_some_and(|max| max < level.min_points) {
            issues.push(BracketIssue::Inverted { level: level.id });
        }
    }

    for pair in levels.windows(2) {
        let (lower, upper) = (&pair[0], &pair[1]);
        match lower.max_points {
            None => issues.push(BracketIssue::UnboundedBeforeEnd { level: lower.id }),
            Some(max) if upper.min_points > max.saturating_add(1) => {
                issues.push(BracketIssue::Gap {
                    below: lower.id,
                    above: upper.id,
                });
            }
            Some(max) if upper.min_points <= max => {
                issues.push(BracketIssue::Overlap {
                    lower: lower.id,
                    upper: upper.id,
                });
            }
            Some(_) => {}
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn level(id: LevelId, min: i64, max: Option<i64>) -> Level {
        Level {
            id,
            min_points: min,
            max_points: max,
            name: None,
            badge: None,
        }
    }

    fn two_brackets() -> Vec<Level> {
        vec![level(1, 0, Some(9)), level(2, 10, Some(19))]
    }

    #[test]
    fn total_inside_bracket_selects_it() {
        let levels = two_brackets();
        assert_eq!(select_level(&levels, 0).unwrap(), LevelSelection::Bracket(&levels[0]));
        assert_eq!(select_level(&levels, 9).unwrap().level().id, 1);
        assert_eq!(select_level(&levels, 10).unwrap().level().id, 2);
        assert_eq!(select_level(&levels, 19).unwrap().level().id, 2);
    }

    #[test]
    fn total_above_every_bracket_falls_back_to_last() {
        let levels = two_brackets();
        let selection = select_level(&levels, 25).unwrap();
        assert!(selection.is_fallback());
        assert_eq!(selection.level().id, 2);
    }

    #[test]
    fn unbounded_top_bracket_absorbs_large_totals() {
        let levels = vec![level(1, 0, Some(9)), level(2, 10, None)];
        let selection = select_level(&levels, 10_000).unwrap();
        assert!(!selection.is_fallback());
        assert_eq!(selection.level().id, 2);
    }

    #[test]
    fn total_below_first_bracket_falls_back_to_last() {
        let levels = vec![level(1, 5, Some(9)), level(2, 10, Some(19))];
        assert_matches!(select_level(&levels, 2), Ok(LevelSelection::Fallback(l)) if l.id == 2);
    }

    #[test]
    fn empty_table_is_configuration_error() {
        assert_matches!(select_level(&[], 3), Err(CoreError::Configuration(_)));
    }

    #[test]
    fn sort_orders_by_min_points() {
        let mut levels = vec![level(3, 20, None), level(1, 0, Some(9)), level(2, 10, Some(19))];
        sort_brackets(&mut levels);
        let ids: Vec<LevelId> = levels.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn contiguous_table_has_no_issues() {
        let levels = vec![level(1, 0, Some(9)), level(2, 10, Some(19)), level(3, 20, None)];
        assert!(bracket_issues(&levels).is_empty());
    }

    #[test]
    fn gaps_overlaps_and_inversions_are_reported() {
        let levels = vec![
            level(1, 0, Some(9)),
            level(2, 12, Some(19)),
            level(3, 19, Some(15)),
        ];
        let issues = bracket_issues(&levels);
        assert!(issues.contains(&BracketIssue::Gap { below: 1, above: 2 }));
        assert!(issues.contains(&BracketIssue::Overlap { lower: 2, upper: 3 }));
        assert!(issues.contains(&BracketIssue::Inverted { level: 3 }));
    }

    #[test]
    fn unbounded_bracket_before_end_is_reported() {
        let levels = vec![level(1, 0, None), level(2, 10, Some(19))];
        assert_eq!(
            bracket_issues(&levels),
            vec![BracketIssue::UnboundedBeforeEnd { level: 1 }]
        );
    }

    #[test]
    fn display_name_prefers_configured_name() {
        let mut named = level(4, 30, None);
        named.name = Some("Virtuoso".into());
        assert_eq!(named.display_name(), "Virtuoso");
        assert_eq!(level(2, 10, None).display_name(), "Level 2");
    }
}
