//! Affinity mask transforms
//!
//! Both strategies keep the number of selected processors at or below the
//! source mask's count. Inputs are never modified.

use serde::{Deserialize, Serialize};

use super::mask::AffinityMask;
use crate::error::{GovernorError, GovernorResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AffinityStrategy {
    /// Drop the lowest-index processors from the target until it selects no
    /// more processors than the source
    #[serde(rename = "limit")]
    Limit,
    /// Keep the same count as `Limit`, spreading the retained processors
    /// evenly over the target's selection
    #[serde(rename = "scatter")]
    Scatter,
}

impl Default for AffinityStrategy {
    fn default() -> Self {
        Self::Limit
    }
}

impl AffinityStrategy {
    pub fn apply(self, source: &AffinityMask, target: &AffinityMask) -> GovernorResult<AffinityMask> {
        if source.width() != target.width() {
            return Err(GovernorError::invalid_argument(format!(
                "mask width mismatch: source {} target {}",
                source.width(),
                target.width()
            )));
        }

        let allowed = source.count_ones();
        if target.count_ones() <= allowed {
            return Ok(target.clone());
        }

        match self {
            AffinityStrategy::Limit => limit(target, allowed),
            AffinityStrategy::Scatter => scatter(target, allowed),
        }
    }
}

fn limit(target: &AffinityMask, allowed: usize) -> GovernorResult<AffinityMask> {
    let excess = target.count_ones() - allowed;
    let lowest: Vec<usize> = target.iter_ones().take(excess).collect();

    let mut result = target.clone();
    for index in lowest {
        result.clear(index)?;
    }
    Ok(result)
}

/// Keep the selected bits at ranks `i * n / k`, which are distinct and evenly
/// spaced over the target's `n` selected processors
fn scatter(target: &AffinityMask, allowed: usize) -> GovernorResult<AffinityMask> {
    let selected: Vec<usize> = target.iter_ones().collect();
    let available = selected.len();

    AffinityMask::from_indices(
        target.width(),
        (0..allowed).map(|rank| selected[rank * available / allowed]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mask(width: usize, bits: u64) -> AffinityMask {
        AffinityMask::from_bits(width, bits).unwrap()
    }

    #[test]
    fn test_limit_clears_lowest_bits() {
        let result = AffinityStrategy::Limit
            .apply(&mask(4, 0b0011), &mask(4, 0b1111))
            .unwrap();
        assert_eq!(result.as_u64(), Some(0b1100));
    }

    #[test]
    fn test_limit_keeps_smaller_target() {
        let target = mask(8, 0b0100_0001);
        let result = AffinityStrategy::Limit
            .apply(&mask(8, 0b1111), &target)
            .unwrap();
        assert_eq!(result, target);
    }

    #[test]
    fn test_scatter_spreads_selection() {
        let result = AffinityStrategy::Scatter
            .apply(&mask(8, 0b11), &mask(8, 0b1111_1111))
            .unwrap();
        assert_eq!(result.as_u64(), Some(0b0001_0001));

        let result = AffinityStrategy::Scatter
            .apply(&mask(4, 0b0011), &mask(4, 0b1111))
            .unwrap();
        assert_eq!(result.as_u64(), Some(0b0101));
    }

    #[test]
    fn test_empty_source_clears_target() {
        for strategy in [AffinityStrategy::Limit, AffinityStrategy::Scatter] {
            let result = strategy.apply(&mask(4, 0), &mask(4, 0b0110)).unwrap();
            assert!(result.is_empty());
        }
    }

    #[test]
    fn test_width_mismatch_is_invalid_argument() {
        let err = AffinityStrategy::Limit
            .apply(&mask(4, 0b1), &mask(8, 0b1))
            .unwrap_err();
        assert!(matches!(err, GovernorError::InvalidArgument(_)));
    }

    fn arb_pair() -> impl Strategy<Value = (AffinityMask, AffinityMask)> {
        (1usize..=200).prop_flat_map(|width| {
            let indices = prop::collection::vec(0..width, 0..width);
            (indices.clone(), indices).prop_map(move |(source, target)| {
                (
                    AffinityMask::from_indices(width, source).unwrap(),
                    AffinityMask::from_indices(width, target).unwrap(),
                )
            })
        })
    }

    proptest! {
        #[test]
        fn never_selects_more_than_source((source, target) in arb_pair()) {
            for strategy in [AffinityStrategy::Limit, AffinityStrategy::Scatter] {
                let result = strategy.apply(&source, &target).unwrap();
                prop_assert!(result.count_ones() <= source.count_ones());
                prop_assert_eq!(
                    result.count_ones(),
                    source.count_ones().min(target.count_ones())
                );
                // Only processors the target allowed survive.
                prop_assert!(result.iter_ones().all(|index| target.is_set(index)));
            }
        }

        #[test]
        fn limit_drops_lowest_indices((source, target) in arb_pair()) {
            let result = AffinityStrategy::Limit.apply(&source, &target).unwrap();
            let kept: Vec<usize> = result.iter_ones().collect();
            let expected: Vec<usize> = target
                .iter_ones()
                .skip(target.count_ones().saturating_sub(source.count_ones()))
                .collect();
            prop_assert_eq!(kept, expected);
        }

        #[test]
        fn scatter_is_deterministic((source, target) in arb_pair()) {
            let first = AffinityStrategy::Scatter.apply(&source, &target).unwrap();
            let second = AffinityStrategy::Scatter.apply(&source, &target).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
