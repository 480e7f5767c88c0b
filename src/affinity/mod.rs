//! CPU affinity masks and the strategies that narrow them
//!
//! [`AffinityContext`] carries the host's logical processor count, the only
//! shared input the transforms need. Everything else is pure.

pub mod mask;
pub mod strategy;

pub use mask::{AffinityMask, MAX_LOGICAL_PROCESSORS};
pub use strategy::AffinityStrategy;

use crate::error::{GovernorError, GovernorResult};

/// Host processor topology as seen by the affinity transforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffinityContext {
    logical_processors: usize,
}

impl AffinityContext {
    /// Use the processor count reported by the operating system
    pub fn detect() -> Self {
        let logical_processors = std::thread::available_parallelism()
            .map(|count| count.get())
            .unwrap_or_else(|e| {
                log::warn!("processor count unavailable ({}), assuming 1", e);
                1
            })
            .min(MAX_LOGICAL_PROCESSORS);
        Self { logical_processors }
    }

    pub fn with_logical_processors(logical_processors: usize) -> GovernorResult<Self> {
        if logical_processors == 0 || logical_processors > MAX_LOGICAL_PROCESSORS {
            return Err(GovernorError::invalid_argument(format!(
                "logical processor count {} outside 1..={}",
                logical_processors, MAX_LOGICAL_PROCESSORS
            )));
        }
        Ok(Self { logical_processors })
    }

    #[inline]
    pub fn logical_processors(&self) -> usize {
        self.logical_processors
    }

    /// Every processor on the host
    pub fn full_mask(&self) -> GovernorResult<AffinityMask> {
        AffinityMask::full(self.logical_processors)
    }

    pub fn mask_from_bits(&self, bits: u64) -> GovernorResult<AffinityMask> {
        AffinityMask::from_bits(self.logical_processors, bits)
    }

    /// Apply `strategy` after checking both masks match the host width
    pub fn apply(
        &self,
        strategy: AffinityStrategy,
        source: &AffinityMask,
        target: &AffinityMask,
    ) -> GovernorResult<AffinityMask> {
        if source.width() != self.logical_processors {
            return Err(GovernorError::invalid_argument(format!(
                "source mask width {} does not match {} logical processors",
                source.width(),
                self.logical_processors
            )));
        }
        strategy.apply(source, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_is_within_bounds() {
        let context = AffinityContext::detect();
        assert!(context.logical_processors() >= 1);
        assert_eq!(
            context.full_mask().unwrap().count_ones(),
            context.logical_processors()
        );
    }

    #[test]
    fn test_apply_checks_host_width() {
        let context = AffinityContext::with_logical_processors(4).unwrap();
        let narrow = AffinityMask::from_bits(2, 0b11).unwrap();
        let target = context.mask_from_bits(0b1111).unwrap();
        assert!(context
            .apply(AffinityStrategy::Limit, &narrow, &target)
            .is_err());

        let source = context.mask_from_bits(0b0011).unwrap();
        let result = context
            .apply(AffinityStrategy::Limit, &source, &target)
            .unwrap();
        assert_eq!(result.as_u64(), Some(0b1100));
    }

    #[test]
    fn test_rejects_zero_processors() {
        assert!(AffinityContext::with_logical_processors(0).is_err());
    }
}
