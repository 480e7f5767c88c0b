//! Fixed-width processor bit vector
//!
//! Width equals the host's logical processor count. Bits are stored inline in
//! 64-bit words, so masks never allocate.

use arrayvec::ArrayVec;

use crate::error::{GovernorError, GovernorResult};

/// Largest processor count a mask can describe
pub const MAX_LOGICAL_PROCESSORS: usize = 1024;

const WORD_BITS: usize = u64::BITS as usize;
const MAX_WORDS: usize = MAX_LOGICAL_PROCESSORS / WORD_BITS;

/// Set of logical processors a process may run on
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AffinityMask {
    width: usize,
    words: ArrayVec<u64, MAX_WORDS>,
}

impl AffinityMask {
    /// Mask with no processors selected
    pub fn empty(width: usize) -> GovernorResult<Self> {
        if width == 0 || width > MAX_LOGICAL_PROCESSORS {
            return Err(GovernorError::invalid_argument(format!(
                "mask width {} outside 1..={}",
                width, MAX_LOGICAL_PROCESSORS
            )));
        }

        let mut words = ArrayVec::new();
        for _ in 0..width.div_ceil(WORD_BITS) {
            words.push(0);
        }
        Ok(Self { width, words })
    }

    /// Mask with every processor selected
    pub fn full(width: usize) -> GovernorResult<Self> {
        let mut mask = Self::empty(width)?;
        for index in 0..width {
            mask.words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
        }
        Ok(mask)
    }

    /// Mask from the low `width` bits of `bits`
    pub fn from_bits(width: usize, bits: u64) -> GovernorResult<Self> {
        let mut mask = Self::empty(width)?;
        if width < WORD_BITS && bits >> width != 0 {
            return Err(GovernorError::invalid_argument(format!(
                "bits {:#b} exceed mask width {}",
                bits, width
            )));
        }
        mask.words[0] = bits;
        Ok(mask)
    }

    /// Mask with the given processor indices selected
    pub fn from_indices<I>(width: usize, indices: I) -> GovernorResult<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut mask = Self::empty(width)?;
        for index in indices {
            mask.set(index)?;
        }
        Ok(mask)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    pub fn is_set(&self, index: usize) -> bool {
        index < self.width && self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
    }

    pub fn set(&mut self, index: usize) -> GovernorResult<()> {
        self.check_index(index)?;
        self.words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
        Ok(())
    }

    pub fn clear(&mut self, index: usize) -> GovernorResult<()> {
        self.check_index(index)?;
        self.words[index / WORD_BITS] &= !(1 << (index % WORD_BITS));
        Ok(())
    }

    /// Indices of selected processors in ascending order
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.width).filter(move |index| self.is_set(*index))
    }

    /// Whole mask as one word when it fits
    pub fn as_u64(&self) -> Option<u64> {
        (self.width <= WORD_BITS).then(|| self.words[0])
    }

    fn check_index(&self, index: usize) -> GovernorResult<()> {
        if index >= self.width {
            return Err(GovernorError::invalid_argument(format!(
                "processor index {} outside mask width {}",
                index, self.width
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for AffinityMask {
    /// Highest processor first, one digit per processor
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for index in (0..self.width).rev() {
            f.write_str(if self.is_set(index) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for AffinityMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AffinityMask({}: {})", self.width, self)
    }
}
