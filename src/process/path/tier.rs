//! Resolution tiers in ascending cost order

/// One stage of the path fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResolutionTier {
    /// Module information of the live process; often denied for elevated
    /// or system processes
    ModuleInfo,
    /// Image name read into a buffer sized to the platform path limit
    NativeBuffer,
    /// System management query; expensive, opt-in and time bounded
    Management,
}

impl ResolutionTier {
    pub const COUNT: usize = 3;

    /// Order in which the chain tries each tier
    pub const ORDER: [ResolutionTier; Self::COUNT] = [
        ResolutionTier::ModuleInfo,
        ResolutionTier::NativeBuffer,
        ResolutionTier::Management,
    ];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModuleInfo => write!(f, "module-info"),
            Self::NativeBuffer => write!(f, "native-buffer"),
            Self::Management => write!(f, "management"),
        }
    }
}
