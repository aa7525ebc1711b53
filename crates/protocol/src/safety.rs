//! L2 safety levels.

use alloc::string::{String, ToString};
use core::{
    fmt::{Display, Formatter},
    str::FromStr,
};

/// The safety level of an L2 block, ordered from least to most safe.
///
/// Heads only move forward in this order outside of an engine reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SafetyLevel {
    /// Received over gossip or built locally, not yet derived from L1.
    Unsafe,
    /// Unsafe, with all cross-chain dependencies also unsafe.
    CrossUnsafe,
    /// Derived from L1 data, with the batch it belongs to fully processed.
    LocalSafe,
    /// Local-safe, with all cross-chain dependencies also safe.
    Safe,
    /// Derived from finalized L1 data.
    Finalized,
}

impl Display for SafetyLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unsafe => write!(f, "unsafe"),
            Self::CrossUnsafe => write!(f, "cross-unsafe"),
            Self::LocalSafe => write!(f, "local-safe"),
            Self::Safe => write!(f, "safe"),
            Self::Finalized => write!(f, "finalized"),
        }
    }
}

/// An unknown safety level name.
#[derive(derive_more::Display, Debug, Clone, PartialEq, Eq)]
#[display("unknown safety level: {_0}")]
pub struct SafetyLevelParseError(pub String);

impl core::error::Error for SafetyLevelParseError {}

impl FromStr for SafetyLevel {
    type Err = SafetyLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unsafe" => Ok(Self::Unsafe),
            "cross-unsafe" => Ok(Self::CrossUnsafe),
            "local-safe" => Ok(Self::LocalSafe),
            "safe" | "cross-safe" => Ok(Self::Safe),
            "finalized" => Ok(Self::Finalized),
            _ => Err(SafetyLevelParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safety_level_order() {
        assert!(SafetyLevel::Unsafe < SafetyLevel::CrossUnsafe);
        assert!(SafetyLevel::CrossUnsafe < SafetyLevel::LocalSafe);
        assert!(SafetyLevel::LocalSafe < SafetyLevel::Safe);
        assert!(SafetyLevel::Safe < SafetyLevel::Finalized);
    }

    #[test]
    fn test_safety_level_display_from_str() {
        for level in [
            SafetyLevel::Unsafe,
            SafetyLevel::CrossUnsafe,
            SafetyLevel::LocalSafe,
            SafetyLevel::Safe,
            SafetyLevel::Finalized,
        ] {
            assert_eq!(level.to_string().parse::<SafetyLevel>(), Ok(level));
        }
        assert_eq!("cross-safe".parse::<SafetyLevel>(), Ok(SafetyLevel::Safe));
        assert_eq!(
            "pending".parse::<SafetyLevel>(),
            Err(SafetyLevelParseError("pending".to_string()))
        );
    }
}
