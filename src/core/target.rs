//! Analytics target definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an analytics backend.
///
/// `All` is a pseudo-target: it is never registered itself and resolves at
/// dispatch time to whatever handlers are registered at that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Target {
    CrashReporter,
    ProductAnalytics,
    LogShipping,
    StructuredLog,
    All,
}

impl Target {
    /// Every concrete backend, in initialization order. Excludes `All`.
    pub const DECLARED: [Target; 4] = [
        Target::CrashReporter,
        Target::ProductAnalytics,
        Target::LogShipping,
        Target::StructuredLog,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Target::CrashReporter => "CrashReporter",
            Target::ProductAnalytics => "ProductAnalytics",
            Target::LogShipping => "LogShipping",
            Target::StructuredLog => "StructuredLog",
            Target::All => "All",
        }
    }

    #[inline]
    pub fn is_all(&self) -> bool {
        matches!(self, Target::All)
    }

    /// Concrete targets this target stands for.
    pub fn expand(&self) -> &'static [Target] {
        match self {
            Target::All => &Self::DECLARED,
            Target::CrashReporter => &[Target::CrashReporter],
            Target::ProductAnalytics => &[Target::ProductAnalytics],
            Target::LogShipping => &[Target::LogShipping],
            Target::StructuredLog => &[Target::StructuredLog],
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "crashreporter" => Ok(Target::CrashReporter),
            "productanalytics" => Ok(Target::ProductAnalytics),
            "logshipping" => Ok(Target::LogShipping),
            "structuredlog" => Ok(Target::StructuredLog),
            "all" => Ok(Target::All),
            _ => Err(format!("Invalid analytics target: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_excludes_all() {
        assert!(!Target::DECLARED.contains(&Target::All));
        assert_eq!(Target::DECLARED.len(), 4);
    }

    #[test]
    fn test_expand() {
        assert_eq!(Target::All.expand(), &Target::DECLARED);
        assert_eq!(Target::LogShipping.expand(), &[Target::LogShipping]);
    }

    #[test]
    fn test_parse() {
        assert_eq!("crash_reporter".parse::<Target>(), Ok(Target::CrashReporter));
        assert_eq!("StructuredLog".parse::<Target>(), Ok(Target::StructuredLog));
        assert_eq!("ALL".parse::<Target>(), Ok(Target::All));
        assert!("firehose".parse::<Target>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for target in Target::DECLARED {
            assert_eq!(target.to_string().parse::<Target>(), Ok(target));
        }
    }
}
