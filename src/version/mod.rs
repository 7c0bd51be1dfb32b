//! Version parsing and range matching for module dependency constraints.
//!
//! Constraints use a deliberately small subset of semver ranges:
//!
//! | Constraint | Satisfied when |
//! |------------|----------------|
//! | `*`        | always |
//! | `^X.Y.Z`   | same major, and available >= required |
//! | `~X.Y.Z`   | same major and minor, and available >= required |
//! | `>=X.Y.Z`  | available >= required |
//! | `>X.Y.Z`   | available > required |
//! | anything else | the two strings are identical |
//!
//! Pre-release and build suffixes (`-beta.1`, `+build5`) are dropped before
//! numeric comparison.
//!
//! # Example
//!
//! ```rust
//! use modgraph::version::is_version_satisfied;
//!
//! assert!(is_version_satisfied("^1.2.0", "1.9.9"));
//! assert!(!is_version_satisfied("~1.2.0", "1.3.0"));
//! assert!(is_version_satisfied("*", "0.0.1"));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

/// Errors produced while parsing versions or constraints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// The version string was empty once suffixes were stripped.
    #[error("empty version string")]
    Empty,

    /// A dot-separated component was not a non-negative integer.
    #[error("invalid version component '{component}' in '{input}'")]
    InvalidComponent {
        /// The full input that failed to parse
        input: String,
        /// The offending component
        component: String,
    },
}

/// Result type alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// A numeric version such as `1.2.3`.
///
/// Any number of components is accepted; components that are absent compare
/// as `0`, so `1.2` and `1.2.0` are equal.
#[derive(Debug, Clone)]
pub struct Version {
    components: Vec<u64>,
}

impl Version {
    /// Parses a version string, ignoring any `-pre` or `+build` suffix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use modgraph::version::Version;
    ///
    /// let v = Version::parse("2.4.1-beta.3").unwrap();
    /// assert_eq!((v.major(), v.minor(), v.patch()), (2, 4, 1));
    /// assert!(Version::parse("1.x.0").is_err());
    /// ```
    pub fn parse(input: &str) -> VersionResult<Self> {
        let trimmed = input.trim();
        let core = trimmed
            .split(['-', '+'])
            .next()
            .unwrap_or_default();

        if core.is_empty() {
            return Err(VersionError::Empty);
        }

        let components = core
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|_| VersionError::InvalidComponent {
                        input: input.to_string(),
                        component: part.to_string(),
                    })
            })
            .collect::<VersionResult<Vec<_>>>()?;

        Ok(Self { components })
    }

    /// Returns the component at `index`, or 0 if absent.
    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }

    /// First component, or 0.
    pub fn major(&self) -> u64 {
        self.component(0)
    }

    /// Second component, or 0.
    pub fn minor(&self) -> u64 {
        self.component(1)
    }

    /// Third component, or 0.
    pub fn patch(&self) -> u64 {
        self.component(2)
    }

    /// Returns the parsed numeric components.
    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_versions(&self.components, &other.components)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Compares two component lists, treating missing components as 0.
///
/// # Example
///
/// ```rust
/// use std::cmp::Ordering;
/// use modgraph::version::compare_versions;
///
/// assert_eq!(compare_versions(&[1, 2], &[1, 2, 0]), Ordering::Equal);
/// assert_eq!(compare_versions(&[1, 10, 0], &[1, 9, 9]), Ordering::Greater);
/// ```
pub fn compare_versions(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let left = a.get(i).copied().unwrap_or(0);
        let right = b.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// A parsed dependency constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    /// `*`: any version.
    Any,
    /// `^X.Y.Z`: compatible within the same major version.
    Caret(Version),
    /// `~X.Y.Z`: compatible within the same major and minor version.
    Tilde(Version),
    /// `>=X.Y.Z`
    AtLeast(Version),
    /// `>X.Y.Z`
    Greater(Version),
    /// Anything else, compared as a raw string.
    Exact(String),
}

impl VersionConstraint {
    /// Parses a constraint string.
    ///
    /// Strings without a recognised operator become [`VersionConstraint::Exact`]
    /// and are never rejected.
    pub fn parse(input: &str) -> VersionResult<Self> {
        let trimmed = input.trim();
        if trimmed == "*" {
            return Ok(Self::Any);
        }

        // `>=` must be tried before `>`.
        if let Some(rest) = trimmed.strip_prefix(">=") {
            Ok(Self::AtLeast(Version::parse(rest)?))
        } else if let Some(rest) = trimmed.strip_prefix('>') {
            Ok(Self::Greater(Version::parse(rest)?))
        } else if let Some(rest) = trimmed.strip_prefix('^') {
            Ok(Self::Caret(Version::parse(rest)?))
        } else if let Some(rest) = trimmed.strip_prefix('~') {
            Ok(Self::Tilde(Version::parse(rest)?))
        } else {
            Ok(Self::Exact(input.to_string()))
        }
    }

    /// Checks whether `available` satisfies this constraint.
    ///
    /// Returns an error only when a range constraint needs to parse
    /// `available` and cannot.
    pub fn matches(&self, available: &str) -> VersionResult<bool> {
        let satisfied = match self {
            Self::Any => true,
            Self::Exact(required) => required == available,
            Self::Caret(required) => {
                let available = Version::parse(available)?;
                available.major() == required.major() && available >= *required
            }
            Self::Tilde(required) => {
                let available = Version::parse(available)?;
                available.major() == required.major()
                    && available.minor() == required.minor()
                    && available >= *required
            }
            Self::AtLeast(required) => Version::parse(available)? >= *required,
            Self::Greater(required) => Version::parse(available)? > *required,
        };
        Ok(satisfied)
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Caret(v) => write!(f, "^{}", v),
            Self::Tilde(v) => write!(f, "~{}", v),
            Self::AtLeast(v) => write!(f, ">={}", v),
            Self::Greater(v) => write!(f, ">{}", v),
            Self::Exact(s) => write!(f, "{}", s),
        }
    }
}

/// Returns true if `available` satisfies the `required` constraint.
///
/// Malformed input on either side never fails the caller: it is logged as a
/// warning and treated as not satisfied.
pub fn is_version_satisfied(required: &str, available: &str) -> bool {
    if required == "*" {
        return true;
    }

    match VersionConstraint::parse(required).and_then(|c| c.matches(available)) {
        Ok(satisfied) => satisfied,
        Err(e) => {
            warn!(
                required,
                available, "Version check failed, treating as unsatisfied: {}", e
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_table() {
        let cases = [
            ("*", "0.0.1", true),
            ("^1.2.0", "1.9.9", true),
            ("^1.2.0", "2.0.0", false),
            ("~1.2.0", "1.2.9", true),
            ("~1.2.0", "1.3.0", false),
            (">=1.0.0", "1.0.0", true),
            (">1.0.0", "1.0.0", false),
            ("1.0.0", "1.0.0", true),
            ("1.0.0", "1.0.1", false),
        ];

        for (constraint, available, expected) in cases {
            assert_eq!(
                is_version_satisfied(constraint, available),
                expected,
                "{} against {}",
                constraint,
                available
            );
        }
    }

    #[test]
    fn test_caret_below_base_is_unsatisfied() {
        assert!(!is_version_satisfied("^1.2.0", "1.1.9"));
        assert!(is_version_satisfied("^1.2.0", "1.2.0"));
    }

    #[test]
    fn test_tilde_below_base_is_unsatisfied() {
        assert!(!is_version_satisfied("~1.2.3", "1.2.2"));
    }

    #[test]
    fn test_prerelease_suffix_is_stripped() {
        assert!(is_version_satisfied("^1.0.0", "1.4.0-beta.2"));
        assert!(is_version_satisfied(">=2.0.0", "2.0.0+build.7"));
    }

    #[test]
    fn test_short_versions_pad_with_zero() {
        assert!(is_version_satisfied(">=1.2", "1.2.0"));
        assert!(!is_version_satisfied(">1.2", "1.2.0"));
    }

    #[test]
    fn test_exact_match_is_raw_string_comparison() {
        // Numerically equal but textually different
        assert!(!is_version_satisfied("1.0", "1.0.0"));
        assert!(is_version_satisfied("latest", "latest"));
    }

    #[test]
    fn test_malformed_versions_are_unsatisfied() {
        assert!(!is_version_satisfied("^1.x.0", "1.2.0"));
        assert!(!is_version_satisfied("^1.0.0", "banana"));
        assert!(!is_version_satisfied(">=", "1.0.0"));
    }

    #[test]
    fn test_is_version_satisfied_is_deterministic() {
        for _ in 0..3 {
            assert!(is_version_satisfied("~3.1.0", "3.1.4"));
            assert!(!is_version_satisfied("^bad", "1.0.0"));
        }
    }

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions(&[1, 0, 0], &[1, 0, 0]), Ordering::Equal);
        assert_eq!(compare_versions(&[1, 0], &[1, 0, 1]), Ordering::Less);
        assert_eq!(compare_versions(&[2], &[1, 99, 99]), Ordering::Greater);
        assert_eq!(compare_versions(&[], &[0, 0, 0]), Ordering::Equal);
    }

    #[test]
    fn test_version_parse_errors() {
        assert_eq!(Version::parse(""), Err(VersionError::Empty));
        assert_eq!(Version::parse("-rc1"), Err(VersionError::Empty));
        assert!(matches!(
            Version::parse("1..2"),
            Err(VersionError::InvalidComponent { .. })
        ));
    }

    #[test]
    fn test_constraint_parse_and_display() {
        assert_eq!(VersionConstraint::parse("*").unwrap(), VersionConstraint::Any);
        assert_eq!(
            VersionConstraint::parse(">=1.2.3").unwrap().to_string(),
            ">=1.2.3"
        );
        assert!(matches!(
            VersionConstraint::parse("^2.0.0").unwrap(),
            VersionConstraint::Caret(_)
        ));
        assert_eq!(
            VersionConstraint::parse("1.0.0").unwrap(),
            VersionConstraint::Exact("1.0.0".to_string())
        );
    }

    #[test]
    fn test_version_ordering_ignores_trailing_zeros() {
        let a: Version = "1.2".parse().unwrap();
        let b: Version = "1.2.0".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(b.to_string(), "1.2.0");
    }
}
