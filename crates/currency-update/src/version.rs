use std::fmt;

/// Dotted numeric release version. Trailing zero components are dropped so
/// that `1.2` and `1.2.0` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(Vec<u64>);

impl Version {
    /// Accepts `1.2.3`, `v1.2`, `1.2.3-beta.1`, `1.2.3+build`. Pre-release
    /// and build suffixes are ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let clean = raw.trim().trim_start_matches('v');
        let base = clean.split(['-', '+']).next().unwrap_or(clean);
        if base.is_empty() {
            return None;
        }

        let mut parts = base
            .split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;

        while parts.len() > 1 && parts.last() == Some(&0) {
            parts.pop();
        }
        Some(Self(parts))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u64::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// `Some(true)` when `latest` is strictly newer than `current`, `None`
/// when either side does not parse.
pub fn is_newer(latest: &str, current: &str) -> Option<bool> {
    let latest = Version::parse(latest)?;
    let current = Version::parse(current)?;
    Some(latest > current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Version::parse("0.1.0").unwrap().to_string(), "0.1");
        assert_eq!(Version::parse("v1.2.3").unwrap().to_string(), "1.2.3");
        assert_eq!(Version::parse("2.0.0-rc.1").unwrap().to_string(), "2");
        assert!(Version::parse("").is_none());
        assert!(Version::parse("nightly").is_none());
        assert!(Version::parse("1..2").is_none());
    }

    #[test]
    fn test_ordering() {
        assert_eq!(is_newer("0.2.0", "0.1.0"), Some(true));
        assert_eq!(is_newer("0.1.10", "0.1.9"), Some(true));
        assert_eq!(is_newer("1.0", "1.0.0"), Some(false));
        assert_eq!(is_newer("0.1.0", "0.2.0"), Some(false));
        assert_eq!(is_newer("1.0.1", "1"), Some(true));
        assert_eq!(is_newer("latest", "0.1.0"), None);
    }
}
