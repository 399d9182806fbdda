//! The name-epoch-version-release-arch tuple.

use std::cmp::Ordering;
use std::fmt;

use crate::vercmp::vercmp;

/// The identity of a package: name, epoch, version, release, architecture.
///
/// The epoch is kept as a string; a package without an `EPOCH` tag reports
/// `"0"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nevra {
    /// Package name.
    pub name: String,
    /// Package epoch, `"0"` when the tag is absent.
    pub epoch: String,
    /// Package version.
    pub version: String,
    /// Package release.
    pub release: String,
    /// Package architecture.
    pub arch: String,
}

impl Nevra {
    /// Orders two packages by epoch, then version, then release.
    ///
    /// Name and architecture are not compared; callers deciding between
    /// differently named packages must check those themselves. Because of
    /// that this is a method rather than an [`Ord`] implementation.
    pub fn cmp_version(&self, other: &Nevra) -> Ordering {
        vercmp(&self.epoch, &other.epoch)
            .then_with(|| vercmp(&self.version, &other.version))
            .then_with(|| vercmp(&self.release, &other.release))
    }
}

impl fmt::Display for Nevra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}:{}-{}.{}.rpm",
            self.name, self.epoch, self.version, self.release, self.arch
        )
    }
}

/// Sorts a slice of packages by version, oldest first.
pub fn sort_by_version(packages: &mut [Nevra]) {
    packages.sort_by(|a, b| a.cmp_version(b));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nevra(epoch: &str, version: &str, release: &str) -> Nevra {
        Nevra {
            name: "pkg".into(),
            epoch: epoch.into(),
            version: version.into(),
            release: release.into(),
            arch: "x86_64".into(),
        }
    }

    #[test]
    fn test_display() {
        let n = Nevra {
            name: "simple".into(),
            epoch: "0".into(),
            version: "1.0.1".into(),
            release: "1".into(),
            arch: "i386".into(),
        };
        assert_eq!(n.to_string(), "simple-0:1.0.1-1.i386.rpm");
    }

    #[test]
    fn test_epoch_dominates() {
        let old = nevra("0", "2.0", "1");
        let new = nevra("1", "1.0", "1");
        assert_eq!(old.cmp_version(&new), Ordering::Less);
    }

    #[test]
    fn test_release_breaks_ties() {
        let a = nevra("0", "1.0", "1");
        let b = nevra("0", "1.0", "2");
        assert_eq!(a.cmp_version(&b), Ordering::Less);
        assert_eq!(a.cmp_version(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn test_sort_by_version() {
        let mut packages = vec![
            nevra("0", "2.0", "1"),
            nevra("0", "1.0~rc1", "1"),
            nevra("0", "1.0", "1"),
        ];
        sort_by_version(&mut packages);
        let versions: Vec<_> = packages.iter().map(|n| n.version.as_str()).collect();
        assert_eq!(versions, ["1.0~rc1", "1.0", "2.0"]);
    }
}
