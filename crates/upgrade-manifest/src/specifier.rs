use std::sync::LazyLock;

use regex::Regex;
use semver::{Op, Version, VersionReq};

static MAJOR_WILDCARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<major>0|[1-9]\d*)\.x$").expect("major wildcard pattern is valid")
});

static DISJUNCTION_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\|\|\s*").expect("disjunction separator pattern is valid"));

/// Shape of a dependency version specifier, as far as the rewriter understands it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecifierShape {
    /// `21.2.3`
    Exact(Version),
    /// `21.x`
    MajorWildcard(u64),
    /// `^21.0.0`
    Caret(Version),
    /// `^20.0.0 || ^21.0.0`, kept verbatim along with its first separator.
    Disjunction { specifier: String, separator: String },
    /// Tilde ranges, `file:`/`link:`/`workspace:` references, dist-tags, anything else.
    Unrecognized,
}

impl SpecifierShape {
    #[must_use]
    pub fn classify(specifier: &str) -> Self {
        if let Ok(version) = Version::parse(specifier) {
            return Self::Exact(version);
        }

        if let Some(captures) = MAJOR_WILDCARD.captures(specifier) {
            if let Ok(major) = captures["major"].parse() {
                return Self::MajorWildcard(major);
            }
        }

        if let Some(rest) = specifier.strip_prefix('^') {
            if let Ok(version) = Version::parse(rest) {
                return Self::Caret(version);
            }
        }

        if let Some(separator) = DISJUNCTION_SEPARATOR.find(specifier) {
            if DISJUNCTION_SEPARATOR
                .split(specifier)
                .all(|alternative| !alternative.is_empty() && VersionReq::parse(alternative).is_ok())
            {
                return Self::Disjunction {
                    specifier: specifier.to_string(),
                    separator: separator.as_str().to_string(),
                };
            }
        }

        Self::Unrecognized
    }

    /// The specifier this shape should carry to track `target`.
    ///
    /// Returns `None` when the specifier stays as it is: always for
    /// [`SpecifierShape::Unrecognized`], and for a disjunction that already admits
    /// the target major.
    #[must_use]
    pub fn retarget(&self, target: &Version) -> Option<String> {
        match self {
            Self::Exact(_) => Some(target.to_string()),
            Self::MajorWildcard(_) => Some(format!("{}.x", target.major)),
            Self::Caret(_) => Some(format!("^{target}")),
            Self::Disjunction {
                specifier,
                separator,
            } => {
                if DISJUNCTION_SEPARATOR
                    .split(specifier)
                    .any(|alternative| admits_major(alternative, target.major))
                {
                    return None;
                }
                Some(format!("{specifier}{separator}^{}.0.0", target.major))
            }
            Self::Unrecognized => None,
        }
    }
}

/// An upper bound such as `<22.0.0` names the major without admitting it.
fn admits_major(alternative: &str, major: u64) -> bool {
    VersionReq::parse(alternative).is_ok_and(|req| {
        req.comparators.iter().any(|comparator| {
            comparator.major == major && !matches!(comparator.op, Op::Less | Op::LessEq)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).expect("valid test version")
    }

    #[test]
    fn classify_exact() {
        assert_eq!(SpecifierShape::classify("21.2.3"), SpecifierShape::Exact(v("21.2.3")));
        assert_eq!(
            SpecifierShape::classify("22.0.0-beta.1"),
            SpecifierShape::Exact(v("22.0.0-beta.1"))
        );
    }

    #[test]
    fn classify_major_wildcard() {
        assert_eq!(SpecifierShape::classify("21.x"), SpecifierShape::MajorWildcard(21));
        assert_eq!(SpecifierShape::classify("21.x.x"), SpecifierShape::Unrecognized);
    }

    #[test]
    fn classify_caret() {
        assert_eq!(SpecifierShape::classify("^21.0.0"), SpecifierShape::Caret(v("21.0.0")));
        assert_eq!(SpecifierShape::classify("^21"), SpecifierShape::Unrecognized);
    }

    #[test]
    fn classify_disjunction_keeps_separator() {
        let shape = SpecifierShape::classify("^20.0.0||^21.0.0");

        assert_eq!(
            shape,
            SpecifierShape::Disjunction {
                specifier: "^20.0.0||^21.0.0".to_string(),
                separator: "||".to_string(),
            }
        );
    }

    #[test]
    fn disjunction_with_unparsable_alternative_is_unrecognized() {
        assert_eq!(
            SpecifierShape::classify("^20.0.0 || latest"),
            SpecifierShape::Unrecognized
        );
        assert_eq!(SpecifierShape::classify("^20.0.0 || "), SpecifierShape::Unrecognized);
    }

    #[test]
    fn classify_unrecognized() {
        for specifier in [
            "~21.0.0",
            "latest",
            "file:../nx",
            "link:../nx",
            "workspace:*",
            "*",
            "",
        ] {
            assert_eq!(
                SpecifierShape::classify(specifier),
                SpecifierShape::Unrecognized,
                "{specifier}"
            );
        }
    }

    #[test]
    fn retarget_each_shape() {
        let target = v("22.1.0");

        assert_eq!(
            SpecifierShape::classify("21.2.3").retarget(&target).as_deref(),
            Some("22.1.0")
        );
        assert_eq!(
            SpecifierShape::classify("21.x").retarget(&target).as_deref(),
            Some("22.x")
        );
        assert_eq!(
            SpecifierShape::classify("^21.0.0").retarget(&target).as_deref(),
            Some("^22.1.0")
        );
        assert_eq!(
            SpecifierShape::classify("^20.0.0 || ^21.0.0")
                .retarget(&target)
                .as_deref(),
            Some("^20.0.0 || ^21.0.0 || ^22.0.0")
        );
        assert_eq!(SpecifierShape::classify("~21.0.0").retarget(&target), None);
    }

    #[test]
    fn disjunction_already_covering_major_is_unchanged() {
        let target = v("22.3.1");

        assert_eq!(
            SpecifierShape::classify("^21.0.0 || ^22.0.0").retarget(&target),
            None
        );
        assert_eq!(
            SpecifierShape::classify("^20.0.0 || ^22.0.0||^21.0.0").retarget(&target),
            None
        );
    }

    #[test]
    fn disjunction_keeps_mixed_separators_when_extended() {
        assert_eq!(
            SpecifierShape::classify("^19.0.0||^20.0.0 || ^21.0.0")
                .retarget(&v("22.0.0"))
                .as_deref(),
            Some("^19.0.0||^20.0.0 || ^21.0.0||^22.0.0")
        );
    }

    #[test]
    fn upper_bound_on_target_major_does_not_cover_it() {
        let target = v("22.0.0");

        assert_eq!(
            SpecifierShape::classify("^20.0.0 || <22.0.0")
                .retarget(&target)
                .as_deref(),
            Some("^20.0.0 || <22.0.0 || ^22.0.0")
        );
        assert_eq!(
            SpecifierShape::classify("^20.0.0 || >=22.0.0").retarget(&target),
            None
        );
    }
}
