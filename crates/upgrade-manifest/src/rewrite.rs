use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use semver::Version;

use crate::{PackageMatcher, SpecifierShape};

static DEPENDENCY_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?P<name>[^"\\]+)"(?P<colon>\s*:\s*)"(?P<spec>[^"\\]*)""#)
        .expect("dependency entry pattern is valid")
});

const DEPENDENCY_TABLES: [&str; 4] = [
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

/// One dependency whose specifier was updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecifierChange {
    pub package: String,
    pub from: String,
    pub to: String,
}

/// Result of rewriting a single manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub changes: Vec<SpecifierChange>,
}

impl Rewrite {
    #[must_use]
    pub fn is_changed(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Points every specifier of a matched package at `target`, according to its shape.
///
/// Only entries of the top-level dependency tables are considered; scripts and
/// tool configuration keyed by package name are left alone. Only the specifier
/// text between the quotes changes, so whitespace, key order and every
/// unmatched or unrecognized entry are preserved byte for byte. Applying the
/// function to its own output yields the same text.
#[must_use]
pub fn rewrite_manifest(text: &str, matcher: &PackageMatcher, target: &Version) -> Rewrite {
    let mut changes = Vec::new();
    let mut rewritten = String::with_capacity(text.len());
    let mut cursor = 0;

    for table in dependency_tables(text) {
        rewritten.push_str(&text[cursor..table.start]);
        rewritten.push_str(&rewrite_table(
            &text[table.clone()],
            matcher,
            target,
            &mut changes,
        ));
        cursor = table.end;
    }
    rewritten.push_str(&text[cursor..]);

    Rewrite {
        text: rewritten,
        changes,
    }
}

fn rewrite_table(
    table: &str,
    matcher: &PackageMatcher,
    target: &Version,
    changes: &mut Vec<SpecifierChange>,
) -> String {
    DEPENDENCY_ENTRY
        .replace_all(table, |captures: &Captures<'_>| {
            let entry = captures[0].to_string();
            let name = &captures["name"];
            if !matcher.is_match(name) {
                return entry;
            }

            let from = &captures["spec"];
            let Some(to) = SpecifierShape::classify(from).retarget(target) else {
                return entry;
            };
            if to == from {
                return entry;
            }

            changes.push(SpecifierChange {
                package: name.to_string(),
                from: from.to_string(),
                to: to.clone(),
            });
            format!("\"{name}\"{}\"{to}\"", &captures["colon"])
        })
        .into_owned()
}

/// Byte ranges of the bodies of the top-level dependency objects, in document order.
///
/// A structural scan rather than a parse, so malformed input yields whatever
/// tables were recognizable before the damage.
fn dependency_tables(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut tables = Vec::new();
    let mut depth = 0usize;
    let mut key: Option<Range<usize>> = None;
    let mut open: Option<usize> = None;
    let mut index = 0;

    while index < bytes.len() {
        match bytes[index] {
            b'"' => {
                let start = index + 1;
                index = closing_quote(bytes, start);
                if depth == 1 {
                    key = Some(start..index);
                }
            }
            b'{' | b'[' => {
                depth += 1;
                if depth == 2 && bytes[index] == b'{' {
                    let is_table = key
                        .take()
                        .is_some_and(|name| DEPENDENCY_TABLES.contains(&&text[name]));
                    if is_table {
                        open = Some(index + 1);
                    }
                }
            }
            b'}' | b']' => {
                if depth == 2 {
                    if let Some(start) = open.take() {
                        tables.push(start..index);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            b',' if depth == 1 => key = None,
            _ => {}
        }
        index += 1;
    }

    tables
}

fn closing_quote(bytes: &[u8], mut index: usize) -> usize {
    while index < bytes.len() {
        match bytes[index] {
            b'\\' => index += 2,
            b'"' => return index,
            _ => index += 1,
        }
    }
    bytes.len()
}
