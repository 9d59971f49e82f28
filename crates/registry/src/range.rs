//! Version range expressions.
//!
//! Accepted syntax:
//!
//! - `1.2.3`, `v1.2.3`, `=1.2.3`: exactly that version. A partial bare
//!   version (`1.2`) matches every patch of it.
//! - `^1.2.3`, `~1.2.3`, `>=1.0.0 <2.0.0`: comparators, space or comma
//!   separated, all of which must hold.
//! - `1.2.3 - 2.3.4`: inclusive hyphen range.
//! - `a || b`: either alternative.
//! - `*`, `x`, `1.x` and the empty string: wildcards.
//!
//! Pre-release versions only match an alternative that names a pre-release
//! of the same `major.minor.patch`.

use semver::{Comparator, Op, Version, VersionReq};

use crate::{Error, Result};

/// A parsed range: a version matches when any alternative matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Range {
    alternatives: Vec<VersionReq>,
}

impl Range {
    pub(crate) fn parse(raw: &str) -> Result<Self> {
        let alternatives = raw
            .split("||")
            .map(|alternative| {
                VersionReq::parse(&comparators(alternative)).map_err(|source| {
                    Error::InvalidRange {
                        range: raw.to_string(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { alternatives })
    }

    /// A range matching `version` and nothing else.
    pub(crate) fn exact(version: &Version) -> Self {
        let req = VersionReq {
            comparators: vec![Comparator {
                op: Op::Exact,
                major: version.major,
                minor: Some(version.minor),
                patch: Some(version.patch),
                pre: version.pre.clone(),
            }],
        };
        Self {
            alternatives: vec![req],
        }
    }

    pub(crate) fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }
}

/// Rewrite one alternative into the comma-separated comparator list
/// `VersionReq` parses.
fn comparators(alternative: &str) -> String {
    let tokens: Vec<&str> = alternative
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .collect();

    if let [low, "-", high] = tokens.as_slice() {
        return format!(">={}, <={}", strip_v(low), strip_v(high));
    }

    let mut out: Vec<String> = Vec::new();
    let mut pending_op: Option<&str> = None;

    for token in tokens {
        if is_operator(token) {
            pending_op = Some(token);
            continue;
        }
        let comparator = match pending_op.take() {
            Some(op) => format!("{op}{}", strip_v(token)),
            None => bare(token),
        };
        out.push(comparator);
    }
    if let Some(op) = pending_op {
        // A dangling operator; let the parser report it.
        out.push(op.to_string());
    }

    if out.is_empty() {
        "*".to_string()
    } else {
        out.join(", ")
    }
}

fn is_operator(token: &str) -> bool {
    matches!(token, "=" | ">" | ">=" | "<" | "<=" | "~" | "^")
}

/// A token with no leading operator. Plain versions mean themselves.
fn bare(token: &str) -> String {
    if token.starts_with(['=', '>', '<', '~', '^']) {
        let split = token
            .find(|c: char| !matches!(c, '=' | '>' | '<' | '~' | '^'))
            .unwrap_or(token.len());
        let (op, version) = token.split_at(split);
        return format!("{op}{}", strip_v(version));
    }

    let version = strip_v(token);
    let core = version.split(['-', '+']).next().unwrap_or(version);
    if core.contains(['*', 'x', 'X']) {
        version.to_string()
    } else {
        format!("={version}")
    }
}

fn strip_v(token: &str) -> &str {
    token.strip_prefix('v').unwrap_or(token)
}
