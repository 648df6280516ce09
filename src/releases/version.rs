//! releases::version
//!
//! Loose version coercion and range constraints over [`semver`].
//!
//! Release branches are named with partial versions (`7.4`, `8.2`), which
//! are not valid semantic versions. [`coerce`] turns them into full
//! versions by taking the first run of numeric components and filling in
//! zeros. [`VersionConstraint`] accepts the range syntax CI users write
//! (`8.x`, `>= 8.1`, `^8.1 || 7.4`) and evaluates it with
//! [`semver::VersionReq`].

use semver::{Version, VersionReq};

use super::traits::ReleaseError;

/// Coerce a loose version string into a semantic version.
///
/// The first run of up to three dot-separated numeric components found
/// anywhere in the input is used; missing components are zero.
///
/// # Example
///
/// ```
/// use ci_actions::releases::coerce;
///
/// assert_eq!(coerce("8.2").unwrap().to_string(), "8.2.0");
/// assert_eq!(coerce("v7").unwrap().to_string(), "7.0.0");
/// assert_eq!(coerce("php-8.3.1-dev").unwrap().to_string(), "8.3.1");
/// assert!(coerce("next").is_err());
/// ```
pub fn coerce(input: &str) -> Result<Version, ReleaseError> {
    let invalid = || ReleaseError::InvalidVersion(input.to_string());

    let start = input.find(|c: char| c.is_ascii_digit()).ok_or_else(invalid)?;
    let mut rest = &input[start..];
    let mut parts = [0u64; 3];

    for (i, part) in parts.iter_mut().enumerate() {
        if i > 0 {
            // Only continue past a dot that is followed by a digit.
            match rest.strip_prefix('.') {
                Some(after) if after.starts_with(|c: char| c.is_ascii_digit()) => rest = after,
                _ => break,
            }
        }
        let len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        *part = rest[..len].parse().map_err(|_| invalid())?;
        rest = &rest[len..];
    }

    Ok(Version::new(parts[0], parts[1], parts[2]))
}

/// A version range expression.
///
/// `||` separates alternatives; whitespace separates comparators that must
/// all hold. A bare partial version is an X-range (`8.1` means any `8.1.x`).
#[derive(Debug, Clone)]
pub struct VersionConstraint {
    input: String,
    alternatives: Vec<VersionReq>,
}

impl VersionConstraint {
    /// Parse a range expression.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::InvalidConstraint` if any alternative does
    /// not form a valid requirement.
    pub fn parse(input: &str) -> Result<Self, ReleaseError> {
        let invalid = |message: String| ReleaseError::InvalidConstraint {
            input: input.to_string(),
            message,
        };

        let mut alternatives = Vec::new();
        for alternative in input.split("||") {
            let comparators = comparators(alternative).map_err(invalid)?;
            let req = if comparators.is_empty() {
                VersionReq::STAR
            } else {
                VersionReq::parse(&comparators.join(", ")).map_err(|e| invalid(e.to_string()))?
            };
            alternatives.push(req);
        }

        Ok(Self {
            input: input.trim().to_string(),
            alternatives,
        })
    }

    /// Parse an optional CI input; empty or whitespace-only means no constraint.
    pub fn parse_optional(input: Option<&str>) -> Result<Option<Self>, ReleaseError> {
        match input.map(str::trim) {
            None | Some("") => Ok(None),
            Some(expr) => Self::parse(expr).map(Some),
        }
    }

    /// Check whether a version satisfies any alternative.
    pub fn satisfies(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    /// The expression as given.
    pub fn as_str(&self) -> &str {
        &self.input
    }
}

impl std::fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.input)
    }
}

const OPERATOR_CHARS: &[char] = &['<', '>', '=', '~', '^'];

/// Split one alternative into `semver` comparator strings.
fn comparators(alternative: &str) -> Result<Vec<String>, String> {
    let tokens: Vec<&str> = alternative.split_whitespace().collect();

    // Hyphen range: `A - B` means `>=A, <=B`.
    if let [low, "-", high] = tokens.as_slice() {
        let mut out = Vec::new();
        if let Some(low) = partial(low)? {
            out.push(format!(">={low}"));
        }
        if let Some(high) = partial(high)? {
            out.push(format!("<={high}"));
        }
        return Ok(out);
    }

    let mut out = Vec::new();
    let mut pending_op: Option<&str> = None;
    for token in tokens {
        if token.chars().all(|c| OPERATOR_CHARS.contains(&c)) {
            if pending_op.replace(token).is_some() {
                return Err(format!("operator '{token}' follows another operator"));
            }
            continue;
        }

        let split = token
            .find(|c: char| !OPERATOR_CHARS.contains(&c))
            .unwrap_or(token.len());
        let (inline_op, version) = token.split_at(split);
        let op = match (pending_op.take(), inline_op) {
            (Some(op), "") => op,
            (Some(op), _) => return Err(format!("operator '{op}' followed by '{token}'")),
            (None, op) => op,
        };

        match (op, partial(version)?) {
            // `*`, `x`, `>=*`: no restriction from this comparator
            (_, None) => {}
            ("", Some(v)) => out.push(format!("={v}")),
            (op, Some(v)) => out.push(format!("{op}{v}")),
        }
    }

    if let Some(op) = pending_op {
        return Err(format!("operator '{op}' has no version"));
    }
    Ok(out)
}

/// Normalize a (possibly partial, possibly wildcarded) version.
///
/// Returns `None` for a full wildcard. Components after the first
/// wildcard are dropped, so `8.x.x` becomes `8`.
fn partial(version: &str) -> Result<Option<String>, String> {
    let version = version.strip_prefix(['v', 'V']).unwrap_or(version);
    let mut kept = Vec::new();
    for component in version.split('.') {
        if matches!(component, "x" | "X" | "*") {
            break;
        }
        if component.is_empty() {
            return Err(format!("empty component in '{version}'"));
        }
        kept.push(component);
    }
    Ok((!kept.is_empty()).then(|| kept.join(".")))
}
