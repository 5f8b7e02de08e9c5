//! Event-name segmentation.
//!
//! Event names are colon-delimited (`"user:created"`, `"order:*:paid"`).
//! Leading, trailing and repeated separators carry no meaning and are
//! dropped, so `":user::created:"` and `"user:created"` address the same node.
//! The root is the empty segment list, never a literal segment.

/// Separator between event-name segments.
pub const SEPARATOR: char = ':';

/// First character of a dynamic (wildcard) segment.
pub const WILDCARD: char = '*';

/// Split an event name into its non-empty segments.
///
/// ```rust
/// use gland_core::path::split;
///
/// assert_eq!(split("user:created"), vec!["user", "created"]);
/// assert_eq!(split("::a::b:"), vec!["a", "b"]);
/// assert!(split("").is_empty());
/// ```
pub fn split(name: &str) -> Vec<&str> {
    name.split(SEPARATOR).filter(|s| !s.is_empty()).collect()
}

/// Whether a segment is a wildcard.
pub fn is_dynamic(segment: &str) -> bool {
    segment.starts_with(WILDCARD)
}

/// Join segments back into a canonical event name.
pub fn join<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for segment in segments {
        if !out.is_empty() {
            out.push(SEPARATOR);
        }
        out.push_str(segment.as_ref());
    }
    out
}

/// Normalize an event name to its canonical form.
pub fn normalize(name: &str) -> String {
    join(split(name))
}

/// Qualify `sub` under `prefix`. An empty `sub` yields the prefix itself.
pub fn qualify(prefix: &str, sub: &str) -> String {
    join(split(prefix).into_iter().chain(split(sub)))
}

/// A parsed, owned event name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventPath {
    segments: Vec<String>,
}

impl EventPath {
    /// Parse an event name.
    pub fn parse(name: &str) -> Self {
        Self {
            segments: split(name).into_iter().map(str::to_owned).collect(),
        }
    }

    /// Segments in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this is the root (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether any segment is a wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(|s| is_dynamic(s))
    }

    /// Check whether this pattern matches a concrete event name.
    ///
    /// Wildcards match exactly one segment.
    pub fn matches(&self, name: &str) -> bool {
        let concrete = split(name);
        concrete.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(concrete)
                .all(|(pattern, seg)| is_dynamic(pattern) || pattern == seg)
    }
}

impl std::fmt::Display for EventPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&join(&self.segments))
    }
}
