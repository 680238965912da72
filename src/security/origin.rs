//! Origin allow-list matching.
//!
//! # Responsibilities
//! - Compile configured origin patterns once, on first use
//! - Fall back to the built-in localhost/`file://` set when configuration
//!   is empty or does not compile
//! - Normalize candidate origins and test them against the compiled set
//!
//! # Design Decisions
//! - The compiled set is immutable; `reload` swaps in a new set atomically
//! - Rejections are logged here so callers only ever see a boolean
//! - `file://` and other opaque origins are compared as raw strings

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use regex::Regex;
use url::Url;

/// Origin used for packaged renderer contexts that cannot send headers.
pub const FILE_ORIGIN: &str = "file://";

const DEFAULT_PATTERNS: &[&str] = &[
    r"^https://localhost(:\d+)?$",
    r"^https://127\.0\.0\.1(:\d+)?$",
    r"^file://.*$",
];

/// Error compiling a configured origin pattern.
#[derive(Debug, thiserror::Error)]
#[error("invalid origin pattern '{pattern}': {source}")]
pub struct PatternError {
    pattern: String,
    #[source]
    source: regex::Error,
}

/// An immutable, compiled set of allowed origin patterns.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Regex>,
    defaults: bool,
}

impl PatternSet {
    /// Compile every pattern, failing on the first one that does not compile.
    pub fn compile<S: AsRef<str>>(sources: &[S]) -> Result<Self, PatternError> {
        let patterns = sources
            .iter()
            .map(|s| compile_pattern(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
            defaults: false,
        })
    }

    /// The built-in set: localhost and 127.0.0.1 over https on any port, plus `file://`.
    pub fn defaults() -> Self {
        let patterns = DEFAULT_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();
        Self {
            patterns,
            defaults: true,
        }
    }

    /// Compile configured patterns, using the defaults when there are none
    /// or when any of them is invalid.
    pub fn from_config<S: AsRef<str>>(sources: &[S]) -> Self {
        if sources.is_empty() {
            tracing::info!("No allowed origins configured, using defaults");
            return Self::defaults();
        }

        match Self::compile(sources) {
            Ok(set) => set,
            Err(e) => {
                tracing::error!(error = %e, "Failed to compile allowed origins, using defaults");
                Self::defaults()
            }
        }
    }

    pub fn matches(&self, origin: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(origin))
    }

    /// Pattern sources, for diagnostics.
    pub fn describe(&self) -> Vec<&str> {
        self.patterns.iter().map(Regex::as_str).collect()
    }

    pub fn is_default(&self) -> bool {
        self.defaults
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// `/.../` is taken as a raw regex. Anything else is a literal where `*`
/// matches any run of characters, anchored at both ends.
fn compile_pattern(source: &str) -> Result<Regex, PatternError> {
    let regex = if source.len() >= 2 && source.starts_with('/') && source.ends_with('/') {
        source[1..source.len() - 1].to_string()
    } else {
        let body = source
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        format!("^{body}$")
    };

    Regex::new(&regex).map_err(|source_err| PatternError {
        pattern: source.to_string(),
        source: source_err,
    })
}

/// Reduce an origin candidate to the form patterns are matched against.
///
/// Absolute URLs with a host collapse to `scheme://host[:port]` (default
/// ports dropped). Strings that do not parse, or parse to an opaque origin
/// such as `file://...`, are kept verbatim. Blank input yields `None`.
pub fn normalize_origin(origin: &str) -> Option<String> {
    let origin = origin.trim();
    if origin.is_empty() {
        return None;
    }

    match Url::parse(origin) {
        Ok(url) => {
            let parsed = url.origin();
            if parsed.is_tuple() {
                Some(parsed.ascii_serialization())
            } else {
                Some(origin.to_string())
            }
        }
        Err(_) => Some(origin.to_string()),
    }
}

/// Process-wide origin allow-list.
#[derive(Debug)]
pub struct OriginMatcher {
    sources: Vec<String>,
    compiled: ArcSwapOption<PatternSet>,
}

impl OriginMatcher {
    /// Create a matcher over configured patterns. Nothing is compiled until
    /// the first `load` or `validate`.
    pub fn new(sources: Vec<String>) -> Self {
        Self {
            sources,
            compiled: ArcSwapOption::empty(),
        }
    }

    /// Return the compiled pattern set, compiling it on first call.
    pub fn load(&self) -> Arc<PatternSet> {
        if let Some(set) = self.compiled.load_full() {
            return set;
        }

        let set = Arc::new(PatternSet::from_config(&self.sources));
        tracing::info!(
            patterns = ?set.describe(),
            defaults = set.is_default(),
            "Allowed origins loaded"
        );
        self.compiled.store(Some(Arc::clone(&set)));
        set
    }

    /// Replace the active pattern set.
    pub fn reload<S: AsRef<str>>(&self, sources: &[S]) -> Arc<PatternSet> {
        let set = Arc::new(PatternSet::from_config(sources));
        tracing::info!(
            patterns = ?set.describe(),
            defaults = set.is_default(),
            "Allowed origins reloaded"
        );
        self.compiled.store(Some(Arc::clone(&set)));
        set
    }

    /// Returns true iff the normalized origin matches an allowed pattern.
    pub fn validate(&self, origin: &str) -> bool {
        let patterns = self.load();

        let Some(normalized) = normalize_origin(origin) else {
            tracing::warn!(origin = %origin, patterns = ?patterns.describe(), "Empty origin rejected");
            return false;
        };

        let allowed = patterns.matches(&normalized);
        if !allowed {
            tracing::warn!(
                origin = %normalized,
                patterns = ?patterns.describe(),
                "Origin validation failed"
            );
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns() {
        let matcher = OriginMatcher::new(Vec::new());
        assert!(matcher.load().is_default());

        assert!(matcher.validate("https://localhost:5173"));
        assert!(matcher.validate("https://localhost"));
        assert!(matcher.validate("https://127.0.0.1:8443"));
        assert!(matcher.validate("file://"));
        assert!(matcher.validate("file:///opt/app/index.html"));

        assert!(!matcher.validate("http://localhost:5173"));
        assert!(!matcher.validate("https://localhost.evil.example"));
        assert!(!matcher.validate("https://evil.example"));
    }

    #[test]
    fn test_literal_wildcard_pattern() {
        let matcher = OriginMatcher::new(vec!["https://*.example.com".into()]);

        assert!(matcher.validate("https://app.example.com"));
        assert!(matcher.validate("https://a.b.example.com"));
        assert!(!matcher.validate("https://example.com"));
        // `.` is literal, not "any character"
        assert!(!matcher.validate("https://appxexample.com"));
        assert!(!matcher.validate("https://app.example.com.evil"));
    }

    #[test]
    fn test_raw_regex_pattern() {
        let matcher = OriginMatcher::new(vec![r"/^https://[a-z]+\.corp:\d+$/".into()]);

        assert!(matcher.validate("https://intranet.corp:9000"));
        assert!(!matcher.validate("https://intranet.corp"));
        assert!(!matcher.load().is_default());
    }

    #[test]
    fn test_invalid_pattern_falls_back_to_defaults() {
        let matcher = OriginMatcher::new(vec!["https://ok.example".into(), "/(unclosed/".into()]);

        let set = matcher.load();
        assert!(set.is_default());
        assert!(matcher.validate("https://localhost:3000"));
        assert!(!matcher.validate("https://ok.example"));
    }

    #[test]
    fn test_full_urls_are_normalized() {
        let matcher = OriginMatcher::new(vec!["https://app.example.com".into()]);

        assert!(matcher.validate("https://app.example.com/some/page?q=1"));
        assert!(matcher.validate("https://APP.example.com:443/"));
        assert!(!matcher.validate("https://app.example.com:8443/"));
    }

    #[test]
    fn test_empty_and_garbage_input() {
        let matcher = OriginMatcher::new(Vec::new());
        assert!(!matcher.validate(""));
        assert!(!matcher.validate("   "));
        assert!(!matcher.validate("not an origin"));
        assert!(!matcher.validate("null"));
    }

    #[test]
    fn test_normalize_origin() {
        assert_eq!(
            normalize_origin("https://localhost:5173/index.html").as_deref(),
            Some("https://localhost:5173")
        );
        assert_eq!(normalize_origin("https://localhost:443").as_deref(), Some("https://localhost"));
        assert_eq!(normalize_origin("file://").as_deref(), Some("file://"));
        assert_eq!(
            normalize_origin("file:///C:/app/index.html").as_deref(),
            Some("file:///C:/app/index.html")
        );
        assert_eq!(normalize_origin("").as_deref(), None);
    }

    #[test]
    fn test_load_is_cached() {
        let matcher = OriginMatcher::new(vec!["https://a.example".into()]);
        let first = matcher.load();
        let second = matcher.load();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_reload_replaces_patterns() {
        let matcher = OriginMatcher::new(vec!["https://old.example".into()]);
        assert!(matcher.validate("https://old.example"));

        matcher.reload(&["https://new.example"]);
        assert!(!matcher.validate("https://old.example"));
        assert!(matcher.validate("https://new.example"));
    }
}
