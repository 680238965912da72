//! Route matching logic.
//!
//! # Responsibilities
//! - Match request method (exact, or any)
//! - Match request path (exact, or `*` wildcard pattern)
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive and anchored at both ends
//! - `*` matches any run of characters, including `/`
//! - No regex: patterns are split into literal segments at registration

use axum::http::Method;

/// Trait for matching a request line against a condition.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the method and path satisfy this condition.
    fn matches(&self, method: &Method, path: &str) -> bool;
}

/// Matches the request method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodMatcher {
    Any,
    Exact(Method),
}

impl Matcher for MethodMatcher {
    fn matches(&self, method: &Method, _path: &str) -> bool {
        match self {
            MethodMatcher::Any => true,
            MethodMatcher::Exact(expected) => expected == method,
        }
    }
}

impl From<Method> for MethodMatcher {
    fn from(method: Method) -> Self {
        MethodMatcher::Exact(method)
    }
}

/// Matches the request path exactly or against a wildcard pattern.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    pattern: String,
    segments: Option<Vec<String>>,
}

impl PathMatcher {
    /// Compile a path pattern. Patterns without `*` only match themselves.
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let segments = pattern
            .contains('*')
            .then(|| pattern.split('*').map(str::to_string).collect());
        Self { pattern, segments }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Matcher for PathMatcher {
    fn matches(&self, _method: &Method, path: &str) -> bool {
        if self.pattern == path {
            return true;
        }
        match &self.segments {
            Some(segments) => glob_match(segments, path),
            None => false,
        }
    }
}

/// Anchored match of `path` against literal segments separated by `*`.
fn glob_match(segments: &[String], path: &str) -> bool {
    let (first, rest) = match segments.split_first() {
        Some(split) => split,
        None => return path.is_empty(),
    };
    let Some(mut remaining) = path.strip_prefix(first.as_str()) else {
        return false;
    };

    let Some((last, middle)) = rest.split_last() else {
        return remaining.is_empty();
    };

    for segment in middle {
        match remaining.find(segment.as_str()) {
            Some(idx) => remaining = &remaining[idx + segment.len()..],
            None => return false,
        }
    }

    remaining.ends_with(last.as_str())
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, method: &Method, path: &str) -> bool {
        // All matchers must pass (AND)
        self.matchers.iter().all(|m| m.matches(method, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_matches(pattern: &str, path: &str) -> bool {
        PathMatcher::new(pattern).matches(&Method::GET, path)
    }

    #[test]
    fn test_method_matcher() {
        let post = MethodMatcher::from(Method::POST);
        assert!(post.matches(&Method::POST, "/"));
        assert!(!post.matches(&Method::GET, "/"));
        assert!(MethodMatcher::Any.matches(&Method::DELETE, "/"));
    }

    #[test]
    fn test_exact_path() {
        assert!(path_matches("/health", "/health"));
        assert!(!path_matches("/health", "/health/"));
        assert!(!path_matches("/health", "/HEALTH"));
    }

    #[test]
    fn test_trailing_wildcard() {
        assert!(path_matches("/api/v1/*", "/api/v1/inference"));
        assert!(path_matches("/api/v1/*", "/api/v1/rag"));
        assert!(path_matches("/api/v1/*", "/api/v1/"));
        assert!(path_matches("/api/v1/*", "/api/v1/a/b"));
        assert!(!path_matches("/api/v1/*", "/health"));
        assert!(!path_matches("/api/v1/*", "/api/v2/rag"));
    }

    #[test]
    fn test_inner_and_multiple_wildcards() {
        assert!(path_matches("/api/*/rag", "/api/v1/rag"));
        assert!(!path_matches("/api/*/rag", "/api/v1/rag/extra"));
        assert!(path_matches("*", "/anything"));
        assert!(path_matches("/a/*/c/*", "/a/b/c/d"));
        assert!(!path_matches("/a/*/c/*", "/a/b/x/d"));
        // segments must not overlap
        assert!(!path_matches("/ab*ba", "/aba"));
    }

    #[test]
    fn test_and_matcher() {
        let matcher = AndMatcher::new(vec![
            Box::new(MethodMatcher::from(Method::POST)),
            Box::new(PathMatcher::new("/api/v1/*")),
        ]);
        assert!(matcher.matches(&Method::POST, "/api/v1/rag"));
        assert!(!matcher.matches(&Method::GET, "/api/v1/rag"));
        assert!(!matcher.matches(&Method::POST, "/health"));
    }
}
