//! Page object support.
//!
//! A page object encapsulates one logical UI page: a fixed set of locators
//! established at construction, plus semantic actions, queries, and
//! assertions over them. Concrete pages live in [`crate::pages`].

use std::collections::HashMap;

/// Trait for page objects representing a page or screen in the UI.
pub trait PageObject {
    /// URL path pattern that matches this page (e.g., "/auth/login")
    fn url_pattern(&self) -> &str;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Extract the path component from a full URL.
///
/// Scheme and host are stripped; query strings and fragments are kept out of
/// the path. A URL with no path yields "/".
#[must_use]
pub fn url_path(url: &str) -> &str {
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path_start = after_scheme.find('/').unwrap_or(after_scheme.len());
    let path = &after_scheme[path_start..];
    let path = path.split(['?', '#']).next().unwrap_or(path);
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

/// URL pattern matcher for page objects
///
/// Patterns support literal segments (`/login`), wildcards (`/users/*`),
/// and named parameters (`/users/:id`).
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check if a URL path matches the pattern.
    ///
    /// Full URLs are accepted; the path is extracted first. Wildcards and
    /// parameters each consume exactly one segment.
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let path = url_path(url);
        let url_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if url_segments.len() != self.segments.len() {
            return false;
        }

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                UrlSegment::Literal(lit) => {
                    if url_segments.get(i) != Some(&lit.as_str()) {
                        return false;
                    }
                }
                UrlSegment::Wildcard | UrlSegment::Parameter(_) => {}
            }
        }

        true
    }

    /// Extract named parameters from a URL
    #[must_use]
    pub fn extract_params(&self, url: &str) -> HashMap<String, String> {
        let mut params = HashMap::new();
        let path = url_path(url);
        let url_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        for (i, segment) in self.segments.iter().enumerate() {
            if let UrlSegment::Parameter(name) = segment {
                if let Some(value) = url_segments.get(i) {
                    let _ = params.insert(name.clone(), (*value).to_string());
                }
            }
        }

        params
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}
