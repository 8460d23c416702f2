//! Path pattern matching.

use regex::Regex;

use crate::error::{Result, RouterError};
use crate::request::PathParams;

/// A compiled route pattern such as `/api/invoices/{id}/status`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    pattern: String,
    regex: Regex,
    param_names: Vec<String>,
}

impl PathPattern {
    /// Compiles a pattern. `{name}` captures one path segment.
    ///
    /// ```
    /// use tally_router::PathPattern;
    ///
    /// let pattern = PathPattern::parse("/api/invoices/{id}/status").unwrap();
    /// let params = pattern.match_path("/api/invoices/42/status").unwrap();
    /// assert_eq!(params.get("id"), Some("42"));
    /// assert!(pattern.match_path("/api/invoices/42").is_none());
    /// ```
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut param_names = Vec::new();
        let mut regex_str = String::from("^");

        for part in pattern.split('/').filter(|s| !s.is_empty()) {
            regex_str.push('/');
            match part.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) if !name.is_empty() && !name.contains(['{', '}', '/']) => {
                    if param_names.iter().any(|n| n == name) {
                        return Err(RouterError::InvalidPattern(format!(
                            "{pattern}: duplicate parameter {name}"
                        )));
                    }
                    param_names.push(name.to_string());
                    regex_str.push_str("([^/]+)");
                }
                Some(_) => return Err(RouterError::InvalidPattern(pattern.to_string())),
                None => regex_str.push_str(&regex::escape(part)),
            }
        }
        regex_str.push_str("/?$");

        let regex = Regex::new(&regex_str)
            .map_err(|e| RouterError::InvalidPattern(format!("{pattern}: {e}")))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            param_names,
        })
    }

    /// Returns the parameters captured from `path`, if it matches.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let caps = self.regex.captures(path)?;
        let mut params = PathParams::new();
        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(value) = caps.get(i + 1) {
                params.insert(name.clone(), value.as_str());
            }
        }
        Some(params)
    }

    /// Returns the original pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_path() {
        let pattern = PathPattern::parse("/api/clients").unwrap();
        assert!(pattern.match_path("/api/clients").is_some());
        assert!(pattern.match_path("/api/clients/").is_some());
        assert!(pattern.match_path("/api/items").is_none());
    }

    #[test]
    fn test_literal_segments_are_escaped() {
        let pattern = PathPattern::parse("/api/invoices/next-number").unwrap();
        assert!(pattern.match_path("/api/invoices/next-number").is_some());
        assert!(pattern.match_path("/api/invoices/nextxnumber").is_none());
    }

    #[test]
    fn test_params_capture_single_segment() {
        let pattern = PathPattern::parse("/api/accounts/{id}/default").unwrap();
        let params = pattern.match_path("/api/accounts/7/default").unwrap();
        assert_eq!(params.get("id"), Some("7"));
        assert!(pattern.match_path("/api/accounts/7/8/default").is_none());
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(PathPattern::parse("/api/{}").is_err());
        assert!(PathPattern::parse("/api/{id}/{id}").is_err());
    }
}
