//! Field validators.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

static CURRENCY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("currency pattern compiles"));

/// Trait for field validators.
pub trait Validator: Send + Sync {
    /// Validates a value and returns an error message if invalid.
    fn validate(&self, value: &str) -> Result<(), String>;
}

fn check(ok: bool, message: &str) -> Result<(), String> {
    if ok {
        Ok(())
    } else {
        Err(message.to_string())
    }
}

/// Requires a non-blank value.
#[derive(Debug, Clone)]
pub struct Required {
    message: String,
}

impl Required {
    /// Uses `"<label> is required."` as the message.
    pub fn new(label: &str) -> Self {
        Self {
            message: format!("{label} is required."),
        }
    }
}

impl Validator for Required {
    fn validate(&self, value: &str) -> Result<(), String> {
        check(!value.trim().is_empty(), &self.message)
    }
}

/// Limits the number of characters.
#[derive(Debug, Clone)]
pub struct MaxLength {
    max_length: usize,
    message: String,
}

impl MaxLength {
    pub fn new(label: &str, max_length: usize) -> Self {
        Self {
            max_length,
            message: format!("{label} must be at most {max_length} characters."),
        }
    }
}

impl Validator for MaxLength {
    fn validate(&self, value: &str) -> Result<(), String> {
        check(value.chars().count() <= self.max_length, &self.message)
    }
}

/// Requires a minimum number of characters.
#[derive(Debug, Clone)]
pub struct MinLength {
    min_length: usize,
    message: String,
}

impl MinLength {
    pub fn new(label: &str, min_length: usize) -> Self {
        Self {
            min_length,
            message: format!("{label} must be at least {min_length} characters."),
        }
    }
}

impl Validator for MinLength {
    fn validate(&self, value: &str) -> Result<(), String> {
        check(value.chars().count() >= self.min_length, &self.message)
    }
}

/// Accepts plausible email addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct Email;

impl Validator for Email {
    fn validate(&self, value: &str) -> Result<(), String> {
        check(EMAIL.is_match(value), "Enter a valid email address.")
    }
}

/// Accepts `http://` and `https://` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Url {
    https_only: bool,
}

impl Url {
    /// Rejects plain `http://` URLs.
    pub const fn https() -> Self {
        Self { https_only: true }
    }
}

impl Validator for Url {
    fn validate(&self, value: &str) -> Result<(), String> {
        let rest = value
            .strip_prefix("https://")
            .or_else(|| value.strip_prefix("http://").filter(|_| !self.https_only));
        match rest {
            Some(host) if !host.is_empty() && !host.contains(char::is_whitespace) => Ok(()),
            _ if self.https_only => Err("Enter a valid https:// URL.".to_string()),
            _ => Err("Enter a valid URL.".to_string()),
        }
    }
}

/// Accepts image sources: web URLs or `data:image/...` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageSource;

impl Validator for ImageSource {
    fn validate(&self, value: &str) -> Result<(), String> {
        if value.starts_with("data:image/") && value.contains(',') {
            return Ok(());
        }
        Url::default()
            .validate(value)
            .map_err(|_| "Enter an image URL or a data:image URL.".to_string())
    }
}

/// Accepts three-letter upper-case currency codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrencyCode;

impl Validator for CurrencyCode {
    fn validate(&self, value: &str) -> Result<(), String> {
        check(CURRENCY.is_match(value), "Enter a three-letter currency code.")
    }
}

/// Validator using a custom regex pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    pattern: Regex,
    message: String,
}

impl Pattern {
    /// Compiles `pattern`.
    pub fn new(pattern: &str, message: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            message: message.into(),
        })
    }
}

impl Validator for Pattern {
    fn validate(&self, value: &str) -> Result<(), String> {
        check(self.pattern.is_match(value), &self.message)
    }
}
