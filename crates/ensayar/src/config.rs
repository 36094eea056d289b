//! Test configuration.
//!
//! Base URL, credential pairs, and expected UI strings are externally
//! supplied data, not design: they load from a JSON file and default to the
//! public demo site the login scenarios were written against.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::result::EnsayarResult;

/// A username/password pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialPair {
    /// Account username
    pub username: String,
    /// Account password
    pub password: String,
}

/// Valid and invalid credential pairs for login scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Credentials accepted by the site
    pub valid: CredentialPair,
    /// Credentials rejected by the site
    pub invalid: CredentialPair,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            valid: CredentialPair {
                username: "Admin".to_string(),
                password: "admin123".to_string(),
            },
            invalid: CredentialPair {
                username: "Admin".to_string(),
                password: "wrong123".to_string(),
            },
        }
    }
}

/// Expected static strings on the login page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedText {
    /// Username input placeholder
    pub username_placeholder: String,
    /// Password input placeholder
    pub password_placeholder: String,
    /// Error banner text for bad credentials
    pub invalid_credentials: String,
    /// Field-level validation message for empty inputs
    pub required_field: String,
    /// Login button caption
    pub login_button: String,
    /// Forgot-password link text
    pub forgot_password_link: String,
    /// Login panel title
    pub login_title: String,
}

impl Default for ExpectedText {
    fn default() -> Self {
        Self {
            username_placeholder: "Username".to_string(),
            password_placeholder: "Password".to_string(),
            invalid_credentials: "Invalid credentials".to_string(),
            required_field: "Required".to_string(),
            login_button: "Login".to_string(),
            forgot_password_link: "Forgot your password?".to_string(),
            login_title: "Login".to_string(),
        }
    }
}

/// Configuration consumed by scenarios: where the site lives, which
/// credentials to use, and what the page is expected to say.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// Site origin, without a trailing slash
    pub base_url: String,
    /// Path of the login page relative to `base_url`
    pub login_path: String,
    /// Credential pairs
    pub credentials: Credentials,
    /// Expected UI strings
    pub expected: ExpectedText,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            base_url: "https://opensource-demo.orangehrmlive.com".to_string(),
            login_path: "/web/index.php/auth/login".to_string(),
            credentials: Credentials::default(),
            expected: ExpectedText::default(),
        }
    }
}

impl TestConfig {
    /// Load configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults, so a file can override
    /// just the base URL.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_json_file(path: impl AsRef<Path>) -> EnsayarResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Full URL of the login page
    #[must_use]
    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_url, self.login_path)
    }
}
