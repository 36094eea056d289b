//! Assertion builder for locators.
//!
//! `expect(driver, locator)` yields an [`Expect`] whose methods suspend until
//! the driver settles the underlying wait, then fail with
//! [`EnsayarError::Assertion`] when the awaited condition does not hold.
//! Waiting is delegated entirely to the driver's own timeout contract; no
//! assertion retries beyond it.

use crate::driver::Driver;
use crate::locator::Locator;
use crate::result::{EnsayarError, EnsayarResult};

/// Assertion builder for a locator, evaluated against a driver
#[derive(Clone, Copy)]
pub struct Expect<'a> {
    driver: &'a dyn Driver,
    locator: &'a Locator,
}

impl<'a> Expect<'a> {
    /// Create a new expectation
    #[must_use]
    pub const fn new(driver: &'a dyn Driver, locator: &'a Locator) -> Self {
        Self { driver, locator }
    }

    /// Assert the element becomes visible within the locator's timeout
    pub async fn to_be_visible(&self) -> EnsayarResult<()> {
        self.driver
            .wait_for_visible(self.locator)
            .await
            .map_err(|e| match e {
                EnsayarError::Timeout { ms } => EnsayarError::Assertion {
                    message: format!("{} not visible within {ms}ms", self.locator),
                },
                other => other,
            })
    }

    /// Assert the element is currently hidden (or absent)
    pub async fn to_be_hidden(&self) -> EnsayarResult<()> {
        if self.driver.is_visible(self.locator).await? {
            return Err(EnsayarError::Assertion {
                message: format!("{} expected hidden but is visible", self.locator),
            });
        }
        Ok(())
    }

    /// Assert the element's trimmed text equals `expected`
    pub async fn to_have_text(&self, expected: &str) -> EnsayarResult<()> {
        self.to_be_visible().await?;
        let actual = self.driver.text_content(self.locator).await?;
        if actual.trim() == expected {
            Ok(())
        } else {
            Err(EnsayarError::Assertion {
                message: format!(
                    "{} expected text '{expected}' but got '{}'",
                    self.locator,
                    actual.trim()
                ),
            })
        }
    }

    /// Assert the element's text contains `expected`
    pub async fn to_contain_text(&self, expected: &str) -> EnsayarResult<()> {
        self.to_be_visible().await?;
        let actual = self.driver.text_content(self.locator).await?;
        if actual.contains(expected) {
            Ok(())
        } else {
            Err(EnsayarError::Assertion {
                message: format!(
                    "{} expected text containing '{expected}' but got '{actual}'",
                    self.locator
                ),
            })
        }
    }

    /// Assert the current match count equals `expected` exactly
    pub async fn to_have_count(&self, expected: usize) -> EnsayarResult<()> {
        let actual = self.driver.count(self.locator).await?;
        if actual == expected {
            Ok(())
        } else {
            Err(EnsayarError::Assertion {
                message: format!("{} expected count {expected} but got {actual}", self.locator),
            })
        }
    }

    /// Assert an attribute equals `expected`
    pub async fn to_have_attribute(&self, name: &str, expected: &str) -> EnsayarResult<()> {
        let actual = self.driver.attribute(self.locator, name).await?;
        match actual {
            Some(ref value) if value == expected => Ok(()),
            Some(value) => Err(EnsayarError::Assertion {
                message: format!(
                    "{} expected {name}='{expected}' but got '{value}'",
                    self.locator
                ),
            }),
            None => Err(EnsayarError::Assertion {
                message: format!("{} has no attribute '{name}'", self.locator),
            }),
        }
    }
}

/// Create an expectation for a locator
#[must_use]
pub const fn expect<'a>(driver: &'a dyn Driver, locator: &'a Locator) -> Expect<'a> {
    Expect::new(driver, locator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};

    fn css(selector: &str) -> Locator {
        Locator::new(selector)
    }

    #[tokio::test]
    async fn test_to_be_visible_pass() {
        let driver = MockDriver::new();
        driver.add_element(".orangehrm-login-title", MockElement::visible("Login"));
        let locator = css(".orangehrm-login-title");
        expect(&driver, &locator).to_be_visible().await.unwrap();
    }

    #[tokio::test]
    async fn test_to_be_visible_fail_is_assertion() {
        let driver = MockDriver::new();
        let locator = css(".orangehrm-login-error");
        let err = expect(&driver, &locator).to_be_visible().await.unwrap_err();
        assert!(matches!(err, EnsayarError::Assertion { .. }));
        assert!(err.to_string().contains("not visible"));
    }

    #[tokio::test]
    async fn test_to_have_text_trims() {
        let driver = MockDriver::new();
        driver.add_element("button", MockElement::visible("  Login \n"));
        let locator = css("button");
        expect(&driver, &locator).to_have_text("Login").await.unwrap();
    }

    #[tokio::test]
    async fn test_to_contain_text_fail() {
        let driver = MockDriver::new();
        driver.add_element(".alert", MockElement::visible("Account disabled"));
        let locator = css(".alert");
        let err = expect(&driver, &locator)
            .to_contain_text("Invalid credentials")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_to_have_count_exact() {
        let driver = MockDriver::new();
        driver.add_element(".oxd-text--span", MockElement::visible("Required").with_count(1));
        let locator = css(".oxd-text--span");
        expect(&driver, &locator).to_have_count(1).await.unwrap();
        assert!(expect(&driver, &locator).to_have_count(2).await.is_err());
    }

    #[tokio::test]
    async fn test_to_have_attribute() {
        let driver = MockDriver::new();
        driver.add_element(
            "input[name=\"username\"]",
            MockElement::default().with_attribute("placeholder", "Username"),
        );
        let locator = css("input[name=\"username\"]");
        expect(&driver, &locator)
            .to_have_attribute("placeholder", "Username")
            .await
            .unwrap();
        let err = expect(&driver, &locator)
            .to_have_attribute("placeholder", "User name")
            .await
            .unwrap_err();
        assert!(matches!(err, EnsayarError::Assertion { .. }));
    }
}
