//! Login page object.
//!
//! Encapsulates the login screen of the HR demo application: the credential
//! form, the error banner, field-level validation messages, the demo
//! credential hints, and the social/footer links. Locators are fixed at
//! construction; every action and query resolves them against the current
//! document through the shared driver handle.

use std::sync::Arc;

use crate::assertion::expect;
use crate::driver::Driver;
use crate::locator::Locator;
use crate::page::{PageObject, UrlMatcher};
use crate::result::{EnsayarError, EnsayarResult};

/// Path of the login page relative to the site origin
pub const LOGIN_PATH: &str = "/web/index.php/auth/login";

/// Page object for the login screen
pub struct LoginPage {
    driver: Arc<dyn Driver>,
    login_url: String,
    url_matcher: UrlMatcher,

    input_username: Locator,
    input_password: Locator,
    button_login: Locator,
    link_forgot_password: Locator,
    text_login_title: Locator,
    text_demo_username: Locator,
    text_demo_password: Locator,
    text_error_message: Locator,
    text_validation_message: Locator,
    link_linkedin: Locator,
    link_facebook: Locator,
    link_twitter: Locator,
    link_youtube: Locator,
    text_copyright: Locator,
}

impl std::fmt::Debug for LoginPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginPage")
            .field("login_url", &self.login_url)
            .finish_non_exhaustive()
    }
}

impl LoginPage {
    /// Create the page object against a shared driver handle.
    ///
    /// `base_url` is the site origin; the login path is appended to it.
    #[must_use]
    pub fn new(driver: Arc<dyn Driver>, base_url: impl Into<String>) -> Self {
        Self {
            driver,
            login_url: format!("{}{LOGIN_PATH}", base_url.into()),
            url_matcher: UrlMatcher::new(LOGIN_PATH),
            input_username: Locator::new("input[name=\"username\"]"),
            input_password: Locator::new("input[name=\"password\"]"),
            button_login: Locator::new("button[type=\"submit\"]"),
            link_forgot_password: Locator::new(".orangehrm-login-forgot-header"),
            text_login_title: Locator::new(".orangehrm-login-title"),
            text_demo_username: Locator::new(".orangehrm-demo-credentials p:first-child"),
            text_demo_password: Locator::new(".orangehrm-demo-credentials p:last-child"),
            text_error_message: Locator::new(".orangehrm-login-error"),
            // Several fields can show a message at once; count assertions
            // quantify instead of relying on a single match.
            text_validation_message: Locator::new(".oxd-input-group .oxd-text--span")
                .with_strict(false),
            link_linkedin: Locator::new("a[href*=\"linkedin.com\"]"),
            link_facebook: Locator::new("a[href*=\"facebook.com\"]"),
            link_twitter: Locator::new("a[href*=\"twitter.com\"]"),
            link_youtube: Locator::new("a[href*=\"youtube.com\"]"),
            text_copyright: Locator::new(".orangehrm-copyright"),
        }
    }

    fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Navigate to the login page
    pub async fn goto(&self) -> EnsayarResult<()> {
        self.driver().navigate(&self.login_url).await
    }

    /// Fill the username field
    pub async fn fill_username(&self, username: &str) -> EnsayarResult<()> {
        self.driver().fill(&self.input_username, username).await
    }

    /// Fill the password field
    pub async fn fill_password(&self, password: &str) -> EnsayarResult<()> {
        self.driver().fill(&self.input_password, password).await
    }

    /// Click the login button
    pub async fn click_login(&self) -> EnsayarResult<()> {
        self.driver().click(&self.button_login).await
    }

    /// Click the forgot-password link
    pub async fn click_forgot_password(&self) -> EnsayarResult<()> {
        self.driver().click(&self.link_forgot_password).await
    }

    /// Fill both credential fields and submit
    pub async fn login_with(&self, username: &str, password: &str) -> EnsayarResult<()> {
        self.fill_username(username).await?;
        self.fill_password(password).await?;
        self.click_login().await
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Whether the login title is visible
    pub async fn is_title_visible(&self) -> EnsayarResult<bool> {
        self.driver().is_visible(&self.text_login_title).await
    }

    /// Whether the username input is visible
    pub async fn is_username_visible(&self) -> EnsayarResult<bool> {
        self.driver().is_visible(&self.input_username).await
    }

    /// Whether the password input is visible
    pub async fn is_password_visible(&self) -> EnsayarResult<bool> {
        self.driver().is_visible(&self.input_password).await
    }

    /// Whether the login button is visible
    pub async fn is_login_button_visible(&self) -> EnsayarResult<bool> {
        self.driver().is_visible(&self.button_login).await
    }

    /// Whether the error banner is visible
    pub async fn is_error_visible(&self) -> EnsayarResult<bool> {
        self.driver().is_visible(&self.text_error_message).await
    }

    /// Login title text
    pub async fn title_text(&self) -> EnsayarResult<String> {
        self.driver().text_content(&self.text_login_title).await
    }

    /// Error banner text
    pub async fn error_message_text(&self) -> EnsayarResult<String> {
        self.driver().text_content(&self.text_error_message).await
    }

    /// Username input placeholder.
    ///
    /// A static attribute: repeated calls return the same value regardless
    /// of what has been typed into the field.
    pub async fn username_placeholder(&self) -> EnsayarResult<String> {
        self.placeholder_of(&self.input_username).await
    }

    /// Password input placeholder
    pub async fn password_placeholder(&self) -> EnsayarResult<String> {
        self.placeholder_of(&self.input_password).await
    }

    async fn placeholder_of(&self, input: &Locator) -> EnsayarResult<String> {
        self.driver()
            .attribute(input, "placeholder")
            .await?
            .ok_or_else(|| EnsayarError::Page {
                message: format!("{input} has no placeholder attribute"),
            })
    }

    /// Login button caption
    pub async fn login_button_text(&self) -> EnsayarResult<String> {
        self.driver().text_content(&self.button_login).await
    }

    /// Forgot-password link text
    pub async fn forgot_password_text(&self) -> EnsayarResult<String> {
        self.driver().text_content(&self.link_forgot_password).await
    }

    /// Demo username hint text
    pub async fn demo_username_text(&self) -> EnsayarResult<String> {
        self.driver().text_content(&self.text_demo_username).await
    }

    /// Demo password hint text
    pub async fn demo_password_text(&self) -> EnsayarResult<String> {
        self.driver().text_content(&self.text_demo_password).await
    }

    /// Footer copyright text
    pub async fn copyright_text(&self) -> EnsayarResult<String> {
        self.driver().text_content(&self.text_copyright).await
    }

    /// Number of field-level validation messages currently shown
    pub async fn validation_message_count(&self) -> EnsayarResult<usize> {
        self.driver().count(&self.text_validation_message).await
    }

    // ------------------------------------------------------------------
    // Assertions
    // ------------------------------------------------------------------

    /// Assert the login title is visible
    pub async fn assert_title_visible(&self) -> EnsayarResult<()> {
        expect(self.driver(), &self.text_login_title)
            .to_be_visible()
            .await
    }

    /// Assert the login title has the expected text
    pub async fn assert_title_text(&self, expected: &str) -> EnsayarResult<()> {
        expect(self.driver(), &self.text_login_title)
            .to_have_text(expected)
            .await
    }

    /// Assert the error banner is visible
    pub async fn assert_error_visible(&self) -> EnsayarResult<()> {
        expect(self.driver(), &self.text_error_message)
            .to_be_visible()
            .await
    }

    /// Assert the error banner is visible and contains the expected text
    pub async fn assert_error_contains(&self, expected: &str) -> EnsayarResult<()> {
        expect(self.driver(), &self.text_error_message)
            .to_contain_text(expected)
            .await
    }

    /// Assert exactly one validation message is shown and it contains the
    /// expected text
    pub async fn assert_validation_message(&self, expected: &str) -> EnsayarResult<()> {
        let exp = expect(self.driver(), &self.text_validation_message);
        exp.to_have_count(1).await?;
        exp.to_contain_text(expected).await
    }

    /// Assert both demo credential hints are visible
    pub async fn assert_demo_credentials_visible(&self) -> EnsayarResult<()> {
        expect(self.driver(), &self.text_demo_username)
            .to_be_visible()
            .await?;
        expect(self.driver(), &self.text_demo_password)
            .to_be_visible()
            .await
    }

    /// Assert one of the demo credential hints contains the expected text
    pub async fn assert_demo_credentials_contain(&self, expected: &str) -> EnsayarResult<()> {
        let username = self.demo_username_text().await?;
        let password = self.demo_password_text().await?;
        if username.contains(expected) || password.contains(expected) {
            Ok(())
        } else {
            Err(EnsayarError::Assertion {
                message: format!(
                    "demo credentials '{username}' / '{password}' do not contain '{expected}'"
                ),
            })
        }
    }

    /// Assert the login button is visible
    pub async fn assert_login_button_visible(&self) -> EnsayarResult<()> {
        expect(self.driver(), &self.button_login).to_be_visible().await
    }

    /// Assert the forgot-password link is visible
    pub async fn assert_forgot_password_visible(&self) -> EnsayarResult<()> {
        expect(self.driver(), &self.link_forgot_password)
            .to_be_visible()
            .await
    }

    /// Assert all four social-media links are visible
    pub async fn assert_social_links_visible(&self) -> EnsayarResult<()> {
        for link in [
            &self.link_linkedin,
            &self.link_facebook,
            &self.link_twitter,
            &self.link_youtube,
        ] {
            expect(self.driver(), link).to_be_visible().await?;
        }
        Ok(())
    }

    /// Assert the footer copyright is visible
    pub async fn assert_copyright_visible(&self) -> EnsayarResult<()> {
        expect(self.driver(), &self.text_copyright)
            .to_be_visible()
            .await
    }

    /// Assert the current URL is still the login page
    pub async fn assert_on_login_page(&self) -> EnsayarResult<()> {
        let url = self.driver().current_url().await?;
        if self.url_matcher.matches(&url) {
            Ok(())
        } else {
            Err(EnsayarError::Assertion {
                message: format!("expected to be on the login page, current URL is '{url}'"),
            })
        }
    }

    /// Assert the current URL has left the login page (e.g. after a
    /// successful login redirect)
    pub async fn assert_left_login_page(&self) -> EnsayarResult<()> {
        let url = self.driver().current_url().await?;
        if self.url_matcher.matches(&url) {
            Err(EnsayarError::Assertion {
                message: format!("still on the login page at '{url}'"),
            })
        } else {
            Ok(())
        }
    }
}

impl PageObject for LoginPage {
    fn url_pattern(&self) -> &str {
        LOGIN_PATH
    }

    fn page_name(&self) -> &str {
        "LoginPage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{ClickEffect, MockDriver, MockElement};

    const USERNAME: &str = "input[name=\"username\"]";
    const PASSWORD: &str = "input[name=\"password\"]";
    const SUBMIT: &str = "button[type=\"submit\"]";

    fn page_with_form() -> (Arc<MockDriver>, LoginPage) {
        let driver = Arc::new(MockDriver::new());
        driver.add_element(
            USERNAME,
            MockElement::default().with_attribute("placeholder", "Username"),
        );
        driver.add_element(
            PASSWORD,
            MockElement::default().with_attribute("placeholder", "Password"),
        );
        driver.add_element(SUBMIT, MockElement::visible("Login"));
        let page = LoginPage::new(driver.clone(), "https://demo.test");
        (driver, page)
    }

    #[tokio::test]
    async fn test_goto_targets_login_url() {
        let (driver, page) = page_with_form();
        page.goto().await.unwrap();
        assert_eq!(
            driver.current_url().await.unwrap(),
            "https://demo.test/web/index.php/auth/login"
        );
    }

    #[tokio::test]
    async fn test_login_with_fills_then_clicks() {
        let (driver, page) = page_with_form();
        page.login_with("Admin", "admin123").await.unwrap();
        assert_eq!(driver.filled_value(USERNAME).as_deref(), Some("Admin"));
        assert_eq!(driver.filled_value(PASSWORD).as_deref(), Some("admin123"));
        assert!(driver.was_called(&format!("click:{SUBMIT}")));
    }

    #[tokio::test]
    async fn test_placeholder_is_static_across_fills() {
        let (_, page) = page_with_form();
        let before = page.username_placeholder().await.unwrap();
        page.fill_username("Admin").await.unwrap();
        let after = page.username_placeholder().await.unwrap();
        assert_eq!(before, "Username");
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_error_assertion_reads_banner() {
        let (driver, page) = page_with_form();
        let mut banner = MockElement::hidden();
        banner.text = "Invalid credentials".to_string();
        driver.add_element(".orangehrm-login-error", banner);
        driver.on_click(
            SUBMIT,
            vec![ClickEffect::Reveal(".orangehrm-login-error".to_string())],
        );

        assert!(!page.is_error_visible().await.unwrap());
        page.login_with("Admin", "wrong123").await.unwrap();
        page.assert_error_contains("Invalid credentials").await.unwrap();
        assert!(page.assert_error_contains("Locked out").await.is_err());
    }

    #[tokio::test]
    async fn test_social_links_assertion() {
        let (driver, page) = page_with_form();
        for selector in [
            "a[href*=\"linkedin.com\"]",
            "a[href*=\"facebook.com\"]",
            "a[href*=\"twitter.com\"]",
            "a[href*=\"youtube.com\"]",
        ] {
            driver.add_element(selector, MockElement::default());
        }
        page.assert_social_links_visible().await.unwrap();
    }

    #[tokio::test]
    async fn test_url_assertions() {
        let (driver, page) = page_with_form();
        page.goto().await.unwrap();
        page.assert_on_login_page().await.unwrap();
        assert!(page.assert_left_login_page().await.is_err());

        driver
            .navigate("https://demo.test/web/index.php/dashboard/index")
            .await
            .unwrap();
        page.assert_left_login_page().await.unwrap();
    }

    #[test]
    fn test_page_object_metadata() {
        let (_, page) = page_with_form();
        assert_eq!(page.url_pattern(), LOGIN_PATH);
        assert_eq!(page.page_name(), "LoginPage");
    }
}
