//! Step definitions for the login page.
//!
//! Each handler is a thin delegation to [`LoginPage`] through the scenario
//! context. Handlers never wait or retry themselves; the driver's own
//! settling contract does that. Registration happens through
//! [`register_login_steps`] into an injected registry, never globally.
//!
//! [`LoginPage`]: crate::pages::LoginPage

use futures::future::BoxFuture;

use crate::result::{EnsayarError, EnsayarResult};
use crate::scenario::ScenarioContext;
use crate::step::{StepArgs, StepRegistry};

/// Register every login-page step binding.
///
/// # Errors
///
/// Returns a registration error for duplicate or invalid patterns. This is
/// a startup-time failure, never a scenario-time one.
pub fn register_login_steps(registry: &mut StepRegistry) -> EnsayarResult<()> {
    registry.given("I open the website", open_the_website)?;
    registry.given("I am on the login page", open_the_website)?;

    registry.when("I enter the username {string}", enter_username)?;
    registry.when("I enter the password {string}", enter_password)?;
    registry.when("I leave the username field empty", leave_username_empty)?;
    registry.when("I leave the password field empty", leave_password_empty)?;
    registry.when("I click the Login button", click_login_button)?;
    registry.when("I click on {string}", click_named_control)?;
    registry.when(
        "I login with credentials {string} and {string}",
        login_with_credentials,
    )?;

    registry.then("I should be redirected to the dashboard", redirected_to_dashboard)?;
    registry.then("I should remain on the login page", remain_on_login_page)?;
    registry.then("I should see an error message {string}", see_error_message)?;
    registry.then(
        "I should see a validation message {string}",
        see_validation_message,
    )?;
    registry.then(
        "the Username field should display placeholder {string}",
        username_placeholder_is,
    )?;
    registry.then(
        "the Password field should display placeholder {string}",
        password_placeholder_is,
    )?;
    registry.then(
        "a button with text {string} should be displayed",
        button_with_text_displayed,
    )?;
    registry.then(
        "a link with text {string} should be displayed",
        link_with_text_displayed,
    )?;
    registry.then(
        "links for LinkedIn, Facebook, Twitter, and YouTube should be displayed",
        social_links_displayed,
    )?;
    registry.then("the login title should be visible", login_title_visible)?;
    registry.then("the login title text should be {string}", login_title_text_is)?;
    registry.then("demo credentials should be visible", demo_credentials_visible)?;
    registry.then(
        "demo credentials should contain {string}",
        demo_credentials_contain,
    )?;
    registry.then("copyright text should be visible", copyright_visible)?;

    Ok(())
}

fn text_eq(what: &str, actual: &str, expected: &str) -> EnsayarResult<()> {
    if actual.trim() == expected {
        Ok(())
    } else {
        Err(EnsayarError::Assertion {
            message: format!("{what}: expected '{expected}' but got '{}'", actual.trim()),
        })
    }
}

// ---------------------------------------------------------------------------
// Given
// ---------------------------------------------------------------------------

fn open_the_website<'a>(
    ctx: &'a mut ScenarioContext,
    _args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move { ctx.login_page().goto().await })
}

// ---------------------------------------------------------------------------
// When
// ---------------------------------------------------------------------------

fn enter_username<'a>(
    ctx: &'a mut ScenarioContext,
    args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move {
        let username = args.string(0)?;
        ctx.login_page().fill_username(username).await
    })
}

fn enter_password<'a>(
    ctx: &'a mut ScenarioContext,
    args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move {
        let password = args.string(0)?;
        ctx.login_page().fill_password(password).await
    })
}

fn leave_username_empty<'a>(
    ctx: &'a mut ScenarioContext,
    _args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move { ctx.login_page().fill_username("").await })
}

fn leave_password_empty<'a>(
    ctx: &'a mut ScenarioContext,
    _args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move { ctx.login_page().fill_password("").await })
}

fn click_login_button<'a>(
    ctx: &'a mut ScenarioContext,
    _args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move { ctx.login_page().click_login().await })
}

// Controls are addressed by their visible caption; an unknown caption is a
// step error, not a silent no-op.
fn click_named_control<'a>(
    ctx: &'a mut ScenarioContext,
    args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move {
        let name = args.string(0)?;
        let expected = &ctx.config().expected;
        if name == expected.login_button {
            ctx.login_page().click_login().await
        } else if name == expected.forgot_password_link {
            ctx.login_page().click_forgot_password().await
        } else {
            Err(EnsayarError::UnknownControl {
                name: name.to_string(),
            })
        }
    })
}

fn login_with_credentials<'a>(
    ctx: &'a mut ScenarioContext,
    args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move {
        let username = args.string(0)?.to_string();
        let password = args.string(1)?.to_string();
        ctx.login_page().login_with(&username, &password).await
    })
}

// ---------------------------------------------------------------------------
// Then
// ---------------------------------------------------------------------------

fn redirected_to_dashboard<'a>(
    ctx: &'a mut ScenarioContext,
    _args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move { ctx.login_page().assert_left_login_page().await })
}

fn remain_on_login_page<'a>(
    ctx: &'a mut ScenarioContext,
    _args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move { ctx.login_page().assert_on_login_page().await })
}

fn see_error_message<'a>(
    ctx: &'a mut ScenarioContext,
    args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move {
        let expected = args.string(0)?.to_string();
        ctx.login_page().assert_error_contains(&expected).await
    })
}

fn see_validation_message<'a>(
    ctx: &'a mut ScenarioContext,
    args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move {
        let expected = args.string(0)?.to_string();
        ctx.login_page().assert_validation_message(&expected).await
    })
}

fn username_placeholder_is<'a>(
    ctx: &'a mut ScenarioContext,
    args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move {
        let expected = args.string(0)?.to_string();
        let actual = ctx.login_page().username_placeholder().await?;
        text_eq("username placeholder", &actual, &expected)
    })
}

fn password_placeholder_is<'a>(
    ctx: &'a mut ScenarioContext,
    args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move {
        let expected = args.string(0)?.to_string();
        let actual = ctx.login_page().password_placeholder().await?;
        text_eq("password placeholder", &actual, &expected)
    })
}

fn button_with_text_displayed<'a>(
    ctx: &'a mut ScenarioContext,
    args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move {
        let expected = args.string(0)?.to_string();
        ctx.login_page().assert_login_button_visible().await?;
        let actual = ctx.login_page().login_button_text().await?;
        text_eq("login button text", &actual, &expected)
    })
}

fn link_with_text_displayed<'a>(
    ctx: &'a mut ScenarioContext,
    args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move {
        let expected = args.string(0)?.to_string();
        ctx.login_page().assert_forgot_password_visible().await?;
        let actual = ctx.login_page().forgot_password_text().await?;
        text_eq("forgot-password link text", &actual, &expected)
    })
}

fn social_links_displayed<'a>(
    ctx: &'a mut ScenarioContext,
    _args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move { ctx.login_page().assert_social_links_visible().await })
}

fn login_title_visible<'a>(
    ctx: &'a mut ScenarioContext,
    _args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move { ctx.login_page().assert_title_visible().await })
}

fn login_title_text_is<'a>(
    ctx: &'a mut ScenarioContext,
    args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move {
        let expected = args.string(0)?.to_string();
        ctx.login_page().assert_title_text(&expected).await
    })
}

fn demo_credentials_visible<'a>(
    ctx: &'a mut ScenarioContext,
    _args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move { ctx.login_page().assert_demo_credentials_visible().await })
}

fn demo_credentials_contain<'a>(
    ctx: &'a mut ScenarioContext,
    args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move {
        let expected = args.string(0)?.to_string();
        ctx.login_page()
            .assert_demo_credentials_contain(&expected)
            .await
    })
}

fn copyright_visible<'a>(
    ctx: &'a mut ScenarioContext,
    _args: StepArgs,
) -> BoxFuture<'a, EnsayarResult<()>> {
    Box::pin(async move { ctx.login_page().assert_copyright_visible().await })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TestConfig;
    use crate::driver::{ClickEffect, Driver, MockDriver, MockElement};
    use crate::report::StepStatus;
    use crate::scenario::{Feature, ScenarioRunner};
    use std::sync::Arc;

    const USERNAME: &str = "input[name=\"username\"]";
    const PASSWORD: &str = "input[name=\"password\"]";
    const SUBMIT: &str = "button[type=\"submit\"]";
    const ERROR: &str = ".orangehrm-login-error";
    const VALIDATION: &str = ".oxd-input-group .oxd-text--span";

    const LOGIN_URL: &str = "https://demo.test/web/index.php/auth/login";
    const DASHBOARD_URL: &str = "https://demo.test/web/index.php/dashboard/index";

    fn registry() -> StepRegistry {
        let mut registry = StepRegistry::new();
        register_login_steps(&mut registry).unwrap();
        registry
    }

    /// A mock driver seeded with every static element of a freshly loaded
    /// login page.
    fn seeded_driver() -> Arc<MockDriver> {
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
        driver.add_element(".orangehrm-login-title", MockElement::visible("Login"));
        driver.add_element(
            ".orangehrm-login-forgot-header",
            MockElement::visible("Forgot your password?"),
        );
        driver.add_element(
            ".orangehrm-demo-credentials p:first-child",
            MockElement::visible("Username : Admin"),
        );
        driver.add_element(
            ".orangehrm-demo-credentials p:last-child",
            MockElement::visible("Password : admin123"),
        );
        driver.add_element(
            ".orangehrm-copyright",
            MockElement::visible("OrangeHRM, Inc"),
        );
        for selector in [
            "a[href*=\"linkedin.com\"]",
            "a[href*=\"facebook.com\"]",
            "a[href*=\"twitter.com\"]",
            "a[href*=\"youtube.com\"]",
        ] {
            driver.add_element(selector, MockElement::default());
        }
        driver
    }

    fn context(driver: &Arc<MockDriver>) -> ScenarioContext {
        let config = TestConfig {
            base_url: "https://demo.test".to_string(),
            ..TestConfig::default()
        };
        ScenarioContext::new(driver.clone(), config)
    }

    async fn run(source: &str, driver: &Arc<MockDriver>) -> crate::report::ScenarioReport {
        let registry = registry();
        let runner = ScenarioRunner::new(&registry);
        let scenario = Feature::parse(source).unwrap().scenarios.remove(0);
        let mut ctx = context(driver);
        runner.run(&scenario, &mut ctx).await
    }

    /// Every phrase used by the login scenarios resolves to exactly one
    /// handler.
    #[test]
    fn test_every_phrase_resolves_unambiguously() {
        let registry = registry();
        let feature = Feature::parse(
            r#"Scenario: Exercise every binding
  Given I open the website
  And I am on the login page
  When I enter the username "Admin"
  And I enter the password "admin123"
  And I leave the username field empty
  And I leave the password field empty
  And I click the Login button
  And I click on "Login"
  And I login with credentials "Admin" and "admin123"
  Then I should be redirected to the dashboard
  And I should remain on the login page
  And I should see an error message "Invalid credentials"
  And I should see a validation message "Required"
  And the Username field should display placeholder "Username"
  And the Password field should display placeholder "Password"
  And a button with text "Login" should be displayed
  And a link with text "Forgot your password?" should be displayed
  And links for LinkedIn, Facebook, Twitter, and YouTube should be displayed
  And the login title should be visible
  And the login title text should be "Login"
  And demo credentials should be visible
  And demo credentials should contain "Admin"
  And copyright text should be visible
"#,
        )
        .unwrap();

        registry.check(feature.step_texts()).unwrap();
    }

    /// Valid credentials navigate away from the login page.
    #[tokio::test]
    async fn test_valid_login_leaves_login_page() {
        let driver = seeded_driver();
        driver.on_click(
            SUBMIT,
            vec![ClickEffect::Navigate(DASHBOARD_URL.to_string())],
        );

        let report = run(
            r#"Scenario: Valid login
  Given I open the website
  When I enter the username "Admin"
  And I enter the password "admin123"
  And I click the Login button
  Then I should be redirected to the dashboard
"#,
            &driver,
        )
        .await;

        assert!(report.all_passed(), "{report:?}");
        assert_eq!(driver.filled_value(USERNAME).as_deref(), Some("Admin"));
        assert_eq!(driver.filled_value(PASSWORD).as_deref(), Some("admin123"));
    }

    /// An invalid password shows the error banner with the configured text.
    #[tokio::test]
    async fn test_invalid_password_shows_error() {
        let driver = seeded_driver();
        let mut banner = MockElement::hidden();
        banner.text = "Invalid credentials".to_string();
        driver.add_element(ERROR, banner);
        driver.on_click(SUBMIT, vec![ClickEffect::Reveal(ERROR.to_string())]);

        let report = run(
            r#"Scenario: Invalid password
  Given I open the website
  When I login with credentials "Admin" and "wrong123"
  Then I should see an error message "Invalid credentials"
  And I should remain on the login page
"#,
            &driver,
        )
        .await;

        assert!(report.all_passed(), "{report:?}");
    }

    /// An empty username yields exactly one validation message and no
    /// navigation.
    #[tokio::test]
    async fn test_empty_username_shows_one_validation_message() {
        let driver = seeded_driver();
        driver.on_click(
            SUBMIT,
            vec![ClickEffect::Reveal(VALIDATION.to_string()), ClickEffect::SetText {
                selector: VALIDATION.to_string(),
                text: "Required".to_string(),
            }],
        );

        let report = run(
            r#"Scenario: Empty username
  Given I open the website
  When I leave the username field empty
  And I enter the password "admin123"
  And I click the Login button
  Then I should see a validation message "Required"
  And I should remain on the login page
"#,
            &driver,
        )
        .await;

        assert!(report.all_passed(), "{report:?}");
    }

    /// Two validation messages fail the quantified count == 1 assertion.
    #[tokio::test]
    async fn test_two_validation_messages_fail_the_count() {
        let driver = seeded_driver();
        driver.add_element(
            VALIDATION,
            MockElement::visible("Required").with_count(2),
        );

        let report = run(
            r#"Scenario: Both fields empty
  Given I open the website
  Then I should see a validation message "Required"
"#,
            &driver,
        )
        .await;

        let failed = report.failed_step().unwrap();
        assert!(matches!(
            failed.status,
            StepStatus::Failed { ref message } if message.contains("expected count 1")
        ));
    }

    /// The username placeholder is static: unchanged by fills and repeated
    /// reads.
    #[tokio::test]
    async fn test_placeholder_steps_are_idempotent() {
        let driver = seeded_driver();

        let report = run(
            r#"Scenario: Placeholders
  Given I open the website
  Then the Username field should display placeholder "Username"
  And the Password field should display placeholder "Password"
  When I enter the username "Admin"
  Then the Username field should display placeholder "Username"
"#,
            &driver,
        )
        .await;

        assert!(report.all_passed(), "{report:?}");
    }

    /// All four social links are visible on a fresh login page.
    #[tokio::test]
    async fn test_social_links_visible_on_fresh_page() {
        let driver = seeded_driver();

        let report = run(
            r#"Scenario: Footer links
  Given I open the website
  Then links for LinkedIn, Facebook, Twitter, and YouTube should be displayed
  And copyright text should be visible
"#,
            &driver,
        )
        .await;

        assert!(report.all_passed(), "{report:?}");
    }

    /// An unknown control caption fails the scenario instead of silently
    /// doing nothing.
    #[tokio::test]
    async fn test_unknown_control_fails() {
        let driver = seeded_driver();

        let report = run(
            r#"Scenario: Unknown control
  Given I open the website
  When I click on "Self Destruct"
"#,
            &driver,
        )
        .await;

        let failed = report.failed_step().unwrap();
        assert!(matches!(
            failed.status,
            StepStatus::Failed { ref message } if message.contains("Self Destruct")
        ));
    }

    /// "I click on" dispatches by caption from the configured strings.
    #[tokio::test]
    async fn test_click_on_dispatches_by_caption() {
        let driver = seeded_driver();

        let report = run(
            r#"Scenario: Click by caption
  Given I open the website
  When I click on "Login"
"#,
            &driver,
        )
        .await;

        assert!(report.all_passed(), "{report:?}");
        assert!(driver.was_called(&format!("click:{SUBMIT}")));
    }

    #[tokio::test]
    async fn test_goto_lands_on_login_url() {
        let driver = seeded_driver();
        let report = run(
            "Scenario: Open\n  Given I open the website\n",
            &driver,
        )
        .await;
        assert!(report.all_passed(), "{report:?}");
        assert_eq!(driver.current_url().await.unwrap(), LOGIN_URL);
    }
}
