//! Abstract page/driver handle.
//!
//! Page objects depend only on the [`Driver`] trait, never on a concrete
//! automation backend. The default backend is `ChromiumDriver` (CDP via
//! chromiumoxide, behind the `browser` feature); [`MockDriver`] serves unit
//! tests with a scripted DOM and no browser process.
//!
//! Every trait method resolves its locator against the current document at
//! call time. Actions return once the underlying action settles; waiting and
//! polling are the driver's own contract, nothing above it retries.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::locator::Locator;
use crate::result::{EnsayarError, EnsayarResult};

/// Browser/driver configuration
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Timeout for navigation
    pub navigation_timeout: Duration,
    /// Timeout for element queries
    pub element_timeout: Duration,
    /// User agent string
    pub user_agent: Option<String>,
    /// Executable path override
    pub executable_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            navigation_timeout: Duration::from_secs(30),
            element_timeout: Duration::from_secs(5),
            user_agent: None,
            executable_path: None,
            sandbox: true,
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set navigation timeout
    #[must_use]
    pub const fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Set user agent
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set chromium executable path
    #[must_use]
    pub fn executable_path(mut self, path: impl Into<String>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Abstract driver trait for browser automation.
///
/// Implementations handle their own interior mutability so a single handle
/// can be shared (non-owning) by every page object in a scenario.
///
/// # Implementations
///
/// - `ChromiumDriver` - default, CDP via chromiumoxide (`browser` feature)
/// - [`MockDriver`] - scripted DOM for unit testing
#[async_trait]
pub trait Driver: Send + Sync {
    /// Navigate to a URL and wait for the load to settle
    async fn navigate(&self, url: &str) -> EnsayarResult<()>;

    /// Get the current URL
    async fn current_url(&self) -> EnsayarResult<String>;

    /// Fill text into the located element, replacing its current value
    async fn fill(&self, locator: &Locator, text: &str) -> EnsayarResult<()>;

    /// Click the located element
    async fn click(&self, locator: &Locator) -> EnsayarResult<()>;

    /// Get the text content of the located element
    async fn text_content(&self, locator: &Locator) -> EnsayarResult<String>;

    /// Get an attribute of the located element (None when absent)
    async fn attribute(&self, locator: &Locator, name: &str) -> EnsayarResult<Option<String>>;

    /// Snapshot of whether the located element is currently visible
    async fn is_visible(&self, locator: &Locator) -> EnsayarResult<bool>;

    /// Count of elements currently matching the locator
    async fn count(&self, locator: &Locator) -> EnsayarResult<usize>;

    /// Wait until the located element is visible, within the locator's
    /// timeout, or fail with [`EnsayarError::Timeout`]
    async fn wait_for_visible(&self, locator: &Locator) -> EnsayarResult<()>;

    /// Close the underlying page/browser handle
    async fn close(&self) -> EnsayarResult<()>;
}

/// A scripted element state inside [`MockDriver`]
#[derive(Debug, Clone)]
pub struct MockElement {
    /// Whether the element is visible
    pub visible: bool,
    /// Text content
    pub text: String,
    /// Attribute map
    pub attributes: HashMap<String, String>,
    /// How many elements the selector matches
    pub count: usize,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            visible: true,
            text: String::new(),
            attributes: HashMap::new(),
            count: 1,
        }
    }
}

impl MockElement {
    /// A visible element with the given text
    #[must_use]
    pub fn visible(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A hidden element (present in the DOM, zero-sized)
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            visible: false,
            ..Self::default()
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the match count
    #[must_use]
    pub const fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

/// Scripted side effect of clicking an element in [`MockDriver`]
#[derive(Debug, Clone)]
pub enum ClickEffect {
    /// Navigate to a URL
    Navigate(String),
    /// Make a previously hidden selector visible
    Reveal(String),
    /// Hide a selector
    Hide(String),
    /// Replace a selector's text content
    SetText {
        /// Target selector
        selector: String,
        /// New text
        text: String,
    },
}

#[derive(Debug, Default)]
struct MockState {
    url: String,
    elements: HashMap<String, MockElement>,
    click_effects: HashMap<String, Vec<ClickEffect>>,
    fills: Vec<(String, String)>,
    call_history: Vec<String>,
}

impl MockState {
    fn apply(&mut self, effect: &ClickEffect) {
        match effect {
            ClickEffect::Navigate(url) => self.url.clone_from(url),
            ClickEffect::Reveal(selector) => {
                self.elements.entry(selector.clone()).or_default().visible = true;
            }
            ClickEffect::Hide(selector) => {
                if let Some(el) = self.elements.get_mut(selector) {
                    el.visible = false;
                }
            }
            ClickEffect::SetText { selector, text } => {
                let el = self.elements.entry(selector.clone()).or_default();
                el.text.clone_from(text);
            }
        }
    }
}

/// Mock driver with a scripted DOM, for unit testing without a browser.
///
/// Elements are keyed by the raw CSS selector string. Click effects let a
/// test script what the page does in response to a click (navigate away,
/// reveal an error banner) without any real rendering.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create a new mock driver with an empty DOM
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script an element state for a CSS selector
    pub fn add_element(&self, selector: impl Into<String>, element: MockElement) {
        let mut state = self.state.lock().expect("mock state poisoned");
        let _ = state.elements.insert(selector.into(), element);
    }

    /// Script side effects applied when a selector is clicked
    pub fn on_click(&self, selector: impl Into<String>, effects: Vec<ClickEffect>) {
        let mut state = self.state.lock().expect("mock state poisoned");
        let _ = state.click_effects.insert(selector.into(), effects);
    }

    /// The last value filled into a selector, if any
    #[must_use]
    pub fn filled_value(&self, selector: &str) -> Option<String> {
        let state = self.state.lock().expect("mock state poisoned");
        state
            .fills
            .iter()
            .rev()
            .find(|(s, _)| s == selector)
            .map(|(_, v)| v.clone())
    }

    /// Check if a method was called (prefix match against the call journal)
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        let state = self.state.lock().expect("mock state poisoned");
        state.call_history.iter().any(|c| c.starts_with(method))
    }

    // Elements are keyed by the raw CSS selector string; non-CSS selectors
    // fall back to their rendered form.
    fn key(locator: &Locator) -> String {
        match locator.selector() {
            crate::locator::Selector::Css(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn require<'a>(
        state: &'a MockState,
        key: &str,
        locator: &Locator,
    ) -> EnsayarResult<&'a MockElement> {
        state
            .elements
            .get(key)
            .ok_or_else(|| EnsayarError::ElementNotFound {
                selector: locator.to_string(),
            })
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn navigate(&self, url: &str) -> EnsayarResult<()> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.call_history.push(format!("navigate:{url}"));
        state.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> EnsayarResult<String> {
        let state = self.state.lock().expect("mock state poisoned");
        Ok(state.url.clone())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> EnsayarResult<()> {
        let key = Self::key(locator);
        let mut state = self.state.lock().expect("mock state poisoned");
        state.call_history.push(format!("fill:{key}"));
        if !state.elements.contains_key(&key) {
            return Err(EnsayarError::ElementNotFound {
                selector: locator.to_string(),
            });
        }
        state.fills.push((key, text.to_string()));
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> EnsayarResult<()> {
        let key = Self::key(locator);
        let mut state = self.state.lock().expect("mock state poisoned");
        state.call_history.push(format!("click:{key}"));
        let _ = Self::require(&state, &key, locator)?;
        let effects = state.click_effects.get(&key).cloned().unwrap_or_default();
        for effect in &effects {
            state.apply(effect);
        }
        Ok(())
    }

    async fn text_content(&self, locator: &Locator) -> EnsayarResult<String> {
        let key = Self::key(locator);
        let state = self.state.lock().expect("mock state poisoned");
        Ok(Self::require(&state, &key, locator)?.text.clone())
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> EnsayarResult<Option<String>> {
        let key = Self::key(locator);
        let state = self.state.lock().expect("mock state poisoned");
        Ok(Self::require(&state, &key, locator)?
            .attributes
            .get(name)
            .cloned())
    }

    async fn is_visible(&self, locator: &Locator) -> EnsayarResult<bool> {
        let key = Self::key(locator);
        let state = self.state.lock().expect("mock state poisoned");
        Ok(state.elements.get(&key).is_some_and(|el| el.visible))
    }

    async fn count(&self, locator: &Locator) -> EnsayarResult<usize> {
        let key = Self::key(locator);
        let state = self.state.lock().expect("mock state poisoned");
        Ok(state.elements.get(&key).map_or(0, |el| el.count))
    }

    async fn wait_for_visible(&self, locator: &Locator) -> EnsayarResult<()> {
        // The mock DOM never changes on its own, so a single snapshot stands
        // in for the real driver's polling loop.
        if self.is_visible(locator).await? {
            Ok(())
        } else {
            Err(EnsayarError::Timeout {
                ms: locator.timeout_ms(),
            })
        }
    }

    async fn close(&self) -> EnsayarResult<()> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.call_history.push("close".to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn css(selector: &str) -> Locator {
        Locator::new(selector)
    }

    #[tokio::test]
    async fn test_navigate_updates_url() {
        let driver = MockDriver::new();
        driver.navigate("https://example.test/login").await.unwrap();
        assert_eq!(
            driver.current_url().await.unwrap(),
            "https://example.test/login"
        );
        assert!(driver.was_called("navigate"));
    }

    #[tokio::test]
    async fn test_fill_records_value() {
        let driver = MockDriver::new();
        driver.add_element("input[name=\"username\"]", MockElement::default());
        driver
            .fill(&css("input[name=\"username\"]"), "Admin")
            .await
            .unwrap();
        assert_eq!(
            driver.filled_value("input[name=\"username\"]").as_deref(),
            Some("Admin")
        );
    }

    #[tokio::test]
    async fn test_fill_missing_element_fails() {
        let driver = MockDriver::new();
        let err = driver
            .fill(&css("input[name=\"username\"]"), "Admin")
            .await
            .unwrap_err();
        assert!(matches!(err, EnsayarError::ElementNotFound { .. }));
    }

    #[tokio::test]
    async fn test_click_effects_navigate_and_reveal() {
        let driver = MockDriver::new();
        driver.navigate("https://example.test/login").await.unwrap();
        driver.add_element("button", MockElement::default());
        driver.add_element(".error", MockElement::hidden());
        driver.on_click(
            "button",
            vec![
                ClickEffect::Reveal(".error".to_string()),
                ClickEffect::Navigate("https://example.test/next".to_string()),
            ],
        );

        driver.click(&css("button")).await.unwrap();
        assert!(driver.is_visible(&css(".error")).await.unwrap());
        assert_eq!(
            driver.current_url().await.unwrap(),
            "https://example.test/next"
        );
    }

    #[tokio::test]
    async fn test_is_visible_missing_element_is_false() {
        let driver = MockDriver::new();
        assert!(!driver.is_visible(&css(".ghost")).await.unwrap());
    }

    #[tokio::test]
    async fn test_count_defaults_to_zero() {
        let driver = MockDriver::new();
        assert_eq!(driver.count(&css(".oxd-text--span")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_wait_for_visible_hidden_times_out() {
        let driver = MockDriver::new();
        driver.add_element(".banner", MockElement::hidden());
        let err = driver.wait_for_visible(&css(".banner")).await.unwrap_err();
        assert!(matches!(err, EnsayarError::Timeout { ms: 5000 }));
    }

    #[test]
    fn test_driver_config_builder() {
        let config = DriverConfig::new()
            .headless(false)
            .viewport(1920, 1080)
            .user_agent("ensayar-tests")
            .no_sandbox();
        assert!(!config.headless);
        assert_eq!(config.viewport_width, 1920);
        assert_eq!(config.user_agent.as_deref(), Some("ensayar-tests"));
        assert!(!config.sandbox);
    }
}
