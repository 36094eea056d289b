//! Chromium control via CDP.
//!
//! Real browser automation behind the `browser` feature, using chromiumoxide.
//! [`ChromiumDriver`] implements [`Driver`] by evaluating the JavaScript
//! expressions rendered from each [`Locator`] at call time, so element
//! resolution always happens against the current document.

use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::driver::{Driver, DriverConfig};
use crate::locator::Locator;
use crate::result::{EnsayarError, EnsayarResult};

/// Browser instance owning the CDP connection.
///
/// The browser (and every page handle it hands out) is created and destroyed
/// by the caller, typically the scenario runner host; page objects only ever
/// borrow the driver.
#[derive(Debug)]
pub struct Browser {
    config: DriverConfig,
    inner: Arc<Mutex<CdpBrowser>>,
    #[allow(dead_code)]
    handle: tokio::task::JoinHandle<()>,
}

impl Browser {
    /// Launch a new browser instance
    ///
    /// # Errors
    ///
    /// Returns error if the browser cannot be launched
    pub async fn launch(config: DriverConfig) -> EnsayarResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(config.viewport_width, config.viewport_height);

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.executable_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|e| EnsayarError::BrowserLaunch {
                message: e.to_string(),
            })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| EnsayarError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        // Drive the CDP event stream until the connection drops
        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        tracing::debug!(headless = config.headless, "browser launched");

        Ok(Self {
            config,
            inner: Arc::new(Mutex::new(browser)),
            handle,
        })
    }

    /// Open a new page and wrap it as a [`Driver`]
    ///
    /// # Errors
    ///
    /// Returns error if the page cannot be created
    pub async fn new_page(&self) -> EnsayarResult<ChromiumDriver> {
        let browser = self.inner.lock().await;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| EnsayarError::Page {
                message: e.to_string(),
            })?;

        Ok(ChromiumDriver {
            page: Arc::new(Mutex::new(page)),
        })
    }

    /// Get the driver configuration
    #[must_use]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Close the browser
    pub async fn close(self) -> EnsayarResult<()> {
        let mut browser = self.inner.lock().await;
        browser
            .close()
            .await
            .map_err(|e| EnsayarError::BrowserLaunch {
                message: e.to_string(),
            })?;
        Ok(())
    }
}

/// A [`Driver`] backed by one CDP page.
#[derive(Debug, Clone)]
pub struct ChromiumDriver {
    page: Arc<Mutex<CdpPage>>,
}

impl ChromiumDriver {
    async fn eval<T: serde::de::DeserializeOwned>(&self, expr: &str) -> EnsayarResult<T> {
        let page = self.page.lock().await;
        let result = page.evaluate(expr).await.map_err(|e| EnsayarError::Page {
            message: e.to_string(),
        })?;
        result.into_value().map_err(|e| EnsayarError::Page {
            message: e.to_string(),
        })
    }

    // Strict locators refuse to act when the selector matches more than one
    // element, matching the page-object invariant that one action touches
    // one control.
    async fn check_strict(&self, locator: &Locator) -> EnsayarResult<()> {
        if !locator.options().strict {
            return Ok(());
        }
        let count: usize = self.eval(&locator.selector().to_count_query()).await?;
        if count > 1 {
            return Err(EnsayarError::Page {
                message: format!("strict mode violation: {locator} matched {count} elements"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Driver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> EnsayarResult<()> {
        tracing::debug!(url, "navigate");
        let page = self.page.lock().await;
        page.goto(url).await.map_err(|e| EnsayarError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        page.wait_for_navigation()
            .await
            .map_err(|e| EnsayarError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> EnsayarResult<String> {
        self.eval("window.location.href").await
    }

    async fn fill(&self, locator: &Locator, text: &str) -> EnsayarResult<()> {
        tracing::debug!(%locator, "fill");
        self.wait_for_visible(locator).await?;
        self.check_strict(locator).await?;
        let expr = format!(
            "(() => {{ const el = {query}; if (!el) return false; el.focus(); el.value = {text:?}; \
             el.dispatchEvent(new Event('input', {{bubbles: true}})); \
             el.dispatchEvent(new Event('change', {{bubbles: true}})); return true; }})()",
            query = locator.selector().to_query(),
        );
        let filled: bool = self.eval(&expr).await?;
        if filled {
            Ok(())
        } else {
            Err(EnsayarError::ElementNotFound {
                selector: locator.to_string(),
            })
        }
    }

    async fn click(&self, locator: &Locator) -> EnsayarResult<()> {
        tracing::debug!(%locator, "click");
        self.wait_for_visible(locator).await?;
        self.check_strict(locator).await?;
        let expr = format!(
            "(() => {{ const el = {query}; if (!el) return false; el.click(); return true; }})()",
            query = locator.selector().to_query(),
        );
        let clicked: bool = self.eval(&expr).await?;
        if clicked {
            Ok(())
        } else {
            Err(EnsayarError::ElementNotFound {
                selector: locator.to_string(),
            })
        }
    }

    async fn text_content(&self, locator: &Locator) -> EnsayarResult<String> {
        let text: Option<String> = self.eval(&locator.selector().to_text_query()).await?;
        text.ok_or_else(|| EnsayarError::ElementNotFound {
            selector: locator.to_string(),
        })
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> EnsayarResult<Option<String>> {
        let exists: usize = self.eval(&locator.selector().to_count_query()).await?;
        if exists == 0 {
            return Err(EnsayarError::ElementNotFound {
                selector: locator.to_string(),
            });
        }
        self.eval(&locator.selector().to_attribute_query(name))
            .await
    }

    async fn is_visible(&self, locator: &Locator) -> EnsayarResult<bool> {
        self.eval(&locator.selector().to_visible_query()).await
    }

    async fn count(&self, locator: &Locator) -> EnsayarResult<usize> {
        self.eval(&locator.selector().to_count_query()).await
    }

    async fn wait_for_visible(&self, locator: &Locator) -> EnsayarResult<()> {
        let opts = locator.options();
        let deadline = Instant::now() + opts.timeout;
        loop {
            if self.is_visible(locator).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(EnsayarError::Timeout {
                    ms: locator.timeout_ms(),
                });
            }
            sleep(opts.poll_interval).await;
        }
    }

    async fn close(&self) -> EnsayarResult<()> {
        use chromiumoxide::cdp::browser_protocol::page::CloseParams;

        let page = self.page.lock().await;
        page.execute(CloseParams::default())
            .await
            .map_err(|e| EnsayarError::Page {
                message: e.to_string(),
            })?;
        Ok(())
    }
}
