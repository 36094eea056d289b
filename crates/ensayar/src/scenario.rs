//! Scenario context, parsing, and sequential execution.
//!
//! A [`ScenarioContext`] is the explicit per-scenario state handed to every
//! step handler: the shared driver handle, the test configuration, and a
//! [`PageManager`] that constructs page objects lazily. It is built at
//! scenario start and dropped at scenario end; the driver handle itself is
//! created and destroyed by the caller.
//!
//! [`ScenarioRunner`] executes steps strictly sequentially. Each handler
//! completes before the next starts; the first failure terminates the
//! scenario and every remaining step is reported skipped.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crate::config::TestConfig;
use crate::driver::Driver;
use crate::pages::LoginPage;
use crate::report::{ScenarioReport, StepReport, StepStatus};
use crate::result::{EnsayarError, EnsayarResult};
use crate::step::{StepKeyword, StepRegistry};

/// Lazily-constructed page objects sharing one driver handle.
///
/// One instance per scenario; page objects are built on first access and
/// live until the scenario ends.
pub struct PageManager {
    driver: Arc<dyn Driver>,
    base_url: String,
    login: OnceLock<LoginPage>,
}

impl std::fmt::Debug for PageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageManager")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PageManager {
    /// Create a page manager over a shared driver handle
    #[must_use]
    pub fn new(driver: Arc<dyn Driver>, base_url: impl Into<String>) -> Self {
        Self {
            driver,
            base_url: base_url.into(),
            login: OnceLock::new(),
        }
    }

    /// The login page object, constructed on first access
    #[must_use]
    pub fn login_page(&self) -> &LoginPage {
        self.login
            .get_or_init(|| LoginPage::new(self.driver.clone(), self.base_url.clone()))
    }
}

/// Per-scenario shared state passed to every step handler.
pub struct ScenarioContext {
    driver: Arc<dyn Driver>,
    config: TestConfig,
    pages: PageManager,
}

impl std::fmt::Debug for ScenarioContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioContext")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl ScenarioContext {
    /// Build the context for one scenario.
    ///
    /// The driver handle is shared, not owned: closing the browser stays the
    /// caller's responsibility.
    #[must_use]
    pub fn new(driver: Arc<dyn Driver>, config: TestConfig) -> Self {
        let pages = PageManager::new(driver.clone(), config.base_url.clone());
        Self {
            driver,
            config,
            pages,
        }
    }

    /// The shared driver handle
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    /// The test configuration
    #[must_use]
    pub const fn config(&self) -> &TestConfig {
        &self.config
    }

    /// The login page object
    #[must_use]
    pub fn login_page(&self) -> &LoginPage {
        self.pages.login_page()
    }
}

/// One parsed step line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStep {
    /// Resolved keyword (`And`/`But` already folded into the previous one)
    pub keyword: StepKeyword,
    /// Step text without the keyword
    pub text: String,
}

/// A named scenario: an ordered list of steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Scenario name
    pub name: String,
    /// Steps in declaration order
    pub steps: Vec<ParsedStep>,
}

/// A parsed feature file: a name plus its scenarios
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feature {
    /// Feature name
    pub name: String,
    /// Scenarios in declaration order
    pub scenarios: Vec<Scenario>,
}

impl Feature {
    /// Parse minimal feature text: `Feature:`/`Scenario:` headers, step
    /// lines, `#` comments. `And`/`But` inherit the previous step's keyword.
    ///
    /// # Errors
    ///
    /// Returns [`EnsayarError::ScenarioParse`] for step lines outside a
    /// scenario, leading `And`/`But`, or unrecognized lines.
    pub fn parse(source: &str) -> EnsayarResult<Self> {
        let mut feature = Self::default();
        let mut current: Option<Scenario> = None;
        let mut last_keyword: Option<StepKeyword> = None;

        for (index, raw) in source.lines().enumerate() {
            let line = raw.trim();
            let line_no = index + 1;

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix("Feature:") {
                feature.name = name.trim().to_string();
                continue;
            }

            if let Some(name) = line.strip_prefix("Scenario:") {
                if let Some(done) = current.take() {
                    feature.scenarios.push(done);
                }
                current = Some(Scenario {
                    name: name.trim().to_string(),
                    steps: Vec::new(),
                });
                last_keyword = None;
                continue;
            }

            let (keyword, text) = Self::split_step(line, last_keyword, line_no)?;
            let Some(scenario) = current.as_mut() else {
                return Err(EnsayarError::ScenarioParse {
                    line: line_no,
                    message: format!("step '{line}' appears before any Scenario:"),
                });
            };
            last_keyword = Some(keyword);
            scenario.steps.push(ParsedStep {
                keyword,
                text: text.to_string(),
            });
        }

        if let Some(done) = current.take() {
            feature.scenarios.push(done);
        }

        Ok(feature)
    }

    fn split_step(
        line: &str,
        last_keyword: Option<StepKeyword>,
        line_no: usize,
    ) -> EnsayarResult<(StepKeyword, &str)> {
        let (head, rest) = line.split_once(' ').ok_or_else(|| EnsayarError::ScenarioParse {
            line: line_no,
            message: format!("unrecognized line '{line}'"),
        })?;

        let keyword = match head {
            "Given" => StepKeyword::Given,
            "When" => StepKeyword::When,
            "Then" => StepKeyword::Then,
            "And" | "But" => last_keyword.ok_or_else(|| EnsayarError::ScenarioParse {
                line: line_no,
                message: format!("'{head}' without a preceding Given/When/Then"),
            })?,
            other => {
                return Err(EnsayarError::ScenarioParse {
                    line: line_no,
                    message: format!("unrecognized keyword '{other}'"),
                });
            }
        };

        Ok((keyword, rest.trim()))
    }

    /// All (keyword, text) pairs across every scenario, for registry checks
    pub fn step_texts(&self) -> impl Iterator<Item = (StepKeyword, &str)> {
        self.scenarios
            .iter()
            .flat_map(|s| s.steps.iter().map(|step| (step.keyword, step.text.as_str())))
    }
}

/// Executes scenarios against an injected step registry.
#[derive(Debug)]
pub struct ScenarioRunner<'r> {
    registry: &'r StepRegistry,
}

impl<'r> ScenarioRunner<'r> {
    /// Create a runner over a registry
    #[must_use]
    pub const fn new(registry: &'r StepRegistry) -> Self {
        Self { registry }
    }

    /// Run one scenario to completion, fail-fast.
    ///
    /// Steps execute strictly sequentially; no step overlaps another. The
    /// first error (assertion, locator, or resolution) fails the scenario
    /// and the remaining steps are recorded as skipped.
    pub async fn run(&self, scenario: &Scenario, ctx: &mut ScenarioContext) -> ScenarioReport {
        tracing::info!(scenario = %scenario.name, "scenario started");
        let start = Instant::now();
        let mut steps = Vec::with_capacity(scenario.steps.len());
        let mut failed = false;

        for step in &scenario.steps {
            if failed {
                steps.push(StepReport {
                    keyword: step.keyword.as_str().to_string(),
                    text: step.text.clone(),
                    status: StepStatus::Skipped,
                    duration_ms: 0,
                });
                continue;
            }

            let step_start = Instant::now();
            let outcome = match self.registry.resolve(step.keyword, &step.text) {
                Ok((def, args)) => def.call(ctx, args).await,
                Err(e) => Err(e),
            };
            let duration_ms = u64::try_from(step_start.elapsed().as_millis()).unwrap_or(u64::MAX);

            let status = match outcome {
                Ok(()) => StepStatus::Passed,
                Err(e) => {
                    tracing::warn!(
                        scenario = %scenario.name,
                        step = %step.text,
                        error = %e,
                        "step failed"
                    );
                    failed = true;
                    StepStatus::Failed {
                        message: e.to_string(),
                    }
                }
            };

            steps.push(StepReport {
                keyword: step.keyword.as_str().to_string(),
                text: step.text.clone(),
                status,
                duration_ms,
            });
        }

        ScenarioReport {
            name: scenario.name.clone(),
            steps,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}
