//! Ensayar: page-object and step-binding test tooling for browser login flows.
//!
//! Two cooperating abstractions make up the crate:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    ENSAYAR Architecture                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │    │ Step       │    │ Page       │            │
//! │   │ Runner     │───►│ Registry   │───►│ Objects    │            │
//! │   │ (fail-fast)│    │ (typed)    │    │ (locators) │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             │ Driver trait      │
//! │                                   ┌─────────┴──────────┐        │
//! │                                   │ Chromium (CDP) or  │        │
//! │                                   │ MockDriver (tests) │        │
//! │                                   └────────────────────┘        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Page objects hide concrete locators behind semantic actions, queries and
//! assertions; step bindings map natural-language phrases with typed
//! placeholders onto those page objects through an explicit, injected
//! [`StepRegistry`]. Scenarios run their steps strictly sequentially and
//! fail fast: the first assertion or locator failure terminates the
//! scenario and skips the rest.

#![warn(missing_docs)]

mod assertion;
mod config;
mod driver;
mod locator;
mod page;
mod report;
mod result;
mod scenario;
mod step;

/// Concrete page objects
pub mod pages;

/// Step definitions for the login scenarios
pub mod steps;

/// Chromium control via CDP (requires the `browser` feature)
#[cfg(feature = "browser")]
mod browser;

pub use assertion::{expect, Expect};
pub use config::{CredentialPair, Credentials, ExpectedText, TestConfig};
pub use driver::{ClickEffect, Driver, DriverConfig, MockDriver, MockElement};
pub use locator::{
    Locator, LocatorOptions, Selector, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS,
};
pub use page::{url_path, PageObject, UrlMatcher};
pub use report::{ScenarioReport, StepReport, StepStatus, SuiteReport};
pub use result::{EnsayarError, EnsayarResult};
pub use scenario::{Feature, PageManager, ParsedStep, Scenario, ScenarioContext, ScenarioRunner};
pub use step::{StepArg, StepArgs, StepDef, StepFn, StepKeyword, StepPattern, StepRegistry};

#[cfg(feature = "browser")]
pub use browser::{Browser, ChromiumDriver};
