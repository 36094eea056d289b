//! Step bindings: typed phrase patterns bound to async handlers.
//!
//! A [`StepRegistry`] is an explicit value constructed at process start and
//! injected into the scenario runner — registration is never ambient or
//! module-global. Phrase placeholders are typed: a pattern like
//! `I enter the username {string}` compiles to an anchored regex whose
//! captures are extracted into a fixed tuple of typed values, so handlers
//! read their arguments through checked accessors instead of raw strings.
//!
//! Duplicate patterns are rejected at registration time; a step text that
//! matches zero or several patterns is an error at resolution time. Both are
//! configuration mistakes, distinct from runtime assertion failures.

use futures::future::BoxFuture;
use regex::Regex;

use crate::result::{EnsayarError, EnsayarResult};
use crate::scenario::ScenarioContext;

/// Gherkin-style step keyword.
///
/// `And`/`But` never reach the registry: the scenario parser resolves them
/// to the preceding step's keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKeyword {
    /// Precondition step
    Given,
    /// Action step
    When,
    /// Assertion step
    Then,
}

impl StepKeyword {
    /// Keyword as it appears in scenario text
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
        }
    }
}

impl std::fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placeholder types supported in step patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamType {
    /// `{string}` - a double-quoted string; captures its unquoted content
    Str,
    /// `{int}` - a signed integer
    Int,
    /// `{word}` - a single whitespace-free token
    Word,
}

/// A single extracted placeholder value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepArg {
    /// From `{string}`
    Str(String),
    /// From `{int}`
    Int(i64),
    /// From `{word}`
    Word(String),
}

/// The fixed tuple of typed values extracted from one matched step
#[derive(Debug, Clone, Default)]
pub struct StepArgs(Vec<StepArg>);

impl StepArgs {
    /// Number of extracted values
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the step carried no placeholders
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get a `{string}` value by position
    pub fn string(&self, index: usize) -> EnsayarResult<&str> {
        match self.0.get(index) {
            Some(StepArg::Str(s)) => Ok(s),
            Some(other) => Err(EnsayarError::Argument {
                index,
                message: format!("expected string, got {other:?}"),
            }),
            None => Err(EnsayarError::Argument {
                index,
                message: format!("only {} arguments were extracted", self.len()),
            }),
        }
    }

    /// Get an `{int}` value by position
    pub fn int(&self, index: usize) -> EnsayarResult<i64> {
        match self.0.get(index) {
            Some(StepArg::Int(n)) => Ok(*n),
            Some(other) => Err(EnsayarError::Argument {
                index,
                message: format!("expected int, got {other:?}"),
            }),
            None => Err(EnsayarError::Argument {
                index,
                message: format!("only {} arguments were extracted", self.len()),
            }),
        }
    }

    /// Get a `{word}` value by position
    pub fn word(&self, index: usize) -> EnsayarResult<&str> {
        match self.0.get(index) {
            Some(StepArg::Word(w)) => Ok(w),
            Some(other) => Err(EnsayarError::Argument {
                index,
                message: format!("expected word, got {other:?}"),
            }),
            None => Err(EnsayarError::Argument {
                index,
                message: format!("only {} arguments were extracted", self.len()),
            }),
        }
    }
}

/// A compiled step phrase pattern
#[derive(Debug, Clone)]
pub struct StepPattern {
    source: String,
    regex: Regex,
    params: Vec<ParamType>,
}

impl StepPattern {
    /// Compile a phrase with `{string}`/`{int}`/`{word}` placeholders into
    /// an anchored matcher.
    ///
    /// # Errors
    ///
    /// Returns [`EnsayarError::InvalidPattern`] for unknown or unclosed
    /// placeholders.
    pub fn parse(source: &str) -> EnsayarResult<Self> {
        let mut regex_src = String::from("^");
        let mut params = Vec::new();
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            let (literal, tail) = rest.split_at(open);
            regex_src.push_str(&regex::escape(literal));

            let Some(close) = tail.find('}') else {
                return Err(EnsayarError::InvalidPattern {
                    pattern: source.to_string(),
                    message: "unclosed placeholder".to_string(),
                });
            };
            let name = &tail[1..close];
            match name {
                "string" => {
                    regex_src.push_str("\"([^\"]*)\"");
                    params.push(ParamType::Str);
                }
                "int" => {
                    regex_src.push_str("(-?\\d+)");
                    params.push(ParamType::Int);
                }
                "word" => {
                    regex_src.push_str("(\\S+)");
                    params.push(ParamType::Word);
                }
                other => {
                    return Err(EnsayarError::InvalidPattern {
                        pattern: source.to_string(),
                        message: format!("unknown placeholder '{{{other}}}'"),
                    });
                }
            }
            rest = &tail[close + 1..];
        }
        regex_src.push_str(&regex::escape(rest));
        regex_src.push('$');

        let regex = Regex::new(&regex_src).map_err(|e| EnsayarError::InvalidPattern {
            pattern: source.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            source: source.to_string(),
            regex,
            params,
        })
    }

    /// The original pattern source
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Match step text and extract typed values.
    ///
    /// `Ok(None)` means the text does not match this pattern.
    pub fn extract(&self, text: &str) -> EnsayarResult<Option<StepArgs>> {
        let Some(captures) = self.regex.captures(text) else {
            return Ok(None);
        };

        let mut args = Vec::with_capacity(self.params.len());
        for (index, param) in self.params.iter().enumerate() {
            let raw = captures
                .get(index + 1)
                .map(|m| m.as_str())
                .ok_or_else(|| EnsayarError::Argument {
                    index,
                    message: "capture group missing".to_string(),
                })?;
            let arg = match param {
                ParamType::Str => StepArg::Str(raw.to_string()),
                ParamType::Word => StepArg::Word(raw.to_string()),
                ParamType::Int => {
                    StepArg::Int(raw.parse().map_err(|e| EnsayarError::Argument {
                        index,
                        message: format!("'{raw}' is not an integer: {e}"),
                    })?)
                }
            };
            args.push(arg);
        }

        Ok(Some(StepArgs(args)))
    }
}

/// A step handler: an async function over the scenario context and the
/// extracted placeholder values.
pub type StepFn =
    for<'a> fn(&'a mut ScenarioContext, StepArgs) -> BoxFuture<'a, EnsayarResult<()>>;

/// One registered (keyword, pattern, handler) binding
pub struct StepDef {
    keyword: StepKeyword,
    pattern: StepPattern,
    handler: StepFn,
}

impl std::fmt::Debug for StepDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepDef")
            .field("keyword", &self.keyword)
            .field("pattern", &self.pattern.source)
            .finish_non_exhaustive()
    }
}

impl StepDef {
    /// The step keyword
    #[must_use]
    pub const fn keyword(&self) -> StepKeyword {
        self.keyword
    }

    /// The pattern source
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.source()
    }

    /// Invoke the handler
    pub fn call<'a>(
        &self,
        ctx: &'a mut ScenarioContext,
        args: StepArgs,
    ) -> BoxFuture<'a, EnsayarResult<()>> {
        (self.handler)(ctx, args)
    }
}

/// Registry of step bindings, matched in declaration order.
#[derive(Debug, Default)]
pub struct StepRegistry {
    steps: Vec<StepDef>,
}

impl StepRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a `Given` step
    pub fn given(&mut self, pattern: &str, handler: StepFn) -> EnsayarResult<()> {
        self.register(StepKeyword::Given, pattern, handler)
    }

    /// Register a `When` step
    pub fn when(&mut self, pattern: &str, handler: StepFn) -> EnsayarResult<()> {
        self.register(StepKeyword::When, pattern, handler)
    }

    /// Register a `Then` step
    pub fn then(&mut self, pattern: &str, handler: StepFn) -> EnsayarResult<()> {
        self.register(StepKeyword::Then, pattern, handler)
    }

    fn register(
        &mut self,
        keyword: StepKeyword,
        pattern: &str,
        handler: StepFn,
    ) -> EnsayarResult<()> {
        if self
            .steps
            .iter()
            .any(|def| def.keyword == keyword && def.pattern.source() == pattern)
        {
            return Err(EnsayarError::DuplicateStep {
                pattern: pattern.to_string(),
            });
        }
        let pattern = StepPattern::parse(pattern)?;
        tracing::trace!(keyword = %keyword, pattern = pattern.source(), "step registered");
        self.steps.push(StepDef {
            keyword,
            pattern,
            handler,
        });
        Ok(())
    }

    /// Number of registered bindings
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterate over registered bindings
    pub fn iter(&self) -> impl Iterator<Item = &StepDef> {
        self.steps.iter()
    }

    /// Resolve step text to exactly one binding and its extracted arguments.
    ///
    /// # Errors
    ///
    /// [`EnsayarError::UndefinedStep`] when nothing matches,
    /// [`EnsayarError::AmbiguousStep`] when several patterns match.
    pub fn resolve(&self, keyword: StepKeyword, text: &str) -> EnsayarResult<(&StepDef, StepArgs)> {
        let mut matched = Vec::new();
        for def in self.steps.iter().filter(|d| d.keyword == keyword) {
            if let Some(args) = def.pattern.extract(text)? {
                matched.push((def, args));
            }
        }

        match matched.len() {
            0 => Err(EnsayarError::UndefinedStep {
                text: format!("{keyword} {text}"),
            }),
            1 => Ok(matched.remove(0)),
            _ => Err(EnsayarError::AmbiguousStep {
                text: text.to_string(),
                patterns: matched
                    .iter()
                    .map(|(def, _)| def.pattern.source().to_string())
                    .collect(),
            }),
        }
    }

    /// Verify that every (keyword, text) pair resolves to exactly one
    /// handler. This is the startup-time ambiguity gate: run it over all
    /// scenario files before any browser is launched.
    pub fn check<'t>(
        &self,
        steps: impl IntoIterator<Item = (StepKeyword, &'t str)>,
    ) -> EnsayarResult<()> {
        for (keyword, text) in steps {
            let _ = self.resolve(keyword, text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop<'a>(
        _ctx: &'a mut ScenarioContext,
        _args: StepArgs,
    ) -> BoxFuture<'a, EnsayarResult<()>> {
        Box::pin(async { Ok(()) })
    }

    mod pattern_tests {
        use super::*;

        #[test]
        fn test_literal_pattern() {
            let pattern = StepPattern::parse("I open the website").unwrap();
            assert!(pattern.extract("I open the website").unwrap().is_some());
            assert!(pattern.extract("I open the websites").unwrap().is_none());
            assert!(pattern.extract("Now I open the website").unwrap().is_none());
        }

        #[test]
        fn test_string_placeholder() {
            let pattern = StepPattern::parse("I enter the username {string}").unwrap();
            let args = pattern
                .extract("I enter the username \"Admin\"")
                .unwrap()
                .unwrap();
            assert_eq!(args.string(0).unwrap(), "Admin");
        }

        #[test]
        fn test_string_placeholder_requires_quotes() {
            let pattern = StepPattern::parse("I enter the username {string}").unwrap();
            assert!(pattern.extract("I enter the username Admin").unwrap().is_none());
        }

        #[test]
        fn test_int_placeholder() {
            let pattern = StepPattern::parse("exactly {int} validation messages").unwrap();
            let args = pattern
                .extract("exactly 1 validation messages")
                .unwrap()
                .unwrap();
            assert_eq!(args.int(0).unwrap(), 1);

            let args = pattern
                .extract("exactly -3 validation messages")
                .unwrap()
                .unwrap();
            assert_eq!(args.int(0).unwrap(), -3);
        }

        #[test]
        fn test_word_placeholder() {
            let pattern = StepPattern::parse("I click the {word} button").unwrap();
            let args = pattern.extract("I click the Login button").unwrap().unwrap();
            assert_eq!(args.word(0).unwrap(), "Login");
            assert!(pattern.extract("I click the  button").unwrap().is_none());
        }

        #[test]
        fn test_multiple_placeholders_in_order() {
            let pattern =
                StepPattern::parse("I login with credentials {string} and {string}").unwrap();
            let args = pattern
                .extract("I login with credentials \"Admin\" and \"admin123\"")
                .unwrap()
                .unwrap();
            assert_eq!(args.len(), 2);
            assert_eq!(args.string(0).unwrap(), "Admin");
            assert_eq!(args.string(1).unwrap(), "admin123");
        }

        #[test]
        fn test_literal_regex_metachars_are_escaped() {
            let pattern = StepPattern::parse("the price is $5 (net)").unwrap();
            assert!(pattern.extract("the price is $5 (net)").unwrap().is_some());
            assert!(pattern.extract("the price is 5 net").unwrap().is_none());
        }

        #[test]
        fn test_unknown_placeholder_rejected() {
            let err = StepPattern::parse("I wait {float} seconds").unwrap_err();
            assert!(matches!(err, EnsayarError::InvalidPattern { .. }));
            assert!(err.is_registration_error());
        }

        #[test]
        fn test_unclosed_placeholder_rejected() {
            let err = StepPattern::parse("I enter {string").unwrap_err();
            assert!(matches!(err, EnsayarError::InvalidPattern { .. }));
        }

        #[test]
        fn test_typed_accessor_mismatch() {
            let pattern = StepPattern::parse("I enter {string}").unwrap();
            let args = pattern.extract("I enter \"Admin\"").unwrap().unwrap();
            assert!(matches!(
                args.int(0).unwrap_err(),
                EnsayarError::Argument { index: 0, .. }
            ));
            assert!(matches!(
                args.string(1).unwrap_err(),
                EnsayarError::Argument { index: 1, .. }
            ));
        }
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_register_and_resolve() {
            let mut registry = StepRegistry::new();
            registry.given("I open the website", noop).unwrap();
            registry.when("I enter the username {string}", noop).unwrap();

            let (def, args) = registry
                .resolve(StepKeyword::When, "I enter the username \"Admin\"")
                .unwrap();
            assert_eq!(def.pattern(), "I enter the username {string}");
            assert_eq!(args.string(0).unwrap(), "Admin");
        }

        #[test]
        fn test_duplicate_pattern_rejected_at_registration() {
            let mut registry = StepRegistry::new();
            registry.given("I open the website", noop).unwrap();
            let err = registry.given("I open the website", noop).unwrap_err();
            assert!(matches!(err, EnsayarError::DuplicateStep { .. }));
            assert!(err.is_registration_error());
        }

        #[test]
        fn test_same_pattern_different_keyword_is_fine() {
            let mut registry = StepRegistry::new();
            registry.given("I am on the login page", noop).unwrap();
            registry.then("I am on the login page", noop).unwrap();
            assert_eq!(registry.len(), 2);
        }

        #[test]
        fn test_undefined_step() {
            let registry = StepRegistry::new();
            let err = registry
                .resolve(StepKeyword::Then, "I should fly to the moon")
                .unwrap_err();
            assert!(matches!(err, EnsayarError::UndefinedStep { .. }));
        }

        #[test]
        fn test_ambiguous_step() {
            let mut registry = StepRegistry::new();
            registry.when("I click on {string}", noop).unwrap();
            registry.when("I click on \"Login\"", noop).unwrap();

            let err = registry
                .resolve(StepKeyword::When, "I click on \"Login\"")
                .unwrap_err();
            match err {
                EnsayarError::AmbiguousStep { patterns, .. } => {
                    assert_eq!(patterns.len(), 2);
                }
                other => panic!("expected AmbiguousStep, got {other:?}"),
            }
        }

        #[test]
        fn test_check_validates_all_phrases() {
            let mut registry = StepRegistry::new();
            registry.given("I open the website", noop).unwrap();
            registry.when("I enter the username {string}", noop).unwrap();

            registry
                .check([
                    (StepKeyword::Given, "I open the website"),
                    (StepKeyword::When, "I enter the username \"Admin\""),
                ])
                .unwrap();

            let err = registry
                .check([(StepKeyword::When, "I press a key")])
                .unwrap_err();
            assert!(matches!(err, EnsayarError::UndefinedStep { .. }));
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_string_values_round_trip(value in "[^\"\\r\\n]{0,40}") {
                let pattern = StepPattern::parse("I enter {string}").unwrap();
                let text = format!("I enter \"{value}\"");
                let args = pattern.extract(&text).unwrap().unwrap();
                prop_assert_eq!(args.string(0).unwrap(), value);
            }

            #[test]
            fn prop_int_values_round_trip(value in -1_000_000i64..1_000_000) {
                let pattern = StepPattern::parse("count is {int}").unwrap();
                let text = format!("count is {value}");
                let args = pattern.extract(&text).unwrap().unwrap();
                prop_assert_eq!(args.int(0).unwrap(), value);
            }
        }
    }
}
