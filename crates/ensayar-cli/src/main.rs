//! Ensayador: command-line runner for login-page scenarios.
//!
//! ## Usage
//!
//! ```bash
//! ensayador check features/          # resolve every phrase, no browser
//! ensayador run features/login.feature
//! ensayador run --headed --base-url http://localhost:8080 smoke.feature
//! ensayador steps                    # list registered bindings
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use console::style;

use ensayar::steps::register_login_steps;
use ensayar::{Driver, EnsayarResult, Feature, StepRegistry};

#[derive(Debug, Parser)]
#[command(name = "ensayador", version, about = "Run login-page scenarios against a browser")]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run scenario files against a live browser
    Run(RunArgs),
    /// Resolve every step phrase against the registry, without a browser
    Check(CheckArgs),
    /// List registered step bindings
    Steps,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Scenario files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// JSON test configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the site origin from the configuration
    #[arg(long, env = "ENSAYAR_BASE_URL")]
    base_url: Option<String>,

    /// Run the browser with a visible window
    #[arg(long)]
    headed: bool,

    /// Write the suite report as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Scenario files
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let mut registry = StepRegistry::new();
    if let Err(e) = register_login_steps(&mut registry) {
        eprintln!("{} {e}", style("registration error:").red().bold());
        return ExitCode::FAILURE;
    }

    let outcome = match cli.command {
        Commands::Run(args) => run_scenarios(&registry, &args),
        Commands::Check(args) => check_files(&registry, &args),
        Commands::Steps => {
            list_steps(&registry);
            Ok(true)
        }
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {e}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_file(path: &Path) -> EnsayarResult<Feature> {
    let source = std::fs::read_to_string(path)?;
    Feature::parse(&source)
}

fn list_steps(registry: &StepRegistry) {
    for def in registry.iter() {
        println!("{:>5} {}", style(def.keyword().as_str()).cyan(), def.pattern());
    }
    println!("\n{} bindings registered", registry.len());
}

/// Startup-time gate: every phrase in every file must resolve to exactly
/// one handler.
fn check_files(registry: &StepRegistry, args: &CheckArgs) -> EnsayarResult<bool> {
    let mut ok = true;
    for path in &args.files {
        match parse_file(path).and_then(|feature| registry.check(feature.step_texts())) {
            Ok(()) => println!("{:>6}  {}", style("ok").green(), path.display()),
            Err(e) => {
                ok = false;
                println!("{:>6}  {}", style("FAILED").red().bold(), path.display());
                println!("        {e}");
            }
        }
    }
    Ok(ok)
}

#[cfg(feature = "browser")]
fn run_scenarios(registry: &StepRegistry, args: &RunArgs) -> EnsayarResult<bool> {
    use ensayar::{Browser, DriverConfig, ScenarioContext, ScenarioRunner, SuiteReport, TestConfig};
    use std::sync::Arc;

    let mut config = match &args.config {
        Some(path) => TestConfig::from_json_file(path)?,
        None => TestConfig::default(),
    };
    if let Some(ref base_url) = args.base_url {
        config.base_url.clone_from(base_url);
    }

    let features = args
        .files
        .iter()
        .map(|path| parse_file(path))
        .collect::<EnsayarResult<Vec<_>>>()?;

    // Fail on registration problems before any browser is launched
    for feature in &features {
        registry.check(feature.step_texts())?;
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let suite = runtime.block_on(async {
        let browser = Browser::launch(DriverConfig::new().headless(!args.headed)).await?;
        let runner = ScenarioRunner::new(registry);
        let mut suite = SuiteReport::new();

        for feature in &features {
            for scenario in &feature.scenarios {
                // Each scenario gets its own page handle and context
                let driver = Arc::new(browser.new_page().await?);
                let mut ctx = ScenarioContext::new(driver.clone(), config.clone());
                let report = runner.run(scenario, &mut ctx).await;
                print_scenario(&report);
                suite.push(report);
                driver.close().await.ok();
            }
        }

        browser.close().await?;
        Ok::<_, ensayar::EnsayarError>(suite)
    })?;

    println!(
        "\n{} passed, {} failed, {} total",
        style(suite.passed_count()).green(),
        style(suite.failed_count()).red(),
        suite.scenarios.len()
    );

    if let Some(ref path) = args.json {
        std::fs::write(path, suite.to_json()?)?;
    }

    Ok(suite.all_passed())
}

#[cfg(not(feature = "browser"))]
fn run_scenarios(_registry: &StepRegistry, _args: &RunArgs) -> EnsayarResult<bool> {
    Err(ensayar::EnsayarError::Page {
        message: "browser feature not enabled; rebuild with --features browser".to_string(),
    })
}

#[cfg(feature = "browser")]
fn print_scenario(report: &ensayar::ScenarioReport) {
    let mark = if report.all_passed() {
        style("ok").green()
    } else {
        style("FAILED").red().bold()
    };
    println!("{mark:>6}  {} ({}ms)", report.name, report.duration_ms);
    if let Some(step) = report.failed_step() {
        if let ensayar::StepStatus::Failed { ref message } = step.status {
            println!("        at: {} {}", step.keyword, step.text);
            println!("        {message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cli_parses_run_args() {
        let cli = Cli::parse_from([
            "ensayador",
            "run",
            "--headed",
            "--base-url",
            "http://localhost:8080",
            "login.feature",
        ]);
        match cli.command {
            Commands::Run(args) => {
                assert!(args.headed);
                assert_eq!(args.base_url.as_deref(), Some("http://localhost:8080"));
                assert_eq!(args.files.len(), 1);
            }
            other => panic!("expected run command, got {other:?}"),
        }
    }

    #[test]
    fn test_check_flags_undefined_steps() {
        let mut registry = StepRegistry::new();
        register_login_steps(&mut registry).unwrap();

        let mut good = tempfile::NamedTempFile::new().unwrap();
        writeln!(good, "Scenario: Open\n  Given I open the website").unwrap();
        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "Scenario: Fly\n  Given I sprout wings").unwrap();

        let args = CheckArgs {
            files: vec![good.path().to_path_buf()],
        };
        assert!(check_files(&registry, &args).unwrap());

        let args = CheckArgs {
            files: vec![bad.path().to_path_buf()],
        };
        assert!(!check_files(&registry, &args).unwrap());
    }
}
