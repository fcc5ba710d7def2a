use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use arlo_core::CountPolicy;
use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::api::{BASE_URL_VAR, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, TIMEOUT_SECS_VAR};
use services::{AuditApiConfig, AuditApiError, AuditService, HttpAuditApi, RoundResultsService};
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::{App, DesktopLinkOpener, LinkOpenerRef, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCountPolicy { raw: String },
    Config(AuditApiError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCountPolicy { raw } => {
                write!(f, "invalid count policy: {raw} (expected strict or coerce)")
            }
            ArgsError::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    audit_service: Arc<AuditService>,
    round_results: Arc<RoundResultsService>,
    link_opener: LinkOpenerRef,
}

impl UiApp for DesktopApp {
    fn audit_service(&self) -> Arc<AuditService> {
        Arc::clone(&self.audit_service)
    }

    fn round_results(&self) -> Arc<RoundResultsService> {
        Arc::clone(&self.round_results)
    }

    fn link_opener(&self) -> LinkOpenerRef {
        Arc::clone(&self.link_opener)
    }
}

#[derive(Debug)]
struct Args {
    config: AuditApiConfig,
    count_policy: CountPolicy,
}

const COUNT_POLICY_VAR: &str = "ARLO_COUNT_POLICY";

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- [--base-url <url>] [--count-policy <strict|coerce>] [--timeout-secs <n>]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --base-url {DEFAULT_BASE_URL}");
    eprintln!("  --count-policy strict");
    eprintln!("  --timeout-secs {DEFAULT_TIMEOUT_SECS}");
    eprintln!();
    eprintln!("Environment (flags take precedence):");
    eprintln!("  {BASE_URL_VAR}, {COUNT_POLICY_VAR}, {TIMEOUT_SECS_VAR}, RUST_LOG");
}

impl Args {
    /// Returns `None` when usage was requested.
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ArgsError> {
        let mut overrides: HashMap<&'static str, String> = HashMap::new();

        while let Some(arg) = args.next() {
            let (var, flag) = match arg.as_str() {
                "--base-url" => (BASE_URL_VAR, "--base-url"),
                "--count-policy" => (COUNT_POLICY_VAR, "--count-policy"),
                "--timeout-secs" => (TIMEOUT_SECS_VAR, "--timeout-secs"),
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            };
            overrides.insert(var, require_value(args, flag)?);
        }

        let lookup = |key: &str| overrides.get(key).cloned().or_else(|| env(key));
        let config = AuditApiConfig::from_lookup(&lookup).map_err(ArgsError::Config)?;
        let count_policy = match lookup(COUNT_POLICY_VAR) {
            Some(raw) => raw
                .parse()
                .map_err(|_| ArgsError::InvalidCountPolicy { raw })?,
            None => CountPolicy::default(),
        };

        Ok(Some(Self {
            config,
            count_policy,
        }))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let Some(args) = Args::parse(&mut argv, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    init_tracing();

    info!(
        base_url = %args.config.base_url,
        count_policy = %args.count_policy,
        timeout_secs = args.config.timeout.as_secs(),
        "starting audit client"
    );
    let api = Arc::new(HttpAuditApi::new(args.config)?);

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        audit_service: Arc::new(AuditService::new(api.clone())),
        round_results: Arc::new(RoundResultsService::new(api, args.count_policy)),
        link_opener: Arc::new(DesktopLinkOpener),
    });
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Arlo")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
