mod http;
mod recorder;

use crate::http::HttpExtensions;
use crate::recorder::MetricsRecorder;
use axum_prometheus::PrometheusMetricLayer;
use clap::{Parser, ValueEnum};
use mailsmith_brevo::BrevoTransport;
use mailsmith_core::config::{
    parse_flag, DispatchConfig, GenerationConfig, SenderIdentity, DEFAULT_SENDER_NAME,
};
use mailsmith_core::credentials::ApiKey;
use mailsmith_core::dispatch::DispatchPolicy;
use mailsmith_core::generator::ContentGenerator;
use mailsmith_core::recorder::{BaseRecorder, Recorder};
use mailsmith_core::sanitizer::{BodySanitizer, FirstLine, LeadingLineRule, SubjectEcho};
use mailsmith_gemini::GeminiGenerator;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BodyFilter {
    /// Always drop the first line of a generated body
    FirstLine,
    /// Drop the first line only when it repeats the subject
    SubjectEcho,
}

impl BodyFilter {
    fn rule(self) -> Arc<dyn LeadingLineRule> {
        match self {
            BodyFilter::FirstLine => Arc::new(FirstLine),
            BodyFilter::SubjectEcho => Arc::new(SubjectEcho),
        }
    }
}

#[derive(Parser, Debug)]
struct Args {
    #[clap(long, env = "MAILSMITH_BIND", default_value = "0.0.0.0:6000")]
    bind: SocketAddr,
    /// Overrides the port of `--bind`
    #[clap(long, env = "PORT")]
    port: Option<u16>,
    /// Serve Prometheus metrics on this address
    #[clap(long, env = "MAILSMITH_METRICS_BIND")]
    metrics: Option<SocketAddr>,

    #[clap(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    google_api_key: Option<String>,
    #[clap(long, env = "GEMINI_MODEL", default_value = mailsmith_gemini::DEFAULT_MODEL)]
    gemini_model: String,
    #[clap(long, env = "GEMINI_BASE_URL", default_value = mailsmith_gemini::DEFAULT_BASE_URL)]
    gemini_base_url: Url,
    #[clap(long, env = "MAILSMITH_BODY_FILTER", value_enum, default_value_t = BodyFilter::FirstLine)]
    body_filter: BodyFilter,

    #[clap(long, env = "BREVO_API_KEY", hide_env_values = true)]
    brevo_api_key: Option<String>,
    #[clap(long, env = "BREVO_BASE_URL", default_value = mailsmith_brevo::DEFAULT_BASE_URL)]
    brevo_base_url: Url,
    #[clap(long, env = "BREVO_SENDER_EMAIL")]
    sender_email: Option<String>,
    #[clap(long, env = "BREVO_SENDER_NAME", default_value = DEFAULT_SENDER_NAME)]
    sender_name: String,
    /// Validate and log emails instead of sending them
    #[clap(long, env = "EMAIL_DRY_RUN", default_value = "false", action = clap::ArgAction::Set, value_parser = parse_dry_run)]
    dry_run: bool,

    /// Timeout for outbound HTTP calls, in seconds
    #[clap(long, env = "MAILSMITH_HTTP_TIMEOUT", default_value_t = 30)]
    http_timeout: u64,
}

/// Every variable `Args` reads.
const ENV_VARS: &[&str] = &[
    "MAILSMITH_BIND",
    "PORT",
    "MAILSMITH_METRICS_BIND",
    "GOOGLE_API_KEY",
    "GEMINI_MODEL",
    "GEMINI_BASE_URL",
    "MAILSMITH_BODY_FILTER",
    "BREVO_API_KEY",
    "BREVO_BASE_URL",
    "BREVO_SENDER_EMAIL",
    "BREVO_SENDER_NAME",
    "EMAIL_DRY_RUN",
    "MAILSMITH_HTTP_TIMEOUT",
];

/// Blank variables (placeholder lines in `.env`) count as unset, so defaults apply.
fn clear_blank_env() {
    for name in ENV_VARS {
        if std::env::var(name).is_ok_and(|value| value.trim().is_empty()) {
            std::env::remove_var(name);
        }
    }
}

fn parse_dry_run(value: &str) -> Result<bool, String> {
    Ok(parse_flag(value))
}

fn api_key(value: Option<&str>) -> Option<ApiKey> {
    value.and_then(|key| key.parse().ok())
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "mailsmith_app=info,mailsmith_core=info,warn");
    }

    clear_blank_env();
    let mut args = Args::parse();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    if let Some(port) = args.port {
        args.bind.set_port(port);
    }

    let generation_config = GenerationConfig {
        credential: api_key(args.google_api_key.as_deref()),
    };
    let dispatch_config = DispatchConfig {
        dry_run: args.dry_run,
        sender: SenderIdentity {
            name: args.sender_name.clone(),
            email: args.sender_email.clone().filter(|email| !email.trim().is_empty()),
        },
        credential: api_key(args.brevo_api_key.as_deref()),
    };
    debug!("Generation config: {:?}", generation_config);
    debug!("Dispatch config: {:?}", dispatch_config);

    if generation_config.credential.is_none() {
        warn!("GOOGLE_API_KEY is not set. /generate-email will return a 500 until configured.");
    }
    if dispatch_config.dry_run {
        info!("EMAIL_DRY_RUN is enabled: emails are validated and logged, never sent");
    } else {
        if dispatch_config.credential.is_none() {
            warn!("BREVO_API_KEY is not set. Only dry-run requests to /send-email will succeed.");
        }
        if dispatch_config.sender.email.is_none() {
            warn!("BREVO_SENDER_EMAIL is not set. Only dry-run requests to /send-email will succeed.");
        }
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.http_timeout))
        .build()
        .expect("failed to build HTTP client");

    let mut metrics_layer = None;
    let recorder: Arc<dyn Recorder> = match args.metrics {
        Some(bind) => {
            let (layer, handle) = PrometheusMetricLayer::pair();
            info!("Starting metrics server on {}", bind);
            http::metrics::start(bind, handle).await;
            metrics_layer = Some(layer);
            Arc::new(MetricsRecorder::new())
        }
        None => Arc::new(BaseRecorder::new()),
    };

    let generator = GeminiGenerator::new(client.clone())
        .with_base_url(args.gemini_base_url)
        .with_model(args.gemini_model);
    let generator = ContentGenerator::new(generation_config, Arc::new(generator))
        .with_sanitizer(BodySanitizer::new(args.body_filter.rule()));

    let provider = BrevoTransport::new(client).with_base_url(args.brevo_base_url);
    let dispatcher = DispatchPolicy::new(dispatch_config, Arc::new(provider), recorder);

    info!("Starting HTTP server on {}", args.bind);
    let ext = HttpExtensions {
        generator: Arc::new(generator),
        dispatcher: Arc::new(dispatcher),
    };
    let server = http::start(args.bind, ext, metrics_layer, shutdown_signal()).await;
    let _ = server.await;
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down, waiting for in-flight requests");
}
