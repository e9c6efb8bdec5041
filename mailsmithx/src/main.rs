mod client;

use crate::client::{MailsmithClient, SendPayload};
use clap::{Parser, Subcommand};
use mailsmith_core::generator::MAX_SUBJECT_WORDS;
use mailsmith_core::recipient::{RecipientEntry, RecipientsInput};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

#[derive(Parser, Debug)]
struct Cli {
    /// Base URL of the Mailsmith server
    #[arg(long, env = "MAILSMITH_SERVER", default_value = "http://localhost:6000/")]
    server: Url,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Draft a subject and a body from a description
    Generate {
        /// What the email should say
        prompt: String,
    },
    /// Send an email through the server
    Send {
        /// Recipient address(es), comma-separated
        #[arg(short, long)]
        to: String,
        #[arg(short, long)]
        subject: String,
        /// Body text
        #[arg(short, long, conflicts_with = "body_file")]
        body: Option<String>,
        /// Read the body from a file
        #[arg(long)]
        body_file: Option<PathBuf>,
        /// Validate and log on the server instead of sending
        #[arg(long)]
        dry_run: bool,
    },
}

fn subject_word_count(subject: &str) -> usize {
    subject.split_whitespace().count()
}

fn recipients(to: &str) -> Vec<RecipientEntry> {
    RecipientsInput::from(to).normalize()
}

fn read_body(body: Option<String>, body_file: Option<PathBuf>) -> Result<String, String> {
    let body = match (body, body_file) {
        (Some(body), _) => body,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?,
        (None, None) => String::new(),
    };
    if body.trim().is_empty() {
        return Err("body is required".to_string());
    }
    Ok(body)
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "mailsmithx=info,warn");
    }

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    debug!("Using server {}", cli.server);
    let client = MailsmithClient::new(reqwest::Client::new(), cli.server);

    match cli.command {
        Command::Generate { prompt } => match client.generate(&prompt).await {
            Ok(email) => {
                if subject_word_count(&email.subject) > MAX_SUBJECT_WORDS {
                    warn!(
                        "Subject is longer than {MAX_SUBJECT_WORDS} words, consider shortening it"
                    );
                }
                println!("Subject: {}\n\n{}", email.subject, email.body);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Generation failed: {e}");
                ExitCode::FAILURE
            }
        },
        Command::Send {
            to,
            subject,
            body,
            body_file,
            dry_run,
        } => {
            let recipients = recipients(&to);
            if recipients.is_empty() {
                eprintln!("No valid recipient emails provided");
                return ExitCode::FAILURE;
            }
            if subject.trim().is_empty() {
                eprintln!("subject is required");
                return ExitCode::FAILURE;
            }
            let body = match read_body(body, body_file) {
                Ok(body) => body,
                Err(e) => {
                    eprintln!("{e}");
                    return ExitCode::FAILURE;
                }
            };

            let payload = SendPayload {
                recipients,
                subject,
                body,
                dry_run,
            };
            match client.send(&payload).await {
                Ok(reply) => {
                    println!("{}", reply.message);
                    if let Some(id) = reply.brevo_message_id {
                        println!("Message ID: {id}");
                    }
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Send failed: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
