mod api;
mod identity;
mod repl;
mod terminal;

use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::{Map, Value};
use widget::controller::Widget;
use widget::error::WidgetError;
use widget::net::WidgetApi;
use widget::session::{SessionId, now_ms};

use crate::api::HttpApi;
use crate::identity::FileIdentity;
use crate::terminal::TerminalView;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing admin token; pass --admin-token or set ADMIN_TOKEN")]
    MissingAdminToken,
    #[error("no identity file location; pass --identity-file")]
    NoIdentityPath,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("server returned HTTP {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    Widget(#[from] WidgetError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "chatbot-cli", about = "Chatbot server client: terminal chat and admin commands")]
struct Cli {
    #[arg(long, env = "CHATBOT_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,

    /// Request timeout in seconds. Chat only bounds the connection attempt.
    #[arg(long, env = "CHATBOT_TIMEOUT_SECS", default_value_t = 90)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
    admin_token: Option<String>,
    timeout: Duration,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the server is up.
    Ping,
    /// Print the widget configuration.
    Config,
    /// Chat with the bot as a site visitor.
    Chat(ChatArgs),
    Admin(AdminCommand),
}

#[derive(Args, Debug)]
struct ChatArgs {
    /// Where the remembered contact details live.
    #[arg(long, env = "CHATBOT_IDENTITY_FILE")]
    identity_file: Option<PathBuf>,

    /// Forget remembered contact details before starting.
    #[arg(long, default_value_t = false)]
    forget: bool,

    /// Page URL reported with the lead.
    #[arg(long, default_value = "cli://terminal")]
    page_url: String,
}

#[derive(Args, Debug)]
struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminSubcommand {
    Settings(SettingsCommand),
    Leads(LeadsCommand),
}

#[derive(Args, Debug)]
struct SettingsCommand {
    #[command(subcommand)]
    command: SettingsSubcommand,
}

#[derive(Subcommand, Debug)]
enum SettingsSubcommand {
    Get,
    Set { key: String, value: String },
}

#[derive(Args, Debug)]
struct LeadsCommand {
    #[command(subcommand)]
    command: LeadsSubcommand,
}

#[derive(Subcommand, Debug)]
enum LeadsSubcommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        per_page: u32,
    },
    Show {
        id: i64,
    },
    Delete {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ctx = CliContext {
        base_url: cli.base_url,
        admin_token: cli.admin_token,
        timeout: Duration::from_secs(cli.timeout_secs),
    };

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Config => run_config(&ctx).await,
        Command::Chat(args) => run_chat(&ctx, args).await,
        Command::Admin(admin) => run_admin(&ctx, admin).await,
    }
}

async fn run_ping(cli: &CliContext) -> Result<(), CliError> {
    let client = reqwest::Client::builder().timeout(cli.timeout).build()?;
    let url = format!("{}/healthz", cli.base_url.trim_end_matches('/'));
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: "health check failed".to_owned() });
    }
    println!("ok");
    Ok(())
}

async fn run_config(cli: &CliContext) -> Result<(), CliError> {
    let api = HttpApi::new(&cli.base_url, cli.timeout)?;
    let config = api.fetch_config().await?;
    print_json(&serde_json::to_value(&config)?)
}

async fn run_chat(cli: &CliContext, args: ChatArgs) -> Result<(), CliError> {
    let path = args.identity_file.or_else(identity::default_path).ok_or(CliError::NoIdentityPath)?;
    let identity = FileIdentity::new(path);
    if args.forget {
        identity.forget()?;
        eprintln!("forgot contact details in {}", identity.path().display());
    }

    let api = HttpApi::new(&cli.base_url, cli.timeout)?;
    let view = Rc::new(TerminalView::new(io::stdout()));
    let session = SessionId::from_parts(now_ms(), rand::random());
    let widget = Widget::new(api, identity, view.clone(), session, &args.page_url);

    widget.init().await;
    widget.open();
    repl::run(&widget, &view, tokio::io::BufReader::new(tokio::io::stdin())).await?;
    widget.teardown();
    Ok(())
}

async fn run_admin(cli: &CliContext, admin: AdminCommand) -> Result<(), CliError> {
    let (method, path, body) = match admin.command {
        AdminSubcommand::Settings(settings) => match settings.command {
            SettingsSubcommand::Get => (reqwest::Method::GET, "/api/admin/settings".to_owned(), None),
            SettingsSubcommand::Set { key, value } => {
                let mut body = Map::new();
                body.insert(key, Value::String(value));
                (reqwest::Method::PUT, "/api/admin/settings".to_owned(), Some(Value::Object(body)))
            }
        },
        AdminSubcommand::Leads(leads) => match leads.command {
            LeadsSubcommand::List { page, per_page } => {
                (reqwest::Method::GET, format!("/api/admin/leads?page={page}&per_page={per_page}"), None)
            }
            LeadsSubcommand::Show { id } => (reqwest::Method::GET, format!("/api/admin/leads/{id}"), None),
            LeadsSubcommand::Delete { id } => (reqwest::Method::DELETE, format!("/api/admin/leads/{id}"), None),
        },
    };

    let json = admin_request(cli, method, &path, body).await?;
    if json.is_null() {
        println!("ok");
        return Ok(());
    }
    print_json(&json)
}

async fn admin_request(
    cli: &CliContext,
    method: reqwest::Method,
    path: &str,
    body: Option<Value>,
) -> Result<Value, CliError> {
    let token = cli.admin_token.as_deref().ok_or(CliError::MissingAdminToken)?;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);

    let client = reqwest::Client::builder().default_headers(headers).timeout(cli.timeout).build()?;
    let url = format!("{}{}", cli.base_url.trim_end_matches('/'), path);

    let request = client.request(method, &url);
    let request = if let Some(json) = body { request.json(&json) } else { request };

    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;
    let value = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);

    if !status.is_success() {
        let message = value.get("error").and_then(Value::as_str).map_or_else(|| text.clone(), ToOwned::to_owned);
        return Err(CliError::ServerError { status: status.as_u16(), message });
    }

    Ok(value)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
