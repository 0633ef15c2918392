//! `docbin` CLI: command-line client for a `docbin` server.
//!
//! A standalone HTTP client that talks to the v2 document API. No internal
//! crate dependencies.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::Value;

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

// ── CLI structure ────────────────────────────────────────────────────

/// docbin: share text documents from the terminal.
#[derive(Parser)]
#[command(
    name = "docbin",
    version,
    about = "docbin CLI: publish, read, edit, and remove documents",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         DOCBIN_ADDR   Server address (default: http://127.0.0.1:8080)\n\n\
         {DIM}Examples:{RESET}\n  \
         docbin publish notes.txt --lifetime 3600\n  \
         echo 'hello' | docbin publish --password hunter2\n  \
         docbin get aB3_xY9z --raw\n  \
         docbin rm aB3_xY9z --secret abcde-fghij-klmno-pqrst"
    ),
)]
struct Cli {
    /// docbin server address.
    #[arg(long, env = "DOCBIN_ADDR", default_value = "http://127.0.0.1:8080")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a document from a file or stdin.
    Publish {
        /// File to publish (reads stdin when omitted).
        file: Option<PathBuf>,
        /// Custom document name.
        #[arg(long)]
        key: Option<String>,
        /// Length of the generated document name.
        #[arg(long)]
        key_length: Option<usize>,
        /// Custom write secret (generated when omitted).
        #[arg(long)]
        secret: Option<String>,
        /// Protect and encrypt the document with a password.
        #[arg(long)]
        password: Option<String>,
        /// Seconds until the document expires.
        #[arg(long)]
        lifetime: Option<u64>,
    },
    /// Print a document.
    Get {
        /// Document name.
        name: String,
        /// Password for protected documents.
        #[arg(long)]
        password: Option<String>,
        /// Print only the document bytes.
        #[arg(long)]
        raw: bool,
    },
    /// Replace a document's content from a file or stdin.
    Edit {
        /// Document name.
        name: String,
        /// File with the new content (reads stdin when omitted).
        file: Option<PathBuf>,
        /// Write secret returned at publish.
        #[arg(long)]
        secret: String,
        /// Password for protected documents.
        #[arg(long)]
        password: Option<String>,
    },
    /// Check whether a document exists.
    Exists {
        /// Document name.
        name: String,
    },
    /// Remove a document.
    Rm {
        /// Document name.
        name: String,
        /// Write secret returned at publish.
        #[arg(long)]
        secret: String,
    },
}

// ── Pretty output helpers ────────────────────────────────────────────

fn header(icon: &str, title: &str) {
    println!("{BOLD}{CYAN}{icon} {title}{RESET}");
    println!("{DIM}─────────────────────────────────────────{RESET}");
}

fn kv_line(key: &str, value: &str) {
    println!("  {DIM}{key:<12}{RESET} {WHITE}{value}{RESET}");
}

fn success(msg: &str) {
    println!("{GREEN}{BOLD}✓{RESET} {msg}");
}

fn warning(msg: &str) {
    println!("{YELLOW}{BOLD}⚠{RESET} {YELLOW}{msg}{RESET}");
}

fn str_field<'a>(value: &'a Value, field: &str) -> &'a str {
    value.get(field).and_then(Value::as_str).unwrap_or("-")
}

// ── HTTP client ──────────────────────────────────────────────────────

struct Client {
    http: reqwest::Client,
    addr: String,
}

/// Error body returned by the server.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl Client {
    fn new(addr: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            addr: addr.trim_end_matches('/').to_owned(),
        }
    }

    fn document_url(&self, suffix: &str) -> String {
        format!("{}/api/v2/documents{suffix}", self.addr)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let resp = request
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.addr))?;
        check_status(resp).await
    }
}

/// Turn non-success responses into errors carrying the server's code.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.context("failed to read response body")?;
    if let Ok(err) = serde_json::from_str::<ErrorBody>(&body) {
        bail!("{} ({status}): {}", err.error, err.message);
    }
    bail!("server returned {status}: {body}");
}

async fn handle_response(resp: reqwest::Response) -> Result<Value> {
    let body = resp.text().await.context("failed to read response body")?;
    serde_json::from_str(&body).context("failed to parse response JSON")
}

fn with_header(
    request: reqwest::RequestBuilder,
    name: &str,
    value: Option<impl ToString>,
) -> reqwest::RequestBuilder {
    match value {
        Some(value) => request.header(name, value.to_string()),
        None => request,
    }
}

/// Read a file, or stdin when no file is given.
fn read_input(file: Option<&Path>) -> Result<Vec<u8>> {
    match file {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

// ── Command dispatch ─────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let client = Client::new(&cli.addr);

    match run(client, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{RED}{BOLD}✗ Error:{RESET} {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: Client, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Publish {
            file,
            key,
            key_length,
            secret,
            password,
            lifetime,
        } => {
            let body = read_input(file.as_deref())?;
            let mut request = client.http.post(client.document_url("")).body(body);
            request = with_header(request, "key", key);
            request = with_header(request, "keyLength", key_length);
            request = with_header(request, "secret", secret);
            request = with_header(request, "password", password);
            request = with_header(request, "lifetime", lifetime);
            cmd_publish(&client, request).await
        }
        Commands::Get {
            name,
            password,
            raw,
        } => cmd_get(&client, &name, password.as_deref(), raw).await,
        Commands::Edit {
            name,
            file,
            secret,
            password,
        } => {
            let body = read_input(file.as_deref())?;
            cmd_edit(&client, &name, body, &secret, password.as_deref()).await
        }
        Commands::Exists { name } => cmd_exists(&client, &name).await,
        Commands::Rm { name, secret } => cmd_rm(&client, &name, &secret).await,
    }
}

// ── Commands ─────────────────────────────────────────────────────────

async fn cmd_publish(client: &Client, request: reqwest::RequestBuilder) -> Result<()> {
    let resp = handle_response(client.send(request).await?).await?;

    header("📄", "Document published");
    kv_line("Key", str_field(&resp, "key"));
    kv_line("Secret", str_field(&resp, "secret"));
    if let Some(url) = resp.get("url").and_then(Value::as_str) {
        kv_line("URL", url);
    }
    if let Some(ts) = resp.get("expirationTimestamp").and_then(Value::as_i64) {
        kv_line("Expires", &ts.to_string());
    }
    println!();
    warning("Keep the secret: it is required to edit or remove the document.");
    Ok(())
}

async fn cmd_get(client: &Client, name: &str, password: Option<&str>, raw: bool) -> Result<()> {
    let suffix = if raw {
        format!("/{name}/raw")
    } else {
        format!("/{name}")
    };
    let request = client.http.get(client.document_url(&suffix));
    let request = with_header(request, "password", password);
    let resp = client.send(request).await?;

    if raw {
        let bytes = resp.bytes().await.context("failed to read response body")?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&bytes).context("failed to write stdout")?;
        stdout.flush().context("failed to write stdout")?;
        return Ok(());
    }

    let resp = handle_response(resp).await?;
    header("📄", str_field(&resp, "key"));
    if let Some(ts) = resp.get("expirationTimestamp").and_then(Value::as_i64) {
        kv_line("Expires", &ts.to_string());
    }
    println!("{}", str_field(&resp, "data"));
    Ok(())
}

async fn cmd_edit(
    client: &Client,
    name: &str,
    body: Vec<u8>,
    secret: &str,
    password: Option<&str>,
) -> Result<()> {
    let request = client
        .http
        .patch(client.document_url(&format!("/{name}")))
        .header("secret", secret)
        .body(body);
    let request = with_header(request, "password", password);
    let resp = handle_response(client.send(request).await?).await?;

    if resp.get("edited").and_then(Value::as_bool) == Some(true) {
        success(&format!("Document {name} updated"));
        Ok(())
    } else {
        bail!("document {name} was not updated");
    }
}

async fn cmd_exists(client: &Client, name: &str) -> Result<()> {
    let request = client.http.get(client.document_url(&format!("/{name}/exists")));
    let resp = handle_response(client.send(request).await?).await?;
    println!("{}", resp.as_bool().unwrap_or(false));
    Ok(())
}

async fn cmd_rm(client: &Client, name: &str, secret: &str) -> Result<()> {
    let request = client
        .http
        .delete(client.document_url(&format!("/{name}")))
        .header("secret", secret);
    let resp = handle_response(client.send(request).await?).await?;

    if resp.get("removed").and_then(Value::as_bool) == Some(true) {
        success(&format!("Document {name} removed"));
        Ok(())
    } else {
        bail!("document {name} could not be removed");
    }
}
