//! sst-request CLI — 发送接口请求、查看配置与请求指纹的命令行工具
//!
//! Usage:
//!   sst-request get <path> [--query k=v]...          Send a GET request
//!   sst-request post <path> [--body <json>]          Send a POST request
//!   sst-request put <path> [--body <json>]           Send a PUT request
//!   sst-request delete <path>                        Send a DELETE request
//!   sst-request fingerprint <method> <path> [...]    Print the de-duplication key
//!   sst-request config                               Print the resolved configuration

use anyhow::{anyhow, bail, Context};
use reqwest::Method;
use sst_request::auth::{EnvToken, NoToken, TokenProvider};
use sst_request::{ApiRequest, ClientConfig, RequestClient};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Options {
    positional: Vec<String>,
    body: Option<serde_json::Value>,
    query: Vec<(String, String)>,
    config_path: Option<String>,
    no_auth: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "get" => cmd_send(Method::GET, &args[2..]).await,
        "post" => cmd_send(Method::POST, &args[2..]).await,
        "put" => cmd_send(Method::PUT, &args[2..]).await,
        "delete" => cmd_send(Method::DELETE, &args[2..]).await,
        "fingerprint" => cmd_fingerprint(&args[2..]),
        "config" => cmd_config(&args[2..]),
        "version" | "--version" | "-V" => {
            println!("sst-request {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"sst-request — 自助终端接口请求工具

USAGE:
    sst-request <COMMAND> [OPTIONS]

COMMANDS:
    get <path>                      Send a GET request
    post <path>                     Send a POST request
    put <path>                      Send a PUT request
    delete <path>                   Send a DELETE request
    fingerprint <method> <path>     Print the de-duplication key of a request
    config                          Print the resolved client configuration
    version                         Show version information
    help                            Show this help message

OPTIONS:
    --body <json>                   JSON request body
    --query <key=value>             Query parameter (repeatable)
    --config <file>                 YAML configuration file
    --no-auth                       Do not attach the bearer token

ENVIRONMENT:
    SST_BASE_URL / BASE_URL         Base URL for relative paths
    SST_HTTP_TIMEOUT_MS             Request timeout in ms (default 10000)
    SST_HTTP_TIMEOUT_SECS           Request timeout in seconds, if _MS is unset
    SST_PROXY_URL                   Proxy for all requests
    SST_HTTP_POOL_MAX_IDLE_PER_HOST Idle connections kept per host (default 32)
    SST_AUTH_TOKEN                  Bearer token
    RUST_LOG                        Log filter (default warn)"#
    );
}

fn parse_options(args: &[String]) -> anyhow::Result<Options> {
    let mut opts = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--body" => {
                let raw = iter.next().ok_or_else(|| anyhow!("--body needs a value"))?;
                let body = serde_json::from_str(raw).context("--body is not valid JSON")?;
                opts.body = Some(body);
            }
            "--query" => {
                let raw = iter.next().ok_or_else(|| anyhow!("--query needs a value"))?;
                let (k, v) = raw
                    .split_once('=')
                    .ok_or_else(|| anyhow!("--query expects key=value, got {raw}"))?;
                opts.query.push((k.to_string(), v.to_string()));
            }
            "--config" => {
                let path = iter.next().ok_or_else(|| anyhow!("--config needs a value"))?;
                opts.config_path = Some(path.clone());
            }
            "--no-auth" => opts.no_auth = true,
            other if other.starts_with("--") => bail!("unknown option {other}"),
            other => opts.positional.push(other.to_string()),
        }
    }
    Ok(opts)
}

fn load_config(opts: &Options) -> anyhow::Result<ClientConfig> {
    let cfg = match &opts.config_path {
        Some(path) => ClientConfig::from_yaml_file(path)
            .with_context(|| format!("loading {path}"))?,
        None => ClientConfig::from_env()?,
    };
    Ok(cfg)
}

fn build_request(method: Method, path: &str, opts: &Options) -> ApiRequest {
    let mut req = ApiRequest::new(method, path);
    if let Some(body) = &opts.body {
        req = req.body(body.clone());
    }
    for (k, v) in &opts.query {
        req = req.query(k.as_str(), v.as_str());
    }
    if opts.no_auth {
        req = req.skip_auth();
    }
    req
}

async fn cmd_send(method: Method, args: &[String]) -> anyhow::Result<()> {
    let opts = parse_options(args)?;
    let path = opts
        .positional
        .first()
        .ok_or_else(|| anyhow!("missing <path>"))?;
    let tokens: Arc<dyn TokenProvider> = if opts.no_auth {
        Arc::new(NoToken)
    } else {
        Arc::new(EnvToken::default())
    };

    let client = RequestClient::builder()
        .config(load_config(&opts)?)
        .token_provider(tokens)
        .build()?;

    match client.execute(build_request(method, path, &opts)).await {
        Ok(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        Err(e) => Err(anyhow!("{} ({})", e.user_message(), e)),
    }
}

fn cmd_fingerprint(args: &[String]) -> anyhow::Result<()> {
    let opts = parse_options(args)?;
    let (method, path) = match opts.positional.as_slice() {
        [m, p, ..] => (m.clone(), p.clone()),
        _ => bail!("usage: fingerprint <method> <path> [--body <json>] [--query k=v]"),
    };
    let method = Method::from_bytes(method.to_uppercase().as_bytes())
        .map_err(|_| anyhow!("invalid method {method}"))?;
    let fp = build_request(method, &path, &opts).fingerprint();
    println!("{}", fp);
    println!("digest: {}", fp.digest());
    Ok(())
}

fn cmd_config(args: &[String]) -> anyhow::Result<()> {
    let opts = parse_options(args)?;
    let cfg = load_config(&opts)?;
    print!("{}", serde_yaml::to_string(&cfg)?);
    Ok(())
}
