//! Request command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use ledgerdesk_http::{ApiRequest, Method};

use crate::config::Settings;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: String,

    /// API path, e.g. /products
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub data: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", value_parser = parse_query_pair)]
    pub query: Vec<(String, String)>,

    /// Send without the stored session
    #[arg(long)]
    pub anonymous: bool,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

fn parse_query_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

fn parse_method(s: &str) -> Result<Method> {
    let method = s.to_ascii_uppercase();
    match method.as_str() {
        "GET" | "POST" | "PUT" | "PATCH" | "DELETE" | "HEAD" => {
            Method::from_bytes(method.as_bytes()).context("Invalid HTTP method")
        }
        _ => bail!("Unsupported HTTP method: {}", s),
    }
}

fn build_request(args: &RequestArgs) -> Result<ApiRequest> {
    let mut request = ApiRequest::new(parse_method(&args.method)?, args.path.clone());

    for (key, value) in &args.query {
        request = request.query(key.clone(), value.clone());
    }
    if let Some(data) = &args.data {
        let body: serde_json::Value = serde_json::from_str(data).context("--data is not valid JSON")?;
        request = request.json_value(body);
    }
    if args.anonymous {
        request = request.anonymous();
    }

    Ok(request)
}

pub async fn run(args: RequestArgs, settings: &Settings) -> Result<()> {
    let request = build_request(&args)?;
    let store = storage::open_store(settings)?;
    let client = storage::open_client(settings, store)?;

    let response = client.send(&request).await.context("Request failed")?;

    output::response(&response, request.path(), args.compact)
}
