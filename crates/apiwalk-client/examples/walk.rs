//! Lists the operations of an API and optionally reads one path.
//!
//! ```text
//! cargo run --example walk -- https://petstore3.swagger.io/api/v3/openapi.json pet/findByStatus
//! ```
//!
//! `APIWALK_BASE_URL`, `APIWALK_TOKEN`, `APIWALK_STORAGE_KEY` and
//! `APIWALK_TIMEOUT_SECS` are honored.

use anyhow::{bail, Context, Result};
use apiwalk_client::{ApiClient, ClientConfig, Outcome};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let mut args = std::env::args().skip(1);
    let Some(openapi_url) = args.next() else {
        bail!("usage: walk <openapi-url> [path]");
    };

    let client = ApiClient::builder(openapi_url.as_str())
        .config(ClientConfig::from_env())
        .build()
        .await
        .with_context(|| format!("failed to load {openapi_url}"))?;

    let spec = client.specification();
    info!(
        "{} {} at {}",
        spec.title().unwrap_or("untitled"),
        spec.version().unwrap_or("?"),
        client.base_url()
    );
    for template in spec.templates() {
        for verb in template.verbs() {
            let summary = template
                .operation(verb)
                .and_then(|op| op.summary.as_deref().or(op.operation_id.as_deref()))
                .unwrap_or("");
            println!("{:<7} {:<40} {}", verb, template.as_str(), summary);
        }
    }

    let Some(path) = args.next() else {
        return Ok(());
    };

    match client.resolve(&path).get(None).await? {
        Outcome::Success(resource) => {
            println!("{}", serde_json::to_string_pretty(&resource.snapshot())?);
        },
        Outcome::ServerError(failure) => {
            bail!("{failure}: {}", failure.error);
        },
    }
    Ok(())
}
