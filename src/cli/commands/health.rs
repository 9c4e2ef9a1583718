use std::time::Duration;

use anyhow::Context;
use serde_json::Value;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config;

pub async fn handle(url: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let base = url.unwrap_or_else(|| format!("http://localhost:{}", config::config().api.port));
    let endpoint = format!("{}/v1/healthcheck", base.trim_end_matches('/'));

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    let response = client
        .get(&endpoint)
        .send()
        .await
        .with_context(|| format!("failed to reach {}", endpoint))?;

    let status = response.status();
    let body: Value = response.json().await.context("healthcheck returned non-JSON body")?;

    if status.is_success() {
        output_success(output_format, &format!("{} is healthy", base), body.get("data").cloned())
    } else {
        output_error(
            output_format,
            &format!("{} responded {}", base, status),
            body.get("error").and_then(Value::as_str),
        )?;
        anyhow::bail!("server unhealthy")
    }
}
