use anyhow::Context;
use chrono::{Duration, Utc};
use clap::Subcommand;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a bearer token for a user with the configured JWT_SECRET")]
    Issue {
        #[arg(long, help = "User id placed in the token subject")]
        user_id: i64,
        #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        ttl_hours: Option<i64>,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue { user_id, ttl_hours } => {
            let security = &config::config().security;
            let ttl = token_lifetime(ttl_hours.unwrap_or(security.jwt_expiry_hours as i64))?;

            let claims = Claims::new(user_id, ttl);
            let expires = claims.exp;
            let token = generate_jwt(&claims, &security.jwt_secret)
                .context("could not sign token (is JWT_SECRET set?)")?;

            match output_format {
                OutputFormat::Text => println!("{}", token),
                OutputFormat::Json => output_success(
                    output_format,
                    "token issued",
                    Some(json!({ "token": token, "user_id": user_id, "expires": expires })),
                )?,
            }
            Ok(())
        }
    }
}

/// Token lifetime for `ttl_hours`, rejecting values whose expiry is not a
/// representable timestamp
fn token_lifetime(ttl_hours: i64) -> anyhow::Result<Duration> {
    anyhow::ensure!(ttl_hours > 0, "--ttl-hours must be greater than zero");
    let ttl = Duration::try_hours(ttl_hours).context("--ttl-hours is too large")?;
    Utc::now()
        .checked_add_signed(ttl)
        .context("--ttl-hours is too large")?;
    Ok(ttl)
}
