use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::{utils, OutputFormat};
use crate::config::config;
use crate::types::Role;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Role claim: ADMIN, EMPLOYEE, TEAM_LEAD or MANAGER")]
    pub role: Role,

    #[arg(long, default_value = "cli", help = "Subject (principal id)")]
    pub subject: String,

    #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config().security;
    let hours = args.hours.unwrap_or(security.jwt_expiry_hours);
    let claims = Claims::new(&args.subject, args.role, hours).context("invalid token lifetime")?;

    let token = generate_jwt(&claims, &security.jwt_secret).context("JWT_SECRET must be set to mint tokens")?;

    match output_format {
        OutputFormat::Json => utils::output_success(
            &output_format,
            "Token issued",
            Some(json!({ "token": token, "role": args.role, "subject": args.subject, "expires_at": claims.exp })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
