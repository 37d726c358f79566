use std::env;

use anyhow::bail;
use tracing::{info, warn};

use questline_core::auth::TokenVerifier;
use questline_utils::parse::parse_flag;

pub fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => parse_flag(&value),
        Err(_) => default,
    }
}

pub fn env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(value) => value.trim().parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}

pub fn token_verifier_from_env() -> anyhow::Result<TokenVerifier> {
    let mode = env::var("AUTH_MODE").ok();
    let secret = env::var("AUTH_SECRET").ok();
    token_verifier(mode.as_deref(), secret.as_deref())
}

/// `AUTH_MODE` is `signed` (the default) or `raw`. Signed mode needs a non-empty secret.
fn token_verifier(mode: Option<&str>, secret: Option<&str>) -> anyhow::Result<TokenVerifier> {
    let mode = mode.map(|mode| mode.trim().to_ascii_lowercase());

    match mode.as_deref().unwrap_or("signed") {
        "signed" => {
            let Some(secret) = secret.filter(|secret| !secret.trim().is_empty()) else {
                bail!("AUTH_SECRET must be set when AUTH_MODE=signed");
            };
            info!("Signed bearer tokens enabled.");
            Ok(TokenVerifier::signed(secret))
        }
        "raw" => {
            warn!("AUTH_MODE=raw: bearer tokens are trusted as uids without verification. Do not use in production.");
            Ok(TokenVerifier::raw())
        }
        other => bail!("unknown AUTH_MODE `{other}` (expected `signed` or `raw`)"),
    }
}
