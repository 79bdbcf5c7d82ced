//! CLI handlers for the OAuth flow and stored tokens.

use std::io::Write;

use crate::audit::mask_string;
use crate::auth::events::{ACCESS_TOKEN_OPTION, REFRESH_TOKEN_OPTION, TOKEN_EXPIRES_OPTION};
use crate::auth::{AuthorizeOptions, OptionStore};
use crate::cli::{build_client, option_store, AuthorizeArgs};

fn authorize_options(args: &AuthorizeArgs) -> AuthorizeOptions {
    AuthorizeOptions {
        return_to: args.return_to.clone(),
        tenant_name: args.tenant.clone(),
    }
}

/// Handle `kit auth url`.
pub async fn handle_url(args: &AuthorizeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client(option_store())?;
    println!("{}", client.oauth_url(&authorize_options(args))?);
    Ok(())
}

/// Handle `kit auth login`.
pub async fn handle_login(args: &AuthorizeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client(option_store())?;
    println!("🔗 Visit: {}", client.oauth_url(&authorize_options(args))?);
    println!("📋 After authorizing, paste the `code` parameter from the redirect below:");
    print!("> ");
    std::io::stdout().flush()?;

    let mut code = String::new();
    std::io::stdin().read_line(&mut code)?;
    let code = code.trim();
    if code.is_empty() {
        return Err("no code provided".into());
    }

    client.get_access_token(code).await?;
    println!("✅ Kit login successful!");
    Ok(())
}

/// Handle `kit auth exchange <code>`.
pub async fn handle_exchange(code: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client(option_store())?;
    let tokens = client.get_access_token(code).await?;
    println!("✅ Tokens stored (access token {})", mask_string(&tokens.access_token));
    Ok(())
}

/// Handle `kit auth refresh`.
pub async fn handle_refresh() -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client(option_store())?;
    let tokens = client.refresh_token().await?;
    match tokens.expires_at() {
        Some(expires) => println!("✅ Refreshed (expires {})", expires.format("%Y-%m-%d %H:%M")),
        None => println!("✅ Refreshed"),
    }
    Ok(())
}

/// Handle `kit auth status`.
pub async fn handle_status() -> Result<(), Box<dyn std::error::Error>> {
    let store = option_store();
    println!("🔐 Kit credentials ({})\n", store.path().display());

    for (name, key) in [("Access token", ACCESS_TOKEN_OPTION), ("Refresh token", REFRESH_TOKEN_OPTION)] {
        match store.get(key)? {
            Some(value) => println!("  {name}: ✅ {}", mask_string(&value)),
            None => println!("  {name}: ❌ Not stored"),
        }
    }
    if let Some(expires) = store
        .get(TOKEN_EXPIRES_OPTION)?
        .and_then(|raw| raw.parse::<i64>().ok())
        .and_then(|secs| chrono::DateTime::<chrono::Utc>::from_timestamp(secs, 0))
    {
        let state = if expires > chrono::Utc::now() { "valid until" } else { "expired at" };
        println!("  Expiry: {state} {}", expires.format("%Y-%m-%d %H:%M"));
    }

    println!("\n📌 Environment Variables:");
    for key in ["KIT_CLIENT_ID", "KIT_REDIRECT_URI"] {
        let status = if std::env::var(key).is_ok() { "✅ Set" } else { "❌ Not set" };
        println!("  {key}: {status}");
    }
    Ok(())
}

/// Handle `kit auth logout`.
pub async fn handle_logout() -> Result<(), Box<dyn std::error::Error>> {
    let store = option_store();
    for key in [ACCESS_TOKEN_OPTION, REFRESH_TOKEN_OPTION, TOKEN_EXPIRES_OPTION] {
        store.delete(key)?;
    }
    println!("✅ Stored tokens removed");
    Ok(())
}
