//! CLI handlers for API reads, raw requests and the failure log.

use serde_json::Value;

use crate::audit::AuditLog;
use crate::cli::{build_client, option_store, LogArgs, PostsArgs, RequestArgs};
use crate::config::KitConfig;

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Handle `kit account`.
pub async fn handle_account() -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client(option_store())?;
    print_json(&client.get_account().await?)
}

/// Handle `kit posts`.
pub async fn handle_posts(args: &PostsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client(option_store())?;
    let posts = if args.all {
        client.get_all_posts(args.per_page).await?
    } else {
        let page = client.get_posts(args.page, args.per_page).await?;
        eprintln!("page {} of {}", page.page, page.total_pages);
        page.posts
    };
    print_json(&Value::Array(posts))
}

/// Handle `kit products`.
pub async fn handle_products() -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client(option_store())?;
    print_json(&client.get_products().await?)
}

/// Handle `kit request <method> <endpoint>`.
pub async fn handle_request(args: &RequestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let params = match serde_json::from_str::<Value>(&args.params)? {
        Value::Object(map) => map,
        _ => return Err("--params must be a JSON object".into()),
    };
    let client = build_client(option_store())?;
    let response = client
        .request_with_options(&args.endpoint, &args.method, params, !args.no_retry)
        .await?;
    print_json(&response)
}

/// Handle `kit log`.
pub async fn handle_log(args: &LogArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = KitConfig::from_env()?;
    let log = AuditLog::new(config.log_dir.unwrap_or_else(KitConfig::default_data_dir))?;
    if args.clear {
        log.clear()?;
        println!("✅ Cleared {}", log.path().display());
    } else {
        print!("{}", log.read(args.lines)?);
    }
    Ok(())
}
