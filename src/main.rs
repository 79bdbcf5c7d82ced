//! Kit CLI binary entry point.

use clap::Parser;
use kit_api::cli::{AuthCommands, Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Auth(auth_args) => match auth_args.command {
            AuthCommands::Login(args) => kit_api::cli::auth::handle_login(&args).await,
            AuthCommands::Url(args) => kit_api::cli::auth::handle_url(&args).await,
            AuthCommands::Exchange(args) => kit_api::cli::auth::handle_exchange(&args.code).await,
            AuthCommands::Refresh => kit_api::cli::auth::handle_refresh().await,
            AuthCommands::Status => kit_api::cli::auth::handle_status().await,
            AuthCommands::Logout => kit_api::cli::auth::handle_logout().await,
        },
        Commands::Account => kit_api::cli::api::handle_account().await,
        Commands::Posts(args) => kit_api::cli::api::handle_posts(&args).await,
        Commands::Products => kit_api::cli::api::handle_products().await,
        Commands::Request(args) => kit_api::cli::api::handle_request(&args).await,
        Commands::Log(args) => kit_api::cli::api::handle_log(&args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
