use anyhow::{Context, Result};
use dinescrape::{
    cli::{Cli, Commands},
    client::Client,
    config::DiningLocation,
    run::Runner,
};
use std::io::{self, Write};
use tracing::debug;

#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

// Pages are scraped strictly one after the other, so there's no need for more than one thread
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // a missing .env file is fine
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();
    cli.init_logger()?;
    debug!(build = %dinescrape::build_info(), "Starting...");

    let json = match &cli.command {
        Commands::Locations => serde_json::to_string(&DiningLocation::defaults())?,
        cmd => {
            let client =
                Client::build(cli.http.client_opts()).context("failed to build HTTP client")?;
            let runner = Runner::new(client, cmd.menu_config(), cmd.schedule_config());
            match cmd {
                Commands::Menus { .. } => serde_json::to_string(&runner.menus().await)?,
                _ => serde_json::to_string(&runner.schedule().await?)?,
            }
        }
    };

    let mut out = io::stdout().lock();
    writeln!(out, "{json}")?;
    out.flush()?;
    Ok(())
}
