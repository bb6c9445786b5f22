//! # ERP Dashboard
//!
//! Runs the department list screen from the command line:
//!
//! 1.  Loads [`AppConfig`] from the environment and starts the [`DashboardSystem`].
//! 2.  Signs in with a role and mounts the departments page.
//! 3.  Prints the first page, moves to the next one and searches.
//! 4.  Shuts every actor down.
//!
//! Without `API_BASE_URL` the bundled sample data is served from memory.
//!
//! ```bash
//! RUST_LOG=info cargo run -p erp-dashboard
//! API_BASE_URL=http://localhost:3000/api API_TOKEN=... cargo run -p erp-dashboard
//! ```

use erp_dashboard::config::AppConfig;
use erp_dashboard::lifecycle::DashboardSystem;
use query_framework::setup_tracing;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let config = AppConfig::init()?;
    let system = DashboardSystem::new(config.transport()?, config.channel_buffer());

    let span = tracing::info_span!("sign_in");
    let auth = async {
        system
            .role_client
            .sign_in_as("admin", "Administrator")
            .await
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("departments_page");
    async {
        let mut page = system.departments_page(auth, config.page_size()).await?;
        page.wait_until_settled().await?;
        println!("{}\n", page.render());

        page.next_page().await?;
        page.wait_until_settled().await?;
        println!("{}\n", page.render());

        page.search_for("sales").await?;
        page.wait_until_settled().await?;
        println!("{}\n", page.render());

        for notice in page.take_notices() {
            info!(level = ?notice.level, message = %notice.message, "Notice");
        }
        anyhow::Ok(())
    }
    .instrument(span)
    .await?;

    system.shutdown().await.map_err(anyhow::Error::msg)?;
    info!("Application completed successfully");
    Ok(())
}
