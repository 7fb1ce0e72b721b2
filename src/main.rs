//! KidCal
//!
//! An MCP server for pediatric kidney function (eGFR) calculation.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use kidcal::build_info;
use kidcal::config::CalculatorConfig;
use kidcal::mcp::KidcalService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("kidcal=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();

    let config = CalculatorConfig::from_env();
    tracing::info!(
        "Display mode: {}, input layout: {}",
        config.display_mode.as_str(),
        config.input_layout.as_str()
    );

    let service = KidcalService::new(config);

    let transport = (stdin(), stdout());

    tracing::info!("Starting MCP server on stdio");
    let server = service.serve(transport).await?;

    server.waiting().await?;

    Ok(())
}
