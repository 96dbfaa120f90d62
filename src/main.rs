use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use brainstem::atlas::{AtlasClient, ProductCatalog};
use brainstem::console::{self, printer::Printer};
use brainstem::core::config::{self, BrainstemConfig, CliOverrides};
use brainstem::core::context::AppContext;
use brainstem::core::logger::{LogBridge, Logger, LoggerOptions};
use clap::Parser;
use log::{debug, info, warn};

#[derive(Parser)]
#[command(name = "brainstem", about = "Menu-driven Allen Brain Atlas data retrieval")]
struct Args {
    /// Minimum level written to the activity log (DEBUG, INFO, WARNING, ERROR, CRITICAL)
    #[arg(long)]
    log_level: Option<String>,

    /// Directory for the product catalog and exported files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Atlas API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Options per menu page, 0 for no paging
    #[arg(long)]
    page_size: Option<usize>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("Warning: {e}. Using default configuration.");
        BrainstemConfig::default()
    });
    let cli = CliOverrides {
        log_level: args.log_level,
        data_dir: args.data_dir,
        base_url: args.base_url,
        page_size: args.page_size,
    };
    let config = config::resolve(&file_config, &cli)?;

    let logger = Arc::new(Logger::new(LoggerOptions {
        log_file: config.log_file.clone(),
        log_level: config.log_level,
        print_to_console: config.log_to_console,
        create_log_directory: true,
    })?);
    LogBridge::install(logger)?;

    info!("Starting application...");
    debug!("Resolved config: {:?}", config);

    // The menu is synchronous; API calls block on this runtime.
    let runtime = tokio::runtime::Runtime::new()?;
    let client = AtlasClient::new(config.base_url.clone());
    let catalog = runtime
        .block_on(ProductCatalog::load(&config.product_catalog, &client))
        .unwrap_or_else(|e| {
            warn!("Product catalog unavailable: {}", e);
            ProductCatalog::default()
        });

    let mut ctx = AppContext::new(config, client, runtime.handle().clone(), catalog);
    ctx.startup()?;
    console::run(&ctx)?;
    ctx.cleanup()?;

    Printer::stdout().error("Exiting program...")?;
    debug!("Ending application...");
    Ok(())
}
