//! Magento Cegid dashboard module host entry point.

use std::net::SocketAddr;
use std::path::Path;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use magento_cegid_dashboard::api::handlers::DASHBOARD_PATH;
use magento_cegid_dashboard::api::{create_router, AppState};
use magento_cegid_dashboard::config::Config;
use magento_cegid_dashboard::manifest::Manifest;
use magento_cegid_dashboard::metrics;
use magento_cegid_dashboard::registry::{ModuleRegistry, MANIFEST_FILE};
use magento_cegid_dashboard::render::TemplateStore;
use magento_cegid_dashboard::utils::shutdown_signal;

/// Magento Cegid dashboard module host.
#[derive(Parser, Debug)]
#[command(name = "magento-cegid-dashboard")]
#[command(about = "Serves the Magento and Cegid integration dashboard")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port.
    #[arg(short, long, default_value = "8080")]
    port: u16,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the module and serve it over HTTP (default).
    Run {
        /// HTTP server port.
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Check the module descriptor and its declared files.
    CheckManifest,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("magento_cegid_dashboard=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Initialize metrics
    metrics::init_metrics();

    // Handle subcommands
    match args.command {
        Some(Command::CheckManifest) => cmd_check_manifest(),
        Some(Command::Run { port }) => cmd_run(port).await,
        None => cmd_run(args.port).await,
    }
}

/// Check the module descriptor and its declared files.
fn cmd_check_manifest() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("MAGENTO CEGID DASHBOARD - MANIFEST CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    // Read the descriptor
    let root = Path::new(&config.module_root);
    let manifest_path = root.join(MANIFEST_FILE);
    print!("Reading {}... ", manifest_path.display());
    let source = match std::fs::read_to_string(&manifest_path) {
        Ok(s) => {
            println!("OK");
            s
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Manifest read failed"));
        }
    };

    // Parse the descriptor
    print!("Parsing manifest... ");
    let manifest = match Manifest::parse(&source) {
        Ok(m) => {
            println!("OK");
            m
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Manifest parse failed"));
        }
    };

    // Validate the descriptor
    print!("Validating manifest... ");
    match manifest.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Manifest validation failed"));
        }
    }

    // Check every declared file
    print!("Checking declared files... ");
    let mut missing = Vec::new();
    for rel in &manifest.data {
        if !root.join(rel).is_file() {
            missing.push(rel.clone());
        }
    }
    for files in manifest.assets.values() {
        for rel in files {
            if !root.join(rel).is_file() {
                missing.push(rel.clone());
            }
        }
    }
    if missing.is_empty() {
        println!("OK");
    } else {
        println!("FAILED");
        for rel in &missing {
            println!("  Missing: {}", rel);
        }
        return Err(anyhow::anyhow!("Declared files missing"));
    }

    // Show manifest summary
    println!("----------------------------------------------------------------------");
    println!("Manifest Summary:");
    println!("  Name: {}", manifest.name);
    println!("  Version: {}", manifest.version);
    println!("  Category: {}", manifest.category);
    if !manifest.author.is_empty() {
        println!("  Author: {}", manifest.author);
    }
    if let Some(website) = &manifest.website {
        println!("  Website: {}", website);
    }
    println!("  Depends: {}", manifest.depends.join(", "));
    println!("  Data files: {}", manifest.data.len());
    println!("  Asset bundles: {}", manifest.assets.len());
    println!("  Installable: {}", manifest.installable);
    println!("  Application: {}", manifest.application);
    println!("  Auto-install: {}", manifest.auto_install);
    println!("======================================================================");
    println!("MANIFEST CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Load the module and serve it over HTTP.
async fn cmd_run(port: u16) -> anyhow::Result<()> {
    // Load configuration
    info!("Loading configuration...");
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    info!("Configuration loaded successfully");
    info!("Module root: {}", config.module_root);

    // Install the Prometheus exporter
    let prometheus = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    // Load the module
    let mut templates = TemplateStore::new();
    let registry = ModuleRegistry::load(&config, &mut templates)?;

    info!(
        "Module: {} v{}",
        registry.manifest().name,
        registry.manifest().version
    );
    info!("Views registered: {}", registry.views().len());
    info!("Assets registered: {}", registry.asset_count());

    // Create app state and router
    let state = AppState::new(registry, templates).with_prometheus(prometheus);
    let router = create_router(state);

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    info!("Dashboard available at http://{}{}", addr, DASHBOARD_PATH);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
