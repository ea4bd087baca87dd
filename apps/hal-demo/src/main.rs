use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use halkit::{ApiVersion, PageParams, SortParam};
use runtime::{AppConfig, CliArgs};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod catalog;
mod render;
mod server;

use catalog::Catalog;
use render::Renderer;

/// HAL demo - renders an order catalog as hypermedia documents
#[derive(Parser)]
#[command(name = "hal-demo")]
#[command(about = "HAL demo - renders an order catalog as hypermedia documents")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of generated links (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of orders in the generated catalog
    #[arg(long, default_value_t = 47, global = true)]
    total: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one order with its customer and line items
    Order {
        id: i64,
        /// API version to render links for, e.g. 1 or v2
        #[arg(long)]
        api_version: Option<ApiVersion>,
    },
    /// Render one page of orders
    Orders {
        /// Zero-based page number
        #[arg(long)]
        page: Option<u64>,
        /// Page size (defaults to hal.paging.default_size)
        #[arg(long)]
        size: Option<u64>,
        /// Sort key as FIELD or FIELD:desc; repeat for secondary keys
        #[arg(long = "sort", value_name = "FIELD[:desc]")]
        sort: Vec<String>,
        /// Whole page state as a JSON object, e.g. {"page":1,"size":5}
        #[arg(long, conflicts_with_all = ["page", "size", "sort"])]
        page_json: Option<String>,
        /// API version to render links for, e.g. 1 or v2
        #[arg(long)]
        api_version: Option<ApiVersion>,
    },
    /// Serve the catalog over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:8087")]
        bind: SocketAddr,
    },
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        base_url: cli.base_url.clone(),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (base URL / verbosity)
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.home_dir));

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    config.validate().context("invalid configuration")?;
    let renderer = Renderer::from_config(&config.hal);
    let catalog = Catalog::generate(cli.total);
    tracing::debug!(orders = cli.total, base_url = %config.hal.base_url, "catalog ready");

    match cli.command {
        Commands::Order { id, api_version } => render_order(&catalog, &renderer, id, api_version),
        Commands::Orders {
            page,
            size,
            sort,
            page_json,
            api_version,
        } => {
            let params = match page_json {
                Some(raw) => page_params_from_json(&raw)?,
                None => page_params_from_args(page, size, &sort, &renderer)?,
            };
            render_orders(&catalog, &renderer, &params, api_version)
        }
        Commands::Serve { bind } => {
            serve(catalog, renderer, &config.hal.version_prefix, bind).await
        }
        Commands::Check => check_config(&config),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize document")?;
    println!("{}", out);
    Ok(())
}

fn render_order(
    catalog: &Catalog,
    renderer: &Renderer,
    id: i64,
    version: Option<ApiVersion>,
) -> Result<()> {
    let order = catalog
        .order(id)
        .with_context(|| format!("order {} does not exist", id))?;
    print_json(&renderer.resources(version).build(order))
}

fn render_orders(
    catalog: &Catalog,
    renderer: &Renderer,
    params: &PageParams,
    version: Option<ApiVersion>,
) -> Result<()> {
    renderer
        .limits()
        .check(params)
        .context("invalid page state")?;
    let paged = catalog.page(params, None)?;
    print_json(&renderer.collection("Orders", version, params, &paged))
}

/// `FIELD` sorts ascending, `FIELD:desc` descending.
fn parse_sort(raw: &str) -> Result<SortParam> {
    let (field, dir) = match raw.rsplit_once(':') {
        Some((field, dir)) => (field, Some(dir)),
        None => (raw, None),
    };
    let desc = match dir.map(str::to_ascii_lowercase).as_deref() {
        None | Some("asc") => false,
        Some("desc") => true,
        Some(other) => anyhow::bail!("invalid sort direction {:?} in {:?}", other, raw),
    };
    Ok(SortParam {
        field: field.trim().to_string(),
        desc,
    })
}

fn page_params_from_args(
    page: Option<u64>,
    size: Option<u64>,
    sort: &[String],
    renderer: &Renderer,
) -> Result<PageParams> {
    let sort = sort
        .iter()
        .map(|s| parse_sort(s))
        .collect::<Result<Vec<_>>>()?;
    Ok(PageParams::new(
        page.unwrap_or(0),
        size.unwrap_or(renderer.limits().default_size),
    )
    .with_sort(sort))
}

fn page_params_from_json(raw: &str) -> Result<PageParams> {
    let value: serde_json::Value =
        serde_json::from_str(raw).context("--page-json is not valid JSON")?;
    PageParams::from_json(&value).context("page state could not be parsed")
}

async fn serve(
    catalog: Catalog,
    renderer: Renderer,
    version_prefix: &str,
    bind: SocketAddr,
) -> Result<()> {
    let state = Arc::new(server::AppState { catalog, renderer });
    let app = server::router(state, version_prefix);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    tracing::info!(%bind, "hal-demo listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("server error")
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
