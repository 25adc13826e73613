mod api;
mod chart;
mod config;
mod delete;
mod error;
mod gate;
mod history;
mod mode;
mod orchestrator;
mod output;
mod stats;
mod toast;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::builder::TypedValueParser;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use api::ApiClient;
use config::{
    Config, DEFAULT_API_BASE, DEFAULT_DAYS, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS,
    DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_MARGIN, MAX_PAGE_SIZE,
};
use mode::{DeleteOptions, HistoryOptions};
use output::print_error;
use toast::{ToastHost, Toaster};

#[derive(Parser)]
#[command(
    name = "crawlboard",
    version,
    about = "Crawl-time box plots and price histories from the price tracker backend",
    after_help = "Examples:
  crawlboard boxplot                                   Crawl time per store, last 7 days
  crawlboard timeseries --days 30 --html crawl.html    Per-period box plots as an HTML dashboard
  crawlboard watch                                     Interactive view (stdin: days N, refresh, quit)
  crawlboard history --store amazon --item B0C1 --item B0C2
  crawlboard delete --store amazon --item B0C1 --record 41 --record 42"
)]
struct Cli {
    /// Backend origin
    #[arg(long, global = true, env = "CRAWLBOARD_API_BASE", default_value = DEFAULT_API_BASE, value_name = "URL")]
    api_base: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "CRAWLBOARD_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS, value_name = "SECONDS")]
    timeout: u64,

    /// Suppress explanations (show data only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl time distribution per store over the whole range
    Boxplot {
        #[arg(long, default_value_t = DEFAULT_DAYS, value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,

        /// Write an HTML dashboard with the chart
        #[arg(long, value_name = "PATH")]
        html: Option<PathBuf>,
    },

    /// Crawl time distribution per store and period
    Timeseries {
        #[arg(long, default_value_t = DEFAULT_DAYS, value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,

        /// Write an HTML dashboard with one chart per store
        #[arg(long, value_name = "PATH")]
        html: Option<PathBuf>,
    },

    /// Timeseries view that follows commands on stdin
    Watch {
        #[arg(long, default_value_t = DEFAULT_DAYS, value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,

        /// Rewrite this HTML dashboard after every update
        #[arg(long, value_name = "PATH")]
        html: Option<PathBuf>,
    },

    /// Price history cards, loaded as they scroll into view
    History {
        #[arg(long)]
        store: String,

        /// Item id (repeatable)
        #[arg(long = "item", value_name = "ID", required = true)]
        items: Vec<String>,

        #[arg(long, default_value_t = DEFAULT_DAYS, value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,

        /// Items per lazily loaded page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u64).range(1..=MAX_PAGE_SIZE).map(|n| n as usize))]
        page_size: usize,

        /// Viewport height in px
        #[arg(long, default_value_t = DEFAULT_VIEWPORT_HEIGHT, value_name = "PX")]
        viewport_height: u32,

        /// Distance outside the viewport that already triggers loading, in px
        #[arg(long, default_value_t = DEFAULT_VIEWPORT_MARGIN, value_name = "PX")]
        viewport_margin: u32,

        /// Scroll to this offset in px after the first render (repeatable)
        #[arg(long = "scroll", value_name = "PX")]
        scrolls: Vec<u32>,

        /// Switch to this day range after scrolling; loaded pages reload
        #[arg(long, value_name = "DAYS", value_parser = clap::value_parser!(u32).range(1..))]
        switch_days: Option<u32>,

        /// Write an HTML dashboard with one chart per loaded item
        #[arg(long, value_name = "PATH")]
        html: Option<PathBuf>,
    },

    /// Preview and delete price records of one item
    Delete {
        #[arg(long)]
        store: String,

        #[arg(long = "item", value_name = "ID")]
        item_id: String,

        /// Record id (repeatable)
        #[arg(long = "record", value_name = "ID", required = true)]
        records: Vec<i64>,

        /// Deletion password
        #[arg(long, env = "CRAWLBOARD_DELETE_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Refuse to send a deletion without a password
        #[arg(long, env = "CRAWLBOARD_DELETE_PASSWORD_REQUIRED")]
        password_required: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Command {
    fn html(&self) -> Option<&Path> {
        match self {
            Command::Boxplot { html, .. }
            | Command::Timeseries { html, .. }
            | Command::Watch { html, .. }
            | Command::History { html, .. } => html.as_deref(),
            Command::Delete { .. } => None,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Reject an output path whose directory does not exist before fetching anything
fn validate_output_path(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        return Err(format!("Directory does not exist: {}", parent.display()));
    }
    Ok(())
}

async fn run(
    command: Command,
    client: &ApiClient,
    config: &Config,
    toaster: &Toaster,
    toasts: &mut ToastHost,
    quiet: bool,
) -> ExitCode {
    match command {
        Command::Boxplot { days, html } => mode::run_boxplot(client, days, html.as_deref(), quiet).await,
        Command::Timeseries { days, html } => {
            mode::run_timeseries(client, days, html.as_deref(), quiet).await
        }
        Command::Watch { days, html } => {
            mode::run_watch(client, days, html.as_deref(), toaster, toasts, quiet).await
        }
        Command::History {
            store,
            items,
            days,
            page_size,
            scrolls,
            switch_days,
            html,
            ..
        } => {
            let opts = HistoryOptions {
                store: &store,
                items: &items,
                days,
                page_size,
                scrolls: &scrolls,
                switch_days,
                html: html.as_deref(),
            };
            mode::run_history(client, &opts, config.viewport, quiet).await
        }
        Command::Delete {
            store,
            item_id,
            records,
            password,
            password_required,
            yes,
        } => {
            let opts = DeleteOptions {
                store: &store,
                item_id: &item_id,
                records: &records,
                password: password.as_deref(),
                password_required,
                assume_yes: yes,
            };
            mode::run_delete(client, &opts, toaster, quiet).await
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_tracing();

    if let Some(path) = cli.command.html()
        && let Err(e) = validate_output_path(path)
    {
        print_error(&e);
        return ExitCode::FAILURE;
    }

    let mut config = match Config::new(&cli.api_base, cli.timeout) {
        Ok(config) => config,
        Err(e) => {
            print_error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };
    if let Command::History {
        viewport_height,
        viewport_margin,
        ..
    } = &cli.command
    {
        config = config.with_viewport(*viewport_height, *viewport_margin);
    }

    let client = match ApiClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            print_error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            print_error(&format!("Failed to start runtime: {}", e));
            return ExitCode::FAILURE;
        }
    };

    let (toaster, mut toasts) = toast::channel();
    let code = runtime.block_on(run(
        cli.command,
        &client,
        &config,
        &toaster,
        &mut toasts,
        cli.quiet,
    ));
    toasts.flush();
    code
}
