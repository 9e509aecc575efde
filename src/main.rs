use clap::Parser;
use finance_tracker::args::{Args, Command};
use finance_tracker::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // When FINANCE_TRACKER_IN_TEST_MODE is set and non-empty the mode is Mode::Test and no Google
    // API is called.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(
            home,
            init_args.client_secret(),
            init_args.token(),
            init_args.sheet_url(),
        )
        .await?
        .print(),

        Command::Auth => commands::auth(&Config::load(home).await?).await?.print(),

        Command::Show(show_args) => {
            commands::show(Config::load(home).await?, mode, show_args.clone())
                .await?
                .print()
        }

        Command::Categorize(categorize_args) => commands::categorize(
            Config::load(home).await?,
            mode,
            categorize_args.clone(),
        )
        .await?
        .print(),

        Command::Add(add_args) => {
            commands::add(Config::load(home).await?, mode, add_args.clone())
                .await?
                .print()
        }

        Command::Remove(remove_args) => {
            commands::remove(Config::load(home).await?, mode, remove_args.clone())
                .await?
                .print()
        }

        Command::Summary(summary_args) => {
            commands::summary(Config::load(home).await?, mode, summary_args.clone())
                .await?
                .print()
        }

        Command::NetWorth => commands::net_worth(Config::load(home).await?, mode)
            .await?
            .print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                "finance_tracker",
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
