use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use deskq::cmd::config::{self as config_cmd, ConfigArgs};
use deskq::cmd::console;
use deskq::config::AppConfig;
use deskq::context::AppContext;
use deskq::error::AppResult;
use deskq::store::TicketStore;

#[derive(Parser)]
#[command(name = "deskq", author, version, about = "Support ticket tracking console")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive ticket console (the default).
    Console,
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

fn main() {
    init_tracing();

    if let Err(error) = run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

// Logs go to stderr so they never interleave with the console UI; silent
// unless RUST_LOG asks for more.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run() -> AppResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config(args)) => config_cmd::run(args.command),
        Some(Commands::Console) | None => run_console(),
    }
}

fn run_console() -> AppResult<()> {
    let config = AppConfig::load()?;
    let store = TicketStore::seeded();
    let mut context = AppContext::new(config, store);
    console::run(&mut context)
}
