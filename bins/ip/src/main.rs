//! ip command - network interface configuration.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ip", version, about = "Network interface configuration tool")]
struct Cli {
    /// Output JSON.
    #[arg(short = 'j', long)]
    json: bool,

    /// Pretty print JSON.
    #[arg(short = 'p', long)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage network interfaces.
    #[command(visible_alias = "l")]
    Link {
        /// `set DEV [up|down] [name NAME] [mtu N] ...` or `show [DEV]`.
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let opts = commands::OutputOptions {
        json: cli.json,
        pretty: cli.pretty,
    };

    let result = match cli.command {
        Command::Link { args } => commands::link::run(&args, &opts).await,
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
