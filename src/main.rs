mod accounts;
mod analysis;
mod cmd;
mod error;
mod events;
mod periods;
mod prices;
mod tax;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "taxfolio", version, about = "Tax year analysis of account events")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Per-period capital ledgers and valuations
    Snapshots(cmd::snapshots::SnapshotsCommand),
    /// Categorised income trees per period
    Income(cmd::income::IncomeCommand),
    /// Chargeable gains with top-slicing relief
    Gains(cmd::gains::GainsCommand),
    /// Print the portfolio input schema
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Snapshots(cmd) => cmd.exec(),
        Command::Income(cmd) => cmd.exec(),
        Command::Gains(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
