mod collect;
mod email;
mod gateway;
mod heartbeat;
mod logs;
mod monthly;
mod sheets;
mod status;
mod summarize;

use clap::{Parser, Subcommand};

use crate::cli::{
    collect::CollectArgs,
    monthly::MonthlyArgs,
    status::StatusArgs,
    summarize::SummarizeArgs,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Poll the gateway once and append the readings to the logs.
    #[clap(name = "collect")]
    Collect(Box<CollectArgs>),

    /// Summarize a day, publish the summary, and roll up the month on the first.
    #[clap(name = "summarize")]
    Summarize(Box<SummarizeArgs>),

    /// Roll up a calendar month across the years.
    #[clap(name = "monthly")]
    Monthly(Box<MonthlyArgs>),

    /// Print the inverter states reported by the gateway.
    #[clap(name = "status")]
    Status(Box<StatusArgs>),
}

impl Command {
    pub async fn run(self) -> crate::prelude::Result {
        match self {
            Self::Collect(args) => args.run().await,
            Self::Summarize(args) => args.run().await,
            Self::Monthly(args) => args.run().await,
            Self::Status(args) => args.run().await,
        }
    }
}
