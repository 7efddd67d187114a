use anyhow::Result;
use clap::Parser;

use evm_tx::cli::{Cli, Command};
use evm_tx::commands::{self, CliContext};

#[tokio::main]
async fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

	let cli = Cli::parse();
	let ctx = CliContext::from_cli(&cli)?;

	match &cli.command {
		Command::Deploy {
			contract,
			arguments,
			sender,
		} => commands::deploy::run(&ctx, contract, arguments, sender.as_deref()).await,
		Command::Transfer {
			sender,
			receiver,
			value,
		} => commands::transfer::run(&ctx, sender, receiver, *value).await,
		Command::Bal { account, pretty } => commands::bal::run(&ctx, account, *pretty).await,
		Command::Trace {
			txn_hash,
			verbose,
			raw,
		} => commands::trace::run(&ctx, txn_hash, *verbose, *raw).await,
	}
}
