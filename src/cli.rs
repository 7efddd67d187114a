use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ethers::types::U256;

use crate::units::parse_value;

#[derive(Parser)]
#[command(
	name = "evm-tx",
	about = "Transaction utilities for EVM chains.",
	version
)]
pub struct Cli {
	/// Network to connect to (a name from the config file).
	#[arg(long, global = true)]
	pub network: Option<String>,

	/// Override RPC endpoint URL.
	#[arg(long, global = true)]
	pub rpc_url: Option<String>,

	/// Use an alternate config file.
	#[arg(long, global = true, env = "EVM_TX_CONFIG")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
	/// Deploy a contract from the project's build artifacts.
	Deploy {
		/// Contract name.
		contract: String,

		/// Constructor arguments, in ABI order.
		arguments: Vec<String>,

		/// Account to send the deploy transaction from.
		#[arg(long)]
		sender: Option<String>,
	},

	/// Transfer value between accounts.
	Transfer {
		/// The account to transfer from.
		#[arg(long = "from")]
		sender: String,

		/// The account or address to receive the value.
		#[arg(long = "to")]
		receiver: String,

		/// The amount: wei as an integer, or with a unit (e.g. "1 ether").
		#[arg(long, value_parser = parse_value)]
		value: U256,
	},

	/// Show the balance of an account alias or address.
	Bal {
		/// Account alias or 0x-prefixed address.
		account: String,

		/// Show the balance in the ecosystem's currency instead of wei.
		#[arg(long)]
		pretty: bool,
	},

	/// Show the call trace of one or more transactions.
	Trace {
		/// Transaction hashes (0x-prefixed). Duplicates are ignored.
		txn_hash: Vec<String>,

		/// Show more information on the trace.
		#[arg(long)]
		verbose: bool,

		/// Show the raw, non-pretty trace.
		#[arg(long)]
		raw: bool,
	},
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(args: &[&str]) -> Cli {
		Cli::try_parse_from(std::iter::once("evm-tx").chain(args.iter().copied())).unwrap()
	}

	#[test]
	fn deploy_collects_constructor_args() {
		let cli = parse(&["deploy", "Token", "MyToken", "1000", "--sender", "alice"]);
		match cli.command {
			Command::Deploy { contract, arguments, sender } => {
				assert_eq!(contract, "Token");
				assert_eq!(arguments, ["MyToken", "1000"]);
				assert_eq!(sender.as_deref(), Some("alice"));
			}
			_ => panic!("expected deploy"),
		}
	}

	#[test]
	fn transfer_requires_all_options() {
		assert!(Cli::try_parse_from(["evm-tx", "transfer", "--from", "a", "--to", "b"]).is_err());
		assert!(Cli::try_parse_from(["evm-tx", "transfer", "--to", "b", "--value", "1"]).is_err());
	}

	#[test]
	fn transfer_value_accepts_units() {
		let cli = parse(&["transfer", "--from", "a", "--to", "b", "--value", "2 gwei"]);
		match cli.command {
			Command::Transfer { sender, receiver, value } => {
				assert_eq!(sender, "a");
				assert_eq!(receiver, "b");
				assert_eq!(value, U256::from(2_000_000_000u64));
			}
			_ => panic!("expected transfer"),
		}
	}

	#[test]
	fn transfer_rejects_bad_value() {
		let res = Cli::try_parse_from([
			"evm-tx", "transfer", "--from", "a", "--to", "b", "--value", "lots",
		]);
		assert!(res.is_err());
	}

	#[test]
	fn global_options_work_after_subcommand() {
		let cli = parse(&["bal", "alice", "--pretty", "--network", "sepolia"]);
		assert_eq!(cli.network.as_deref(), Some("sepolia"));
		assert!(matches!(cli.command, Command::Bal { pretty: true, .. }));
	}

	#[test]
	fn trace_accepts_no_hashes() {
		let cli = parse(&["trace", "--raw"]);
		match cli.command {
			Command::Trace { txn_hash, verbose, raw } => {
				assert!(txn_hash.is_empty());
				assert!(!verbose);
				assert!(raw);
			}
			_ => panic!("expected trace"),
		}
	}
}
