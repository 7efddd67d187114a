pub mod bal;
pub mod deploy;
pub mod trace;
pub mod transfer;

use anyhow::{bail, Result};
use ethers::types::TransactionReceipt;

use crate::accounts::AccountManager;
use crate::cli::Cli;
use crate::config::{Config, NetworkConfig};
use crate::project::Project;
use crate::rpc::RpcClient;

/// Everything a command needs: the selected network, a connection to it,
/// and the account registry.
pub struct CliContext {
	pub config: Config,
	pub network: NetworkConfig,
	pub rpc: RpcClient,
	pub accounts: AccountManager,
}

impl CliContext {
	pub fn from_cli(cli: &Cli) -> Result<Self> {
		let config = Config::load(cli.config.as_deref())?;
		let network = resolve_network(cli, &config)?;
		log::debug!("using {} network at {}", network.ecosystem, network.rpc_url);
		let rpc = RpcClient::new(&network.rpc_url)?;
		let accounts = AccountManager::new(&config)?;
		Ok(Self {
			config,
			network,
			rpc,
			accounts,
		})
	}

	/// Load the contract artifacts of the configured project.
	pub fn project(&self) -> Result<Project> {
		Project::load(&self.config.build_dir())
	}
}

/// Resolve the network from CLI flags + config. `--rpc-url` overrides the
/// endpoint but keeps the network's ecosystem.
pub fn resolve_network(cli: &Cli, config: &Config) -> Result<NetworkConfig> {
	let name = cli.network.as_deref().unwrap_or(&config.default_network);
	let mut network = config.network(name)?.clone();
	if let Some(url) = &cli.rpc_url {
		network.rpc_url = url.clone();
	}
	Ok(network)
}

/// Fail if the receipt reports a reverted transaction.
pub(crate) fn ensure_success(receipt: &TransactionReceipt, what: &str) -> Result<()> {
	if receipt.status.map(|s| s.is_zero()).unwrap_or(false) {
		bail!("{what} reverted in {:?}", receipt.transaction_hash);
	}
	Ok(())
}
