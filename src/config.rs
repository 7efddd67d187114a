use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::TxError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub default_network: String,
	pub networks: BTreeMap<String, NetworkConfig>,
	pub project: ProjectConfig,
	pub accounts: AccountsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
	/// Ecosystem the network belongs to, e.g. `ethereum`.
	pub ecosystem: String,
	pub rpc_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
	/// Project root. Relative paths resolve against the working directory.
	pub path: PathBuf,
	/// Directory holding compiled contract artifacts, relative to `path`.
	pub build_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsConfig {
	/// Directory of `<alias>.json` keystore files. Defaults to `~/.evm-tx/accounts`.
	pub keystore_dir: Option<PathBuf>,
	pub test: TestAccountsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestAccountsConfig {
	pub mnemonic: String,
	pub number_of_accounts: u32,
}

impl Default for Config {
	fn default() -> Self {
		let mut networks = BTreeMap::new();
		networks.insert(
			"local".into(),
			NetworkConfig {
				ecosystem: "ethereum".into(),
				rpc_url: "http://127.0.0.1:8545".into(),
			},
		);
		networks.insert(
			"mainnet".into(),
			NetworkConfig {
				ecosystem: "ethereum".into(),
				rpc_url: "https://ethereum-rpc.publicnode.com".into(),
			},
		);
		networks.insert(
			"sepolia".into(),
			NetworkConfig {
				ecosystem: "ethereum".into(),
				rpc_url: "https://ethereum-sepolia-rpc.publicnode.com".into(),
			},
		);

		Self {
			default_network: "local".into(),
			networks,
			project: ProjectConfig {
				path: PathBuf::from("."),
				build_dir: PathBuf::from(".build"),
			},
			accounts: AccountsConfig {
				keystore_dir: None,
				test: TestAccountsConfig {
					mnemonic: "test test test test test test test test test test test junk".into(),
					number_of_accounts: 10,
				},
			},
		}
	}
}

impl Config {
	/// Directory where CLI state is stored (~/.evm-tx/).
	pub fn dir() -> anyhow::Result<PathBuf> {
		let home = dirs::home_dir().context("could not determine home directory")?;
		Ok(home.join(".evm-tx"))
	}

	/// Path to the default config file.
	pub fn path() -> anyhow::Result<PathBuf> {
		Ok(Self::dir()?.join("config.toml"))
	}

	/// Load config from `path` (or the default location), falling back to
	/// defaults if no file exists.
	pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
		let path = match path {
			Some(p) => p.to_path_buf(),
			None => Self::path()?,
		};
		if path.exists() {
			log::debug!("loading config from {}", path.display());
			let content = std::fs::read_to_string(&path)?;
			toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
		} else {
			Ok(Self::default())
		}
	}

	/// Look up a network by name.
	pub fn network(&self, name: &str) -> Result<&NetworkConfig, TxError> {
		self.networks
			.get(name)
			.ok_or_else(|| TxError::UnknownNetwork(name.to_owned()))
	}

	/// Directory containing compiled artifacts.
	pub fn build_dir(&self) -> PathBuf {
		self.project.path.join(&self.project.build_dir)
	}

	pub fn keystore_dir(&self) -> anyhow::Result<PathBuf> {
		match &self.accounts.keystore_dir {
			Some(dir) => Ok(dir.clone()),
			None => Ok(Self::dir()?.join("accounts")),
		}
	}
}
