pub mod keystore;
pub mod mnemonic;
pub mod node;

use std::path::PathBuf;

use anyhow::Result;
use ethers::types::{Address, TransactionReceipt, TransactionRequest};

use crate::config::{Config, TestAccountsConfig};
use crate::error::TxError;
use crate::rpc::RpcClient;

use keystore::KeystoreAccount;
use mnemonic::TestAccount;
use node::NodeAccount;

/// An account that can put transactions on chain. Implementations differ
/// in where the key lives: an encrypted keystore on disk, a development
/// mnemonic, or the node itself.
#[async_trait::async_trait]
pub trait Account: Send + Sync {
	/// The address this account sends from.
	fn address(&self) -> Address;

	/// Submit `tx` from this account and wait for its receipt.
	async fn send_transaction(
		&self,
		rpc: &RpcClient,
		tx: TransactionRequest,
	) -> Result<TransactionReceipt>;
}

/// Registry of every account the CLI can sign with.
pub struct AccountManager {
	keystore_dir: PathBuf,
	test: TestAccountsConfig,
}

impl AccountManager {
	pub fn new(config: &Config) -> Result<Self> {
		Ok(Self {
			keystore_dir: config.keystore_dir()?,
			test: config.accounts.test.clone(),
		})
	}

	/// Resolve a CLI account id: `0x`-prefixed ids are addresses, anything
	/// else is a keystore alias.
	pub async fn get_account(&self, rpc: &RpcClient, id: &str) -> Result<Box<dyn Account>> {
		if id.is_empty() {
			return Err(TxError::MissingAccount(id.to_owned()).into());
		}

		if id.starts_with("0x") {
			let address = parse_address(id).ok_or_else(|| TxError::UnknownAddress(id.to_owned()))?;
			self.by_address(rpc, address)
				.await?
				.ok_or_else(|| TxError::UnknownAddress(id.to_owned()).into())
		} else {
			Ok(Box::new(self.load(id)?))
		}
	}

	/// Load the keystore saved under `alias`.
	pub fn load(&self, alias: &str) -> Result<KeystoreAccount> {
		// Aliases name files directly inside the keystore directory.
		let escapes = alias.contains(|c: char| c == '/' || c == '\\') || alias == "." || alias == "..";
		if alias.is_empty() || escapes {
			return Err(TxError::UnknownAlias(alias.to_owned()).into());
		}
		let path = self.keystore_dir.join(format!("{alias}.json"));
		if !path.is_file() {
			return Err(TxError::UnknownAlias(alias.to_owned()).into());
		}
		KeystoreAccount::from_file(alias, path)
	}

	/// Every keystore in the keystore directory, sorted by alias.
	pub fn keystores(&self) -> Result<Vec<KeystoreAccount>> {
		if !self.keystore_dir.is_dir() {
			return Ok(Vec::new());
		}

		let mut accounts = Vec::new();
		for entry in std::fs::read_dir(&self.keystore_dir)? {
			let path = entry?.path();
			if path.extension().and_then(|e| e.to_str()) != Some("json") {
				continue;
			}
			let Some(alias) = path.file_stem().and_then(|s| s.to_str()).map(str::to_owned) else {
				continue;
			};
			match KeystoreAccount::from_file(&alias, path.clone()) {
				Ok(account) => accounts.push(account),
				Err(e) => log::warn!("skipping keystore {}: {e:#}", path.display()),
			}
		}
		accounts.sort_by(|a, b| a.alias().cmp(b.alias()));
		Ok(accounts)
	}

	/// Accounts derived from the configured development mnemonic.
	pub fn test_accounts(&self) -> Result<Vec<TestAccount>> {
		(0..self.test.number_of_accounts)
			.map(|index| TestAccount::derive(&self.test.mnemonic, index))
			.collect()
	}

	/// Find the account controlling `address`. Keystores are searched
	/// first, then test accounts, then the node's unlocked accounts.
	pub async fn by_address(
		&self,
		rpc: &RpcClient,
		address: Address,
	) -> Result<Option<Box<dyn Account>>> {
		if let Some(account) = self.keystores()?.into_iter().find(|a| a.address() == address) {
			log::debug!("{address:#x} resolved to keystore '{}'", account.alias());
			return Ok(Some(Box::new(account)));
		}

		if let Some(account) = self.test_accounts()?.into_iter().find(|a| a.address() == address) {
			log::debug!("{address:#x} resolved to test account #{}", account.index());
			return Ok(Some(Box::new(account)));
		}

		if node_accounts(rpc).await.contains(&address) {
			log::debug!("{address:#x} resolved to node-unlocked account");
			return Ok(Some(Box::new(NodeAccount::new(address))));
		}

		Ok(None)
	}

	/// The first account the node signs for, used when no sender is given.
	pub async fn default_node_account(&self, rpc: &RpcClient) -> Option<NodeAccount> {
		node_accounts(rpc).await.first().copied().map(NodeAccount::new)
	}
}

/// Unlocked node accounts. Public endpoints usually reject
/// `eth_accounts`; that counts as having none.
async fn node_accounts(rpc: &RpcClient) -> Vec<Address> {
	match rpc.unlocked_accounts().await {
		Ok(accounts) => accounts,
		Err(e) => {
			log::debug!("eth_accounts unavailable: {e:#}");
			Vec::new()
		}
	}
}

/// Parse a `0x`-prefixed 20-byte address.
pub fn parse_address(s: &str) -> Option<Address> {
	let clean = s.strip_prefix("0x").unwrap_or(s);
	let bytes = hex::decode(clean).ok()?;
	(bytes.len() == 20).then(|| Address::from_slice(&bytes))
}
