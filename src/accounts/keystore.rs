use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use ethers::signers::LocalWallet;
use ethers::types::{Address, TransactionReceipt, TransactionRequest};

use crate::rpc::RpcClient;

/// Environment variable consulted before prompting for a passphrase.
pub const PASSWORD_ENV: &str = "EVM_TX_PASSWORD";

/// An encrypted JSON keystore saved as `<alias>.json`.
///
/// The address is read from the keystore's plaintext `address` field, so
/// listing and resolving accounts never needs the passphrase.
#[derive(Debug, Clone)]
pub struct KeystoreAccount {
	alias: String,
	path: PathBuf,
	address: Address,
}

impl KeystoreAccount {
	pub fn from_file(alias: &str, path: PathBuf) -> Result<Self> {
		let content = std::fs::read_to_string(&path)?;
		let json: serde_json::Value = serde_json::from_str(&content)
			.with_context(|| format!("invalid keystore {}", path.display()))?;
		let raw = json
			.get("address")
			.and_then(|v| v.as_str())
			.ok_or_else(|| anyhow!("keystore {} has no address field", path.display()))?;
		let address = super::parse_address(raw)
			.ok_or_else(|| anyhow!("keystore {} has an invalid address '{raw}'", path.display()))?;

		Ok(Self {
			alias: alias.to_owned(),
			path,
			address,
		})
	}

	pub fn alias(&self) -> &str {
		&self.alias
	}

	/// Decrypt the keystore with `password`.
	pub fn unlock_with(&self, password: &str) -> Result<LocalWallet> {
		LocalWallet::decrypt_keystore(&self.path, password)
			.map_err(|e| anyhow!("could not unlock '{}': {e}", self.alias))
	}

	fn password(&self) -> Result<String> {
		if let Ok(password) = std::env::var(PASSWORD_ENV) {
			return Ok(password);
		}
		Ok(rpassword::prompt_password(format!(
			"Enter passphrase to unlock '{}': ",
			self.alias
		))?)
	}
}

#[async_trait::async_trait]
impl super::Account for KeystoreAccount {
	fn address(&self) -> Address {
		self.address
	}

	async fn send_transaction(
		&self,
		rpc: &RpcClient,
		tx: TransactionRequest,
	) -> Result<TransactionReceipt> {
		let wallet = self.unlock_with(&self.password()?)?;
		rpc.send_signed(wallet, tx.from(self.address)).await
	}
}
