use anyhow::{anyhow, Result};
use ethers::signers::coins_bip39::English;
use ethers::signers::{LocalWallet, MnemonicBuilder, Signer};
use ethers::types::{Address, TransactionReceipt, TransactionRequest};

use crate::rpc::RpcClient;

/// A development account derived from the configured mnemonic at
/// `m/44'/60'/0'/0/<index>`.
#[derive(Debug, Clone)]
pub struct TestAccount {
	index: u32,
	wallet: LocalWallet,
}

impl TestAccount {
	pub fn derive(phrase: &str, index: u32) -> Result<Self> {
		let wallet = MnemonicBuilder::<English>::default()
			.phrase(phrase)
			.index(index)
			.and_then(|b| b.build())
			.map_err(|e| anyhow!("could not derive test account #{index}: {e}"))?;
		Ok(Self { index, wallet })
	}

	pub fn index(&self) -> u32 {
		self.index
	}
}

#[async_trait::async_trait]
impl super::Account for TestAccount {
	fn address(&self) -> Address {
		self.wallet.address()
	}

	async fn send_transaction(
		&self,
		rpc: &RpcClient,
		tx: TransactionRequest,
	) -> Result<TransactionReceipt> {
		rpc.send_signed(self.wallet.clone(), tx.from(self.wallet.address())).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::accounts::{parse_address, Account};

	const PHRASE: &str = "test test test test test test test test test test test junk";

	#[test]
	fn derives_well_known_dev_accounts() {
		let first = TestAccount::derive(PHRASE, 0).unwrap();
		let second = TestAccount::derive(PHRASE, 1).unwrap();
		assert_eq!(
			first.address(),
			parse_address("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap()
		);
		assert_eq!(
			second.address(),
			parse_address("0x70997970c51812dc3a010c7d01b50e0d17dc79c8").unwrap()
		);
		assert_eq!(second.index(), 1);
	}

	#[test]
	fn rejects_invalid_phrase() {
		assert!(TestAccount::derive("not a real mnemonic", 0).is_err());
	}
}
