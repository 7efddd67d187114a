use anyhow::{anyhow, Result};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Transaction, TransactionReceipt, TransactionRequest, H256, U256};
use serde_json::{json, Value};

use crate::error::TxError;

/// Thin wrapper around an EVM node's JSON-RPC endpoint.
///
/// Standard calls go through the ethers provider. Call-tree tracing goes
/// over raw JSON-RPC and returns the tracer result untouched.
pub struct RpcClient {
	provider: Provider<Http>,
	url: String,
	http: reqwest::Client,
}

impl RpcClient {
	pub fn new(url: &str) -> Result<Self> {
		log::debug!("connecting to {url}");
		Ok(Self {
			provider: Provider::<Http>::try_from(url)?,
			url: url.to_owned(),
			http: reqwest::Client::new(),
		})
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	// -- Queries --

	pub async fn chain_id(&self) -> Result<u64> {
		Ok(self.provider.get_chainid().await?.as_u64())
	}

	pub async fn get_balance(&self, address: Address) -> Result<U256> {
		Ok(self.provider.get_balance(address, None).await?)
	}

	/// Fetch a transaction by hash, failing if the node does not know it.
	pub async fn get_transaction(&self, tx_hash: &str) -> Result<Transaction> {
		let hash = parse_h256(tx_hash)?;
		self.provider
			.get_transaction(hash)
			.await?
			.ok_or_else(|| TxError::TransactionNotFound(tx_hash.to_owned()).into())
	}

	/// Addresses the node can sign for (`eth_accounts`).
	pub async fn unlocked_accounts(&self) -> Result<Vec<Address>> {
		Ok(self.provider.get_accounts().await?)
	}

	// -- Sending --

	/// Submit a transaction for the node to sign with one of its unlocked
	/// accounts, and wait for it to be mined.
	pub async fn send_unsigned(&self, tx: TransactionRequest) -> Result<TransactionReceipt> {
		let pending = self.provider.send_transaction(tx, None).await?;
		let tx_hash = *pending;
		log::debug!("submitted {tx_hash:#x} (node-signed)");
		pending
			.await?
			.ok_or_else(|| anyhow!("transaction {tx_hash:#x} was dropped from the mempool"))
	}

	/// Sign locally with `wallet` and wait for the transaction to be mined.
	pub async fn send_signed(
		&self,
		wallet: LocalWallet,
		tx: TransactionRequest,
	) -> Result<TransactionReceipt> {
		let chain_id = self.chain_id().await?;
		let client = SignerMiddleware::new(self.provider.clone(), wallet.with_chain_id(chain_id));
		let pending = client.send_transaction(tx, None).await?;
		let tx_hash = *pending;
		log::debug!("submitted {tx_hash:#x} (locally signed, chain {chain_id})");
		pending
			.await?
			.ok_or_else(|| anyhow!("transaction {tx_hash:#x} was dropped from the mempool"))
	}

	// -- Tracing --

	/// Fetch the nested call tree of a transaction via the node's
	/// `callTracer`.
	pub async fn get_call_tree(&self, tx_hash: &str) -> Result<Value> {
		let body = json!({
			"id": 1,
			"jsonrpc": "2.0",
			"method": "debug_traceTransaction",
			"params": [tx_hash, { "tracer": "callTracer" }]
		});

		let resp: Value = self.http.post(&self.url).json(&body).send().await?.json().await?;

		match resp.get("result") {
			Some(result) if !result.is_null() => Ok(result.clone()),
			_ => Err(TxError::Rpc {
				method: "debug_traceTransaction".into(),
				error: resp.get("error").cloned().unwrap_or(Value::Null),
			}
			.into()),
		}
	}
}

// -- Private helpers --

fn parse_h256(hex_str: &str) -> Result<H256> {
	let clean = hex_str.strip_prefix("0x").unwrap_or(hex_str);
	let bytes = hex::decode(clean).map_err(|e| anyhow!("invalid transaction hash '{hex_str}': {e}"))?;
	if bytes.len() != 32 {
		return Err(anyhow!("invalid transaction hash '{hex_str}': expected 32 bytes"));
	}
	Ok(H256::from_slice(&bytes))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_prefixed_and_bare_hashes() {
		let bare = "11".repeat(32);
		let prefixed = format!("0x{bare}");
		assert_eq!(parse_h256(&bare).unwrap(), parse_h256(&prefixed).unwrap());
		assert_eq!(parse_h256(&prefixed).unwrap(), H256::repeat_byte(0x11));
	}

	#[test]
	fn rejects_bad_hashes() {
		assert!(parse_h256("0x1234").is_err());
		assert!(parse_h256("0xzz").is_err());
	}

	#[test]
	fn client_keeps_url() {
		let rpc = RpcClient::new("http://127.0.0.1:8545").unwrap();
		assert_eq!(rpc.url(), "http://127.0.0.1:8545");
	}
}
