use anyhow::Result;
use ethers::types::{Address, TransactionReceipt, TransactionRequest};

use crate::rpc::RpcClient;

/// An address the node holds the key for. Transactions are sent unsigned
/// and the node signs them (`eth_sendTransaction`).
#[derive(Debug, Clone, Copy)]
pub struct NodeAccount {
	address: Address,
}

impl NodeAccount {
	pub fn new(address: Address) -> Self {
		Self { address }
	}
}

#[async_trait::async_trait]
impl super::Account for NodeAccount {
	fn address(&self) -> Address {
		self.address
	}

	async fn send_transaction(
		&self,
		rpc: &RpcClient,
		tx: TransactionRequest,
	) -> Result<TransactionReceipt> {
		rpc.send_unsigned(tx.from(self.address)).await
	}
}
