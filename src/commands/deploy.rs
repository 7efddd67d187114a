use anyhow::{anyhow, Result};
use ethers::types::TransactionRequest;

use crate::accounts::{Account, AccountManager};
use crate::commands::{ensure_success, CliContext};
use crate::error::TxError;
use crate::rpc::RpcClient;

/// Deploy `contract` with `arguments` as constructor parameters.
///
/// Without a sender, the node's first unlocked account signs. If the node
/// has none, the deploy is aborted rather than sent unsigned.
pub async fn run(
	ctx: &CliContext,
	contract: &str,
	arguments: &[String],
	sender: Option<&str>,
) -> Result<()> {
	let project = ctx.project()?;
	let container = project.get_contract(contract).map_err(|e| {
		log::debug!("known contracts: {:?}", project.contract_names().collect::<Vec<_>>());
		e
	})?;
	let data = container.deployment_data(arguments)?;

	let account = select_sender(&ctx.accounts, &ctx.rpc, contract, sender).await?;
	log::debug!("deploying '{contract}' from {:?}", account.address());

	let tx = TransactionRequest::new().data(data);
	let receipt = account.send_transaction(&ctx.rpc, tx).await?;
	ensure_success(&receipt, &format!("deployment of '{contract}'"))?;

	let address = receipt
		.contract_address
		.ok_or_else(|| anyhow!("receipt for '{contract}' has no contract address"))?;

	println!("Deployed '{contract}' at {address:?}");
	println!("  TX: {:?}", receipt.transaction_hash);

	Ok(())
}

/// The account to deploy from: the given sender, or else the node's first
/// unlocked account. An empty sender counts as none.
async fn select_sender(
	accounts: &AccountManager,
	rpc: &RpcClient,
	contract: &str,
	sender: Option<&str>,
) -> Result<Box<dyn Account>> {
	if let Some(id) = sender.filter(|s| !s.is_empty()) {
		return accounts.get_account(rpc, id).await;
	}
	match accounts.default_node_account(rpc).await {
		Some(node) => Ok(Box::new(node)),
		None => Err(TxError::SignatureRequired(contract.to_owned()).into()),
	}
}
