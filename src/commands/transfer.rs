use anyhow::{anyhow, Result};
use ethers::types::{Address, TransactionRequest, U256};

use crate::accounts::{parse_address, Account};
use crate::commands::{ensure_success, CliContext};

pub async fn run(ctx: &CliContext, sender: &str, receiver: &str, value: U256) -> Result<()> {
	let account = ctx.accounts.get_account(&ctx.rpc, sender).await?;
	let to = resolve_receiver(ctx, receiver)?;

	let tx = TransactionRequest::new().to(to).value(value);
	let receipt = account.send_transaction(&ctx.rpc, tx).await?;
	ensure_success(&receipt, "transfer")?;

	println!("Transferred {value} wei from {:?} to {to:?}", account.address());
	println!("  TX: {:?}", receipt.transaction_hash);

	Ok(())
}

/// Receivers need not be local accounts: any address is accepted as-is,
/// while aliases are looked up in the keystore.
fn resolve_receiver(ctx: &CliContext, receiver: &str) -> Result<Address> {
	if receiver.starts_with("0x") {
		return parse_address(receiver).ok_or_else(|| anyhow!("invalid address '{receiver}'"));
	}
	Ok(ctx.accounts.load(receiver)?.address())
}
