use anyhow::{anyhow, Result};
use ethers::types::U256;

use crate::accounts::parse_address;
use crate::commands::CliContext;
use crate::error::TxError;
use crate::units::format_pretty_balance;

pub async fn run(ctx: &CliContext, account: &str, pretty: bool) -> Result<()> {
	let balance = get_balance(ctx, account, pretty).await?;
	println!("{balance}");
	Ok(())
}

/// Balance of an alias or address, in wei or (with `pretty`) in the
/// ecosystem's currency.
pub async fn get_balance(ctx: &CliContext, account: &str, pretty: bool) -> Result<String> {
	// Addresses are queried directly so non-local accounts work too.
	let address = if account.starts_with("0x") {
		parse_address(account).ok_or_else(|| anyhow!("invalid address '{account}'"))?
	} else {
		ctx.accounts.get_account(&ctx.rpc, account).await?.address()
	};

	let balance = ctx.rpc.get_balance(address).await?;
	if !pretty {
		return Ok(balance.to_string());
	}
	Ok(pretty_balance(balance, &ctx.network.ecosystem)?)
}

/// Native currency symbol and decimals of an ecosystem.
fn currency(ecosystem: &str) -> Option<(&'static str, u32)> {
	match ecosystem {
		"ethereum" => Some(("ETH", 18)),
		_ => None,
	}
}

pub fn pretty_balance(balance: U256, ecosystem: &str) -> Result<String, TxError> {
	let ecosystem = ecosystem.to_lowercase();
	let (symbol, decimals) =
		currency(&ecosystem).ok_or_else(|| TxError::UnsupportedEcosystem(ecosystem.clone()))?;
	Ok(format!("{} {symbol}", format_pretty_balance(balance, decimals)))
}
