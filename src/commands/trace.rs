use std::collections::HashSet;
use std::io::Write;

use anyhow::Result;
use ethers::types::Address;
use serde_json::Value;

use crate::commands::CliContext;
use crate::project::MethodRegistry;
use crate::trace::{CallFrame, TraceRenderer};

/// A transaction's call tree as returned by the node.
#[derive(Debug, Clone)]
pub struct FetchedTrace {
	pub tx_hash: String,
	pub origin: Address,
	pub call_tree: Value,
}

pub async fn run(ctx: &CliContext, txn_hash: &[String], verbose: bool, raw: bool) -> Result<()> {
	let hashes = dedup_hashes(txn_hash);
	if hashes.is_empty() {
		return Ok(());
	}

	let registry = if raw {
		MethodRegistry::default()
	} else {
		ctx.project()?.method_registry()
	};
	let renderer = TraceRenderer::new(&registry, verbose);

	let mut traces = Vec::with_capacity(hashes.len());
	for hash in &hashes {
		let tx = ctx.rpc.get_transaction(hash).await?;
		let tx_hash = format!("{:?}", tx.hash);
		let call_tree = ctx.rpc.get_call_tree(&tx_hash).await?;
		traces.push(FetchedTrace {
			tx_hash,
			origin: tx.from,
			call_tree,
		});
	}

	write_traces(&mut std::io::stdout().lock(), &traces, &renderer, raw)
}

/// Print each trace in order, separated by a blank line. Raw traces are
/// one line of compact JSON each.
pub fn write_traces<W: Write>(
	out: &mut W,
	traces: &[FetchedTrace],
	renderer: &TraceRenderer,
	raw: bool,
) -> Result<()> {
	for (index, trace) in traces.iter().enumerate() {
		if index > 0 {
			writeln!(out)?;
		}
		if raw {
			writeln!(out, "{}", serde_json::to_string(&trace.call_tree)?)?;
		} else {
			let root: CallFrame = serde_json::from_value(trace.call_tree.clone())?;
			write!(out, "{}", renderer.render(&trace.tx_hash, trace.origin, &root))?;
		}
	}
	out.flush()?;
	Ok(())
}

/// Drop repeated hashes, keeping the first occurrence of each. Hashes
/// that differ only in case or `0x` prefix count as the same.
pub fn dedup_hashes(hashes: &[String]) -> Vec<String> {
	let mut seen = HashSet::new();
	hashes
		.iter()
		.filter(|h| {
			let h = h.as_str();
			let key = h.strip_prefix("0x").unwrap_or(h).to_ascii_lowercase();
			seen.insert(key)
		})
		.cloned()
		.collect()
}
