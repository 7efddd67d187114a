//! Integration tests that hit a local development node (anvil, hardhat)
//! with the default test mnemonic.
//!
//! These are marked `#[ignore]` by default because they require a running
//! node on port 8545. Run them explicitly with:
//!
//!   cargo test --test integration -- --ignored

use ethers::types::{TransactionRequest, U256};
use evm_tx::accounts::mnemonic::TestAccount;
use evm_tx::accounts::Account;
use evm_tx::commands::trace::dedup_hashes;
use evm_tx::config::Config;
use evm_tx::project::Project;
use evm_tx::rpc::RpcClient;
use evm_tx::trace::{CallFrame, TraceRenderer};

const LOCAL_RPC: &str = "http://127.0.0.1:8545";

fn dev_account(index: u32) -> TestAccount {
	TestAccount::derive(&Config::default().accounts.test.mnemonic, index).unwrap()
}

#[test]
fn project_artifacts_feed_the_trace_renderer() {
	let dir = tempfile::tempdir().unwrap();
	std::fs::write(
		dir.path().join("Counter.json"),
		serde_json::json!({
			"contractName": "Counter",
			"abi": [{
				"type": "function",
				"name": "increment",
				"stateMutability": "nonpayable",
				"inputs": [],
				"outputs": []
			}],
			"deploymentBytecode": { "bytecode": "0x00" }
		})
		.to_string(),
	)
	.unwrap();

	let project = Project::load(dir.path()).unwrap();
	let registry = project.method_registry();
	let frame: CallFrame = serde_json::from_value(serde_json::json!({
		"type": "CALL",
		"from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
		"to": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
		"input": "0xd09de08a"
	}))
	.unwrap();

	let line = TraceRenderer::new(&registry, false).frame_line(&frame);
	assert_eq!(line, "CALL: 0x5fbdb2315678afecb367f032d93f642f64180aa3.increment()");
}

#[test]
fn repeated_trace_hashes_are_traced_once() {
	let hashes: Vec<String> = ["0x01", "0x02", "0x01"].iter().map(|s| s.to_string()).collect();
	assert_eq!(dedup_hashes(&hashes).len(), 2);
}

#[tokio::test]
#[ignore]
async fn dev_account_has_funds() {
	let rpc = RpcClient::new(LOCAL_RPC).unwrap();
	let balance = rpc.get_balance(dev_account(0).address()).await.expect("balance query failed");
	assert!(!balance.is_zero(), "dev account should be funded");
}

#[tokio::test]
#[ignore]
async fn transfer_then_trace() {
	let rpc = RpcClient::new(LOCAL_RPC).unwrap();
	let sender = dev_account(0);
	let receiver = dev_account(1).address();

	let before = rpc.get_balance(receiver).await.unwrap();
	let tx = TransactionRequest::new().to(receiver).value(U256::from(1_000u64));
	let receipt = sender.send_transaction(&rpc, tx).await.expect("transfer failed");
	let after = rpc.get_balance(receiver).await.unwrap();
	assert_eq!(after - before, U256::from(1_000u64));

	let hash = format!("{:?}", receipt.transaction_hash);
	let tx = rpc.get_transaction(&hash).await.unwrap();
	assert_eq!(tx.from, sender.address());

	let tree = rpc.get_call_tree(&hash).await.expect("debug_traceTransaction failed");
	let root: CallFrame = serde_json::from_value(tree).unwrap();
	assert_eq!(root.call_type, "CALL");
	assert_eq!(root.to, Some(receiver));
}

#[tokio::test]
#[ignore]
async fn deploy_empty_contract() {
	let rpc = RpcClient::new(LOCAL_RPC).unwrap();
	let tx = TransactionRequest::new().data(vec![0x00]);
	let receipt = dev_account(2).send_transaction(&rpc, tx).await.expect("deploy failed");
	assert!(receipt.contract_address.is_some());
}

#[tokio::test]
#[ignore]
async fn unknown_transaction_is_reported() {
	let rpc = RpcClient::new(LOCAL_RPC).unwrap();
	let hash = format!("0x{}", "ee".repeat(32));
	let err = rpc.get_transaction(&hash).await.unwrap_err();
	assert_eq!(err.to_string(), format!("Transaction '{hash}' not found."));
}
