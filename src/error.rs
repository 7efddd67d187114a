use thiserror::Error;

/// Failures that are reported to the user as a plain abort message.
///
/// Anything outside this set (I/O, malformed artifacts, transport
/// failures) propagates as an ordinary `anyhow` error.
#[derive(Debug, Error)]
pub enum TxError {
	#[error("Missing account '{0}'.")]
	MissingAccount(String),

	#[error("No account with address '{0}'.")]
	UnknownAddress(String),

	#[error("No account with alias '{0}'.")]
	UnknownAlias(String),

	#[error("No contract found with name '{0}'.")]
	ContractNotFound(String),

	#[error("Account required to deploy '{0}'")]
	SignatureRequired(String),

	#[error("'--pretty' not currently supported on ecosystem '{0}'.")]
	UnsupportedEcosystem(String),

	#[error("Transaction '{0}' not found.")]
	TransactionNotFound(String),

	#[error("Unknown network '{0}'.")]
	UnknownNetwork(String),

	#[error("{method} RPC error: {error}")]
	Rpc { method: String, error: serde_json::Value },
}
