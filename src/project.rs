use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Result};
use ethers::abi::token::{LenientTokenizer, Tokenizer};
use ethers::abi::{Abi, Function, Token};
use serde::Deserialize;
use serde_json::Value;

use crate::error::TxError;

/// A compiled contract: its ABI and the bytecode used to deploy it.
#[derive(Debug, Clone)]
pub struct ContractType {
	pub name: String,
	pub abi: Abi,
	/// Creation bytecode; `None` for interfaces and abstract contracts.
	pub bytecode: Option<Vec<u8>>,
}

impl ContractType {
	/// Encode the creation payload for this contract: bytecode followed by
	/// ABI-encoded constructor arguments parsed from CLI strings.
	pub fn deployment_data(&self, args: &[String]) -> Result<Vec<u8>> {
		let code = match &self.bytecode {
			Some(code) if !code.is_empty() => code.clone(),
			_ => bail!("'{}' has no deployment bytecode", self.name),
		};

		let Some(constructor) = self.abi.constructor() else {
			if !args.is_empty() {
				bail!(
					"'{}' constructor takes 0 arguments but {} were given",
					self.name,
					args.len()
				);
			}
			return Ok(code);
		};

		if constructor.inputs.len() != args.len() {
			bail!(
				"'{}' constructor takes {} arguments but {} were given",
				self.name,
				constructor.inputs.len(),
				args.len()
			);
		}

		let tokens = constructor
			.inputs
			.iter()
			.zip(args)
			.map(|(param, arg)| {
				LenientTokenizer::tokenize(&param.kind, arg).map_err(|e| {
					anyhow!("invalid value '{arg}' for {} {}: {e}", param.kind, param.name)
				})
			})
			.collect::<Result<Vec<Token>>>()?;

		Ok(constructor.encode_input(code, &tokens)?)
	}
}

/// All contract artifacts found in a project's build directory.
#[derive(Debug, Default)]
pub struct Project {
	contracts: BTreeMap<String, ContractType>,
}

impl Project {
	/// Load every artifact under `build_dir`. A missing directory yields an
	/// empty project.
	pub fn load(build_dir: &Path) -> Result<Self> {
		let mut project = Self::default();
		if !build_dir.is_dir() {
			log::debug!("no build directory at {}", build_dir.display());
			return Ok(project);
		}

		for path in json_files(build_dir)? {
			let content = std::fs::read_to_string(&path)?;
			let json: Value = match serde_json::from_str(&content) {
				Ok(json) => json,
				Err(e) => {
					log::warn!("skipping {}: {e}", path.display());
					continue;
				}
			};
			let stem = path
				.file_stem()
				.and_then(|s| s.to_str())
				.unwrap_or_default()
				.to_owned();
			let contracts = match parse_artifact(&stem, json) {
				Ok(contracts) => contracts,
				Err(e) => {
					log::warn!("skipping artifact {}: {e:#}", path.display());
					continue;
				}
			};
			for contract in contracts {
				log::debug!("loaded contract '{}' from {}", contract.name, path.display());
				project.contracts.insert(contract.name.clone(), contract);
			}
		}

		Ok(project)
	}

	/// Look up a contract by name.
	pub fn get_contract(&self, name: &str) -> Result<&ContractType, TxError> {
		self.contracts
			.get(name)
			.ok_or_else(|| TxError::ContractNotFound(name.to_owned()))
	}

	pub fn contract_names(&self) -> impl Iterator<Item = &str> {
		self.contracts.keys().map(String::as_str)
	}

	/// Index every function of every contract by its 4-byte selector.
	pub fn method_registry(&self) -> MethodRegistry {
		let mut methods = HashMap::new();
		for contract in self.contracts.values() {
			for function in contract.abi.functions() {
				methods
					.entry(function.short_signature())
					.or_insert_with(|| function.clone());
			}
		}
		MethodRegistry { methods }
	}
}

/// Selector to function lookup used to name calls in traces.
#[derive(Debug, Default)]
pub struct MethodRegistry {
	methods: HashMap<[u8; 4], Function>,
}

impl MethodRegistry {
	pub fn lookup(&self, calldata: &[u8]) -> Option<&Function> {
		let selector: [u8; 4] = calldata.get(..4)?.try_into().ok()?;
		self.methods.get(&selector)
	}
}

// -- Artifact formats --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
	contract_name: Option<String>,
	abi: Option<Abi>,
	deployment_bytecode: Option<RawBytecode>,
	bytecode: Option<RawBytecode>,
}

/// Bytecode as emitted by the supported toolchains: a bare hex string,
/// Foundry's `{ "object": .. }`, or ethPM's `{ "bytecode": .. }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
	Hex(String),
	Object { object: String },
	EthPm { bytecode: Option<String> },
}

impl RawBytecode {
	fn decode(&self) -> Result<Option<Vec<u8>>> {
		let hex_str = match self {
			Self::Hex(s) | Self::Object { object: s } => s.as_str(),
			Self::EthPm { bytecode: Some(s) } => s.as_str(),
			Self::EthPm { bytecode: None } => return Ok(None),
		};
		let clean = hex_str.strip_prefix("0x").unwrap_or(hex_str);
		if clean.is_empty() {
			return Ok(None);
		}
		// Unlinked library references (`__$<hash>$__`) cannot be deployed as-is.
		if clean.contains("__") {
			log::debug!("bytecode has unlinked library references");
			return Ok(None);
		}
		Ok(Some(hex::decode(clean)?))
	}
}

/// Parse one artifact file. Package manifests with a `contractTypes` map
/// yield several contracts; single-contract files yield one, named by
/// `contractName` or the file stem. A bare ABI array is an interface.
fn parse_artifact(stem: &str, json: Value) -> Result<Vec<ContractType>> {
	if json.is_array() {
		return Ok(vec![ContractType {
			name: stem.to_owned(),
			abi: serde_json::from_value(json)?,
			bytecode: None,
		}]);
	}
	if let Some(Value::Object(types)) = json.get("contractTypes") {
		return types
			.iter()
			.filter_map(|(name, ty)| contract_from(name, ty.clone()).transpose())
			.collect();
	}
	Ok(contract_from(stem, json)?.into_iter().collect())
}

fn contract_from(fallback_name: &str, json: Value) -> Result<Option<ContractType>> {
	let raw: RawArtifact = serde_json::from_value(json)?;
	let Some(abi) = raw.abi else {
		return Ok(None);
	};
	let bytecode = match raw.deployment_bytecode.or(raw.bytecode) {
		Some(b) => b.decode()?,
		None => None,
	};
	Ok(Some(ContractType {
		name: raw.contract_name.unwrap_or_else(|| fallback_name.to_owned()),
		abi,
		bytecode,
	}))
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
	let mut files = Vec::new();
	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_dir() {
			files.extend(json_files(&path)?);
		} else if path.extension().and_then(|e| e.to_str()) == Some("json") {
			files.push(path);
		}
	}
	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn token_abi() -> Value {
		serde_json::json!([
			{
				"type": "constructor",
				"stateMutability": "nonpayable",
				"inputs": [
					{ "name": "name", "type": "string" },
					{ "name": "supply", "type": "uint256" }
				]
			},
			{
				"type": "function",
				"name": "transfer",
				"stateMutability": "nonpayable",
				"inputs": [
					{ "name": "to", "type": "address" },
					{ "name": "amount", "type": "uint256" }
				],
				"outputs": [{ "name": "", "type": "bool" }]
			}
		])
	}

	fn write(dir: &Path, rel: &str, json: Value) {
		let path = dir.join(rel);
		std::fs::create_dir_all(path.parent().unwrap()).unwrap();
		std::fs::write(path, json.to_string()).unwrap();
	}

	#[test]
	fn loads_ethpm_foundry_and_plain_artifacts() {
		let dir = tempfile::tempdir().unwrap();
		write(
			dir.path(),
			"Token.json",
			serde_json::json!({
				"contractName": "Token",
				"abi": token_abi(),
				"deploymentBytecode": { "bytecode": "0x6001" }
			}),
		);
		write(
			dir.path(),
			"Vault.sol/Vault.json",
			serde_json::json!({ "abi": [], "bytecode": { "object": "0x6002" } }),
		);
		write(dir.path(), "Plain.json", serde_json::json!({ "abi": [], "bytecode": "0x6003" }));

		let project = Project::load(dir.path()).unwrap();
		let names: Vec<_> = project.contract_names().collect();
		assert_eq!(names, ["Plain", "Token", "Vault"]);
		assert_eq!(project.get_contract("Vault").unwrap().bytecode, Some(vec![0x60, 0x02]));
	}

	#[test]
	fn loads_manifest_contract_types() {
		let dir = tempfile::tempdir().unwrap();
		write(
			dir.path(),
			"__local__.json",
			serde_json::json!({
				"contractTypes": {
					"Token": { "abi": token_abi(), "deploymentBytecode": { "bytecode": "0x6001" } },
					"IToken": { "abi": [], "deploymentBytecode": {} }
				}
			}),
		);

		let project = Project::load(dir.path()).unwrap();
		assert!(project.get_contract("Token").is_ok());
		assert_eq!(project.get_contract("IToken").unwrap().bytecode, None);
	}

	#[test]
	fn bare_abi_array_loads_as_interface() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "Good.json", serde_json::json!({ "abi": [], "bytecode": "0x6001" }));
		write(dir.path(), "IToken.json", token_abi());

		let project = Project::load(dir.path()).unwrap();
		assert!(project.get_contract("Good").is_ok());
		let iface = project.get_contract("IToken").unwrap();
		assert_eq!(iface.bytecode, None);
		let calldata = hex::decode("a9059cbb").unwrap();
		assert_eq!(project.method_registry().lookup(&calldata).unwrap().name, "transfer");
	}

	#[test]
	fn unlinked_bytecode_is_kept_for_its_abi() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "Good.json", serde_json::json!({ "abi": [], "bytecode": "0x6001" }));
		write(
			dir.path(),
			"UsesLib.json",
			serde_json::json!({
				"abi": token_abi(),
				"bytecode": { "object": "0x73__$ab12ab12ab12ab12ab12ab12ab12ab12ab$__6001" }
			}),
		);

		let project = Project::load(dir.path()).unwrap();
		assert!(project.get_contract("Good").is_ok());
		let lib_user = project.get_contract("UsesLib").unwrap();
		assert_eq!(lib_user.bytecode, None);
		assert!(lib_user.deployment_data(&["Tok".into(), "1".into()]).is_err());
	}

	#[test]
	fn unsupported_artifact_is_skipped() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "Good.json", serde_json::json!({ "abi": [], "bytecode": "0x6001" }));
		write(dir.path(), "Odd.json", serde_json::json!({ "abi": "not an abi" }));
		write(dir.path(), "BadHex.json", serde_json::json!({ "abi": [], "bytecode": "0xzz" }));

		let project = Project::load(dir.path()).unwrap();
		let names: Vec<_> = project.contract_names().collect();
		assert_eq!(names, ["Good"]);
	}

	#[test]
	fn missing_contract_is_reported() {
		let dir = tempfile::tempdir().unwrap();
		let project = Project::load(dir.path()).unwrap();
		let err = project.get_contract("Nope").unwrap_err();
		assert_eq!(err.to_string(), "No contract found with name 'Nope'.");
	}

	#[test]
	fn missing_build_dir_is_empty() {
		let dir = tempfile::tempdir().unwrap();
		let project = Project::load(&dir.path().join(".build")).unwrap();
		assert_eq!(project.contract_names().count(), 0);
	}

	fn token() -> ContractType {
		ContractType {
			name: "Token".into(),
			abi: serde_json::from_value(token_abi()).unwrap(),
			bytecode: Some(vec![0x60, 0x01]),
		}
	}

	#[test]
	fn constructor_args_are_encoded_after_bytecode() {
		let data = token().deployment_data(&["Tok".into(), "100".into()]).unwrap();
		assert_eq!(&data[..2], &[0x60, 0x01]);
		// string offset, uint256, string length, string body.
		assert_eq!(data.len(), 2 + 4 * 32);
		assert_eq!(data[2 + 63], 100);
	}

	#[test]
	fn constructor_arity_is_checked() {
		let err = token().deployment_data(&["Tok".into()]).unwrap_err();
		assert!(err.to_string().contains("takes 2 arguments but 1 were given"));
	}

	#[test]
	fn bad_constructor_value_is_rejected() {
		assert!(token().deployment_data(&["Tok".into(), "lots".into()]).is_err());
	}

	#[test]
	fn interfaces_cannot_be_deployed() {
		let mut iface = token();
		iface.bytecode = None;
		let err = iface.deployment_data(&[]).unwrap_err();
		assert_eq!(err.to_string(), "'Token' has no deployment bytecode");
	}

	#[test]
	fn registry_resolves_selectors() {
		let mut project = Project::default();
		project.contracts.insert("Token".into(), token());
		let registry = project.method_registry();

		let calldata = hex::decode("a9059cbb0000").unwrap();
		assert_eq!(registry.lookup(&calldata).unwrap().name, "transfer");
		assert!(registry.lookup(&[0xde, 0xad, 0xbe, 0xef]).is_none());
		assert!(registry.lookup(&[0xa9]).is_none());
	}
}
