use ethers::abi::{Function, Token};
use ethers::types::{Address, Bytes, I256, U256};
use serde::Deserialize;

use crate::project::MethodRegistry;
use crate::units::abbreviate;

/// Longest argument shown in a non-verbose trace line.
const SHORT_ARG_LEN: usize = 24;

/// One call in the tree produced by the node's `callTracer`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
	#[serde(rename = "type")]
	pub call_type: String,
	pub from: Address,
	#[serde(default)]
	pub to: Option<Address>,
	#[serde(default)]
	pub value: Option<U256>,
	#[serde(default)]
	pub gas_used: Option<U256>,
	#[serde(default)]
	pub input: Bytes,
	#[serde(default)]
	pub output: Option<Bytes>,
	#[serde(default)]
	pub error: Option<String>,
	#[serde(default)]
	pub revert_reason: Option<String>,
	#[serde(default)]
	pub calls: Vec<CallFrame>,
}

impl CallFrame {
	fn is_create(&self) -> bool {
		self.call_type.to_ascii_uppercase().starts_with("CREATE")
	}
}

/// Renders call trees as an indented tree, naming methods from the
/// project's ABIs where the selector is known.
pub struct TraceRenderer<'a> {
	registry: &'a MethodRegistry,
	verbose: bool,
}

impl<'a> TraceRenderer<'a> {
	pub fn new(registry: &'a MethodRegistry, verbose: bool) -> Self {
		Self { registry, verbose }
	}

	/// Render the full trace of `tx_hash`, including its header.
	pub fn render(&self, tx_hash: &str, origin: Address, root: &CallFrame) -> String {
		let mut out = format!("Call trace for '{tx_hash}'\ntx.origin={origin:?}\n");
		out.push_str(&self.frame_line(root));
		out.push('\n');
		self.render_children(&root.calls, "", &mut out);
		out
	}

	fn render_children(&self, calls: &[CallFrame], prefix: &str, out: &mut String) {
		for (i, frame) in calls.iter().enumerate() {
			let last = i + 1 == calls.len();
			let (branch, indent) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };
			out.push_str(prefix);
			out.push_str(branch);
			out.push_str(&self.frame_line(frame));
			out.push('\n');
			self.render_children(&frame.calls, &format!("{prefix}{indent}"), out);
		}
	}

	/// A single line: `CALL: 0xto.method(args) -> output [value] [gas]`.
	pub fn frame_line(&self, frame: &CallFrame) -> String {
		let target = frame.to.map(|a| format!("{a:?}")).unwrap_or_else(|| "0x".into());
		let mut line = format!("{}: {target}", frame.call_type.to_ascii_uppercase());

		let function = if frame.is_create() || frame.input.is_empty() {
			None
		} else {
			self.registry.lookup(&frame.input)
		};

		if !frame.is_create() && !frame.input.is_empty() {
			line.push('.');
			line.push_str(&self.call_signature(function, &frame.input));
		}

		if self.verbose {
			if let Some(output) = frame.output.as_ref().filter(|o| !o.is_empty()) {
				line.push_str(" -> ");
				line.push_str(&self.return_value(function, output));
			}
		}

		if let Some(value) = frame.value.filter(|v| !v.is_zero()) {
			line.push_str(&format!(" [{value} value]"));
		}

		if self.verbose {
			if let Some(gas) = frame.gas_used {
				line.push_str(&format!(" [{gas} gas]"));
			}
		}

		if let Some(error) = &frame.error {
			match &frame.revert_reason {
				Some(reason) => line.push_str(&format!(" [reverted: {error}: {reason}]")),
				None => line.push_str(&format!(" [reverted: {error}]")),
			}
		}

		line
	}

	fn call_signature(&self, function: Option<&Function>, input: &[u8]) -> String {
		let Some(function) = function else {
			let selector = hex::encode(&input[..input.len().min(4)]);
			if self.verbose && input.len() > 4 {
				return format!("<0x{selector}>(0x{})", hex::encode(&input[4..]));
			}
			return format!("<0x{selector}>()");
		};

		let args = match function.decode_input(&input[4..]) {
			Ok(tokens) => function
				.inputs
				.iter()
				.zip(&tokens)
				.map(|(param, token)| {
					let value = self.shorten(format_token(token));
					if param.name.is_empty() {
						value
					} else {
						format!("{}={value}", param.name)
					}
				})
				.collect::<Vec<_>>()
				.join(", "),
			Err(_) => self.shorten(format!("0x{}", hex::encode(&input[4..]))),
		};
		format!("{}({args})", function.name)
	}

	fn return_value(&self, function: Option<&Function>, output: &[u8]) -> String {
		let decoded = function.and_then(|f| f.decode_output(output).ok());
		match decoded {
			Some(tokens) if tokens.len() == 1 => format_token(&tokens[0]),
			Some(tokens) => format!(
				"({})",
				tokens.iter().map(format_token).collect::<Vec<_>>().join(", ")
			),
			None => format!("0x{}", hex::encode(output)),
		}
	}

	fn shorten(&self, s: String) -> String {
		if self.verbose {
			s
		} else {
			abbreviate(&s, SHORT_ARG_LEN)
		}
	}
}

/// Human-readable form of a decoded ABI value. Integers print in decimal,
/// byte strings and addresses as `0x` hex.
pub fn format_token(token: &Token) -> String {
	match token {
		Token::Address(a) => format!("{a:?}"),
		Token::Uint(u) => u.to_string(),
		Token::Int(i) => I256::from_raw(*i).to_string(),
		Token::Bool(b) => b.to_string(),
		Token::String(s) => format!("{s:?}"),
		Token::Bytes(b) | Token::FixedBytes(b) => format!("0x{}", hex::encode(b)),
		Token::Array(items) | Token::FixedArray(items) => {
			format!("[{}]", items.iter().map(format_token).collect::<Vec<_>>().join(", "))
		}
		Token::Tuple(items) => {
			format!("({})", items.iter().map(format_token).collect::<Vec<_>>().join(", "))
		}
	}
}
