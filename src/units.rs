use ethers::types::U256;
use ethers::utils::parse_units;

/// Decimal places kept by `--pretty` balances.
pub const PRETTY_PLACES: u32 = 8;

// -- CLI value parsing --

/// Parse a `--value` argument into wei.
///
/// All-digit strings are taken as wei. Anything else must be an amount
/// with a unit (`1 ether`, `2.5gwei`) or a `0x`-prefixed hex integer.
pub fn parse_value(raw: &str) -> Result<U256, String> {
	let raw = raw.trim();
	if raw.is_empty() {
		return Err("value must not be empty".into());
	}

	if raw.bytes().all(|b| b.is_ascii_digit()) {
		return U256::from_dec_str(raw).map_err(|e| format!("invalid value '{raw}': {e}"));
	}

	if let Some(hex) = raw.strip_prefix("0x") {
		return U256::from_str_radix(hex, 16).map_err(|e| format!("invalid hex value '{raw}': {e}"));
	}

	let split = raw
		.find(|c: char| c.is_ascii_alphabetic())
		.ok_or_else(|| format!("cannot convert '{raw}' to an integer"))?;
	let (amount, unit) = raw.split_at(split);
	let amount = amount.trim();
	let unit = unit.trim().to_ascii_lowercase();
	if amount.is_empty() {
		return Err(format!("missing amount in '{raw}'"));
	}
	if amount.starts_with('-') {
		return Err(format!("value must not be negative: '{raw}'"));
	}

	parse_units(amount, unit.as_str())
		.map(U256::from)
		.map_err(|e| format!("cannot convert '{raw}' to an integer: {e}"))
}

// -- Balance display --

/// Render `balance` (in base units) as a decimal with `decimals` places,
/// rounded half-to-even to [`PRETTY_PLACES`]. Trailing zeros are dropped
/// and whole numbers print without a fractional part.
pub fn format_pretty_balance(balance: U256, decimals: u32) -> String {
	let places = decimals.min(PRETTY_PLACES);
	let scale = U256::exp10((decimals - places) as usize);

	let mut rounded = balance / scale;
	if scale > U256::one() {
		let rem = balance % scale;
		let half = scale / 2;
		if rem > half || (rem == half && rounded.bit(0)) {
			rounded += U256::one();
		}
	}

	let unit = U256::exp10(places as usize);
	let whole = rounded / unit;
	let frac = rounded % unit;
	if frac.is_zero() {
		return whole.to_string();
	}

	let digits = format!("{:0>width$}", frac.to_string(), width = places as usize);
	format!("{whole}.{}", digits.trim_end_matches('0'))
}

// -- Trace display --

/// Shorten `s` to at most `max` characters, keeping its head and a
/// four-character tail around `..`.
pub fn abbreviate(s: &str, max: usize) -> String {
	let len = s.chars().count();
	if len <= max || max < 8 {
		return s.to_owned();
	}
	let head: String = s.chars().take(max - 6).collect();
	let tail: String = s.chars().skip(len - 4).collect();
	format!("{head}..{tail}")
}
