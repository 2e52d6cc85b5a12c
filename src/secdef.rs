use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tenor sentinel for instruments without an expiration (perpetual swaps).
pub const TENOR_PERP: &str = "PERP";

/// CFI code for simple spot pairs.
pub const CFI_SPOT: &str = "MRCXXX";
/// Generic CFI code for futures and swaps, used when the venue does not report one itself.
pub const CFI_FUT: &str = "FXXXXX";

/// Canonical venue names. One entry per supported venue (or venue+mode where the
/// spot and derivative platforms are effectively separate exchanges).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
	#[default]
	#[serde(alias = "binance")]
	Binance,
	#[serde(rename = "BitMEX", alias = "bitmex")]
	BitMex,
	#[serde(rename = "BitFinex", alias = "bitfinex")]
	BitFinex,
	#[serde(alias = "huobi")]
	Huobi,
	#[serde(rename = "KrakenSpot", alias = "kraken", alias = "kraken_spot")]
	KrakenSpot,
	#[serde(rename = "LATOKEN", alias = "latoken")]
	Latoken,
	#[serde(rename = "LMAX", alias = "lmax")]
	Lmax,
	#[serde(rename = "OKEX", alias = "okex")]
	Okex,
}

impl Venue {
	pub const ALL: [Venue; 8] = [
		Venue::Binance,
		Venue::BitMex,
		Venue::BitFinex,
		Venue::Huobi,
		Venue::KrakenSpot,
		Venue::Latoken,
		Venue::Lmax,
		Venue::Okex,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Venue::Binance => "Binance",
			Venue::BitMex => "BitMEX",
			Venue::BitFinex => "BitFinex",
			Venue::Huobi => "Huobi",
			Venue::KrakenSpot => "KrakenSpot",
			Venue::Latoken => "LATOKEN",
			Venue::Lmax => "LMAX",
			Venue::Okex => "OKEX",
		}
	}
}

impl std::fmt::Display for Venue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for Venue {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"binance" => Ok(Venue::Binance),
			"bitmex" => Ok(Venue::BitMex),
			"bitfinex" => Ok(Venue::BitFinex),
			"huobi" => Ok(Venue::Huobi),
			"kraken" | "kraken_spot" | "krakenspot" => Ok(Venue::KrakenSpot),
			"latoken" => Ok(Venue::Latoken),
			"lmax" => Ok(Venue::Lmax),
			"okex" => Ok(Venue::Okex),
			_ => Err(format!("unknown venue: {s}")),
		}
	}
}

/// Which product family a venue endpoint serves. Only meaningful for venues that split
/// their metadata across several endpoints (Binance, Huobi, OKEX); single-endpoint
/// venues take no mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductMode {
	Spot,
	Futures,
	UsdtFutures,
	CoinFutures,
	CoinSwap,
	UsdtSwap,
	Swap,
}

impl std::fmt::Display for ProductMode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			ProductMode::Spot => "spot",
			ProductMode::Futures => "futures",
			ProductMode::UsdtFutures => "usdt_futures",
			ProductMode::CoinFutures => "coin_futures",
			ProductMode::CoinSwap => "coin_swap",
			ProductMode::UsdtSwap => "usdt_swap",
			ProductMode::Swap => "swap",
		};
		write!(f, "{s}")
	}
}

impl FromStr for ProductMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"spot" => Ok(ProductMode::Spot),
			"futures" | "future" => Ok(ProductMode::Futures),
			"usdt_futures" => Ok(ProductMode::UsdtFutures),
			"coin_futures" => Ok(ProductMode::CoinFutures),
			"coin_swap" => Ok(ProductMode::CoinSwap),
			"usdt_swap" => Ok(ProductMode::UsdtSwap),
			"swap" => Ok(ProductMode::Swap),
			_ => Err(format!("unknown product mode: {s}")),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductKind {
	#[default]
	Spot,
	Fut,
	Swp,
}

/// Whether traded quantity is denominated in the base (`A`) or quote (`B`) currency.
/// `B` shows up on inverse (coin-margined) contracts only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QtyCcy {
	#[default]
	A,
	B,
}

/// The venue-independent instrument record this whole crate exists to produce.
///
/// Field semantics follow the downstream reference-data contract: steps are always
/// absolute (never "decimal places"), expiration is a `YYYYMMDD` date plus
/// seconds-since-midnight UTC, and `min_lots` counts `lot_size` increments.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSecDef {
	/// Venue-provided where stable and unique (LATOKEN pair id, BitMEX listing
	/// sequence), otherwise 0 and assigned by the output sink.
	pub sec_id: u64,
	/// Venue's native trading symbol, unique within the venue.
	pub symbol: String,
	/// Wire-channel / subscription symbol where it differs from `symbol`, else empty.
	pub alt_symbol: String,
	pub description: String,
	pub cfi_code: String,
	pub exchange: Venue,
	pub product: ProductKind,
	/// Maturity bucket for futures, [TENOR_PERP] for swaps, empty for spot.
	pub tenor: String,
	pub ccy_a: String,
	pub ccy_b: String,
	pub qty_ccy: QtyCcy,
	pub contract_multiplier: f64,
	/// Minimal quantity increment, as an absolute step.
	pub lot_size: f64,
	/// Minimal order size, in `lot_size` units.
	pub min_lots: i64,
	/// Minimal price increment, as an absolute step.
	pub px_step: f64,
	/// `YYYYMMDD`, or 0 for non-expiring instruments.
	pub expire_date: u32,
	/// Seconds since midnight UTC on `expire_date`, or 0.
	pub expire_time: u32,
	/// Settlement-currency pair of coin-margined futures, empty otherwise.
	pub pair: String,
}

impl CanonicalSecDef {
	/// Checks the cross-field invariants. Violations are reported with the first
	/// offending condition; a record failing this must never be emitted.
	pub fn validate(&self) -> Result<(), String> {
		if self.symbol.is_empty() {
			return Err("empty symbol".to_owned());
		}
		if self.ccy_a.is_empty() || self.ccy_b.is_empty() {
			return Err(format!("missing currency: CcyA={:?} CcyB={:?}", self.ccy_a, self.ccy_b));
		}
		if self.ccy_a == self.ccy_b {
			return Err(format!("CcyA == CcyB == {:?}", self.ccy_a));
		}
		if !(self.lot_size > 0.0) {
			return Err(format!("LotSize must be positive, got {}", self.lot_size));
		}
		if !(self.px_step > 0.0) {
			return Err(format!("PxStep must be positive, got {}", self.px_step));
		}
		if self.min_lots < 1 {
			return Err(format!("MinLots must be >= 1, got {}", self.min_lots));
		}
		match self.product {
			ProductKind::Spot =>
				if self.expire_date != 0 || self.expire_time != 0 || !self.tenor.is_empty() {
					return Err("SPOT record with expiration or tenor".to_owned());
				},
			ProductKind::Swp =>
				if self.expire_date != 0 || self.expire_time != 0 || self.tenor != TENOR_PERP {
					return Err(format!("SWP record must carry the {TENOR_PERP} tenor and no expiration"));
				},
			ProductKind::Fut =>
				if self.tenor.is_empty() {
					return Err("FUT record with empty tenor".to_owned());
				},
		}
		Ok(())
	}
}
