pub mod binance;
pub mod bitfinex;
pub mod bitmex;
pub mod huobi;
pub mod kraken;
pub mod latoken;
pub mod lmax;
pub mod okex;

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::Serialize;
use tracing::warn;
use url::Url;

use crate::{
	error::{ConfigError, RecordSkip, VenueError},
	fetch::RawFeedDocument,
	secdef::{CanonicalSecDef, ProductMode, Venue},
};

/// One fully-selected normalization capability: a venue plus (where the venue splits its
/// metadata across endpoints) a product mode. Selected once at configuration time; the
/// per-venue special cases live behind this dispatch, not in the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Adapter {
	BinanceSpot,
	BinanceFuturesUsdt,
	BinanceFuturesCoin,
	BitMex,
	BitFinex,
	HuobiSpot,
	HuobiFutures,
	HuobiSwapCoin,
	HuobiSwapUsdt,
	KrakenSpot,
	Latoken,
	Lmax,
	OkexSpot,
	OkexFutures,
	OkexSwap,
}

impl Adapter {
	/// Resolves a configured (venue, mode) pair, failing fast on combinations the venue
	/// does not serve.
	pub fn new(venue: Venue, mode: Option<ProductMode>) -> Result<Self, ConfigError> {
		use ProductMode::*;
		match (venue, mode) {
			(Venue::Binance, Some(Spot)) => Ok(Adapter::BinanceSpot),
			(Venue::Binance, Some(UsdtFutures)) => Ok(Adapter::BinanceFuturesUsdt),
			(Venue::Binance, Some(CoinFutures)) => Ok(Adapter::BinanceFuturesCoin),
			(Venue::Huobi, Some(Spot)) => Ok(Adapter::HuobiSpot),
			(Venue::Huobi, Some(Futures)) => Ok(Adapter::HuobiFutures),
			(Venue::Huobi, Some(CoinSwap)) => Ok(Adapter::HuobiSwapCoin),
			(Venue::Huobi, Some(UsdtSwap)) => Ok(Adapter::HuobiSwapUsdt),
			(Venue::Okex, Some(Spot)) => Ok(Adapter::OkexSpot),
			(Venue::Okex, Some(Futures)) => Ok(Adapter::OkexFutures),
			(Venue::Okex, Some(Swap)) => Ok(Adapter::OkexSwap),
			(Venue::Binance | Venue::Huobi | Venue::Okex, None) => Err(ConfigError::ModeRequired { venue }),
			(Venue::BitMex, None) => Ok(Adapter::BitMex),
			(Venue::BitFinex, None | Some(Spot)) => Ok(Adapter::BitFinex),
			(Venue::KrakenSpot, None | Some(Spot)) => Ok(Adapter::KrakenSpot),
			(Venue::Latoken, None | Some(Spot)) => Ok(Adapter::Latoken),
			(Venue::Lmax, None | Some(Spot)) => Ok(Adapter::Lmax),
			(_, Some(mode)) => Err(ConfigError::UnsupportedMode { venue, mode }),
		}
	}

	pub fn venue(&self) -> Venue {
		match self {
			Adapter::BinanceSpot | Adapter::BinanceFuturesUsdt | Adapter::BinanceFuturesCoin => Venue::Binance,
			Adapter::BitMex => Venue::BitMex,
			Adapter::BitFinex => Venue::BitFinex,
			Adapter::HuobiSpot | Adapter::HuobiFutures | Adapter::HuobiSwapCoin | Adapter::HuobiSwapUsdt => Venue::Huobi,
			Adapter::KrakenSpot => Venue::KrakenSpot,
			Adapter::Latoken => Venue::Latoken,
			Adapter::Lmax => Venue::Lmax,
			Adapter::OkexSpot | Adapter::OkexFutures | Adapter::OkexSwap => Venue::Okex,
		}
	}

	/// LMAX publishes a tabular instrument list rather than JSON.
	pub fn is_tabular(&self) -> bool {
		matches!(self, Adapter::Lmax)
	}

	/// The venue's public metadata endpoint, where one exists (LMAX reference data is
	/// distributed as files only).
	pub fn default_url(&self) -> Option<Url> {
		let url = match self {
			Adapter::BinanceSpot => "https://api.binance.com/api/v1/exchangeInfo",
			Adapter::BinanceFuturesUsdt => "https://fapi.binance.com/fapi/v1/exchangeInfo",
			Adapter::BinanceFuturesCoin => "https://dapi.binance.com/dapi/v1/exchangeInfo",
			Adapter::BitMex => "https://www.bitmex.com/api/v1/instrument/active",
			Adapter::BitFinex => "https://api.bitfinex.com/v1/symbols_details",
			Adapter::HuobiSpot => "https://api.huobi.pro/v1/common/symbols",
			Adapter::HuobiFutures => "https://api.hbdm.com/api/v1/contract_contract_info",
			Adapter::HuobiSwapCoin => "https://api.hbdm.com/swap-api/v1/swap_contract_info",
			Adapter::HuobiSwapUsdt => "https://api.hbdm.com/linear-swap-api/v1/swap_contract_info",
			Adapter::KrakenSpot => "https://api.kraken.com/0/public/AssetPairs",
			Adapter::Latoken => "https://api.latoken.com/api/v1/ExchangeInfo/pairs",
			Adapter::Lmax => return None,
			Adapter::OkexSpot => "https://www.okex.com/api/spot/v3/instruments",
			Adapter::OkexFutures => "https://www.okex.com/api/futures/v3/instruments",
			Adapter::OkexSwap => "https://www.okex.com/api/swap/v3/instruments",
		};
		Some(Url::parse(url).expect("endpoint table entries are valid urls"))
	}

	/// Runs the venue's normalization on one snapshot. Pure except for skip diagnostics.
	pub fn run(&self, doc: RawFeedDocument) -> Result<Vec<CanonicalSecDef>, VenueError> {
		match self {
			Adapter::BinanceSpot => binance::normalize(binance::Mode::Spot, doc),
			Adapter::BinanceFuturesUsdt => binance::normalize(binance::Mode::UsdtFutures, doc),
			Adapter::BinanceFuturesCoin => binance::normalize(binance::Mode::CoinFutures, doc),
			Adapter::BitMex => bitmex::normalize(doc),
			Adapter::BitFinex => bitfinex::normalize(doc),
			Adapter::HuobiSpot => huobi::normalize(huobi::Mode::Spot, doc),
			Adapter::HuobiFutures => huobi::normalize(huobi::Mode::Futures, doc),
			Adapter::HuobiSwapCoin => huobi::normalize(huobi::Mode::CoinSwap, doc),
			Adapter::HuobiSwapUsdt => huobi::normalize(huobi::Mode::UsdtSwap, doc),
			Adapter::KrakenSpot => kraken::normalize(doc),
			Adapter::Latoken => latoken::normalize(doc),
			Adapter::Lmax => lmax::normalize(doc),
			Adapter::OkexSpot => okex::normalize(okex::Mode::Spot, doc),
			Adapter::OkexFutures => okex::normalize(okex::Mode::Futures, doc),
			Adapter::OkexSwap => okex::normalize(okex::Mode::Swap, doc),
		}
	}
}

impl std::fmt::Display for Adapter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mode = match self {
			Adapter::BinanceSpot | Adapter::HuobiSpot | Adapter::OkexSpot => Some("spot"),
			Adapter::BinanceFuturesUsdt => Some("usdt_futures"),
			Adapter::BinanceFuturesCoin => Some("coin_futures"),
			Adapter::HuobiFutures | Adapter::OkexFutures => Some("futures"),
			Adapter::HuobiSwapCoin => Some("coin_swap"),
			Adapter::HuobiSwapUsdt => Some("usdt_swap"),
			Adapter::OkexSwap => Some("swap"),
			_ => None,
		};
		match mode {
			Some(mode) => write!(f, "{}:{mode}", self.venue()),
			None => write!(f, "{}", self.venue()),
		}
	}
}

//=============================================================================
// Shared conversion helpers (every adapter funnels its raw units through these)
//=============================================================================

pub(crate) fn expect_json(doc: RawFeedDocument) -> Result<serde_json::Value, VenueError> {
	match doc {
		RawFeedDocument::Json(v) => Ok(v),
		RawFeedDocument::Text(_) => Err(VenueError::Document("expected a JSON document, got raw text".to_owned())),
	}
}

pub(crate) fn expect_text(doc: RawFeedDocument) -> Result<String, VenueError> {
	match doc {
		RawFeedDocument::Text(s) => Ok(s),
		RawFeedDocument::Json(_) => Err(VenueError::Document("expected a tabular document, got JSON".to_owned())),
	}
}

/// Digit-count precision to an absolute step: `4 -> 0.0001`, `0 -> 1.0`.
pub(crate) fn step_from_decimals(decimals: u32) -> f64 {
	10f64.powi(-(decimals as i32))
}

/// Minimum order size in base units to a lot count. The ratio must be integral up to fp
/// noise; anything else is a data-quality problem and skips the record instead of being
/// truncated.
pub(crate) fn min_lots_from_qty(min_qty: f64, lot_size: f64) -> Result<i64, RecordSkip> {
	let ratio = min_qty / lot_size;
	let nearest = ratio.round();
	if (ratio - nearest).abs() > 1e-6 * ratio.abs().max(1.0) {
		return Err(RecordSkip::NonIntegralMinLots { min_qty, lot_size });
	}
	Ok((nearest as i64).max(1))
}

/// Splits a composite pair symbol into (base, quote): explicit separator when present,
/// fixed 3+3 split when the symbol is exactly 6 chars, otherwise the split is ambiguous
/// and the record must be skipped.
pub(crate) fn split_pair(symbol: &str) -> Result<(String, String), RecordSkip> {
	for sep in [':', '/', '-'] {
		if symbol.contains(sep) {
			let parts = symbol.split(sep).collect::<Vec<&str>>();
			if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
				return Ok((parts[0].to_owned(), parts[1].to_owned()));
			}
			return Err(RecordSkip::AmbiguousSymbol(symbol.to_owned()));
		}
	}
	// byte index 3 is only a valid cut on all-ASCII symbols
	if symbol.len() == 6 && symbol.is_char_boundary(3) {
		return Ok((symbol[..3].to_owned(), symbol[3..].to_owned()));
	}
	Err(RecordSkip::AmbiguousSymbol(symbol.to_owned()))
}

/// (YYYYMMDD, seconds-since-midnight) in UTC.
pub(crate) fn expiry_fields(dt: DateTime<Utc>) -> (u32, u32) {
	let date = dt.year() as u32 * 10000 + dt.month() * 100 + dt.day();
	let time = dt.hour() * 3600 + dt.minute() * 60 + dt.second();
	(date, time)
}

/// Millisecond-epoch delivery timestamp to canonical expiration fields.
pub(crate) fn expiry_from_ms(ms: i64) -> Result<(u32, u32), RecordSkip> {
	let dt = DateTime::<Utc>::from_timestamp_millis(ms).ok_or(RecordSkip::MissingField("deliveryDate"))?;
	Ok(expiry_fields(dt))
}

/// Expiration-derived short tenor code, `YYMMDD` (the OKEX convention).
pub(crate) fn tenor_from_date(yyyymmdd: u32) -> String {
	format!("{:06}", yyyymmdd % 1_000_000)
}

/// Final gate before emission: a record violating the model invariants is a skip, never
/// a partial emit.
pub(crate) fn validated(def: CanonicalSecDef) -> Result<CanonicalSecDef, RecordSkip> {
	def.validate().map_err(RecordSkip::Invariant)?;
	Ok(def)
}

pub(crate) fn skip_warn(venue: Venue, symbol: &str, skip: &RecordSkip) {
	warn!(%venue, symbol, error = %skip, "skipping instrument");
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decimals_to_step() {
		assert_eq!(step_from_decimals(0), 1.0);
		assert_eq!(step_from_decimals(4), 0.0001);
		assert_eq!(step_from_decimals(8), 1e-8);
	}

	#[test]
	fn min_lots_derivation() {
		assert_eq!(min_lots_from_qty(0.002, 0.001), Ok(2));
		assert_eq!(min_lots_from_qty(25.0, 1e-8), Ok(2_500_000_000));
		// 0-minimum clamps up to one lot
		assert_eq!(min_lots_from_qty(0.0, 0.1), Ok(1));
		assert!(matches!(min_lots_from_qty(0.0025, 0.001), Err(RecordSkip::NonIntegralMinLots { .. })));
	}

	#[test]
	fn pair_splitting() {
		assert_eq!(split_pair("BTCUSD").unwrap(), ("BTC".to_owned(), "USD".to_owned()));
		assert_eq!(split_pair("BTC/USDT").unwrap(), ("BTC".to_owned(), "USDT".to_owned()));
		assert_eq!(split_pair("BTC:USDT").unwrap(), ("BTC".to_owned(), "USDT".to_owned()));
		assert_eq!(split_pair("BTC-USDT").unwrap(), ("BTC".to_owned(), "USDT".to_owned()));
		// 7 chars, no separator: the 3/3 rule only applies to exactly 6
		assert!(matches!(split_pair("BTCUSDT"), Err(RecordSkip::AmbiguousSymbol(_))));
		assert!(matches!(split_pair("A/B/C"), Err(RecordSkip::AmbiguousSymbol(_))));
		// 6 bytes but byte 3 falls inside a multibyte char: a skip, never a panic
		assert!(matches!(split_pair("ab\u{e9}CD"), Err(RecordSkip::AmbiguousSymbol(_))));
		assert!(matches!(split_pair("\u{e9}\u{e9}\u{e9}"), Err(RecordSkip::AmbiguousSymbol(_))));
	}

	#[test]
	fn ms_epoch_expiry() {
		// 2023-11-14 22:13:20 UTC
		assert_eq!(expiry_from_ms(1_700_000_000_000), Ok((20231114, 80000)));
		// exact midnight has both fields at their floor
		assert_eq!(expiry_from_ms(1_703_808_000_000), Ok((20231229, 0)));
	}

	#[test]
	fn tenor_short_code() {
		assert_eq!(tenor_from_date(20210326), "210326");
		assert_eq!(tenor_from_date(20240105), "240105");
	}

	#[test]
	fn adapter_resolution() {
		assert_eq!(Adapter::new(Venue::Huobi, Some(ProductMode::CoinSwap)), Ok(Adapter::HuobiSwapCoin));
		assert_eq!(Adapter::new(Venue::BitMex, None), Ok(Adapter::BitMex));
		assert_eq!(Adapter::new(Venue::Huobi, None), Err(ConfigError::ModeRequired { venue: Venue::Huobi }));
		assert_eq!(
			Adapter::new(Venue::KrakenSpot, Some(ProductMode::Futures)),
			Err(ConfigError::UnsupportedMode {
				venue: Venue::KrakenSpot,
				mode: ProductMode::Futures
			})
		);
	}
}
