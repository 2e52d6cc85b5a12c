//! Binance `exchangeInfo` across the three metadata endpoints: spot (`api`),
//! USDT-margined derivatives (`fapi`) and COIN-margined derivatives (`dapi`). All three
//! share the filter-array encoding of tick/lot sizes; the derivative endpoints add
//! contract type, delivery date and (COIN only) contract size and underlying pair.

use serde::Deserialize;
use serde_json::Value;

use super::{expect_json, expiry_from_ms, min_lots_from_qty, skip_warn, split_pair, validated};
use crate::{
	error::{RecordSkip, VenueError},
	fetch::RawFeedDocument,
	secdef::{CanonicalSecDef, ProductKind, QtyCcy, Venue, CFI_FUT, CFI_SPOT, TENOR_PERP},
	utils::deser_value,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
	Spot,
	UsdtFutures,
	CoinFutures,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
	symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
	symbol: String,
	#[serde(default)]
	status: Option<String>,
	#[serde(default)]
	contract_status: Option<String>,
	base_asset: String,
	quote_asset: String,
	#[serde(default)]
	contract_type: Option<String>,
	#[serde(default)]
	delivery_date: Option<i64>,
	#[serde(default)]
	pair: Option<String>,
	#[serde(default)]
	contract_size: Option<f64>,
	filters: Vec<Value>,
}

impl SymbolInfo {
	fn is_trading(&self, mode: Mode) -> bool {
		let status = match mode {
			// dapi reports contractStatus; everything else uses status
			Mode::CoinFutures => self.contract_status.as_deref().or(self.status.as_deref()),
			_ => self.status.as_deref(),
		};
		status == Some("TRADING")
	}

	/// Pulls the canonical steps out of the filter array: PRICE_FILTER/tickSize and
	/// LOT_SIZE/stepSize+minQty. Both are already absolute steps on Binance.
	fn steps(&self) -> Result<(f64, f64, i64), RecordSkip> {
		let mut px_step = None;
		let mut lot = None;
		for f in &self.filters {
			match f["filterType"].as_str() {
				Some("PRICE_FILTER") => px_step = f["tickSize"].as_str().and_then(|s| s.parse::<f64>().ok()),
				Some("LOT_SIZE") => {
					let step = f["stepSize"].as_str().and_then(|s| s.parse::<f64>().ok());
					let min_qty = f["minQty"].as_str().and_then(|s| s.parse::<f64>().ok());
					lot = step.zip(min_qty);
				}
				_ => {}
			}
		}
		let px_step = px_step.ok_or(RecordSkip::MissingField("PRICE_FILTER.tickSize"))?;
		let (lot_size, min_qty) = lot.ok_or(RecordSkip::MissingField("LOT_SIZE"))?;
		let min_lots = min_lots_from_qty(min_qty, lot_size)?;
		Ok((px_step, lot_size, min_lots))
	}
}

/// Contract-type token to (product kind, tenor) for the derivative endpoints. Binance
/// lists perpetuals and dated quarterlies through the same document.
fn classify_contract(token: &str, delivery_ms: Option<i64>) -> Result<(ProductKind, String, u32, u32), RecordSkip> {
	let tenor = match token {
		"PERPETUAL" => return Ok((ProductKind::Swp, TENOR_PERP.to_owned(), 0, 0)),
		"CURRENT_QUARTER" => "CQ",
		"NEXT_QUARTER" => "NQ",
		"CURRENT_MONTH" => "CM",
		"NEXT_MONTH" => "NM",
		other => return Err(RecordSkip::UnknownTenor(other.to_owned())),
	};
	let ms = delivery_ms.ok_or(RecordSkip::MissingField("deliveryDate"))?;
	let (expire_date, expire_time) = expiry_from_ms(ms)?;
	Ok((ProductKind::Fut, tenor.to_owned(), expire_date, expire_time))
}

fn map_row(mode: Mode, s: &SymbolInfo) -> Result<Option<CanonicalSecDef>, RecordSkip> {
	if !s.is_trading(mode) {
		return Ok(None);
	}
	let (px_step, lot_size, min_lots) = s.steps()?;

	let (product, tenor, expire_date, expire_time) = match mode {
		Mode::Spot => (ProductKind::Spot, String::new(), 0, 0),
		Mode::UsdtFutures | Mode::CoinFutures => {
			let token = s.contract_type.as_deref().ok_or(RecordSkip::MissingField("contractType"))?;
			classify_contract(token, s.delivery_date)?
		}
	};

	// The pair field of coin-margined contracts names the settlement pair while the
	// symbol carries the tenor suffix (e.g. BTCUSD_240329); consistency-check it.
	let pair = match mode {
		Mode::CoinFutures => {
			let pair = s.pair.clone().ok_or(RecordSkip::MissingField("pair"))?;
			let (a, b) = split_pair(&pair).or_else(|_| Ok::<_, RecordSkip>((s.base_asset.clone(), s.quote_asset.clone())))?;
			if a != s.base_asset || b != s.quote_asset {
				return Err(RecordSkip::AmbiguousSymbol(s.symbol.clone()));
			}
			pair
		}
		_ => String::new(),
	};

	let contract_multiplier = match mode {
		Mode::CoinFutures => s.contract_size.ok_or(RecordSkip::MissingField("contractSize"))?,
		_ => 1.0,
	};

	validated(CanonicalSecDef {
		sec_id: 0,
		symbol: s.symbol.clone(),
		alt_symbol: s.symbol.to_lowercase(),
		description: String::new(),
		cfi_code: if mode == Mode::Spot { CFI_SPOT } else { CFI_FUT }.to_owned(),
		exchange: Venue::Binance,
		product,
		tenor,
		ccy_a: s.base_asset.clone(),
		ccy_b: s.quote_asset.clone(),
		qty_ccy: QtyCcy::A,
		contract_multiplier,
		lot_size,
		min_lots,
		px_step,
		expire_date,
		expire_time,
		pair,
	})
	.map(Some)
}

pub fn normalize(mode: Mode, doc: RawFeedDocument) -> Result<Vec<CanonicalSecDef>, VenueError> {
	let info: ExchangeInfo = deser_value(expect_json(doc)?)?;

	let mut out = Vec::with_capacity(info.symbols.len());
	for s in &info.symbols {
		match map_row(mode, s) {
			Ok(Some(def)) => out.push(def),
			Ok(None) => {}
			Err(skip) => skip_warn(Venue::Binance, &s.symbol, &skip),
		}
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn spot_doc() -> RawFeedDocument {
		RawFeedDocument::Json(json!({
			"symbols": [
				{
					"symbol": "BTCUSDT",
					"status": "TRADING",
					"baseAsset": "BTC",
					"quoteAsset": "USDT",
					"filters": [
						{"filterType": "PRICE_FILTER", "tickSize": "0.01", "minPrice": "0.01"},
						{"filterType": "LOT_SIZE", "stepSize": "0.001", "minQty": "0.002"}
					]
				},
				{
					"symbol": "HALTED",
					"status": "BREAK",
					"baseAsset": "AAA",
					"quoteAsset": "BBB",
					"filters": []
				}
			]
		}))
	}

	#[test]
	fn spot_mapping_and_filtering() {
		let defs = normalize(Mode::Spot, spot_doc()).unwrap();
		assert_eq!(defs.len(), 1);
		let d = &defs[0];
		assert_eq!(d.symbol, "BTCUSDT");
		assert_eq!(d.alt_symbol, "btcusdt");
		assert_eq!(d.product, ProductKind::Spot);
		assert_eq!((d.ccy_a.as_str(), d.ccy_b.as_str()), ("BTC", "USDT"));
		assert_eq!(d.px_step, 0.01);
		assert_eq!(d.lot_size, 0.001);
		assert_eq!(d.min_lots, 2);
		assert_eq!(d.cfi_code, CFI_SPOT);
		assert_eq!((d.expire_date, d.expire_time), (0, 0));
	}

	#[test]
	fn coin_futures_delivery_and_pair() {
		let doc = RawFeedDocument::Json(json!({
			"symbols": [{
				"symbol": "BTCUSD_231229",
				"contractStatus": "TRADING",
				"contractType": "CURRENT_QUARTER",
				"deliveryDate": 1_703_808_000_000i64,
				"baseAsset": "BTC",
				"quoteAsset": "USD",
				"pair": "BTCUSD",
				"contractSize": 100.0,
				"filters": [
					{"filterType": "PRICE_FILTER", "tickSize": "0.1"},
					{"filterType": "LOT_SIZE", "stepSize": "1", "minQty": "1"}
				]
			}]
		}));
		let defs = normalize(Mode::CoinFutures, doc).unwrap();
		assert_eq!(defs.len(), 1);
		let d = &defs[0];
		assert_eq!(d.product, ProductKind::Fut);
		assert_eq!(d.tenor, "CQ");
		assert_eq!((d.expire_date, d.expire_time), (20231229, 0));
		assert_eq!(d.pair, "BTCUSD");
		assert_eq!(d.contract_multiplier, 100.0);
		assert_eq!(d.cfi_code, CFI_FUT);
	}

	#[test]
	fn usdt_perpetual_gets_perp_tenor() {
		let doc = RawFeedDocument::Json(json!({
			"symbols": [{
				"symbol": "ETHUSDT",
				"status": "TRADING",
				"contractType": "PERPETUAL",
				"deliveryDate": 4_133_404_800_000i64,
				"baseAsset": "ETH",
				"quoteAsset": "USDT",
				"filters": [
					{"filterType": "PRICE_FILTER", "tickSize": "0.01"},
					{"filterType": "LOT_SIZE", "stepSize": "0.001", "minQty": "0.001"}
				]
			}]
		}));
		let defs = normalize(Mode::UsdtFutures, doc).unwrap();
		assert_eq!(defs.len(), 1);
		assert_eq!(defs[0].product, ProductKind::Swp);
		assert_eq!(defs[0].tenor, TENOR_PERP);
		assert_eq!((defs[0].expire_date, defs[0].expire_time), (0, 0));
	}

	#[test]
	fn unknown_contract_type_is_skipped_not_fatal() {
		let doc = RawFeedDocument::Json(json!({
			"symbols": [{
				"symbol": "ETHUSDT_XX",
				"status": "TRADING",
				"contractType": "SOMETHING_NEW",
				"baseAsset": "ETH",
				"quoteAsset": "USDT",
				"filters": [
					{"filterType": "PRICE_FILTER", "tickSize": "0.01"},
					{"filterType": "LOT_SIZE", "stepSize": "0.001", "minQty": "0.001"}
				]
			}]
		}));
		let defs = normalize(Mode::UsdtFutures, doc).unwrap();
		assert!(defs.is_empty());
	}

	#[test]
	fn malformed_document_is_fatal_for_the_venue() {
		let doc = RawFeedDocument::Json(json!({"code": -1, "msg": "system maintenance"}));
		assert!(normalize(Mode::Spot, doc).is_err());
	}
}
