//! LATOKEN pair listing. The one venue here with stable numeric pair ids, which become
//! the canonical `sec_id`. Precisions are digit counts; the minimum order is in base
//! units.

use serde::Deserialize;

use super::{expect_json, min_lots_from_qty, skip_warn, step_from_decimals, validated};
use crate::{
	error::{RecordSkip, VenueError},
	fetch::RawFeedDocument,
	secdef::{CanonicalSecDef, ProductKind, QtyCcy, Venue, CFI_SPOT},
	utils::deser_value,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PairInfo {
	pair_id: u64,
	base_currency: String,
	quoted_currency: String,
	price_decimals: u32,
	amount_decimals: u32,
	#[serde(default)]
	min_qty: f64,
	#[serde(default)]
	base_currency_name: Option<String>,
	#[serde(default)]
	quoted_currency_name: Option<String>,
}

fn map_row(s: &PairInfo) -> Result<Option<CanonicalSecDef>, RecordSkip> {
	let lot_size = step_from_decimals(s.amount_decimals);
	let min_lots = min_lots_from_qty(s.min_qty, lot_size)?;

	let description = match (&s.base_currency_name, &s.quoted_currency_name) {
		(Some(a), Some(b)) => format!("{a} / {b}"),
		_ => String::new(),
	};

	validated(CanonicalSecDef {
		sec_id: s.pair_id,
		symbol: format!("{}/{}", s.base_currency, s.quoted_currency),
		alt_symbol: String::new(),
		description,
		cfi_code: CFI_SPOT.to_owned(),
		exchange: Venue::Latoken,
		product: ProductKind::Spot,
		tenor: String::new(),
		ccy_a: s.base_currency.clone(),
		ccy_b: s.quoted_currency.clone(),
		qty_ccy: QtyCcy::A,
		contract_multiplier: 1.0,
		lot_size,
		min_lots,
		px_step: step_from_decimals(s.price_decimals),
		expire_date: 0,
		expire_time: 0,
		pair: String::new(),
	})
	.map(Some)
}

pub fn normalize(doc: RawFeedDocument) -> Result<Vec<CanonicalSecDef>, VenueError> {
	let pairs: Vec<PairInfo> = deser_value(expect_json(doc)?)?;

	let mut out = Vec::with_capacity(pairs.len());
	for s in &pairs {
		match map_row(s) {
			Ok(Some(def)) => out.push(def),
			Ok(None) => {}
			Err(skip) => skip_warn(Venue::Latoken, &format!("{}/{}", s.base_currency, s.quoted_currency), &skip),
		}
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn venue_ids_and_decimals() {
		let doc = RawFeedDocument::Json(json!([
			{"pairId": 29, "baseCurrency": "LA", "quotedCurrency": "ETH",
			 "priceDecimals": 8, "amountDecimals": 1, "minQty": 10.0,
			 "baseCurrencyName": "LATOKEN", "quotedCurrencyName": "Ethereum"},
			{"pairId": 154, "baseCurrency": "PAY", "quotedCurrency": "ETH",
			 "priceDecimals": 7, "amountDecimals": 1, "minQty": 2.0}
		]));
		let defs = normalize(doc).unwrap();
		assert_eq!(defs.len(), 2);

		let la = &defs[0];
		assert_eq!(la.sec_id, 29);
		assert_eq!(la.symbol, "LA/ETH");
		assert_eq!(la.description, "LATOKEN / Ethereum");
		assert_eq!(la.lot_size, 0.1);
		assert_eq!(la.min_lots, 100);
		assert_eq!(la.px_step, 1e-8);

		assert_eq!(defs[1].sec_id, 154);
		assert_eq!(defs[1].description, "");
		assert_eq!(defs[1].min_lots, 20);
	}

	#[test]
	fn zero_min_qty_still_needs_one_lot() {
		let doc = RawFeedDocument::Json(json!([
			{"pairId": 152, "baseCurrency": "HTKN", "quotedCurrency": "LA",
			 "priceDecimals": 8, "amountDecimals": 1, "minQty": 0.0}
		]));
		let defs = normalize(doc).unwrap();
		assert_eq!(defs[0].min_lots, 1);
	}
}
