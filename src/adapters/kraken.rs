//! Kraken spot `AssetPairs`. The result is a map keyed by the venue's internal pair
//! name; the display (`wsname`) pair is the trading symbol and the internal `altname`
//! the alternate. Precisions are digit counts, the minimum order is in base units.
//! Dark-pool entries carry no `wsname` and are not book-tradeable.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

use super::{expect_json, min_lots_from_qty, skip_warn, step_from_decimals, validated};
use crate::{
	error::{RecordSkip, VenueError},
	fetch::RawFeedDocument,
	secdef::{CanonicalSecDef, ProductKind, QtyCcy, Venue, CFI_SPOT},
	utils::deser_value,
};

#[derive(Debug, Deserialize)]
struct Envelope {
	#[serde(default)]
	error: Vec<String>,
	#[serde(default)]
	result: BTreeMap<String, PairInfo>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct PairInfo {
	altname: String,
	#[serde(default)]
	wsname: Option<String>,
	quote: String,
	pair_decimals: u32,
	lot_decimals: u32,
	#[serde_as(as = "Option<DisplayFromStr>")]
	#[serde(default)]
	ordermin: Option<f64>,
	#[serde(default)]
	status: Option<String>,
}

fn map_row(s: &PairInfo) -> Result<Option<CanonicalSecDef>, RecordSkip> {
	let wsname = match &s.wsname {
		Some(wsname) => wsname,
		None => return Ok(None), // dark pool
	};
	if matches!(s.status.as_deref(), Some(status) if status != "online") {
		return Ok(None);
	}

	let ccy_a = wsname.split('/').next().unwrap_or_default().to_owned();
	if ccy_a.is_empty() || !wsname.contains('/') {
		return Err(RecordSkip::AmbiguousSymbol(wsname.clone()));
	}

	let lot_size = step_from_decimals(s.lot_decimals);
	let min_lots = min_lots_from_qty(s.ordermin.unwrap_or(0.0), lot_size)?;

	validated(CanonicalSecDef {
		sec_id: 0,
		symbol: wsname.clone(),
		alt_symbol: s.altname.clone(),
		description: String::new(),
		cfi_code: CFI_SPOT.to_owned(),
		exchange: Venue::KrakenSpot,
		product: ProductKind::Spot,
		tenor: String::new(),
		ccy_a,
		// the quote keeps Kraken's X/Z-prefixed class name, as downstream expects
		ccy_b: s.quote.clone(),
		qty_ccy: QtyCcy::A,
		contract_multiplier: 1.0,
		lot_size,
		min_lots,
		px_step: step_from_decimals(s.pair_decimals),
		expire_date: 0,
		expire_time: 0,
		pair: String::new(),
	})
	.map(Some)
}

pub fn normalize(doc: RawFeedDocument) -> Result<Vec<CanonicalSecDef>, VenueError> {
	let env: Envelope = deser_value(expect_json(doc)?)?;
	if !env.error.is_empty() {
		return Err(VenueError::Document(format!("venue reported errors: {:?}", env.error)));
	}

	// BTreeMap iteration gives the stable key order downstream diffing relies on
	let mut out = Vec::with_capacity(env.result.len());
	for s in env.result.values() {
		match map_row(s) {
			Ok(Some(def)) => out.push(def),
			Ok(None) => {}
			Err(skip) => skip_warn(Venue::KrakenSpot, &s.altname, &skip),
		}
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn doc() -> RawFeedDocument {
		RawFeedDocument::Json(json!({
			"error": [],
			"result": {
				"XXBTZUSD": {"altname": "XBTUSD", "wsname": "XBT/USD", "base": "XXBT", "quote": "ZUSD",
				             "pair_decimals": 1, "lot_decimals": 8, "ordermin": "0.0001", "status": "online"},
				"AAVEAUD": {"altname": "AAVEAUD", "wsname": "AAVE/AUD", "base": "AAVE", "quote": "ZAUD",
				            "pair_decimals": 2, "lot_decimals": 8, "ordermin": "0.05", "status": "online"},
				"XXBTZUSD.d": {"altname": "XBTUSD.d", "base": "XXBT", "quote": "ZUSD",
				               "pair_decimals": 1, "lot_decimals": 8},
				"STALE": {"altname": "STALE", "wsname": "ST/ALE", "base": "ST", "quote": "ALE",
				          "pair_decimals": 2, "lot_decimals": 4, "status": "cancel_only"}
			}
		}))
	}

	#[test]
	fn mapping_is_key_ordered_and_filtered() {
		let defs = normalize(doc()).unwrap();
		let symbols = defs.iter().map(|d| d.symbol.as_str()).collect::<Vec<_>>();
		assert_eq!(symbols, ["AAVE/AUD", "XBT/USD"]);

		let aave = &defs[0];
		assert_eq!(aave.alt_symbol, "AAVEAUD");
		assert_eq!((aave.ccy_a.as_str(), aave.ccy_b.as_str()), ("AAVE", "ZAUD"));
		assert_eq!(aave.px_step, 0.01);
		assert_eq!(aave.lot_size, 1e-8);
		assert_eq!(aave.min_lots, 5_000_000);
	}

	#[test]
	fn venue_error_array_is_fatal() {
		let doc = RawFeedDocument::Json(json!({"error": ["EService:Unavailable"]}));
		assert!(normalize(doc).is_err());
	}
}
