//! BitFinex v1 `symbols_details`. Spot only. The wire symbol is the `t`-prefixed pair;
//! price granularity comes as a digit count; currency names need the venue-local
//! aliases rewritten (`F0` derivative suffix, `UST` for USDT) before emission.

use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

use super::{expect_json, skip_warn, split_pair, step_from_decimals, validated};
use crate::{
	error::{RecordSkip, VenueError},
	fetch::RawFeedDocument,
	secdef::{CanonicalSecDef, ProductKind, QtyCcy, Venue, CFI_SPOT},
	utils::deser_value,
};

#[serde_as]
#[derive(Debug, Deserialize)]
struct SymbolDetails {
	pair: String,
	price_precision: u32,
	#[serde_as(as = "DisplayFromStr")]
	minimum_order_size: f64,
}

fn rewrite_ccy(ccy: &str) -> String {
	let ccy = ccy.strip_suffix("F0").unwrap_or(ccy);
	match ccy {
		"UST" => "USDT".to_owned(),
		other => other.to_owned(),
	}
}

fn map_row(s: &SymbolDetails) -> Result<Option<CanonicalSecDef>, RecordSkip> {
	let pair = s.pair.to_uppercase();
	// 6-char pairs split 3/3, longer ones carry an explicit ':'
	let (a, b) = split_pair(&pair)?;

	validated(CanonicalSecDef {
		sec_id: 0,
		symbol: format!("t{pair}"),
		alt_symbol: pair.clone(),
		description: String::new(),
		cfi_code: CFI_SPOT.to_owned(),
		exchange: Venue::BitFinex,
		product: ProductKind::Spot,
		tenor: String::new(),
		ccy_a: rewrite_ccy(&a),
		ccy_b: rewrite_ccy(&b),
		qty_ccy: QtyCcy::A,
		contract_multiplier: 1.0,
		lot_size: s.minimum_order_size,
		min_lots: 1,
		px_step: step_from_decimals(s.price_precision),
		expire_date: 0,
		expire_time: 0,
		pair: String::new(),
	})
	.map(Some)
}

pub fn normalize(doc: RawFeedDocument) -> Result<Vec<CanonicalSecDef>, VenueError> {
	let symbols: Vec<SymbolDetails> = deser_value(expect_json(doc)?)?;

	let mut out = Vec::with_capacity(symbols.len());
	for s in &symbols {
		match map_row(s) {
			Ok(Some(def)) => out.push(def),
			Ok(None) => {}
			Err(skip) => skip_warn(Venue::BitFinex, &s.pair, &skip),
		}
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn doc() -> RawFeedDocument {
		RawFeedDocument::Json(json!([
			{"pair": "btcusd", "price_precision": 5, "minimum_order_size": "0.0006"},
			{"pair": "btcust", "price_precision": 5, "minimum_order_size": "0.0006"},
			{"pair": "dusk:usd", "price_precision": 5, "minimum_order_size": "200.0"},
			{"pair": "btcf0:ustf0", "price_precision": 1, "minimum_order_size": "0.0002"},
			{"pair": "unsplittable", "price_precision": 5, "minimum_order_size": "1.0"}
		]))
	}

	#[test]
	fn symbol_prefix_and_splits() {
		let defs = normalize(doc()).unwrap();
		assert_eq!(defs.len(), 4);

		assert_eq!(defs[0].symbol, "tBTCUSD");
		assert_eq!(defs[0].alt_symbol, "BTCUSD");
		assert_eq!((defs[0].ccy_a.as_str(), defs[0].ccy_b.as_str()), ("BTC", "USD"));
		assert_eq!(defs[0].px_step, 1e-5);
		assert_eq!(defs[0].lot_size, 0.0006);

		// UST alias rewritten on a 3/3 split
		assert_eq!(defs[1].ccy_b, "USDT");
		// explicit ':' separator
		assert_eq!((defs[2].ccy_a.as_str(), defs[2].ccy_b.as_str()), ("DUSK", "USD"));
		// F0 suffixes stripped
		assert_eq!((defs[3].ccy_a.as_str(), defs[3].ccy_b.as_str()), ("BTC", "USDT"));
	}

	#[test]
	fn ambiguous_symbol_skipped_with_diagnostic() {
		let defs = normalize(doc()).unwrap();
		assert!(defs.iter().all(|d| d.alt_symbol != "UNSPLITTABLE"));
	}
}
