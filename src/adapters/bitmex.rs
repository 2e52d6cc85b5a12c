//! BitMEX active-instrument list. One document covers perpetuals and dated futures;
//! the venue's `typ` field is already a CFI code and is passed through. Inverse
//! contracts denominate quantity in the quote currency.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{expect_json, expiry_fields, skip_warn, tenor_from_date, validated};
use crate::{
	error::{RecordSkip, VenueError},
	fetch::RawFeedDocument,
	secdef::{CanonicalSecDef, ProductKind, QtyCcy, Venue, TENOR_PERP},
	utils::deser_value,
};

const CFI_PERP: &str = "FFWCSX";
const CFI_DATED: &str = "FFCCSX";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Instrument {
	symbol: String,
	state: String,
	typ: String,
	underlying: String,
	quote_currency: String,
	#[serde(default)]
	is_inverse: bool,
	#[serde(default)]
	lot_size: Option<f64>,
	tick_size: f64,
	#[serde(default)]
	expiry: Option<String>,
}

/// XBT is BitMEX's local name for BTC; rewrite it so currencies line up across venues.
fn rewrite_ccy(ccy: &str) -> String {
	match ccy {
		"XBT" => "BTC".to_owned(),
		other => other.to_owned(),
	}
}

fn map_row(sec_id: u64, s: &Instrument) -> Result<Option<CanonicalSecDef>, RecordSkip> {
	if s.state != "Open" {
		return Ok(None);
	}

	let (product, tenor, expire_date, expire_time) = match s.typ.as_str() {
		CFI_PERP => (ProductKind::Swp, TENOR_PERP.to_owned(), 0, 0),
		CFI_DATED => {
			let raw = s.expiry.as_deref().ok_or(RecordSkip::MissingField("expiry"))?;
			let dt = DateTime::parse_from_rfc3339(raw).map_err(|_| RecordSkip::MissingField("expiry"))?;
			let (date, time) = expiry_fields(dt.with_timezone(&Utc));
			(ProductKind::Fut, tenor_from_date(date), date, time)
		}
		// indices, options etc. have no place in the reference-data set
		other => return Err(RecordSkip::UnsupportedProduct(other.to_owned())),
	};

	validated(CanonicalSecDef {
		sec_id,
		symbol: s.symbol.clone(),
		alt_symbol: s.symbol.to_lowercase(),
		description: String::new(),
		cfi_code: s.typ.clone(),
		exchange: Venue::BitMex,
		product,
		tenor,
		ccy_a: rewrite_ccy(&s.underlying),
		ccy_b: rewrite_ccy(&s.quote_currency),
		qty_ccy: if s.is_inverse { QtyCcy::B } else { QtyCcy::A },
		contract_multiplier: 1.0,
		lot_size: s.lot_size.unwrap_or(1.0),
		min_lots: 1,
		px_step: s.tick_size,
		expire_date,
		expire_time,
		pair: String::new(),
	})
	.map(Some)
}

pub fn normalize(doc: RawFeedDocument) -> Result<Vec<CanonicalSecDef>, VenueError> {
	let instruments: Vec<Instrument> = deser_value(expect_json(doc)?)?;

	let mut out = Vec::with_capacity(instruments.len());
	for s in &instruments {
		// sec ids follow the venue listing sequence of emitted records
		match map_row(out.len() as u64, s) {
			Ok(Some(def)) => out.push(def),
			Ok(None) => {}
			Err(skip) => skip_warn(Venue::BitMex, &s.symbol, &skip),
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
			{
				"symbol": "XBTUSD",
				"state": "Open",
				"typ": "FFWCSX",
				"underlying": "XBT",
				"quoteCurrency": "USD",
				"isInverse": true,
				"lotSize": 100.0,
				"tickSize": 0.5
			},
			{
				"symbol": "ETHZ23",
				"state": "Open",
				"typ": "FFCCSX",
				"underlying": "ETH",
				"quoteCurrency": "XBT",
				"lotSize": 1.0,
				"tickSize": 1e-5,
				"expiry": "2023-12-29T12:00:00.000Z"
			},
			{
				"symbol": ".BXBT",
				"state": "Open",
				"typ": "MRIXXX",
				"underlying": "XBT",
				"quoteCurrency": "USD",
				"tickSize": 0.01
			},
			{
				"symbol": "GONE",
				"state": "Settled",
				"typ": "FFCCSX",
				"underlying": "ADA",
				"quoteCurrency": "USD",
				"tickSize": 0.0001,
				"expiry": "2020-06-26T12:00:00.000Z"
			}
		]))
	}

	#[test]
	fn perpetual_and_dated_rows() {
		let defs = normalize(doc()).unwrap();
		assert_eq!(defs.len(), 2);

		let perp = &defs[0];
		assert_eq!(perp.sec_id, 0);
		assert_eq!(perp.symbol, "XBTUSD");
		assert_eq!(perp.product, ProductKind::Swp);
		assert_eq!(perp.tenor, TENOR_PERP);
		assert_eq!(perp.qty_ccy, QtyCcy::B);
		assert_eq!((perp.ccy_a.as_str(), perp.ccy_b.as_str()), ("BTC", "USD"));
		assert_eq!(perp.cfi_code, "FFWCSX");
		assert_eq!(perp.lot_size, 100.0);

		let fut = &defs[1];
		assert_eq!(fut.sec_id, 1);
		assert_eq!(fut.product, ProductKind::Fut);
		assert_eq!((fut.expire_date, fut.expire_time), (20231229, 43200));
		assert_eq!(fut.tenor, "231229");
		assert_eq!(fut.qty_ccy, QtyCcy::A);
		assert_eq!(fut.ccy_b, "BTC");
	}

	#[test]
	fn indices_and_settled_instruments_dropped() {
		let defs = normalize(doc()).unwrap();
		assert!(defs.iter().all(|d| d.symbol != ".BXBT" && d.symbol != "GONE"));
	}
}
