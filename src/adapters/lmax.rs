//! LMAX instrument reference data. The only venue here without a JSON feed: the
//! snapshot is a CSV table of typed fields, and that difference stays inside this
//! adapter. FX symbols split on the '/' separator.

use serde::Deserialize;
use tracing::warn;

use super::{expect_text, min_lots_from_qty, skip_warn, split_pair, validated};
use crate::{
	error::{RecordSkip, VenueError},
	fetch::RawFeedDocument,
	secdef::{CanonicalSecDef, ProductKind, QtyCcy, Venue, CFI_SPOT},
};

#[derive(Debug, Deserialize)]
struct Row {
	id: u64,
	name: String,
	symbol: String,
	tradable: String,
	tick_size: f64,
	quantity_increment: f64,
	min_quantity: f64,
}

fn map_row(s: &Row) -> Result<Option<CanonicalSecDef>, RecordSkip> {
	if !s.tradable.eq_ignore_ascii_case("yes") {
		return Ok(None);
	}
	let (ccy_a, ccy_b) = split_pair(&s.symbol)?;
	let min_lots = min_lots_from_qty(s.min_quantity, s.quantity_increment)?;

	validated(CanonicalSecDef {
		sec_id: s.id,
		symbol: s.symbol.clone(),
		alt_symbol: String::new(),
		description: s.name.clone(),
		cfi_code: CFI_SPOT.to_owned(),
		exchange: Venue::Lmax,
		product: ProductKind::Spot,
		tenor: String::new(),
		ccy_a,
		ccy_b,
		qty_ccy: QtyCcy::A,
		contract_multiplier: 1.0,
		lot_size: s.quantity_increment,
		min_lots,
		px_step: s.tick_size,
		expire_date: 0,
		expire_time: 0,
		pair: String::new(),
	})
	.map(Some)
}

pub fn normalize(doc: RawFeedDocument) -> Result<Vec<CanonicalSecDef>, VenueError> {
	let text = expect_text(doc)?;
	let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(text.as_bytes());

	let mut out = Vec::new();
	for record in reader.deserialize::<Row>() {
		let row = match record {
			Ok(row) => row,
			Err(e) => {
				// one bad row is a record problem, not a document problem
				warn!(venue = %Venue::Lmax, error = %e, "skipping malformed csv row");
				continue;
			}
		};
		match map_row(&row) {
			Ok(Some(def)) => out.push(def),
			Ok(None) => {}
			Err(skip) => skip_warn(Venue::Lmax, &row.symbol, &skip),
		}
	}
	Ok(out)
}
