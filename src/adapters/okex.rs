//! OKEX v3 instruments across spot, dated futures and perpetual swaps. Numerics all
//! arrive as strings; steps are already absolute. Dated futures settle at 16:00 HK,
//! i.e. a fixed 08:00 UTC on the delivery date, and their tenor is the shortened
//! delivery date. Swaps are treated as futures without expiration.

use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

use super::{expect_json, min_lots_from_qty, skip_warn, tenor_from_date, validated};
use crate::{
	error::{RecordSkip, VenueError},
	fetch::RawFeedDocument,
	secdef::{CanonicalSecDef, ProductKind, QtyCcy, Venue, CFI_FUT, CFI_SPOT, TENOR_PERP},
	utils::deser_value,
};

/// 16:00 HK (GMT+8, no DST) on the delivery date.
const DELIVERY_TIME_UTC: u32 = 28800;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
	Spot,
	Futures,
	Swap,
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct SpotInstrument {
	instrument_id: String,
	base_currency: String,
	quote_currency: String,
	#[serde_as(as = "DisplayFromStr")]
	size_increment: f64,
	#[serde_as(as = "DisplayFromStr")]
	min_size: f64,
	#[serde_as(as = "DisplayFromStr")]
	tick_size: f64,
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct FuturesInstrument {
	instrument_id: String,
	underlying_index: String,
	quote_currency: String,
	#[serde_as(as = "DisplayFromStr")]
	contract_val: f64,
	#[serde_as(as = "DisplayFromStr")]
	trade_increment: f64,
	#[serde_as(as = "DisplayFromStr")]
	tick_size: f64,
	delivery: String,
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct SwapInstrument {
	instrument_id: String,
	underlying_index: String,
	coin: String,
	quote_currency: String,
	#[serde_as(as = "DisplayFromStr")]
	contract_val: f64,
	#[serde_as(as = "DisplayFromStr")]
	size_increment: f64,
	#[serde_as(as = "DisplayFromStr")]
	tick_size: f64,
}

fn map_spot(s: &SpotInstrument) -> Result<Option<CanonicalSecDef>, RecordSkip> {
	let min_lots = min_lots_from_qty(s.min_size, s.size_increment)?;

	validated(CanonicalSecDef {
		sec_id: 0,
		symbol: s.instrument_id.clone(),
		alt_symbol: String::new(),
		description: String::new(),
		cfi_code: CFI_SPOT.to_owned(),
		exchange: Venue::Okex,
		product: ProductKind::Spot,
		tenor: String::new(),
		ccy_a: s.base_currency.clone(),
		ccy_b: s.quote_currency.clone(),
		qty_ccy: QtyCcy::A,
		contract_multiplier: 1.0,
		lot_size: s.size_increment,
		min_lots,
		px_step: s.tick_size,
		expire_date: 0,
		expire_time: 0,
		pair: String::new(),
	})
	.map(Some)
}

fn map_futures(s: &FuturesInstrument) -> Result<Option<CanonicalSecDef>, RecordSkip> {
	let expire_date = s.delivery.replace('-', "").parse::<u32>().map_err(|_| RecordSkip::MissingField("delivery"))?;

	validated(CanonicalSecDef {
		sec_id: 0,
		symbol: s.instrument_id.clone(),
		alt_symbol: String::new(),
		description: String::new(),
		cfi_code: CFI_FUT.to_owned(),
		exchange: Venue::Okex,
		product: ProductKind::Fut,
		tenor: tenor_from_date(expire_date),
		ccy_a: s.underlying_index.clone(),
		ccy_b: s.quote_currency.clone(),
		// contract size is fixed in the quote currency (coin-margined)
		qty_ccy: QtyCcy::B,
		contract_multiplier: s.contract_val,
		lot_size: s.trade_increment,
		min_lots: 1,
		px_step: s.tick_size,
		expire_date,
		expire_time: DELIVERY_TIME_UTC,
		pair: String::new(),
	})
	.map(Some)
}

fn map_swap(s: &SwapInstrument) -> Result<Option<CanonicalSecDef>, RecordSkip> {
	if s.underlying_index != s.coin {
		return Err(RecordSkip::Invariant(format!("underlying_index {:?} != coin {:?}", s.underlying_index, s.coin)));
	}

	validated(CanonicalSecDef {
		sec_id: 0,
		symbol: s.instrument_id.clone(),
		alt_symbol: String::new(),
		description: String::new(),
		cfi_code: CFI_FUT.to_owned(),
		exchange: Venue::Okex,
		product: ProductKind::Swp,
		tenor: TENOR_PERP.to_owned(),
		ccy_a: s.underlying_index.clone(),
		ccy_b: s.quote_currency.clone(),
		qty_ccy: QtyCcy::B,
		contract_multiplier: s.contract_val,
		lot_size: s.size_increment,
		min_lots: 1,
		px_step: s.tick_size,
		expire_date: 0,
		expire_time: 0,
		pair: String::new(),
	})
	.map(Some)
}

pub fn normalize(mode: Mode, doc: RawFeedDocument) -> Result<Vec<CanonicalSecDef>, VenueError> {
	let json = expect_json(doc)?;

	macro_rules! collect {
		($row_ty:ty, $map:expr) => {{
			let rows: Vec<$row_ty> = deser_value(json)?;
			let mut out = Vec::with_capacity(rows.len());
			for s in &rows {
				match $map(s) {
					Ok(Some(def)) => out.push(def),
					Ok(None) => {}
					Err(skip) => skip_warn(Venue::Okex, &s.instrument_id, &skip),
				}
			}
			Ok(out)
		}};
	}

	match mode {
		Mode::Spot => collect!(SpotInstrument, map_spot),
		Mode::Futures => collect!(FuturesInstrument, map_futures),
		Mode::Swap => collect!(SwapInstrument, map_swap),
	}
}
