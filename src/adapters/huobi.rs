//! Huobi across its four metadata endpoints: spot (`api.huobi.pro`, kebab-case fields,
//! digit-count precisions) and the three hbdm derivative feeds (snake_case fields,
//! absolute steps, `contract_status` numeric flag). The venue does not guarantee a
//! listing order, so every mode sorts by native symbol — downstream diffing depends on
//! a stable order.

use serde::Deserialize;

use super::{expect_json, min_lots_from_qty, skip_warn, step_from_decimals, validated};
use crate::{
	error::{RecordSkip, VenueError},
	fetch::RawFeedDocument,
	secdef::{CanonicalSecDef, ProductKind, QtyCcy, Venue, CFI_FUT, CFI_SPOT, TENOR_PERP},
	utils::deser_value,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
	Spot,
	Futures,
	CoinSwap,
	UsdtSwap,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
	#[serde(default)]
	status: Option<String>,
	#[serde(default = "Vec::new")]
	data: Vec<T>,
}

fn unwrap_envelope<T>(env: Envelope<T>) -> Result<Vec<T>, VenueError> {
	if env.status.as_deref() == Some("error") {
		return Err(VenueError::Document("venue returned an error envelope".to_owned()));
	}
	Ok(env.data)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SpotSymbol {
	symbol: String,
	base_currency: String,
	quote_currency: String,
	price_precision: u32,
	amount_precision: u32,
	min_order_amt: f64,
	state: String,
	/// Present on leveraged ETP entries only; those are not plain spot pairs.
	#[serde(default)]
	underlying: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContractInfo {
	symbol: String,
	contract_code: String,
	#[serde(default)]
	contract_type: Option<String>,
	contract_size: f64,
	price_tick: f64,
	contract_status: i64,
	#[serde(default)]
	delivery_date: Option<String>,
}

/// Maturity-bucket tokens of the dated contracts.
fn tenor_code(token: &str) -> Result<&'static str, RecordSkip> {
	match token {
		"this_week" => Ok("CW"),
		"next_week" => Ok("NW"),
		"quarter" => Ok("CQ"),
		"next_quarter" => Ok("NQ"),
		other => Err(RecordSkip::UnknownTenor(other.to_owned())),
	}
}

fn map_spot(s: &SpotSymbol) -> Result<Option<CanonicalSecDef>, RecordSkip> {
	if s.underlying.is_some() || s.state != "online" {
		return Ok(None);
	}
	let lot_size = step_from_decimals(s.amount_precision);
	let min_lots = min_lots_from_qty(s.min_order_amt, lot_size)?;

	validated(CanonicalSecDef {
		sec_id: 0,
		symbol: s.symbol.clone(),
		alt_symbol: s.symbol.clone(),
		description: String::new(),
		cfi_code: CFI_SPOT.to_owned(),
		exchange: Venue::Huobi,
		product: ProductKind::Spot,
		tenor: String::new(),
		ccy_a: s.base_currency.clone(),
		ccy_b: s.quote_currency.clone(),
		qty_ccy: QtyCcy::A,
		contract_multiplier: 1.0,
		lot_size,
		min_lots,
		px_step: step_from_decimals(s.price_precision),
		expire_date: 0,
		expire_time: 0,
		pair: String::new(),
	})
	.map(Some)
}

fn map_contract(mode: Mode, s: &ContractInfo) -> Result<Option<CanonicalSecDef>, RecordSkip> {
	if s.contract_status != 1 {
		return Ok(None);
	}

	let (product, tenor, alt_symbol, ccy_b, expire_date) = match mode {
		Mode::Futures => {
			let token = s.contract_type.as_deref().ok_or(RecordSkip::MissingField("contract_type"))?;
			let code = tenor_code(token)?;
			// the wire-channel symbol carries the bucket suffix, eg BTC_CQ
			let alt = format!("{}_{code}", s.symbol);
			let expire_date = match s.delivery_date.as_deref() {
				Some(raw) => raw.parse::<u32>().map_err(|_| RecordSkip::MissingField("delivery_date"))?,
				None => 0,
			};
			(ProductKind::Fut, code.to_owned(), alt, "usdt", expire_date)
		}
		Mode::CoinSwap => (ProductKind::Swp, TENOR_PERP.to_owned(), s.contract_code.clone(), "usd", 0),
		Mode::UsdtSwap => (ProductKind::Swp, TENOR_PERP.to_owned(), s.contract_code.clone(), "usdt", 0),
		Mode::Spot => unreachable!("spot rows go through map_spot"),
	};

	validated(CanonicalSecDef {
		sec_id: 0,
		symbol: s.symbol.clone(),
		alt_symbol,
		description: String::new(),
		cfi_code: CFI_FUT.to_owned(),
		exchange: Venue::Huobi,
		product,
		tenor,
		ccy_a: s.symbol.to_lowercase(),
		ccy_b: ccy_b.to_owned(),
		qty_ccy: QtyCcy::A,
		contract_multiplier: 1.0,
		lot_size: s.contract_size,
		min_lots: 1,
		px_step: s.price_tick,
		expire_date,
		expire_time: 0,
		pair: String::new(),
	})
	.map(Some)
}

pub fn normalize(mode: Mode, doc: RawFeedDocument) -> Result<Vec<CanonicalSecDef>, VenueError> {
	let json = expect_json(doc)?;

	match mode {
		Mode::Spot => {
			let mut rows: Vec<SpotSymbol> = unwrap_envelope(deser_value(json)?)?;
			rows.sort_by(|l, r| l.symbol.cmp(&r.symbol));

			let mut out = Vec::with_capacity(rows.len());
			for s in &rows {
				match map_spot(s) {
					Ok(Some(def)) => out.push(def),
					Ok(None) => {}
					Err(skip) => skip_warn(Venue::Huobi, &s.symbol, &skip),
				}
			}
			Ok(out)
		}
		_ => {
			let mut rows: Vec<ContractInfo> = unwrap_envelope(deser_value(json)?)?;
			rows.sort_by(|l, r| (&l.symbol, &l.contract_code).cmp(&(&r.symbol, &r.contract_code)));

			let mut out = Vec::with_capacity(rows.len());
			for s in &rows {
				match map_contract(mode, s) {
					Ok(Some(def)) => out.push(def),
					Ok(None) => {}
					Err(skip) => skip_warn(Venue::Huobi, &s.symbol, &skip),
				}
			}
			Ok(out)
		}
	}
}
