use std::io::Write;

use color_eyre::eyre::Result;
use derive_new::new;

use crate::secdef::CanonicalSecDef;

/// Boundary to the downstream reference-data store. The engine guarantees the field set
/// and emission order; the concrete record syntax belongs entirely to the sink.
pub trait OutputSink {
	fn write_all(&mut self, records: &[CanonicalSecDef]) -> Result<()>;
}

/// One JSON object per line, in emission order.
#[derive(new)]
pub struct JsonLinesSink<W: Write> {
	writer: W,
}

impl<W: Write> OutputSink for JsonLinesSink<W> {
	fn write_all(&mut self, records: &[CanonicalSecDef]) -> Result<()> {
		for record in records {
			serde_json::to_writer(&mut self.writer, record)?;
			self.writer.write_all(b"\n")?;
		}
		self.writer.flush()?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::secdef::{ProductKind, QtyCcy, Venue, CFI_SPOT};

	fn record() -> CanonicalSecDef {
		CanonicalSecDef {
			sec_id: 0,
			symbol: "BTCUSDT".to_owned(),
			alt_symbol: "btcusdt".to_owned(),
			description: String::new(),
			cfi_code: CFI_SPOT.to_owned(),
			exchange: Venue::Binance,
			product: ProductKind::Spot,
			tenor: String::new(),
			ccy_a: "BTC".to_owned(),
			ccy_b: "USDT".to_owned(),
			qty_ccy: QtyCcy::A,
			contract_multiplier: 1.0,
			lot_size: 0.001,
			min_lots: 1,
			px_step: 0.01,
			expire_date: 0,
			expire_time: 0,
			pair: String::new(),
		}
	}

	#[test]
	fn one_line_per_record_stable_across_runs() {
		let records = vec![record(), record()];

		let mut first = Vec::new();
		JsonLinesSink::new(&mut first).write_all(&records).unwrap();
		let mut second = Vec::new();
		JsonLinesSink::new(&mut second).write_all(&records).unwrap();

		assert_eq!(first, second);
		assert_eq!(first.iter().filter(|b| **b == b'\n').count(), 2);

		let line = std::str::from_utf8(&first).unwrap().lines().next().unwrap().to_owned();
		let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
		assert_eq!(parsed["symbol"], "BTCUSDT");
		assert_eq!(parsed["exchange"], "Binance");
	}
}
