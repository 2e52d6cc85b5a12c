use std::{io::Write, path::Path};

use serde::de::DeserializeOwned;
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

use crate::error::VenueError;

/// # Panics
pub fn init_subscriber(log_path: Option<Box<Path>>) {
	let _ = tracing_log::LogTracer::init();

	let setup = |make_writer: Box<dyn Fn() -> Box<dyn Write> + Send + Sync>| {
		let formatting_layer = tracing_subscriber::fmt::layer().with_writer(make_writer).with_file(true).with_line_number(true);

		let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));

		let error_layer = ErrorLayer::default();

		let subscriber = tracing_subscriber::Registry::default().with(env_filter).with(formatting_layer).with(error_layer);

		tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
	};

	match log_path {
		Some(path) => {
			let path = path.to_owned();

			// Truncate the file before setting up the logger
			{
				let _ = std::fs::OpenOptions::new()
					.create(true)
					.write(true)
					.truncate(true)
					.open(&path)
					.expect("Failed to truncate log file");
			}

			setup(Box::new(move || {
				let file = std::fs::OpenOptions::new().create(true).append(true).open(&path).expect("Failed to open log file");
				Box::new(file) as Box<dyn Write>
			}));
		}
		None => {
			setup(Box::new(|| Box::new(std::io::stderr())));
		}
	};
}

/// Basically reqwest's `json()`, but carries the response body in the error when it does
/// not deserialize (venues answer maintenance pages and error envelopes over 200).
pub async fn deser_reqwest<T: DeserializeOwned>(r: reqwest::Response) -> Result<T, VenueError> {
	let text = r.text().await?;

	match serde_json::from_str::<T>(&text) {
		Ok(deserialized) => Ok(deserialized),
		Err(_) => Err(VenueError::Document(unexpected_response_str(&text))),
	}
}

pub fn unexpected_response_str(s: &str) -> String {
	match serde_json::from_str::<serde_json::Value>(s) {
		Ok(v) => serde_json::to_string_pretty(&v).unwrap_or_else(|_| s.to_owned()),
		Err(_) => s.to_owned(),
	}
}

/// Decodes a raw venue document into the adapter's typed model, reporting the JSON path
/// of the offending field on failure.
pub fn deser_value<T: DeserializeOwned>(v: serde_json::Value) -> Result<T, VenueError> {
	serde_path_to_error::deserialize(v).map_err(VenueError::decode)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unexpected_response_keeps_the_body() {
		assert_eq!(unexpected_response_str(r#"{"code":-1}"#), "{\n  \"code\": -1\n}");
		assert_eq!(unexpected_response_str("<html>maintenance</html>"), "<html>maintenance</html>");
	}
}
