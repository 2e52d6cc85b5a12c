use std::path::PathBuf;

use serde::Deserialize;
use url::Url;

use crate::{
	error::VenueError,
	utils::{deser_reqwest, unexpected_response_str},
};

/// A venue metadata snapshot as handed to an adapter. JSON venues get [Json](Self::Json);
/// tabular feeds (LMAX) get [Text](Self::Text), and the shape difference stays hidden
/// inside that venue's adapter.
#[derive(Clone, Debug)]
pub enum RawFeedDocument {
	Json(serde_json::Value),
	Text(String),
}

/// Where a venue snapshot comes from. Files are for re-generation/diffing off captured
/// snapshots; HTTP hits the venue's public metadata endpoint directly. No retries — the
/// run simply reports the venue as failed.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSource {
	File(PathBuf),
	Http(Url),
}

impl SnapshotSource {
	pub async fn load(&self, tabular: bool) -> Result<RawFeedDocument, VenueError> {
		match self {
			Self::File(path) => {
				let text = tokio::fs::read_to_string(path).await?;
				if tabular {
					return Ok(RawFeedDocument::Text(text));
				}
				let value = serde_json::from_str(&text).map_err(|_| VenueError::Document(unexpected_response_str(&text)))?;
				Ok(RawFeedDocument::Json(value))
			}
			Self::Http(url) => {
				let response = reqwest::get(url.clone()).await?.error_for_status()?;
				if tabular {
					return Ok(RawFeedDocument::Text(response.text().await?));
				}
				Ok(RawFeedDocument::Json(deser_reqwest(response).await?))
			}
		}
	}
}

impl std::fmt::Display for SnapshotSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::File(path) => write!(f, "{}", path.display()),
			Self::Http(url) => write!(f, "{url}"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn malformed_json_error_carries_the_body() {
		let path = std::env::temp_dir().join("mk_secdefs_test_malformed.json");
		tokio::fs::write(&path, "<html>down for maintenance</html>").await.unwrap();

		let err = SnapshotSource::File(path).load(false).await.unwrap_err();
		assert!(matches!(&err, VenueError::Document(body) if body.contains("maintenance")));
	}
}
