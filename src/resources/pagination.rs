//! Cursor pagination used by the v4 list endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::client::KitClient;
use crate::error::{KitError, Result};
use crate::http::Params;

/// `pagination` object returned next to every v4 list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub has_previous_page: bool,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub start_cursor: Option<String>,
    #[serde(default)]
    pub end_cursor: Option<String>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl Pagination {
    /// Read the `pagination` object of a list response, if present.
    pub fn from_response(response: &Value) -> Option<Self> {
        response
            .get("pagination")
            .and_then(|p| serde_json::from_value(p.clone()).ok())
    }

    /// Cursor for the following page, when there is one.
    pub fn next_cursor(&self) -> Option<&str> {
        if self.has_next_page {
            self.end_cursor.as_deref()
        } else {
            None
        }
    }
}

impl KitClient {
    /// GET every page of a cursor-paginated list and collect the items
    /// under `key`. Pages are requested with `after` set to the previous
    /// page's end cursor.
    ///
    /// # Example
    /// ```no_run
    /// # async fn example(client: &kit_api::client::KitClient) -> kit_api::error::Result<()> {
    /// let tags = client.paginate("tags", "tags", Default::default()).await?;
    /// println!("{} tags", tags.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn paginate(&self, endpoint: &str, key: &str, params: Params) -> Result<Vec<Value>> {
        let mut params = params;
        let mut items = Vec::new();
        let mut last_cursor: Option<String> = None;

        loop {
            let response = self.get(endpoint, params.clone()).await?;
            let page = response
                .get(key)
                .and_then(Value::as_array)
                .ok_or_else(|| self.reject("paginate", KitError::unexpected_response()))?;
            items.extend(page.iter().cloned());

            let Some(cursor) = Pagination::from_response(&response)
                .and_then(|p| p.next_cursor().map(str::to_string))
            else {
                break;
            };
            if last_cursor.as_deref() == Some(cursor.as_str()) {
                debug!(endpoint, %cursor, "cursor did not advance, stopping");
                break;
            }
            params.insert("after".to_string(), Value::String(cursor.clone()));
            last_cursor = Some(cursor);
        }

        debug!(endpoint, count = items.len(), "paginated list fetched");
        Ok(items)
    }
}
