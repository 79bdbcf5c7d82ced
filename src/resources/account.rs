use serde_json::Value;
use tracing::debug;

use crate::client::KitClient;
use crate::error::Result;
use crate::http::Params;

impl KitClient {
    /// Account the access token belongs to.
    pub async fn get_account(&self) -> Result<Value> {
        debug!("get_account");
        self.get("account", Params::new()).await
    }
}
