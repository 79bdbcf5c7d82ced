use serde_json::Value;
use tracing::debug;

use crate::client::KitClient;
use crate::error::Result;
use crate::http::Params;

impl KitClient {
    pub async fn get_products(&self) -> Result<Value> {
        debug!("get_products");
        self.get("products", Params::new()).await
    }
}
