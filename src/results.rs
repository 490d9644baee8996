//! Generic async result endpoint (v2beta `results`)

use crate::client::Stability;
use crate::error::Result;
use crate::response;
use crate::types::{ApiVersion, AsyncResult, OutputFormat};

const RESOURCE: &str = "results";

impl Stability {
    /// Fetch the result of an asynchronous generation by id.
    ///
    /// Used by endpoints that acknowledge submissions with a bare job id,
    /// such as [`replace_background_and_relight`](Stability::replace_background_and_relight).
    /// Results are retained upstream for 24 hours after completion.
    pub async fn fetch_async_result(&self, id: &str) -> Result<AsyncResult> {
        let url = format!("{}/{}", self.make_url(ApiVersion::V2Beta, RESOURCE, ""), id);
        let (status, body) = self.get_json(&url, false).await?;

        response::interpret_poll(
            status,
            &body,
            OutputFormat::default(),
            "v2beta_fetch_async_result",
            "Failed to fetch generation result",
        )
        .await
    }
}
