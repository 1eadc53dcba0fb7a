use anyhow::{anyhow, Result};
use serde::Deserialize;

use super::Tool;
use crate::config::QueryDefaults;
use crate::limitless::LimitlessClient;
use crate::markdown;

/// Arguments accepted by the `get_lifelog_by_id` tool.
#[derive(Debug, Clone, Deserialize)]
pub struct GetLifelogByIdArgs {
    pub id: String,
}

/// Fetches a single lifelog by its identifier and renders it as
/// Markdown through the same pipeline as the listing tool.
pub struct GetLifelogById {
    client: LimitlessClient,
    defaults: QueryDefaults,
}

impl GetLifelogById {
    pub fn new(client: LimitlessClient, defaults: QueryDefaults) -> Self {
        Self { client, defaults }
    }
}

#[async_trait::async_trait]
impl Tool for GetLifelogById {
    type Input = GetLifelogByIdArgs;
    type Output = String;

    fn name(&self) -> &str {
        "get_lifelog_by_id"
    }

    async fn run(&self, args: GetLifelogByIdArgs) -> Result<String> {
        log::info!("get_lifelog_by_id: fetching lifelog {}", args.id);

        let pairs = self.defaults.to_pairs();
        let response = self
            .client
            .get_lifelog(&args.id, &pairs)
            .await
            .map_err(|e| anyhow!("APIリクエストエラー: {}", e))?;

        Ok(markdown::render_response(&response))
    }
}
