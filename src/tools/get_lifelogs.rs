use anyhow::{anyhow, Result};
use serde::Deserialize;

use super::Tool;
use crate::config::QueryDefaults;
use crate::limitless::{LifelogQuery, LimitlessClient};
use crate::markdown;

/// Arguments accepted by the `get_lifelogs` tool, as sent by the MCP
/// host. All optional; unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetLifelogsArgs {
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub cursor: Option<String>,
    pub is_starred: Option<bool>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

impl From<GetLifelogsArgs> for LifelogQuery {
    fn from(args: GetLifelogsArgs) -> Self {
        LifelogQuery {
            date: args.date,
            start: args.start,
            end: args.end,
            cursor: args.cursor,
            is_starred: args.is_starred,
            limit: args.limit,
            search: args.search,
        }
    }
}

/// Fetches a page of lifelogs from the Limitless API and renders it as
/// one Markdown document.
pub struct GetLifelogs {
    client: LimitlessClient,
    defaults: QueryDefaults,
}

impl GetLifelogs {
    pub fn new(client: LimitlessClient, defaults: QueryDefaults) -> Self {
        Self { client, defaults }
    }
}

#[async_trait::async_trait]
impl Tool for GetLifelogs {
    type Input = GetLifelogsArgs;
    type Output = String;

    fn name(&self) -> &str {
        "get_lifelogs"
    }

    async fn run(&self, args: GetLifelogsArgs) -> Result<String> {
        let query = LifelogQuery::from(args);
        let pairs = query.to_pairs(&self.defaults.to_pairs());

        log::info!("get_lifelogs: fetching with {} query parameter(s)", pairs.len());

        let response = self
            .client
            .get_lifelogs(&pairs)
            .await
            .map_err(|e| anyhow!("APIリクエストエラー: {}", e))?;

        let rendered = markdown::render_response(&response);
        log::info!("get_lifelogs: rendered {} chars of Markdown", rendered.len());

        Ok(rendered)
    }
}
