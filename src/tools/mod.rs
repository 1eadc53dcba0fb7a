pub mod get_lifelog_by_id;
pub mod get_lifelogs;

pub use get_lifelog_by_id::{GetLifelogById, GetLifelogByIdArgs};
pub use get_lifelogs::{GetLifelogs, GetLifelogsArgs};

use anyhow::Result;

/// Tool trait for server-dispatched operations.
///
/// Not object-safe (associated types); the server calls tools by
/// concrete type, not `dyn Tool`.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    type Input: Send;
    type Output: Send;

    fn name(&self) -> &str;
    async fn run(&self, input: Self::Input) -> Result<Self::Output>;
}
