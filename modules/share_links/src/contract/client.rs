use async_trait::async_trait;
use modkit::TransportError;

use crate::contract::model::{AccessResult, ShareLink, ShareLinkResponse, ShareLinkType};

/// Public API trait for share links that other crates can use
#[async_trait]
pub trait ShareLinksApi: Send + Sync {
    /// Mint a new link for a schedule
    async fn generate_share_link(
        &self,
        schedule_id: &str,
        link_type: ShareLinkType,
    ) -> Result<ShareLinkResponse, TransportError>;

    /// Resolve a token to its schedule and redirect target
    async fn access_share_link(&self, token: &str) -> Result<AccessResult, TransportError>;

    /// List the links of a schedule, in server order
    async fn get_share_links(&self, schedule_id: &str) -> Result<Vec<ShareLink>, TransportError>;
}
