use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::contract::{
    client::ShareLinksApi,
    model::{AccessResult, ShareLink, ShareLinkRequest, ShareLinkResponse, ShareLinkType},
};
use modkit::{ApiTransport, ApiTransportExt, TransportError};

const SCHEDULES: &str = "schedules";
const SHARE: &str = "share";
const SHARE_LINKS: &str = "share-links";

/// Remote implementation of the ShareLinksApi trait.
///
/// Each call is one request on the injected transport. Responses are decoded
/// and handed back as-is: no validation, caching or retries happen here.
#[derive(Clone)]
pub struct ShareLinkClient {
    transport: Arc<dyn ApiTransport>,
}

impl ShareLinkClient {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ShareLinksApi for ShareLinkClient {
    #[instrument(
        name = "share_links.http.generate",
        skip_all,
        fields(schedule_id = %schedule_id, link_type = %link_type)
    )]
    async fn generate_share_link(
        &self,
        schedule_id: &str,
        link_type: ShareLinkType,
    ) -> Result<ShareLinkResponse, TransportError> {
        let request = ShareLinkRequest::new(schedule_id, link_type);
        let created: ShareLinkResponse = self
            .transport
            .post_json(&[SCHEDULES, request.schedule_id.as_str(), SHARE], &request)
            .await?;
        tracing::debug!(expires_at = %created.expires_at, "share link created");
        Ok(created)
    }

    // The token grants access, so only its length is recorded.
    #[instrument(
        name = "share_links.http.access",
        skip_all,
        fields(token_len = token.len())
    )]
    async fn access_share_link(&self, token: &str) -> Result<AccessResult, TransportError> {
        let resolved: AccessResult = self
            .transport
            .get_json(&[SCHEDULES, SHARE, token])
            .await?;
        tracing::debug!(schedule_id = %resolved.schedule_id, "share link resolved");
        Ok(resolved)
    }

    #[instrument(
        name = "share_links.http.list",
        skip_all,
        fields(schedule_id = %schedule_id)
    )]
    async fn get_share_links(&self, schedule_id: &str) -> Result<Vec<ShareLink>, TransportError> {
        let links: Vec<ShareLink> = self
            .transport
            .get_json(&[SCHEDULES, schedule_id, SHARE_LINKS])
            .await?;
        tracing::debug!(count = links.len(), "share links listed");
        Ok(links)
    }
}
