use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Workflow a share link is minted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareLinkType {
    Recommendation,
    Approval,
}

impl ShareLinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recommendation => "recommendation",
            Self::Approval => "approval",
        }
    }
}

impl fmt::Display for ShareLinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown share link type '{0}' (expected 'recommendation' or 'approval')")]
pub struct ParseShareLinkTypeError(pub String);

impl FromStr for ShareLinkType {
    type Err = ParseShareLinkTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recommendation" => Ok(Self::Recommendation),
            "approval" => Ok(Self::Approval),
            _ => Err(ParseShareLinkTypeError(s.to_string())),
        }
    }
}

/// Server-owned lifecycle state of a link. Displayed, never changed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareLinkStatus {
    Active,
    Used,
    Expired,
}

/// Input to link creation. Only `type` travels in the body; the schedule id
/// is part of the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLinkRequest {
    #[serde(skip)]
    pub schedule_id: String,
    #[serde(rename = "type")]
    pub link_type: ShareLinkType,
}

impl ShareLinkRequest {
    pub fn new(schedule_id: impl Into<String>, link_type: ShareLinkType) -> Self {
        Self {
            schedule_id: schedule_id.into(),
            link_type,
        }
    }
}

/// Newly minted link, as returned by the create call.
///
/// Timestamps are kept exactly as the server wrote them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinkResponse {
    pub token: String,
    pub share_url: String,
    pub expires_at: String,
    #[serde(rename = "type")]
    pub link_type: ShareLinkType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLinkCreator {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A previously created link as known to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub id: String,
    pub token: String,
    pub schedule_id: String,
    #[serde(rename = "type")]
    pub link_type: ShareLinkType,
    pub created_by: ShareLinkCreator,
    pub expires_at: String,
    pub status: ShareLinkStatus,
    pub created_at: String,
}

/// Where a resolved token leads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResult {
    pub schedule_id: String,
    pub redirect_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_carries_only_type() {
        let req = ShareLinkRequest::new("sched1", ShareLinkType::Approval);
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body, json!({ "type": "approval" }));
    }

    #[test]
    fn test_share_link_from_server_json() {
        let link: ShareLink = serde_json::from_value(json!({
            "id": "l1",
            "token": "tok-1",
            "scheduleId": "sched1",
            "type": "recommendation",
            "createdBy": { "id": "u1", "name": "Ada", "email": "ada@example.com" },
            "expiresAt": "2024-01-08T09:30:00Z",
            "status": "used",
            "createdAt": "2024-01-01T09:30:00.000Z"
        }))
        .unwrap();

        assert_eq!(link.schedule_id, "sched1");
        assert_eq!(link.link_type, ShareLinkType::Recommendation);
        assert_eq!(link.status, ShareLinkStatus::Used);
        assert_eq!(link.created_by.email, "ada@example.com");
        assert_eq!(link.expires_at, "2024-01-08T09:30:00Z");
        assert_eq!(link.created_at, "2024-01-01T09:30:00.000Z");
    }

    #[test]
    fn test_response_serializes_back_to_camel_case() {
        let resp = ShareLinkResponse {
            token: "abc".into(),
            share_url: "https://x/abc".into(),
            expires_at: "2024-01-01T00:00:00Z".into(),
            link_type: ShareLinkType::Approval,
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["shareUrl"], "https://x/abc");
        assert_eq!(value["type"], "approval");
        assert_eq!(value["expiresAt"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_timestamps_pass_through_verbatim() {
        for stamp in [
            "2024-01-01T02:00:00+02:00",
            "2024-01-01T00:00:00",
            "2024-01-01T00:00:00.123456Z",
        ] {
            let resp: ShareLinkResponse = serde_json::from_value(json!({
                "token": "abc",
                "shareUrl": "https://x/abc",
                "expiresAt": stamp,
                "type": "approval"
            }))
            .unwrap();
            assert_eq!(resp.expires_at, stamp);
            assert_eq!(serde_json::to_value(&resp).unwrap()["expiresAt"], stamp);
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = serde_json::from_value::<ShareLinkStatus>(json!("revoked"));
        assert!(err.is_err());
    }

    #[test]
    fn test_link_type_parsing() {
        assert_eq!(
            "approval".parse::<ShareLinkType>().unwrap(),
            ShareLinkType::Approval
        );
        assert_eq!(
            " Recommendation ".parse::<ShareLinkType>().unwrap(),
            ShareLinkType::Recommendation
        );
        let err = "review".parse::<ShareLinkType>().unwrap_err();
        assert_eq!(err, ParseShareLinkTypeError("review".into()));
        assert_eq!(ShareLinkType::Approval.to_string(), "approval");
    }
}
