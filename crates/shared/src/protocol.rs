use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Candidate, CandidateId, Pair};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: CandidateId,
    pub name: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<CandidateRecord> for Candidate {
    fn from(value: CandidateRecord) -> Self {
        Self {
            id: value.id,
            name: value.name,
            media: value.filename,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairResponse {
    pub left: CandidateRecord,
    pub right: CandidateRecord,
}

impl From<PairResponse> for Pair {
    fn from(value: PairResponse) -> Self {
        Self {
            left: value.left.into(),
            right: value.right.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub winner_id: CandidateId,
    pub loser_id: CandidateId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_response_decodes_server_shape() {
        let raw = r#"{
            "left": {"id": 3, "name": "Ada", "filename": "ada.jpg", "created_at": "2024-01-01T00:00:00Z"},
            "right": {"id": 9, "name": "Grace", "filename": "grace.png", "created_at": "2024-01-02T00:00:00Z"}
        }"#;
        let pair: Pair = serde_json::from_str::<PairResponse>(raw)
            .expect("decode")
            .into();
        assert_eq!(pair.left.id, CandidateId(3));
        assert_eq!(pair.right.media, "grace.png");
    }

    #[test]
    fn vote_request_uses_plain_ids() {
        let body = serde_json::to_value(VoteRequest {
            winner_id: CandidateId(1),
            loser_id: CandidateId(2),
        })
        .expect("encode");
        assert_eq!(body, serde_json::json!({"winner_id": 1, "loser_id": 2}));
    }
}
