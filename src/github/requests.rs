use super::responses::IssueState;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, PartialEq, Debug)]
pub struct CreateIssue {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Deserialize, Serialize, PartialEq, Debug)]
pub struct UpdateIssueState {
    pub state: IssueState,
}

#[derive(Deserialize, Serialize, PartialEq, Debug)]
pub struct CreateComment {
    pub body: String,
}

/// Body for the contents API PUT. `content` is base64. `sha` must carry the
/// prior content hash when overwriting an existing file and must be absent
/// when creating a new one.
#[derive(Deserialize, Serialize, PartialEq, Debug)]
pub struct PutFile {
    pub message: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}
