//! crosslinks tool implementation.
//!
//! Queries the link graph around one url. The url need not be a stored
//! page: links to pages that do not exist yet still have backlinks.

use crosswiki_core::{Crosslink, WikiDb};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Which edges to return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Links this page makes.
    Outgoing,
    /// Links pointing at this page.
    Incoming,
    #[default]
    Both,
}

/// Parameters for the crosslinks tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CrosslinksParams {
    /// Page url, e.g. "/Home".
    pub url: String,

    /// "outgoing", "incoming" or "both" (default).
    #[serde(default)]
    pub direction: Direction,
}

/// Output from the crosslinks tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CrosslinksOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outgoing: Option<Vec<Crosslink>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incoming: Option<Vec<Crosslink>>,
}

/// Implementation of the crosslinks tool.
pub async fn crosslinks_impl(db: &WikiDb, params: CrosslinksParams) -> Result<CallToolResult, McpError> {
    let outgoing = match params.direction {
        Direction::Outgoing | Direction::Both => Some(db.outgoing(&params.url).await?),
        Direction::Incoming => None,
    };
    let incoming = match params.direction {
        Direction::Incoming | Direction::Both => Some(db.incoming(&params.url).await?),
        Direction::Outgoing => None,
    };

    json_result(&CrosslinksOutput { outgoing, incoming })
}
