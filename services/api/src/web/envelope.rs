//! services/api/src/web/envelope.rs
//!
//! The `{ success, data, ... }` response envelopes shared by every endpoint.

use catalog_core::aggregation::SearchStats;
use catalog_core::projection::{BookView, UserView};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct BookEnvelope {
    pub success: bool,
    pub data: BookView,
}

#[derive(Serialize, ToSchema)]
pub struct BookListEnvelope {
    pub success: bool,
    pub data: Vec<BookView>,
}

/// Aggregated search result with per-source counts.
#[derive(Serialize, ToSchema)]
pub struct SearchEnvelope {
    pub success: bool,
    pub data: Vec<BookView>,
    pub stats: SearchStats,
}

#[derive(Serialize, ToSchema)]
pub struct UserEnvelope {
    pub success: bool,
    pub data: UserView,
}

#[derive(Serialize, ToSchema)]
pub struct UserListEnvelope {
    pub success: bool,
    pub data: Vec<UserView>,
}

#[derive(Serialize, ToSchema)]
pub struct MessageEnvelope {
    pub success: bool,
    pub message: String,
}

impl MessageEnvelope {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
}
