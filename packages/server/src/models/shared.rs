use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Longest accepted user identifier, in characters.
pub const MAX_USER_ID_LEN: usize = 128;

/// Pagination metadata included in list responses.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 50)]
    pub limit: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 137)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit.max(1)),
        }
    }
}

/// Liveness check body.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "ok")]
    pub status: String,
}

/// Trim and validate a user identifier taken from a path or body.
pub fn normalize_user_id(raw: &str) -> Result<String, AppError> {
    let user_id = raw.trim();
    if user_id.is_empty() {
        return Err(AppError::Validation("userId is required".into()));
    }
    if user_id.chars().count() > MAX_USER_ID_LEN {
        return Err(AppError::Validation(format!(
            "userId must be at most {MAX_USER_ID_LEN} characters"
        )));
    }
    Ok(user_id.to_string())
}
