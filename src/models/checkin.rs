use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== CHECK-IN ====================
#[derive(Debug, Default)]
pub struct CheckInQuery {
    pub reference: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckInBody {
    pub account: Option<String>,
}

/// Transaction request descriptor returned on GET.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub label: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub transaction: String,
    pub message: String,
}

impl CheckInResponse {
    pub fn accepted(transaction: String, message: String) -> Self {
        Self {
            transaction,
            message,
        }
    }

    /// Guidance for the player with no transaction attached.
    pub fn rejected(message: &str) -> Self {
        Self {
            transaction: String::new(),
            message: message.to_string(),
        }
    }
}

// ==================== REFERENCE STATUS ====================
#[derive(Debug, Default, Deserialize)]
pub struct ReferenceQuery {
    pub reference: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReferenceStatusResponse {
    pub reference: String,
    pub found: bool,
    pub signature: Option<String>,
    pub succeeded: bool,
    pub block_time: Option<DateTime<Utc>>,
}

// ==================== LOCATIONS ====================
#[derive(Debug, Serialize)]
pub struct LocationView {
    pub index: u32,
    pub key: String,
    pub link: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentRequestResponse {
    pub index: u32,
    pub reference: String,
    pub url: String,
}

// ==================== PROGRESS ====================
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub account: String,
    pub last_location: Option<u32>,
    pub next_location: Option<u32>,
    pub completed: bool,
}
