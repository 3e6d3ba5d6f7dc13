/// Application constants

// API version
pub const API_VERSION: &str = "v1";

// Solana defaults
pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.devnet.solana.com";
pub const DEFAULT_PROGRAM_ID: &str = "4VzCzs6uaJaegyQotbL3iCWL9FY3AyiQuw6aovxM3H6y";
pub const DEFAULT_GAME_ID: &str = "AjXVVqebjx6cS3xZzYMp9QuFVRddSzHnGWMembnZuVLe";

// Transaction request descriptor
pub const DEFAULT_SERVICE_LABEL: &str = "Scavenger Hunt";
pub const DEFAULT_SERVICE_ICON_URL: &str =
    "https://solana.com/src/img/branding/solanaLogoMark.svg";

// Solana Pay
pub const SOLANA_PAY_SCHEME: &str = "solana";
pub const CHECKIN_PATH: &str = "/api/checkin";

// User-facing messages
pub const MSG_OUT_OF_ORDER: &str = "You must visit each location in order!";
pub const MSG_INVALID_LOCATION: &str = "Invalid location id!";
pub const MSG_MISSING_PARAMETERS: &str = "Missing required parameter(s)";
pub const MSG_INVALID_ACCOUNT: &str = "Invalid account or reference";
pub const MSG_METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const MSG_TRANSACTION_FAILED: &str = "error creating transaction";

pub fn found_location_message(index: u32) -> String {
    format!("You've found location {index}!")
}
