// Utility modules

use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use url::{form_urlencoded, Url};

use crate::{
    constants::{CHECKIN_PATH, SOLANA_PAY_SCHEME},
    error::{AppError, Result},
};

/// Treats absent and blank values the same way.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn parse_pubkey(value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value.trim()).map_err(|_| AppError::InvalidAccount(value.to_string()))
}

/// `{base}/api/checkin?[reference=..&]id=..`
pub fn checkin_link(base_url: &str, index: u32, reference: Option<&Pubkey>) -> Result<String> {
    // Appended rather than joined so a path prefix on the base survives.
    let mut link = Url::parse(&format!("{}{}", base_url.trim_end_matches('/'), CHECKIN_PATH))
        .map_err(|e| AppError::Internal(format!("Invalid base URL: {}", e)))?;
    {
        let mut query = link.query_pairs_mut();
        if let Some(reference) = reference {
            query.append_pair("reference", &reference.to_string());
        }
        query.append_pair("id", &index.to_string());
    }
    Ok(link.to_string())
}

/// Solana Pay transaction request URL wrapping an HTTPS link.
pub fn solana_pay_url(link: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(link.as_bytes()).collect();
    format!("{SOLANA_PAY_SCHEME}:{encoded}")
}
