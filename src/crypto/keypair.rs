use solana_sdk::signature::Keypair;

use crate::error::{AppError, Result};

/// Parse a keypair stored as a JSON byte array (the `solana-keygen` file format).
pub fn keypair_from_json(raw: &str) -> Result<Keypair> {
    let bytes: Vec<u8> = serde_json::from_str(raw.trim())
        .map_err(|e| AppError::Internal(format!("Keypair is not a JSON byte array: {}", e)))?;
    if bytes.len() != 64 {
        return Err(AppError::Internal(format!(
            "Keypair must be 64 bytes, got {}",
            bytes.len()
        )));
    }
    Keypair::from_bytes(&bytes)
        .map_err(|e| AppError::Internal(format!("Invalid keypair bytes: {}", e)))
}
