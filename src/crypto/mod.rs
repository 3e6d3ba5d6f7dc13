pub mod hash;
pub mod keypair;
