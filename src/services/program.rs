//! Client-side view of the on-chain scavenger hunt program.
//!
//! The program owns one `UserState` account per `(game, player)` pair and
//! exposes two instructions: `initialize` creates that account and `check_in`
//! advances `last_location`. Ordering is enforced by the program itself; this
//! module only builds instructions and decodes the account.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::crypto::hash::{account_discriminator, instruction_discriminator};
use crate::error::{AppError, Result};

const DISCRIMINATOR_LEN: usize = 8;

/// Per-player progress as stored by the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserState {
    pub user: Pubkey,
    pub game_id: Pubkey,
    pub last_location: Pubkey,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct UserStateAccount {
    user: [u8; 32],
    game_id: [u8; 32],
    last_location: [u8; 32],
}

#[derive(BorshSerialize)]
struct InitializeArgs {
    game_id: [u8; 32],
}

#[derive(BorshSerialize)]
struct CheckInArgs {
    game_id: [u8; 32],
    location: [u8; 32],
}

#[derive(Debug, Clone, Copy)]
pub struct ScavengerHuntProgram {
    program_id: Pubkey,
}

impl ScavengerHuntProgram {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// PDA holding `user`'s progress in `game_id`, seeded by `[game_id, user]`.
    pub fn user_state_address(&self, game_id: &Pubkey, user: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(&[game_id.as_ref(), user.as_ref()], &self.program_id).0
    }

    pub fn initialize(&self, user: &Pubkey, game_id: &Pubkey) -> Result<Instruction> {
        let data = encode("initialize", &InitializeArgs {
            game_id: game_id.to_bytes(),
        })?;
        Ok(Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(self.user_state_address(game_id, user), false),
                AccountMeta::new(*user, true),
                AccountMeta::new_readonly(system_program::id(), false),
            ],
            data,
        })
    }

    /// `reference` is appended read-only and unsigned so the transaction can be
    /// located by signature lookup; the program ignores it.
    pub fn check_in(
        &self,
        user: &Pubkey,
        game_id: &Pubkey,
        location: &Pubkey,
        event_organizer: &Pubkey,
        reference: &Pubkey,
    ) -> Result<Instruction> {
        let data = encode("check_in", &CheckInArgs {
            game_id: game_id.to_bytes(),
            location: location.to_bytes(),
        })?;
        Ok(Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(self.user_state_address(game_id, user), false),
                AccountMeta::new_readonly(*user, true),
                AccountMeta::new_readonly(*event_organizer, true),
                AccountMeta::new_readonly(*reference, false),
            ],
            data,
        })
    }
}

fn encode<T: BorshSerialize>(name: &str, args: &T) -> Result<Vec<u8>> {
    let mut data = instruction_discriminator(name).to_vec();
    let encoded = borsh::to_vec(args)
        .map_err(|e| AppError::Internal(format!("Failed to encode {} args: {}", name, e)))?;
    data.extend_from_slice(&encoded);
    Ok(data)
}

impl UserState {
    /// Decodes raw account data. Trailing bytes (over-allocated space) are ignored.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(AppError::Internal("UserState account data too short".to_string()));
        }
        let (discriminator, mut body) = data.split_at(DISCRIMINATOR_LEN);
        if discriminator != account_discriminator("UserState").as_slice() {
            return Err(AppError::Internal(
                "Account is not a UserState".to_string(),
            ));
        }
        let raw = UserStateAccount::deserialize(&mut body)
            .map_err(|e| AppError::Internal(format!("Failed to decode UserState: {}", e)))?;
        Ok(Self {
            user: Pubkey::new_from_array(raw.user),
            game_id: Pubkey::new_from_array(raw.game_id),
            last_location: Pubkey::new_from_array(raw.last_location),
        })
    }

    #[cfg(test)]
    pub fn encode(&self) -> Vec<u8> {
        let mut data = account_discriminator("UserState").to_vec();
        data.extend_from_slice(self.user.as_ref());
        data.extend_from_slice(self.game_id.as_ref());
        data.extend_from_slice(self.last_location.as_ref());
        data
    }
}
