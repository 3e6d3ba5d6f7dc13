use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_program,
    transaction::Transaction,
};

use crate::{
    error::{AppError, Result},
    locations::{Location, LocationRegistry},
    services::{
        ledger::LedgerClient,
        program::{ScavengerHuntProgram, UserState},
    },
};

/// A check-in transaction ready for the player's wallet to countersign.
#[derive(Debug, Clone)]
pub struct CheckInTransaction {
    pub location: Location,
    pub initializes_user: bool,
    /// Base64 of the bincode wire format, organizer signature already applied.
    pub transaction: String,
}

/// Where a player stands in the hunt according to on-chain state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub last_location: Option<Location>,
    pub next_location: Option<Location>,
}

/// Sequential check-in validation and transaction assembly.
///
/// Holds only read-only shared state, so one instance serves all requests.
pub struct CheckInService {
    ledger: Arc<dyn LedgerClient>,
    organizer: Arc<Keypair>,
    registry: Arc<LocationRegistry>,
    program: ScavengerHuntProgram,
    game_id: Pubkey,
}

impl CheckInService {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        organizer: Arc<Keypair>,
        registry: Arc<LocationRegistry>,
        program: ScavengerHuntProgram,
        game_id: Pubkey,
    ) -> Self {
        Self {
            ledger,
            organizer,
            registry,
            program,
            game_id,
        }
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerClient> {
        &self.ledger
    }

    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    /// Fetches the player's state; a missing account means "never checked in".
    pub async fn fetch_user_state(&self, account: &Pubkey) -> Result<Option<UserState>> {
        let address = self.program.user_state_address(&self.game_id, account);
        match self.ledger.account_data(&address).await? {
            Some(data) => UserState::decode(&data).map(Some),
            None => Ok(None),
        }
    }

    pub async fn progress(&self, account: &Pubkey) -> Result<Progress> {
        let state = self.fetch_user_state(account).await?;
        let last_location = self.resolve_last_location(state.as_ref())?;
        let next_location = self.registry.next_after(last_location.as_ref()).copied();
        Ok(Progress {
            last_location,
            next_location,
        })
    }

    pub async fn build_check_in_transaction(
        &self,
        account: &Pubkey,
        reference: &Pubkey,
        location_id: &str,
    ) -> Result<CheckInTransaction> {
        self.ensure_passive_reference(account, reference)?;

        let target = location_id
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(|index| self.registry.by_index(index))
            .copied()
            .ok_or(AppError::InvalidLocation)?;

        let state = self.fetch_user_state(account).await?;
        let last_location = self.resolve_last_location(state.as_ref())?;
        validate_visit_order(last_location.as_ref(), &target)?;

        let initializes_user = state.is_none();
        let mut instructions = Vec::with_capacity(2);
        if initializes_user {
            instructions.push(self.program.initialize(account, &self.game_id)?);
        }
        instructions.push(self.program.check_in(
            account,
            &self.game_id,
            &target.key,
            &self.organizer.pubkey(),
            reference,
        )?);

        let blockhash = self.ledger.latest_blockhash().await?;
        let mut transaction = Transaction::new_with_payer(&instructions, Some(account));
        transaction
            .try_partial_sign(&[self.organizer.as_ref()], blockhash)
            .map_err(|e| AppError::Internal(format!("Organizer signing failed: {}", e)))?;

        let bytes = bincode::serialize(&transaction)
            .map_err(|e| AppError::Internal(format!("Transaction serialization failed: {}", e)))?;

        tracing::info!(
            "Built check-in for {} at location {} (initialize: {})",
            account,
            target.index,
            initializes_user
        );

        Ok(CheckInTransaction {
            location: target,
            initializes_user,
            transaction: STANDARD.encode(bytes),
        })
    }

    /// The reference must not coincide with any other key in the transaction,
    /// otherwise the merged account would become a signer or writable.
    fn ensure_passive_reference(&self, account: &Pubkey, reference: &Pubkey) -> Result<()> {
        let reserved = [
            *account,
            self.organizer.pubkey(),
            *self.program.program_id(),
            self.program.user_state_address(&self.game_id, account),
            system_program::id(),
        ];
        if reserved.contains(reference) {
            return Err(AppError::InvalidAccount(reference.to_string()));
        }
        Ok(())
    }

    fn resolve_last_location(&self, state: Option<&UserState>) -> Result<Option<Location>> {
        let Some(state) = state else {
            return Ok(None);
        };
        self.registry
            .by_key(&state.last_location)
            .copied()
            .map(Some)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Last location {} is not a registered location",
                    state.last_location
                ))
            })
    }
}

/// Only `last + 1` (or index 1 for a fresh player) may be checked in.
pub fn validate_visit_order(last: Option<&Location>, target: &Location) -> Result<()> {
    let expected = match last {
        None => 1,
        Some(location) => location.index.saturating_add(1),
    };
    if target.index != expected {
        tracing::debug!(
            "Rejected out-of-order visit: expected {}, got {}",
            expected,
            target.index
        );
        return Err(AppError::OutOfOrderVisit);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::instruction_discriminator;
    use crate::services::ledger::mock::MockLedger;
    use solana_sdk::signature::Signature;

    struct Fixture {
        ledger: Arc<MockLedger>,
        service: CheckInService,
        program: ScavengerHuntProgram,
        game_id: Pubkey,
        organizer: Pubkey,
        registry: Arc<LocationRegistry>,
    }

    fn fixture_with(ledger: MockLedger) -> Fixture {
        let ledger = Arc::new(ledger);
        let organizer = Arc::new(Keypair::new());
        let registry = Arc::new(LocationRegistry::from_keys([
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
        ]));
        let program = ScavengerHuntProgram::new(Pubkey::new_unique());
        let game_id = Pubkey::new_unique();
        let service = CheckInService::new(
            ledger.clone(),
            organizer.clone(),
            registry.clone(),
            program,
            game_id,
        );
        Fixture {
            ledger,
            service,
            program,
            game_id,
            organizer: organizer.pubkey(),
            registry,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MockLedger::new())
    }

    impl Fixture {
        fn place_user_at(&self, user: &Pubkey, index: u32) {
            let location = self.registry.by_index(index).unwrap();
            let state = UserState {
                user: *user,
                game_id: self.game_id,
                last_location: location.key,
            };
            self.ledger.set_account(
                self.program.user_state_address(&self.game_id, user),
                state.encode(),
            );
        }
    }

    fn decode(transaction: &str) -> Transaction {
        let bytes = STANDARD.decode(transaction).expect("valid base64");
        bincode::deserialize(&bytes).expect("valid transaction")
    }

    fn ix_names(tx: &Transaction) -> Vec<[u8; 8]> {
        tx.message
            .instructions
            .iter()
            .map(|ix| {
                let mut d = [0u8; 8];
                d.copy_from_slice(&ix.data[..8]);
                d
            })
            .collect()
    }

    #[tokio::test]
    async fn fresh_player_at_first_location_gets_initialize_and_check_in() {
        let f = fixture();
        let user = Pubkey::new_unique();
        let built = f
            .service
            .build_check_in_transaction(&user, &Pubkey::new_unique(), "1")
            .await
            .expect("first location should succeed");

        assert!(built.initializes_user);
        assert_eq!(built.location.index, 1);
        let tx = decode(&built.transaction);
        assert_eq!(
            ix_names(&tx),
            vec![
                instruction_discriminator("initialize"),
                instruction_discriminator("check_in")
            ]
        );
        assert_eq!(tx.message.account_keys[0], user);
        assert_eq!(tx.message.recent_blockhash.to_bytes(), [7u8; 32]);
    }

    #[tokio::test]
    async fn fresh_player_elsewhere_is_out_of_order() {
        let f = fixture();
        for id in ["2", "3"] {
            let result = f
                .service
                .build_check_in_transaction(&Pubkey::new_unique(), &Pubkey::new_unique(), id)
                .await;
            assert!(matches!(result, Err(AppError::OutOfOrderVisit)), "id {id}");
        }
    }

    #[tokio::test]
    async fn returning_player_may_only_advance_by_one() {
        let f = fixture();
        let user = Pubkey::new_unique();
        f.place_user_at(&user, 2);

        for id in ["1", "2"] {
            let result = f
                .service
                .build_check_in_transaction(&user, &Pubkey::new_unique(), id)
                .await;
            assert!(matches!(result, Err(AppError::OutOfOrderVisit)), "id {id}");
        }

        let built = f
            .service
            .build_check_in_transaction(&user, &Pubkey::new_unique(), "3")
            .await
            .expect("next location should succeed");
        assert!(!built.initializes_user);
        let tx = decode(&built.transaction);
        assert_eq!(ix_names(&tx), vec![instruction_discriminator("check_in")]);
    }

    #[tokio::test]
    async fn skipping_ahead_is_out_of_order() {
        let f = fixture();
        let user = Pubkey::new_unique();
        f.place_user_at(&user, 1);
        let result = f
            .service
            .build_check_in_transaction(&user, &Pubkey::new_unique(), "3")
            .await;
        assert!(matches!(result, Err(AppError::OutOfOrderVisit)));
    }

    #[tokio::test]
    async fn finished_player_cannot_check_in_again() {
        let f = fixture();
        let user = Pubkey::new_unique();
        f.place_user_at(&user, 3);
        for id in ["1", "3", "4"] {
            let result = f
                .service
                .build_check_in_transaction(&user, &Pubkey::new_unique(), id)
                .await;
            assert!(result.is_err(), "id {id}");
        }
    }

    #[tokio::test]
    async fn unknown_location_is_invalid_regardless_of_state() {
        let f = fixture();
        let fresh = Pubkey::new_unique();
        let returning = Pubkey::new_unique();
        f.place_user_at(&returning, 1);

        for user in [fresh, returning] {
            for id in ["0", "4", "-1", "abc", ""] {
                let result = f
                    .service
                    .build_check_in_transaction(&user, &Pubkey::new_unique(), id)
                    .await;
                assert!(matches!(result, Err(AppError::InvalidLocation)), "id {id:?}");
            }
        }
        assert_eq!(f.ledger.calls(), 0);
    }

    #[tokio::test]
    async fn transaction_is_partially_signed_by_organizer_only() {
        let f = fixture();
        let user = Pubkey::new_unique();
        let reference = Pubkey::new_unique();
        let built = f
            .service
            .build_check_in_transaction(&user, &reference, "1")
            .await
            .unwrap();
        let tx = decode(&built.transaction);

        let keys = &tx.message.account_keys;
        let signers = tx.message.header.num_required_signatures as usize;
        assert_eq!(signers, 2);
        assert_eq!(keys[0], user);

        let organizer_pos = keys.iter().position(|k| *k == f.organizer).unwrap();
        assert!(organizer_pos < signers);
        assert_ne!(tx.signatures[organizer_pos], Signature::default());
        assert_eq!(tx.signatures[0], Signature::default());
        assert!(tx.verify().is_err(), "player signature is still missing");
    }

    #[tokio::test]
    async fn reference_is_passive_account_in_check_in() {
        let f = fixture();
        let user = Pubkey::new_unique();
        let reference = Pubkey::new_unique();
        let built = f
            .service
            .build_check_in_transaction(&user, &reference, "1")
            .await
            .unwrap();
        let tx = decode(&built.transaction);

        let position = tx
            .message
            .account_keys
            .iter()
            .position(|k| *k == reference)
            .expect("reference should be included");
        let header = &tx.message.header;
        let readonly_unsigned_from =
            tx.message.account_keys.len() - header.num_readonly_unsigned_accounts as usize;
        assert!(position >= header.num_required_signatures as usize);
        assert!(position >= readonly_unsigned_from);

        let check_in = tx.message.instructions.last().unwrap();
        assert_eq!(*check_in.accounts.last().unwrap() as usize, position);
    }

    #[tokio::test]
    async fn reference_colliding_with_transaction_keys_is_rejected() {
        let f = fixture();
        let user = Pubkey::new_unique();
        let colliding = [
            user,
            f.organizer,
            *f.program.program_id(),
            f.program.user_state_address(&f.game_id, &user),
            system_program::id(),
        ];
        for reference in colliding {
            let result = f
                .service
                .build_check_in_transaction(&user, &reference, "1")
                .await;
            assert!(
                matches!(result, Err(AppError::InvalidAccount(ref key)) if *key == reference.to_string()),
                "reference {reference}"
            );
        }
        assert_eq!(f.ledger.calls(), 0);
    }

    #[tokio::test]
    async fn rpc_failure_propagates_as_system_error() {
        let f = fixture_with(MockLedger::failing());
        let result = f
            .service
            .build_check_in_transaction(&Pubkey::new_unique(), &Pubkey::new_unique(), "1")
            .await;
        match result {
            Err(e) => {
                assert!(matches!(e, AppError::BlockchainRPC(_)));
                assert!(!e.is_user_facing());
            }
            Ok(_) => panic!("expected rpc failure"),
        }
    }

    #[tokio::test]
    async fn unregistered_last_location_is_system_error() {
        let f = fixture();
        let user = Pubkey::new_unique();
        let state = UserState {
            user,
            game_id: f.game_id,
            last_location: Pubkey::new_unique(),
        };
        f.ledger.set_account(
            f.program.user_state_address(&f.game_id, &user),
            state.encode(),
        );
        let result = f
            .service
            .build_check_in_transaction(&user, &Pubkey::new_unique(), "1")
            .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn progress_reports_last_and_next() {
        let f = fixture();
        let user = Pubkey::new_unique();

        let fresh = f.service.progress(&user).await.unwrap();
        assert_eq!(fresh.last_location, None);
        assert_eq!(fresh.next_location.map(|l| l.index), Some(1));

        f.place_user_at(&user, 3);
        let done = f.service.progress(&user).await.unwrap();
        assert_eq!(done.last_location.map(|l| l.index), Some(3));
        assert_eq!(done.next_location, None);
    }

    #[test]
    fn validate_visit_order_rules() {
        let at = |index| Location {
            index,
            key: Pubkey::new_unique(),
        };
        assert!(validate_visit_order(None, &at(1)).is_ok());
        assert!(validate_visit_order(None, &at(2)).is_err());
        assert!(validate_visit_order(Some(&at(4)), &at(5)).is_ok());
        assert!(validate_visit_order(Some(&at(4)), &at(4)).is_err());
        assert!(validate_visit_order(Some(&at(4)), &at(6)).is_err());
    }
}
