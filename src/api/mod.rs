// src/api/mod.rs

pub mod checkin;
pub mod health;
pub mod locations;
pub mod players;

use std::sync::Arc;

use crate::config::Config;
use crate::services::checkin::CheckInService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub checkin: Arc<CheckInService>,
}
