// All service modules
pub mod checkin;
pub mod ledger;
pub mod program;
