pub mod agent;
pub mod ledger;
