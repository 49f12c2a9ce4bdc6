pub mod chargeable;
pub mod income;
pub mod ledger;
pub mod sequencer;
