pub mod codec;
pub mod energy;
pub mod models;
pub mod rollover;
pub mod storage;
pub mod store;
pub mod summary;
pub mod totals;
