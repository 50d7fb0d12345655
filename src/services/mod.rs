pub mod ride_store;
pub mod storage;
