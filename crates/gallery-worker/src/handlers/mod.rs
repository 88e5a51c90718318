pub mod health;
pub mod storage_events;
