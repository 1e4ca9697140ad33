pub mod cache;
pub mod db;
pub mod ephemeral;
pub mod memory;
pub mod sms;
