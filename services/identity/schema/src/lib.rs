pub mod invite_codes;
pub mod members;
