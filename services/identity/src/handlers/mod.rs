pub mod admin;
pub mod admission;
pub mod bootstrap;
pub mod extract;
pub mod health;
pub mod invite;
pub mod login;
pub mod me;
