pub mod admission;
pub mod bootstrap;
pub mod invite;
pub mod login;
pub mod role;
pub mod session;
