//! Domain types shared across all Clubhouse services.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod clock;
pub mod invite;
pub mod member;
pub mod phone;
