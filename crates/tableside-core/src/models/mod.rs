//! Data models for the Tableside platform API.
//!
//! This module contains the account-facing types exchanged with the
//! backend's auth endpoints:
//!
//! - `User`: the authenticated user's profile
//! - `RegisterRequest`, `LoginRequest`, `ProfileUpdate`: request bodies
//! - `Token`: the bearer credential returned by login

pub mod user;

pub use user::{LoginRequest, ProfileUpdate, RegisterRequest, Token, User};
