//! Client library for the NetSchool school portal.
//!
//! The [`Client`] owns the portal session: its HTTP identity, cookie jar and the identifiers
//! resolved after login. Portal-side logins live under [`auth`], typed data accessors under
//! [`portal`]. Federated logins through the identity broker are provided by the
//! `netschool-auth` crate on top of the hooks exposed here.

pub mod auth;
pub mod client;
mod error;
pub mod http;
pub mod models;
pub mod portal;
pub mod regions;

pub use client::{Client, ClientSettings};
pub use error::{
    truncate_for_display, ApiError, MissingFieldError, NotAuthenticatedError, SessionExpiredError,
};
