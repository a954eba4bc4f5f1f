//! Core types and trait definitions for Studium, a student's academic
//! record: subjects, weighted grades, and dated reminders.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! [`engine`] module holds every derived computation (averages, performance
//! categories, reminder timing) as pure functions over caller-supplied
//! snapshots. Persistence is expressed as the [`store::AcademicStore`] and
//! [`store::AccountStore`] traits and implemented elsewhere.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod clock;
pub mod engine;
pub mod error;
pub mod grade;
pub mod reminder;
pub mod store;
pub mod subject;

pub use error::{Error, Result};
