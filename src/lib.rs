//! Lanyard Badge Service
//!
//! Event badge service: collects attendee submissions through a web form,
//! persists each one as a row in a shared Google Sheet, generates a
//! time-based identifier and a QR code encoding the public profile link,
//! and renders a profile page for each badge.
//!
//! ## Architecture
//!
//! ```text
//! Submission Form          Badge Service              Google Sheets
//! ┌──────────────┐        ┌──────────────┐           ┌──────────────┐
//! │ GET /        │        │ validate     │  read     │ Sheet1!A:L   │
//! │ POST /badges │───────▶│ dup check    │──────────▶│ one row per  │
//! └──────────────┘        │ id + QR gen  │  append   │ badge        │
//!        │                └──────────────┘           └──────────────┘
//!        │                        │                         ▲
//!        ▼                        ▼                         │
//! ┌──────────────┐        ┌──────────────┐                  │
//! │ Profile Page │◀───────│ Lookup       │──────────────────┘
//! │ GET /profile │        │ GET /badges  │  read
//! └──────────────┘        └──────────────┘
//! ```
//!
//! Storage is append-only: badges are never updated or deleted. The
//! duplicate check is a linear scan over all rows, so two identical
//! submissions racing each other can both land (see `BadgeService`).

pub mod badge;
pub mod badge_service;
pub mod config;
pub mod error;
pub mod pages;
pub mod qr;
pub mod routes;
pub mod sheet_store;

pub use badge::{BadgeRecord, BadgeSummary, NewBadge};
pub use badge_service::{BadgeService, CreatedBadge};
pub use config::Config;
pub use error::{BadgeError, StoreError};
pub use routes::AppState;
pub use sheet_store::{RecordStore, SheetStore};
