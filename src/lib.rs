//! Sticker Quiz: Personality Wizard and Sticker Generation Service
//!
//! A short personality quiz drives a per-session wizard state machine. Once
//! the answers are complete an archetype is derived, a sticker image is
//! generated through a primary/secondary/placeholder fallback chain, and the
//! result is handed to external collaborators (object storage, webhook, SMTP).

pub mod archetype;
pub mod background;
pub mod cli;
pub mod collaborators;
pub mod config;
pub mod contact;
pub mod error;
pub mod generation;
pub mod image;
pub mod logging;
pub mod provider;
pub mod quiz;
pub mod server;
pub mod services;
pub mod wizard;
