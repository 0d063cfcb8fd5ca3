//! # Lorebook
//!
//! Lore definitions for world info activation. This crate is the single source
//! of truth for what a lorebook entry *is*; it does not decide which entries
//! are active (see the `world_info` crate).
//!
//! ## Core Components
//!
//! - **entries**: The canonical [`Entry`] shape, its [`TriggerKey`]s and [`SelectiveLogic`]
//! - **book**: Named collections of entries
//! - **settings**: Per-call [`ActivationSettings`] and the token estimate they use
//! - **import**: Normalization of persisted lorebook JSON (standalone and V2 card shapes)

pub mod book;
pub mod entries;
pub mod error;
pub mod import;
pub mod settings;

pub use book::*;
pub use entries::*;
pub use error::*;
pub use import::*;
pub use settings::*;
