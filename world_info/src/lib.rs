//! # World Info
//!
//! Decides which lorebook entries are active for a piece of story text and
//! renders them for the generation prompt.
//!
//! ## Core Components
//!
//! - **matching**: Literal, whole-word and pattern matching of trigger keys
//! - **activation**: The [`WorldInfoEngine`]: scan window, bounded recursive
//!   re-scanning, inclusion groups and token budgeting
//! - **prompt**: Formatting of activated entries into a prompt section
//!
//! ## Design Philosophy
//!
//! - **Never fails**: A malformed entry only disables itself; activation always returns
//! - **Call-scoped**: The engine holds settings only; all per-scan state lives in one call
//! - **Injectable randomness**: Probability gates and group draws take any [`rand::Rng`]

pub mod activation;
pub mod matching;
pub mod prompt;

pub use activation::*;
pub use matching::*;
pub use prompt::*;

pub use lorebook::{ActivationSettings, Entry, EntryId, Lorebook, SelectiveLogic, TriggerKey};
