//! The verse of the day.
//!
//! Given a calendar date and a per-device random seed, [`DailyVerseSelector`]
//! picks one entry of the curated list. The same (seed, date, language,
//! assets) always gives the same verse, in every process that shares the
//! device's store, which is what lets an app and its widget agree on "today's
//! verse" without talking to each other.

mod display;
pub mod error;
pub mod hash;
pub mod preference;
mod seed;
mod selector;

pub use crate::display::{DisplayVerse, VerseStatus};
pub use crate::seed::{DeviceSeed, SeedOrigin};
pub use crate::selector::{DailyVerseSelector, local_today};
