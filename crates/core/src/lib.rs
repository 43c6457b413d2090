//! Core types for the keebdb catalog.
//!
//! - [`keyboard`]: the `Keyboard` record.
//! - [`codec`]: the [`Record`](codec::Record) trait mapping records to store items.
//! - [`storage`]: table definitions, the error taxonomy and the [`TableStore`](storage::TableStore) seam.

pub mod codec;
pub mod keyboard;
pub mod storage;

pub use codec::Record;
pub use keyboard::Keyboard;
