//! `jobsettings-config` — tri-state job settings.
//!
//! Pure data crate: the settings model, its range validation, the text
//! document and binary wire forms, and the builder used for partial updates.
//! The only I/O is loading the injected [`Limits`] file.

pub mod binary;
pub mod builder;
pub mod limits;
pub mod settings;
pub mod text;
pub mod tri_state;
pub mod validate;

pub use binary::FieldSet;
pub use builder::SettingsBuilder;
pub use jobsettings_protocol::{DecodeError, WireVersion};
pub use limits::{Limits, LimitsError, DEFAULT_MAX_BUCKETS, MIN_PAGE_SEARCH_SIZE};
pub use settings::{
    SettingsField, SettingsModel, DEFAULT_ALIGN_CHECKPOINTS, DEFAULT_DATES_AS_EPOCH_MILLIS,
};
pub use text::{Document, ParseError, ParseMode};
pub use tri_state::TriState;
pub use validate::ValidationErrors;
