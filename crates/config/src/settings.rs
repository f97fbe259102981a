// Job settings: the optional tunables of a long-running data-processing job
// Every field is tri-state so partial updates can say "leave", "reset" or "set".

use std::fmt;

use ordered_float::OrderedFloat;

use crate::builder::SettingsBuilder;
use crate::tri_state::TriState;

/// What `dates_as_epoch_millis` reads as when explicitly reset.
pub const DEFAULT_DATES_AS_EPOCH_MILLIS: bool = false;

/// What `align_checkpoints` reads as when explicitly reset.
///
/// Unlike every other boolean setting, a reset here reads as `true`.
pub const DEFAULT_ALIGN_CHECKPOINTS: bool = true;

/// Stable identifiers for the four settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsField {
    MaxPageSearchSize,
    DocsPerSecond,
    DatesAsEpochMillis,
    AlignCheckpoints,
}

impl SettingsField {
    /// All fields, in document and wire order.
    pub const ALL: [SettingsField; 4] = [
        SettingsField::MaxPageSearchSize,
        SettingsField::DocsPerSecond,
        SettingsField::DatesAsEpochMillis,
        SettingsField::AlignCheckpoints,
    ];

    /// Key used in the text document (case-sensitive).
    pub fn key(self) -> &'static str {
        match self {
            Self::MaxPageSearchSize => "max_page_search_size",
            Self::DocsPerSecond => "docs_per_second",
            Self::DatesAsEpochMillis => "dates_as_epoch_millis",
            Self::AlignCheckpoints => "align_checkpoints",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Immutable job settings.
///
/// Build one with [`SettingsModel::new`], [`SettingsBuilder`], the text codec
/// ([`SettingsModel::from_document`]) or the binary codec
/// ([`SettingsModel::decode`]). Updates always produce a new value.
///
/// A freshly built or parsed model may hold out-of-range values; run
/// [`SettingsModel::validate`] before accepting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SettingsModel {
    max_page_search_size: TriState<i32>,
    docs_per_second: TriState<OrderedFloat<f32>>,
    dates_as_epoch_millis: TriState<bool>,
    align_checkpoints: TriState<bool>,
}

impl SettingsModel {
    pub fn new(
        max_page_search_size: TriState<i32>,
        docs_per_second: TriState<f32>,
        dates_as_epoch_millis: TriState<bool>,
        align_checkpoints: TriState<bool>,
    ) -> Self {
        Self {
            max_page_search_size,
            docs_per_second: docs_per_second.map(OrderedFloat),
            dates_as_epoch_millis,
            align_checkpoints,
        }
    }

    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::new()
    }

    /// Builder seeded with this model's states, for partial updates.
    pub fn to_builder(&self) -> SettingsBuilder {
        SettingsBuilder::from_base(self)
    }

    /// New model with `partial`'s changes applied on top of this one.
    pub fn apply_update(&self, partial: &SettingsModel) -> SettingsModel {
        let mut builder = self.to_builder();
        builder.update(partial);
        builder.build()
    }

    /// True when every field is `Unset`.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    // -------------------------------------------------------------------------
    // Business accessors
    // -------------------------------------------------------------------------

    /// Batch fetch size, or `None` when the system default applies.
    pub fn max_page_search_size(&self) -> Option<i32> {
        self.max_page_search_size.value().copied()
    }

    /// Throttle rate, or `None` when unthrottled by configuration.
    pub fn docs_per_second(&self) -> Option<f32> {
        self.docs_per_second.value().map(|v| v.0)
    }

    /// `None` when unset; a reset reads as `false`.
    pub fn dates_as_epoch_millis(&self) -> Option<bool> {
        self.dates_as_epoch_millis.resolve(DEFAULT_DATES_AS_EPOCH_MILLIS)
    }

    /// `None` when unset; a reset reads as `true`.
    pub fn align_checkpoints(&self) -> Option<bool> {
        self.align_checkpoints.resolve(DEFAULT_ALIGN_CHECKPOINTS)
    }

    // -------------------------------------------------------------------------
    // Raw accessors (merge and codecs)
    // -------------------------------------------------------------------------

    pub fn max_page_search_size_raw(&self) -> TriState<i32> {
        self.max_page_search_size
    }

    pub fn docs_per_second_raw(&self) -> TriState<f32> {
        self.docs_per_second.map(|v| v.0)
    }

    pub fn dates_as_epoch_millis_raw(&self) -> TriState<bool> {
        self.dates_as_epoch_millis
    }

    pub fn align_checkpoints_raw(&self) -> TriState<bool> {
        self.align_checkpoints
    }
}

impl fmt::Display for SettingsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = serde_json::Value::Object(self.to_document());
        match serde_json::to_string_pretty(&doc) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}
