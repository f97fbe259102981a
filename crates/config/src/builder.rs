// Staging area for new settings and partial updates

use crate::settings::SettingsModel;
use crate::tri_state::TriState;

/// Mutable accumulator for a [`SettingsModel`].
///
/// Not meant to be shared: each update owns its builder for the duration of
/// one call (seed from the base, apply one update, build, drop).
#[derive(Debug, Clone, Default)]
pub struct SettingsBuilder {
    max_page_search_size: TriState<i32>,
    docs_per_second: TriState<f32>,
    dates_as_epoch_millis: TriState<bool>,
    align_checkpoints: TriState<bool>,
}

impl SettingsBuilder {
    /// All fields `Unset`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from `base`'s raw states, for partially updating it.
    pub fn from_base(base: &SettingsModel) -> Self {
        Self {
            max_page_search_size: base.max_page_search_size_raw(),
            docs_per_second: base.docs_per_second_raw(),
            dates_as_epoch_millis: base.dates_as_epoch_millis_raw(),
            align_checkpoints: base.align_checkpoints_raw(),
        }
    }

    /// Batch fetch size, between 10 and the configured bucket limit.
    /// `None` resets to the default.
    pub fn set_max_page_search_size(&mut self, value: Option<i32>) -> &mut Self {
        self.max_page_search_size = TriState::from_nullable(value);
        self
    }

    /// Throttle in documents per second; 0 disables throttling.
    /// `None` resets to the default.
    pub fn set_docs_per_second(&mut self, value: Option<f32>) -> &mut Self {
        self.docs_per_second = TriState::from_nullable(value);
        self
    }

    /// Write date aggregation output as epoch millis instead of ISO strings.
    /// `None` resets to the default.
    pub fn set_dates_as_epoch_millis(&mut self, value: Option<bool>) -> &mut Self {
        self.dates_as_epoch_millis = TriState::from_nullable(value);
        self
    }

    /// Snap checkpoint ranges to the date histogram interval.
    /// `None` resets to the default.
    pub fn set_align_checkpoints(&mut self, value: Option<bool>) -> &mut Self {
        self.align_checkpoints = TriState::from_nullable(value);
        self
    }

    /// Applies a partial update.
    ///
    /// Per field: `Unset` in `update` keeps the current state, `Default`
    /// clears it to `Unset` rather than pinning the reset, `Value` overwrites.
    pub fn update(&mut self, update: &SettingsModel) -> &mut Self {
        self.max_page_search_size.merge(update.max_page_search_size_raw());
        self.docs_per_second.merge(update.docs_per_second_raw());
        self.dates_as_epoch_millis.merge(update.dates_as_epoch_millis_raw());
        self.align_checkpoints.merge(update.align_checkpoints_raw());
        self
    }

    pub fn build(&self) -> SettingsModel {
        SettingsModel::new(
            self.max_page_search_size,
            self.docs_per_second,
            self.dates_as_epoch_millis,
            self.align_checkpoints,
        )
    }
}

impl From<&SettingsModel> for SettingsBuilder {
    fn from(base: &SettingsModel) -> Self {
        Self::from_base(base)
    }
}
