// Binary form of job settings, gated by the negotiated wire version
//
// Slot order is fixed: page size, rate, then (when the version has them)
// dates-as-epoch-millis and align-checkpoints. Every slot is optional; a
// reserved sentinel inside a present slot means "reset to default".

use jobsettings_protocol::{DecodeError, WireReader, WireVersion, WireWriter};

use crate::settings::{SettingsField, SettingsModel};
use crate::tri_state::TriState;

const RESET_PAGE_SEARCH_SIZE: i32 = -1;
const RESET_DOCS_PER_SECOND: f32 = -1.0;
// Boolean fields travel as integers: 0 / 1, or this for a reset.
const RESET_FLAG: i32 = -1;

impl SettingsField {
    /// First wire version that carries this field.
    pub fn introduced_in(self) -> WireVersion {
        match self {
            Self::MaxPageSearchSize | Self::DocsPerSecond => WireVersion::V0,
            Self::DatesAsEpochMillis => WireVersion::V1,
            Self::AlignCheckpoints => WireVersion::V2,
        }
    }
}

/// Fields a given wire version can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSet {
    bits: u8,
}

impl FieldSet {
    fn bit(field: SettingsField) -> u8 {
        match field {
            SettingsField::MaxPageSearchSize => 1,
            SettingsField::DocsPerSecond => 1 << 1,
            SettingsField::DatesAsEpochMillis => 1 << 2,
            SettingsField::AlignCheckpoints => 1 << 3,
        }
    }

    pub fn for_version(version: WireVersion) -> Self {
        let bits = SettingsField::ALL
            .into_iter()
            .filter(|f| version.on_or_after(f.introduced_in()))
            .fold(0, |acc, f| acc | Self::bit(f));
        Self { bits }
    }

    pub fn contains(self, field: SettingsField) -> bool {
        self.bits & Self::bit(field) != 0
    }
}

fn flag_to_raw(state: TriState<bool>) -> Option<i32> {
    state.map(i32::from).into_raw(RESET_FLAG)
}

fn flag_from_raw(raw: Option<i32>) -> TriState<bool> {
    TriState::from_raw(raw, RESET_FLAG).map(|v| v > 0)
}

impl SettingsModel {
    /// Write this model for a peer speaking `writer.version()`.
    ///
    /// Fields the version does not know are left out.
    pub fn write_to(&self, writer: &mut WireWriter) {
        let fields = FieldSet::for_version(writer.version());

        writer.write_optional_i32(self.max_page_search_size_raw().into_raw(RESET_PAGE_SEARCH_SIZE));
        writer.write_optional_f32(self.docs_per_second_raw().into_raw(RESET_DOCS_PER_SECOND));
        if fields.contains(SettingsField::DatesAsEpochMillis) {
            writer.write_optional_i32(flag_to_raw(self.dates_as_epoch_millis_raw()));
        }
        if fields.contains(SettingsField::AlignCheckpoints) {
            writer.write_optional_i32(flag_to_raw(self.align_checkpoints_raw()));
        }
    }

    /// Read a model written by a peer speaking `reader.version()`.
    ///
    /// Fields older than the sender's version come back as `Default`: such
    /// peers always behaved as if the flag was at its default. Anything after
    /// the last known slot is not read.
    pub fn read_from(reader: &mut WireReader<'_>) -> Result<SettingsModel, DecodeError> {
        let fields = FieldSet::for_version(reader.version());

        let max_page_search_size =
            TriState::from_raw(reader.read_optional_i32()?, RESET_PAGE_SEARCH_SIZE);
        let docs_per_second =
            TriState::from_raw(reader.read_optional_f32()?, RESET_DOCS_PER_SECOND);
        let dates_as_epoch_millis = if fields.contains(SettingsField::DatesAsEpochMillis) {
            flag_from_raw(reader.read_optional_i32()?)
        } else {
            TriState::Default
        };
        let align_checkpoints = if fields.contains(SettingsField::AlignCheckpoints) {
            flag_from_raw(reader.read_optional_i32()?)
        } else {
            TriState::Default
        };

        Ok(SettingsModel::new(
            max_page_search_size,
            docs_per_second,
            dates_as_epoch_millis,
            align_checkpoints,
        ))
    }

    pub fn encode(&self, version: WireVersion) -> Vec<u8> {
        let mut writer = WireWriter::new(version);
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    pub fn decode(bytes: &[u8], version: WireVersion) -> Result<SettingsModel, DecodeError> {
        Self::read_from(&mut WireReader::new(bytes, version))
    }
}
