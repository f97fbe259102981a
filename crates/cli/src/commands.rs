// Command implementations. Each returns the text to print on stdout.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{json, Value};
use thiserror::Error;

use jobsettings_config::{
    DecodeError, Limits, LimitsError, ParseError, ParseMode, SettingsModel, TriState,
    ValidationErrors, WireVersion,
};

use crate::exit_codes::{EXIT_DECODE, EXIT_ERROR, EXIT_LIMITS, EXIT_PARSE, EXIT_VALIDATION};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("{name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: ParseError,
    },
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("cannot decode payload at {version}: {source}")]
    Decode {
        version: WireVersion,
        #[source]
        source: DecodeError,
    },
    #[error(transparent)]
    Limits(#[from] LimitsError),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Read { .. } => EXIT_ERROR,
            CliError::Parse { .. } => EXIT_PARSE,
            CliError::Validation(_) => EXIT_VALIDATION,
            CliError::Base64(_) | CliError::Decode { .. } => EXIT_DECODE,
            CliError::Limits(_) => EXIT_LIMITS,
        }
    }
}

fn parse_mode(lenient: bool) -> ParseMode {
    if lenient {
        ParseMode::Lenient
    } else {
        ParseMode::Strict
    }
}

/// Read a settings document from a file, or stdin for `-`.
fn read_settings(input: &Path, mode: ParseMode) -> Result<SettingsModel, CliError> {
    let name = input.display().to_string();
    let contents = if input == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CliError::Read {
                name: "stdin".into(),
                source,
            })?;
        buf
    } else {
        fs::read_to_string(input).map_err(|source| CliError::Read {
            name: name.clone(),
            source,
        })?
    };
    SettingsModel::from_json_str(&contents, mode)
        .map_err(|source| CliError::Parse { name, source })
}

/// An explicit limits file must load. The default one falls back to
/// built-in limits.
fn load_limits(path: Option<&Path>) -> Result<Limits, CliError> {
    match path {
        Some(path) => Ok(Limits::load(Some(path))?),
        None => Ok(Limits::load_or_default(None)),
    }
}

fn validated(model: SettingsModel, limits: &Limits) -> Result<SettingsModel, CliError> {
    model
        .validate(limits)
        .into_result()
        .map_err(CliError::Validation)?;
    Ok(model)
}

/// `check`: parse and validate, print the normalized document.
pub fn check(
    input: &Path,
    lenient: bool,
    limits_path: Option<&Path>,
) -> Result<String, CliError> {
    let limits = load_limits(limits_path)?;
    let model = read_settings(input, parse_mode(lenient))?;
    tracing::debug!(
        input = %input.display(),
        max_buckets = limits.max_buckets,
        "checking settings"
    );
    Ok(validated(model, &limits)?.to_string())
}

/// `merge`: apply a partial update to a base document.
pub fn merge(
    base: &Path,
    update: &Path,
    lenient: bool,
    limits_path: Option<&Path>,
) -> Result<String, CliError> {
    let limits = load_limits(limits_path)?;
    let mode = parse_mode(lenient);
    let base_model = read_settings(base, mode)?;
    let update_model = read_settings(update, mode)?;
    let merged = base_model.apply_update(&update_model);
    tracing::debug!(base = %base.display(), update = %update.display(), "merged settings");
    Ok(validated(merged, &limits)?.to_string())
}

/// `encode`: binary form for a peer at `peer`, as base64.
pub fn encode(input: &Path, peer: WireVersion, lenient: bool) -> Result<String, CliError> {
    let model = read_settings(input, parse_mode(lenient))?;
    let version = WireVersion::CURRENT.negotiate(peer);
    let bytes = model.encode(version);
    tracing::debug!(%version, bytes = bytes.len(), "encoded settings");
    Ok(STANDARD.encode(bytes))
}

fn state_json<T: Into<Value>>(state: TriState<T>) -> Value {
    match state {
        TriState::Unset => json!({ "state": "unset" }),
        TriState::Default => json!({ "state": "default" }),
        TriState::Value(v) => {
            let value: Value = v.into();
            json!({ "state": "value", "value": value })
        }
    }
}

/// `decode`: every field's state, so a reset can be told apart from unset.
pub fn decode(payload: &str, version: WireVersion) -> Result<String, CliError> {
    let bytes = STANDARD.decode(payload.trim())?;
    let model = SettingsModel::decode(&bytes, version)
        .map_err(|source| CliError::Decode { version, source })?;
    tracing::debug!(%version, bytes = bytes.len(), "decoded settings");

    let report = json!({
        "wire_version": version.to_string(),
        "max_page_search_size": state_json(model.max_page_search_size_raw()),
        "docs_per_second": state_json(model.docs_per_second_raw()),
        "dates_as_epoch_millis": state_json(model.dates_as_epoch_millis_raw()),
        "align_checkpoints": state_json(model.align_checkpoints_raw()),
    });
    Ok(serde_json::to_string_pretty(&report).unwrap_or_else(|_| report.to_string()))
}
