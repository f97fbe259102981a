// Three-state setting value: not configured, reset to default, or set

/// A setting that can be left alone, explicitly reset, or explicitly set.
///
/// - `Unset` - not configured; the system default applies and nothing is written
/// - `Default` - explicitly cleared back to the system default
/// - `Value(T)` - explicitly configured
///
/// The text form cannot tell `Unset` from `Default` (both are omitted); the
/// binary form and the merge logic can.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriState<T> {
    #[default]
    Unset,
    Default,
    Value(T),
}

impl<T> TriState<T> {
    /// Business-facing nullable input: `None` is an explicit reset.
    pub fn from_nullable(value: Option<T>) -> Self {
        match value {
            Some(v) => TriState::Value(v),
            None => TriState::Default,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, TriState::Unset)
    }

    pub fn is_default(&self) -> bool {
        matches!(self, TriState::Default)
    }

    /// True only for `Value`; the text codec writes nothing else.
    pub fn is_override(&self) -> bool {
        matches!(self, TriState::Value(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            TriState::Value(v) => Some(v),
            TriState::Unset | TriState::Default => None,
        }
    }

    pub fn as_ref(&self) -> TriState<&T> {
        match self {
            TriState::Unset => TriState::Unset,
            TriState::Default => TriState::Default,
            TriState::Value(v) => TriState::Value(v),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> TriState<U> {
        match self {
            TriState::Unset => TriState::Unset,
            TriState::Default => TriState::Default,
            TriState::Value(v) => TriState::Value(f(v)),
        }
    }

    /// Resolve against a field's default view: `Unset` stays `None`.
    pub fn resolve(self, default: T) -> Option<T> {
        match self {
            TriState::Unset => None,
            TriState::Default => Some(default),
            TriState::Value(v) => Some(v),
        }
    }

    /// Apply a partial-update state onto this one.
    ///
    /// `Unset` leaves the field alone, `Default` clears it back to `Unset`,
    /// `Value` overwrites it.
    pub fn merge(&mut self, update: TriState<T>) {
        match update {
            TriState::Unset => {}
            TriState::Default => *self = TriState::Unset,
            TriState::Value(v) => *self = TriState::Value(v),
        }
    }
}

impl<T: PartialEq> TriState<T> {
    /// Decode the sentinel form: absent is `Unset`, `reset` is `Default`.
    pub fn from_raw(raw: Option<T>, reset: T) -> Self {
        match raw {
            None => TriState::Unset,
            Some(v) if v == reset => TriState::Default,
            Some(v) => TriState::Value(v),
        }
    }

    /// Encode to the sentinel form understood by older peers.
    pub fn into_raw(self, reset: T) -> Option<T> {
        match self {
            TriState::Unset => None,
            TriState::Default => Some(reset),
            TriState::Value(v) => Some(v),
        }
    }
}
