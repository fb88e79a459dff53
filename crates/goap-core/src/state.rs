use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether a field holds a pipeline-stage flag or a numeric metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FieldKind {
    Flag,
    Metric,
}

/// The fixed world-state schema.
///
/// The declaration order here is the canonical order used by [`StateKey`]; new fields must be
/// appended to [`Field::ALL`] as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Field {
    RepoScanned,
    DependenciesMapped,
    EmbeddingsGenerated,
    BaselineLoaded,
    PatternsExtracted,
    DriftAnalyzed,
    ViolationsClassified,
    ReportGenerated,
    DashboardUpdated,
    ResultsSynced,
    FilesScanned,
    DriftScore,
    OpenViolations,
}

impl Field {
    pub const COUNT: usize = 13;

    pub const ALL: [Field; Field::COUNT] = [
        Field::RepoScanned,
        Field::DependenciesMapped,
        Field::EmbeddingsGenerated,
        Field::BaselineLoaded,
        Field::PatternsExtracted,
        Field::DriftAnalyzed,
        Field::ViolationsClassified,
        Field::ReportGenerated,
        Field::DashboardUpdated,
        Field::ResultsSynced,
        Field::FilesScanned,
        Field::DriftScore,
        Field::OpenViolations,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            Field::FilesScanned | Field::DriftScore | Field::OpenViolations => FieldKind::Metric,
            _ => FieldKind::Flag,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Field::RepoScanned => "repo_scanned",
            Field::DependenciesMapped => "dependencies_mapped",
            Field::EmbeddingsGenerated => "embeddings_generated",
            Field::BaselineLoaded => "baseline_loaded",
            Field::PatternsExtracted => "patterns_extracted",
            Field::DriftAnalyzed => "drift_analyzed",
            Field::ViolationsClassified => "violations_classified",
            Field::ReportGenerated => "report_generated",
            Field::DashboardUpdated => "dashboard_updated",
            Field::ResultsSynced => "results_synced",
            Field::FilesScanned => "files_scanned",
            Field::DriftScore => "drift_score",
            Field::OpenViolations => "open_violations",
        }
    }

    /// Default value for the field: `false` for flags, `0` for metrics.
    pub const fn default_value(self) -> Value {
        match self.kind() {
            FieldKind::Flag => Value::Flag(false),
            FieldKind::Metric => Value::Metric(0.0),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown world-state field `{0}`")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// A single field value.
///
/// Equality is strict: a flag never equals a metric, and metrics compare with `f64` equality.
/// States and partial states never hold NaN, so equality stays reflexive.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Flag(bool),
    Metric(f64),
}

impl Value {
    pub const fn kind(self) -> FieldKind {
        match self {
            Value::Flag(_) => FieldKind::Flag,
            Value::Metric(_) => FieldKind::Metric,
        }
    }

    fn canonical_bits(self) -> u64 {
        match self {
            Value::Flag(b) => b as u64,
            // -0.0 == 0.0, so both must encode identically.
            Value::Metric(x) if x == 0.0 => 0,
            Value::Metric(x) => x.to_bits(),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Flag(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Metric(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Metric(f64::from(value))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Flag(b) => write!(f, "{b}"),
            Value::Metric(x) => write!(f, "{x}"),
        }
    }
}

/// A value the schema cannot hold.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum InvalidValue {
    #[error("field `{field}` expects a {expected:?} value, got {value}")]
    WrongKind {
        field: Field,
        expected: FieldKind,
        value: Value,
    },

    #[error("field `{0}` cannot hold NaN")]
    NotANumber(Field),
}

fn check_value(field: Field, value: Value) -> Result<(), InvalidValue> {
    if field.kind() != value.kind() {
        return Err(InvalidValue::WrongKind {
            field,
            expected: field.kind(),
            value,
        });
    }
    match value {
        Value::Metric(x) if x.is_nan() => Err(InvalidValue::NotANumber(field)),
        _ => Ok(()),
    }
}

/// Canonical, order-independent encoding of a [`WorldState`].
///
/// One word per field in [`Field::ALL`] order. Used as the closed-set and frontier key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateKey([u64; Field::COUNT]);

/// Full snapshot of pipeline progress flags and metrics.
///
/// States have value semantics: operations that change a state return a fresh copy.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldState {
    values: [Value; Field::COUNT],
}

impl Default for WorldState {
    fn default() -> Self {
        Self {
            values: Field::ALL.map(Field::default_value),
        }
    }
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> Value {
        self.values[field.index()]
    }

    /// Flag value; `false` for metric fields.
    pub fn flag(&self, field: Field) -> bool {
        matches!(self.get(field), Value::Flag(true))
    }

    /// Metric value; `0.0` for flag fields.
    pub fn metric(&self, field: Field) -> f64 {
        match self.get(field) {
            Value::Metric(x) => x,
            Value::Flag(_) => 0.0,
        }
    }

    pub fn try_set(&mut self, field: Field, value: impl Into<Value>) -> Result<(), InvalidValue> {
        let value = value.into();
        check_value(field, value)?;
        self.values[field.index()] = value;
        Ok(())
    }

    /// Builder-style setter.
    ///
    /// Panics when the value's kind does not match the field's schema kind or the value is NaN; use
    /// [`WorldState::try_set`] for untrusted input.
    #[must_use]
    pub fn with(mut self, field: Field, value: impl Into<Value>) -> Self {
        if let Err(err) = self.try_set(field, value) {
            panic!("{err}");
        }
        self
    }

    /// Overwrite every field listed in `partial`, leaving the rest unchanged.
    ///
    /// Callers are expected to have validated `partial` against the schema (catalogs do this on
    /// construction).
    #[must_use]
    pub fn overlay(&self, partial: &PartialState) -> Self {
        let mut next = self.clone();
        for (field, value) in partial.iter() {
            next.values[field.index()] = value;
        }
        next
    }

    pub fn key(&self) -> StateKey {
        StateKey(self.values.map(Value::canonical_bits))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, Value)> + '_ {
        Field::ALL.iter().map(move |&field| (field, self.get(field)))
    }
}

/// Sparse association from field to expected value.
///
/// Used for action preconditions, action effects, and goal targets: only listed fields are
/// checked or changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialState {
    values: [Option<Value>; Field::COUNT],
}

impl PartialState {
    pub const fn empty() -> Self {
        Self {
            values: [None; Field::COUNT],
        }
    }

    #[must_use]
    pub fn with(mut self, field: Field, value: impl Into<Value>) -> Self {
        self.values[field.index()] = Some(value.into());
        self
    }

    pub fn get(&self, field: Field) -> Option<Value> {
        self.values[field.index()]
    }

    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, Value)> + '_ {
        Field::ALL
            .iter()
            .filter_map(move |&field| self.get(field).map(|value| (field, value)))
    }

    /// True iff every listed field equals the state's value.
    pub fn matches(&self, state: &WorldState) -> bool {
        self.iter().all(|(field, value)| state.get(field) == value)
    }

    /// Listed fields whose required value differs from the state's value.
    pub fn mismatches<'a>(
        &'a self,
        state: &'a WorldState,
    ) -> impl Iterator<Item = (Field, Value)> + 'a {
        self.iter()
            .filter(move |&(field, value)| state.get(field) != value)
    }

    /// First listed value the schema rejects, if any.
    pub fn validate(&self) -> Result<(), InvalidValue> {
        self.iter()
            .try_for_each(|(field, value)| check_value(field, value))
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{check_value, Field, PartialState, Value, WorldState};

    impl Serialize for WorldState {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_map(self.iter())
        }
    }

    /// Missing fields keep their schema default.
    impl<'de> Deserialize<'de> for WorldState {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let raw = BTreeMap::<Field, Value>::deserialize(deserializer)?;
            let mut state = WorldState::default();
            for (field, value) in raw {
                state.try_set(field, value).map_err(D::Error::custom)?;
            }
            Ok(state)
        }
    }

    impl Serialize for PartialState {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_map(self.iter())
        }
    }

    impl<'de> Deserialize<'de> for PartialState {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let raw = BTreeMap::<Field, Value>::deserialize(deserializer)?;
            let mut partial = PartialState::empty();
            for (field, value) in raw {
                check_value(field, value).map_err(D::Error::custom)?;
                partial = partial.with(field, value);
            }
            Ok(partial)
        }
    }
}
