use crate::error::ValidationError;
use crate::utils::parse_field;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic point as `[lat, lng]`, the shape the map widget hands out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(c: Coords) -> Self {
        [c.lat, c.lng]
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    /// Capitalized form used in descriptions.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    /// The field that differs between the two kinds.
    pub const fn variable_field(self) -> Field {
        match self {
            Self::Running => Field::Cadence,
            Self::Cycling => Field::Elevation,
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric form fields, named for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Distance,
    Duration,
    Cadence,
    Elevation,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Distance => "distance",
            Self::Duration => "duration",
            Self::Cadence => "cadence",
            Self::Elevation => "elevation gain",
        })
    }
}

/// Lookup key for edit and delete. Never changes once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    /// Last ten digits of the epoch-millisecond timestamp.
    pub fn from_millis(millis: i64) -> Self {
        let digits = millis.to_string();
        let start = digits.len().saturating_sub(10);
        Self(digits[start..].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for WorkoutId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkoutId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Already-parsed numeric inputs. `variable` is cadence for running and
/// elevation gain for cycling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricInputs {
    pub distance_km: f64,
    pub duration_min: f64,
    pub variable: f64,
}

/// Form field values exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInputs {
    pub distance: String,
    pub duration: String,
    pub variable: String,
}

impl RawInputs {
    pub fn new(
        distance: impl Into<String>,
        duration: impl Into<String>,
        variable: impl Into<String>,
    ) -> Self {
        Self {
            distance: distance.into(),
            duration: duration.into(),
            variable: variable.into(),
        }
    }

    pub fn parse(&self, kind: WorkoutKind) -> Result<MetricInputs, ValidationError> {
        Ok(MetricInputs {
            distance_km: parse_field(Field::Distance, &self.distance)?,
            duration_min: parse_field(Field::Duration, &self.duration)?,
            variable: parse_field(kind.variable_field(), &self.variable)?,
        })
    }
}

/// Kind-specific measurements together with the metric derived from them.
#[derive(Debug, Clone, PartialEq)]
pub enum Metrics {
    Running {
        cadence_spm: f64,
        pace_min_per_km: f64,
    },
    Cycling {
        elevation_gain_m: f64,
        speed_km_per_h: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsUpdate {
    Updated,
    Unchanged,
}

/// One logged activity.
///
/// Fields are private so the derived values (pace or speed, description)
/// can only change together with the inputs they are computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    coords: Coords,
    distance_km: f64,
    duration_min: f64,
    description: String,
    metrics: Metrics,
}

impl Workout {
    pub fn running(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    ) -> Result<Self, ValidationError> {
        Self::create(
            WorkoutKind::Running,
            id,
            created_at,
            coords,
            MetricInputs {
                distance_km,
                duration_min,
                variable: cadence_spm,
            },
        )
    }

    pub fn cycling(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    ) -> Result<Self, ValidationError> {
        Self::create(
            WorkoutKind::Cycling,
            id,
            created_at,
            coords,
            MetricInputs {
                distance_km,
                duration_min,
                variable: elevation_gain_m,
            },
        )
    }

    /// Validates `inputs` for `kind` and builds the record with its
    /// derived fields. Also the reconstruction path for persisted records.
    pub fn create(
        kind: WorkoutKind,
        id: WorkoutId,
        created_at: DateTime<Utc>,
        coords: Coords,
        inputs: MetricInputs,
    ) -> Result<Self, ValidationError> {
        validate(kind, &inputs)?;
        Ok(Self {
            description: describe(kind, created_at),
            metrics: compute_metrics(kind, &inputs),
            id,
            created_at,
            coords,
            distance_km: inputs.distance_km,
            duration_min: inputs.duration_min,
        })
    }

    /// Replaces distance, duration and the kind-specific field, recomputing
    /// the derived metric. Identical inputs leave the record untouched.
    #[allow(clippy::float_cmp)]
    pub fn update_metrics(&mut self, inputs: MetricInputs) -> Result<MetricsUpdate, ValidationError> {
        let kind = self.kind();
        validate(kind, &inputs)?;

        if self.distance_km == inputs.distance_km
            && self.duration_min == inputs.duration_min
            && self.variable_value() == inputs.variable
        {
            return Ok(MetricsUpdate::Unchanged);
        }

        self.distance_km = inputs.distance_km;
        self.duration_min = inputs.duration_min;
        self.metrics = compute_metrics(kind, &inputs);
        Ok(MetricsUpdate::Updated)
    }

    pub const fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn coords(&self) -> Coords {
        self.coords
    }

    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub const fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub const fn kind(&self) -> WorkoutKind {
        match self.metrics {
            Metrics::Running { .. } => WorkoutKind::Running,
            Metrics::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    /// Minutes per kilometre; running only.
    pub const fn pace(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Running {
                pace_min_per_km, ..
            } => Some(pace_min_per_km),
            Metrics::Cycling { .. } => None,
        }
    }

    /// Kilometres per hour; cycling only.
    pub const fn speed(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Cycling { speed_km_per_h, .. } => Some(speed_km_per_h),
            Metrics::Running { .. } => None,
        }
    }

    pub const fn cadence(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Running { cadence_spm, .. } => Some(cadence_spm),
            Metrics::Cycling { .. } => None,
        }
    }

    pub const fn elevation_gain(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Cycling {
                elevation_gain_m, ..
            } => Some(elevation_gain_m),
            Metrics::Running { .. } => None,
        }
    }

    /// Cadence or elevation gain, whichever this kind carries.
    pub const fn variable_value(&self) -> f64 {
        match self.metrics {
            Metrics::Running { cadence_spm, .. } => cadence_spm,
            Metrics::Cycling {
                elevation_gain_m, ..
            } => elevation_gain_m,
        }
    }

    /// Current values formatted the way the edit form shows them.
    pub fn raw_inputs(&self) -> RawInputs {
        RawInputs::new(
            self.distance_km.to_string(),
            self.duration_min.to_string(),
            self.variable_value().to_string(),
        )
    }
}

// Elevation gain is checked for finiteness only; cadence must be positive.
fn validate(kind: WorkoutKind, inputs: &MetricInputs) -> Result<(), ValidationError> {
    let variable_field = kind.variable_field();
    for (field, value) in [
        (Field::Distance, inputs.distance_km),
        (Field::Duration, inputs.duration_min),
        (variable_field, inputs.variable),
    ] {
        if !value.is_finite() {
            return Err(ValidationError::NotANumber { field });
        }
    }

    let mut must_be_positive = vec![
        (Field::Distance, inputs.distance_km),
        (Field::Duration, inputs.duration_min),
    ];
    if kind == WorkoutKind::Running {
        must_be_positive.push((variable_field, inputs.variable));
    }
    if let Some((field, _)) = must_be_positive.into_iter().find(|(_, v)| *v <= 0.0) {
        return Err(ValidationError::NotPositive { field });
    }

    Ok(())
}

fn compute_metrics(kind: WorkoutKind, inputs: &MetricInputs) -> Metrics {
    match kind {
        WorkoutKind::Running => Metrics::Running {
            cadence_spm: inputs.variable,
            pace_min_per_km: inputs.duration_min / inputs.distance_km,
        },
        WorkoutKind::Cycling => Metrics::Cycling {
            elevation_gain_m: inputs.variable,
            speed_km_per_h: inputs.distance_km / (inputs.duration_min / 60.0),
        },
    }
}

/// `"Running on October 19"`, in the local calendar.
pub fn describe(kind: WorkoutKind, created_at: DateTime<Utc>) -> String {
    let local = created_at.with_timezone(&Local);
    format!("{} on {}", kind.label(), local.format("%B %-d"))
}
