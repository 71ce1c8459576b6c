//! Core environment model for a falling body
//!
//! Includes:
//! - Physical constants
//! - Exponential atmosphere (air density vs altitude)
//! - Gravity and quadratic drag
//! - Wind modes and the wind-dependent drag adjustment
//! - Validated per-object simulation parameters
//!
//! Everything here is a pure function of its arguments. The integration loop
//! lives in `freefall-sim`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// -------------------------
// Constants
// -------------------------

/// Gravitational acceleration [m/s²]
pub const GRAVITY: f64 = 9.81;
/// Air density at sea level [kg/m³]
pub const SEA_LEVEL_DENSITY: f64 = 1.225;
/// Scale height of the exponential atmosphere [m]
pub const SCALE_HEIGHT: f64 = 8500.0;
/// Wind strength above which the drag coefficient is boosted
pub const WIND_DRAG_THRESHOLD: f64 = 15.0;
/// Drag coefficient multiplier applied in strong wind
pub const WIND_DRAG_FACTOR: f64 = 1.5;

const RANDOM_WIND_AMPLITUDE: f64 = 0.5;
const RANDOM_WIND_FREQUENCY: f64 = 0.5; // rad/s
const DIRECTION_REDRAW_PERIOD_S: i64 = 3;

// -------------------------
// Atmosphere & Forces
// -------------------------

/// Air density [kg/m³] at `altitude_m` above sea level.
///
/// Not clamped: negative altitudes extrapolate above sea-level density.
pub fn air_density(altitude_m: f64) -> f64 {
    SEA_LEVEL_DENSITY * (-altitude_m / SCALE_HEIGHT).exp()
}

/// Weight [N] of a body of `mass_kg`.
pub fn gravitational_force(mass_kg: f64) -> f64 {
    mass_kg * GRAVITY
}

/// Drag magnitude [N]: `0.5 * Cd * A * rho * v²`.
///
/// `speed` is a magnitude; the caller applies the sign opposing motion.
pub fn drag_force(drag_coefficient: f64, area_m2: f64, density: f64, speed: f64) -> f64 {
    0.5 * drag_coefficient * area_m2 * density * speed * speed
}

/// Boost the drag coefficient by 1.5x when `|wind_strength|` exceeds 15.
pub fn adjust_drag_coefficient(drag_coefficient: f64, wind_strength: f64) -> f64 {
    if wind_strength.abs() > WIND_DRAG_THRESHOLD {
        drag_coefficient * WIND_DRAG_FACTOR
    } else {
        drag_coefficient
    }
}

// -------------------------
// Wind
// -------------------------

/// How the lateral wind evolves over a run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WindMode {
    /// Slow sinusoidal gust whose direction is redrawn while `trunc(t) % 3 == 0`.
    Random,
    /// Still air.
    None,
    /// Constant strength (positive pushes right, negative left).
    Custom { strength: f64 },
}

impl WindMode {
    /// Wind strength at `elapsed_s` into the run.
    pub fn strength_at(self, elapsed_s: f64) -> f64 {
        match self {
            WindMode::Random => (elapsed_s * RANDOM_WIND_FREQUENCY).sin() * RANDOM_WIND_AMPLITUDE,
            WindMode::None => 0.0,
            WindMode::Custom { strength } => strength,
        }
    }

    /// Whether the wind direction should be redrawn at `elapsed_s`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn redraws_direction(self, elapsed_s: f64) -> bool {
        matches!(self, WindMode::Random) && (elapsed_s.trunc() as i64) % DIRECTION_REDRAW_PERIOD_S == 0
    }
}

/// Direction the wind is currently blowing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindDirection {
    Left,
    #[default]
    Right,
}

impl WindDirection {
    pub fn sign(self) -> f64 {
        match self {
            WindDirection::Left => -1.0,
            WindDirection::Right => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WindDirection::Left => "Left",
            WindDirection::Right => "Right",
        }
    }
}

// -------------------------
// Parameters
// -------------------------

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ParameterError {
    #[error("mass must be positive, got {0} kg")]
    NonPositiveMass(f64),
    #[error("initial height must be positive, got {0} m")]
    NonPositiveHeight(f64),
    #[error("cross-sectional area must be positive, got {0} m²")]
    NonPositiveArea(f64),
    #[error("drag coefficient must not be negative, got {0}")]
    NegativeDragCoefficient(f64),
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
}

/// Per-object inputs. Checked once on construction, immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SimulationParameters {
    mass: f64,
    drag_coefficient: f64,
    cross_sectional_area: f64,
    initial_velocity: f64,
    initial_height: f64,
    wind: WindMode,
}

impl SimulationParameters {
    /// Build parameters, failing fast on non-physical values.
    ///
    /// # Errors
    /// Returns a [`ParameterError`] when mass, height or area is not positive,
    /// the drag coefficient is negative, or any value is NaN/infinite.
    pub fn new(
        mass: f64,
        drag_coefficient: f64,
        cross_sectional_area: f64,
        initial_velocity: f64,
        initial_height: f64,
        wind: WindMode,
    ) -> Result<Self, ParameterError> {
        let finite = [
            ("mass", mass),
            ("drag coefficient", drag_coefficient),
            ("cross-sectional area", cross_sectional_area),
            ("initial velocity", initial_velocity),
            ("initial height", initial_height),
            ("custom wind strength", wind.strength_at(0.0)),
        ];
        if let Some(&(name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ParameterError::NotFinite(name));
        }

        if mass <= 0.0 {
            return Err(ParameterError::NonPositiveMass(mass));
        }
        if initial_height <= 0.0 {
            return Err(ParameterError::NonPositiveHeight(initial_height));
        }
        if cross_sectional_area <= 0.0 {
            return Err(ParameterError::NonPositiveArea(cross_sectional_area));
        }
        if drag_coefficient < 0.0 {
            return Err(ParameterError::NegativeDragCoefficient(drag_coefficient));
        }

        Ok(Self {
            mass,
            drag_coefficient,
            cross_sectional_area,
            initial_velocity,
            initial_height,
            wind,
        })
    }

    pub fn mass(&self) -> f64 { self.mass }
    pub fn drag_coefficient(&self) -> f64 { self.drag_coefficient }
    pub fn cross_sectional_area(&self) -> f64 { self.cross_sectional_area }
    pub fn initial_velocity(&self) -> f64 { self.initial_velocity }
    pub fn initial_height(&self) -> f64 { self.initial_height }
    pub fn wind(&self) -> WindMode { self.wind }
}

// -------------------------
// Tests
// -------------------------
