//! freefall-sim
//!
//! One-dimensional falling-body simulator with explicit Euler integration.
//! - Gravity, altitude-dependent quadratic drag and a lateral wind term.
//! - Inelastic ground bounce, then settle once slow enough on the ground.
//! - Produces one [`Tick`] per step: telemetry plus a render frame (trail of
//!   recent track rows).
//!
//! Maths:
//!   F = m g - 0.5 Cd' A rho(y) v² + w
//!   v += (F / m) dt;  y -= v dt
//!
//! Conventions:
//! - Velocity is positive DOWNWARD; height `y` is positive up with the ground at 0.
//! - The wind term is added straight onto the net force, as a signed strength.
//!
//! The simulator is an `Iterator<Item = Tick>` that ends when the body has
//! settled (or after a configurable tick ceiling). It never sleeps; pacing is
//! the caller's business.

pub mod track;

use freefall_core::{
    adjust_drag_coefficient, air_density, drag_force, gravitational_force, SimulationParameters,
    WindDirection,
};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, trace, warn};

pub use track::{Track, TrackError, Trail};

/// Fixed integration step (s)
pub const TIME_STEP: f64 = 0.05;
/// On the ground and at or below this speed the body is at rest (m/s)
pub const SETTLE_SPEED: f64 = 0.5;
/// Impacts faster than this bounce; slower ones stop dead (m/s)
pub const BOUNCE_SPEED: f64 = 1.0;
/// Fraction of impact speed kept after a bounce
pub const RESTITUTION: f64 = 0.6;
/// Default tick ceiling for a single run
pub const DEFAULT_MAX_TICKS: u64 = 200_000;

/// Coarse state of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    Falling,
    Settled,
}

/// Mutable state of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionState {
    pub velocity: f64,
    pub position: f64,
    pub elapsed_time: f64,
    pub wind_direction: WindDirection,
    pub trail: Trail,
}

/// What happened at the ground during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Contact {
    Airborne,
    /// Hit faster than [`BOUNCE_SPEED`]; velocity reversed and scaled.
    Bounce { impact_velocity: f64 },
    /// Hit slowly; velocity zeroed.
    Rest { impact_velocity: f64 },
}

/// Per-tick readout for the console.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Telemetry {
    pub elapsed_time: f64,
    pub velocity: f64,
    pub position: f64,
    pub drag_force: f64,
    pub wind_force: f64,
    pub wind_direction: WindDirection,
    pub air_density: f64,
}

/// Where to draw the body and its fading trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderFrame {
    pub trail: Vec<usize>,
    pub current_index: usize,
}

/// Everything one integration step produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tick {
    pub telemetry: Telemetry,
    pub frame: RenderFrame,
    pub contact: Contact,
    /// Drag coefficient after the wind adjustment.
    pub drag_coefficient: f64,
}

/// Totals reported once a run ends.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub elapsed_time: f64,
    pub bounces: u32,
    pub max_speed: f64,
    pub settled: bool,
}

/// Integrates one object from its drop height until it settles.
///
/// `R` supplies the random wind-direction draws; pass a seeded generator for
/// reproducible runs.
#[derive(Debug)]
pub struct Simulator<R> {
    params: SimulationParameters,
    track: Track,
    state: MotionState,
    rng: R,
    max_ticks: u64,
    ticks: u64,
    bounces: u32,
    max_speed: f64,
    ceiling_reported: bool,
}

impl<R: Rng> Simulator<R> {
    pub fn new(params: SimulationParameters, rng: R) -> Self {
        Self::with_track(params, Track::default(), rng)
    }

    pub fn with_track(params: SimulationParameters, track: Track, rng: R) -> Self {
        let state = MotionState {
            velocity: params.initial_velocity(),
            position: params.initial_height(),
            elapsed_time: 0.0,
            wind_direction: WindDirection::Right,
            trail: track.new_trail(),
        };
        Self {
            params,
            track,
            state,
            rng,
            max_ticks: DEFAULT_MAX_TICKS,
            ticks: 0,
            bounces: 0,
            max_speed: params.initial_velocity().abs(),
            ceiling_reported: false,
        }
    }

    /// Stop after `max_ticks` steps even if the body never settles.
    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn params(&self) -> &SimulationParameters { &self.params }
    pub fn track(&self) -> Track { self.track }
    pub fn state(&self) -> &MotionState { &self.state }
    pub fn ticks(&self) -> u64 { self.ticks }

    pub fn phase(&self) -> Phase {
        if self.state.position > 0.0 || self.state.velocity.abs() > SETTLE_SPEED {
            Phase::Falling
        } else {
            Phase::Settled
        }
    }

    /// Advance one step of [`TIME_STEP`] regardless of phase.
    pub fn step(&mut self) -> Tick {
        let dt = TIME_STEP;
        let p = self.params;
        let s = &mut self.state;

        let density = air_density(s.position);
        let wind_mode = p.wind();
        let strength = wind_mode.strength_at(s.elapsed_time);

        if wind_mode.redraws_direction(s.elapsed_time) {
            s.wind_direction = if self.rng.gen_bool(0.5) { WindDirection::Right } else { WindDirection::Left };
            trace!(t = s.elapsed_time, direction = s.wind_direction.label(), "wind direction drawn");
        }

        let wind = strength * s.wind_direction.sign();
        let cd = adjust_drag_coefficient(p.drag_coefficient(), strength);
        let drag = drag_force(cd, p.cross_sectional_area(), density, s.velocity.abs());
        let net = gravitational_force(p.mass()) - drag + wind;
        let accel = net / p.mass();

        s.velocity += accel * dt;
        s.position -= s.velocity * dt;

        let mut contact = Contact::Airborne;
        if s.position < 0.0 {
            s.position = 0.0;
            let impact_velocity = s.velocity;
            if impact_velocity.abs() > BOUNCE_SPEED {
                s.velocity = -impact_velocity * RESTITUTION;
                self.bounces += 1;
                contact = Contact::Bounce { impact_velocity };
                debug!(t = s.elapsed_time, impact_velocity, rebound = s.velocity, "bounce");
            } else {
                s.velocity = 0.0;
                contact = Contact::Rest { impact_velocity };
                debug!(t = s.elapsed_time, impact_velocity, "came to rest");
            }
        }

        let current_index = self.track.step_index(s.position, p.initial_height());
        s.trail.push(current_index);

        let tick = Tick {
            telemetry: Telemetry {
                elapsed_time: s.elapsed_time,
                velocity: s.velocity,
                position: s.position,
                drag_force: drag,
                wind_force: wind,
                wind_direction: s.wind_direction,
                air_density: density,
            },
            frame: RenderFrame { trail: s.trail.to_vec(), current_index },
            contact,
            drag_coefficient: cd,
        };

        s.elapsed_time += dt;
        self.max_speed = self.max_speed.max(s.velocity.abs());
        self.ticks += 1;
        tick
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ticks: self.ticks,
            elapsed_time: self.state.elapsed_time,
            bounces: self.bounces,
            max_speed: self.max_speed,
            settled: self.phase() == Phase::Settled,
        }
    }
}

impl<R: Rng> Iterator for Simulator<R> {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        if self.phase() == Phase::Settled {
            return None;
        }
        if self.ticks >= self.max_ticks {
            if !self.ceiling_reported {
                self.ceiling_reported = true;
                warn!(
                    ticks = self.ticks,
                    position = self.state.position,
                    velocity = self.state.velocity,
                    "run stopped at tick ceiling without settling"
                );
            }
            return None;
        }
        Some(self.step())
    }
}

/* ----------------------------------- tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use freefall_core::{WindMode, GRAVITY};
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn params(mass: f64, cd: f64, v0: f64, h0: f64, wind: WindMode) -> SimulationParameters {
        SimulationParameters::new(mass, cd, 0.01, v0, h0, wind).unwrap()
    }

    fn always_right() -> StepRng { StepRng::new(0, 0) }
    fn always_left() -> StepRng { StepRng::new(u64::MAX, 0) }

    #[test]
    fn starts_falling_from_drop_height() {
        let sim = Simulator::new(params(1.0, 0.47, 2.0, 5.0, WindMode::None), always_right());
        let s = sim.state();
        assert_eq!(s.position, 5.0);
        assert_eq!(s.velocity, 2.0);
        assert_eq!(s.elapsed_time, 0.0);
        assert_eq!(s.wind_direction, WindDirection::Right);
        assert!(s.trail.is_empty());
        assert_eq!(sim.phase(), Phase::Falling);
    }

    #[test]
    fn first_step_is_explicit_euler() {
        let mut sim = Simulator::new(params(2.0, 0.0, 0.0, 10.0, WindMode::None), always_right());
        let tick = sim.step();

        let v1 = GRAVITY * TIME_STEP;
        assert_relative_eq!(tick.telemetry.velocity, v1, epsilon = 1e-12);
        assert_relative_eq!(tick.telemetry.position, 10.0 - v1 * TIME_STEP, epsilon = 1e-12);
        assert_eq!(tick.telemetry.elapsed_time, 0.0);
        assert_eq!(tick.telemetry.drag_force, 0.0);
        assert_relative_eq!(tick.telemetry.air_density, air_density(10.0));
        assert_eq!(tick.frame.current_index, 0);
        assert_eq!(tick.contact, Contact::Airborne);
        assert_relative_eq!(sim.state().elapsed_time, TIME_STEP);
    }

    #[test]
    fn drag_opposes_upward_motion_too() {
        // Thrown upward: drag magnitude uses |v| and still subtracts from the net force.
        let mut sim = Simulator::new(params(1.0, 0.47, -10.0, 5.0, WindMode::None), always_right());
        let tick = sim.step();
        let expected = drag_force(0.47, 0.01, air_density(5.0), 10.0);
        assert_relative_eq!(tick.telemetry.drag_force, expected, epsilon = 1e-12);
        assert_relative_eq!(
            tick.telemetry.velocity,
            -10.0 + (GRAVITY - expected) * TIME_STEP,
            epsilon = 1e-12
        );
    }

    #[test]
    fn fast_impact_bounces() {
        // 0.1 m above ground at 10 m/s: lands on the first step.
        let mut sim = Simulator::new(params(1.0, 0.0, 10.0, 0.1, WindMode::None), always_right());
        let tick = sim.step();
        let impact = 10.0 + GRAVITY * TIME_STEP;
        assert_eq!(tick.telemetry.position, 0.0);
        assert_relative_eq!(tick.telemetry.velocity, -impact * RESTITUTION, epsilon = 1e-12);
        match tick.contact {
            Contact::Bounce { impact_velocity } => assert_relative_eq!(impact_velocity, impact, epsilon = 1e-12),
            other => panic!("expected bounce, got {other:?}"),
        }
        assert_eq!(tick.frame.current_index, 19);
        assert_eq!(sim.summary().bounces, 1);
    }

    #[test]
    fn slow_impact_comes_to_rest() {
        let mut sim = Simulator::new(params(1.0, 0.0, 0.2, 0.01, WindMode::None), always_right());
        let tick = sim.step();
        assert_eq!(tick.telemetry.position, 0.0);
        assert_eq!(tick.telemetry.velocity, 0.0);
        assert!(matches!(tick.contact, Contact::Rest { .. }));
        assert_eq!(sim.phase(), Phase::Settled);
        assert!(sim.next().is_none());
    }

    #[test]
    fn custom_wind_adds_signed_force() {
        let mut sim = Simulator::new(params(1.0, 0.47, 0.0, 5.0, WindMode::Custom { strength: 3.0 }), always_left());
        let tick = sim.step();
        // no redraw outside random mode, so the direction stays Right
        assert_eq!(tick.telemetry.wind_direction, WindDirection::Right);
        assert_eq!(tick.telemetry.wind_force, 3.0);
        assert_eq!(tick.drag_coefficient, 0.47);
        assert_relative_eq!(tick.telemetry.velocity, (GRAVITY + 3.0) * TIME_STEP, epsilon = 1e-12);
    }

    #[test]
    fn random_wind_uses_injected_generator() {
        let mut left = Simulator::new(params(1.0, 0.47, 0.0, 5.0, WindMode::Random), always_left());
        assert_eq!(left.step().telemetry.wind_direction, WindDirection::Left);

        let mut right = Simulator::new(params(1.0, 0.47, 0.0, 5.0, WindMode::Random), always_right());
        assert_eq!(right.step().telemetry.wind_direction, WindDirection::Right);
    }

    #[test]
    fn random_wind_keeps_direction_between_redraw_windows() {
        // After t = 1 s no redraw happens until t = 3 s.
        let mut sim = Simulator::new(params(50.0, 0.47, 0.0, 1_000.0, WindMode::Random), ChaCha8Rng::seed_from_u64(7));
        let ticks: Vec<Tick> = sim.by_ref().take(60).collect();
        let held = ticks[21].telemetry.wind_direction;
        for tick in &ticks[21..60] {
            assert!(tick.telemetry.elapsed_time >= 1.0 - 1e-9);
            assert_eq!(tick.telemetry.wind_direction, held);
            let strength = WindMode::Random.strength_at(tick.telemetry.elapsed_time);
            assert_relative_eq!(tick.telemetry.wind_force, strength * held.sign(), epsilon = 1e-12);
        }
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let p = params(1.0, 0.47, 0.0, 30.0, WindMode::Random);
        let a: Vec<Tick> = Simulator::new(p, ChaCha8Rng::seed_from_u64(42)).collect();
        let b: Vec<Tick> = Simulator::new(p, ChaCha8Rng::seed_from_u64(42)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn strong_wind_boosts_drag_coefficient_every_tick() {
        let p = params(1.0, 0.47, 0.0, 5.0, WindMode::Custom { strength: 20.0 });
        let mut sim = Simulator::new(p, always_right());
        let mut ticks = 0;
        while sim.phase() == Phase::Falling && ticks < 10_000 {
            let speed = sim.state().velocity.abs();
            let tick = sim.step();
            assert_relative_eq!(tick.drag_coefficient, 0.47 * 1.5, epsilon = 1e-12);
            let boosted = drag_force(0.47 * 1.5, 0.01, tick.telemetry.air_density, speed);
            assert_relative_eq!(tick.telemetry.drag_force, boosted, epsilon = 1e-12);
            if speed > 0.0 {
                let plain = drag_force(0.47, 0.01, tick.telemetry.air_density, speed);
                assert!(tick.telemetry.drag_force > plain);
            }
            ticks += 1;
        }
        assert_eq!(sim.phase(), Phase::Settled);
    }

    #[test]
    fn tick_ceiling_stops_runaway_runs() {
        // Upward wind stronger than gravity: the body never comes down.
        let p = params(1.0, 0.47, 0.0, 5.0, WindMode::Custom { strength: -20.0 });
        let mut sim = Simulator::new(p, always_right()).with_max_ticks(500);
        assert_eq!(sim.by_ref().count(), 500);
        let summary = sim.summary();
        assert_eq!(summary.ticks, 500);
        assert!(!summary.settled);
        assert!(sim.next().is_none());
    }

    #[test]
    fn custom_track_changes_row_mapping() {
        let track = Track::new(4, 2).unwrap();
        let mut sim = Simulator::with_track(params(1.0, 0.0, 10.0, 0.1, WindMode::None), track, always_right());
        let tick = sim.step();
        assert_eq!(tick.frame.current_index, 3);
        assert_eq!(sim.state().trail.capacity(), 2);
    }
}
