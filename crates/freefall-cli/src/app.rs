//! Session loop: gather wind and objects, run each object to completion in
//! turn, pacing the frames for the terminal.

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use freefall_core::{ParameterError, SimulationParameters, WindMode};
use freefall_sim::{RunSummary, Simulator};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, ConfigError, ObjectSpec};
use crate::input::{InputError, Prompter};
use crate::render::Presenter;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid parameters for object {object}")]
    Parameters {
        object: usize,
        #[source]
        source: ParameterError,
    },
    #[error("failed to write output")]
    Output(#[from] io::Error),
}

/// Knobs that do not live in the config file.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunOptions {
    /// Base seed for wind-direction draws; object `i` uses `seed + i`.
    pub seed: Option<u64>,
    /// Sleep between frames.
    pub frame_delay: Duration,
}

impl RunOptions {
    fn rng_for(&self, object: usize) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(object as u64)),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}

/// Run a whole session and return one summary per object.
///
/// With a `[scenario]` in `config` no prompts are shown; otherwise wind and
/// objects are read through `prompter`, one object at a time.
///
/// # Errors
/// Stops at the first unreadable answer, invalid object or output failure.
pub fn run_session<R, W, P>(
    config: &Config,
    options: RunOptions,
    prompter: &mut Prompter<R, W>,
    presenter: &mut P,
) -> Result<Vec<RunSummary>, AppError>
where
    R: BufRead,
    W: Write,
    P: Presenter,
{
    let track = config.track()?;

    let (wind, scripted, count) = match &config.scenario {
        Some(scenario) => {
            info!(objects = scenario.objects.len(), "running scripted scenario");
            (scenario.wind, Some(&scenario.objects), scenario.objects.len())
        }
        None => {
            let count = prompter.object_count()? as usize;
            (prompter.wind_mode()?, None, count)
        }
    };

    presenter.header()?;

    let mut summaries = Vec::new();
    for object in 1..=count {
        presenter.begin_object(object)?;
        let spec = match scripted {
            Some(objects) => objects[object - 1],
            None => prompter.object()?,
        };

        let params = parameters(config, spec, wind)
            .map_err(|source| AppError::Parameters { object, source })?;
        info!(object, mass = spec.mass, height = spec.initial_height, velocity = spec.initial_velocity, "dropping");

        let mut sim = Simulator::with_track(params, track, options.rng_for(object))
            .with_max_ticks(config.limits.max_ticks);
        for tick in sim.by_ref() {
            presenter.frame(&tick)?;
            if !options.frame_delay.is_zero() {
                thread::sleep(options.frame_delay);
            }
        }

        let summary = sim.summary();
        if summary.settled {
            info!(object, ticks = summary.ticks, time = summary.elapsed_time, bounces = summary.bounces, "settled");
        } else {
            warn!(object, ticks = summary.ticks, "gave up before the object settled");
        }
        presenter.finish(&summary)?;
        summaries.push(summary);
    }

    Ok(summaries)
}

fn parameters(config: &Config, spec: ObjectSpec, wind: WindMode) -> Result<SimulationParameters, ParameterError> {
    SimulationParameters::new(
        spec.mass,
        config.body.drag_coefficient,
        config.body.cross_sectional_area,
        spec.initial_velocity,
        spec.initial_height,
        wind,
    )
}
