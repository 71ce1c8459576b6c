//! freefall-cli
//!
//! Console front end for `freefall-sim`: reads object parameters from the
//! terminal (or a TOML scenario), animates each drop on an ASCII track and
//! prints per-tick telemetry.

pub mod app;
pub mod config;
pub mod input;
pub mod render;

pub use app::{run_session, AppError, RunOptions};
pub use config::{Config, ConfigError, ObjectSpec, ScenarioConfig};
pub use input::{InputError, Prompter};
pub use render::{Console, JsonLines, Presenter};
