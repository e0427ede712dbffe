pub mod sim_config;

pub use sim_config::{SimSetting, WorldBounds};
