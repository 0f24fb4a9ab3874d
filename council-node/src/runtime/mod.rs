pub mod builder;
pub mod scenario_driver;

pub use builder::{build_runtime, CouncilRuntime};
pub use scenario_driver::{leaders, run_scenario};
