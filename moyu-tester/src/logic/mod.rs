pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;
pub mod summary;

pub use policy::GameplayStrategy;
pub use seeds::{resolve_seed_inputs, split_csv};
pub use simulation::{RunRecord, run_batch};
pub use summary::summarize;
