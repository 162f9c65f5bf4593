pub mod cli;
pub mod commands;
pub mod ui;

pub use cli::{Cli, Commands, Pipeline, PipelineArgs};
pub use commands::generate::GenerateCommand;
pub use commands::generate::execute as run_generate;
pub use commands::probes::ProbesCommand;
pub use commands::probes::execute as run_probes;
pub use commands::serve::ServeCommand;
pub use commands::serve::execute as run_serve;
