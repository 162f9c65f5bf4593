pub mod generate;
pub mod probes;
pub mod serve;

pub use generate::GenerateCommand;
pub use probes::ProbesCommand;
pub use serve::ServeCommand;
