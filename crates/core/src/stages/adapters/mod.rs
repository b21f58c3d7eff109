//! Stage unit adapters.

pub mod command;
pub mod mock_stage;

pub use command::CommandStage;
pub use mock_stage::MockStage;
