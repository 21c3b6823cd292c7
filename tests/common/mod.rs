pub mod mock_executor;
pub mod strategies;

pub use mock_executor::*;
pub use strategies::*;
