pub mod dispatcher;
pub mod evaluator;

pub use dispatcher::{AlertDispatcher, AlertLevel, DispatchOutcome};
pub use evaluator::evaluate;
