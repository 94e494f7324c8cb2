mod budget;
mod outcome;
mod plan;

pub use budget::RetryBudget;
pub use outcome::RetryOutcome;
pub use plan::RetryPlan;
