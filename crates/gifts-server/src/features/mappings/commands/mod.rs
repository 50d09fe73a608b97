pub mod alignment_difference;
pub mod change_status;

pub use alignment_difference::AlignmentDifferenceError;
pub use change_status::{ChangeStatusCommand, ChangeStatusError, ChangeStatusOutcome};
