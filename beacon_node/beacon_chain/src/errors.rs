use state_processing::{BlockProcessingError, SlotProcessingError};
use types::BeaconStateError;

/// Fatal pipeline failures.
///
/// Anything recoverable (bad blocks, unknown parents, future slots) is an *outcome*, not an
/// error; these variants terminate the pipeline task.
#[derive(Debug)]
pub enum BeaconChainError {
    /// The backing store failed or returned corrupt bytes.
    StorageFailure(store::Error),
    /// An internal consistency guarantee was broken; this is a bug.
    InvariantViolation(String),
}

impl From<store::Error> for BeaconChainError {
    fn from(e: store::Error) -> Self {
        BeaconChainError::StorageFailure(e)
    }
}

impl From<BeaconStateError> for BeaconChainError {
    fn from(e: BeaconStateError) -> Self {
        BeaconChainError::InvariantViolation(format!("state error: {:?}", e))
    }
}

impl From<SlotProcessingError> for BeaconChainError {
    fn from(e: SlotProcessingError) -> Self {
        BeaconChainError::InvariantViolation(format!("slot processing: {:?}", e))
    }
}

impl From<BlockProcessingError> for BeaconChainError {
    fn from(e: BlockProcessingError) -> Self {
        BeaconChainError::InvariantViolation(format!("block processing: {:?}", e))
    }
}
