use safe_arith::ArithError;
use types::BeaconStateError;

#[derive(Debug, PartialEq, Clone)]
pub enum EpochProcessingError {
    /// The provided delta or status lists did not line up with the validator registry.
    ValidatorStatusesInconsistent,
    /// An attestation recorded in the state references an unknown committee.
    NoCommitteeForAttestation,
    BeaconStateError(BeaconStateError),
    SszTypesError(ssz_types::Error),
    ArithError(ArithError),
}

impl From<BeaconStateError> for EpochProcessingError {
    fn from(e: BeaconStateError) -> EpochProcessingError {
        EpochProcessingError::BeaconStateError(e)
    }
}

impl From<ssz_types::Error> for EpochProcessingError {
    fn from(e: ssz_types::Error) -> EpochProcessingError {
        EpochProcessingError::SszTypesError(e)
    }
}

impl From<ArithError> for EpochProcessingError {
    fn from(e: ArithError) -> EpochProcessingError {
        EpochProcessingError::ArithError(e)
    }
}
