use bandersnatch::CurveError;
use thiserror::Error;
use verkle_multipoint::IpaError;

/// Errors surfaced by tree mutation and proof handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerkleError {
    /// A key or value with the wrong length was rejected before any
    /// mutation took place.
    #[error("malformed key: {0}")]
    MalformedKey(&'static str),
    /// A proof whose hints, commitments and key set do not fit together
    /// structurally.
    #[error("malformed proof: {0}")]
    MalformedProof(&'static str),
    /// A structurally valid proof that fails the cryptographic check.
    #[error("proof verification failed")]
    ProofInvalid,
    /// The arithmetic layer produced a state it promises never to produce.
    /// Indicates a defect, not bad input.
    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(&'static str),
}

impl From<CurveError> for VerkleError {
    fn from(err: CurveError) -> Self {
        let CurveError::InternalInvariantViolation(msg) = err;
        VerkleError::InternalInvariantViolation(msg)
    }
}

impl From<IpaError> for VerkleError {
    fn from(err: IpaError) -> Self {
        match err {
            IpaError::InvalidEncoding => VerkleError::MalformedProof("undecodable opening proof"),
            IpaError::Field(_) | IpaError::Curve(_) => {
                tracing::error!(error = %err, "opening argument hit an arithmetic failure");
                VerkleError::InternalInvariantViolation("opening argument arithmetic failure")
            }
        }
    }
}
