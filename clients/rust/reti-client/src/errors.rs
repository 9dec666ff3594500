use retitypecrate::{
    abi::AbiError,
    constants::{MAX_GROUP_SIZE, MAX_TXN_REFERENCES},
    decode::DecodeError,
    types::NodeAssignmentError,
};
use thiserror::Error;

pub type RetiResult<T> = Result<T, RetiError>;

#[derive(Error, Debug)]
pub enum RetiError {
    #[error(transparent)]
    Validation(#[from] NodeAssignmentError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Abi(#[from] AbiError),
    /// Failure reported by a simulation, carried verbatim.
    #[error("{0}")]
    SimulationFailed(String),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Group(#[from] GroupError),
    #[error("no staking pool available on validator {0} for this stake")]
    NoPoolAvailable(u64),
    #[error("stake of {0} microAlgo plus the staker MBR exceeds the largest amount")]
    InvalidAmount(u64),
    #[error("no local account available to send simulated calls")]
    NoSimulationAccount,
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("call declares {0} references, at most {MAX_TXN_REFERENCES} are allowed")]
    TooManyReferences(usize),
    #[error("box reference targets app {0}, which is neither the callee nor a foreign app")]
    UndeclaredBoxApp(u64),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    #[error("group holds {0} transactions, at most {MAX_GROUP_SIZE} are allowed")]
    TooLarge(usize),
    #[error("cannot submit an empty group")]
    Empty,
    #[error("{method} takes {expected} arguments, {actual} supplied")]
    ArgumentCount {
        method: String,
        expected: usize,
        actual: usize,
    },
    #[error("{method} argument {index} expects {expected}")]
    ArgumentKind {
        method: String,
        index: usize,
        expected: String,
    },
    #[error("step {0} has no authenticating signer and cannot be committed")]
    UnauthenticatedCommit(usize),
    #[error("ledger returned no result for the simulated group")]
    EmptySimulation,
    #[error("no result for method {0} in the submitted group")]
    MissingResult(String),
}
