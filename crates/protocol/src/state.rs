use cosign_primitives::{CosignError, Result};

/// Progress of one user-triggered operation, for a UI to bind to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OperationState<T> {
    #[default]
    Idle,
    InFlight,
    Done(T),
    Failed(CosignError),
}

impl<T> OperationState<T> {
    /// Moves to [`OperationState::InFlight`]. Returns false if already there.
    pub fn start(&mut self) -> bool {
        if self.is_in_flight() {
            return false;
        }
        *self = Self::InFlight;
        true
    }

    pub fn finish(&mut self, result: Result<T>) {
        *self = match result {
            Ok(value) => Self::Done(value),
            Err(err) => Self::Failed(err),
        };
    }

    /// Runs `operation` unless one is already in flight.
    pub async fn run<F>(&mut self, operation: F) -> Option<&T>
    where
        F: Future<Output = Result<T>>,
    {
        if !self.start() {
            return None;
        }
        self.finish(operation.await);
        self.value()
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Done(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CosignError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}
