use crate::clients::ClientError;

/// Why one tenant's pass through the pipeline stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleError {
    Dependency(String),
    Data(String),
    Investigation(String),
}

impl CycleError {
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Dependency(_) => "dependency",
            Self::Data(_) => "data",
            Self::Investigation(_) => "investigation",
        }
    }
}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dependency(e) => write!(f, "dependency: {e}"),
            Self::Data(e) => write!(f, "data: {e}"),
            Self::Investigation(e) => write!(f, "investigation: {e}"),
        }
    }
}

impl std::error::Error for CycleError {}

impl From<ClientError> for CycleError {
    fn from(e: ClientError) -> Self {
        Self::Dependency(e.to_string())
    }
}
