use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Transport-neutral classification of a domain failure. The transport
/// layer maps kinds onto its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    Internal,
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid IP Address format: {0}")]
    InvalidIpv4Address(String),

    #[error("The Maximum number of associated devices are 10. But you sent: {0}")]
    TooManyPeripheralDevices(usize),

    #[error("Gateway with id: {0} not found!")]
    GatewayNotFound(String),

    #[error("Device with id: {0} not found!")]
    DeviceNotFound(String),

    #[error("Gateway already exists: {0}")]
    GatewayAlreadyExists(String),

    #[error("Device already exists: {0}")]
    DeviceAlreadyExists(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::ValidationError(_)
            | DomainError::InvalidIpv4Address(_)
            | DomainError::TooManyPeripheralDevices(_) => ErrorKind::InvalidArgument,

            DomainError::GatewayNotFound(_) | DomainError::DeviceNotFound(_) => ErrorKind::NotFound,

            DomainError::GatewayAlreadyExists(_) | DomainError::DeviceAlreadyExists(_) => {
                ErrorKind::AlreadyExists
            }

            DomainError::RepositoryError(_) => ErrorKind::Internal,
        }
    }
}
