//! Classification of server error codes.

/// Known `$ER` error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerErrorCode {
    CallsignInUse,
    CallsignInvalid,
    AlreadyRegistered,
    SyntaxError,
    InvalidSource,
    InvalidLogon,
    NoSuchCallsign,
    NoFlightPlan,
    NoWeatherProfile,
    InvalidProtocolRevision,
    RequestedLevelTooHigh,
    ServerFull,
    CertificateSuspended,
    InvalidControl,
    InvalidPositionForRating,
    UnauthorizedSoftware,
    Unknown(u16),
}

/// What the session does with a server error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Expected noise, dropped without a log above TRACE.
    Suppressed,
    /// Logged and surfaced; the session continues.
    Warning,
    /// The server will not keep this client; the session ends.
    Fatal,
}

impl ServerErrorCode {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::CallsignInUse,
            2 => Self::CallsignInvalid,
            3 => Self::AlreadyRegistered,
            4 => Self::SyntaxError,
            5 => Self::InvalidSource,
            6 => Self::InvalidLogon,
            7 => Self::NoSuchCallsign,
            8 => Self::NoFlightPlan,
            9 => Self::NoWeatherProfile,
            10 => Self::InvalidProtocolRevision,
            11 => Self::RequestedLevelTooHigh,
            12 => Self::ServerFull,
            13 => Self::CertificateSuspended,
            14 => Self::InvalidControl,
            15 => Self::InvalidPositionForRating,
            16 => Self::UnauthorizedSoftware,
            other => Self::Unknown(other),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoFlightPlan => ErrorSeverity::Suppressed,
            Self::CallsignInUse
            | Self::CallsignInvalid
            | Self::AlreadyRegistered
            | Self::InvalidLogon
            | Self::InvalidProtocolRevision
            | Self::RequestedLevelTooHigh
            | Self::ServerFull
            | Self::CertificateSuspended
            | Self::InvalidPositionForRating
            | Self::UnauthorizedSoftware => ErrorSeverity::Fatal,
            _ => ErrorSeverity::Warning,
        }
    }
}
