use thiserror::Error;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Invalid cache configuration: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Failed to decode trace: {0}")]
    TraceError(#[from] TraceError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors raised while validating the cache geometry
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cache size of {size} units exceeds the maximum of {max}")]
    CacheTooLarge { size: i64, max: i64 },

    #[error("Index and offset fields consume {bits} bits; a 32-bit address needs a tag field")]
    GeometryTooWide { bits: u32 },

    #[error("Block size and associativity must be nonzero")]
    ZeroGeometry,
}

/// Errors raised by the trace-decoding collaborator
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Malformed trace line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Malformed {mnemonic} operands at address {address:#010x} (line {line})")]
    MalformedOperands { mnemonic: String, address: u32, line: usize },

    #[error("Invalid register token '{token}' at line {line}")]
    BadRegister { token: String, line: usize },

    #[error("Unknown instruction '{mnemonic}' at address {address:#010x} (line {line})")]
    UnknownInstruction { mnemonic: String, address: u32, line: usize },
}

/// Type alias for Result with SimulatorError
pub type SimulatorResult<T> = Result<T, SimulatorError>;
