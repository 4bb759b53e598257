use crate::proto::CecErrors;
use thiserror::Error;

/// Errors of the CEC transmit and negotiation paths.
#[derive(Error, Debug)]
pub enum CecError {
    /// Every candidate logical address for the requested role is taken.
    #[error("all candidate logical addresses are in use")]
    AddressInUse,
    /// No logical address has been claimed yet.
    #[error("no logical address claimed")]
    NotClaimed,
    #[error("payload exceeds 14 bytes")]
    PayloadTooLong,
    /// The peripheral flagged a transmit fault.
    #[error("transmit failed: {0:?}")]
    Transmit(CecErrors),
    /// No completion within the frame-length dependent deadline.
    #[error("timed out waiting for transmit completion")]
    Timeout,
    /// No device on the bus currently claims to be the active source.
    #[error("no active source known, scan the bus first")]
    NoActiveSource,
    #[error("transport: {0}")]
    Transport(#[from] std::io::Error),
}

/// Errors of the EDID/CTA block parser.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EdidError {
    /// Header pattern or checksum mismatch.
    #[error("invalid EDID data")]
    InvalidData,
    /// A CTA revision other than 3.
    #[error("unsupported CTA-861 revision {0}")]
    Unsupported(u8),
    /// No HDMI vendor specific data block in the extension.
    #[error("no physical address found")]
    NotFound,
}

/// Errors of the EDID read over DDC.
#[derive(Error, Debug)]
pub enum DdcError {
    #[error("transport: {0}")]
    Transport(#[from] std::io::Error),
    /// The I2C transfer was aborted by the peripheral.
    #[error("DDC transfer aborted")]
    Aborted,
    #[error("timed out waiting for DDC transfer completion")]
    Timeout,
    #[error(transparent)]
    Edid(#[from] EdidError),
}
