//! Hardware collaborator traits.
//!
//! The controller never touches a peripheral directly: the CEC engine and
//! the DDC/I2C channel sit behind these traits, and their interrupts feed
//! events into [crate::rx::CecIrq] / [crate::ddc::DdcIrq].

use crate::proto::{CecErrors, CecLogicalAddress};
use std::io;

/// Event delivered by the CEC peripheral interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CecEvent {
    /// One byte of an incoming frame.
    RxByte(u8),
    /// The frame currently being assembled is complete.
    RxComplete,
    /// The queued outgoing message finished transmitting.
    TxComplete,
    /// One or more error conditions were flagged.
    Error(CecErrors),
}

/// Event delivered by the DDC/I2C peripheral interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdcEvent {
    TxComplete,
    RxComplete,
    /// The transfer was aborted (NACK, arbitration loss, ...).
    Aborted,
}

/// Outcome of submitting work to a peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Queued,
    /// The peripheral is occupied, try again later.
    Busy,
}

/// State of a logical address claim, as reported by the CEC engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimState {
    /// Negotiation still running.
    Busy,
    /// Nobody acked the polling message, the address is ours.
    Ready,
    /// Another device already holds the address.
    InUse,
}

/// A CEC bus engine: claims logical addresses and transmits raw frames.
///
/// Received traffic does not flow through this trait. The interrupt side
/// pushes [CecEvent]s into the [crate::rx::CecIrq] handle instead.
pub trait CecTransport {
    /// Start the claim procedure for `addr` (send the polling message).
    fn claim_address(&mut self, addr: CecLogicalAddress) -> io::Result<WriteStatus>;
    /// Progress of the last [CecTransport::claim_address] call.
    fn claim_status(&mut self) -> io::Result<ClaimState>;
    /// Queue a complete frame (header byte, opcode, payload) for transmit.
    fn write(&mut self, frame: &[u8]) -> io::Result<WriteStatus>;
}

/// An I2C master wired to the HDMI DDC lines.
pub trait DdcTransport {
    fn set_slave(&mut self, addr: u8) -> io::Result<()>;
    /// Start an asynchronous write, completion arrives as a [DdcEvent].
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;
    /// Start an asynchronous read into `buf`.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<()>;
}

/// Blocking millisecond delay, provided by the platform.
pub trait Delay {
    fn delay_ms(&mut self, ms: u32);
}
