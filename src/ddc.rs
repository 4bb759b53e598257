//! EDID retrieval over the DDC/I2C channel.
//!
//! Reads the base block at offset 0, and the first CTA-861 extension if
//! one is announced, to discover the sink-assigned physical address.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info};

use crate::edid::{CtaExtension, Edid, EDID_BLOCK_SIZE};
use crate::error::DdcError;
use crate::proto::PhysicalAddress;
use crate::transport::{DdcEvent, DdcTransport, Delay};

/// I2C slave address of the EDID ROM.
pub const EDID_I2C_ADDR: u8 = 0x50;
/// How long to wait for a single DDC transfer, in 1 ms polls.
pub const DEFAULT_TRANSFER_TIMEOUT_MS: u32 = 100;

struct DdcShared {
    tx_done: AtomicBool,
    rx_done: AtomicBool,
    aborted: AtomicBool,
}

/// Interrupt-side handle of an [EdidReader].
#[derive(Clone)]
pub struct DdcIrq {
    shared: Arc<DdcShared>,
}

impl DdcIrq {
    /// Feed one I2C peripheral event. Called from the interrupt context.
    pub fn on_event(&self, event: DdcEvent) {
        let flag = match event {
            DdcEvent::TxComplete => &self.shared.tx_done,
            DdcEvent::RxComplete => &self.shared.rx_done,
            DdcEvent::Aborted => &self.shared.aborted,
        };
        flag.store(true, Ordering::Release);
    }
}

enum Waiting {
    Tx,
    Rx,
}

/// Reads and validates EDID blocks over a [DdcTransport].
pub struct EdidReader<T, D> {
    transport: T,
    delay: D,
    shared: Arc<DdcShared>,
    timeout_ms: u32,
}

impl<T: DdcTransport, D: Delay> EdidReader<T, D> {
    pub fn new(transport: T, delay: D) -> (Self, DdcIrq) {
        let shared = Arc::new(DdcShared {
            tx_done: AtomicBool::new(false),
            rx_done: AtomicBool::new(false),
            aborted: AtomicBool::new(false),
        });
        let irq = DdcIrq {
            shared: shared.clone(),
        };
        (
            EdidReader {
                transport,
                delay,
                shared,
                timeout_ms: DEFAULT_TRANSFER_TIMEOUT_MS,
            },
            irq,
        )
    }

    pub fn set_transfer_timeout(&mut self, ms: u32) {
        self.timeout_ms = ms;
    }

    /// Reads the EDID and extracts the physical address from the HDMI
    /// vendor specific data block.
    ///
    /// Returns `Ok(None)` when the EDID is valid but announces no
    /// extension blocks, the caller keeps its configured default then.
    pub fn physical_address(&mut self) -> Result<Option<PhysicalAddress>, DdcError> {
        self.transport.set_slave(EDID_I2C_ADDR)?;
        let base = Edid::parse(self.read_block(0x00)?)?;
        if base.extension_count() == 0 {
            debug!("EDID announces no extension blocks");
            return Ok(None);
        }
        let cta = CtaExtension::parse(self.read_block(0x80)?)?;
        let addr = cta.find_physical_address()?;
        info!("physical address from EDID: {addr}");
        Ok(Some(addr))
    }

    fn read_block(&mut self, offset: u8) -> Result<[u8; EDID_BLOCK_SIZE], DdcError> {
        self.transport.write(&[offset])?;
        self.wait(Waiting::Tx)?;
        let mut block = [0u8; EDID_BLOCK_SIZE];
        self.transport.read(&mut block)?;
        self.wait(Waiting::Rx)?;
        Ok(block)
    }

    fn wait(&mut self, which: Waiting) -> Result<(), DdcError> {
        let mut left = self.timeout_ms;
        loop {
            if self.shared.aborted.swap(false, Ordering::AcqRel) {
                return Err(DdcError::Aborted);
            }
            let flag = match which {
                Waiting::Tx => &self.shared.tx_done,
                Waiting::Rx => &self.shared.rx_done,
            };
            if flag.swap(false, Ordering::AcqRel) {
                return Ok(());
            }
            if left == 0 {
                return Err(DdcError::Timeout);
            }
            left -= 1;
            self.delay.delay_ms(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    struct NoDelay;
    impl Delay for NoDelay {
        fn delay_ms(&mut self, _ms: u32) {}
    }

    /// Answers reads from a scripted block list and completes every
    /// transfer immediately through the interrupt handle.
    struct ScriptedDdc {
        blocks: VecDeque<[u8; EDID_BLOCK_SIZE]>,
        irq: Arc<OnceLock<DdcIrq>>,
        slave: Option<u8>,
    }

    impl DdcTransport for ScriptedDdc {
        fn set_slave(&mut self, addr: u8) -> io::Result<()> {
            self.slave = Some(addr);
            Ok(())
        }
        fn write(&mut self, _bytes: &[u8]) -> io::Result<()> {
            self.irq.get().unwrap().on_event(DdcEvent::TxComplete);
            Ok(())
        }
        fn read(&mut self, buf: &mut [u8]) -> io::Result<()> {
            let block = self.blocks.pop_front().expect("unexpected read");
            buf.copy_from_slice(&block);
            self.irq.get().unwrap().on_event(DdcEvent::RxComplete);
            Ok(())
        }
    }

    fn checksummed(mut block: [u8; EDID_BLOCK_SIZE]) -> [u8; EDID_BLOCK_SIZE] {
        let sum = block[..127].iter().fold(0u8, |s, &b| s.wrapping_add(b));
        block[127] = 0u8.wrapping_sub(sum);
        block
    }

    fn base_block(extensions: u8) -> [u8; EDID_BLOCK_SIZE] {
        let mut block = [0u8; EDID_BLOCK_SIZE];
        block[..8].copy_from_slice(&[0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00]);
        block[126] = extensions;
        checksummed(block)
    }

    fn cta_block() -> [u8; EDID_BLOCK_SIZE] {
        let mut block = [0u8; EDID_BLOCK_SIZE];
        block[0] = 0x02;
        block[1] = 3;
        block[4] = (3 << 5) | 5; // HDMI VSDB, 2.2.0.0
        block[5] = 0x03;
        block[6] = 0x0c;
        block[7] = 0x00;
        block[8] = 0x22;
        block[9] = 0x00;
        checksummed(block)
    }

    fn reader_with(
        blocks: Vec<[u8; EDID_BLOCK_SIZE]>,
    ) -> EdidReader<ScriptedDdc, NoDelay> {
        let slot = Arc::new(OnceLock::new());
        let transport = ScriptedDdc {
            blocks: blocks.into(),
            irq: slot.clone(),
            slave: None,
        };
        let (reader, irq) = EdidReader::new(transport, NoDelay);
        slot.set(irq).ok().expect("irq installed once");
        reader
    }

    #[test]
    fn reads_base_and_extension_block() {
        let mut reader = reader_with(vec![base_block(1), cta_block()]);
        let addr = reader.physical_address().unwrap().unwrap();
        assert_eq!(addr.to_string(), "2.2.0.0");
        assert_eq!(reader.transport.slave, Some(EDID_I2C_ADDR));
    }

    #[test]
    fn no_extensions_yields_none() {
        let mut reader = reader_with(vec![base_block(0)]);
        assert!(reader.physical_address().unwrap().is_none());
    }

    #[test]
    fn invalid_base_block_is_rejected() {
        let mut bad = base_block(1);
        bad[3] ^= 0xff;
        let mut reader = reader_with(vec![bad]);
        assert!(matches!(
            reader.physical_address(),
            Err(DdcError::Edid(crate::error::EdidError::InvalidData))
        ));
    }

    /// Never signals completion.
    struct SilentDdc;
    impl DdcTransport for SilentDdc {
        fn set_slave(&mut self, _addr: u8) -> io::Result<()> {
            Ok(())
        }
        fn write(&mut self, _bytes: &[u8]) -> io::Result<()> {
            Ok(())
        }
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<()> {
            Ok(())
        }
    }
    struct CountingDelay(Arc<Mutex<u32>>);
    impl Delay for CountingDelay {
        fn delay_ms(&mut self, _ms: u32) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn transfer_wait_is_bounded() {
        let delays = Arc::new(Mutex::new(0));
        let (mut reader, _irq) = EdidReader::new(SilentDdc, CountingDelay(delays.clone()));
        assert!(matches!(reader.physical_address(), Err(DdcError::Timeout)));
        assert_eq!(*delays.lock().unwrap(), DEFAULT_TRANSFER_TIMEOUT_MS);
    }

    #[test]
    fn abort_event_cancels_the_wait() {
        let slot: Arc<OnceLock<DdcIrq>> = Arc::new(OnceLock::new());
        struct AbortingDdc(Arc<OnceLock<DdcIrq>>);
        impl DdcTransport for AbortingDdc {
            fn set_slave(&mut self, _addr: u8) -> io::Result<()> {
                Ok(())
            }
            fn write(&mut self, _bytes: &[u8]) -> io::Result<()> {
                self.0.get().unwrap().on_event(DdcEvent::Aborted);
                Ok(())
            }
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<()> {
                Ok(())
            }
        }
        let (mut reader, irq) = EdidReader::new(AbortingDdc(slot.clone()), NoDelay);
        slot.set(irq).ok().expect("irq installed once");
        assert!(matches!(reader.physical_address(), Err(DdcError::Aborted)));
    }
}
