//! Interrupt-fed receive path.
//!
//! The CEC peripheral delivers traffic byte-wise from interrupt context.
//! [CecIrq] assembles those bytes into [RxFrame]s and publishes completed
//! frames into a fixed-size ring the controller drains from thread context.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, warn};

use crate::proto::{CecErrors, CecLogicalAddress, CEC_MAX_FRAME_SIZE};
use crate::transport::CecEvent;

/// Default number of frames the receive ring holds.
pub const DEFAULT_RING_CAPACITY: usize = 80;

/// What to do when a frame completes while the ring is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrunPolicy {
    /// Replace the oldest unread frame.
    OverwriteOldest,
    /// Drop the incoming frame, keep what is buffered.
    DropNewest,
}

/// One received CEC frame: header byte, opcode, payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxFrame {
    bytes: [u8; CEC_MAX_FRAME_SIZE],
    len: u8,
    errored: bool,
}

impl RxFrame {
    fn empty() -> Self {
        RxFrame {
            bytes: [0; CEC_MAX_FRAME_SIZE],
            len: 0,
            errored: false,
        }
    }

    /// Counter wraps back to the start once the buffer is exceeded.
    fn push(&mut self, byte: u8) {
        if self.len as usize >= CEC_MAX_FRAME_SIZE {
            self.len = 0;
        }
        self.bytes[self.len as usize] = byte;
        self.len += 1;
    }

    /// Total bytes received, including the header byte.
    pub fn len(&self) -> usize {
        self.len as usize
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// Reception was aborted by an error condition.
    pub fn is_errored(&self) -> bool {
        self.errored
    }
    pub fn source(&self) -> CecLogicalAddress {
        // a nibble always maps onto the exhaustive address enum
        CecLogicalAddress::try_from(self.bytes[0] >> 4)
            .unwrap_or(CecLogicalAddress::UnregisteredBroadcast)
    }
    pub fn destination(&self) -> CecLogicalAddress {
        CecLogicalAddress::try_from(self.bytes[0] & 0x0f)
            .unwrap_or(CecLogicalAddress::UnregisteredBroadcast)
    }
    /// Raw opcode byte, `None` for header-only polling frames.
    pub fn opcode(&self) -> Option<u8> {
        (self.len >= 2).then(|| self.bytes[1])
    }
    pub fn payload(&self) -> &[u8] {
        if self.len > 2 {
            &self.bytes[2..self.len as usize]
        } else {
            &[]
        }
    }

}

struct RingState {
    slots: Vec<Option<RxFrame>>,
    write_pos: usize,
    assembling: RxFrame,
    /// Set when an overwrite moved the oldest frame; the consumer has
    /// to re-base its cursor before draining further.
    resync: bool,
}

struct IrqShared {
    ring: Mutex<RingState>,
    tx_complete: AtomicBool,
    errors: AtomicU8,
    policy: OverrunPolicy,
}

/**
 * Handle shared between the interrupt side and the controller.
 *
 * The interrupt service routine owns a clone and calls
 * [CecIrq::on_event] for every peripheral event; the controller reads
 * the completion/error flags and drains the frame ring.
 */
#[derive(Clone)]
pub struct CecIrq {
    shared: Arc<IrqShared>,
}

fn lock_ring(shared: &IrqShared) -> MutexGuard<'_, RingState> {
    match shared.ring.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl CecIrq {
    pub fn new(capacity: usize, policy: OverrunPolicy) -> Self {
        let capacity = capacity.max(1);
        CecIrq {
            shared: Arc::new(IrqShared {
                ring: Mutex::new(RingState {
                    slots: vec![None; capacity],
                    write_pos: 0,
                    assembling: RxFrame::empty(),
                    resync: false,
                }),
                tx_complete: AtomicBool::new(false),
                errors: AtomicU8::new(0),
                policy,
            }),
        }
    }

    /// Feed one peripheral event. Called from the interrupt context.
    pub fn on_event(&self, event: CecEvent) {
        match event {
            CecEvent::RxByte(byte) => {
                lock_ring(&self.shared).assembling.push(byte);
            }
            CecEvent::RxComplete => {
                let mut ring = lock_ring(&self.shared);
                publish(&mut ring, false, self.shared.policy);
            }
            CecEvent::TxComplete => {
                self.shared.tx_complete.store(true, Ordering::Release);
            }
            CecEvent::Error(errors) => {
                debug!("cec error condition: {errors:?}");
                self.shared
                    .errors
                    .fetch_or(errors.bits(), Ordering::AcqRel);
                if errors.intersects(CecErrors::RX_ABORT) {
                    // a partial frame is still worth surfacing
                    let mut ring = lock_ring(&self.shared);
                    publish(&mut ring, true, self.shared.policy);
                }
            }
        }
    }

    pub fn capacity(&self) -> usize {
        lock_ring(&self.shared).slots.len()
    }

    /// Take the next buffered frame, advancing the caller's read cursor.
    ///
    /// After an overwrite the cursor is re-based onto the oldest
    /// surviving frame, so frames always come out in production order.
    pub fn next_frame(&self, read_pos: &mut usize) -> Option<RxFrame> {
        let mut ring = lock_ring(&self.shared);
        if ring.resync {
            // the ring was full when the producer wrapped: the slot it
            // will write next holds the oldest frame
            *read_pos = ring.write_pos;
            ring.resync = false;
        }
        let len = ring.slots.len();
        let frame = ring.slots[*read_pos % len].take();
        if frame.is_some() {
            *read_pos = (*read_pos + 1) % len;
        }
        frame
    }

    pub fn tx_complete(&self) -> bool {
        self.shared.tx_complete.load(Ordering::Acquire)
    }
    pub fn clear_tx_complete(&self) {
        self.shared.tx_complete.store(false, Ordering::Release);
    }
    /// Accumulated error bits since the last call, cleared on read.
    pub fn take_errors(&self) -> CecErrors {
        CecErrors::from_bits_truncate(self.shared.errors.swap(0, Ordering::AcqRel))
    }
}

fn publish(state: &mut RingState, errored: bool, policy: OverrunPolicy) {
    if state.assembling.is_empty() {
        return;
    }
    let mut frame = std::mem::replace(&mut state.assembling, RxFrame::empty());
    frame.errored = errored;
    if state.slots[state.write_pos].is_some() {
        match policy {
            OverrunPolicy::DropNewest => {
                warn!("rx ring full, dropping incoming frame");
                return;
            }
            OverrunPolicy::OverwriteOldest => {
                warn!("rx ring full, overwriting oldest frame");
                state.resync = true;
            }
        }
    }
    let pos = state.write_pos;
    state.slots[pos] = Some(frame);
    state.write_pos = (pos + 1) % state.slots.len();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::CecOpcode;

    fn feed_frame(irq: &CecIrq, bytes: &[u8]) {
        for &b in bytes {
            irq.on_event(CecEvent::RxByte(b));
        }
        irq.on_event(CecEvent::RxComplete);
    }

    #[test]
    fn assembles_header_opcode_payload() {
        let irq = CecIrq::new(8, OverrunPolicy::OverwriteOldest);
        feed_frame(&irq, &[0x04, 0x90, 0x01]);

        let mut pos = 0;
        let frame = irq.next_frame(&mut pos).unwrap();
        assert_eq!(frame.source(), CecLogicalAddress::Tv);
        assert_eq!(frame.destination(), CecLogicalAddress::Playback1);
        assert_eq!(frame.opcode(), Some(CecOpcode::ReportPowerStatus.into()));
        assert_eq!(frame.payload(), &[0x01]);
        assert!(!frame.is_errored());
        assert!(irq.next_frame(&mut pos).is_none());
    }

    #[test]
    fn frames_come_out_in_arrival_order() {
        let irq = CecIrq::new(8, OverrunPolicy::OverwriteOldest);
        for op in [0x36u8, 0x04, 0x8f] {
            feed_frame(&irq, &[0x04, op]);
        }
        let mut pos = 0;
        let ops: Vec<u8> = std::iter::from_fn(|| irq.next_frame(&mut pos))
            .filter_map(|f| f.opcode())
            .collect();
        assert_eq!(ops, vec![0x36, 0x04, 0x8f]);
    }

    #[test]
    fn byte_counter_wraps_without_publishing() {
        let irq = CecIrq::new(8, OverrunPolicy::OverwriteOldest);
        // 17 bytes: the first is overwritten when the counter wraps
        for i in 0..17u8 {
            irq.on_event(CecEvent::RxByte(i));
        }
        irq.on_event(CecEvent::RxComplete);

        let mut pos = 0;
        let frame = irq.next_frame(&mut pos).unwrap();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.source(), CecLogicalAddress::Record1); // 0x10 >> 4
    }

    #[test]
    fn rx_abort_error_publishes_partial_frame() {
        let irq = CecIrq::new(8, OverrunPolicy::OverwriteOldest);
        irq.on_event(CecEvent::RxByte(0x04));
        irq.on_event(CecEvent::RxByte(0x44));
        irq.on_event(CecEvent::Error(CecErrors::TERR));

        let mut pos = 0;
        let frame = irq.next_frame(&mut pos).unwrap();
        assert!(frame.is_errored());
        assert_eq!(frame.opcode(), Some(0x44));
        assert_eq!(irq.take_errors(), CecErrors::TERR);
        assert!(irq.take_errors().is_empty());
    }

    #[test]
    fn tx_fault_without_partial_frame_only_sets_flags() {
        let irq = CecIrq::new(8, OverrunPolicy::OverwriteOldest);
        irq.on_event(CecEvent::Error(CecErrors::ACKERR));
        let mut pos = 0;
        assert!(irq.next_frame(&mut pos).is_none());
        assert_eq!(irq.take_errors(), CecErrors::ACKERR);
    }

    #[test]
    fn drop_newest_keeps_buffered_frames() {
        let irq = CecIrq::new(2, OverrunPolicy::DropNewest);
        for op in [0x01u8, 0x02, 0x03] {
            feed_frame(&irq, &[0x04, op]);
        }
        let mut pos = 0;
        assert_eq!(irq.next_frame(&mut pos).unwrap().opcode(), Some(0x01));
        assert_eq!(irq.next_frame(&mut pos).unwrap().opcode(), Some(0x02));
        assert!(irq.next_frame(&mut pos).is_none());
    }

    #[test]
    fn overwrite_oldest_replaces_unread_frame() {
        let irq = CecIrq::new(2, OverrunPolicy::OverwriteOldest);
        for op in [0x01u8, 0x02, 0x03] {
            feed_frame(&irq, &[0x04, op]);
        }
        // frame 1 was overwritten; the survivors drain in production
        // order, not starting at the stale cursor position
        let mut pos = 0;
        let ops: Vec<u8> = std::iter::from_fn(|| irq.next_frame(&mut pos))
            .filter_map(|f| f.opcode())
            .collect();
        assert_eq!(ops, vec![0x02, 0x03]);
    }

    #[test]
    fn repeated_overwrites_still_drain_in_order() {
        let irq = CecIrq::new(3, OverrunPolicy::OverwriteOldest);
        for op in 1..=8u8 {
            feed_frame(&irq, &[0x04, op]);
        }
        let mut pos = 0;
        let ops: Vec<u8> = std::iter::from_fn(|| irq.next_frame(&mut pos))
            .filter_map(|f| f.opcode())
            .collect();
        assert_eq!(ops, vec![6, 7, 8]);

        // draining in between resynchronizes only once
        for op in 9..=12u8 {
            feed_frame(&irq, &[0x04, op]);
        }
        let first = irq.next_frame(&mut pos).unwrap().opcode();
        assert_eq!(first, Some(10));
        feed_frame(&irq, &[0x04, 13]);
        let rest: Vec<u8> = std::iter::from_fn(|| irq.next_frame(&mut pos))
            .filter_map(|f| f.opcode())
            .collect();
        assert!(rest.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn producer_thread_consumer_thread() {
        let irq = CecIrq::new(DEFAULT_RING_CAPACITY, OverrunPolicy::DropNewest);
        let producer = irq.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..50u8 {
                producer.on_event(CecEvent::RxByte(0x04));
                producer.on_event(CecEvent::RxByte(i));
                producer.on_event(CecEvent::RxComplete);
            }
        });

        let mut pos = 0;
        let mut seen = Vec::new();
        while seen.len() < 50 {
            if let Some(frame) = irq.next_frame(&mut pos) {
                seen.push(frame.opcode().unwrap());
            } else {
                std::thread::yield_now();
            }
        }
        handle.join().unwrap();
        // arrival order is preserved
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }
}
