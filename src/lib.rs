/*!
Device-side HDMI-CEC bus controller.

Drives a CEC bus engine behind the [CecTransport] trait: negotiates a
logical address for the device's role, transmits frames with the
frame-length dependent timeout, drains the interrupt-fed receive ring
and answers the standard queries (physical address, vendor ID, OSD
name, power and audio status) on its own. Remote control requests the
application has to act on come back as [CecAction]s.

The sink-assigned physical address can be discovered from the EDID over
the DDC/I2C channel with [EdidReader].

```no_run
use cec_device::{CecConfig, CecController, DeviceRole};
# use std::io;
# struct Engine;
# impl cec_device::CecTransport for Engine {
#     fn claim_address(&mut self, _: cec_device::CecLogicalAddress) -> io::Result<cec_device::WriteStatus> { Ok(cec_device::WriteStatus::Queued) }
#     fn claim_status(&mut self) -> io::Result<cec_device::ClaimState> { Ok(cec_device::ClaimState::Ready) }
#     fn write(&mut self, _: &[u8]) -> io::Result<cec_device::WriteStatus> { Ok(cec_device::WriteStatus::Queued) }
# }
# struct Spin;
# impl cec_device::Delay for Spin { fn delay_ms(&mut self, _: u32) {} }
let (mut cec, irq) = CecController::new(Engine, Spin, CecConfig::default());
// wire `irq` into the peripheral's interrupt handler, then:
let addr = cec.claim_logical_address(DeviceRole::Playback)?;
while let Some(action) = cec.poll() {
    // react to power/volume requests from the bus
}
# Ok::<(), cec_device::CecError>(())
```
*/

pub mod ddc;
pub mod device;
pub mod edid;
pub mod error;
pub mod proto;
pub mod rx;
pub mod transport;

pub use ddc::{DdcIrq, EdidReader};
pub use device::{BusDevices, DeviceStatus};
pub use error::{CecError, DdcError, EdidError};
pub use proto::{
    CecAbortReason, CecDeviceType, CecErrors, CecFeatures, CecLogicalAddress, CecOpcode,
    CecPowerStatus, CecUserControlCode, OSDStr, PhysicalAddress, SystemAudioStatus, VendorID,
    Version, CEC_MAX_FRAME_SIZE, CEC_MAX_PAYLOAD,
};
pub use rx::{CecIrq, OverrunPolicy, RxFrame, DEFAULT_RING_CAPACITY};
pub use transport::{
    CecEvent, CecTransport, ClaimState, DdcEvent, DdcTransport, Delay, WriteStatus,
};

use log::{debug, info, warn};
use proto::opcode_description;
use rx::RxFrame as Frame;

/// How long a key stays pressed between UserControlPressed/Released, ms.
const KEY_PRESS_MS: u32 = 100;
/// Settle time between messages during a bus scan, ms.
const BUS_SCAN_SETTLE_MS: u32 = 400;
/// Settle time between the Off and On halves of a system audio request, ms.
const SYSTEM_AUDIO_SETTLE_MS: u32 = 300;
/// Claim status polls before a candidate address counts as taken.
const CLAIM_POLL_LIMIT: u32 = 100;

/// Static device identity and receive-ring tuning.
pub struct CecConfig {
    /// Fallback position in the HDMI tree when EDID discovery is
    /// unavailable.
    pub physical_address: PhysicalAddress,
    /// Name returned for GiveOsdName, up to 14 ascii bytes.
    pub osd_name: OSDStr<14>,
    /// IEEE OUI returned for GiveDeviceVendorId.
    pub vendor_id: VendorID,
    pub ring_capacity: usize,
    pub overrun_policy: OverrunPolicy,
    /// Whether SystemAudioModeRequest is honored or declined.
    pub system_audio_support: bool,
}

impl Default for CecConfig {
    fn default() -> Self {
        CecConfig {
            physical_address: PhysicalAddress([0x0, 0x0, 0x1, 0x3]), // 3.1.0.0
            osd_name: OSDStr::from(&b"RA CEC DEMO"[..]),
            vendor_id: VendorID([0x00, 0x00, 0x00]),
            ring_capacity: DEFAULT_RING_CAPACITY,
            overrun_policy: OverrunPolicy::OverwriteOldest,
            system_audio_support: false,
        }
    }
}

/// The role a device plays on the bus, determining which logical
/// addresses it may claim and in which order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceRole {
    Tv,
    Recording,
    Tuner,
    Playback,
    AudioSystem,
}

impl DeviceRole {
    pub fn candidates(self) -> &'static [CecLogicalAddress] {
        match self {
            DeviceRole::Tv => &[CecLogicalAddress::Tv],
            DeviceRole::Recording => &[
                CecLogicalAddress::Record1,
                CecLogicalAddress::Record2,
                CecLogicalAddress::Record3,
            ],
            DeviceRole::Tuner => &[
                CecLogicalAddress::Tuner1,
                CecLogicalAddress::Tuner2,
                CecLogicalAddress::Tuner3,
                CecLogicalAddress::Tuner4,
            ],
            DeviceRole::Playback => &[
                CecLogicalAddress::Playback1,
                CecLogicalAddress::Playback2,
                CecLogicalAddress::Playback3,
            ],
            DeviceRole::AudioSystem => &[CecLogicalAddress::Audiosystem],
        }
    }
}

/// A request from the bus the application has to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CecAction {
    PowerOn,
    PowerOff,
    VolumeUp,
    VolumeDown,
    VolumeMute,
}

/// The CEC bus controller. See the crate docs for the big picture.
pub struct CecController<T, D> {
    transport: T,
    delay: D,
    irq: CecIrq,
    read_pos: usize,
    devices: BusDevices,
    own: Option<CecLogicalAddress>,
    physical_address: PhysicalAddress,
    osd_name: OSDStr<14>,
    vendor_id: VendorID,
    power_on: bool,
    volume: u8,
    muted: bool,
    system_audio_support: bool,
    system_audio_on: bool,
}

impl<T: CecTransport, D: Delay> CecController<T, D> {
    /// Builds the controller and the interrupt handle feeding it.
    pub fn new(transport: T, delay: D, config: CecConfig) -> (Self, CecIrq) {
        let irq = CecIrq::new(config.ring_capacity, config.overrun_policy);
        let controller = CecController {
            transport,
            delay,
            irq: irq.clone(),
            read_pos: 0,
            devices: BusDevices::default(),
            own: None,
            physical_address: config.physical_address,
            osd_name: config.osd_name,
            vendor_id: config.vendor_id,
            power_on: true,
            volume: 50,
            muted: false,
            system_audio_support: config.system_audio_support,
            system_audio_on: false,
        };
        (controller, irq)
    }

    pub fn logical_address(&self) -> Option<CecLogicalAddress> {
        self.own
    }
    pub fn physical_address(&self) -> PhysicalAddress {
        self.physical_address
    }
    pub fn devices(&self) -> &BusDevices {
        &self.devices
    }
    pub fn system_audio_on(&self) -> bool {
        self.system_audio_on
    }
    pub fn system_audio_supported(&self) -> bool {
        self.system_audio_support
    }

    /// Install the position discovered from the EDID.
    pub fn set_physical_address(&mut self, addr: PhysicalAddress) {
        self.physical_address = addr;
        if let Some(entry) = self.own.and_then(|own| self.devices.get_mut(own)) {
            entry.physical_address = Some(addr);
        }
    }

    /// Local power state, used to answer GiveDevicePowerStatus.
    pub fn set_power(&mut self, on: bool) {
        self.power_on = on;
        if let Some(entry) = self.own.and_then(|own| self.devices.get_mut(own)) {
            entry.power_on = Some(on);
        }
    }

    /// Local audio state, used to answer GiveAudioStatus.
    /// Volume is a percentage, 0..=100.
    pub fn set_volume_status(&mut self, volume: u8, muted: bool) {
        self.volume = volume.min(100);
        self.muted = muted;
    }

    /**
     * Claims a logical address for `role`.
     *
     * Tries the role's candidate addresses in order: each one is
     * claimed on the bus, then the engine is polled (up to 100 ms) until
     * it reports the negotiation outcome. The first free address wins
     * and the own device cache entry is seeded.
     */
    pub fn claim_logical_address(
        &mut self,
        role: DeviceRole,
    ) -> Result<CecLogicalAddress, CecError> {
        for &candidate in role.candidates() {
            // busy clears promptly, resubmit straight away
            while let WriteStatus::Busy = self.transport.claim_address(candidate)? {}
            let mut claimed = false;
            for _ in 0..CLAIM_POLL_LIMIT {
                match self.transport.claim_status()? {
                    ClaimState::Ready => {
                        claimed = true;
                        break;
                    }
                    ClaimState::InUse => break,
                    ClaimState::Busy => self.delay.delay_ms(1),
                }
            }
            if claimed {
                info!(
                    "claimed logical address {} ({})",
                    u8::from(candidate),
                    candidate.description()
                );
                self.own = Some(candidate);
                if let Some(entry) = self.devices.get_mut(candidate) {
                    entry.active = true;
                    entry.mine = true;
                    entry.power_on = Some(true);
                    entry.cec_version = Some(Version::V1_4);
                    entry.physical_address = Some(self.physical_address);
                    entry.vendor_id = Some(self.vendor_id);
                }
                self.power_on = true;
                return Ok(candidate);
            }
            info!(
                "logical address {} ({}) is taken",
                u8::from(candidate),
                candidate.description()
            );
        }
        Err(CecError::AddressInUse)
    }

    /**
     * Transmits one message and waits for its completion.
     *
     * Submission is retried for as long as the engine reports busy. The
     * completion wait is bounded by the frame length: 5 ms of margin
     * plus 40 ms per byte on the wire. Error bits flagged meanwhile
     * fail the transmit if they belong to the fault set, anything else
     * (a concurrent receive problem) is cleared and the wait goes on.
     */
    pub fn send(
        &mut self,
        dest: CecLogicalAddress,
        opcode: CecOpcode,
        payload: &[u8],
    ) -> Result<(), CecError> {
        let src = self.own.ok_or(CecError::NotClaimed)?;
        if payload.len() > CEC_MAX_PAYLOAD {
            return Err(CecError::PayloadTooLong);
        }
        let mut frame = [0u8; CEC_MAX_FRAME_SIZE];
        frame[0] = (u8::from(src) << 4) | u8::from(dest);
        frame[1] = opcode.into();
        frame[2..2 + payload.len()].copy_from_slice(payload);
        let len = 2 + payload.len();

        info!(
            "[> CEC Out] {} -> {}: {}",
            src.description(),
            dest.description(),
            opcode.description()
        );

        // busy clears promptly, resubmit straight away
        while let WriteStatus::Busy = self.transport.write(&frame[..len])? {}

        let mut timeout = 5 + 40 * len as u32;
        let result = loop {
            if self.irq.tx_complete() {
                break Ok(());
            }
            let errors = self.irq.take_errors();
            if errors.intersects(CecErrors::TX_FAULTS) {
                break Err(CecError::Transmit(errors));
            }
            if timeout == 0 {
                break Err(CecError::Timeout);
            }
            timeout -= 1;
            self.delay.delay_ms(1);
        };
        self.irq.clear_tx_complete();
        result
    }

    /**
     * Drains the receive ring, answering queries and updating the
     * device cache along the way.
     *
     * Stops early and returns as soon as a frame asks the application
     * to do something; call again to keep draining.
     */
    pub fn poll(&mut self) -> Option<CecAction> {
        let capacity = self.irq.capacity();
        for _ in 0..capacity {
            let irq = self.irq.clone();
            let frame = irq.next_frame(&mut self.read_pos)?;
            if let Some(action) = self.handle_frame(&frame) {
                return Some(action);
            }
        }
        None
    }

    /**
     * Queries every possible device for its physical address, vendor
     * ID, CEC version and power status, then asks for the active
     * source. The answers arrive asynchronously and are folded into
     * the cache by [CecController::poll].
     */
    pub fn bus_scan(&mut self) {
        info!("scanning the CEC bus");
        for opcode in [
            CecOpcode::GivePhysicalAddr,
            CecOpcode::GiveDeviceVendorId,
            CecOpcode::GetCecVersion,
            CecOpcode::GiveDevicePowerStatus,
        ] {
            for raw in 0..12u8 {
                let Ok(addr) = CecLogicalAddress::try_from(raw) else {
                    continue;
                };
                if self.own == Some(addr) {
                    continue;
                }
                if let Err(e) = self.send(addr, opcode, &[]) {
                    debug!("no answer from {}: {e}", addr.description());
                }
                self.delay.delay_ms(BUS_SCAN_SETTLE_MS);
            }
        }
        if let Err(e) = self.send(
            CecLogicalAddress::UnregisteredBroadcast,
            CecOpcode::RequestActiveSource,
            &[],
        ) {
            debug!("active source request failed: {e}");
        }
    }

    /// One touch play: ask `dest` to wake up.
    pub fn power_on(&mut self, dest: CecLogicalAddress) -> Result<(), CecError> {
        self.send(dest, CecOpcode::ImageViewOn, &[])
    }

    /// Put `dest` (or everyone, via broadcast) into standby.
    pub fn power_off(&mut self, dest: CecLogicalAddress) -> Result<(), CecError> {
        self.send(dest, CecOpcode::Standby, &[])
    }

    /// Remote control pass through: press and release a key.
    pub fn press_key(
        &mut self,
        dest: CecLogicalAddress,
        key: CecUserControlCode,
    ) -> Result<(), CecError> {
        self.send(dest, CecOpcode::UserControlPressed, &[key.into()])?;
        self.delay.delay_ms(KEY_PRESS_MS);
        self.send(dest, CecOpcode::UserControlReleased, &[])
    }

    pub fn volume_up(&mut self, dest: CecLogicalAddress) -> Result<(), CecError> {
        self.press_key(dest, CecUserControlCode::VolumeUp)
    }
    pub fn volume_down(&mut self, dest: CecLogicalAddress) -> Result<(), CecError> {
        self.press_key(dest, CecUserControlCode::VolumeDown)
    }
    pub fn volume_mute(&mut self, dest: CecLogicalAddress) -> Result<(), CecError> {
        self.press_key(dest, CecUserControlCode::Mute)
    }

    /// Enables or disables answering SystemAudioModeRequest. Disabling
    /// while the mode is active turns it off towards the TV first.
    pub fn set_system_audio_support(&mut self, enabled: bool) {
        if !enabled && self.system_audio_on {
            self.reply(
                CecLogicalAddress::Tv,
                CecOpcode::SetSystemAudioMode,
                &[SystemAudioStatus::Off.into()],
            );
            self.system_audio_on = false;
            info!("system audio mode turned off");
        }
        self.system_audio_support = enabled;
    }

    /**
     * Toggles the System Audio Mode towards the TV.
     *
     * Turning it on needs a known active source in the cache (run a
     * [CecController::bus_scan] first): the mode is switched off, the
     * bus settles, then the on request goes out and the local status
     * follows its outcome.
     */
    pub fn request_system_audio_mode(&mut self) -> Result<(), CecError> {
        self.system_audio_support = true;

        if self.system_audio_on {
            self.send(
                CecLogicalAddress::Tv,
                CecOpcode::SetSystemAudioMode,
                &[SystemAudioStatus::Off.into()],
            )?;
            self.system_audio_on = false;
            info!("system audio mode turned off");
            return Ok(());
        }

        let source = self.devices.active_source().ok_or(CecError::NoActiveSource)?;
        info!("current active source is {}", source.description());

        self.send(
            CecLogicalAddress::Tv,
            CecOpcode::SetSystemAudioMode,
            &[SystemAudioStatus::Off.into()],
        )?;
        self.delay.delay_ms(SYSTEM_AUDIO_SETTLE_MS);
        match self.send(
            CecLogicalAddress::Tv,
            CecOpcode::SetSystemAudioMode,
            &[SystemAudioStatus::On.into()],
        ) {
            Ok(()) => {
                self.system_audio_on = true;
                Ok(())
            }
            Err(e) => {
                self.system_audio_on = false;
                Err(e)
            }
        }
    }

    /// Send an auto response, a failure is logged but never fatal.
    fn reply(&mut self, dest: CecLogicalAddress, opcode: CecOpcode, payload: &[u8]) -> bool {
        match self.send(dest, opcode, payload) {
            Ok(()) => true,
            Err(e) => {
                warn!("auto response {} failed: {e}", opcode.description());
                false
            }
        }
    }

    fn handle_frame(&mut self, frame: &Frame) -> Option<CecAction> {
        let src = frame.source();
        let dest = frame.destination();

        if frame.is_errored() {
            warn!(
                "discarding frame from {} aborted by a bus error",
                src.description()
            );
            return None;
        }
        // the engine receives its own transmissions too
        if self.own == Some(src) {
            return None;
        }
        let Some(raw) = frame.opcode() else {
            debug!("polling frame from {}", src.description());
            return None;
        };
        info!(
            "[< CEC In] {} -> {}: {}",
            src.description(),
            dest.description(),
            opcode_description(raw)
        );
        let payload = frame.payload().to_vec();

        match CecOpcode::try_from(raw) {
            Ok(CecOpcode::ImageViewOn) => {
                self.set_power(true);
                Some(CecAction::PowerOn)
            }
            Ok(CecOpcode::Standby) => {
                self.set_power(false);
                Some(CecAction::PowerOff)
            }
            Ok(CecOpcode::UserControlPressed) => {
                match payload.first().and_then(|&b| CecUserControlCode::try_from(b).ok()) {
                    Some(CecUserControlCode::VolumeUp) => Some(CecAction::VolumeUp),
                    Some(CecUserControlCode::VolumeDown) => Some(CecAction::VolumeDown),
                    Some(CecUserControlCode::Mute) => Some(CecAction::VolumeMute),
                    _ => None,
                }
            }
            Ok(CecOpcode::GivePhysicalAddr) => {
                if let Some(device_type) = self.own.and_then(|own| own.device_type()) {
                    let operand = self.physical_address.to_operand();
                    self.reply(
                        CecLogicalAddress::UnregisteredBroadcast,
                        CecOpcode::ReportPhysicalAddr,
                        &[operand[0], operand[1], device_type.into()],
                    );
                }
                None
            }
            Ok(CecOpcode::GiveDeviceVendorId) => {
                let vendor = self.vendor_id.0;
                self.reply(
                    CecLogicalAddress::UnregisteredBroadcast,
                    CecOpcode::DeviceVendorId,
                    &vendor,
                );
                None
            }
            Ok(CecOpcode::GiveOsdName) => {
                let name = self.osd_name.clone();
                self.reply(src, CecOpcode::SetOsdName, name.as_bytes());
                None
            }
            Ok(CecOpcode::GiveDevicePowerStatus) => {
                let status = if self.power_on {
                    CecPowerStatus::On
                } else {
                    CecPowerStatus::Standby
                };
                self.reply(src, CecOpcode::ReportPowerStatus, &[status.into()]);
                None
            }
            Ok(CecOpcode::GiveAudioStatus) => {
                let status = ((self.muted as u8) << 7) | (self.volume & 0x7f);
                self.reply(src, CecOpcode::ReportAudioStatus, &[status]);
                None
            }
            Ok(CecOpcode::SystemAudioModeRequest) => {
                if self.system_audio_support {
                    // a physical address in the payload asks for on,
                    // an empty request asks for termination
                    let status = if payload.is_empty() {
                        SystemAudioStatus::Off
                    } else {
                        SystemAudioStatus::On
                    };
                    if self.reply(
                        CecLogicalAddress::Tv,
                        CecOpcode::SetSystemAudioMode,
                        &[status.into()],
                    ) {
                        self.system_audio_on = status == SystemAudioStatus::On;
                    }
                } else {
                    self.system_audio_on = false;
                    self.reply(
                        CecLogicalAddress::Tv,
                        CecOpcode::SetSystemAudioMode,
                        &[SystemAudioStatus::Off.into()],
                    );
                }
                None
            }
            Ok(CecOpcode::GiveSystemAudioModeStatus) => {
                let status = if self.system_audio_on {
                    SystemAudioStatus::On
                } else {
                    SystemAudioStatus::Off
                };
                self.reply(src, CecOpcode::SystemAudioModeStatus, &[status.into()]);
                None
            }
            Ok(CecOpcode::SystemAudioModeStatus) => {
                if let Some(&status) = payload.first() {
                    self.system_audio_on = status != u8::from(SystemAudioStatus::Off);
                }
                None
            }
            Ok(CecOpcode::ReportPhysicalAddr) => {
                if payload.len() >= 2 {
                    if let Some(entry) = self.devices.get_mut(src) {
                        entry.active = true;
                        entry.physical_address =
                            Some(PhysicalAddress::from_operand([payload[0], payload[1]]));
                    }
                }
                None
            }
            Ok(CecOpcode::CecVersion) => {
                if let Some(&raw_version) = payload.first() {
                    match Version::try_from(raw_version) {
                        Ok(version) => {
                            if let Some(entry) = self.devices.get_mut(src) {
                                entry.active = true;
                                entry.cec_version = Some(version);
                            }
                        }
                        Err(_) => debug!("unknown CEC version byte {raw_version:#x}"),
                    }
                }
                None
            }
            Ok(CecOpcode::ReportPowerStatus) => {
                if let Some(power) = payload
                    .first()
                    .and_then(|&b| CecPowerStatus::try_from(b).ok())
                {
                    let on = matches!(
                        power,
                        CecPowerStatus::On | CecPowerStatus::InTransitionStandbyToOn
                    );
                    if let Some(entry) = self.devices.get_mut(src) {
                        entry.active = true;
                        entry.power_on = Some(on);
                    }
                }
                None
            }
            Ok(CecOpcode::DeviceVendorId) => {
                if payload.len() >= 3 {
                    if let Some(entry) = self.devices.get_mut(src) {
                        entry.active = true;
                        entry.vendor_id =
                            Some(VendorID([payload[0], payload[1], payload[2]]));
                    }
                }
                None
            }
            Ok(CecOpcode::ActiveSource) => {
                if !src.is_broadcast() {
                    self.devices.set_active_source(src);
                    if payload.len() >= 2 {
                        if let Some(entry) = self.devices.get_mut(src) {
                            entry.physical_address =
                                Some(PhysicalAddress::from_operand([payload[0], payload[1]]));
                        }
                    }
                }
                None
            }
            Ok(CecOpcode::FeatureAbort) => {
                warn!(
                    "{} rejected {}: reason {:?}",
                    src.description(),
                    payload.first().map(|&b| opcode_description(b)).unwrap_or("?"),
                    payload.get(1).and_then(|&b| CecAbortReason::try_from(b).ok()),
                );
                None
            }
            Ok(CecOpcode::Abort) => None,
            _ => {
                // anything unhandled and directed at us gets declined
                if !dest.is_broadcast() {
                    self.reply(
                        src,
                        CecOpcode::FeatureAbort,
                        &[raw, CecAbortReason::Unrecognized.into()],
                    );
                }
                None
            }
        }
    }
}
