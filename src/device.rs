//! Cache of what is known about the other devices on the bus.

use crate::proto::{CecLogicalAddress, PhysicalAddress, VendorID, Version};

/// Everything learned about one logical address, filled in from the
/// informational reports the dispatcher sees passing by.
#[derive(Debug, Default, Clone)]
pub struct DeviceStatus {
    /// Something was heard from this address.
    pub active: bool,
    /// This entry describes the local device.
    pub mine: bool,
    /// The device declared itself the active source.
    pub active_source: bool,
    pub physical_address: Option<PhysicalAddress>,
    pub vendor_id: Option<VendorID>,
    pub cec_version: Option<Version>,
    /// Last reported power state, `true` for on (or warming up).
    pub power_on: Option<bool>,
}

/// Per-logical-address device cache, indexed 0..=14.
///
/// The broadcast/unregistered address has no entry, lookups with it
/// return `None`.
#[derive(Debug, Default)]
pub struct BusDevices {
    entries: [DeviceStatus; 15],
}

impl BusDevices {
    pub fn get(&self, addr: CecLogicalAddress) -> Option<&DeviceStatus> {
        if addr.is_broadcast() {
            return None;
        }
        Some(&self.entries[u8::from(addr) as usize])
    }

    pub fn get_mut(&mut self, addr: CecLogicalAddress) -> Option<&mut DeviceStatus> {
        if addr.is_broadcast() {
            return None;
        }
        Some(&mut self.entries[u8::from(addr) as usize])
    }

    pub fn iter(&self) -> impl Iterator<Item = (CecLogicalAddress, &DeviceStatus)> {
        self.entries.iter().enumerate().map(|(i, status)| {
            let addr = CecLogicalAddress::try_from(i as u8)
                .unwrap_or(CecLogicalAddress::UnregisteredBroadcast);
            (addr, status)
        })
    }

    /// At most one device is the active source at any time.
    pub fn set_active_source(&mut self, addr: CecLogicalAddress) {
        for entry in &mut self.entries {
            entry.active_source = false;
        }
        if let Some(entry) = self.get_mut(addr) {
            entry.active_source = true;
            entry.active = true;
        }
    }

    pub fn active_source(&self) -> Option<CecLogicalAddress> {
        self.iter()
            .find(|(_, status)| status.active_source)
            .map(|(addr, _)| addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_address_has_no_entry() {
        let mut devices = BusDevices::default();
        assert!(devices.get(CecLogicalAddress::UnregisteredBroadcast).is_none());
        assert!(devices
            .get_mut(CecLogicalAddress::UnregisteredBroadcast)
            .is_none());
        assert!(devices.get(CecLogicalAddress::Specific).is_some());
    }

    #[test]
    fn active_source_is_exclusive() {
        let mut devices = BusDevices::default();
        devices.set_active_source(CecLogicalAddress::Playback1);
        devices.set_active_source(CecLogicalAddress::Tuner1);

        assert_eq!(devices.active_source(), Some(CecLogicalAddress::Tuner1));
        let flagged = devices.iter().filter(|(_, d)| d.active_source).count();
        assert_eq!(flagged, 1);
        assert!(devices.get(CecLogicalAddress::Tuner1).unwrap().active);
    }
}
