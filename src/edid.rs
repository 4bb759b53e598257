//! EDID base block and CTA-861 extension parsing.
//!
//! Only what physical address discovery needs: structural validation of
//! the 128-byte blocks and the scan for the HDMI vendor specific data
//! block carrying the sink's physical address.

use crate::error::EdidError;
use crate::proto::PhysicalAddress;

/// Every EDID block is exactly 128 bytes.
pub const EDID_BLOCK_SIZE: usize = 128;

/// IEEE OUI of the HDMI licensing LLC, identifies the HDMI VSDB.
const IEEE_IDENTIFIER_HDMI: u32 = 0x000C03;
/// Extension tag of a CTA-861 block.
const CTA_EXTENSION_TAG: u8 = 0x02;
/// The only CTA revision whose data block layout is understood here.
const CTA_SUPPORTED_REVISION: u8 = 3;

const HEADER_PATTERN: [u8; 8] = [0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00];

/// Block tags of the CTA data block collection.
mod block_tag {
    pub const AUDIO: u8 = 1;
    pub const EXTENDED: u8 = 7;
    pub const VENDOR_SPECIFIC: u8 = 3;
}

fn checksum_ok(block: &[u8; EDID_BLOCK_SIZE]) -> bool {
    block.iter().fold(0u8, |sum, &b| sum.wrapping_add(b)) == 0
}

/// A validated EDID base block.
#[derive(Debug, Clone)]
pub struct Edid([u8; EDID_BLOCK_SIZE]);

impl Edid {
    /// Checks the fixed header pattern and the block checksum.
    pub fn parse(block: [u8; EDID_BLOCK_SIZE]) -> Result<Edid, EdidError> {
        if block[..8] != HEADER_PATTERN || !checksum_ok(&block) {
            return Err(EdidError::InvalidData);
        }
        Ok(Edid(block))
    }

    /// Number of 128-byte extension blocks that follow the base block.
    pub fn extension_count(&self) -> u8 {
        self.0[126]
    }
}

/// A validated CTA-861 extension block.
#[derive(Debug, Clone)]
pub struct CtaExtension([u8; EDID_BLOCK_SIZE]);

impl CtaExtension {
    /// Checks the extension tag and the block checksum.
    pub fn parse(block: [u8; EDID_BLOCK_SIZE]) -> Result<CtaExtension, EdidError> {
        if block[0] != CTA_EXTENSION_TAG || !checksum_ok(&block) {
            return Err(EdidError::InvalidData);
        }
        Ok(CtaExtension(block))
    }

    pub fn revision(&self) -> u8 {
        self.0[1]
    }

    /// Walks the data block collection for the HDMI VSDB and extracts
    /// the physical address operand.
    ///
    /// Known block tags advance by their declared length, anything else
    /// advances a single byte so a bogus length cannot run past the end.
    pub fn find_physical_address(&self) -> Result<PhysicalAddress, EdidError> {
        if self.revision() != CTA_SUPPORTED_REVISION {
            return Err(EdidError::Unsupported(self.revision()));
        }
        // data block collection sits between the header and the checksum
        let data = &self.0[4..127];
        let mut at = 0usize;
        while at < data.len() {
            let tag = data[at] >> 5;
            let len = (data[at] & 0x1f) as usize;
            if tag == block_tag::VENDOR_SPECIFIC && at + 5 < data.len() && len >= 5 {
                let oui = u32::from(data[at + 1])
                    | u32::from(data[at + 2]) << 8
                    | u32::from(data[at + 3]) << 16;
                if oui == IEEE_IDENTIFIER_HDMI {
                    return Ok(PhysicalAddress::from_operand([
                        data[at + 4],
                        data[at + 5],
                    ]));
                }
            }
            if (block_tag::AUDIO..=block_tag::EXTENDED).contains(&tag) {
                at += len + 1;
            } else {
                at += 1;
            }
        }
        Err(EdidError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fix up the trailing checksum so the block sums to zero.
    fn checksummed(mut block: [u8; EDID_BLOCK_SIZE]) -> [u8; EDID_BLOCK_SIZE] {
        let sum = block[..127].iter().fold(0u8, |s, &b| s.wrapping_add(b));
        block[127] = 0u8.wrapping_sub(sum);
        block
    }

    fn base_block(extensions: u8) -> [u8; EDID_BLOCK_SIZE] {
        let mut block = [0u8; EDID_BLOCK_SIZE];
        block[..8].copy_from_slice(&HEADER_PATTERN);
        block[126] = extensions;
        checksummed(block)
    }

    fn cta_block_with_vsdb() -> [u8; EDID_BLOCK_SIZE] {
        let mut block = [0u8; EDID_BLOCK_SIZE];
        block[0] = CTA_EXTENSION_TAG;
        block[1] = CTA_SUPPORTED_REVISION;
        // audio block first, then the HDMI VSDB announcing 3.1.0.0
        block[4] = (block_tag::AUDIO << 5) | 3;
        block[8] = (block_tag::VENDOR_SPECIFIC << 5) | 5;
        block[9] = 0x03;
        block[10] = 0x0c;
        block[11] = 0x00;
        block[12] = 0x31;
        block[13] = 0x00;
        checksummed(block)
    }

    #[test]
    fn accepts_valid_base_block() {
        let edid = Edid::parse(base_block(1)).unwrap();
        assert_eq!(edid.extension_count(), 1);
    }

    #[test]
    fn rejects_corrupted_base_block() {
        let mut block = base_block(1);
        block[40] ^= 0x01; // checksum now wrong
        assert_eq!(Edid::parse(block).unwrap_err(), EdidError::InvalidData);

        let mut block = base_block(1);
        block[0] = 0xff; // header pattern broken, checksum refit
        assert_eq!(
            Edid::parse(checksummed(block)).unwrap_err(),
            EdidError::InvalidData
        );
    }

    #[test]
    fn extracts_physical_address_from_vsdb() {
        let cta = CtaExtension::parse(cta_block_with_vsdb()).unwrap();
        let addr = cta.find_physical_address().unwrap();
        assert_eq!(addr, PhysicalAddress([0x00, 0x00, 0x01, 0x03]));
        assert_eq!(addr.to_string(), "3.1.0.0");
    }

    #[test]
    fn unsupported_revision_is_reported() {
        let mut block = cta_block_with_vsdb();
        block[1] = 2;
        let cta = CtaExtension::parse(checksummed(block)).unwrap();
        assert_eq!(
            cta.find_physical_address(),
            Err(EdidError::Unsupported(2))
        );
    }

    #[test]
    fn scan_terminates_on_adversarial_lengths() {
        let mut block = [0u8; EDID_BLOCK_SIZE];
        block[0] = CTA_EXTENSION_TAG;
        block[1] = CTA_SUPPORTED_REVISION;
        // every data byte claims a maximal extended block
        for b in &mut block[4..127] {
            *b = (block_tag::EXTENDED << 5) | 0x1f;
        }
        let cta = CtaExtension::parse(checksummed(block)).unwrap();
        assert_eq!(cta.find_physical_address(), Err(EdidError::NotFound));
    }

    #[test]
    fn foreign_oui_is_skipped() {
        let mut block = cta_block_with_vsdb();
        block[9] = 0x5a; // not the HDMI OUI anymore
        let cta = CtaExtension::parse(checksummed(block)).unwrap();
        assert_eq!(cta.find_physical_address(), Err(EdidError::NotFound));
    }
}
