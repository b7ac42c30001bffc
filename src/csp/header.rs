//! CSP header v1 codec (component G): pack/unpack of the 32-bit packed
//! header descriptor.
use crate::error::{CspError, CspResult};
use crate::Endian;

/// CSP packet priority. Lower numeric values are higher priority on the
/// wire, matching the source protocol's convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Critical = 0,
    High = 1,
    Norm = 2,
    Low = 3,
}

impl TryFrom<u8> for Priority {
    type Error = CspError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Priority::Critical),
            1 => Ok(Priority::High),
            2 => Ok(Priority::Norm),
            3 => Ok(Priority::Low),
            _ => Err(CspError::FieldOutOfRange {
                field: "priority",
                value: value as u32,
                bits: 2,
            }),
        }
    }
}

/// The four single-bit flags carried in the low byte of a CSP v1 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CspFlags {
    pub hmac: bool,
    pub xtea: bool,
    pub rdp: bool,
    pub crc: bool,
}

impl CspFlags {
    fn to_byte(self) -> u8 {
        (self.hmac as u8) << 3 | (self.xtea as u8) << 2 | (self.rdp as u8) << 1 | (self.crc as u8)
    }

    fn from_byte(byte: u8) -> Self {
        Self {
            hmac: byte & 0b1000 != 0,
            xtea: byte & 0b0100 != 0,
            rdp: byte & 0b0010 != 0,
            crc: byte & 0b0001 != 0,
        }
    }
}

/// A parsed or about-to-be-serialized CSP v1 header.
///
/// Field widths: priority 2 bits, source/destination address 5 bits each,
/// destination/source port 6 bits each, 4 reserved bits, then the four
/// [`CspFlags`] bits. `endian` controls the byte order of the serialized
/// 4-byte form; both ends of a link must agree on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CspHeaderV1 {
    pub priority: Priority,
    pub src: u8,
    pub dst: u8,
    pub dport: u8,
    pub sport: u8,
    pub reserved: u8,
    pub flags: CspFlags,
    pub endian: Endian,
}

fn check_width(field: &'static str, value: u8, bits: u32) -> CspResult<()> {
    if (value as u32) >= (1u32 << bits) {
        return Err(CspError::FieldOutOfRange {
            field,
            value: value as u32,
            bits,
        });
    }
    Ok(())
}

impl CspHeaderV1 {
    pub const WIRE_LEN: usize = 4;

    /// Validate every field against its declared bit width.
    pub fn validate(&self) -> CspResult<()> {
        check_width("src", self.src, 5)?;
        check_width("dst", self.dst, 5)?;
        check_width("dport", self.dport, 6)?;
        check_width("sport", self.sport, 6)?;
        check_width("reserved", self.reserved, 4)?;
        Ok(())
    }

    /// Pack this header into its 4-byte wire form, in `self.endian` order.
    pub fn serialize(&self) -> CspResult<[u8; 4]> {
        self.validate()?;
        let packed: u32 = ((self.priority as u32) << 30)
            | ((self.src as u32) << 25)
            | ((self.dst as u32) << 20)
            | ((self.dport as u32) << 14)
            | ((self.sport as u32) << 8)
            | ((self.reserved as u32) << 4)
            | (self.flags.to_byte() as u32 & 0x0F);
        Ok(match self.endian {
            Endian::Big => packed.to_be_bytes(),
            Endian::Little => packed.to_le_bytes(),
        })
    }

    /// Parse a 4-byte wire header in `endian` order.
    pub fn parse(bytes: &[u8], endian: Endian) -> CspResult<Self> {
        if bytes.len() < Self::WIRE_LEN {
            return Err(CspError::ShortFrame {
                needed: Self::WIRE_LEN,
                have: bytes.len(),
            });
        }
        let raw: [u8; 4] = bytes[..4].try_into().unwrap();
        let packed = match endian {
            Endian::Big => u32::from_be_bytes(raw),
            Endian::Little => u32::from_le_bytes(raw),
        };
        let priority = Priority::try_from(((packed >> 30) & 0x3) as u8)?;
        let header = Self {
            priority,
            src: ((packed >> 25) & 0x1F) as u8,
            dst: ((packed >> 20) & 0x1F) as u8,
            dport: ((packed >> 14) & 0x3F) as u8,
            sport: ((packed >> 8) & 0x3F) as u8,
            reserved: ((packed >> 4) & 0xF) as u8,
            flags: CspFlags::from_byte((packed & 0xFF) as u8),
            endian,
        };
        header.validate()?;
        Ok(header)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn known_answer_header() -> CspHeaderV1 {
        CspHeaderV1 {
            priority: Priority::Norm,
            src: 10,
            dst: 1,
            dport: 7,
            sport: 16,
            reserved: 0,
            flags: CspFlags::default(),
            endian: Endian::Big,
        }
    }

    #[test]
    fn known_answer_header_pack() {
        let header = known_answer_header();
        assert_eq!(header.serialize().unwrap(), [0x8A, 0x81, 0xD0, 0x00]);
    }

    #[test]
    fn round_trip_big_endian() {
        let header = known_answer_header();
        let bytes = header.serialize().unwrap();
        let parsed = CspHeaderV1::parse(&bytes, Endian::Big).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn round_trip_little_endian() {
        let mut header = known_answer_header();
        header.endian = Endian::Little;
        let bytes = header.serialize().unwrap();
        let parsed = CspHeaderV1::parse(&bytes, Endian::Little).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn round_trip_all_flags_set() {
        let mut header = known_answer_header();
        header.flags = CspFlags {
            hmac: true,
            xtea: true,
            rdp: true,
            crc: true,
        };
        let bytes = header.serialize().unwrap();
        assert_eq!(bytes[3], 0x0F);
        let parsed = CspHeaderV1::parse(&bytes, Endian::Big).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn field_out_of_range_is_rejected() {
        let mut header = known_answer_header();
        header.src = 0x20; // 6 bits set, only 5 allowed
        assert!(matches!(
            header.serialize(),
            Err(CspError::FieldOutOfRange { field: "src", .. })
        ));
    }
}
