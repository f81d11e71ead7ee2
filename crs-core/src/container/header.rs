use crate::container::index::ENTRY_SIZE;
use crate::util::dostime;
use time::{Duration, OffsetDateTime};

/// Block and archive signature, 'MDmd' in ASCII.
pub const SIGNATURE: &[u8; 4] = b"MDmd";
pub const HEADER_LEN: usize = 122;
pub const RELEASE_LEVEL: u8 = 0x0A; // v1.0
pub const HEADER_TYPE: u8 = 0x01;

const INDEX_MARKER: &[u8; 7] = b"~INDEX~";

/// Compatibility skew applied to the source mtime before DOS packing.
/// Opaque constant carried over from the original toolchain.
pub const MTIME_SKEW: Duration = Duration::minutes(4 * 60 + 30);

#[derive(Debug, Clone, Copy)]
pub struct ArchiveHeader {
    pub file_count: u16,
    pub dos_time: u16,
    pub dos_date: u16,
}

impl ArchiveHeader {
    pub fn new(file_count: u16, mtime: OffsetDateTime) -> Self {
        let stamp = mtime + MTIME_SKEW;
        Self {
            file_count,
            dos_time: dostime::pack_time(stamp.hour(), stamp.minute(), stamp.second()),
            dos_date: dostime::pack_date(stamp.year(), u8::from(stamp.month()), stamp.day()),
        }
    }

    /// Byte size of the index table described by this header. The caller
    /// guarantees the product fits the header's u16 field.
    pub fn index_size(&self) -> u16 {
        self.file_count.wrapping_mul(ENTRY_SIZE as u16)
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];

        buf[0x00..0x04].copy_from_slice(SIGNATURE);
        buf[0x04] = RELEASE_LEVEL;
        buf[0x05] = HEADER_TYPE;
        buf[0x06..0x08].copy_from_slice(&(HEADER_LEN as u16).to_le_bytes());

        buf[0x0A..0x0C].copy_from_slice(&self.file_count.to_le_bytes());
        // Index table size is stored twice; both copies must agree.
        let table_size = self.index_size().to_le_bytes();
        buf[0x19..0x1B].copy_from_slice(&table_size);
        buf[0x1D..0x1F].copy_from_slice(&table_size);

        buf[0x23..0x25].copy_from_slice(&self.dos_time.to_le_bytes());
        buf[0x25..0x27].copy_from_slice(&self.dos_date.to_le_bytes());

        // Length-prefixed index marker
        buf[0x29] = INDEX_MARKER.len() as u8;
        buf[0x2A..0x31].copy_from_slice(INDEX_MARKER);

        // Fixed filler: spaces with a single zero byte at 0x36
        for b in &mut buf[0x31..0x36] {
            *b = 0x20;
        }
        buf[0x36] = 0x00;
        for b in &mut buf[0x37..HEADER_LEN] {
            *b = 0x20;
        }

        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn encodes_counts_and_table_sizes() {
        let header = ArchiveHeader {
            file_count: 3,
            dos_time: 0,
            dos_date: 0,
        };
        let buf = header.encode();
        assert_eq!(&buf[0x00..0x04], b"MDmd");
        assert_eq!(buf[0x04], 0x0A);
        assert_eq!(buf[0x05], 0x01);
        assert_eq!(&buf[0x06..0x08], &[122, 0]);
        assert_eq!(&buf[0x0A..0x0C], &[0x03, 0x00]);
        // 3 * 17 = 51 = 0x33, stored in both redundant slots
        assert_eq!(&buf[0x19..0x1B], &[0x33, 0x00]);
        assert_eq!(&buf[0x1D..0x1F], &[0x33, 0x00]);
    }

    #[test]
    fn encodes_marker_and_filler() {
        let buf = ArchiveHeader {
            file_count: 0,
            dos_time: 0,
            dos_date: 0,
        }
        .encode();
        assert_eq!(buf[0x29], 7);
        assert_eq!(&buf[0x2A..0x31], b"~INDEX~");
        assert!(buf[0x31..0x36].iter().all(|&b| b == 0x20));
        assert_eq!(buf[0x36], 0x00);
        assert!(buf[0x37..HEADER_LEN].iter().all(|&b| b == 0x20));
    }

    #[test]
    fn applies_mtime_skew_before_packing() {
        // 14:30:10 UTC shifts to 19:00:10 under the +4h30m skew
        let header = ArchiveHeader::new(3, datetime!(2023-06-15 14:30:10 UTC));
        assert_eq!(header.dos_date, ((2023 - 1980) << 9) | (6 << 5) | 15);
        assert_eq!(header.dos_time, (19 << 11) | (0 << 5) | 5);
    }

    #[test]
    fn skew_can_roll_the_date() {
        let header = ArchiveHeader::new(1, datetime!(2023-06-15 21:45:00 UTC));
        assert_eq!(header.dos_date, ((2023 - 1980) << 9) | (6 << 5) | 16);
        assert_eq!(header.dos_time, (2 << 11) | (15 << 5));
    }
}
