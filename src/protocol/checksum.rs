//! Frame checksum: one's complement of the 16-bit modular sum of every byte
//! from the command byte through the end of the payload.

pub trait Checksum {
    fn checksum(&mut self) -> u16;
}

impl<'a> Checksum for std::slice::Iter<'a, u8> {
    fn checksum(&mut self) -> u16 {
        !self.fold(0u16, |acc, byte| acc.wrapping_add(*byte as u16))
    }
}

/// Verify the checksum trailer of a complete frame.
///
/// Frame layout: `command(1) | address(3) | length(1) | payload(length) | checksum(2)`,
/// all multi-byte fields big-endian. The checksum covers everything before the
/// trailer. Any length inconsistency returns `false` rather than panicking.
pub fn verify_frame(frame: &[u8]) -> bool {
    if frame.len() < 7 {
        return false;
    }

    let payload_len = frame[4] as usize;
    let checksum_pos = 5 + payload_len;

    if frame.len() < checksum_pos + 2 {
        return false;
    }

    let received = u16::from_be_bytes([frame[checksum_pos], frame[checksum_pos + 1]]);
    let expected = frame[..checksum_pos].iter().checksum();

    received == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_complement_of_sum() {
        assert_eq!([].iter().checksum(), 0xffff);
        assert_eq!([0x01u8].iter().checksum(), !1u16);
        assert_eq!([0xffu8, 0xff, 0xff].iter().checksum(), !(3 * 0xff_u16));
    }

    #[test]
    fn checksum_sum_wraps_at_16_bits() {
        // 300 * 0xff = 76500, which overflows u16
        let data = vec![0xffu8; 300];
        let sum = (300u32 * 0xff % 0x1_0000) as u16;
        assert_eq!(data.iter().checksum(), !sum);
    }

    #[test]
    fn verify_accepts_well_formed_frame() {
        // cmd=02 addr=000000 len=04 payload=10 02 00 a0
        let mut frame = vec![0x02, 0x00, 0x00, 0x00, 0x04, 0x10, 0x02, 0x00, 0xa0];
        let sum = frame.iter().checksum();
        frame.extend_from_slice(&sum.to_be_bytes());
        assert!(verify_frame(&frame));
    }

    #[test]
    fn verify_rejects_corrupted_frame() {
        let mut frame = vec![0x02, 0x00, 0x00, 0x00, 0x04, 0x10, 0x02, 0x00, 0xa0];
        let sum = frame.iter().checksum();
        frame.extend_from_slice(&sum.to_be_bytes());
        frame[6] ^= 0x01;
        assert!(!verify_frame(&frame));
    }

    #[test]
    fn verify_rejects_short_or_inconsistent_lengths() {
        assert!(!verify_frame(&[]));
        assert!(!verify_frame(&[0x00; 6]));
        // declared payload length runs past the end of the buffer
        assert!(!verify_frame(&[0x02, 0x00, 0x00, 0x00, 0x30, 0x00, 0x00]));
    }
}
