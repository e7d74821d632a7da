//! CRC-16/CCITT-FALSE, the checksum variant mandated for EMV-MPM payloads.

/// Computes the checksum over `data`: register initialised to 0xFFFF, polynomial 0x1021, input bytes XOR-ed into the
/// high byte and shifted out MSB-first. No final XOR, no reflection.
pub fn crc16_ccitt_false(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x1021 } else { crc << 1 };
        }
    }
    crc
}

/// The checksum rendered the way it is embedded in the payload: four uppercase hex digits, zero-padded.
pub fn crc16_hex(data: &[u8]) -> String {
    format!("{:04X}", crc16_ccitt_false(data))
}
