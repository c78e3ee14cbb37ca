use crate::error::{Error, Result};

/// Trait for typed reads from a process's address space.
///
/// Implementors provide `read_bytes`; the typed accessors decode
/// little-endian values on top of it. Reads are all-or-nothing: a short
/// read is an error, never a truncated buffer.
pub trait ReadMemory {
    /// Read raw bytes from memory at the given address.
    fn read_bytes(&mut self, address: u64, size: usize) -> Result<Vec<u8>>;

    fn read_u8(&mut self, address: u64) -> Result<u8> {
        let bytes = self.read_bytes(address, 1)?;
        Ok(bytes[0])
    }

    fn read_i8(&mut self, address: u64) -> Result<i8> {
        Ok(self.read_u8(address)? as i8)
    }

    fn read_u16(&mut self, address: u64) -> Result<u16> {
        let bytes = self.read_bytes(address, 2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_i16(&mut self, address: u64) -> Result<i16> {
        let bytes = self.read_bytes(address, 2)?;
        Ok(i16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32(&mut self, address: u64) -> Result<u32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_i32(&mut self, address: u64) -> Result<i32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_u64(&mut self, address: u64) -> Result<u64> {
        let bytes = self.read_bytes(address, 8)?;
        Ok(u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    fn read_i64(&mut self, address: u64) -> Result<i64> {
        let bytes = self.read_bytes(address, 8)?;
        Ok(i64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    fn read_f32(&mut self, address: u64) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32(address)?))
    }

    fn read_f64(&mut self, address: u64) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64(address)?))
    }

    /// Read a null-terminated UTF-8 string, scanning at most `max_len` bytes.
    fn read_string_utf8(&mut self, address: u64, max_len: usize) -> Result<String> {
        let bytes = self.read_bytes(address, max_len)?;

        // Cut at the null terminator
        let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let bytes = &bytes[..len];

        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::EncodingError(format!("Failed to decode UTF-8 string: {}", e)))
    }

    /// Read a null-terminated UTF-16LE string, scanning at most `max_chars`
    /// code units.
    fn read_string_utf16(&mut self, address: u64, max_chars: usize) -> Result<String> {
        let bytes = self.read_bytes(address, max_chars * 2)?;

        // Cut at the two-byte null terminator
        let mut end = bytes.len() & !1;
        for offset in (0..end).step_by(2) {
            if bytes[offset] == 0 && bytes[offset + 1] == 0 {
                end = offset;
                break;
            }
        }

        let (decoded, _, had_errors) = encoding_rs::UTF_16LE.decode(&bytes[..end]);
        if had_errors {
            return Err(Error::EncodingError(
                "Failed to decode UTF-16 string".to_string(),
            ));
        }

        Ok(decoded.into_owned())
    }
}

/// Trait for typed writes into a process's address space.
///
/// Mirror of `ReadMemory`: implementors provide `write_bytes`, the typed
/// writers encode little-endian values on top of it.
pub trait WriteMemory {
    /// Write raw bytes into memory at the given address.
    fn write_bytes(&mut self, address: u64, data: &[u8]) -> Result<()>;

    fn write_u8(&mut self, address: u64, value: u8) -> Result<()> {
        self.write_bytes(address, &[value])
    }

    fn write_i8(&mut self, address: u64, value: i8) -> Result<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }

    fn write_u16(&mut self, address: u64, value: u16) -> Result<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }

    fn write_i16(&mut self, address: u64, value: i16) -> Result<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }

    fn write_u32(&mut self, address: u64, value: u32) -> Result<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }

    fn write_i32(&mut self, address: u64, value: i32) -> Result<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }

    fn write_u64(&mut self, address: u64, value: u64) -> Result<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }

    fn write_i64(&mut self, address: u64, value: i64) -> Result<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }

    fn write_f32(&mut self, address: u64, value: f32) -> Result<()> {
        self.write_u32(address, value.to_bits())
    }

    fn write_f64(&mut self, address: u64, value: f64) -> Result<()> {
        self.write_u64(address, value.to_bits())
    }
}
