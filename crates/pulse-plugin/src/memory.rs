//! Helpers for reading guest linear memory.
//!
//! They operate on the byte slice returned by `Memory::data`, so every range
//! is bounds-checked against the current memory size before use.

use anyhow::{anyhow, Result};

/// Borrow `[ptr, ptr + len)` from guest memory.
pub fn read_bytes(data: &[u8], ptr: u32, len: u32) -> Result<&[u8]> {
    let start = ptr as usize;
    let end = start
        .checked_add(len as usize)
        .ok_or_else(|| anyhow!("Pointer/Length overflow: ptr={}, len={}", ptr, len))?;

    data.get(start..end).ok_or_else(|| {
        anyhow!(
            "Pointer/Length out of bounds: ptr={}, len={}, memory_size={}",
            ptr,
            len,
            data.len()
        )
    })
}

/// Reads the `[ptr: u32, len: u32]` little-endian pair a guest returns for
/// a moved buffer.
pub fn read_return_area(data: &[u8], area: u32) -> Result<(u32, u32)> {
    let raw = read_bytes(data, area, 8)?;
    let ptr = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
    let len = u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]);
    Ok((ptr, len))
}

/// Decodes a guest log line, keeping at most `max_len` bytes.
///
/// Truncation never splits a UTF-8 sequence. Returns the text and whether it
/// was shortened.
pub fn decode_log_text(bytes: &[u8], max_len: usize) -> Result<(String, bool)> {
    let truncated = bytes.len() > max_len;
    let bytes = &bytes[..bytes.len().min(max_len)];

    match std::str::from_utf8(bytes) {
        Ok(text) => Ok((text.to_string(), truncated)),
        // 截断落在多字节字符中间：保留完整部分
        Err(e) if truncated && e.error_len().is_none() => {
            let valid = &bytes[..e.valid_up_to()];
            Ok((String::from_utf8_lossy(valid).into_owned(), true))
        }
        Err(e) => Err(anyhow!("Invalid UTF-8 in plugin log (len={}): {}", bytes.len(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bytes_in_bounds() {
        let data = b"....hello....";
        assert_eq!(read_bytes(data, 4, 5).unwrap(), b"hello");
        assert_eq!(read_bytes(data, 13, 0).unwrap(), b"");
    }

    #[test]
    fn test_read_bytes_out_of_bounds() {
        let data = [0u8; 16];
        assert!(read_bytes(&data, 10, 10).is_err());
        assert!(read_bytes(&data, u32::MAX, 2).is_err());
    }

    #[test]
    fn test_read_return_area() {
        let mut data = vec![0u8; 16];
        data[8..12].copy_from_slice(&64u32.to_le_bytes());
        data[12..16].copy_from_slice(&4u32.to_le_bytes());

        assert_eq!(read_return_area(&data, 8).unwrap(), (64, 4));
        assert!(read_return_area(&data, 12).is_err());
    }

    #[test]
    fn test_decode_log_text() {
        let (text, truncated) = decode_log_text(b"Enabled!", 4096).unwrap();
        assert_eq!(text, "Enabled!");
        assert!(!truncated);

        let (text, truncated) = decode_log_text(b"Enabled!", 4).unwrap();
        assert_eq!(text, "Enab");
        assert!(truncated);
    }

    #[test]
    fn test_truncation_respects_char_boundary() {
        // "日志" 每个字符 3 字节，截断到 4 字节只保留第一个字符
        let (text, truncated) = decode_log_text("日志".as_bytes(), 4).unwrap();
        assert_eq!(text, "日");
        assert!(truncated);
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        assert!(decode_log_text(&[0x66, 0xff, 0x66], 4096).is_err());
    }
}
