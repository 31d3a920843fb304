// Licensed under the Apache-2.0 license

/// Decodes a NUL-terminated (or NUL-padded) string as sent by the uC for log
/// messages and firmware versions.
pub fn decode_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text(b"1.5.2\0\0\0"), "1.5.2");
        assert_eq!(decode_text(b"boot ok"), "boot ok");
        assert_eq!(decode_text(&[]), "");
    }
}
