//! Payload codec: gzip, then single-token base64.

use crate::error::{RecorderError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use std::io::{Read, Write};

/// Compress a payload into a complete gzip stream.
///
/// The header mtime is pinned to zero and no file name is stored, so equal
/// inputs always produce equal bytes.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzBuilder::new()
        .mtime(0)
        .write(Vec::with_capacity(data.len() + 32), Compression::default());
    encoder.write_all(data).map_err(RecorderError::Codec)?;
    encoder.finish().map_err(RecorderError::Codec)
}

/// Inflate a gzip stream produced by [`compress`].
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).map_err(RecorderError::Codec)?;
    Ok(out)
}

/// Encode a payload for the fourth field of a trace line.
///
/// The output never contains `|`, `\r` or `\n`.
pub fn encode_payload(data: &[u8]) -> Result<String> {
    Ok(BASE64.encode(compress(data)?))
}

/// Reverse [`encode_payload`].
pub fn decode_payload(encoded: &str) -> Result<Vec<u8>> {
    let compressed = BASE64
        .decode(encoded.trim())
        .map_err(|e| RecorderError::Parse(format!("invalid base64 payload: {e}")))?;
    decompress(&compressed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_small_payloads() {
        let samples: [&[u8]; 4] = [&[], &[0x01, 0x02, 0x03], &[0xff; 20], b"B0\x11\x22"];
        for sample in samples {
            let encoded = encode_payload(sample).unwrap();
            assert_eq!(decode_payload(&encoded).unwrap(), sample);
        }
    }

    #[test]
    fn test_round_trip_large_payload() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i * 31 % 251) as u8).collect();
        let encoded = encode_payload(&data).unwrap();
        assert_eq!(decode_payload(&encoded).unwrap(), data);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let a = encode_payload(&[1, 2, 3]).unwrap();
        let b = encode_payload(&[1, 2, 3]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_gzip_header_has_no_timestamp() {
        let gz = compress(&[1, 2, 3]).unwrap();
        assert_eq!(&gz[..3], &[0x1f, 0x8b, 0x08]);
        // MTIME occupies bytes 4..8 of the member header.
        assert_eq!(&gz[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_encoded_payload_is_single_token() {
        let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let encoded = encode_payload(&data).unwrap();
        assert!(!encoded.contains('|'));
        assert!(!encoded.contains('\n'));
        assert!(!encoded.contains('\r'));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_payload("not base64!"),
            Err(RecorderError::Parse(_))
        ));
        // Valid base64, not gzip.
        assert!(matches!(
            decode_payload("AQID"),
            Err(RecorderError::Codec(_))
        ));
    }
}
