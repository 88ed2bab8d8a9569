//! Hand-rolled protobuf writer for the `get_transcript` request params.
//!
//! The endpoint has no published schema. The layout below is what the web
//! client sends when the transcript panel is opened:
//!
//! ```text
//! inner  = { 1: "asr", 2: <language>, 3: "" }
//! outer  = { 1: <video id>, 2: pct(b64(inner)), 3: 1,
//!            5: "engagement-panel-searchable-transcript-search-panel", 6: 1, 7: 1 }
//! params = b64(outer)
//! ```

use crate::video_id::VideoId;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

pub const TRANSCRIPT_PANEL: &str = "engagement-panel-searchable-transcript-search-panel";

/// Track kind for auto-generated (speech recognition) captions.
const ASR_KIND: &str = "asr";

const WIRE_VARINT: u8 = 0;
const WIRE_LEN: u8 = 2;

/// Appends `value` as a base-128 varint.
pub fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    while value > 0x7F {
        out.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

#[derive(Debug, Default)]
pub struct ProtoWriter {
    buf: Vec<u8>,
}

impl ProtoWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_tag(&mut self, field: u32, wire_type: u8) {
        encode_varint(((field as u64) << 3) | wire_type as u64, &mut self.buf);
    }

    /// Length-delimited field. Empty values are still written.
    pub fn write_bytes(&mut self, field: u32, value: &[u8]) {
        self.write_tag(field, WIRE_LEN);
        encode_varint(value.len() as u64, &mut self.buf);
        self.buf.extend_from_slice(value);
    }

    pub fn write_string(&mut self, field: u32, value: &str) {
        self.write_bytes(field, value.as_bytes());
    }

    pub fn write_varint_field(&mut self, field: u32, value: u64) {
        self.write_tag(field, WIRE_VARINT);
        encode_varint(value, &mut self.buf);
    }

    /// A `true` flag: tag followed by varint 1.
    pub fn write_flag(&mut self, field: u32) {
        self.write_varint_field(field, 1);
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Everything that goes into one `get_transcript` call's params.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRequest {
    pub video_id: VideoId,
    pub language: String,
    pub panel: &'static str,
}

impl TranscriptRequest {
    pub fn new(video_id: VideoId, language: impl Into<String>) -> Self {
        Self {
            video_id,
            language: language.into(),
            panel: TRANSCRIPT_PANEL,
        }
    }

    fn inner_message(&self) -> Vec<u8> {
        let mut inner = ProtoWriter::new();
        inner.write_string(1, ASR_KIND);
        inner.write_string(2, &self.language);
        inner.write_string(3, "");
        inner.finish()
    }

    /// Raw outer message bytes, before the final base64 step.
    pub fn outer_message(&self) -> Vec<u8> {
        let inner = STANDARD.encode(self.inner_message());
        let inner = urlencoding::encode(&inner);

        let mut outer = ProtoWriter::new();
        outer.write_string(1, self.video_id.as_str());
        outer.write_string(2, &inner);
        outer.write_flag(3);
        outer.write_string(5, self.panel);
        outer.write_flag(6);
        outer.write_flag(7);
        outer.finish()
    }

    /// The `params` value of the request body.
    pub fn encode_params(&self) -> String {
        STANDARD.encode(self.outer_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_varint(bytes: &[u8]) -> (u64, usize) {
        let mut value = 0u64;
        let mut shift = 0;
        for (i, byte) in bytes.iter().enumerate() {
            value |= ((byte & 0x7F) as u64) << shift;
            if byte & 0x80 == 0 {
                return (value, i + 1);
            }
            shift += 7;
        }
        panic!("truncated varint");
    }

    fn request(lang: &str) -> TranscriptRequest {
        TranscriptRequest::new(VideoId::parse("dQw4w9WgXcQ").unwrap(), lang)
    }

    #[test]
    fn test_varint_round_trip() {
        for (n, len) in [
            (0u64, 1usize),
            (1, 1),
            (127, 1),
            (128, 2),
            (16_383, 2),
            (16_384, 3),
            (2_097_151, 3),
            (2_097_152, 4),
        ] {
            let mut out = Vec::new();
            encode_varint(n, &mut out);
            assert_eq!(out.len(), len, "n = {n}");
            assert_eq!(decode_varint(&out), (n, len), "n = {n}");
        }
    }

    #[test]
    fn test_varint_known_bytes() {
        let mut out = Vec::new();
        encode_varint(300, &mut out);
        assert_eq!(out, vec![0xAC, 0x02]);
    }

    #[test]
    fn test_long_string_uses_multibyte_length() {
        let value = "x".repeat(200);
        let mut writer = ProtoWriter::new();
        writer.write_string(1, &value);
        let bytes = writer.finish();
        assert_eq!(&bytes[..3], &[0x0A, 0xC8, 0x01]);
        assert_eq!(bytes.len(), 3 + 200);
    }

    #[test]
    fn test_inner_message_bytes() {
        let inner = request("en").inner_message();
        assert_eq!(
            inner,
            vec![0x0A, 0x03, b'a', b's', b'r', 0x12, 0x02, b'e', b'n', 0x1A, 0x00]
        );
        assert_eq!(STANDARD.encode(&inner), "CgNhc3ISAmVuGgA=");
    }

    #[test]
    fn test_outer_message_layout() {
        let outer = request("en").outer_message();

        let mut expected = vec![0x0A, 0x0B];
        expected.extend_from_slice(b"dQw4w9WgXcQ");
        expected.extend_from_slice(&[0x12, 0x12]);
        expected.extend_from_slice(b"CgNhc3ISAmVuGgA%3D");
        expected.extend_from_slice(&[0x18, 0x01, 0x2A, 0x33]);
        expected.extend_from_slice(TRANSCRIPT_PANEL.as_bytes());
        expected.extend_from_slice(&[0x30, 0x01, 0x38, 0x01]);

        assert_eq!(outer, expected);
    }

    #[test]
    fn test_params_are_deterministic() {
        let a = request("en").encode_params();
        let b = request("en").encode_params();
        assert_eq!(a, b);
        assert_ne!(a, request("fr").encode_params());
        assert_eq!(STANDARD.decode(&a).unwrap(), request("en").outer_message());
    }
}
