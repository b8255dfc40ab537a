// src/extract/decode.rs
// Incremental text decoding for body chunks.
//
// Network chunks can end in the middle of a multi-byte character. The
// encoding_rs decoder keeps the partial sequence and finishes it on the next
// chunk, so the tokenizer only ever sees complete characters.

use encoding_rs::{Decoder, Encoding};

pub struct ChunkDecoder {
    decoder: Decoder,
}

impl ChunkDecoder {
    /// A byte-order mark at the start of the body overrides `encoding`.
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            decoder: encoding.new_decoder(),
        }
    }

    /// Decodes one chunk. Pass `last = true` once the body has ended to flush
    /// any dangling partial sequence (it becomes U+FFFD).
    pub fn decode(&mut self, bytes: &[u8], last: bool) -> String {
        let capacity = self
            .decoder
            .max_utf8_buffer_length(bytes.len())
            .unwrap_or(bytes.len() * 3 + 4);
        let mut text = String::with_capacity(capacity);

        // With max_utf8_buffer_length reserved the output never fills up.
        let _ = self.decoder.decode_to_string(bytes, &mut text, last);
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1252};

    #[test]
    fn test_split_multibyte_sequence() {
        let bytes = "café".as_bytes();
        let (head, tail) = bytes.split_at(bytes.len() - 1);

        let mut decoder = ChunkDecoder::new(UTF_8);
        let mut text = decoder.decode(head, false);
        text.push_str(&decoder.decode(tail, false));
        text.push_str(&decoder.decode(&[], true));

        assert_eq!(text, "café");
    }

    #[test]
    fn test_declared_encoding() {
        let mut decoder = ChunkDecoder::new(WINDOWS_1252);
        assert_eq!(decoder.decode(&[0x63, 0x61, 0x66, 0xE9], true), "café");
    }

    #[test]
    fn test_bom_overrides_declared_encoding() {
        let mut decoder = ChunkDecoder::new(WINDOWS_1252);
        let bytes = [0xEF, 0xBB, 0xBF, 0x63, 0x61, 0x66, 0xC3, 0xA9];
        assert_eq!(decoder.decode(&bytes, true), "café");
    }

    #[test]
    fn test_truncated_sequence_at_end() {
        let mut decoder = ChunkDecoder::new(UTF_8);
        assert_eq!(decoder.decode(&[0x61, 0xC3], true), "a\u{FFFD}");
    }
}
