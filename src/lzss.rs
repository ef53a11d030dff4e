//! Sliding-window literal/match coder, parameterized at compile time by
//! window-bits `W` and lookahead-bits `L`.
//!
//! The const generics stand in for what the reference design calls
//! `STD_OPTIONS`: rather than a runtime options struct, the window and
//! lookahead sizes are baked into the type (`Lzss<12, 4>`), so a mismatched
//! encoder/decoder pairing is a type error rather than a runtime one.
//!
//! Per-block flag bytes are always emitted at the block's full capacity
//! (`⌈(BLOCK_DATA_SIZE / 2) / 8⌉` bytes) rather than sized to the number of
//! steps actually taken in that block: the step count depends on how many
//! literal/match decisions fit inside the block, which is exactly the thing
//! decoding would need the byte count to determine. Fixing the flag region
//! to the bitset's full capacity breaks that circularity at a small, bounded
//! padding cost.

use log::{debug, trace};

use crate::bitset::Bitset;
use crate::CodecError;

const BLOCK_DATA_SIZE: usize = 16384;
const BLOCK_FLAG_BITS: usize = BLOCK_DATA_SIZE / 2;
const FLAG_BYTES: usize = (BLOCK_FLAG_BITS + 7) / 8;

pub struct Lzss<const W: usize, const L: usize>;

impl<const W: usize, const L: usize> Lzss<W, L> {
    pub const WINDOW_SIZE: usize = 1 << W;
    pub const LOOKAHEAD_SIZE: usize = 1 << L;
    pub const MIN_MATCH: usize = 3;
    pub const MAX_MATCH: usize = Self::LOOKAHEAD_SIZE - 1;
    pub const MAX_LOOKAHEAD: usize = Self::MIN_MATCH + Self::MAX_MATCH;

    /// Longest match of `src[pos..]` found inside `src[window_start..pos]`,
    /// never reading past `lookahead_end`. Ties favor the earliest (smallest)
    /// start index in the window, per the tie-break rule.
    fn find_match(src: &[u8], pos: usize, window_start: usize, lookahead_end: usize) -> (usize, usize) {
        let max_len = lookahead_end - pos;
        let mut best_len = 0usize;
        let mut best_start = pos;
        for start in window_start..pos {
            let mut len = 0usize;
            while len < max_len && src[start + len] == src[pos + len] {
                len += 1;
            }
            if len > best_len {
                best_len = len;
                best_start = start;
            }
        }
        (best_len, pos - best_start)
    }

    fn encode_block(src: &[u8], block_start: usize, block_end: usize) -> (Vec<u8>, Vec<u8>) {
        let mut flags: Bitset<BLOCK_FLAG_BITS> = Bitset::new();
        let mut tokens = Vec::with_capacity((block_end - block_start) / 2 * 2);
        let mut pos = block_start;
        let mut step = 0usize;

        while pos < block_end {
            let window_start = pos.saturating_sub(Self::WINDOW_SIZE);
            let lookahead_end = (pos + Self::MAX_LOOKAHEAD).min(block_end);
            let (len, offset) = Self::find_match(src, pos, window_start, lookahead_end);

            if len >= Self::MIN_MATCH {
                flags.set(step).expect("step index within block flag capacity");
                let packed = (((len - Self::MIN_MATCH) << W) | (offset - 1)) as u16;
                tokens.extend_from_slice(&packed.to_le_bytes());
                pos += len;
            } else {
                flags.reset(step).expect("step index within block flag capacity");
                let b0 = src[pos];
                let b1 = if pos + 1 < src.len() { src[pos + 1] } else { 0 };
                tokens.push(b0);
                tokens.push(b1);
                pos += if pos + 1 < src.len() { 2 } else { 1 };
            }
            step += 1;
        }

        (flags.to_bytes(), tokens)
    }

    pub fn compress(src: &[u8]) -> Result<Vec<u8>, CodecError> {
        if src.is_empty() {
            debug!("lzss::compress: empty input, emitting empty output");
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        out.extend_from_slice(&(src.len() as u64).to_le_bytes());

        let mut pos = 0usize;
        while pos < src.len() {
            let block_end = (pos + BLOCK_DATA_SIZE).min(src.len());
            let (flag_bytes, token_bytes) = Self::encode_block(src, pos, block_end);
            trace!(
                "lzss::compress: block [{}, {}) -> {} flag bytes, {} token bytes",
                pos,
                block_end,
                flag_bytes.len(),
                token_bytes.len()
            );
            out.extend_from_slice(&flag_bytes);
            out.extend_from_slice(&token_bytes);
            pos = block_end;
        }

        Ok(out)
    }

    fn decode_block(
        flags: &Bitset<BLOCK_FLAG_BITS>,
        tokens: &[u8],
        out: &mut Vec<u8>,
        block_len: usize,
    ) -> Result<usize, CodecError> {
        let mut produced = 0usize;
        let mut step = 0usize;
        let mut token_pos = 0usize;

        while produced < block_len {
            let pair = tokens
                .get(token_pos..token_pos + 2)
                .ok_or_else(|| CodecError::malformed("lzss token stream truncated"))?;
            token_pos += 2;

            let is_match = flags.test(step).map_err(|_| CodecError::invariant("flag step index overflow"))?;
            if is_match {
                let packed = u16::from_le_bytes([pair[0], pair[1]]) as usize;
                let offset = (packed & (Self::WINDOW_SIZE - 1)) + 1;
                let length = (packed >> W) + Self::MIN_MATCH;
                if offset > out.len() {
                    return Err(CodecError::malformed("lzss match offset refers outside emitted output"));
                }
                let start = out.len() - offset;
                for i in 0..length {
                    let b = out[start + i];
                    out.push(b);
                }
                produced += length;
            } else {
                out.push(pair[0]);
                produced += 1;
                if produced < block_len {
                    out.push(pair[1]);
                    produced += 1;
                }
            }
            step += 1;
        }

        Ok(token_pos)
    }

    pub fn decompress(src: &[u8]) -> Result<Vec<u8>, CodecError> {
        if src.is_empty() {
            debug!("lzss::decompress: empty input, emitting empty output");
            return Ok(Vec::new());
        }

        if src.len() < 8 {
            return Err(CodecError::malformed("lzss header truncated"));
        }
        let data_size = u64::from_le_bytes(src[0..8].try_into().unwrap()) as usize;

        let mut out = Vec::with_capacity(data_size);
        let mut cursor = 8usize;

        while out.len() < data_size {
            let block_len = (data_size - out.len()).min(BLOCK_DATA_SIZE);
            let flag_bytes = src
                .get(cursor..cursor + FLAG_BYTES)
                .ok_or_else(|| CodecError::malformed("lzss flag region truncated"))?;
            cursor += FLAG_BYTES;
            let flags: Bitset<BLOCK_FLAG_BITS> = Bitset::from_bytes(flag_bytes);

            let consumed = Self::decode_block(&flags, &src[cursor..], &mut out, block_len)?;
            cursor += consumed;
        }

        if out.len() != data_size {
            return Err(CodecError::malformed("lzss produced wrong output size"));
        }

        Ok(out)
    }

    pub fn compress_file(in_path: &std::path::Path, out_path: &std::path::Path) -> Result<(), crate::DynErr> {
        let data = std::fs::read(in_path)?;
        let compressed = Self::compress(&data)?;
        std::fs::write(out_path, compressed)?;
        Ok(())
    }

    pub fn decompress_file(in_path: &std::path::Path, out_path: &std::path::Path) -> Result<(), crate::DynErr> {
        let data = std::fs::read(in_path)?;
        let expanded = Self::decompress(&data)?;
        std::fs::write(out_path, expanded)?;
        Ok(())
    }
}

/// Default instantiation exposed as the crate's `STD_OPTIONS`-equivalent:
/// a 4 KiB window (`W = 12`) with a 16-byte lookahead (`L = 4`).
pub type StdLzss = Lzss<12, 4>;

pub fn compress(src: &[u8]) -> Result<Vec<u8>, CodecError> {
    StdLzss::compress(src)
}

pub fn decompress(src: &[u8]) -> Result<Vec<u8>, CodecError> {
    StdLzss::decompress(src)
}

pub fn compress_file(in_path: &std::path::Path, out_path: &std::path::Path) -> Result<(), crate::DynErr> {
    StdLzss::compress_file(in_path, out_path)
}

pub fn decompress_file(in_path: &std::path::Path, out_path: &std::path::Path) -> Result<(), crate::DynErr> {
    StdLzss::decompress_file(in_path, out_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_repetitive_text() {
        let src = b"abababababababababababababab and then something new new new new".to_vec();
        let compressed = StdLzss::compress(&src).unwrap();
        let back = StdLzss::decompress(&compressed).unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn roundtrip_random_bytes_falls_back_to_literals() {
        let src: Vec<u8> = (0..500u32).map(|i| (i.wrapping_mul(2654435761) >> 24) as u8).collect();
        let compressed = StdLzss::compress(&src).unwrap();
        let back = StdLzss::decompress(&compressed).unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn empty_input_roundtrips_to_empty() {
        let compressed = StdLzss::compress(&[]).unwrap();
        assert!(compressed.is_empty());
        let back = StdLzss::decompress(&compressed).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn odd_length_tail_roundtrips() {
        let src = b"an odd number of bytes here!".to_vec();
        assert_eq!(src.len() % 2, 1);
        let compressed = StdLzss::compress(&src).unwrap();
        let back = StdLzss::decompress(&compressed).unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn overlapping_match_copies_byte_by_byte() {
        // "aaaa..." forces an overlap-copy (offset < length) once the window fills.
        let src = vec![b'a'; 64];
        let compressed = StdLzss::compress(&src).unwrap();
        let back = StdLzss::decompress(&compressed).unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn multi_block_input_roundtrips() {
        let mut src = Vec::new();
        for i in 0..40_000u32 {
            src.push((i % 251) as u8);
        }
        let compressed = StdLzss::compress(&src).unwrap();
        let back = StdLzss::decompress(&compressed).unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn bad_offset_is_malformed_input() {
        // A match token claiming to reach behind the start of output.
        let data_size: u32 = 10;
        let mut bogus = Vec::new();
        bogus.extend_from_slice(&(data_size as u64).to_le_bytes());
        let flags: Bitset<BLOCK_FLAG_BITS> = {
            let mut f = Bitset::new();
            f.set(0).unwrap();
            f
        };
        bogus.extend_from_slice(&flags.to_bytes());
        let packed: u16 = ((5u16) << 12) | 0; // offset field 0 => offset 1, but output is empty
        bogus.extend_from_slice(&packed.to_le_bytes());
        let err = StdLzss::decompress(&bogus);
        // offset 1 > out.len() (0) on the very first match
        assert!(err.is_err());
    }
}
