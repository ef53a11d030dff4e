//! A 64-bit range-variant Asymmetric Numeral System entropy coder.
//!
//! Frequencies are scaled into a fixed `TOTAL_FREQ` denominator using exact
//! `i128` cross-multiplication rather than floating point, so the "largest
//! rounding error" comparisons used to repair the scaled table are free of
//! precision loss. The scaling pass as described only ever *increments*
//! deficit symbols; forcing a zero-rounded nonzero-raw-frequency symbol up
//! to 1 can push the running sum above `TOTAL_FREQ`, so a symmetric
//! decrement loop is added to repair overshoot the same way.
//!
//! Finalization always emits both halves of the 64-bit state (`state as
//! u32` then `(state >> 32) as u32`) rather than conditionally omitting an
//! all-zero high half. That keeps the state-word stream's length fixed
//! relative to the symbol count, so the decoder can locate the terminator
//! and the two finalize words from the end of the buffer instead of
//! scanning forward for an ambiguous zero sentinel that could otherwise
//! collide with a legitimately zero high half.

use log::{debug, trace};

use crate::cursor::InputCursor;
use crate::CodecError;

const TOTAL_FREQ: u32 = 65536;
const INIT_STATE: u64 = 1 << 31;
const RENORM_THRESHOLD: u64 = 1 << 63;

fn scale_frequencies(raw: &[u32; 256], total_raw: u64) -> [u32; 256] {
    let mut scaled = [0u32; 256];
    for s in 0..256 {
        if raw[s] > 0 {
            let v = (raw[s] as u128 * TOTAL_FREQ as u128 / total_raw as u128) as u32;
            scaled[s] = v.max(1);
        }
    }

    let error = |s: usize, scaled: &[u32; 256]| -> i128 {
        raw[s] as i128 * TOTAL_FREQ as i128 - scaled[s] as i128 * total_raw as i128
    };

    let mut sum: i64 = scaled.iter().map(|&x| x as i64).sum();
    let target = TOTAL_FREQ as i64;

    while sum < target {
        let best = (0..256)
            .filter(|&s| raw[s] > 0)
            .max_by_key(|&s| error(s, &scaled))
            .expect("nonempty alphabet has a symbol to repair");
        scaled[best] += 1;
        sum += 1;
    }
    while sum > target {
        let best = (0..256)
            .filter(|&s| raw[s] > 0 && scaled[s] > 1)
            .min_by_key(|&s| error(s, &scaled))
            .expect("overshoot repair must find a decrementable symbol");
        scaled[best] -= 1;
        sum -= 1;
    }

    debug_assert_eq!(scaled.iter().map(|&x| x as i64).sum::<i64>(), target);
    scaled
}

fn cumulative(scaled: &[u32; 256]) -> [u32; 257] {
    let mut cum = [0u32; 257];
    for s in 0..256 {
        cum[s + 1] = cum[s] + scaled[s];
    }
    cum
}

pub fn compress(src: &[u8]) -> Result<Vec<u8>, CodecError> {
    if src.is_empty() {
        debug!("rans::compress: empty input, emitting empty output");
        return Ok(Vec::new());
    }

    let mut raw = [0u32; 256];
    for &b in src {
        raw[b as usize] += 1;
    }
    let total_raw: u64 = raw.iter().map(|&x| x as u64).sum();

    let min_sym = raw.iter().position(|&x| x > 0).expect("non-empty input has a nonzero frequency") as u8;
    let max_sym = 255 - raw.iter().rev().position(|&x| x > 0).expect("same as above") as u8;

    let scaled = scale_frequencies(&raw, total_raw);
    if scaled.iter().map(|&x| x as i64).sum::<i64>() != TOTAL_FREQ as i64 {
        return Err(CodecError::invariant("scaled frequencies do not sum to TOTAL_FREQ"));
    }
    let cum = cumulative(&scaled);

    let mut state: u64 = INIT_STATE;
    let mut words: Vec<u32> = Vec::new();

    for &b in src.iter().rev() {
        let s = b as usize;
        let f = scaled[s] as u64;
        let c = cum[s] as u64;
        let thresh = (RENORM_THRESHOLD / TOTAL_FREQ as u64) * f;
        while state >= thresh {
            words.push((state & 0xFFFF_FFFF) as u32);
            state >>= 32;
        }
        state = (state / f) * TOTAL_FREQ as u64 + c + (state % f);
    }
    words.push((state & 0xFFFF_FFFF) as u32);
    words.push((state >> 32) as u32);
    words.push(0u32);

    trace!(
        "rans::compress: {} symbols, alphabet [{},{}], {} state words",
        src.len(),
        min_sym,
        max_sym,
        words.len()
    );

    let mut out = Vec::new();
    out.push(min_sym);
    out.push(max_sym);
    for s in min_sym..=max_sym {
        out.extend_from_slice(&(scaled[s as usize] as u16).to_le_bytes());
    }
    out.extend_from_slice(&(src.len() as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    for w in &words {
        out.extend_from_slice(&w.to_le_bytes());
    }

    Ok(out)
}

pub fn decompress(src: &[u8]) -> Result<Vec<u8>, CodecError> {
    if src.is_empty() {
        debug!("rans::decompress: empty input, emitting empty output");
        return Ok(Vec::new());
    }

    let mut cur = InputCursor::from_slice(src);
    let min_sym = cur.try_read_u8().ok_or_else(|| CodecError::malformed("truncated rans header"))?;
    let max_sym = cur.try_read_u8().ok_or_else(|| CodecError::malformed("truncated rans header"))?;
    if min_sym > max_sym {
        return Err(CodecError::malformed("rans header has min_sym > max_sym"));
    }

    let mut scaled = [0u32; 256];
    for s in min_sym..=max_sym {
        let v = cur.try_read_u16_le().ok_or_else(|| CodecError::malformed("truncated rans frequency table"))?;
        scaled[s as usize] = v as u32;
    }
    let cum = cumulative(&scaled);

    let data_size = cur.try_read_u32_le().ok_or_else(|| CodecError::malformed("truncated rans header"))? as usize;
    let _compressed_size_placeholder = cur.try_read_u32_le().ok_or_else(|| CodecError::malformed("truncated rans header"))?;

    let rest = &src[cur.position()..];
    if rest.len() % 4 != 0 || rest.len() < 12 {
        return Err(CodecError::malformed("rans state-word stream has invalid length"));
    }
    let mut words: Vec<u32> = rest.chunks_exact(4).map(|c| u32::from_le_bytes(c.try_into().unwrap())).collect();

    let terminator = words.pop().expect("checked length above");
    if terminator != 0 {
        return Err(CodecError::malformed("rans stream missing zero terminator"));
    }
    let high32 = words.pop().expect("checked length above") as u64;
    let low32 = words.pop().expect("checked length above") as u64;
    let mut state = (high32 << 32) | low32;
    let mut renorm_words = words;

    let mut out = Vec::with_capacity(data_size);
    for _ in 0..data_size {
        let slot = (state % TOTAL_FREQ as u64) as u32;
        let mut sym = None;
        for s in min_sym..=max_sym {
            let lo = cum[s as usize];
            let hi = lo + scaled[s as usize];
            if slot >= lo && slot < hi {
                sym = Some(s);
                break;
            }
        }
        let sym = sym.ok_or_else(|| CodecError::malformed("rans slot does not fall within any symbol's interval"))?;
        out.push(sym);

        let f = scaled[sym as usize] as u64;
        let c = cum[sym as usize] as u64;
        state = (state / TOTAL_FREQ as u64) * f + slot as u64 - c;

        while state < INIT_STATE {
            let w = renorm_words
                .pop()
                .ok_or_else(|| CodecError::malformed("rans state underflow before input exhausted"))?;
            state = (state << 32) | w as u64;
        }
    }

    Ok(out)
}

pub fn compress_file(in_path: &std::path::Path, out_path: &std::path::Path) -> Result<(), crate::DynErr> {
    let data = std::fs::read(in_path)?;
    let compressed = compress(&data)?;
    std::fs::write(out_path, compressed)?;
    Ok(())
}

pub fn decompress_file(in_path: &std::path::Path, out_path: &std::path::Path) -> Result<(), crate::DynErr> {
    let data = std::fs::read(in_path)?;
    let expanded = decompress(&data)?;
    std::fs::write(out_path, expanded)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_text() {
        let src = b"the quick brown fox jumps over the lazy dog, again and again and again";
        let compressed = compress(src).unwrap();
        let back = decompress(&compressed).unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn empty_input_roundtrips_to_empty() {
        let compressed = compress(&[]).unwrap();
        assert!(compressed.is_empty());
        let back = decompress(&compressed).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn single_symbol() {
        let src = vec![b'z'; 5000];
        let compressed = compress(&src).unwrap();
        let back = decompress(&compressed).unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn skewed_distribution_forces_overshoot_repair() {
        // One dominant symbol plus many rare ones forces several
        // zero-rounded frequencies to be bumped to 1, which can push the
        // scaled sum above TOTAL_FREQ and exercise the decrement repair.
        let mut src = vec![b'a'; 4000];
        for s in 0u8..=200 {
            src.push(s);
        }
        let compressed = compress(&src).unwrap();
        let back = decompress(&compressed).unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn full_alphabet_roundtrips() {
        let src: Vec<u8> = (0..=255u8).cycle().take(8000).collect();
        let compressed = compress(&src).unwrap();
        let back = decompress(&compressed).unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn missing_terminator_is_malformed() {
        let mut bogus = vec![0u8, 0u8]; // min_sym=0,max_sym=0
        bogus.extend_from_slice(&1u16.to_le_bytes()); // scaled[0] must be TOTAL_FREQ but we lie
        bogus.extend_from_slice(&1u32.to_le_bytes()); // data_size
        bogus.extend_from_slice(&0u32.to_le_bytes()); // compressed size placeholder
        bogus.extend_from_slice(&1u32.to_le_bytes()); // nonzero "terminator"
        assert!(decompress(&bogus).is_err());
    }
}
