//! Forward-cursored reader/writer pair over a byte buffer or view.
//!
//! `InputCursor` can be attached either to an owning [`ByteBuffer`] or to a
//! borrowed [`ByteView`]; `Source` is the internal enum that distinguishes
//! the two so a single cursor type serves both. `OutputCursor` always holds
//! a mutable buffer reference directly -- an output cursor never targets a
//! read-only view. Both carry a lifetime so the borrow checker enforces
//! "cursor cannot outlive its buffer" instead of leaving it as a convention.
//!
//! Every fixed-width numeric type gets four read-side primitives
//! (`read_T`/`peek_T`/`skip_T`/`try_read_T`, plus `try_peek_T`/`try_skip_T`)
//! and two write-side primitives (`write_T`/`try_write_T`). These are
//! generated with a macro since the twelve numeric types are otherwise
//! identical boilerplate; `bool` is hand-written since it is stored as a
//! single byte rather than via `to_ne_bytes`.

use crate::byte_buffer::{ByteBuffer, ByteView};

enum Source<'a> {
    Owned(&'a ByteBuffer),
    View(ByteView<'a>),
}

impl<'a> Source<'a> {
    fn data(&self) -> &'a [u8] {
        match self {
            Source::Owned(b) => b.data(),
            Source::View(v) => v.data(),
        }
    }
}

pub struct InputCursor<'a> {
    source: Source<'a>,
    p: usize,
}

impl<'a> InputCursor<'a> {
    pub fn from_buffer(buf: &'a ByteBuffer) -> Self {
        Self { source: Source::Owned(buf), p: 0 }
    }

    pub fn from_view(view: ByteView<'a>) -> Self {
        Self { source: Source::View(view), p: 0 }
    }

    pub fn from_slice(data: &'a [u8]) -> Self {
        Self { source: Source::View(ByteView::new(data)), p: 0 }
    }

    pub fn position(&self) -> usize {
        self.p
    }

    pub fn size(&self) -> usize {
        self.source.data().len()
    }

    pub fn remaining(&self) -> usize {
        self.size() - self.p
    }

    pub fn seek_to_begin(&mut self) {
        self.p = 0;
    }

    pub fn seek_to_end(&mut self) {
        self.p = self.size();
    }

    /// A seek past the end clamps to `size` rather than erroring.
    pub fn seek_to(&mut self, pos: usize) {
        self.p = pos.min(self.size());
    }

    pub fn skip(&mut self, n: usize) {
        self.p = (self.p + n).min(self.size());
    }

    pub fn rewind(&mut self, n: usize) {
        self.p = self.p.saturating_sub(n);
    }

    fn bytes_at(&self, pos: usize, len: usize) -> Option<&'a [u8]> {
        let data = self.source.data();
        if pos + len <= data.len() {
            Some(&data[pos..pos + len])
        } else {
            None
        }
    }

    /// Unchecked byte read: precondition `p + n <= size`, panics otherwise.
    pub fn read_bytes(&mut self, n: usize) -> &'a [u8] {
        let out = self.bytes_at(self.p, n).expect("read_bytes: out of bounds");
        self.p += n;
        out
    }

    pub fn try_read_bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        let out = self.bytes_at(self.p, n)?;
        self.p += n;
        Some(out)
    }

    pub fn read_bool(&mut self) -> bool {
        self.read_bytes(1)[0] != 0
    }

    pub fn peek_bool(&self) -> bool {
        self.bytes_at(self.p, 1).expect("peek_bool: out of bounds")[0] != 0
    }

    pub fn skip_bool(&mut self) {
        self.skip(1);
    }

    pub fn try_read_bool(&mut self) -> Option<bool> {
        self.try_read_bytes(1).map(|b| b[0] != 0)
    }
}

macro_rules! cursor_numeric {
    ($ty:ty, $read:ident, $peek:ident, $skip:ident, $try_read:ident, $try_peek:ident, $try_skip:ident, $read_le:ident, $write:ident, $try_write:ident, $write_le:ident) => {
        impl<'a> InputCursor<'a> {
            /// Unchecked, native-endian read. Panics if out of bounds.
            pub fn $read(&mut self) -> $ty {
                let n = std::mem::size_of::<$ty>();
                let bytes = self.bytes_at(self.p, n).expect("read: out of bounds");
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                buf.copy_from_slice(bytes);
                self.p += n;
                <$ty>::from_ne_bytes(buf)
            }

            /// Unchecked, native-endian peek. Does not advance `p`.
            pub fn $peek(&self) -> $ty {
                let n = std::mem::size_of::<$ty>();
                let bytes = self.bytes_at(self.p, n).expect("peek: out of bounds");
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                buf.copy_from_slice(bytes);
                <$ty>::from_ne_bytes(buf)
            }

            pub fn $skip(&mut self) {
                self.skip(std::mem::size_of::<$ty>());
            }

            /// Checked read; returns `None` and leaves `p` unmoved on overflow.
            pub fn $try_read(&mut self) -> Option<$ty> {
                let n = std::mem::size_of::<$ty>();
                let bytes = self.bytes_at(self.p, n)?;
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                buf.copy_from_slice(bytes);
                self.p += n;
                Some(<$ty>::from_ne_bytes(buf))
            }

            pub fn $try_peek(&self) -> Option<$ty> {
                let n = std::mem::size_of::<$ty>();
                let bytes = self.bytes_at(self.p, n)?;
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                buf.copy_from_slice(bytes);
                Some(<$ty>::from_ne_bytes(buf))
            }

            pub fn $try_skip(&mut self) -> bool {
                let n = std::mem::size_of::<$ty>();
                if self.p + n <= self.size() {
                    self.p += n;
                    true
                } else {
                    false
                }
            }

            /// External-format boundary helper: little-endian regardless of host.
            pub fn $read_le(&mut self) -> $ty {
                let n = std::mem::size_of::<$ty>();
                let bytes = self.bytes_at(self.p, n).expect("read_le: out of bounds");
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                buf.copy_from_slice(bytes);
                self.p += n;
                <$ty>::from_le_bytes(buf)
            }
        }

        impl<'a> OutputCursor<'a> {
            /// Unchecked, native-endian write. Panics if `p + size > capacity`,
            /// mirroring the unchecked native-endian `read_T`.
            pub fn $write(&mut self, v: $ty) {
                self.write_bytes(&v.to_ne_bytes());
            }

            /// Checked, native-endian write; growing variant (always succeeds).
            pub fn $try_write(&mut self, v: $ty) -> bool {
                self.try_write_bytes(&v.to_ne_bytes())
            }

            /// Unchecked write; external-format boundary helper, little-endian
            /// regardless of host.
            pub fn $write_le(&mut self, v: $ty) {
                self.write_bytes(&v.to_le_bytes());
            }
        }
    };
}

cursor_numeric!(u8, read_u8, peek_u8, skip_u8, try_read_u8, try_peek_u8, try_skip_u8, read_u8_le, write_u8, try_write_u8, write_u8_le);
cursor_numeric!(i8, read_i8, peek_i8, skip_i8, try_read_i8, try_peek_i8, try_skip_i8, read_i8_le, write_i8, try_write_i8, write_i8_le);
cursor_numeric!(u16, read_u16, peek_u16, skip_u16, try_read_u16, try_peek_u16, try_skip_u16, read_u16_le, write_u16, try_write_u16, write_u16_le);
cursor_numeric!(i16, read_i16, peek_i16, skip_i16, try_read_i16, try_peek_i16, try_skip_i16, read_i16_le, write_i16, try_write_i16, write_i16_le);
cursor_numeric!(u32, read_u32, peek_u32, skip_u32, try_read_u32, try_peek_u32, try_skip_u32, read_u32_le, write_u32, try_write_u32, write_u32_le);
cursor_numeric!(i32, read_i32, peek_i32, skip_i32, try_read_i32, try_peek_i32, try_skip_i32, read_i32_le, write_i32, try_write_i32, write_i32_le);
cursor_numeric!(u64, read_u64, peek_u64, skip_u64, try_read_u64, try_peek_u64, try_skip_u64, read_u64_le, write_u64, try_write_u64, write_u64_le);
cursor_numeric!(i64, read_i64, peek_i64, skip_i64, try_read_i64, try_peek_i64, try_skip_i64, read_i64_le, write_i64, try_write_i64, write_i64_le);
cursor_numeric!(f32, read_f32, peek_f32, skip_f32, try_read_f32, try_peek_f32, try_skip_f32, read_f32_le, write_f32, try_write_f32, write_f32_le);
cursor_numeric!(f64, read_f64, peek_f64, skip_f64, try_read_f64, try_peek_f64, try_skip_f64, read_f64_le, write_f64, try_write_f64, write_f64_le);
// Pointer-sized values are pinned to a fixed 8-byte wire width for determinism,
// independent of host pointer width (spec's "pointer-sized" primitive).
cursor_numeric!(i64, read_isize, peek_isize, skip_isize, try_read_isize, try_peek_isize, try_skip_isize, read_isize_le, write_isize, try_write_isize, write_isize_le);
cursor_numeric!(u64, read_usize, peek_usize, skip_usize, try_read_usize, try_peek_usize, try_skip_usize, read_usize_le, write_usize, try_write_usize, write_usize_le);

pub struct OutputCursor<'a> {
    buf: &'a mut ByteBuffer,
    p: usize,
}

impl<'a> OutputCursor<'a> {
    pub fn new(buf: &'a mut ByteBuffer) -> Self {
        Self { buf, p: 0 }
    }

    pub fn position(&self) -> usize {
        self.p
    }

    pub fn reserve(&mut self, n: usize) {
        self.buf.reserve(n);
    }

    pub fn grow(&mut self, delta: usize) {
        self.buf.grow(delta);
    }

    fn bump_size(&mut self) {
        let size = self.buf.size().max(self.p);
        self.buf.resize(size, 0);
    }

    /// Unchecked write: precondition `p + bytes.len() <= capacity`.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        let end = self.p + bytes.len();
        assert!(end <= self.buf.capacity(), "write_bytes: out of capacity");
        if self.buf.size() < end {
            self.buf.resize(end, 0);
        }
        self.buf.data_mut()[self.p..end].copy_from_slice(bytes);
        self.p = end;
        self.bump_size();
    }

    /// Checked write with the growing variant as default: on insufficient
    /// capacity the buffer's capacity is doubled (at least to `p + len`) and
    /// the write proceeds, always returning true.
    pub fn try_write_bytes(&mut self, bytes: &[u8]) -> bool {
        let needed = self.p + bytes.len();
        if needed > self.buf.capacity() {
            self.buf.grow((needed - self.buf.capacity()).max(self.buf.capacity().max(1)));
        }
        self.write_bytes(bytes);
        true
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write_bytes(&[v as u8]);
    }

    pub fn try_write_bool(&mut self, v: bool) -> bool {
        self.try_write_bytes(&[v as u8])
    }

    pub fn write_buffer(&mut self, other: &ByteBuffer) {
        self.write_bytes(other.data());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_roundtrip_le() {
        let mut buf = ByteBuffer::with_capacity(16);
        buf.resize(16, 0);
        {
            let mut out = OutputCursor::new(&mut buf);
            out.write_u32_le(0xDEAD_BEEF);
            out.write_u16_le(0x1234);
        }
        let mut cur = InputCursor::from_buffer(&buf);
        assert_eq!(cur.read_u32_le(), 0xDEAD_BEEF);
        assert_eq!(cur.read_u16_le(), 0x1234);
    }

    #[test]
    fn native_write_then_rewind_read_roundtrips() {
        // Spec §8: `write_T(v)` followed by rewinding and `read_T()` returns v,
        // for the native (non-`_le`) primitive family.
        let mut buf = ByteBuffer::with_capacity(16);
        buf.resize(16, 0);
        {
            let mut out = OutputCursor::new(&mut buf);
            out.write_u32(0xDEAD_BEEF);
            out.write_i16(-1234);
        }
        let mut cur = InputCursor::from_buffer(&buf);
        assert_eq!(cur.read_u32(), 0xDEAD_BEEF);
        assert_eq!(cur.read_i16(), -1234);
    }

    #[test]
    fn try_write_native_grows_and_roundtrips() {
        let mut buf = ByteBuffer::new();
        {
            let mut out = OutputCursor::new(&mut buf);
            assert!(out.try_write_u64(0x0123_4567_89AB_CDEF));
            assert!(out.try_write_f32(2.5));
        }
        let mut cur = InputCursor::from_buffer(&buf);
        assert_eq!(cur.read_u64(), 0x0123_4567_89AB_CDEF);
        assert_eq!(cur.read_f32(), 2.5);
    }

    #[test]
    fn peek_does_not_advance() {
        let data = [1u8, 2, 3, 4];
        let mut cur = InputCursor::from_slice(&data);
        assert_eq!(cur.peek_u8(), 1);
        assert_eq!(cur.position(), 0);
        assert_eq!(cur.read_u8(), 1);
        assert_eq!(cur.position(), 1);
    }

    #[test]
    fn try_read_fails_without_moving() {
        let data = [1u8, 2];
        let mut cur = InputCursor::from_slice(&data);
        assert!(cur.try_read_u32().is_none());
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn seek_past_end_clamps() {
        let data = [1u8, 2, 3];
        let mut cur = InputCursor::from_slice(&data);
        cur.seek_to(1000);
        assert_eq!(cur.position(), 3);
        assert!(cur.try_read_u8().is_none());
    }

    #[test]
    fn output_cursor_grows_on_try_write() {
        let mut buf = ByteBuffer::new();
        let mut out = OutputCursor::new(&mut buf);
        for i in 0..20u8 {
            assert!(out.try_write_bytes(&[i]));
        }
        drop(out);
        assert_eq!(buf.size(), 20);
        assert_eq!(buf.data()[19], 19);
    }

    #[test]
    fn bool_roundtrip() {
        let mut buf = ByteBuffer::with_capacity(2);
        buf.resize(2, 0);
        {
            let mut out = OutputCursor::new(&mut buf);
            out.write_bool(true);
            out.write_bool(false);
        }
        let mut cur = InputCursor::from_buffer(&buf);
        assert_eq!(cur.read_bool(), true);
        assert_eq!(cur.read_bool(), false);
    }
}
