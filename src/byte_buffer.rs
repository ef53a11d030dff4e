//! Owning, growable byte storage and a non-owning borrowed view over one.
//!
//! `ByteBuffer` tracks size (valid content) separately from capacity
//! (allocation) the way a hand-rolled C buffer would, even though `Vec<u8>`
//! already gives us this distinction for free -- `size` here is independent
//! of `Vec::len()`, since `prepare`/`reserve` may grow capacity without
//! touching the logical size. `ByteView` is simply a borrow; Rust's borrow
//! checker is the "must not outlive" enforcement mechanism the original
//! could only document as a convention.

/// Smallest capacity a non-empty buffer ever rounds up to.
const MIN_CAPACITY: usize = 2;

#[derive(Clone, Debug, Default)]
pub struct ByteBuffer {
    data: Vec<u8>,
    size: usize,
}

fn round_capacity(n: usize) -> usize {
    n.max(MIN_CAPACITY).next_power_of_two()
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self { data: Vec::new(), size: 0 }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self { data: Vec::with_capacity(round_capacity(n)), size: 0 }
    }

    /// Copies an external byte run into a fresh, fully-sized buffer.
    pub fn from_slice(src: &[u8]) -> Self {
        Self { data: src.to_vec(), size: src.len() }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data[..self.size]
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data[..self.size]
    }

    /// Ensures capacity for at least `n` bytes without touching `size`.
    pub fn reserve(&mut self, n: usize) {
        if self.data.capacity() < n {
            let target = round_capacity(n);
            self.data.reserve(target - self.data.len());
        }
    }

    /// Resets size to 0 and ensures capacity for at least `n` bytes.
    pub fn prepare(&mut self, n: usize) {
        self.size = 0;
        self.data.clear();
        self.reserve(n);
    }

    /// Grows capacity by `delta` bytes beyond current capacity.
    pub fn grow(&mut self, delta: usize) {
        let target = self.data.capacity() + delta;
        self.reserve(target);
    }

    /// Sets size to `n`, filling newly-visible bytes with `fill` and
    /// preserving bytes already present below `min(size, n)`.
    pub fn resize(&mut self, n: usize, fill: u8) {
        self.reserve(n);
        if n > self.data.len() {
            self.data.resize(n, fill);
        } else {
            self.data.truncate(n);
            self.data.resize(n, fill);
        }
        self.size = n;
    }

    /// Like [`Self::resize`] but discards existing content unconditionally.
    pub fn resize_discard(&mut self, n: usize, fill: u8) {
        self.data.clear();
        self.reserve(n);
        self.data.resize(n, fill);
        self.size = n;
    }

    /// Size returns to 0; capacity is left untouched.
    pub fn clear(&mut self) {
        self.size = 0;
    }

    pub fn copy_from(&mut self, other: &ByteBuffer) {
        self.data.clear();
        self.data.extend_from_slice(other.data());
        self.size = other.size;
    }

    pub fn swap(&mut self, other: &mut ByteBuffer) {
        std::mem::swap(&mut self.data, &mut other.data);
        std::mem::swap(&mut self.size, &mut other.size);
    }

    pub fn as_view(&self) -> ByteView<'_> {
        ByteView { data: self.data() }
    }

    pub fn into_vec(mut self) -> Vec<u8> {
        self.data.truncate(self.size);
        self.data
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(v: Vec<u8>) -> Self {
        let size = v.len();
        Self { data: v, size }
    }
}

/// A borrowed, read-only byte range. Cannot outlive the slice it views.
#[derive(Clone, Copy, Debug)]
pub struct ByteView<'a> {
    data: &'a [u8],
}

impl<'a> ByteView<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn slice(&self, start: usize, end: usize) -> ByteView<'a> {
        ByteView { data: &self.data[start..end] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_preserves_prefix() {
        let mut buf = ByteBuffer::from_slice(&[1, 2, 3]);
        buf.reserve(64);
        assert!(buf.capacity() >= 64);
        assert_eq!(buf.data(), &[1, 2, 3]);
    }

    #[test]
    fn prepare_resets_size() {
        let mut buf = ByteBuffer::from_slice(&[1, 2, 3]);
        buf.prepare(16);
        assert_eq!(buf.size(), 0);
        assert!(buf.capacity() >= 16);
    }

    #[test]
    fn capacity_rounds_to_power_of_two() {
        let buf = ByteBuffer::with_capacity(5);
        assert_eq!(buf.capacity(), 8);
        let buf = ByteBuffer::with_capacity(1);
        assert_eq!(buf.capacity(), MIN_CAPACITY);
    }

    #[test]
    fn resize_fills_new_tail() {
        let mut buf = ByteBuffer::from_slice(&[9, 9]);
        buf.resize(5, 0xAA);
        assert_eq!(buf.data(), &[9, 9, 0xAA, 0xAA, 0xAA]);
        buf.resize(1, 0);
        assert_eq!(buf.data(), &[9]);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut buf = ByteBuffer::from_slice(&[1, 2, 3, 4]);
        let cap_before = buf.capacity();
        buf.clear();
        assert_eq!(buf.size(), 0);
        assert_eq!(buf.capacity(), cap_before);
    }

    #[test]
    fn swap_exchanges_contents() {
        let mut a = ByteBuffer::from_slice(&[1, 2]);
        let mut b = ByteBuffer::from_slice(&[3, 4, 5]);
        a.swap(&mut b);
        assert_eq!(a.data(), &[3, 4, 5]);
        assert_eq!(b.data(), &[1, 2]);
    }

    #[test]
    fn view_does_not_own() {
        let buf = ByteBuffer::from_slice(&[1, 2, 3, 4]);
        let view = buf.as_view();
        assert_eq!(view.data(), &[1, 2, 3, 4]);
        let sub = view.slice(1, 3);
        assert_eq!(sub.data(), &[2, 3]);
    }
}
