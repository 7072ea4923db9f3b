//! Little-endian read/write primitives over a byte buffer.
//!
//! Every binary frame of the puzzle protocol is a fixed layout of
//! little-endian integers and floats, so one small view type covers both
//! encoding and decoding.
//!
//! Offsets are computed from the message layouts, never from input, so an
//! access past the end of the buffer is a bug and panics like any other
//! slice index. Code decoding frames from the network checks the length
//! first (see [`Inbound::decode_binary`](crate::Inbound::decode_binary)).

/// A little-endian view over a byte buffer.
///
/// Reads are available for any `B: AsRef<[u8]>` (`&[u8]`, `Vec<u8>`, ...),
/// writes for any `B: AsMut<[u8]>`.
///
/// ```rust
/// use jigsaw_protocol::DataView;
///
/// let mut view = DataView::new(vec![0u8; 6]);
/// view.put_u16(0x0102, 0);
/// view.put_f32(1.5, 2);
/// assert_eq!(view.u16(0), 0x0102);
/// assert_eq!(view.f32(2), 1.5);
/// assert_eq!(view.into_inner()[..2], [0x02, 0x01]);
/// ```
#[derive(Debug, Clone)]
pub struct DataView<B> {
    buf: B,
}

impl<B> DataView<B> {
    /// Wraps a buffer.
    pub fn new(buf: B) -> Self {
        Self { buf }
    }

    /// Returns the wrapped buffer.
    pub fn into_inner(self) -> B {
        self.buf
    }
}

impl<B: AsRef<[u8]>> DataView<B> {
    /// Length of the underlying buffer in bytes.
    pub fn len(&self) -> usize {
        self.buf.as_ref().len()
    }

    /// Returns `true` if the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads a single byte at `offset`.
    pub fn u8(&self, offset: usize) -> u8 {
        self.buf.as_ref()[offset]
    }

    /// Reads a `u16` at `offset`.
    pub fn u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes(self.array(offset))
    }

    /// Reads a `u32` at `offset`.
    pub fn u32(&self, offset: usize) -> u32 {
        u32::from_le_bytes(self.array(offset))
    }

    /// Reads an IEEE-754 `f32` at `offset`.
    pub fn f32(&self, offset: usize) -> f32 {
        f32::from_bits(self.u32(offset))
    }

    /// Reads a length-prefixed string starting at `offset`.
    ///
    /// The prefix is a `u16` byte count. Returns the string and the total
    /// number of bytes consumed, prefix included (`2 + length`). Invalid
    /// UTF-8 is replaced rather than rejected.
    pub fn read_string(&self, offset: usize) -> (String, usize) {
        let length = self.u16(offset) as usize;
        let start = offset + 2;
        let bytes = &self.buf.as_ref()[start..start + length];
        (String::from_utf8_lossy(bytes).into_owned(), 2 + length)
    }

    fn array<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf.as_ref()[offset..offset + N]);
        out
    }
}

impl<B: AsMut<[u8]>> DataView<B> {
    /// Writes a single byte at `offset`.
    pub fn put_u8(&mut self, val: u8, offset: usize) {
        self.buf.as_mut()[offset] = val;
    }

    /// Writes a `u16` at `offset`.
    pub fn put_u16(&mut self, val: u16, offset: usize) {
        self.put_raw_bytes(&val.to_le_bytes(), offset);
    }

    /// Writes a `u32` at `offset`.
    pub fn put_u32(&mut self, val: u32, offset: usize) {
        self.put_raw_bytes(&val.to_le_bytes(), offset);
    }

    /// Writes an IEEE-754 `f32` at `offset`.
    pub fn put_f32(&mut self, val: f32, offset: usize) {
        self.put_u32(val.to_bits(), offset);
    }

    /// Copies `data` into the buffer starting at `offset`.
    pub fn put_raw_bytes(&mut self, data: &[u8], offset: usize) {
        self.buf.as_mut()[offset..offset + data.len()].copy_from_slice(data);
    }
}
