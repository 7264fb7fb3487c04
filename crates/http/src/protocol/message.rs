use bytes::Bytes;

/// One complete request as cut out of the byte stream by the framer.
///
/// `bytes` holds the header block (including the terminating `\r\n\r\n`) followed by
/// exactly `Content-Length` body bytes. `header_len` marks where the body begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    bytes: Bytes,
    header_len: usize,
}

impl RawMessage {
    /// Creates a message from framed bytes.
    ///
    /// `header_len` is clamped to the buffer length so a bad boundary can never index past the end.
    pub fn new(bytes: Bytes, header_len: usize) -> Self {
        let header_len = header_len.min(bytes.len());
        Self { bytes, header_len }
    }

    /// Offset of the first body byte.
    #[inline]
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// The header block, including the blank line that ends it.
    #[inline]
    pub fn head(&self) -> &[u8] {
        &self.bytes[..self.header_len]
    }

    /// The body bytes; empty when the request had none.
    #[inline]
    pub fn body(&self) -> Bytes {
        self.bytes.slice(self.header_len..)
    }

    #[inline]
    pub fn as_bytes(&self) -> &Bytes {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
