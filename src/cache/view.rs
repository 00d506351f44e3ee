use bytes::Bytes;

/// An immutable view over a cached value.
///
/// Every value entering or leaving the cache is wrapped in a `ByteView`. The
/// backing storage is reference-counted, so cloning a view is cheap and never
/// copies the payload. There is no mutable access: callers that need to modify
/// the data take a fresh copy via [`ByteView::to_vec`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteView {
    data: Bytes,
}

impl ByteView {
    /// Length of the viewed data in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrows the underlying bytes without copying.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns a fresh, caller-owned copy of the data.
    ///
    /// Mutating the returned vector has no effect on the cached value.
    pub fn to_vec(&self) -> Vec<u8> {
        self.data.to_vec()
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<Bytes> for ByteView {
    fn from(data: Bytes) -> Self {
        Self { data }
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(data: Vec<u8>) -> Self {
        Self { data: Bytes::from(data) }
    }
}

impl From<&[u8]> for ByteView {
    fn from(data: &[u8]) -> Self {
        Self { data: Bytes::copy_from_slice(data) }
    }
}

impl From<String> for ByteView {
    fn from(data: String) -> Self {
        Self { data: Bytes::from(data.into_bytes()) }
    }
}

impl From<&str> for ByteView {
    fn from(data: &str) -> Self {
        Self { data: Bytes::copy_from_slice(data.as_bytes()) }
    }
}
