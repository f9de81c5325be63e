//! Length-prefixed byte buffers passed across the boundary.
//!
//! [`BoundaryString`] is the owned form: exactly one holder at a time, freed
//! exactly once. [`BoundaryStr`] is the borrowed form handed to calls such as
//! `log`; it carries no release operation and cannot outlive its owner.

use std::borrow::Cow;
use std::fmt;

/// Owned boundary buffer. Length is authoritative; contents need not be
/// UTF-8 or NUL-terminated.
///
/// Releasing consumes the value, so a second release does not compile:
///
/// ```compile_fail
/// use pulse_plugin_sdk::BoundaryString;
///
/// let text = BoundaryString::duplicate(b"hello");
/// text.release();
/// text.release();
/// ```
#[derive(Clone, PartialEq, Eq, Default)]
pub struct BoundaryString {
    bytes: Vec<u8>,
}

impl BoundaryString {
    /// Takes ownership of `bytes` without copying.
    pub fn construct_owned(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Allocates a new buffer holding a copy of `bytes`.
    pub fn duplicate(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    pub fn duplicate_str(text: &str) -> Self {
        Self::duplicate(text.as_bytes())
    }

    /// Frees the buffer.
    pub fn release(self) {
        drop(self);
    }

    /// Borrowed view for the duration of a call.
    pub fn borrow(&self) -> BoundaryStr<'_> {
        BoundaryStr::new(&self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Gives up ownership, returning the raw `(ptr, len)` pair.
    ///
    /// The receiver becomes the sole owner and must hand the pair back to
    /// [`BoundaryString::from_raw_parts`] exactly once.
    pub fn into_raw_parts(self) -> (*mut u8, usize) {
        let boxed = self.bytes.into_boxed_slice();
        let len = boxed.len();
        (Box::into_raw(boxed) as *mut u8, len)
    }

    /// Reclaims a buffer produced by [`BoundaryString::into_raw_parts`].
    ///
    /// # Safety
    ///
    /// `ptr` and `len` must come from one `into_raw_parts` call in this
    /// module's allocator, and must not have been reclaimed before.
    pub unsafe fn from_raw_parts(ptr: *mut u8, len: usize) -> Self {
        let boxed = Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len));
        Self {
            bytes: boxed.into_vec(),
        }
    }
}

impl From<String> for BoundaryString {
    fn from(text: String) -> Self {
        Self::construct_owned(text.into_bytes())
    }
}

impl From<Vec<u8>> for BoundaryString {
    fn from(bytes: Vec<u8>) -> Self {
        Self::construct_owned(bytes)
    }
}

impl fmt::Debug for BoundaryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundaryString")
            .field("len", &self.bytes.len())
            .field("text", &self.to_string_lossy())
            .finish()
    }
}

/// Borrowed boundary buffer.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BoundaryStr<'a> {
    bytes: &'a [u8],
}

impl<'a> BoundaryStr<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_string_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.bytes)
    }

    /// Copies the borrowed bytes into a new owned buffer.
    pub fn duplicate(&self) -> BoundaryString {
        BoundaryString::duplicate(self.bytes)
    }
}

impl<'a> From<&'a str> for BoundaryStr<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for BoundaryStr<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for BoundaryStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoundaryStr")
            .field(&self.to_string_lossy())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_owned_keeps_buffer() {
        let bytes = b"hello".to_vec();
        let ptr = bytes.as_ptr();

        let text = BoundaryString::construct_owned(bytes);
        // 没有复制，仍然是同一块内存
        assert_eq!(text.as_bytes().as_ptr(), ptr);
        assert_eq!(text.len(), 5);
    }

    #[test]
    fn test_duplicate_survives_source_release() {
        let source = BoundaryString::from("world".to_string());
        let copy = BoundaryString::duplicate(source.as_bytes());
        assert_ne!(copy.as_bytes().as_ptr(), source.as_bytes().as_ptr());

        source.release();
        assert_eq!(copy.as_bytes(), b"world");
        assert_eq!(copy.to_string_lossy(), "world");
    }

    #[test]
    fn test_length_is_authoritative() {
        let text = BoundaryString::duplicate(b"a\0b\xff");
        assert_eq!(text.len(), 4);
        assert_eq!(text.borrow().as_bytes(), b"a\0b\xff");
        assert_eq!(text.to_string_lossy(), "a\0b\u{fffd}");
    }

    #[test]
    fn test_raw_parts_transfer() {
        let text = BoundaryString::duplicate_str("icon bytes");
        let (ptr, len) = text.into_raw_parts();
        assert_eq!(len, 10);

        // 接收方恰好回收一次
        let back = unsafe { BoundaryString::from_raw_parts(ptr, len) };
        assert_eq!(back.as_bytes(), b"icon bytes");
        back.release();
    }

    #[test]
    fn test_empty_raw_parts() {
        let (ptr, len) = BoundaryString::default().into_raw_parts();
        assert_eq!(len, 0);
        let back = unsafe { BoundaryString::from_raw_parts(ptr, len) };
        assert!(back.is_empty());
    }

    #[test]
    fn test_borrowed_view_duplicates() {
        let owner = BoundaryString::duplicate_str("log me");
        let view = owner.borrow();
        let copy = view.duplicate();
        drop(owner);
        assert_eq!(copy.as_bytes(), b"log me");
    }
}
