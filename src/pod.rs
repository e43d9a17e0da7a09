//! Tools for converting file format structures from bytes.
//!
//! This module should be replaced once rust provides safe transmutes.

use core::{fmt, mem, slice};

/// A trait for types that can safely be converted from byte slices.
///
/// A type that is `Pod` must:
/// - be `#[repr(C)]` or `#[repr(transparent)]`
/// - have no invalid byte values
/// - have no padding
pub unsafe trait Pod: Copy + 'static {}

#[inline]
pub(crate) fn from_bytes<T: Pod>(data: &[u8]) -> Option<(&T, &[u8])> {
    let ptr = data.as_ptr();
    if (ptr as usize) % mem::align_of::<T>() != 0 {
        return None;
    }
    let size = mem::size_of::<T>();
    let tail = data.get(size..)?;
    // Safety:
    // The alignment and size are checked by this function.
    // The Pod trait ensures the type is valid to cast from bytes.
    let val = unsafe { &*ptr.cast() };
    Some((val, tail))
}

#[inline]
pub(crate) fn slice_from_bytes<T: Pod>(data: &[u8], count: usize) -> Option<(&[T], &[u8])> {
    let ptr = data.as_ptr();
    if (ptr as usize) % mem::align_of::<T>() != 0 {
        return None;
    }
    let size = count.checked_mul(mem::size_of::<T>())?;
    let tail = data.get(size..)?;
    // Safety:
    // The alignment and size are checked by this function.
    // The Pod trait ensures the type is valid to cast from bytes.
    let slice = unsafe { slice::from_raw_parts(ptr.cast(), count) };
    Some((slice, tail))
}

#[cfg(test)]
#[inline]
pub(crate) fn bytes_of<T: Pod>(val: &T) -> &[u8] {
    let size = mem::size_of::<T>();
    // Safety:
    // Any alignment is allowed.
    // The size is determined in this function.
    // The Pod trait ensures the type is valid to cast to bytes.
    unsafe { slice::from_raw_parts(slice::from_ref(val).as_ptr().cast(), size) }
}

/// A newtype for byte slices.
///
/// It has these important features:
/// - no methods that can panic, such as `Index`
/// - convenience methods for `Pod` types
/// - a useful `Debug` implementation
#[derive(Default, Clone, Copy, PartialEq, Eq)]
pub struct Bytes<'data>(pub &'data [u8]);

impl<'data> fmt::Debug for Bytes<'data> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_list_bytes(self.0, fmt)
    }
}

impl<'data> Bytes<'data> {
    /// Return the length of the byte slice.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the byte slice is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Skip over the given number of bytes.
    ///
    /// Sets `self` to an empty slice on failure.
    #[inline]
    pub fn skip(&mut self, offset: usize) -> Option<()> {
        match self.0.get(offset..) {
            Some(tail) => {
                self.0 = tail;
                Some(())
            }
            None => {
                self.0 = &[];
                None
            }
        }
    }

    /// Return a reference to the given number of bytes at the start, and
    /// advance past them.
    ///
    /// Sets `self` to an empty slice on failure.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Option<Bytes<'data>> {
        match (self.0.get(..count), self.0.get(count..)) {
            (Some(head), Some(tail)) => {
                self.0 = tail;
                Some(Bytes(head))
            }
            _ => {
                self.0 = &[];
                None
            }
        }
    }

    /// Return a reference to a `Pod` struct at the start, and advance past it.
    ///
    /// Sets `self` to an empty slice on failure.
    #[inline]
    pub fn read<T: Pod>(&mut self) -> Option<&'data T> {
        match from_bytes(self.0) {
            Some((value, tail)) => {
                self.0 = tail;
                Some(value)
            }
            None => {
                self.0 = &[];
                None
            }
        }
    }

    /// Return a reference to a `Pod` struct at the given offset.
    #[inline]
    pub fn read_at<T: Pod>(mut self, offset: usize) -> Option<&'data T> {
        self.skip(offset)?;
        self.read()
    }

    /// Read a null terminated string.
    ///
    /// Does not assume any encoding.
    /// Reads past the null byte, but doesn't return it.
    #[inline]
    pub fn read_string(&mut self) -> Option<&'data [u8]> {
        match memchr::memchr(b'\0', self.0) {
            Some(null) => {
                // These will never fail.
                let bytes = self.read_bytes(null)?;
                self.skip(1)?;
                Some(bytes.0)
            }
            None => {
                self.0 = &[];
                None
            }
        }
    }

    /// Read a null terminated string at an offset.
    ///
    /// Does not assume any encoding. Does not return the null byte.
    #[inline]
    pub fn read_string_at(mut self, offset: usize) -> Option<&'data [u8]> {
        self.skip(offset)?;
        self.read_string()
    }
}

// Only for Debug impl of `Bytes`.
fn debug_list_bytes(bytes: &[u8], fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut list = fmt.debug_list();
    list.entries(bytes.iter().take(8).copied().map(DebugByte));
    if bytes.len() > 8 {
        list.entry(&DebugLen(bytes.len()));
    }
    list.finish()
}

struct DebugByte(u8);

impl fmt::Debug for DebugByte {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "0x{:02x}", self.0)
    }
}

struct DebugLen(usize);

impl fmt::Debug for DebugLen {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "...; {}", self.0)
    }
}

macro_rules! unsafe_impl_pod {
    ($($struct_name:ident),+ $(,)?) => {
        $(
            unsafe impl Pod for $struct_name { }
        )+
    }
}

unsafe_impl_pod!(u8, u16, u32, u64);

unsafe impl<const N: usize, T: Pod> Pod for [T; N] {}
