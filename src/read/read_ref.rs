use core::mem;

use crate::pod::{from_bytes, slice_from_bytes, Pod};

/// A trait for reading references to [`Pod`] types from a block of data.
///
/// Every read is bounds checked against the data, and offset arithmetic is
/// checked for overflow, so offsets and sizes taken from an untrusted file can
/// be passed in directly.
pub trait ReadRef<'data>: Clone + Copy {
    /// The total size of the block of data.
    fn len(self) -> usize;

    /// Get a reference to a `u8` slice at the given offset.
    ///
    /// Returns an error if offset or size are out of bounds.
    fn read_bytes_at(self, offset: u64, size: u64) -> Result<&'data [u8], ()>;

    /// Get a reference to a `u8` slice at the given offset, and update the offset.
    ///
    /// Returns an error if offset or size are out of bounds.
    fn read_bytes(self, offset: &mut u64, size: u64) -> Result<&'data [u8], ()> {
        let bytes = self.read_bytes_at(*offset, size)?;
        *offset = offset.wrapping_add(size);
        Ok(bytes)
    }

    /// Get a reference to a `Pod` type at the given offset, and update the offset.
    ///
    /// Returns an error if offset or size are out of bounds.
    fn read<T: Pod>(self, offset: &mut u64) -> Result<&'data T, ()> {
        let size = mem::size_of::<T>().try_into().map_err(|_| ())?;
        let bytes = self.read_bytes(offset, size)?;
        let (t, _) = from_bytes(bytes).ok_or(())?;
        Ok(t)
    }

    /// Get a reference to a `Pod` type at the given offset.
    ///
    /// Returns an error if offset or size are out of bounds.
    fn read_at<T: Pod>(self, mut offset: u64) -> Result<&'data T, ()> {
        self.read(&mut offset)
    }

    /// Get a reference to a slice of a `Pod` type at the given offset, and update the offset.
    ///
    /// Returns an error if offset or size are out of bounds.
    fn read_slice<T: Pod>(self, offset: &mut u64, count: usize) -> Result<&'data [T], ()> {
        let size = count
            .checked_mul(mem::size_of::<T>())
            .ok_or(())?
            .try_into()
            .map_err(|_| ())?;
        let bytes = self.read_bytes(offset, size)?;
        let (t, _) = slice_from_bytes(bytes, count).ok_or(())?;
        Ok(t)
    }
}

impl<'data> ReadRef<'data> for &'data [u8] {
    fn len(self) -> usize {
        <[u8]>::len(self)
    }

    fn read_bytes_at(self, offset: u64, size: u64) -> Result<&'data [u8], ()> {
        let offset: usize = offset.try_into().map_err(|_| ())?;
        let size: usize = size.try_into().map_err(|_| ())?;
        self.get(offset..).ok_or(())?.get(..size).ok_or(())
    }
}
