use std::fmt::{Debug, Display, Formatter};
use std::io::ErrorKind::UnexpectedEof;
use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::ParserError;
use crate::common::reader::Parseable;

pub const FOURCC_HALL: u32 = u32::from_le_bytes(*b"HALL");
pub const FOURCC_HASH: u32 = u32::from_le_bytes(*b"HASH");
pub const FOURCC_HIER: u32 = u32::from_le_bytes(*b"HIER");
pub const FOURCC_OBJ: u32 = u32::from_le_bytes(*b"OBJ.");
pub const FOURCC_CSTA: u32 = u32::from_le_bytes(*b"CSTA");
/// Cluster type: quad tree batches, the only supported one.
pub const FOURCC_CDQA: u32 = u32::from_le_bytes(*b"CDQA");
/// Cluster type: octree batches.
pub const FOURCC_CDOA: u32 = u32::from_le_bytes(*b"CDOA");
pub const FOURCC_CDQU: u32 = u32::from_le_bytes(*b"CDQU");

/// An address into the memory image the asset loader has mapped. Zero is the null pointer.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ptr(pub u32);

impl Ptr {
    pub const NULL: Ptr = Ptr(0);

    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn non_null(self) -> Option<Ptr> {
        if self.is_null() { None } else { Some(self) }
    }

    pub fn advance(self, bytes: usize) -> Result<Ptr, ParserError> {
        u32::try_from(bytes)
            .ok()
            .and_then(|bytes| self.0.checked_add(bytes))
            .map(Ptr)
            .ok_or(ParserError::OutOfBounds {
                address: self.0,
                size: bytes,
            })
    }
}

impl Debug for Ptr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ptr({:#x})", self.0)
    }
}

impl Display for Ptr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl Parseable<Ptr> for Ptr {
    fn parse<R: Read>(rdr: &mut R) -> Result<Ptr, ParserError> {
        Ok(Ptr(rdr.read_u32::<LittleEndian>()?))
    }
}

/// Read-only view over the memory image that the external loader owns and keeps alive.
/// Every record is decoded on access, nothing is reinterpreted in place.
#[derive(Copy, Clone)]
pub struct Memory<'a> {
    bytes: &'a [u8],
}

impl Debug for Memory<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Memory {{ bytes: [{}] }}", self.bytes.len())
    }
}

impl<'a> Memory<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn cursor(&self, ptr: Ptr) -> Result<Cursor<&'a [u8]>, ParserError> {
        let start = ptr.0 as usize;
        if start >= self.bytes.len() {
            return Err(ParserError::OutOfBounds {
                address: ptr.0,
                size: self.bytes.len(),
            });
        }

        Ok(Cursor::new(&self.bytes[start..]))
    }

    pub fn read<T: Parseable<T>>(&self, ptr: Ptr) -> Result<T, ParserError> {
        let mut cursor = self.cursor(ptr)?;
        T::parse(&mut cursor).map_err(|err| self.map_eof(ptr, err))
    }

    /// Reads the `index`th element of an array of `stride` byte records starting at `base`.
    pub fn read_indexed<T: Parseable<T>>(&self, base: Ptr, index: usize, stride: usize) -> Result<T, ParserError> {
        let offset = index.checked_mul(stride).ok_or(ParserError::OutOfBounds {
            address: base.0,
            size: self.bytes.len(),
        })?;
        self.read(base.advance(offset)?)
    }

    pub fn read_array<T: Parseable<T>>(&self, ptr: Ptr, count: usize) -> Result<Vec<T>, ParserError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut cursor = self.cursor(ptr)?;
        let mut list = Vec::with_capacity(count);
        for _ in 0..count {
            list.push(T::parse(&mut cursor).map_err(|err| self.map_eof(ptr, err))?);
        }

        Ok(list)
    }

    fn map_eof(&self, ptr: Ptr, err: ParserError) -> ParserError {
        match err {
            ParserError::IOError(internal) if internal.kind() == UnexpectedEof => ParserError::OutOfBounds {
                address: ptr.0,
                size: self.bytes.len(),
            },
            err => err,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct C4Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Display for C4Vector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.z, self.w)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct CMatrix4 {
    pub rows: [C4Vector; 4],
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChunkHeader {
    pub hash: u32,
    pub field_0x4: u16,
    pub field_0x6: u16,
    /// Size in bytes, including this header.
    pub size: u32,
    pub next_chunk_offset: u32,
}

impl ChunkHeader {
    pub const SIZE: usize = 16;

    pub fn magic_str(&self) -> String {
        String::from_utf8_lossy(&self.hash.to_le_bytes()[..]).into_owned()
    }

    /// Address one past the last byte of the chunk starting at `at`.
    pub fn end(&self, at: Ptr) -> Result<Ptr, ParserError> {
        at.advance(self.size as usize)
    }

    /// Address of the data right behind the header of the chunk starting at `at`.
    pub fn data(at: Ptr) -> Result<Ptr, ParserError> {
        at.advance(Self::SIZE)
    }
}

impl Display for ChunkHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (size: {:#x})", self.magic_str(), self.size)
    }
}

/// An entry of a `HASH` chunk: the hashed name of a resource and where its data lives.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HashCode {
    pub hash: u64,
    pub data: Ptr,
    pub pad: u32,
}

impl HashCode {
    pub const SIZE: usize = 16;

    pub fn name(&self) -> String {
        name_from_hash(self.hash)
    }
}

/// Renders a hashed resource name, which is just its first eight ASCII characters.
pub fn name_from_hash(hash: u64) -> String {
    let bytes = hash.to_le_bytes();
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..len]).into_owned()
}
