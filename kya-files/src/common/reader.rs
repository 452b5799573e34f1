use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::ParserError;
use crate::common::types::{C4Vector, ChunkHeader, CMatrix4, HashCode, Memory, Ptr};

pub trait Parseable<T> {
    fn parse<R: Read>(rdr: &mut R) -> Result<T, ParserError>;
}

impl Parseable<C4Vector> for C4Vector {
    fn parse<R: Read>(rdr: &mut R) -> Result<C4Vector, ParserError> {
        Ok(C4Vector {
            x: rdr.read_f32::<LittleEndian>()?,
            y: rdr.read_f32::<LittleEndian>()?,
            z: rdr.read_f32::<LittleEndian>()?,
            w: rdr.read_f32::<LittleEndian>()?,
        })
    }
}

impl Parseable<CMatrix4> for CMatrix4 {
    fn parse<R: Read>(rdr: &mut R) -> Result<CMatrix4, ParserError> {
        Ok(CMatrix4 {
            rows: [
                C4Vector::parse(rdr)?,
                C4Vector::parse(rdr)?,
                C4Vector::parse(rdr)?,
                C4Vector::parse(rdr)?,
            ],
        })
    }
}

impl Parseable<ChunkHeader> for ChunkHeader {
    fn parse<R: Read>(rdr: &mut R) -> Result<ChunkHeader, ParserError> {
        Ok(ChunkHeader {
            hash: rdr.read_u32::<LittleEndian>()?,
            field_0x4: rdr.read_u16::<LittleEndian>()?,
            field_0x6: rdr.read_u16::<LittleEndian>()?,
            size: rdr.read_u32::<LittleEndian>()?,
            next_chunk_offset: rdr.read_u32::<LittleEndian>()?,
        })
    }
}

impl Parseable<HashCode> for HashCode {
    fn parse<R: Read>(rdr: &mut R) -> Result<HashCode, ParserError> {
        Ok(HashCode {
            hash: rdr.read_u64::<LittleEndian>()?,
            data: Ptr::parse(rdr)?,
            pad: rdr.read_u32::<LittleEndian>()?,
        })
    }
}

impl Parseable<u8> for u8 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u8, ParserError> {
        Ok(rdr.read_u8()?)
    }
}

impl Parseable<u16> for u16 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u16, ParserError> {
        Ok(rdr.read_u16::<LittleEndian>()?)
    }
}

impl Parseable<i16> for i16 {
    fn parse<R: Read>(rdr: &mut R) -> Result<i16, ParserError> {
        Ok(rdr.read_i16::<LittleEndian>()?)
    }
}

impl Parseable<u32> for u32 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u32, ParserError> {
        Ok(rdr.read_u32::<LittleEndian>()?)
    }
}

impl Parseable<f32> for f32 {
    fn parse<R: Read>(rdr: &mut R) -> Result<f32, ParserError> {
        Ok(rdr.read_f32::<LittleEndian>()?)
    }
}

impl Parseable<u64> for u64 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u64, ParserError> {
        Ok(rdr.read_u64::<LittleEndian>()?)
    }
}

/// Counts the chunks laid out back to back from `first` up to (excluding) `end`.
pub fn chunk_count(memory: &Memory, first: Ptr, end: Ptr) -> Result<usize, ParserError> {
    let mut count = 0;
    let mut cursor = first;
    while cursor < end {
        let header: ChunkHeader = memory.read(cursor)?;
        if (header.size as usize) < ChunkHeader::SIZE {
            return Err(ParserError::FormatError {
                reason: "Chunk size is smaller than its header",
            });
        }

        count += 1;
        cursor = header.end(cursor)?;
    }

    Ok(count)
}

/// The chunk starting at `start`, unless the region up to `end` is too small to hold one.
pub fn first_chunk(memory: &Memory, start: Ptr, end: Ptr) -> Result<Option<(Ptr, ChunkHeader)>, ParserError> {
    if start.advance(ChunkHeader::SIZE)? > end {
        return Ok(None);
    }

    Ok(Some((start, memory.read(start)?)))
}

pub fn expect_chunk(memory: &Memory, at: Ptr, expected: u32) -> Result<ChunkHeader, ParserError> {
    if at.is_null() {
        return Err(ParserError::NullReference { what: "chunk" });
    }

    let header: ChunkHeader = memory.read(at)?;
    if header.hash != expected {
        return Err(ParserError::InvalidMagicValue {
            expected,
            magic: header.hash,
        });
    }

    Ok(header)
}
