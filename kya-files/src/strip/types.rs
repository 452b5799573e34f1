use std::io::Read;

use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt};

use crate::ParserError;
use crate::common::reader::Parseable;
use crate::common::types::{C4Vector, Ptr};

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct StripFlags: u32 {
        /// Positions are stored as 16 bit triplets with 12 fractional bits plus a flag word.
        const COMPACT_VERTICES = 0x400;

        // Everything else is consumed by the renderer and only carried along.
        const _ = !0;
    }
}

/// The flag word bit that marks a vertex as not completing a new primitive (strip restart).
pub const VERTEX_SKIP_FLAG: u32 = 0x8000;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawMode {
    /// [`RawVertex12`] positions.
    V12,
    /// [`RawVertex32`] positions.
    V32,
}

/// The leaf geometry record: one primitive batch with its own attribute arrays and VIF list.
#[derive(Debug, Copy, Clone)]
pub struct StripRecord {
    pub flags: StripFlags,
    pub material_index: i16,
    /// Number of segments in the VIF list.
    pub mesh_count: u8,
    pub field_0x7: u8,
    pub bounding_sphere: C4Vector,
    pub next: Ptr,
    pub st_buf: Ptr,
    pub color_buf: Ptr,
    pub vertex_buf: Ptr,
    pub normal_buf: Ptr,
    /// Relative to the start of the strip record.
    pub vif_list_offset: u32,
}

impl StripRecord {
    pub const SIZE: usize = 0x30;

    pub fn draw_mode(&self) -> DrawMode {
        if self.flags.contains(StripFlags::COMPACT_VERTICES) {
            DrawMode::V12
        } else {
            DrawMode::V32
        }
    }
}

impl Parseable<StripRecord> for StripRecord {
    fn parse<R: Read>(rdr: &mut R) -> Result<StripRecord, ParserError> {
        Ok(StripRecord {
            flags: StripFlags::from_bits_retain(rdr.read_u32::<LittleEndian>()?),
            material_index: rdr.read_i16::<LittleEndian>()?,
            mesh_count: rdr.read_u8()?,
            field_0x7: rdr.read_u8()?,
            bounding_sphere: C4Vector::parse(rdr)?,
            next: Ptr::parse(rdr)?,
            st_buf: Ptr::parse(rdr)?,
            color_buf: Ptr::parse(rdr)?,
            vertex_buf: Ptr::parse(rdr)?,
            normal_buf: Ptr::parse(rdr)?,
            vif_list_offset: rdr.read_u32::<LittleEndian>()?,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RawColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl RawColor {
    pub const SIZE: usize = 4;
}

impl Parseable<RawColor> for RawColor {
    fn parse<R: Read>(rdr: &mut R) -> Result<RawColor, ParserError> {
        let bytes = rdr.read_u32::<LittleEndian>()?.to_le_bytes();
        Ok(RawColor {
            r: bytes[0],
            g: bytes[1],
            b: bytes[2],
            a: bytes[3],
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RawTexCoord {
    pub s: i16,
    pub t: i16,
}

impl RawTexCoord {
    pub const SIZE: usize = 4;
    /// The texture coordinate array is preceded by a header of four entries.
    pub const HEADER_SIZE: usize = 4 * Self::SIZE;
}

impl Parseable<RawTexCoord> for RawTexCoord {
    fn parse<R: Read>(rdr: &mut R) -> Result<RawTexCoord, ParserError> {
        Ok(RawTexCoord {
            s: rdr.read_i16::<LittleEndian>()?,
            t: rdr.read_i16::<LittleEndian>()?,
        })
    }
}

/// Compact position: 12 fractional bits per component.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RawVertex12 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub flags: u16,
}

impl RawVertex12 {
    pub const SIZE: usize = 8;
}

impl Parseable<RawVertex12> for RawVertex12 {
    fn parse<R: Read>(rdr: &mut R) -> Result<RawVertex12, ParserError> {
        Ok(RawVertex12 {
            x: rdr.read_i16::<LittleEndian>()?,
            y: rdr.read_i16::<LittleEndian>()?,
            z: rdr.read_i16::<LittleEndian>()?,
            flags: rdr.read_u16::<LittleEndian>()?,
        })
    }
}

/// Pre-expanded position, as the VU would have written it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RawVertex32 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub flags: u32,
}

impl RawVertex32 {
    pub const SIZE: usize = 16;
}

impl Parseable<RawVertex32> for RawVertex32 {
    fn parse<R: Read>(rdr: &mut R) -> Result<RawVertex32, ParserError> {
        Ok(RawVertex32 {
            x: rdr.read_f32::<LittleEndian>()?,
            y: rdr.read_f32::<LittleEndian>()?,
            z: rdr.read_f32::<LittleEndian>()?,
            flags: rdr.read_u32::<LittleEndian>()?,
        })
    }
}

/// Normal with 15 fractional bits per component.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RawNormal {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub pad: i16,
}

impl RawNormal {
    pub const SIZE: usize = 8;
}

impl Parseable<RawNormal> for RawNormal {
    fn parse<R: Read>(rdr: &mut R) -> Result<RawNormal, ParserError> {
        Ok(RawNormal {
            x: rdr.read_i16::<LittleEndian>()?,
            y: rdr.read_i16::<LittleEndian>()?,
            z: rdr.read_i16::<LittleEndian>()?,
            pad: rdr.read_i16::<LittleEndian>()?,
        })
    }
}
