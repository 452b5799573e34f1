use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::ParserError;
use crate::common::reader::Parseable;
use crate::common::types::{C4Vector, CMatrix4, Ptr};

/// The loader's bookkeeping record of one loaded G3D file. Only the chunk roots are of interest.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ManagerRecord {
    pub file_buffer: Ptr,
    pub file_length: u32,
    /// Hierarchy list chunk, `HALL`.
    pub hall: Ptr,
    /// Cluster chunk, `CSTA`.
    pub csta: Ptr,
    pub geom: Ptr,
    pub mbna: Ptr,
    pub info: Ptr,
    pub pad: u32,
}

impl ManagerRecord {
    pub const SIZE: usize = 0x20;
}

impl Parseable<ManagerRecord> for ManagerRecord {
    fn parse<R: Read>(rdr: &mut R) -> Result<ManagerRecord, ParserError> {
        Ok(ManagerRecord {
            file_buffer: Ptr::parse(rdr)?,
            file_length: rdr.read_u32::<LittleEndian>()?,
            hall: Ptr::parse(rdr)?,
            csta: Ptr::parse(rdr)?,
            geom: Ptr::parse(rdr)?,
            mbna: Ptr::parse(rdr)?,
            info: Ptr::parse(rdr)?,
            pad: rdr.read_u32::<LittleEndian>()?,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LodRecord {
    /// Points at a hash code entry whose data is the `OBJ.` chunk. Null when the lod is unused.
    pub obj: Ptr,
    pub render_type: i16,
    pub size_bias: i16,
}

impl LodRecord {
    pub const SIZE: usize = 8;
}

impl Parseable<LodRecord> for LodRecord {
    fn parse<R: Read>(rdr: &mut R) -> Result<LodRecord, ParserError> {
        Ok(LodRecord {
            obj: Ptr::parse(rdr)?,
            render_type: rdr.read_i16::<LittleEndian>()?,
            size_bias: rdr.read_i16::<LittleEndian>()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct HierarchyRecord {
    pub transform: CMatrix4,
    pub hash: u64,
    pub lod_count: u16,
    pub flags: u16,
    pub pad: u32,
    pub lods: Vec<LodRecord>,
}

impl HierarchyRecord {
    /// Offset of the lod array inside the record.
    pub const LODS_OFFSET: usize = 0x50;
}

impl Parseable<HierarchyRecord> for HierarchyRecord {
    fn parse<R: Read>(rdr: &mut R) -> Result<HierarchyRecord, ParserError> {
        let transform = CMatrix4::parse(rdr)?;
        let hash = rdr.read_u64::<LittleEndian>()?;
        let lod_count = rdr.read_u16::<LittleEndian>()?;
        let flags = rdr.read_u16::<LittleEndian>()?;
        let pad = rdr.read_u32::<LittleEndian>()?;

        let mut lods = Vec::with_capacity(lod_count as usize);
        for _ in 0..lod_count {
            lods.push(LodRecord::parse(rdr)?);
        }

        Ok(HierarchyRecord {
            transform,
            hash,
            lod_count,
            flags,
            pad,
            lods,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ObjectRecord {
    /// First strip of the object, the rest is chained through [`StripRecord::next`](crate::strip::types::StripRecord).
    pub strip_data: Ptr,
    pub strip_count: u32,
    pub bounding_sphere: C4Vector,
}

impl ObjectRecord {
    pub const SIZE: usize = 0x18;
}

impl Parseable<ObjectRecord> for ObjectRecord {
    fn parse<R: Read>(rdr: &mut R) -> Result<ObjectRecord, ParserError> {
        Ok(ObjectRecord {
            strip_data: Ptr::parse(rdr)?,
            strip_count: rdr.read_u32::<LittleEndian>()?,
            bounding_sphere: C4Vector::parse(rdr)?,
        })
    }
}

/// The data following a `CDQA` header inside of `CSTA`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClusterTypeHeader {
    pub reserved: [u32; 8],
    pub field_0x20: C4Vector,
    pub world_location: C4Vector,
}

impl ClusterTypeHeader {
    pub const SIZE: usize = 0x40;
}

impl Parseable<ClusterTypeHeader> for ClusterTypeHeader {
    fn parse<R: Read>(rdr: &mut R) -> Result<ClusterTypeHeader, ParserError> {
        let mut reserved = [0u32; 8];
        for value in reserved.iter_mut() {
            *value = rdr.read_u32::<LittleEndian>()?;
        }

        Ok(ClusterTypeHeader {
            reserved,
            field_0x20: C4Vector::parse(rdr)?,
            world_location: C4Vector::parse(rdr)?,
        })
    }
}

/// The data of a `CDQU` chunk: a batch of static strips and nested hierarchies.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClusterRecord {
    pub strip_counts: [u16; 8],
    pub sprite_count: u16,
    pub hierarchy_count: u16,
    pub field_0x14: u32,
    /// Material bank, unused here.
    pub mbnk: Ptr,
    pub first_strip: Ptr,
    pub bounding_sphere: C4Vector,
}

impl ClusterRecord {
    pub const SIZE: usize = 0x30;

    /// Slot of [`Self::strip_counts`] that holds the number of directly owned strips.
    pub const STRIP_COUNT_SLOT: usize = 4;

    pub fn strip_count(&self) -> u16 {
        self.strip_counts[Self::STRIP_COUNT_SLOT]
    }
}

impl Parseable<ClusterRecord> for ClusterRecord {
    fn parse<R: Read>(rdr: &mut R) -> Result<ClusterRecord, ParserError> {
        let mut strip_counts = [0u16; 8];
        for count in strip_counts.iter_mut() {
            *count = rdr.read_u16::<LittleEndian>()?;
        }

        Ok(ClusterRecord {
            strip_counts,
            sprite_count: rdr.read_u16::<LittleEndian>()?,
            hierarchy_count: rdr.read_u16::<LittleEndian>()?,
            field_0x14: rdr.read_u32::<LittleEndian>()?,
            mbnk: Ptr::parse(rdr)?,
            first_strip: Ptr::parse(rdr)?,
            bounding_sphere: C4Vector::parse(rdr)?,
        })
    }
}

/// The cluster root found inside of a `CSTA` chunk.
#[derive(Debug, Clone)]
pub enum ClusterRoot {
    /// `CDQA` whose `CDQU` chunk holds the cluster record at `cluster`.
    Quad {
        header: ClusterTypeHeader,
        cluster: Option<(Ptr, ClusterRecord)>,
    },
    /// A cluster type this reader does not know. Nothing to decode.
    Unknown { magic: u32 },
}
