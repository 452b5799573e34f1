use std::io::Read;

use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt};
use num_enum::{FromPrimitive, IntoPrimitive};

use crate::ParserError;
use crate::common::reader::Parseable;

/// The DMA "ret" tag that terminates every segment of a strip's VIF list.
pub const VIF_END_CODE: u32 = 0x6000_0000;

/// Last word of the packet that copies the GIF tag into VU memory.
pub const GIF_TAG_COPY_CODE: u32 = 0x6c01_8000;

/// One quadword of a VIF list.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VifPacket {
    pub words: [u32; 4],
}

impl VifPacket {
    pub const SIZE: usize = 16;

    pub fn is_end(&self) -> bool {
        self.words[0] == VIF_END_CODE
    }

    pub fn is_gif_tag_copy(&self) -> bool {
        self.words[3] == GIF_TAG_COPY_CODE
    }

    /// Address of the GIF tag referenced by a copy packet.
    pub fn gif_tag_address(&self) -> u32 {
        self.words[1]
    }
}

impl Parseable<VifPacket> for VifPacket {
    fn parse<R: Read>(rdr: &mut R) -> Result<VifPacket, ParserError> {
        Ok(VifPacket {
            words: [
                rdr.read_u32::<LittleEndian>()?,
                rdr.read_u32::<LittleEndian>()?,
                rdr.read_u32::<LittleEndian>()?,
                rdr.read_u32::<LittleEndian>()?,
            ],
        })
    }
}

/// A GIF tag in the standard 128 bit layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GifTag {
    /// Number of loops, i.e. vertices for a packed tag.
    pub nloop: u16,
    pub eop: bool,
    pub pre: bool,
    pub prim: GsPrim,
    pub flg: u8,
    /// Number of registers per loop, 0 means 16.
    pub nreg: u8,
    pub regs: u64,
}

impl GifTag {
    pub const SIZE: usize = 16;

    pub fn from_bits(lo: u64, hi: u64) -> Self {
        GifTag {
            nloop: (lo & 0x7FFF) as u16,
            eop: (lo >> 15) & 1 != 0,
            pre: (lo >> 46) & 1 != 0,
            prim: GsPrim((lo >> 47) as u16 & 0x7FF),
            flg: ((lo >> 58) & 0x3) as u8,
            nreg: ((lo >> 60) & 0xF) as u8,
            regs: hi,
        }
    }

    pub fn to_bits(&self) -> (u64, u64) {
        let lo = (self.nloop as u64 & 0x7FFF)
            | (self.eop as u64) << 15
            | (self.pre as u64) << 46
            | (self.prim.0 as u64 & 0x7FF) << 47
            | (self.flg as u64 & 0x3) << 58
            | (self.nreg as u64 & 0xF) << 60;
        (lo, self.regs)
    }
}

impl Parseable<GifTag> for GifTag {
    fn parse<R: Read>(rdr: &mut R) -> Result<GifTag, ParserError> {
        let lo = rdr.read_u64::<LittleEndian>()?;
        let hi = rdr.read_u64::<LittleEndian>()?;
        Ok(GifTag::from_bits(lo, hi))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum PrimitiveType {
    Point = 0,
    Line = 1,
    LineStrip = 2,
    Triangle = 3,
    TriangleStrip = 4,
    TriangleFan = 5,
    Sprite = 6,
    #[num_enum(default)]
    Prohibited = 7,
}

impl PrimitiveType {
    /// Vertices that need to be queued before the first primitive can be drawn.
    pub fn vertices_per_primitive(self) -> usize {
        match self {
            PrimitiveType::Point => 1,
            PrimitiveType::Line | PrimitiveType::LineStrip | PrimitiveType::Sprite => 2,
            PrimitiveType::Triangle | PrimitiveType::TriangleStrip | PrimitiveType::TriangleFan => 3,
            PrimitiveType::Prohibited => usize::MAX,
        }
    }
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct PrimFlags: u16 {
        /// Gouraud shading.
        const IIP = 1 << 3;
        /// Texture mapping.
        const TME = 1 << 4;
        /// Fogging.
        const FGE = 1 << 5;
        /// Alpha blending.
        const ABE = 1 << 6;
        /// Antialiasing.
        const AA1 = 1 << 7;
        /// Texture coordinates are UV instead of STQ.
        const FST = 1 << 8;
        const CTXT = 1 << 9;
        const FIX = 1 << 10;
    }
}

/// The packed PRIM register.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct GsPrim(pub u16);

impl GsPrim {
    pub fn primitive_type(&self) -> PrimitiveType {
        PrimitiveType::from((self.0 & 0x7) as u8)
    }

    pub fn flags(&self) -> PrimFlags {
        PrimFlags::from_bits_truncate(self.0)
    }
}
