use crate::ParserError;
use crate::common::types::{Memory, Ptr};
use crate::strip::types::{RawColor, RawNormal, RawTexCoord, RawVertex12, RawVertex32, StripRecord};

pub struct StripReader {}

impl StripReader {
    pub fn read_strip(memory: &Memory, strip: Ptr) -> Result<StripRecord, ParserError> {
        if strip.is_null() {
            return Err(ParserError::NullReference { what: "strip" });
        }

        memory.read(strip)
    }

    /// Address of the VIF list embedded behind the strip record at `strip`.
    pub fn vif_list(strip: Ptr, record: &StripRecord) -> Result<Ptr, ParserError> {
        strip.advance(record.vif_list_offset as usize)
    }

    pub fn read_color(memory: &Memory, record: &StripRecord, index: usize) -> Result<RawColor, ParserError> {
        let base = Self::required(record.color_buf, "color buffer")?;
        memory.read_indexed(base, index, RawColor::SIZE)
    }

    pub fn read_tex_coord(memory: &Memory, record: &StripRecord, index: usize) -> Result<RawTexCoord, ParserError> {
        let base = Self::required(record.st_buf, "texture coordinate buffer")?;
        memory.read_indexed(base.advance(RawTexCoord::HEADER_SIZE)?, index, RawTexCoord::SIZE)
    }

    pub fn read_vertex12(memory: &Memory, record: &StripRecord, index: usize) -> Result<RawVertex12, ParserError> {
        let base = Self::required(record.vertex_buf, "vertex buffer")?;
        memory.read_indexed(base, index, RawVertex12::SIZE)
    }

    pub fn read_vertex32(memory: &Memory, record: &StripRecord, index: usize) -> Result<RawVertex32, ParserError> {
        let base = Self::required(record.vertex_buf, "vertex buffer")?;
        memory.read_indexed(base, index, RawVertex32::SIZE)
    }

    /// Normals are optional, `None` when the strip carries no normal buffer.
    pub fn read_normal(memory: &Memory, record: &StripRecord, index: usize) -> Result<Option<RawNormal>, ParserError> {
        record
            .normal_buf
            .non_null()
            .map(|base| memory.read_indexed(base, index, RawNormal::SIZE))
            .transpose()
    }

    fn required(ptr: Ptr, what: &'static str) -> Result<Ptr, ParserError> {
        ptr.non_null().ok_or(ParserError::NullReference { what })
    }
}
