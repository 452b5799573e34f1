use crate::ParserError;
use crate::common::types::{Memory, Ptr};
use crate::gif::types::{GifTag, VifPacket};
use crate::strip::reader::StripReader;
use crate::strip::types::StripRecord;

pub struct GifReader {}

impl GifReader {
    /// Pulls the GIF tag of segment `index` out of the VIF list of the strip at `strip`.
    ///
    /// Every segment is terminated by an end packet. After skipping `index` of them, the packet
    /// following the current one has to be the copy command pointing at the GIF tag. Some
    /// layouts don't have it there, in which case the lookup is retried once from the start of
    /// the list before giving up with [`ParserError::MissingGifTag`].
    pub fn extract_gif_tag(
        memory: &Memory,
        strip: Ptr,
        record: &StripRecord,
        index: usize,
    ) -> Result<GifTag, ParserError> {
        let vif_list = StripReader::vif_list(strip, record)?;

        let mut packet = vif_list;
        let mut remaining = index;
        while remaining > 0 {
            let current: VifPacket = memory.read(packet)?;
            if current.is_end() {
                remaining -= 1;
            }

            packet = packet.advance(VifPacket::SIZE)?;
        }

        let copy = match Self::copy_packet(memory, packet) {
            Ok(Some(copy)) => copy,
            Ok(None) | Err(ParserError::OutOfBounds { .. }) => {
                Self::copy_packet(memory, vif_list)?.ok_or(ParserError::MissingGifTag { segment: index })?
            }
            Err(err) => return Err(err),
        };

        let tag_address = Ptr(copy.gif_tag_address());
        if tag_address.is_null() {
            return Err(ParserError::NullReference { what: "GIF tag" });
        }

        memory.read(tag_address)
    }

    /// The GIF tags of all `mesh_count` segments, in order.
    pub fn segment_tags(memory: &Memory, strip: Ptr, record: &StripRecord) -> Result<Vec<GifTag>, ParserError> {
        (0..record.mesh_count as usize)
            .map(|segment| Self::extract_gif_tag(memory, strip, record, segment))
            .collect()
    }

    fn copy_packet(memory: &Memory, packet: Ptr) -> Result<Option<VifPacket>, ParserError> {
        let copy: VifPacket = memory.read(packet.advance(VifPacket::SIZE)?)?;
        Ok(copy.is_gif_tag_copy().then_some(copy))
    }
}
