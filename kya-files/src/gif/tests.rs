use crate::ParserError;
use crate::common::fixture::{ImageWriter, StripSpec};
use crate::common::types::Memory;
use crate::gif::reader::GifReader;
use crate::gif::types::{GifTag, GsPrim, PrimFlags, PrimitiveType};
use crate::strip::reader::StripReader;

#[test]
fn gif_tag_bit_layout() {
    // PRIM = triangle strip, gouraud, textured; NLOOP = 4, EOP, PRE, NREG = 3.
    let lo = 4 | 1 << 15 | 1 << 46 | (0x1cu64 << 47) | (3u64 << 60);
    let tag = GifTag::from_bits(lo, 0x412);

    assert_eq!(tag.nloop, 4);
    assert!(tag.eop);
    assert!(tag.pre);
    assert_eq!(tag.nreg, 3);
    assert_eq!(tag.regs, 0x412);
    assert_eq!(tag.prim.primitive_type(), PrimitiveType::TriangleStrip);
    assert_eq!(tag.prim.flags(), PrimFlags::IIP | PrimFlags::TME);
    assert_eq!(tag.to_bits(), (lo, 0x412));
}

#[test]
fn primitive_type_from_prim() {
    assert_eq!(GsPrim(5).primitive_type(), PrimitiveType::TriangleFan);
    assert_eq!(GsPrim(7 | 1 << 4).primitive_type(), PrimitiveType::Prohibited);
    assert_eq!(PrimitiveType::Sprite.vertices_per_primitive(), 2);
    assert_eq!(PrimitiveType::Point.vertices_per_primitive(), 1);
}

#[test]
fn extracts_tag_per_segment() -> Result<(), anyhow::Error> {
    let mut writer = ImageWriter::new();
    let strip = writer.put_strip(&StripSpec::new(&[4, 6, 3]));
    let bytes = writer.into_bytes();
    let memory = Memory::new(&bytes);
    let record = StripReader::read_strip(&memory, strip)?;

    let tags = GifReader::segment_tags(&memory, strip, &record)?;
    assert_eq!(tags.iter().map(|tag| tag.nloop).collect::<Vec<_>>(), vec![4, 6, 3]);
    assert!(!tags[0].eop);
    assert!(tags[2].eop);

    Ok(())
}

#[test]
fn falls_back_to_list_start_without_copy_command() -> Result<(), anyhow::Error> {
    let mut writer = ImageWriter::new();
    let strip = writer.put_strip(&StripSpec::new(&[4, 6]).with_missing_copy(1));
    let bytes = writer.into_bytes();
    let memory = Memory::new(&bytes);
    let record = StripReader::read_strip(&memory, strip)?;

    // The retry parses the first segment's tag, not the one this segment was meant to have.
    let tag = GifReader::extract_gif_tag(&memory, strip, &record, 1)?;
    assert_eq!(tag.nloop, 4);

    Ok(())
}

#[test]
fn missing_copy_command_at_list_start() -> Result<(), anyhow::Error> {
    let mut writer = ImageWriter::new();
    let strip = writer.put_strip(&StripSpec::new(&[4]).with_missing_copy(0));
    let bytes = writer.into_bytes();
    let memory = Memory::new(&bytes);
    let record = StripReader::read_strip(&memory, strip)?;

    assert!(matches!(
        GifReader::extract_gif_tag(&memory, strip, &record, 0),
        Err(ParserError::MissingGifTag { segment: 0 })
    ));

    Ok(())
}
