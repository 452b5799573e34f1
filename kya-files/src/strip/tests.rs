use crate::ParserError;
use crate::common::fixture::{
    ImageWriter, StripSpec, fixture_color, fixture_normal, fixture_position, fixture_tex_coord,
};
use crate::common::types::{Memory, Ptr};
use crate::strip::reader::StripReader;
use crate::strip::types::{DrawMode, StripFlags, VERTEX_SKIP_FLAG};

#[test]
fn compact_strip_attributes() -> Result<(), anyhow::Error> {
    let mut writer = ImageWriter::new();
    let strip = writer.put_strip(&StripSpec::new(&[4, 6]).with_skip(&[3]));
    let bytes = writer.into_bytes();
    let memory = Memory::new(&bytes);

    let record = StripReader::read_strip(&memory, strip)?;
    assert_eq!(record.mesh_count, 2);
    assert_eq!(record.draw_mode(), DrawMode::V12);
    assert!(record.flags.contains(StripFlags::COMPACT_VERTICES));
    assert_eq!(record.material_index, -1);
    assert!(record.next.is_null());

    let color = StripReader::read_color(&memory, &record, 9)?;
    assert_eq!([color.r, color.g, color.b, color.a], fixture_color(9));

    let st = StripReader::read_tex_coord(&memory, &record, 7)?;
    assert_eq!([st.s, st.t], fixture_tex_coord(7));

    let vertex = StripReader::read_vertex12(&memory, &record, 5)?;
    assert_eq!([vertex.x, vertex.y, vertex.z], fixture_position(5));
    assert_eq!(vertex.flags as u32 & VERTEX_SKIP_FLAG, 0);
    let skipped = StripReader::read_vertex12(&memory, &record, 3)?;
    assert_eq!(skipped.flags as u32 & VERTEX_SKIP_FLAG, VERTEX_SKIP_FLAG);

    let normal = StripReader::read_normal(&memory, &record, 2)?.expect("strip has normals");
    assert_eq!([normal.x, normal.y, normal.z], fixture_normal(2));

    Ok(())
}

#[test]
fn wide_strip_without_normals() -> Result<(), anyhow::Error> {
    let mut writer = ImageWriter::new();
    let strip = writer.put_strip(&StripSpec::new(&[3]).wide().without_normals());
    let bytes = writer.into_bytes();
    let memory = Memory::new(&bytes);

    let record = StripReader::read_strip(&memory, strip)?;
    assert_eq!(record.draw_mode(), DrawMode::V32);
    assert!(StripReader::read_normal(&memory, &record, 0)?.is_none());

    let vertex = StripReader::read_vertex32(&memory, &record, 2)?;
    let [x, y, z] = fixture_position(2);
    assert_eq!(vertex.x, x as f32 / 4096.0);
    assert_eq!(vertex.y, y as f32 / 4096.0);
    assert_eq!(vertex.z, z as f32 / 4096.0);

    Ok(())
}

#[test]
fn missing_buffers() -> Result<(), anyhow::Error> {
    let mut writer = ImageWriter::new();
    let strip = writer.put_strip(&StripSpec::new(&[3]));
    let bytes = writer.into_bytes();
    let memory = Memory::new(&bytes);

    let mut record = StripReader::read_strip(&memory, strip)?;
    record.color_buf = Ptr::NULL;
    assert!(matches!(
        StripReader::read_color(&memory, &record, 0),
        Err(ParserError::NullReference { .. })
    ));
    assert!(matches!(
        StripReader::read_strip(&memory, Ptr::NULL),
        Err(ParserError::NullReference { what: "strip" })
    ));

    Ok(())
}
