use glam::Vec3;
use kya_files::ParserError;
use kya_files::common::types::{Memory, Ptr};
use kya_files::gif::reader::GifReader;
use kya_files::gif::types::GifTag;
use kya_files::strip::reader::StripReader;
use kya_files::strip::types::{DrawMode, StripRecord, VERTEX_SKIP_FLAG};
use log::{info, trace};

use crate::MeshLibraryError;
use crate::rendering::common::kick::VertexSink;
use crate::rendering::common::types::{GsVertex, SimpleMesh};
use crate::util::{int12_to_float, int15_to_float};

pub struct StripImporter {}

impl StripImporter {
    /// Decodes the strip at `handle` into a freshly assembled mesh named `name`.
    pub fn create_mesh(memory: &Memory, handle: Ptr, name: String) -> Result<(StripRecord, SimpleMesh), MeshLibraryError> {
        let record = StripReader::read_strip(memory, handle)?;
        info!("Processing strip {} flags: {:#x}", name, record.flags.bits());

        let tags = GifReader::segment_tags(memory, handle, &record)?;
        let Some(first) = tags.first() else {
            return Err(MeshLibraryError::EmptyStrip { handle });
        };
        info!(
            "Strip {} first GIF tag: NLOOP {:#x} NREG {:#x} PRIM {:#x}",
            name, first.nloop, first.nreg, first.prim.0
        );

        let mut mesh = SimpleMesh::new(name, first.prim);
        Self::decode_vertices(memory, handle, &record, &tags, &mut mesh.vertex_buffer)?;
        Ok((record, mesh))
    }

    /// Decodes every vertex of the strip and kicks it into `sink`, returning the amount of vertices.
    ///
    /// Colours and texture coordinates are stored for every vertex, while positions and normals
    /// are shared: each segment after the first one restarts with the last two positions of its
    /// predecessor, so their index lags behind by two per segment.
    pub fn decode_vertices<S: VertexSink>(
        memory: &Memory,
        handle: Ptr,
        record: &StripRecord,
        tags: &[GifTag],
        sink: &mut S,
    ) -> Result<usize, MeshLibraryError> {
        let total: usize = tags.iter().map(|tag| tag.nloop as usize).sum();
        if total == 0 {
            return Err(MeshLibraryError::EmptyStrip { handle });
        }

        for (buffer, what) in [
            (record.color_buf, "colour"),
            (record.st_buf, "texture coordinate"),
            (record.vertex_buf, "vertex"),
        ] {
            if buffer.is_null() {
                return Err(MeshLibraryError::MissingAttribute { handle, what });
            }
        }

        // The PRIM register of the first segment applies to the whole strip.
        let prim = tags[0].prim;
        let draw_mode = record.draw_mode();

        sink.init(total * 2, total * 4);

        let mut mesh_offset = 0;
        let mut vtx_offset = 0;
        for (segment, tag) in tags.iter().enumerate() {
            trace!("Starting segment {} with {} vertices", segment, tag.nloop);

            for i in 0..tag.nloop as usize {
                let index = i + mesh_offset;
                let adjusted_index = index.checked_sub(vtx_offset).ok_or(ParserError::FormatError {
                    reason: "Segment restarts before the start of the position array",
                })?;

                let vertex = Self::decode_vertex(memory, record, draw_mode, index, adjusted_index)?;
                let skip = vertex.flags & VERTEX_SKIP_FLAG != 0;
                trace!(
                    "Vertex {}: stq {} rgba {:?} xyz {} flags {:#x} skip {}",
                    index, vertex.stq, vertex.rgba, vertex.xyz, vertex.flags, skip
                );

                sink.kick(vertex, prim, skip);
            }

            mesh_offset += tag.nloop as usize;
            vtx_offset += 2;
        }

        Ok(total)
    }

    fn decode_vertex(
        memory: &Memory,
        record: &StripRecord,
        draw_mode: DrawMode,
        index: usize,
        adjusted_index: usize,
    ) -> Result<GsVertex, ParserError> {
        let color = StripReader::read_color(memory, record, index)?;
        let st = StripReader::read_tex_coord(memory, record, index)?;

        let normal = StripReader::read_normal(memory, record, adjusted_index)?
            .map(|normal| {
                Vec3::new(
                    int15_to_float(normal.x),
                    int15_to_float(normal.y),
                    int15_to_float(normal.z),
                )
            })
            .unwrap_or(Vec3::ZERO);

        let (xyz, flags) = match draw_mode {
            DrawMode::V12 => {
                let vertex = StripReader::read_vertex12(memory, record, adjusted_index)?;
                (
                    Vec3::new(
                        int12_to_float(vertex.x),
                        int12_to_float(vertex.y),
                        int12_to_float(vertex.z),
                    ),
                    vertex.flags as u32,
                )
            }
            DrawMode::V32 => {
                let vertex = StripReader::read_vertex32(memory, record, adjusted_index)?;
                (Vec3::new(vertex.x, vertex.y, vertex.z), vertex.flags)
            }
        };

        Ok(GsVertex {
            rgba: [color.r, color.g, color.b, color.a],
            stq: Vec3::new(st.s as f32, st.t as f32, 1.0),
            normal,
            xyz,
            flags,
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use kya_files::common::fixture::{
        ImageWriter, StripSpec, fixture_color, fixture_normal, fixture_position, fixture_tex_coord,
    };
    use kya_files::common::types::Memory;
    use kya_files::gif::reader::GifReader;
    use kya_files::gif::types::{GsPrim, PrimitiveType};
    use kya_files::strip::reader::StripReader;

    use super::*;

    /// Records the raw kicks, without any primitive assembly.
    #[derive(Default)]
    struct RecordingSink {
        capacity: (usize, usize),
        kicks: Vec<(GsVertex, GsPrim, bool)>,
    }

    impl VertexSink for RecordingSink {
        fn init(&mut self, index_capacity: usize, vertex_capacity: usize) {
            self.capacity = (index_capacity, vertex_capacity);
            self.kicks.clear();
        }

        fn kick(&mut self, vertex: GsVertex, prim: GsPrim, skip: bool) {
            self.kicks.push((vertex, prim, skip));
        }
    }

    fn record(spec: &StripSpec) -> Result<(Vec<u8>, Ptr), anyhow::Error> {
        let mut writer = ImageWriter::new();
        let strip = writer.put_strip(spec);
        Ok((writer.into_bytes(), strip))
    }

    #[test]
    fn staggered_indexing() -> Result<(), anyhow::Error> {
        let (bytes, handle) = record(&StripSpec::new(&[4, 6]))?;
        let memory = Memory::new(&bytes);
        let strip = StripReader::read_strip(&memory, handle)?;
        let tags = GifReader::segment_tags(&memory, handle, &strip)?;

        let mut sink = RecordingSink::default();
        let total = StripImporter::decode_vertices(&memory, handle, &strip, &tags, &mut sink)?;
        assert_eq!(total, 10);
        assert_eq!(sink.kicks.len(), 10);
        assert_eq!(sink.capacity, (20, 40));

        for (index, (vertex, prim, skip)) in sink.kicks.iter().enumerate() {
            let adjusted_index = if index < 4 { index } else { index - 2 };
            let [r, g, b, a] = fixture_color(index);
            let [s, t] = fixture_tex_coord(index);
            let [x, y, z] = fixture_position(adjusted_index);
            let [nx, ny, nz] = fixture_normal(adjusted_index);

            assert_eq!(vertex.rgba, [r, g, b, a]);
            assert_eq!(vertex.stq, Vec3::new(s as f32, t as f32, 1.0));
            assert_eq!(
                vertex.xyz,
                Vec3::new(x as f32 / 4096.0, y as f32 / 4096.0, z as f32 / 4096.0)
            );
            assert_eq!(
                vertex.normal,
                Vec3::new(nx as f32 / 32768.0, ny as f32 / 32768.0, nz as f32 / 32768.0)
            );
            assert_eq!(*prim, tags[0].prim);
            assert!(!skip);
        }

        Ok(())
    }

    #[test]
    fn skip_flag_is_forwarded() -> Result<(), anyhow::Error> {
        let (bytes, handle) = record(&StripSpec::new(&[8]).with_skip(&[5]))?;
        let memory = Memory::new(&bytes);
        let strip = StripReader::read_strip(&memory, handle)?;
        let tags = GifReader::segment_tags(&memory, handle, &strip)?;

        let mut sink = RecordingSink::default();
        StripImporter::decode_vertices(&memory, handle, &strip, &tags, &mut sink)?;
        let skipped = sink
            .kicks
            .iter()
            .enumerate()
            .filter(|(_, (_, _, skip))| *skip)
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        assert_eq!(skipped, vec![5]);

        Ok(())
    }

    fn kicks(spec: &StripSpec) -> Result<Vec<(GsVertex, GsPrim, bool)>, anyhow::Error> {
        let (bytes, handle) = record(spec)?;
        let memory = Memory::new(&bytes);
        let strip = StripReader::read_strip(&memory, handle)?;
        let tags = GifReader::segment_tags(&memory, handle, &strip)?;

        let mut sink = RecordingSink::default();
        StripImporter::decode_vertices(&memory, handle, &strip, &tags, &mut sink)?;
        Ok(sink.kicks)
    }

    #[test]
    fn wide_vertices_carry_the_same_flags() -> Result<(), anyhow::Error> {
        let compact = kicks(&StripSpec::new(&[8]).with_skip(&[5]))?;
        let wide = kicks(&StripSpec::new(&[8]).wide().with_skip(&[5]))?;
        assert_eq!(wide.len(), 8);

        for (index, ((compact, _, compact_skip), (wide, _, wide_skip))) in compact.iter().zip(&wide).enumerate() {
            assert_eq!(wide.flags, compact.flags);
            assert_eq!(*wide_skip, index == 5);
            assert_eq!(wide_skip, compact_skip);
        }
        assert_eq!(wide[5].0.flags & VERTEX_SKIP_FLAG, VERTEX_SKIP_FLAG);

        Ok(())
    }

    #[test]
    fn fan_strip_keeps_its_anchor() -> Result<(), anyhow::Error> {
        let fan = GsPrim(PrimitiveType::TriangleFan as u16);
        let (bytes, handle) = record(&StripSpec::new(&[5]).with_prim(fan))?;
        let memory = Memory::new(&bytes);

        let (_, mesh) = StripImporter::create_mesh(&memory, handle, "fan".to_string())?;
        assert_eq!(mesh.prim.primitive_type(), PrimitiveType::TriangleFan);
        assert_eq!(mesh.vertex_buffer.vertex_tail(), 5);
        assert_eq!(mesh.vertex_buffer.indices, vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);

        Ok(())
    }

    #[test]
    fn missing_normals_decode_as_zero() -> Result<(), anyhow::Error> {
        let (bytes, handle) = record(&StripSpec::new(&[3]).without_normals())?;
        let memory = Memory::new(&bytes);

        let (_, mesh) = StripImporter::create_mesh(&memory, handle, "normals".to_string())?;
        assert!(mesh.vertex_buffer.vertices.iter().all(|v| v.normal == Vec3::ZERO));

        Ok(())
    }

    #[test]
    fn segment_lookback_underflow() -> Result<(), anyhow::Error> {
        // The second segment would reuse two positions, but the first one only has one.
        let (bytes, handle) = record(&StripSpec::new(&[1, 4]))?;
        let memory = Memory::new(&bytes);

        assert!(matches!(
            StripImporter::create_mesh(&memory, handle, "short".to_string()),
            Err(MeshLibraryError::Parse(ParserError::FormatError { .. }))
        ));

        Ok(())
    }

    #[test]
    fn strip_without_segments_is_empty() -> Result<(), anyhow::Error> {
        let (bytes, handle) = record(&StripSpec::new(&[0]))?;
        let memory = Memory::new(&bytes);

        assert!(matches!(
            StripImporter::create_mesh(&memory, handle, "empty".to_string()),
            Err(MeshLibraryError::EmptyStrip { handle: h }) if h == handle
        ));

        Ok(())
    }
}
