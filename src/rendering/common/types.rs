use std::fmt::{Debug, Formatter};
use std::io::Write;

use glam::Vec3;
use kya_files::gif::types::{GsPrim, PrimitiveType};

/// One vertex as the GS would have received it, before any primitive assembly.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct GsVertex {
    pub rgba: [u8; 4],
    /// Raw S and T, Q is always 1.0.
    pub stq: Vec3,
    pub normal: Vec3,
    pub xyz: Vec3,
    pub flags: u32,
}

/// The vertex stream of a strip and the index buffer assembled from it.
#[derive(Clone, Default)]
pub struct VertexBufferData {
    pub vertices: Vec<GsVertex>,
    pub indices: Vec<u32>,
    /// Vertices kicked since the last primitive boundary, see [`crate::rendering::common::kick`].
    pub(crate) queue: Vec<u32>,
    pub(crate) queue_prim: Option<PrimitiveType>,
}

impl Debug for VertexBufferData {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ vertices: [{}], ", self.vertices.len())?;
        write!(f, "indices: [{}] }}", self.indices.len())
    }
}

impl VertexBufferData {
    /// Drops all contents and reserves room for the given amount of indices and vertices.
    pub fn init(&mut self, index_capacity: usize, vertex_capacity: usize) {
        self.vertices = Vec::with_capacity(vertex_capacity);
        self.indices = Vec::with_capacity(index_capacity);
        self.queue.clear();
        self.queue_prim = None;
    }

    pub fn vertex_tail(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_tail(&self) -> usize {
        self.indices.len()
    }
}

#[derive(Clone)]
pub struct SimpleMesh {
    pub name: String,
    pub prim: GsPrim,
    pub vertex_buffer: VertexBufferData,
}

impl Debug for SimpleMesh {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ name: {}, prim: {:#x}, ", self.name, self.prim.0)?;
        write!(f, "vertex_buffer: {:?} }}", self.vertex_buffer)
    }
}

impl SimpleMesh {
    pub fn new(name: String, prim: GsPrim) -> Self {
        Self {
            name,
            prim,
            vertex_buffer: VertexBufferData::default(),
        }
    }

    pub fn dump_to_wavefront_obj<W: Write>(&self, w: &mut W) -> Result<(), std::io::Error> {
        writeln!(w, "o {}", &self.name)?;
        for vertex in &self.vertex_buffer.vertices {
            writeln!(w, "v {} {} {}", vertex.xyz.x, vertex.xyz.y, vertex.xyz.z)?;
            writeln!(w, "vn {} {} {}", vertex.normal.x, vertex.normal.y, vertex.normal.z)?;
            writeln!(w, "vt {} {}", vertex.stq.x, vertex.stq.y)?;
        }

        // indexes are 1-based and here we specify the same vert index for: vert, normal and texcoord.
        let indices = &self.vertex_buffer.indices;
        match self.prim.primitive_type() {
            PrimitiveType::Triangle | PrimitiveType::TriangleStrip | PrimitiveType::TriangleFan => {
                for i in indices.chunks_exact(3) {
                    write!(w, "f {}/{}/{} ", i[0] + 1, i[0] + 1, i[0] + 1)?;
                    write!(w, "{}/{}/{} ", i[1] + 1, i[1] + 1, i[1] + 1)?;
                    writeln!(w, "{}/{}/{}", i[2] + 1, i[2] + 1, i[2] + 1)?;
                }
            }
            PrimitiveType::Line | PrimitiveType::LineStrip | PrimitiveType::Sprite => {
                for i in indices.chunks_exact(2) {
                    writeln!(w, "l {} {}", i[0] + 1, i[1] + 1)?;
                }
            }
            PrimitiveType::Point => {
                for i in indices {
                    writeln!(w, "p {}", i + 1)?;
                }
            }
            PrimitiveType::Prohibited => {}
        }

        Ok(())
    }
}
