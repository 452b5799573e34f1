//! Primitive assembly in the manner of the GS vertex queue: every kicked vertex lands in the
//! vertex buffer, and a primitive is drawn once enough vertices are queued for its type.

use kya_files::gif::types::{GsPrim, PrimitiveType};

use crate::rendering::common::types::{GsVertex, VertexBufferData};

pub trait VertexSink {
    /// Prepares the sink for a strip with the given headroom.
    fn init(&mut self, index_capacity: usize, vertex_capacity: usize);

    /// Queues `vertex`. With `skip` set, the vertex doesn't complete a primitive.
    fn kick(&mut self, vertex: GsVertex, prim: GsPrim, skip: bool);
}

impl VertexSink for VertexBufferData {
    fn init(&mut self, index_capacity: usize, vertex_capacity: usize) {
        VertexBufferData::init(self, index_capacity, vertex_capacity);
    }

    fn kick(&mut self, vertex: GsVertex, prim: GsPrim, skip: bool) {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);

        let primitive_type = prim.primitive_type();
        if primitive_type == PrimitiveType::Prohibited {
            return;
        }

        if self.queue_prim != Some(primitive_type) {
            self.queue.clear();
            self.queue_prim = Some(primitive_type);
        }

        self.queue.push(index);
        if self.queue.len() < primitive_type.vertices_per_primitive() {
            return;
        }

        if !skip {
            self.indices.extend_from_slice(&self.queue);
        }

        match primitive_type {
            PrimitiveType::LineStrip | PrimitiveType::TriangleStrip => {
                self.queue.remove(0);
            }
            // Every fan triangle shares the first vertex.
            PrimitiveType::TriangleFan => {
                self.queue.remove(1);
            }
            _ => self.queue.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kick_all(prim: PrimitiveType, count: usize, skip: &[usize]) -> VertexBufferData {
        let mut buffer = VertexBufferData::default();
        buffer.init(2 * count, 4 * count);
        for i in 0..count {
            buffer.kick(GsVertex::default(), GsPrim(prim as u16), skip.contains(&i));
        }
        buffer
    }

    #[test]
    fn triangle_strip_slides() {
        let buffer = kick_all(PrimitiveType::TriangleStrip, 5, &[]);
        assert_eq!(buffer.vertex_tail(), 5);
        assert_eq!(buffer.indices, vec![0, 1, 2, 1, 2, 3, 2, 3, 4]);
    }

    #[test]
    fn skipped_vertex_draws_nothing() {
        let buffer = kick_all(PrimitiveType::TriangleStrip, 6, &[3, 4]);
        assert_eq!(buffer.vertex_tail(), 6);
        assert_eq!(buffer.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn triangle_list_and_fan() {
        let list = kick_all(PrimitiveType::Triangle, 7, &[]);
        assert_eq!(list.indices, vec![0, 1, 2, 3, 4, 5]);

        let fan = kick_all(PrimitiveType::TriangleFan, 5, &[]);
        assert_eq!(fan.indices, vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
    }

    #[test]
    fn points_lines_and_sprites() {
        assert_eq!(kick_all(PrimitiveType::Point, 3, &[1]).indices, vec![0, 2]);
        assert_eq!(kick_all(PrimitiveType::Line, 5, &[]).indices, vec![0, 1, 2, 3]);
        assert_eq!(kick_all(PrimitiveType::LineStrip, 4, &[]).indices, vec![0, 1, 1, 2, 2, 3]);
        assert_eq!(kick_all(PrimitiveType::Sprite, 4, &[]).indices, vec![0, 1, 2, 3]);
        assert!(kick_all(PrimitiveType::Prohibited, 4, &[]).indices.is_empty());
    }
}
