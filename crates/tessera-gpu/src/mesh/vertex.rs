use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;

/// A vertex with a 2-D position.
pub trait Positionable {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, position: Vec2);
}

/// A vertex with a 2-D texture coordinate.
pub trait Texturable {
    fn texture_coordinate(&self) -> Vec2;
    fn set_texture_coordinate(&mut self, uv: Vec2);
}

/// Position-only vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct PositionVertex {
    pub position: [f32; 2],
}

impl PositionVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<PositionVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

impl Positionable for PositionVertex {
    #[inline]
    fn position(&self) -> Vec2 {
        self.position.into()
    }

    #[inline]
    fn set_position(&mut self, position: Vec2) {
        self.position = position.into();
    }
}

/// Position + texture-coordinate vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 2],
    pub texture_coordinate: [f32; 2],
}

impl TexturedVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x2  // texture coordinate
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<TexturedVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

impl Positionable for TexturedVertex {
    #[inline]
    fn position(&self) -> Vec2 {
        self.position.into()
    }

    #[inline]
    fn set_position(&mut self, position: Vec2) {
        self.position = position.into();
    }
}

impl Texturable for TexturedVertex {
    #[inline]
    fn texture_coordinate(&self) -> Vec2 {
        self.texture_coordinate.into()
    }

    #[inline]
    fn set_texture_coordinate(&mut self, uv: Vec2) {
        self.texture_coordinate = uv.into();
    }
}
