use bytemuck::Pod;

use crate::coords::{Rect, Vec2};
use crate::error::{Error, Result};

use super::{GridIndex, IndexWidth, MeshIndices, Positionable, Texturable};

/// Grid resolution in cells (not vertices). Both axes must be at least 1.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct GridDimensions {
    pub cells_x: u32,
    pub cells_y: u32,
}

impl GridDimensions {
    #[inline]
    pub const fn new(cells_x: u32, cells_y: u32) -> Self {
        Self { cells_x, cells_y }
    }

    /// `(cells_x + 1) * (cells_y + 1)`.
    #[inline]
    pub fn vertex_count(self) -> u64 {
        (u64::from(self.cells_x) + 1) * (u64::from(self.cells_y) + 1)
    }

    /// `cells_x * cells_y * 6`.
    #[inline]
    pub fn index_count(self) -> u64 {
        u64::from(self.cells_x) * u64::from(self.cells_y) * 6
    }
}

/// Mirroring applied to the texture-coordinate grid.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct TextureFlip {
    pub horizontal: bool,
    pub vertical: bool,
}

/// Tesselated rectangle: row-major vertex grid plus a triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMesh<V> {
    vertices: Vec<V>,
    indices: MeshIndices,
}

impl<V: Positionable + Default> GridMesh<V> {
    /// Tesselates `frame` into `dimensions` cells.
    pub fn generate(frame: Rect, dimensions: GridDimensions) -> Result<Self> {
        let vertex_count = validate(frame, dimensions)?;

        let vertices = grid_coordinates(frame, dimensions, TextureFlip::default())
            .map(|position| {
                let mut vertex = V::default();
                vertex.set_position(position);
                vertex
            })
            .collect();

        let indices = match IndexWidth::select(vertex_count) {
            IndexWidth::Narrow => build_indices::<u16>(dimensions)?,
            IndexWidth::Wide => build_indices::<u32>(dimensions)?,
        };

        log::trace!(
            "grid mesh {}x{}: {} vertices, {} {:?} indices",
            dimensions.cells_x,
            dimensions.cells_y,
            vertex_count,
            indices.len(),
            indices.width()
        );

        Ok(Self { vertices, indices })
    }
}

impl<V: Positionable + Texturable + Default> GridMesh<V> {
    /// Tesselates `frame`, assigning texture coordinates from the same walk
    /// over `texture_frame`.
    pub fn generate_textured(
        frame: Rect,
        texture_frame: Rect,
        dimensions: GridDimensions,
    ) -> Result<Self> {
        Self::generate_textured_with(frame, texture_frame, dimensions, TextureFlip::default())
    }

    /// Like [`GridMesh::generate_textured`], mirroring the texture-coordinate
    /// grid. Positions are never flipped.
    pub fn generate_textured_with(
        frame: Rect,
        texture_frame: Rect,
        dimensions: GridDimensions,
        flip: TextureFlip,
    ) -> Result<Self> {
        validate(frame, dimensions)?;
        if !texture_frame.is_valid_frame() {
            return Err(Error::InvalidFrame(texture_frame));
        }
        let mut mesh = Self::generate(frame, dimensions)?;

        // Matched by sequence position: both walks are row-major, j outer.
        for (vertex, uv) in mesh
            .vertices
            .iter_mut()
            .zip(grid_coordinates(texture_frame, dimensions, flip))
        {
            vertex.set_texture_coordinate(uv);
        }
        Ok(mesh)
    }
}

impl<V> GridMesh<V> {
    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    pub fn indices(&self) -> &MeshIndices {
        &self.indices
    }

    pub fn into_parts(self) -> (Vec<V>, MeshIndices) {
        (self.vertices, self.indices)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn index_width(&self) -> IndexWidth {
        self.indices.width()
    }

    /// Index-format tag for binding the uploaded index buffer.
    #[inline]
    pub fn index_format(&self) -> wgpu::IndexFormat {
        self.index_width().index_format()
    }

    /// Size of the vertex array in bytes.
    #[inline]
    pub fn vertex_data_size(&self) -> usize {
        self.vertices.len() * size_of::<V>()
    }

    /// Size of the index array in bytes.
    #[inline]
    pub fn index_data_size(&self) -> usize {
        self.indices.len() * self.index_width().bytes_per_index()
    }

    pub fn index_bytes(&self) -> &[u8] {
        self.indices.as_bytes()
    }
}

impl<V: Pod> GridMesh<V> {
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Checks the request and returns the vertex count.
fn validate(frame: Rect, dimensions: GridDimensions) -> Result<usize> {
    let invalid = || Error::InvalidDimensions {
        cells_x: dimensions.cells_x,
        cells_y: dimensions.cells_y,
    };

    if dimensions.cells_x < 1 || dimensions.cells_y < 1 {
        return Err(invalid());
    }
    if !frame.is_valid_frame() {
        return Err(Error::InvalidFrame(frame));
    }

    // The last vertex must stay addressable by a 32-bit index.
    let vertex_count = dimensions.vertex_count();
    if vertex_count > 1 << 32 {
        return Err(invalid());
    }
    usize::try_from(vertex_count).map_err(|_| invalid())
}

/// Row-major walk over the `(cells_x + 1) x (cells_y + 1)` lattice of `frame`.
fn grid_coordinates(
    frame: Rect,
    dimensions: GridDimensions,
    flip: TextureFlip,
) -> impl Iterator<Item = Vec2> {
    let GridDimensions { cells_x, cells_y } = dimensions;
    let step = Vec2::new(
        frame.size.x / cells_x as f32,
        frame.size.y / cells_y as f32,
    );

    (0..=cells_y).flat_map(move |j| {
        let j = if flip.vertical { cells_y - j } else { j };
        (0..=cells_x).map(move |i| {
            let i = if flip.horizontal { cells_x - i } else { i };
            frame.origin + step.scale(Vec2::new(i as f32, j as f32))
        })
    })
}

fn build_indices<I: GridIndex>(dimensions: GridDimensions) -> Result<MeshIndices> {
    grid_indices::<I>(dimensions).map(I::into_mesh_indices)
}

/// Two triangles per cell, computed in `I`:
/// `(idx, idx+stride+1, idx+1)` and `(idx, idx+stride, idx+stride+1)` with
/// `idx = stride*y + x` and `stride = cells_x + 1`.
fn grid_indices<I: GridIndex>(dimensions: GridDimensions) -> Result<Vec<I>> {
    let overflow = || Error::InvalidDimensions {
        cells_x: dimensions.cells_x,
        cells_y: dimensions.cells_y,
    };
    let to_index = |v: u32| I::try_from(v).map_err(|_| overflow());
    let add = |a: I, b: I| a.checked_add(&b).ok_or_else(overflow);

    let one = I::one();
    let stride = to_index(dimensions.cells_x.checked_add(1).ok_or_else(overflow)?)?;
    let stride_plus_one = add(stride, one)?;

    let count = usize::try_from(dimensions.index_count()).map_err(|_| overflow())?;
    let mut indices = Vec::with_capacity(count);

    for y in 0..dimensions.cells_y {
        let row = stride.checked_mul(&to_index(y)?).ok_or_else(overflow)?;
        for x in 0..dimensions.cells_x {
            let idx = add(row, to_index(x)?)?;
            let right = add(idx, one)?;
            let below = add(idx, stride)?;
            let below_right = add(idx, stride_plus_one)?;

            indices.extend_from_slice(&[idx, below_right, right]);
            indices.extend_from_slice(&[idx, below, below_right]);
        }
    }

    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{PositionVertex, TexturedVertex};

    fn positions<V: Positionable>(mesh: &GridMesh<V>) -> Vec<(f32, f32)> {
        mesh.vertices().iter().map(|v| (v.position().x, v.position().y)).collect()
    }

    fn uvs(mesh: &GridMesh<TexturedVertex>) -> Vec<(f32, f32)> {
        mesh.vertices()
            .iter()
            .map(|v| (v.texture_coordinate[0], v.texture_coordinate[1]))
            .collect()
    }

    // ── counts and layout ─────────────────────────────────────────────────

    #[test]
    fn two_by_one_counts() {
        let mesh = GridMesh::<PositionVertex>::generate(Rect::unit(), GridDimensions::new(2, 1)).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.index_count(), 12);
        assert_eq!(mesh.index_width(), IndexWidth::Narrow);
    }

    #[test]
    fn single_cell_vertices_and_winding() {
        let mesh =
            GridMesh::<PositionVertex>::generate(Rect::new(0.0, 0.0, 2.0, 2.0), GridDimensions::new(1, 1))
                .unwrap();
        assert_eq!(positions(&mesh), vec![(0.0, 0.0), (2.0, 0.0), (0.0, 2.0), (2.0, 2.0)]);
        assert_eq!(mesh.indices(), &MeshIndices::Narrow(vec![0, 3, 1, 0, 2, 3]));
    }

    #[test]
    fn vertices_are_row_major_with_origin_offset() {
        let mesh =
            GridMesh::<PositionVertex>::generate(Rect::new(10.0, 20.0, 4.0, 2.0), GridDimensions::new(2, 1))
                .unwrap();
        assert_eq!(
            positions(&mesh),
            vec![(10.0, 20.0), (12.0, 20.0), (14.0, 20.0), (10.0, 22.0), (12.0, 22.0), (14.0, 22.0)]
        );
    }

    #[test]
    fn second_row_cells_use_stride() {
        let mesh = GridMesh::<PositionVertex>::generate(Rect::unit(), GridDimensions::new(2, 2)).unwrap();
        // Cell (1, 1): idx = 3 * 1 + 1 = 4, stride = 3.
        let cell: Vec<u32> = mesh.indices().iter().skip(3 * 6).take(6).collect();
        assert_eq!(cell, vec![4, 8, 5, 4, 7, 8]);
    }

    #[test]
    fn every_triangle_has_the_same_winding() {
        let mesh =
            GridMesh::<PositionVertex>::generate(Rect::new(-1.0, -1.0, 3.0, 2.0), GridDimensions::new(4, 3))
                .unwrap();
        let p: Vec<Vec2> = mesh.vertices().iter().map(|v| v.position()).collect();
        let idx: Vec<u32> = mesh.indices().iter().collect();
        let signs: Vec<bool> = idx
            .chunks_exact(3)
            .map(|t| {
                let (a, b, c) = (p[t[0] as usize], p[t[1] as usize], p[t[2] as usize]);
                let (ab, ac) = (b - a, c - a);
                ab.x * ac.y - ab.y * ac.x > 0.0
            })
            .collect();
        assert!(signs.iter().all(|&s| s == signs[0]));
    }

    // ── texture coordinates ───────────────────────────────────────────────

    #[test]
    fn textured_walk_is_congruent_with_positions() {
        let mesh = GridMesh::<TexturedVertex>::generate_textured(
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Rect::unit(),
            GridDimensions::new(2, 1),
        )
        .unwrap();
        assert_eq!(
            uvs(&mesh),
            vec![(0.0, 0.0), (0.5, 0.0), (1.0, 0.0), (0.0, 1.0), (0.5, 1.0), (1.0, 1.0)]
        );
        assert_eq!(mesh.vertices()[4].position, [50.0, 50.0]);
    }

    #[test]
    fn flipped_texture_grid_keeps_positions() {
        let flip = TextureFlip { horizontal: true, vertical: true };
        let mesh = GridMesh::<TexturedVertex>::generate_textured_with(
            Rect::new(0.0, 0.0, 2.0, 2.0),
            Rect::unit(),
            GridDimensions::new(1, 1),
            flip,
        )
        .unwrap();
        assert_eq!(positions(&mesh), vec![(0.0, 0.0), (2.0, 0.0), (0.0, 2.0), (2.0, 2.0)]);
        assert_eq!(uvs(&mesh), vec![(1.0, 1.0), (0.0, 1.0), (1.0, 0.0), (0.0, 0.0)]);
    }

    #[test]
    fn vertical_flip_only_reverses_rows() {
        let flip = TextureFlip { horizontal: false, vertical: true };
        let mesh = GridMesh::<TexturedVertex>::generate_textured_with(
            Rect::unit(),
            Rect::unit(),
            GridDimensions::new(1, 1),
            flip,
        )
        .unwrap();
        assert_eq!(uvs(&mesh), vec![(0.0, 1.0), (1.0, 1.0), (0.0, 0.0), (1.0, 0.0)]);
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn zero_cells_is_invalid() {
        for dims in [GridDimensions::new(0, 1), GridDimensions::new(1, 0), GridDimensions::new(0, 0)] {
            assert!(matches!(
                GridMesh::<PositionVertex>::generate(Rect::unit(), dims),
                Err(Error::InvalidDimensions { .. })
            ));
        }
    }

    #[test]
    fn negative_frame_is_invalid() {
        assert!(matches!(
            GridMesh::<PositionVertex>::generate(Rect::new(0.0, 0.0, -1.0, 1.0), GridDimensions::new(1, 1)),
            Err(Error::InvalidFrame(_))
        ));
        assert!(matches!(
            GridMesh::<TexturedVertex>::generate_textured(
                Rect::unit(),
                Rect::new(0.0, 0.0, 1.0, -1.0),
                GridDimensions::new(1, 1)
            ),
            Err(Error::InvalidFrame(_))
        ));
    }

    #[test]
    fn dimensions_are_checked_before_the_texture_frame() {
        let result = GridMesh::<TexturedVertex>::generate_textured(
            Rect::unit(),
            Rect::new(0.0, 0.0, f32::NAN, 1.0),
            GridDimensions::new(0, 2),
        );
        assert!(matches!(result, Err(Error::InvalidDimensions { cells_x: 0, cells_y: 2 })));
    }

    #[test]
    fn unindexable_grid_is_invalid() {
        assert!(matches!(
            validate(Rect::unit(), GridDimensions::new(u32::MAX, 1)),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    // ── index width ───────────────────────────────────────────────────────

    #[test]
    fn largest_narrow_grid_stays_narrow() {
        // 256 x 256 = 65536 vertices.
        let mesh = GridMesh::<PositionVertex>::generate(Rect::unit(), GridDimensions::new(255, 255)).unwrap();
        assert_eq!(mesh.vertex_count(), 65536);
        assert_eq!(mesh.index_width(), IndexWidth::Narrow);
        assert_eq!(mesh.indices().iter().max(), Some(65535));
        assert_eq!(mesh.index_data_size(), mesh.index_count() * 2);
    }

    #[test]
    fn one_more_column_goes_wide() {
        // 257 x 256 = 65792 vertices.
        let mesh = GridMesh::<PositionVertex>::generate(Rect::unit(), GridDimensions::new(256, 255)).unwrap();
        assert_eq!(mesh.index_width(), IndexWidth::Wide);
        assert_eq!(mesh.index_format(), wgpu::IndexFormat::Uint32);
        assert_eq!(mesh.indices().iter().max(), Some(65791));
    }

    #[test]
    fn narrow_and_wide_paths_agree() {
        let dims = GridDimensions::new(7, 5);
        let narrow: Vec<u16> = grid_indices(dims).unwrap();
        let wide: Vec<u32> = grid_indices(dims).unwrap();
        assert!(narrow.iter().map(|&i| u32::from(i)).eq(wide.iter().copied()));
    }

    #[test]
    fn narrow_arithmetic_reports_overflow_instead_of_wrapping() {
        // Far too many vertices for 16 bits: the narrow path must fail, not wrap.
        assert!(grid_indices::<u16>(GridDimensions::new(300, 300)).is_err());
    }

    #[test]
    fn byte_sizes() {
        let mesh = GridMesh::<TexturedVertex>::generate_textured(
            Rect::unit(),
            Rect::unit(),
            GridDimensions::new(1, 1),
        )
        .unwrap();
        assert_eq!(mesh.vertex_data_size(), 4 * 16);
        assert_eq!(mesh.vertex_bytes().len(), 64);
        assert_eq!(mesh.index_bytes().len(), mesh.index_data_size());
    }
}
