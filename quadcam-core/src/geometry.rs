/// Quad meshes and placed objects
use nalgebra::{Point3, Vector3};

use crate::texture::Texture;
use crate::transform::RotationState;

/// Unit cube faces, centered on the origin. Vertex order sets each face's
/// texture orientation.
const UNIT_CUBE: [[[f32; 3]; 4]; 6] = [
    // -z
    [[-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5]],
    // +x
    [[0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [0.5, 0.5, -0.5]],
    // +z
    [[0.5, -0.5, 0.5], [-0.5, -0.5, 0.5], [-0.5, 0.5, 0.5], [0.5, 0.5, 0.5]],
    // -x
    [[-0.5, -0.5, 0.5], [-0.5, -0.5, -0.5], [-0.5, 0.5, -0.5], [-0.5, 0.5, 0.5]],
    // -y
    [[-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, -0.5, -0.5], [-0.5, -0.5, -0.5]],
    // +y
    [[-0.5, 0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5]],
];

/// A planar quadrilateral face with its own texture
#[derive(Debug, Clone)]
pub struct Face {
    pub vertices: [Point3<f32>; 4],
    pub texture: Texture,
}

impl Face {
    pub fn new(vertices: [Point3<f32>; 4], texture: Texture) -> Self {
        Self { vertices, texture }
    }
}

/// A 3D mesh composed of quads
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            faces: Vec::with_capacity(capacity),
        }
    }

    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    /// Build a mesh from unit-space quads, baking `scale` into the vertices.
    /// Each face receives its own copy of `texture`.
    pub fn from_quads(quads: &[[[f32; 3]; 4]], scale: f32, texture: &Texture) -> Self {
        let mut mesh = Self::with_capacity(quads.len());
        for quad in quads {
            let vertices = quad.map(|[x, y, z]| Point3::new(x * scale, y * scale, z * scale));
            mesh.add_face(Face::new(vertices, texture.clone()));
        }
        mesh
    }

    /// Axis-aligned cube with the given edge length, centered on the origin
    pub fn cube(edge: f32, texture: &Texture) -> Self {
        Self::from_quads(&UNIT_CUBE, edge, texture)
    }

    /// Cube with one texture per face, in `-z, +x, +z, -x, -y, +y` order
    pub fn cube_with_textures(edge: f32, textures: [Texture; 6]) -> Self {
        let mut mesh = Self::cube(edge, &Texture::default());
        for (face, texture) in mesh.faces.iter_mut().zip(textures) {
            face.texture = texture;
        }
        mesh
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// A mesh placed in the world
#[derive(Debug, Clone)]
pub struct Object {
    pub mesh: Mesh,
    pub position: Vector3<f32>,
    pub rotation: RotationState,
}

impl Object {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            position: Vector3::zeros(),
            rotation: RotationState::zero(),
        }
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vector3::new(x, y, z);
        self
    }

    pub fn with_rotation(mut self, rotation: RotationState) -> Self {
        self.rotation = rotation;
        self
    }
}
