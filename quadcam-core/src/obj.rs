/// Wavefront OBJ reader for quad meshes
use std::fs;
use std::path::Path;

use nalgebra::Point3;
use nom::{
    bytes::complete::{tag, take_while},
    character::complete::{i64 as index, space0, space1},
    combinator::{all_consuming, opt},
    multi::many1,
    number::complete::float,
    sequence::{preceded, terminated},
    IResult,
};
use thiserror::Error;

use crate::geometry::{Face, Mesh};
use crate::texture::Texture;

#[derive(Debug, Error)]
pub enum ObjError {
    #[error("failed to read OBJ file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: malformed {record} record")]
    Syntax { line: usize, record: &'static str },

    #[error("line {line}: face has {count} vertices, only quads are supported")]
    NotAQuad { line: usize, count: usize },

    #[error("line {line}: vertex index {index} is out of range")]
    IndexOutOfRange { line: usize, index: i64 },
}

/// A face as written, before its indices are resolved
struct RawFace {
    line: usize,
    indices: Vec<i64>,
    /// Vertices defined above this face, for relative indices
    defined: usize,
}

/// Parse OBJ text into a quad mesh.
///
/// Only `v` and `f` records are read; normals, texture coordinates, groups and
/// material statements are skipped. `scale` is baked into the vertices and
/// every face gets its own copy of `texture`.
pub fn parse_obj(input: &str, scale: f32, texture: &Texture) -> Result<Mesh, ObjError> {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for (i, raw) in input.lines().enumerate() {
        let line = i + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();

        match content.split_whitespace().next() {
            Some("v") => {
                let (_, v) = all_consuming(vertex_record)(content)
                    .map_err(|_| ObjError::Syntax { line, record: "vertex" })?;
                vertices.push(v * scale);
            }
            Some("f") => {
                let (_, indices) = all_consuming(face_record)(content)
                    .map_err(|_| ObjError::Syntax { line, record: "face" })?;
                if indices.len() != 4 {
                    return Err(ObjError::NotAQuad {
                        line,
                        count: indices.len(),
                    });
                }
                faces.push(RawFace {
                    line,
                    indices,
                    defined: vertices.len(),
                });
            }
            _ => {}
        }
    }

    let mut mesh = Mesh::with_capacity(faces.len());
    for face in faces {
        let mut quad = [Point3::origin(); 4];
        for (slot, &idx) in quad.iter_mut().zip(&face.indices) {
            *slot = resolve(idx, face.defined, &vertices).ok_or(ObjError::IndexOutOfRange {
                line: face.line,
                index: idx,
            })?;
        }
        mesh.add_face(Face::new(quad, texture.clone()));
    }

    tracing::debug!(vertices = vertices.len(), faces = mesh.face_count(), "parsed OBJ mesh");
    Ok(mesh)
}

/// Read and parse an OBJ file from disk
pub fn load_obj(path: impl AsRef<Path>, scale: f32, texture: &Texture) -> Result<Mesh, ObjError> {
    let text = fs::read_to_string(path)?;
    parse_obj(&text, scale, texture)
}

/// 1-based absolute index, or negative index counting back from the last
/// vertex defined so far
fn resolve(idx: i64, defined: usize, vertices: &[Point3<f32>]) -> Option<Point3<f32>> {
    let position = match idx {
        0 => return None,
        i if i > 0 => usize::try_from(i - 1).ok()?,
        i => defined.checked_sub(usize::try_from(i.unsigned_abs()).ok()?)?,
    };
    vertices.get(position).copied()
}

fn vertex_record(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, _) = tag("v")(input)?;
    let (input, x) = preceded(space1, float)(input)?;
    let (input, y) = preceded(space1, float)(input)?;
    let (input, z) = preceded(space1, float)(input)?;
    // Optional homogeneous weight, ignored
    let (input, _) = terminated(opt(preceded(space1, float)), space0)(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn face_record(input: &str) -> IResult<&str, Vec<i64>> {
    let (input, _) = tag("f")(input)?;
    let (input, indices) = many1(preceded(space1, face_vertex))(input)?;
    let (input, _) = space0(input)?;
    Ok((input, indices))
}

/// `v`, `v/vt`, `v//vn` or `v/vt/vn`; only the position index is kept
fn face_vertex(input: &str) -> IResult<&str, i64> {
    let (input, position) = index(input)?;
    let (input, _) = take_while(|c: char| c == '/' || c == '-' || c.is_ascii_digit())(input)?;
    Ok((input, position))
}
