//! Table boundary geometry
//!
//! The playing surface is a polygon described by a vertex list and an edge
//! list. Each edge carries a normal computed once at load time as the
//! perpendicular-left rotation of its direction, so with counter-clockwise
//! winding every normal faces the playing surface. A ball whose velocity has
//! a negative dot product with an edge normal is moving toward that edge.
//!
//! Geometry text format (one record per line, OBJ-like):
//!
//! ```text
//! v x y [ignored...]      vertex
//! f i j k                 surface triangle (not used for rails)
//! f i j                   boundary edge, 1-based vertex indices
//! f i j pocket|rail       boundary edge with an explicit kind
//! ```
//!
//! Pocket classification follows the asset convention (edge index % 4 == 1)
//! unless any edge carries an explicit tag, in which case tags win and
//! untagged edges are rails.

use std::fmt;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::vector;
use crate::consts::{HEAD_STRING_FRACTION, HEAD_STRING_X, TABLE_HALF_LENGTH, TABLE_HALF_WIDTH};

/// What happens when a ball reaches an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Cushion: the ball reflects
    Rail,
    /// Pocket mouth: the ball is sunk
    Pocket,
}

/// Errors raised while loading table geometry
#[derive(Debug)]
pub enum GeometryError {
    Io { path: String, source: std::io::Error },
    Parse { line: usize, message: String },
    IndexOutOfRange { line: usize, index: usize, len: usize },
    /// Edge refers to a vertex that does not exist (0-based index)
    EdgeIndexOutOfRange { edge: usize, index: usize, len: usize },
    KindCountMismatch { edges: usize, kinds: usize },
    DegenerateEdge { edge: usize },
    /// Edges wind clockwise, so normals would face away from the surface
    Clockwise,
    NoEdges,
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::Io { path, source } => write!(f, "cannot read {}: {}", path, source),
            GeometryError::Parse { line, message } => write!(f, "line {}: {}", line, message),
            GeometryError::IndexOutOfRange { line, index, len } => write!(
                f,
                "line {}: vertex index {} out of range (1..={})",
                line, index, len
            ),
            GeometryError::EdgeIndexOutOfRange { edge, index, len } => write!(
                f,
                "edge {} uses vertex {} but there are only {}",
                edge, index, len
            ),
            GeometryError::KindCountMismatch { edges, kinds } => {
                write!(f, "{} edge kinds given for {} edges", kinds, edges)
            }
            GeometryError::DegenerateEdge { edge } => {
                write!(f, "edge {} has zero or non-finite length", edge)
            }
            GeometryError::Clockwise => write!(f, "boundary winds clockwise"),
            GeometryError::NoEdges => write!(f, "geometry contains no boundary edges"),
        }
    }
}

impl std::error::Error for GeometryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeometryError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Immutable table boundary: vertices, edges, per-edge normals and kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableBoundary {
    vertices: Vec<Vec2>,
    edges: Vec<[usize; 2]>,
    normals: Vec<Vec2>,
    kinds: Vec<EdgeKind>,
    triangles: Vec<[usize; 3]>,
}

/// Asset convention: every fourth edge, starting at edge 1, is a pocket mouth
#[inline]
pub fn conventional_edge_kind(edge: usize) -> EdgeKind {
    if edge % 4 == 1 { EdgeKind::Pocket } else { EdgeKind::Rail }
}

impl TableBoundary {
    /// Build a boundary from raw parts, deriving normals.
    ///
    /// `kinds` overrides the asset convention when given; it must have one
    /// entry per edge. Edges must wind counter-clockwise; an open chain with
    /// no enclosed area is accepted.
    pub fn from_parts(
        vertices: Vec<Vec2>,
        edges: Vec<[usize; 2]>,
        kinds: Option<Vec<EdgeKind>>,
    ) -> Result<Self, GeometryError> {
        let len = vertices.len();
        let mut normals = Vec::with_capacity(edges.len());
        // Twice the signed enclosed area
        let mut winding = 0.0;
        for (k, &[a, b]) in edges.iter().enumerate() {
            if let Some(&index) = [a, b].iter().find(|&&i| i >= len) {
                return Err(GeometryError::EdgeIndexOutOfRange { edge: k, index, len });
            }
            let (start, end) = (vertices[a], vertices[b]);
            let direction = vector::subtract(end, start);
            if !direction.is_finite() || direction.length_squared() == 0.0 {
                return Err(GeometryError::DegenerateEdge { edge: k });
            }
            winding += start.perp_dot(end);
            normals.push(vector::perp_left(direction));
        }
        if winding < 0.0 {
            return Err(GeometryError::Clockwise);
        }

        let kinds = match kinds {
            Some(kinds) if kinds.len() != edges.len() => {
                return Err(GeometryError::KindCountMismatch {
                    edges: edges.len(),
                    kinds: kinds.len(),
                });
            }
            Some(kinds) => kinds,
            None => (0..edges.len()).map(conventional_edge_kind).collect(),
        };

        Ok(Self {
            vertices,
            edges,
            normals,
            kinds,
            triangles: Vec::new(),
        })
    }

    /// A table with no boundary at all (open plane)
    pub fn open() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            normals: Vec::new(),
            kinds: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Axis-aligned square of the given half-width, counter-clockwise.
    ///
    /// Edges: 0 bottom, 1 right, 2 top, 3 left. With `kinds == None` the
    /// asset convention makes the right edge a pocket. A zero or non-finite
    /// half-width is an error.
    pub fn square(half_width: f32, kinds: Option<[EdgeKind; 4]>) -> Result<Self, GeometryError> {
        let w = half_width;
        let vertices = vec![
            Vec2::new(-w, -w),
            Vec2::new(w, -w),
            Vec2::new(w, w),
            Vec2::new(-w, w),
        ];
        let edges = vec![[0, 1], [1, 2], [2, 3], [3, 0]];
        Self::from_parts(vertices, edges, kinds.map(|k| k.to_vec()))
    }

    /// Parse geometry text
    pub fn parse(source: &str) -> Result<Self, GeometryError> {
        let mut vertices = Vec::new();
        // (line, edge, explicit kind)
        let mut raw_edges: Vec<(usize, [usize; 2], Option<EdgeKind>)> = Vec::new();
        let mut raw_triangles: Vec<(usize, [usize; 3])> = Vec::new();

        for (i, text) in source.lines().enumerate() {
            let line = i + 1;
            let text = text.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            let mut tokens = text.split_whitespace();
            match tokens.next() {
                Some("v") => {
                    let x = parse_float(tokens.next(), line, "x")?;
                    let y = parse_float(tokens.next(), line, "y")?;
                    vertices.push(Vec2::new(x, y));
                }
                Some("f") => {
                    let rest: Vec<&str> = tokens.collect();
                    match rest.as_slice() {
                        [a, b, c] if parse_index(c, line).is_ok() => {
                            let tri = [
                                parse_index(a, line)?,
                                parse_index(b, line)?,
                                parse_index(c, line)?,
                            ];
                            raw_triangles.push((line, tri));
                        }
                        [a, b, tag] => {
                            let kind = match *tag {
                                "pocket" => EdgeKind::Pocket,
                                "rail" => EdgeKind::Rail,
                                other => {
                                    return Err(GeometryError::Parse {
                                        line,
                                        message: format!("unknown face token '{}'", other),
                                    });
                                }
                            };
                            let edge = [parse_index(a, line)?, parse_index(b, line)?];
                            raw_edges.push((line, edge, Some(kind)));
                        }
                        [a, b] => {
                            let edge = [parse_index(a, line)?, parse_index(b, line)?];
                            raw_edges.push((line, edge, None));
                        }
                        _ => {
                            return Err(GeometryError::Parse {
                                line,
                                message: format!("face needs 2 or 3 indices, got {}", rest.len()),
                            });
                        }
                    }
                }
                // vt, vn, o, g, s, usemtl, mtllib...
                _ => {}
            }
        }

        if raw_edges.is_empty() {
            return Err(GeometryError::NoEdges);
        }

        let len = vertices.len();
        let check = |line: usize, index: usize| -> Result<usize, GeometryError> {
            if index >= len {
                Err(GeometryError::IndexOutOfRange {
                    line,
                    index: index + 1,
                    len,
                })
            } else {
                Ok(index)
            }
        };

        let mut edges = Vec::with_capacity(raw_edges.len());
        for &(line, [a, b], _) in &raw_edges {
            edges.push([check(line, a)?, check(line, b)?]);
        }
        let mut triangles = Vec::with_capacity(raw_triangles.len());
        for &(line, [a, b, c]) in &raw_triangles {
            triangles.push([check(line, a)?, check(line, b)?, check(line, c)?]);
        }

        let tagged = raw_edges.iter().any(|(_, _, kind)| kind.is_some());
        let kinds = tagged.then(|| {
            raw_edges
                .iter()
                .map(|(_, _, kind)| kind.unwrap_or(EdgeKind::Rail))
                .collect()
        });

        let mut table = Self::from_parts(vertices, edges, kinds)?;
        table.triangles = triangles;

        log::info!(
            "Loaded table: {} vertices, {} edges ({} pockets, {} classification)",
            table.vertices.len(),
            table.edges.len(),
            table.pocket_count(),
            if tagged { "explicit" } else { "asset convention" }
        );
        Ok(table)
    }

    /// Read and parse a geometry file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GeometryError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| GeometryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&source)
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Endpoints of edge `k`
    #[inline]
    pub fn edge(&self, k: usize) -> (Vec2, Vec2) {
        let [a, b] = self.edges[k];
        (self.vertices[a], self.vertices[b])
    }

    /// Normal of edge `k` (unnormalized, faces the playing surface)
    #[inline]
    pub fn normal(&self, k: usize) -> Vec2 {
        self.normals[k]
    }

    #[inline]
    pub fn kind(&self, k: usize) -> EdgeKind {
        self.kinds[k]
    }

    pub fn pocket_count(&self) -> usize {
        self.kinds.iter().filter(|&&k| k == EdgeKind::Pocket).count()
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Surface triangles, passed through for the renderer
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Axis-aligned bounds (min, max) of all vertices
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    /// Bounds of the axis-aligned rail edges, the cushions proper. Pocket
    /// jaws are slanted and stick out past them, so they are left out.
    pub fn cushion_bounds(&self) -> Option<(Vec2, Vec2)> {
        let (lo, hi) = (0..self.edge_count())
            .filter(|&k| self.kind(k) == EdgeKind::Rail)
            .map(|k| self.edge(k))
            .filter(|(a, b)| a.x == b.x || a.y == b.y)
            .flat_map(|(a, b)| [a, b])
            .fold((Vec2::INFINITY, Vec2::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        (hi.x > lo.x && hi.y > lo.y).then_some((lo, hi))
    }
}

fn parse_float(token: Option<&str>, line: usize, what: &str) -> Result<f32, GeometryError> {
    let token = token.ok_or_else(|| GeometryError::Parse {
        line,
        message: format!("missing vertex {}", what),
    })?;
    token.parse::<f32>().map_err(|_| GeometryError::Parse {
        line,
        message: format!("bad vertex {} '{}'", what, token),
    })
}

/// 1-based OBJ index (optionally `i/t/n`) to 0-based
fn parse_index(token: &str, line: usize) -> Result<usize, GeometryError> {
    let head = token.split('/').next().unwrap_or(token);
    match head.parse::<usize>() {
        Ok(0) => Err(GeometryError::IndexOutOfRange {
            line,
            index: 0,
            len: 0,
        }),
        Ok(i) => Ok(i - 1),
        Err(_) => Err(GeometryError::Parse {
            line,
            message: format!("bad vertex index '{}'", token),
        }),
    }
}

/// Legal cue-ball placement rectangle (behind the head string)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kitchen {
    pub min: Vec2,
    pub max: Vec2,
}

impl Kitchen {
    /// Kitchen for a table with the given playing-surface bounds: from the
    /// head cushion to the head string, inset by one ball radius.
    pub fn behind_head_string(bounds: (Vec2, Vec2), head_string_x: f32, radius: f32) -> Self {
        let (lo, hi) = bounds;
        Self {
            min: Vec2::new(lo.x + radius, lo.y + radius),
            max: Vec2::new(head_string_x, hi.y - radius),
        }
    }

    /// Kitchen for a loaded table: the head string sits a quarter of the way
    /// along the cushions. Tables without axis-aligned cushions fall back to
    /// the default playing surface.
    pub fn for_table(table: &TableBoundary, radius: f32) -> Self {
        match table.cushion_bounds() {
            Some((lo, hi)) => {
                let head_string_x = lo.x + (hi.x - lo.x) * HEAD_STRING_FRACTION;
                Self::behind_head_string((lo, hi), head_string_x, radius)
            }
            None => {
                log::debug!("No axis-aligned cushions, using the default kitchen");
                Self::behind_head_string(
                    (
                        Vec2::new(-TABLE_HALF_LENGTH, -TABLE_HALF_WIDTH),
                        Vec2::new(TABLE_HALF_LENGTH, TABLE_HALF_WIDTH),
                    ),
                    HEAD_STRING_X,
                    radius,
                )
            }
        }
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
    }
}
