//! Ball quad projection
//!
//! Each ball in play becomes an axis-aligned square of side 2r centred on
//! the ball, textured from a 4x4 atlas of 64px tiles. Ball `i` uses tile
//! column `i % 4`, row `i / 4`. Sunk balls are left out.

use glam::Vec2;

use super::vertex::QuadVertex;
use crate::sim::state::Ball;

pub const ATLAS_TILES: usize = 4;
pub const ATLAS_TILE_PX: u32 = 64;
pub const ATLAS_PX: u32 = ATLAS_TILE_PX * ATLAS_TILES as u32;

/// Triangle list for one quad, relative to its first vertex
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Drawable projection of one ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallQuad {
    pub id: usize,
    pub center: Vec2,
    /// Counter-clockwise from bottom-left
    pub corners: [Vec2; 4],
    pub uv_min: Vec2,
    pub uv_max: Vec2,
}

/// UV rectangle (min, max) of ball `id`'s atlas tile. V grows downward.
pub fn atlas_uv(id: usize) -> (Vec2, Vec2) {
    let tile = 1.0 / ATLAS_TILES as f32;
    let col = (id % ATLAS_TILES) as f32;
    let row = ((id / ATLAS_TILES) % ATLAS_TILES) as f32;
    let min = Vec2::new(col * tile, row * tile);
    (min, min + Vec2::splat(tile))
}

impl BallQuad {
    pub fn new(ball: &Ball, radius: f32) -> Self {
        let c = ball.pos;
        let (uv_min, uv_max) = atlas_uv(ball.id);
        Self {
            id: ball.id,
            center: c,
            corners: [
                c + Vec2::new(-radius, -radius),
                c + Vec2::new(radius, -radius),
                c + Vec2::new(radius, radius),
                c + Vec2::new(-radius, radius),
            ],
            uv_min,
            uv_max,
        }
    }

    /// Corner vertices matching [`QUAD_INDICES`]
    pub fn vertices(&self) -> [QuadVertex; 4] {
        let (lo, hi) = (self.uv_min, self.uv_max);
        // Texture rows run top-down, table y runs bottom-up
        let uvs = [
            Vec2::new(lo.x, hi.y),
            Vec2::new(hi.x, hi.y),
            Vec2::new(hi.x, lo.y),
            Vec2::new(lo.x, lo.y),
        ];
        std::array::from_fn(|k| {
            let p = self.corners[k];
            QuadVertex::new(p.x, p.y, uvs[k].x, uvs[k].y)
        })
    }
}

/// Quads for every ball still on the table, in store order
pub fn ball_quads(balls: &[Ball], radius: f32) -> Vec<BallQuad> {
    balls
        .iter()
        .filter(|b| b.in_play())
        .map(|b| BallQuad::new(b, radius))
        .collect()
}

/// Flat vertex and index buffers for a batch of quads
pub fn quad_vertices(quads: &[BallQuad]) -> (Vec<QuadVertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(quads.len() * 4);
    let mut indices = Vec::with_capacity(quads.len() * 6);
    for quad in quads {
        let base = vertices.len() as u16;
        vertices.extend_from_slice(&quad.vertices());
        indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }
    (vertices, indices)
}

/// Flat `[x0, y0, x1, y1, ...]` of balls in play
pub fn ball_positions(balls: &[Ball]) -> Vec<f32> {
    balls
        .iter()
        .filter(|b| b.in_play())
        .flat_map(|b| [b.pos.x, b.pos.y])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atlas_tiles() {
        assert_eq!(atlas_uv(0), (Vec2::ZERO, Vec2::splat(0.25)));
        assert_eq!(atlas_uv(5), (Vec2::new(0.25, 0.25), Vec2::new(0.5, 0.5)));
        assert_eq!(atlas_uv(15), (Vec2::new(0.75, 0.75), Vec2::ONE));
    }

    #[test]
    fn test_sunk_balls_excluded() {
        let mut balls = vec![Ball::new(0, Vec2::ZERO), Ball::new(1, Vec2::X)];
        balls[0].sink();
        let quads = ball_quads(&balls, 0.1);
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].id, 1);
        assert_eq!(ball_positions(&balls), vec![1.0, 0.0]);
    }

    #[test]
    fn test_corners_span_diameter() {
        let quad = BallQuad::new(&Ball::new(3, Vec2::new(0.5, -0.5)), 0.024);
        let size = quad.corners[2] - quad.corners[0];
        assert!((size.x - 0.048).abs() < 1e-6);
        assert!((size.y - 0.048).abs() < 1e-6);
    }

    #[test]
    fn test_index_buffer_offsets() {
        let balls = vec![Ball::new(0, Vec2::ZERO), Ball::new(1, Vec2::ONE)];
        let (vertices, indices) = quad_vertices(&ball_quads(&balls, 0.024));
        assert_eq!(vertices.len(), 8);
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        // Bottom-left corner samples the bottom of the tile
        assert_eq!(vertices[0].uv, [0.0, 0.25]);
    }
}
