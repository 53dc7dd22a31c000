use drift_common::Vec2;

/// Edge length of a grid cell, in canvas pixels. Also the neighbour radius.
pub const CELL_SIZE: f32 = 50.0;

/// Uniform bucket grid over the canvas for approximate neighbour queries.
///
/// Rebuilt from scratch every frame. Buckets are stored row-major and keep
/// particles in insertion order.
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f32,
    inv_cell_size: f32,
    dim_x: u32,
    dim_y: u32,
    cells: Vec<Vec<u32>>,
}

impl SpatialHash {
    /// Grid covering `[0, width] x [0, height]` with the default cell size.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_cell_size(width, height, CELL_SIZE)
    }

    pub fn with_cell_size(width: u32, height: u32, cell_size: f32) -> Self {
        let inv_cell_size = 1.0 / cell_size;
        // +1 so positions sitting exactly on the far edge get their own cell
        let dim_x = (width as f32 * inv_cell_size).floor() as u32 + 1;
        let dim_y = (height as f32 * inv_cell_size).floor() as u32 + 1;
        SpatialHash {
            cell_size,
            inv_cell_size,
            dim_x,
            dim_y,
            cells: vec![Vec::new(); (dim_x * dim_y) as usize],
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Discretized (cellX, cellY) of a position.
    #[inline(always)]
    pub fn cell_coords(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x * self.inv_cell_size).floor() as i32,
            (pos.y * self.inv_cell_size).floor() as i32,
        )
    }

    // Row-major bucket index, clamped onto the grid.
    #[inline(always)]
    fn bucket_idx(&self, pos: Vec2) -> usize {
        let (cx, cy) = self.cell_coords(pos);
        let clamped_x = cx.clamp(0, self.dim_x as i32 - 1) as u32;
        let clamped_y = cy.clamp(0, self.dim_y as i32 - 1) as u32;
        (clamped_y * self.dim_x + clamped_x) as usize
    }

    /// Empties every bucket, keeping allocations for the next frame.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| cell.clear());
    }

    pub fn insert(&mut self, particle_idx: u32, pos: Vec2) {
        let idx = self.bucket_idx(pos);
        self.cells[idx].push(particle_idx);
    }

    /// Clears the grid and inserts every position, index = slice position.
    pub fn rebuild(&mut self, positions: &[Vec2]) {
        self.clear();
        for (idx, pos) in positions.iter().enumerate() {
            self.insert(idx as u32, *pos);
        }
    }

    /// Number of particles currently bucketed.
    pub fn len(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Vec::is_empty)
    }

    /// Calls `f` for every other particle in the 3x3 cell neighbourhood of
    /// `pos` that lies strictly within one cell size (and not on top of it).
    /// Stops early when `f` returns `false`. The neighbourhood does not wrap.
    pub fn for_each_neighbor<F>(&self, particle_idx: u32, pos: Vec2, positions: &[Vec2], mut f: F)
    where
        F: FnMut(u32) -> bool,
    {
        let max_dist_sq = self.cell_size * self.cell_size;
        let (center_x, center_y) = self.cell_coords(pos);

        for dy in -1..=1 {
            for dx in -1..=1 {
                let check_x = center_x + dx;
                let check_y = center_y + dy;
                if check_x < 0 || check_x >= self.dim_x as i32 || check_y < 0 || check_y >= self.dim_y as i32 {
                    continue;
                }
                let grid_idx = (check_y as u32 * self.dim_x + check_x as u32) as usize;

                for &neighbor_idx in &self.cells[grid_idx] {
                    if neighbor_idx == particle_idx {
                        continue;
                    }
                    let Some(neighbor_pos) = positions.get(neighbor_idx as usize) else {
                        log::error!(
                            "Neighbor index {} out of bounds during search for particle {}.",
                            neighbor_idx, particle_idx
                        );
                        continue;
                    };
                    let dist_sq = pos.distance_squared(*neighbor_pos);
                    if dist_sq > 0.0 && dist_sq < max_dist_sq && !f(neighbor_idx) {
                        return;
                    }
                }
            }
        }
    }

    /// Collects the neighbours of `particle_idx` (see [`Self::for_each_neighbor`]).
    pub fn query_neighbors(&self, particle_idx: u32, positions: &[Vec2]) -> Vec<u32> {
        let mut found = Vec::new();
        if let Some(pos) = positions.get(particle_idx as usize) {
            self.for_each_neighbor(particle_idx, *pos, positions, |idx| {
                found.push(idx);
                true
            });
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(positions: &[Vec2]) -> SpatialHash {
        let mut grid = SpatialHash::new(900, 900);
        grid.rebuild(positions);
        grid
    }

    #[test]
    fn finds_close_particles_across_cell_borders() {
        let positions = vec![Vec2::new(49.0, 49.0), Vec2::new(51.0, 51.0), Vec2::new(300.0, 300.0)];
        let grid = grid_with(&positions);
        assert_eq!(grid.query_neighbors(0, &positions), vec![1]);
        assert_eq!(grid.query_neighbors(1, &positions), vec![0]);
        assert!(grid.query_neighbors(2, &positions).is_empty());
    }

    #[test]
    fn excludes_self_coincident_and_far_particles() {
        let positions = vec![
            Vec2::new(100.0, 100.0),
            Vec2::new(100.0, 100.0), // same spot, distance 0
            Vec2::new(149.0, 100.0), // 49 away
            Vec2::new(100.0, 150.0), // exactly one cell size away
        ];
        let grid = grid_with(&positions);
        assert_eq!(grid.query_neighbors(0, &positions), vec![2]);
    }

    #[test]
    fn neighbourhood_does_not_wrap() {
        let positions = vec![Vec2::new(1.0, 450.0), Vec2::new(899.0, 450.0)];
        let grid = grid_with(&positions);
        assert!(grid.query_neighbors(0, &positions).is_empty());
    }

    #[test]
    fn clear_and_rebuild_reset_contents() {
        let positions = vec![Vec2::new(10.0, 10.0), Vec2::new(900.0, 900.0)];
        let mut grid = grid_with(&positions);
        assert_eq!(grid.len(), 2);
        grid.clear();
        assert!(grid.is_empty());
        grid.rebuild(&positions[..1]);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn early_stop_is_honoured() {
        let positions: Vec<Vec2> = (0..10).map(|i| Vec2::new(200.0 + i as f32, 200.0)).collect();
        let grid = grid_with(&positions);
        let mut seen = 0;
        grid.for_each_neighbor(0, positions[0], &positions, |_| {
            seen += 1;
            seen < 3
        });
        assert_eq!(seen, 3);
    }

    #[test]
    fn cell_coords_floor_positions() {
        let grid = SpatialHash::new(900, 900);
        assert_eq!(grid.cell_coords(Vec2::new(0.0, 49.999)), (0, 0));
        assert_eq!(grid.cell_coords(Vec2::new(50.0, 899.0)), (1, 17));
        assert_eq!(grid.cell_coords(Vec2::new(900.0, 900.0)), (18, 18));
    }
}
