//! Toroidal lattice of cells and Manhattan-radius neighborhoods.
//!
//! The grid wraps in both directions, so every coordinate has a full
//! neighborhood and no query can go out of bounds.

use crate::cell::{Cell, HealthState};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Integer lattice coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Precomputed von Neumann neighborhood offsets for one radius on one grid.
///
/// Offsets are stored already reduced modulo the grid size and
/// deduplicated, so on a torus smaller than the neighborhood each distinct
/// neighbor appears once and the center never appears. A torus is
/// translation invariant, so one stencil serves every position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stencil {
    radius: u32,
    offsets: Vec<(usize, usize)>,
}

impl Stencil {
    /// Builds the stencil for `|dx| + |dy| <= radius`, excluding the center.
    pub fn von_neumann(radius: u32, width: usize, height: usize) -> Self {
        // No cell is further than this from any other on the torus
        let reach = (width / 2 + height / 2) as i64;
        let r = i64::from(radius).min(reach);
        let (w, h) = (width as i64, height as i64);

        let mut seen = HashSet::new();
        let mut offsets = Vec::new();

        for dx in -r..=r {
            let span = r - dx.abs();
            for dy in -span..=span {
                let offset = (dx.rem_euclid(w) as usize, dy.rem_euclid(h) as usize);
                if offset == (0, 0) {
                    continue;
                }
                if seen.insert(offset) {
                    offsets.push(offset);
                }
            }
        }

        Self { radius, offsets }
    }

    /// Radius this stencil was built for.
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Number of neighbors every cell has under this stencil.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Fixed width × height torus owning one [`Cell`] per coordinate.
///
/// Cells are stored row-major. The topology never changes after
/// construction; only cell contents do.
#[derive(Debug, Clone)]
pub struct Lattice {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Lattice {
    /// Creates a lattice of healthy cells.
    ///
    /// Dimensions are validated by the caller; see
    /// [`EpidemicParams::validate`](crate::EpidemicParams::validate).
    pub fn new(width: usize, height: usize) -> Self {
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| Cell::new(Coord::new(x, y))))
            .collect();

        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells (`width * height`).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the row-major index of an in-bounds coordinate.
    pub fn index_of(&self, coord: Coord) -> usize {
        coord.y * self.width + coord.x
    }

    /// Returns the coordinate stored at a row-major index.
    pub fn coord_of(&self, index: usize) -> Coord {
        Coord::new(index % self.width, index / self.width)
    }

    /// Returns true if the coordinate lies on the grid.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Wraps arbitrary signed coordinates onto the torus.
    pub fn wrap(&self, x: i64, y: i64) -> Coord {
        Coord::new(
            x.rem_euclid(self.width as i64) as usize,
            y.rem_euclid(self.height as i64) as usize,
        )
    }

    /// Returns the cell at a coordinate, if it lies on the grid.
    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        if self.contains(coord) {
            self.cells.get(self.index_of(coord))
        } else {
            None
        }
    }

    pub(crate) fn cell_at(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub(crate) fn cell_at_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[index]
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Current state of every cell in row-major order.
    pub fn states(&self) -> Vec<HealthState> {
        self.cells.iter().map(|c| c.state()).collect()
    }

    /// Every cell whose toroidal Manhattan distance from `pos` is in
    /// `1..=radius`.
    ///
    /// Order is deterministic but carries no meaning.
    pub fn neighborhood(&self, pos: Coord, radius: u32) -> Vec<&Cell> {
        let stencil = Stencil::von_neumann(radius, self.width, self.height);
        self.neighbor_indices(pos, &stencil)
            .into_iter()
            .map(|i| &self.cells[i])
            .collect()
    }

    /// Row-major indices of the neighbors of `pos` under a prebuilt stencil.
    pub fn neighbor_indices(&self, pos: Coord, stencil: &Stencil) -> Vec<usize> {
        stencil
            .offsets
            .iter()
            .map(|&(ox, oy)| {
                let x = (pos.x + ox) % self.width;
                let y = (pos.y + oy) % self.height;
                y * self.width + x
            })
            .collect()
    }
}
