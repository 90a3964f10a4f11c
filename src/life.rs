//! Double-buffered cellular-automaton board (Conway's Game of Life).
//!
//! [`Grid`] carries no synchronization of its own: stepping is a pure
//! data-parallel map from the front buffer to the back buffer. Callers that
//! want generation-stepped parallelism wrap it in a lock and coordinate
//! their strip workers with a [`ReusableBarrier`](crate::ReusableBarrier)
//! through the [`next_rows`](Grid::next_rows) / [`store_rows`](Grid::store_rows)
//! / [`swap_buffers`](Grid::swap_buffers) protocol; see the `life` demo.
//!
//! Border cells are permanently dead, so the neighbourhood of every inner
//! cell is fully in-bounds and stepping needs no wraparound arithmetic.

use std::mem;
use std::ops::Range;

use crate::error::ConfigError;

const ALIVE: u8 = 1;
const DEAD: u8 = 0;

/// A double-buffered Life board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    front: Vec<u8>,
    back: Vec<u8>,
}

impl Grid {
    /// Creates an all-dead board of `width` columns by `height` rows.
    ///
    /// # Errors
    ///
    /// `ConfigError::EmptyGrid` if either dimension is 0.
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyGrid { width, height });
        }
        Ok(Self {
            width,
            height,
            front: vec![DEAD; width * height],
            back: vec![DEAD; width * height],
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the cell at (`x`, `y`) is alive.
    ///
    /// # Panics
    ///
    /// If the coordinates are out of bounds.
    pub fn get(&self, x: usize, y: usize) -> bool {
        assert!(x < self.width && y < self.height, "cell ({x}, {y}) out of bounds");
        self.front[y * self.width + x] == ALIVE
    }

    /// Sets the cell at (`x`, `y`). Setting a border cell is permitted but
    /// the next step kills it again; borders are dead by construction.
    ///
    /// # Panics
    ///
    /// If the coordinates are out of bounds.
    pub fn set(&mut self, x: usize, y: usize, alive: bool) {
        assert!(x < self.width && y < self.height, "cell ({x}, {y}) out of bounds");
        self.front[y * self.width + x] = u8::from(alive);
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.front.iter().filter(|&&cell| cell == ALIVE).count()
    }

    /// Advances one generation serially.
    pub fn step(&mut self) {
        for y in 0..self.height {
            let row = &mut self.back[y * self.width..(y + 1) * self.width];
            step_row(&self.front, self.width, self.height, y, row);
        }
        self.swap_buffers();
    }

    /// Advances one generation with the rows split across the rayon pool.
    ///
    /// Produces exactly the same board as [`step`](Self::step).
    #[cfg(feature = "parallel")]
    pub fn par_step(&mut self) {
        use rayon::prelude::*;

        let (width, height) = (self.width, self.height);
        let front = &self.front;
        self.back
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| step_row(front, width, height, y, row));
        self.swap_buffers();
    }

    /// Computes the next generation of `rows` from the front buffer.
    ///
    /// Pure read; strip workers run this concurrently on disjoint row bands,
    /// then write the results back through [`store_rows`](Self::store_rows).
    ///
    /// # Panics
    ///
    /// If `rows` is out of bounds.
    pub fn next_rows(&self, rows: Range<usize>) -> Vec<u8> {
        assert!(rows.end <= self.height, "row band {rows:?} out of bounds");
        let mut band = vec![DEAD; rows.len() * self.width];
        for (offset, y) in rows.enumerate() {
            let row = &mut band[offset * self.width..(offset + 1) * self.width];
            step_row(&self.front, self.width, self.height, y, row);
        }
        band
    }

    /// Stores a band computed by [`next_rows`](Self::next_rows) into the
    /// back buffer, starting at `start_row`.
    ///
    /// # Panics
    ///
    /// If the band is not a whole number of rows or runs past the board.
    pub fn store_rows(&mut self, start_row: usize, band: &[u8]) {
        assert_eq!(band.len() % self.width, 0, "band is not a whole number of rows");
        let end = start_row * self.width + band.len();
        assert!(end <= self.back.len(), "band runs past the board");
        self.back[start_row * self.width..end].copy_from_slice(band);
    }

    /// Promotes the back buffer to front, completing a generation. Called
    /// once per generation by the strip protocol's phase leader.
    pub fn swap_buffers(&mut self) {
        mem::swap(&mut self.front, &mut self.back);
    }
}

/// Writes the next generation of row `y` into `row`.
fn step_row(front: &[u8], width: usize, height: usize, y: usize, row: &mut [u8]) {
    if y == 0 || y == height - 1 {
        row.fill(DEAD);
        return;
    }
    row[0] = DEAD;
    row[width - 1] = DEAD;
    for x in 1..width - 1 {
        let mut neighbours = 0;
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                if (nx, ny) != (x, y) {
                    neighbours += u32::from(front[ny * width + nx]);
                }
            }
        }
        let alive = front[y * width + x] == ALIVE;
        row[x] = match (alive, neighbours) {
            (true, 2 | 3) | (false, 3) => ALIVE,
            _ => DEAD,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dimensions_rejected() {
        assert_eq!(
            Grid::new(0, 4).unwrap_err(),
            ConfigError::EmptyGrid { width: 0, height: 4 }
        );
        assert_eq!(
            Grid::new(4, 0).unwrap_err(),
            ConfigError::EmptyGrid { width: 4, height: 0 }
        );
    }

    #[test]
    fn block_is_a_still_life() {
        let mut grid = Grid::new(4, 4).unwrap();
        for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
            grid.set(x, y, true);
        }
        let before = grid.clone();
        grid.step();
        assert_eq!(grid.front, before.front);
    }

    #[test]
    fn blinker_oscillates() {
        let mut grid = Grid::new(5, 5).unwrap();
        for x in 1..4 {
            grid.set(x, 2, true);
        }
        grid.step();
        assert!(grid.get(2, 1) && grid.get(2, 2) && grid.get(2, 3));
        assert!(!grid.get(1, 2) && !grid.get(3, 2));
        grid.step();
        assert!(grid.get(1, 2) && grid.get(2, 2) && grid.get(3, 2));
        assert_eq!(grid.population(), 3);
    }

    #[test]
    fn borders_stay_dead() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set(0, 0, true);
        grid.set(3, 3, true);
        grid.step();
        for x in 0..4 {
            assert!(!grid.get(x, 0) && !grid.get(x, 3));
        }
        for y in 0..4 {
            assert!(!grid.get(0, y) && !grid.get(3, y));
        }
    }

    #[test]
    fn strip_protocol_matches_step() {
        let mut grid = Grid::new(8, 8).unwrap();
        for (x, y) in [(2, 2), (3, 2), (4, 2), (4, 3), (3, 4)] {
            grid.set(x, y, true);
        }
        let mut reference = grid.clone();
        reference.step();

        let top = grid.next_rows(0..4);
        let bottom = grid.next_rows(4..8);
        grid.store_rows(0, &top);
        grid.store_rows(4, &bottom);
        grid.swap_buffers();

        assert_eq!(grid.front, reference.front);
    }
}
