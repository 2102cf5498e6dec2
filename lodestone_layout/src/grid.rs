// Copyright 2025 the Lodestone Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid layout inference from element centers.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::float::abs;
use crate::spacing::DEFAULT_TOLERANCE;

/// Fraction of cells that must be occupied for an irregular grid to count.
const MIN_FILL_RATIO: f64 = 0.5;

/// Line clustering uses a wider net than gap clustering; centers wobble more
/// than edges do.
const LINE_TOLERANCE_FACTOR: f64 = 3.0;

/// A box assigned to a grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GridCell<I> {
    /// The box id.
    pub id: I,
    /// Row index, top to bottom.
    pub row: usize,
    /// Column index, left to right.
    pub col: usize,
}

/// An inferred grid: alignment lines per axis and cell assignments.
#[derive(Clone, Debug, PartialEq)]
pub struct GridLayout<I> {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Y positions of the row lines, ascending.
    pub row_positions: Vec<f64>,
    /// X positions of the column lines, ascending.
    pub col_positions: Vec<f64>,
    /// One entry per input box, nearest cell first come.
    pub cells: Vec<GridCell<I>>,
}

/// Detect a grid with [`DEFAULT_TOLERANCE`] as the base tolerance.
pub fn detect_grid<I: Copy>(boxes: &[(I, Rect)]) -> Option<GridLayout<I>> {
    detect_grid_with(boxes, DEFAULT_TOLERANCE)
}

/// Detect a grid layout among `boxes`.
///
/// Center x and y coordinates are clustered independently into alignment
/// lines (at `tolerance × 3`); each box is assigned to its nearest (row,
/// col) cell. The arrangement counts as a grid when at least half the cells
/// are filled, or the filled cells form complete rows or complete columns.
/// Requires at least 2 lines per axis and 4 boxes.
pub fn detect_grid_with<I: Copy>(boxes: &[(I, Rect)], tolerance: f64) -> Option<GridLayout<I>> {
    if boxes.len() < 4 {
        return None;
    }
    let line_tolerance = tolerance * LINE_TOLERANCE_FACTOR;
    let col_positions = cluster_lines(
        boxes.iter().map(|(_, r)| r.center().x).collect(),
        line_tolerance,
    );
    let row_positions = cluster_lines(
        boxes.iter().map(|(_, r)| r.center().y).collect(),
        line_tolerance,
    );
    let cols = col_positions.len();
    let rows = row_positions.len();
    if cols < 2 || rows < 2 {
        return None;
    }

    let mut cells = Vec::with_capacity(boxes.len());
    let mut occupied = alloc::vec![false; rows * cols];
    for (id, rect) in boxes {
        let col = nearest_line(&col_positions, rect.center().x);
        let row = nearest_line(&row_positions, rect.center().y);
        occupied[row * cols + col] = true;
        cells.push(GridCell { id: *id, row, col });
    }

    let filled = occupied.iter().filter(|&&o| o).count();
    let fill_ratio = filled as f64 / (rows * cols) as f64;
    let complete_rows =
        (0..rows).all(|r| (0..cols).all(|c| occupied[r * cols + c]));
    let complete_cols =
        (0..cols).all(|c| (0..rows).all(|r| occupied[r * cols + c]));
    if fill_ratio < MIN_FILL_RATIO && !complete_rows && !complete_cols {
        return None;
    }

    Some(GridLayout {
        rows,
        cols,
        row_positions,
        col_positions,
        cells,
    })
}

/// Cluster sorted 1-D values into lines by consecutive-gap splitting; each
/// line sits at the mean of its cluster.
fn cluster_lines(mut values: Vec<f64>, tolerance: f64) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
    let mut lines = Vec::new();
    let mut start = 0;
    for i in 1..=values.len() {
        if i == values.len() || values[i] - values[i - 1] > tolerance {
            let cluster = &values[start..i];
            lines.push(cluster.iter().sum::<f64>() / cluster.len() as f64);
            start = i;
        }
    }
    lines
}

fn nearest_line(lines: &[f64], value: f64) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, line) in lines.iter().enumerate() {
        let d = abs(value - line);
        if d < best_distance {
            best_distance = d;
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_boxes(rows: usize, cols: usize, pitch: f64) -> Vec<(u32, Rect)> {
        let mut out = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                let x = c as f64 * pitch;
                let y = r as f64 * pitch;
                out.push(((r * cols + c) as u32, Rect::new(x, y, x + 50.0, y + 50.0)));
            }
        }
        out
    }

    #[test]
    fn regular_three_by_three_is_detected() {
        let boxes = grid_boxes(3, 3, 100.0);
        let grid = detect_grid(&boxes).expect("expected a grid");
        assert_eq!(grid.rows, 3);
        assert_eq!(grid.cols, 3);
        assert_eq!(grid.cells.len(), 9);
        let mut ids: Vec<u32> = grid.cells.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..9).collect::<Vec<_>>());
        assert_eq!(grid.col_positions, alloc::vec![25.0, 125.0, 225.0]);
    }

    #[test]
    fn cells_map_to_row_and_column_indices() {
        let boxes = grid_boxes(2, 3, 80.0);
        let grid = detect_grid(&boxes).expect("expected a grid");
        let last = grid.cells.last().unwrap();
        assert_eq!((last.row, last.col), (1, 2));
    }

    #[test]
    fn sparse_grid_above_half_fill_passes() {
        let mut boxes = grid_boxes(3, 3, 100.0);
        // Keep the first full row and two of the second; the detected
        // lattice shrinks to 2 rows x 3 cols with 5 of 6 cells filled.
        boxes.truncate(5);
        let grid = detect_grid(&boxes).expect("5/6 fill is above the bar");
        assert_eq!((grid.rows, grid.cols), (2, 3));
        assert_eq!(grid.cells.len(), 5);
    }

    #[test]
    fn scattered_boxes_are_rejected() {
        let boxes = [
            (1_u32, Rect::new(0.0, 0.0, 50.0, 50.0)),
            (2, Rect::new(310.0, 40.0, 360.0, 90.0)),
            (3, Rect::new(95.0, 500.0, 145.0, 550.0)),
            (4, Rect::new(700.0, 220.0, 750.0, 270.0)),
            (5, Rect::new(420.0, 770.0, 470.0, 820.0)),
            (6, Rect::new(880.0, 610.0, 930.0, 660.0)),
        ];
        // 6 boxes spread over a 6x6 line lattice: fill ratio far below half.
        assert!(detect_grid(&boxes).is_none());
    }

    #[test]
    fn too_few_boxes_or_lines_is_not_a_grid() {
        assert!(detect_grid(&grid_boxes(1, 3, 100.0)).is_none(), "one row");
        let three = grid_boxes(2, 2, 100.0)[..3].to_vec();
        assert!(detect_grid(&three).is_none(), "fewer than four boxes");
    }

    #[test]
    fn jittered_centers_still_cluster() {
        let mut boxes = grid_boxes(2, 2, 120.0);
        for (i, (_, rect)) in boxes.iter_mut().enumerate() {
            // Nudge each box by a couple of units, inside the line tolerance.
            let dx = (i as f64 - 1.5) * 2.0;
            *rect = Rect::new(rect.x0 + dx, rect.y0, rect.x1 + dx, rect.y1);
        }
        let grid = detect_grid(&boxes).expect("jitter within tolerance");
        assert_eq!((grid.rows, grid.cols), (2, 2));
    }
}
