//! Grid layout solver.
//!
//! A `Layout` divides its container's client area into rows and columns.
//! Each row (column) gets its minimum size plus a share of the leftover space
//! proportional to its stretch factor:
//!
//! ```text
//! leftover = interior - sum(min) - (n - 1) * cell_margin      (never negative)
//! size_i   = min_i + stretch_i / sum(stretch) * leftover
//! ```
//!
//! Tracks with stretch 0 get exactly their minimum. When every stretch is 0
//! the leftover space is left unused.
//!
//! Solving is a pure computation over the container extent and the children's
//! size metrics; applying the result to windows is the tree's job.

use crate::error::{GuiError, Result};
use crate::flags::Alignment;
use crate::primitives::{Pt, Rect, X, Y};
use crate::wnd::WndId;

/// Sizing parameters for one row or column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track<T> {
    pub stretch: f64,
    pub min: T,
}

impl<T: Default> Default for Track<T> {
    fn default() -> Self {
        Self {
            stretch: 0.0,
            min: T::default(),
        }
    }
}

/// A child's placement in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutCell {
    pub wnd: WndId,
    pub row: usize,
    pub column: usize,
    pub rows: usize,
    pub columns: usize,
    pub alignment: Alignment,
}

/// Size information the solver needs about a child window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChildMetrics {
    /// Minimum size; folded into the minimum of single-span tracks.
    pub min: Pt,
    /// Current size; kept (clamped to the cell) for aligned children.
    pub size: Pt,
}

/// Result of one solve: a rectangle per child, relative to the container's
/// client area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutSolution {
    pub placements: Vec<(WndId, Rect)>,
}

impl LayoutSolution {
    pub fn rect_of(&self, wnd: WndId) -> Option<Rect> {
        self.placements
            .iter()
            .find(|(id, _)| *id == wnd)
            .map(|(_, rect)| *rect)
    }
}

/// Grid constraint solver attached to a container window.
#[derive(Debug, Clone)]
pub struct Layout {
    border_margin: i32,
    cell_margin: i32,
    rows: Vec<Track<Y>>,
    columns: Vec<Track<X>>,
    cells: Vec<LayoutCell>,
    /// Row-major occupancy, `rows.len() * columns.len()` entries.
    grid: Vec<Option<WndId>>,
    row_heights: Vec<Y>,
    column_widths: Vec<X>,
    solve_count: u64,
}

impl Layout {
    pub fn new(rows: usize, columns: usize, border_margin: i32, cell_margin: i32) -> Self {
        Self {
            border_margin,
            cell_margin,
            rows: vec![Track::default(); rows],
            columns: vec![Track::default(); columns],
            cells: Vec::new(),
            grid: vec![None; rows * columns],
            row_heights: Vec::new(),
            column_widths: Vec::new(),
            solve_count: 0,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> usize {
        self.columns.len()
    }

    pub fn border_margin(&self) -> i32 {
        self.border_margin
    }

    pub fn cell_margin(&self) -> i32 {
        self.cell_margin
    }

    pub fn set_border_margin(&mut self, margin: i32) {
        self.border_margin = margin;
    }

    pub fn set_cell_margin(&mut self, margin: i32) {
        self.cell_margin = margin;
    }

    pub fn row(&self, row: usize) -> Option<&Track<Y>> {
        self.rows.get(row)
    }

    pub fn column(&self, column: usize) -> Option<&Track<X>> {
        self.columns.get(column)
    }

    pub fn set_row_stretch(&mut self, row: usize, stretch: f64) -> Result<()> {
        check_stretch(stretch)?;
        self.row_mut(row)?.stretch = stretch;
        Ok(())
    }

    pub fn set_column_stretch(&mut self, column: usize, stretch: f64) -> Result<()> {
        check_stretch(stretch)?;
        self.column_mut(column)?.stretch = stretch;
        Ok(())
    }

    pub fn set_minimum_row_height(&mut self, row: usize, height: Y) -> Result<()> {
        self.row_mut(row)?.min = height;
        Ok(())
    }

    pub fn set_minimum_column_width(&mut self, column: usize, width: X) -> Result<()> {
        self.column_mut(column)?.min = width;
        Ok(())
    }

    fn row_mut(&mut self, row: usize) -> Result<&mut Track<Y>> {
        let (rows, columns) = (self.rows(), self.columns());
        self.rows.get_mut(row).ok_or(GuiError::CellOutOfRange {
            row,
            column: 0,
            rows,
            columns,
        })
    }

    fn column_mut(&mut self, column: usize) -> Result<&mut Track<X>> {
        let (rows, columns) = (self.rows(), self.columns());
        self.columns.get_mut(column).ok_or(GuiError::CellOutOfRange {
            row: 0,
            column,
            rows,
            columns,
        })
    }

    /// Place `wnd` in the cell at (`row`, `column`) spanning `rows` x `columns`.
    ///
    /// Adding a window that is already in the layout moves it. Spans of zero
    /// count as one.
    pub fn add(
        &mut self,
        wnd: WndId,
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
        alignment: Alignment,
    ) -> Result<()> {
        let rows = rows.max(1);
        let columns = columns.max(1);
        let out_of_range = || GuiError::CellOutOfRange {
            row: row.saturating_add(rows - 1),
            column: column.saturating_add(columns - 1),
            rows: self.rows(),
            columns: self.columns(),
        };
        let row_end = row
            .checked_add(rows)
            .filter(|end| *end <= self.rows())
            .ok_or_else(out_of_range)?;
        let column_end = column
            .checked_add(columns)
            .filter(|end| *end <= self.columns())
            .ok_or_else(out_of_range)?;

        for r in row..row_end {
            for c in column..column_end {
                if let Some(occupant) = self.grid[r * self.columns() + c] {
                    if occupant != wnd {
                        return Err(GuiError::CellOccupied {
                            row: r,
                            column: c,
                            occupant,
                        });
                    }
                }
            }
        }

        if self.contains(wnd) {
            self.remove(wnd)?;
        }
        let cell = LayoutCell {
            wnd,
            row,
            column,
            rows,
            columns,
            alignment,
        };
        self.occupy(&cell);
        self.cells.push(cell);
        Ok(())
    }

    /// Remove `wnd` from the grid. The window itself is untouched.
    pub fn remove(&mut self, wnd: WndId) -> Result<LayoutCell> {
        let index = self
            .cells
            .iter()
            .position(|c| c.wnd == wnd)
            .ok_or(GuiError::NotInLayout(wnd))?;
        let cell = self.cells.remove(index);
        for slot in self.grid.iter_mut().filter(|s| **s == Some(wnd)) {
            *slot = None;
        }
        Ok(cell)
    }

    /// Change the grid dimensions. Fails if a placed child would fall outside.
    pub fn resize(&mut self, rows: usize, columns: usize) -> Result<()> {
        if let Some(cell) = self
            .cells
            .iter()
            .find(|c| c.row + c.rows > rows || c.column + c.columns > columns)
        {
            return Err(GuiError::CellOutOfRange {
                row: cell.row.saturating_add(cell.rows - 1),
                column: cell.column.saturating_add(cell.columns - 1),
                rows,
                columns,
            });
        }

        self.rows.resize(rows, Track::default());
        self.columns.resize(columns, Track::default());
        self.grid = vec![None; rows * columns];
        for cell in self.cells.clone() {
            self.occupy(&cell);
        }
        Ok(())
    }

    fn occupy(&mut self, cell: &LayoutCell) {
        let width = self.columns();
        for r in cell.row..cell.row + cell.rows {
            for c in cell.column..cell.column + cell.columns {
                self.grid[r * width + c] = Some(cell.wnd);
            }
        }
    }

    pub fn contains(&self, wnd: WndId) -> bool {
        self.cells.iter().any(|c| c.wnd == wnd)
    }

    pub fn cell_of(&self, wnd: WndId) -> Option<&LayoutCell> {
        self.cells.iter().find(|c| c.wnd == wnd)
    }

    pub fn cells(&self) -> &[LayoutCell] {
        &self.cells
    }

    /// The window covering (`row`, `column`), if any.
    pub fn wnd_at(&self, row: usize, column: usize) -> Option<WndId> {
        if row >= self.rows() || column >= self.columns() {
            return None;
        }
        self.grid[row * self.columns() + column]
    }

    /// Row heights from the most recent solve.
    pub fn row_heights(&self) -> &[Y] {
        &self.row_heights
    }

    /// Column widths from the most recent solve.
    pub fn column_widths(&self) -> &[X] {
        &self.column_widths
    }

    /// Number of solves performed so far.
    pub fn solve_count(&self) -> u64 {
        self.solve_count
    }

    /// Solve the grid for a container client area of size `extent`.
    pub fn solve(
        &mut self,
        extent: Pt,
        metrics: impl Fn(WndId) -> ChildMetrics,
    ) -> LayoutSolution {
        self.solve_count += 1;

        let child_metrics: Vec<ChildMetrics> = self.cells.iter().map(|c| metrics(c.wnd)).collect();

        let mut row_tracks: Vec<(f64, i32)> =
            self.rows.iter().map(|t| (t.stretch, t.min.0)).collect();
        let mut column_tracks: Vec<(f64, i32)> =
            self.columns.iter().map(|t| (t.stretch, t.min.0)).collect();

        // Single-span children raise the minimum of the track they sit in.
        for (cell, m) in self.cells.iter().zip(&child_metrics) {
            if cell.rows == 1 {
                let track = &mut row_tracks[cell.row];
                track.1 = track.1.max(m.min.y.0);
            }
            if cell.columns == 1 {
                let track = &mut column_tracks[cell.column];
                track.1 = track.1.max(m.min.x.0);
            }
        }

        let interior_w = extent.x.0 - 2 * self.border_margin;
        let interior_h = extent.y.0 - 2 * self.border_margin;
        let widths = distribute(&column_tracks, interior_w, self.cell_margin);
        let heights = distribute(&row_tracks, interior_h, self.cell_margin);

        let x_offsets = offsets(&widths, self.border_margin, self.cell_margin);
        let y_offsets = offsets(&heights, self.border_margin, self.cell_margin);

        let placements = self
            .cells
            .iter()
            .zip(&child_metrics)
            .map(|(cell, m)| {
                let cell_w = span(&widths, cell.column, cell.columns, self.cell_margin);
                let cell_h = span(&heights, cell.row, cell.rows, self.cell_margin);
                let cell_rect = Rect::from_origin_size(
                    Pt::xy(x_offsets[cell.column], y_offsets[cell.row]),
                    Pt::xy(cell_w, cell_h),
                );
                (cell.wnd, align_in_cell(cell_rect, m.size, cell.alignment))
            })
            .collect();

        tracing::trace!(
            ?extent,
            columns = ?widths,
            rows = ?heights,
            solve = self.solve_count,
            "layout solved"
        );

        self.column_widths = widths.into_iter().map(X).collect();
        self.row_heights = heights.into_iter().map(Y).collect();

        LayoutSolution { placements }
    }
}

fn check_stretch(stretch: f64) -> Result<()> {
    if stretch.is_finite() && stretch >= 0.0 {
        Ok(())
    } else {
        Err(GuiError::InvalidStretch(stretch))
    }
}

/// Distribute `interior` pixels over `(stretch, min)` tracks separated by `margin`.
///
/// Shares are rounded cumulatively so the stretched tracks always add up to
/// exactly the leftover space.
pub(crate) fn distribute(tracks: &[(f64, i32)], interior: i32, margin: i32) -> Vec<i32> {
    if tracks.is_empty() {
        return Vec::new();
    }

    let min_total: i32 = tracks.iter().map(|(_, min)| *min).sum();
    let margins = margin * (tracks.len() as i32 - 1);
    let leftover = (interior - min_total - margins).max(0);
    let stretch_total: f64 = tracks.iter().map(|(stretch, _)| *stretch).sum();

    if stretch_total <= 0.0 {
        return tracks.iter().map(|(_, min)| *min).collect();
    }

    let mut acc = 0.0f64;
    let mut given = 0i32;
    tracks
        .iter()
        .map(|(stretch, min)| {
            acc += stretch / stretch_total * leftover as f64;
            let upto = acc.round() as i32;
            let share = upto - given;
            given = upto;
            min + share
        })
        .collect()
}

fn offsets(sizes: &[i32], border: i32, margin: i32) -> Vec<i32> {
    let mut pos = border;
    sizes
        .iter()
        .map(|size| {
            let start = pos;
            pos += size + margin;
            start
        })
        .collect()
}

fn span(sizes: &[i32], start: usize, count: usize, margin: i32) -> i32 {
    sizes[start..start + count].iter().sum::<i32>() + margin * (count as i32 - 1)
}

fn align_in_cell(cell: Rect, size: Pt, alignment: Alignment) -> Rect {
    let cell_w = cell.width();
    let cell_h = cell.height();

    let (x, w) = if alignment.intersects(Alignment::HORIZONTAL) {
        let w = size.x.min(cell_w);
        let x = if alignment.contains(Alignment::RIGHT) {
            cell.left() + cell_w - w
        } else if alignment.contains(Alignment::CENTER) {
            cell.left() + (cell_w - w) / 2
        } else {
            cell.left()
        };
        (x, w)
    } else {
        (cell.left(), cell_w)
    };

    let (y, h) = if alignment.intersects(Alignment::VERTICAL) {
        let h = size.y.min(cell_h);
        let y = if alignment.contains(Alignment::BOTTOM) {
            cell.top() + cell_h - h
        } else if alignment.contains(Alignment::VCENTER) {
            cell.top() + (cell_h - h) / 2
        } else {
            cell.top()
        };
        (y, h)
    } else {
        (cell.top(), cell_h)
    };

    Rect::from_origin_size(Pt::new(x, y), Pt::new(w, h))
}
