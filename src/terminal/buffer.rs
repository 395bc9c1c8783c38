//! Cell buffer
//!
//! Fixed `width x height` grid of cells stored row-major, with a touched
//! flag per row for incremental redraw. Every mutation keeps wide
//! characters whole: a head cell is always followed by its placeholder.

use super::cell::Cell;

/// Rectangle with exclusive right/bottom edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: usize,
    pub top: usize,
    /// Exclusive
    pub right: usize,
    /// Exclusive
    pub bottom: usize,
}

impl Rect {
    pub fn new(left: usize, top: usize, right: usize, bottom: usize) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle covering a whole `width x height` area
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(&self) -> usize {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> usize {
        self.bottom.saturating_sub(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Intersection with another rectangle (may be empty)
    pub fn intersect(&self, other: &Rect) -> Rect {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        Rect {
            left,
            top,
            right: self.right.min(other.right).max(left),
            bottom: self.bottom.min(other.bottom).max(top),
        }
    }
}

/// Character grid for one screen
#[derive(Debug, Clone)]
pub struct Buffer {
    /// Cell array (row-major)
    cells: Vec<Cell>,
    width: usize,
    height: usize,
    /// Rows changed since the last `clear_touched`
    touched: Vec<bool>,
}

impl Buffer {
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            cells: vec![Cell::default(); width * height],
            width,
            height,
            touched: vec![true; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::full(self.width, self.height)
    }

    /// Get cell, `None` outside the buffer
    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x < self.width && y < self.height {
            Some(&self.cells[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    fn at(&self, x: usize, y: usize) -> &Cell {
        &self.cells[y * self.width + x]
    }

    #[inline]
    fn at_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        &mut self.cells[y * self.width + x]
    }

    /// Cells of one row
    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        if y < self.height {
            let start = y * self.width;
            Some(&self.cells[start..start + self.width])
        } else {
            None
        }
    }

    /// Write a cell. A width-2 cell also writes its placeholder; a wide
    /// character that would not fit at the right edge is stored as a blank.
    /// No-op outside the buffer.
    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.split_wide(x, y);
        if cell.is_wide() {
            if x + 1 >= self.width {
                *self.at_mut(x, y) = Cell::blank_with_bg(cell.style.bg);
                self.touched[y] = true;
                return;
            }
            self.split_wide(x + 1, y);
            let placeholder = Cell::placeholder(cell.style, cell.link.clone());
            *self.at_mut(x + 1, y) = placeholder;
        }
        *self.at_mut(x, y) = cell;
        self.touched[y] = true;
    }

    /// Replace the cluster stored at (x, y), keeping its style. A cluster
    /// that became two cells wide takes over the cell to its right when
    /// there is room.
    pub fn replace_cluster(&mut self, x: usize, y: usize, content: &str, width: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let mut cell = self.at(x, y).clone();
        cell.content = content.into();
        if width == 2 && cell.width == 1 && x + 1 < self.width {
            cell.width = 2;
            self.set_cell(x, y, cell);
        } else {
            *self.at_mut(x, y) = cell;
            self.touched[y] = true;
        }
    }

    /// Blank both halves of a wide character touching (x, y)
    fn split_wide(&mut self, x: usize, y: usize) {
        let w = self.at(x, y).width;
        if w == 2 {
            let bg = self.at(x, y).style.bg;
            *self.at_mut(x, y) = Cell::blank_with_bg(bg);
            if x + 1 < self.width && self.at(x + 1, y).is_placeholder() {
                *self.at_mut(x + 1, y) = Cell::blank_with_bg(bg);
            }
        } else if w == 0 {
            let bg = self.at(x, y).style.bg;
            *self.at_mut(x, y) = Cell::blank_with_bg(bg);
            if x > 0 && self.at(x - 1, y).is_wide() {
                *self.at_mut(x - 1, y) = Cell::blank_with_bg(bg);
            }
        }
    }

    /// Blank a wide character that straddles the column boundary at `x`
    /// (its head at `x - 1`, its placeholder at `x`).
    fn split_at_boundary(&mut self, x: usize, y: usize) {
        if x > 0 && x < self.width && self.at(x, y).is_placeholder() {
            self.split_wide(x, y);
            self.touched[y] = true;
        }
    }

    /// Remove dangling halves left at the edges of `[left, right)` on row `y`.
    fn repair_edges(&mut self, left: usize, right: usize, y: usize) {
        if left < right && self.at(left, y).is_placeholder() {
            let bg = self.at(left, y).style.bg;
            *self.at_mut(left, y) = Cell::blank_with_bg(bg);
        }
        if right > left && self.at(right - 1, y).is_wide() {
            let bg = self.at(right - 1, y).style.bg;
            *self.at_mut(right - 1, y) = Cell::blank_with_bg(bg);
        }
    }

    // ========== Rectangle operations ==========

    /// Fill a rectangle (clipped to the buffer) with a cell
    pub fn fill(&mut self, rect: Rect, cell: &Cell) {
        let rect = rect.intersect(&self.bounds());
        if rect.is_empty() {
            return;
        }
        let mut cell = cell.clone();
        cell.width = 1;
        for y in rect.top..rect.bottom {
            self.split_at_boundary(rect.left, y);
            self.split_at_boundary(rect.right, y);
            let start = y * self.width;
            self.cells[start + rect.left..start + rect.right].fill(cell.clone());
            self.touched[y] = true;
        }
    }

    /// Reset a rectangle to default blank cells
    pub fn clear(&mut self, rect: Rect) {
        self.fill(rect, &Cell::default());
    }

    /// Insert `n` blank lines at row `y` inside `rect`; rows pushed past the
    /// rectangle bottom are discarded.
    pub fn insert_lines(&mut self, rect: Rect, y: usize, n: usize, fill: &Cell) {
        let rect = rect.intersect(&self.bounds());
        if rect.is_empty() || y < rect.top || y >= rect.bottom || n == 0 {
            return;
        }
        let n = n.min(rect.bottom - y);
        self.prepare_band(rect, y);
        for row in (y + n..rect.bottom).rev() {
            self.copy_row_span(row - n, row, rect.left, rect.right);
        }
        self.fill(Rect::new(rect.left, y, rect.right, y + n), fill);
    }

    /// Delete `n` lines at row `y` inside `rect`, pulling the rows below up
    /// and filling the vacated bottom rows.
    pub fn delete_lines(&mut self, rect: Rect, y: usize, n: usize, fill: &Cell) {
        let rect = rect.intersect(&self.bounds());
        if rect.is_empty() || y < rect.top || y >= rect.bottom || n == 0 {
            return;
        }
        let n = n.min(rect.bottom - y);
        self.prepare_band(rect, y);
        for row in y..rect.bottom - n {
            self.copy_row_span(row + n, row, rect.left, rect.right);
        }
        self.fill(Rect::new(rect.left, rect.bottom - n, rect.right, rect.bottom), fill);
    }

    /// Break wide characters straddling the rectangle's side edges
    fn prepare_band(&mut self, rect: Rect, from: usize) {
        for y in from..rect.bottom {
            self.split_at_boundary(rect.left, y);
            self.split_at_boundary(rect.right, y);
        }
    }

    fn copy_row_span(&mut self, src: usize, dst: usize, left: usize, right: usize) {
        let width = self.width;
        let (src_start, dst_start) = (src * width + left, dst * width + left);
        let len = right - left;
        if src < dst {
            let (head, tail) = self.cells.split_at_mut(dst_start);
            tail[..len].clone_from_slice(&head[src_start..src_start + len]);
        } else {
            let (head, tail) = self.cells.split_at_mut(src_start);
            head[dst_start..dst_start + len].clone_from_slice(&tail[..len]);
        }
        self.touched[dst] = true;
    }

    /// Insert `n` cells at (x, y), shifting the rest of the row span right up
    /// to `rect.right`.
    pub fn insert_cells(&mut self, rect: Rect, x: usize, y: usize, n: usize, fill: &Cell) {
        let rect = rect.intersect(&self.bounds());
        if !rect.contains(x, y) || n == 0 {
            return;
        }
        let n = n.min(rect.right - x);
        self.split_at_boundary(x, y);
        self.split_at_boundary(rect.right, y);
        let start = y * self.width;
        self.cells[start + x..start + rect.right].rotate_right(n);
        let mut blank = fill.clone();
        blank.width = 1;
        self.cells[start + x..start + x + n].fill(blank);
        self.repair_edges(x, rect.right, y);
        self.touched[y] = true;
    }

    /// Delete `n` cells at (x, y), pulling the rest of the row span left and
    /// filling at `rect.right`.
    pub fn delete_cells(&mut self, rect: Rect, x: usize, y: usize, n: usize, fill: &Cell) {
        let rect = rect.intersect(&self.bounds());
        if !rect.contains(x, y) || n == 0 {
            return;
        }
        let n = n.min(rect.right - x);
        self.split_at_boundary(x, y);
        self.split_at_boundary(rect.right, y);
        let start = y * self.width;
        self.cells[start + x..start + rect.right].rotate_left(n);
        let mut blank = fill.clone();
        blank.width = 1;
        self.cells[start + rect.right - n..start + rect.right].fill(blank);
        self.repair_edges(x, rect.right, y);
        self.touched[y] = true;
    }

    // ========== Resize ==========

    /// Re-allocate, keeping the overlapping top-left area
    pub fn resize(&mut self, width: usize, height: usize) {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.width && height == self.height {
            return;
        }
        let mut cells = vec![Cell::default(); width * height];
        let copy_w = width.min(self.width);
        for y in 0..height.min(self.height) {
            let src = y * self.width;
            let dst = y * width;
            cells[dst..dst + copy_w].clone_from_slice(&self.cells[src..src + copy_w]);
            // Head whose placeholder was cut off
            if cells[dst + copy_w - 1].is_wide() {
                cells[dst + copy_w - 1] = Cell::default();
            }
        }
        self.cells = cells;
        self.width = width;
        self.height = height;
        self.touched = vec![true; height];
    }

    // ========== Touched tracking ==========

    /// Rows modified since the last `clear_touched`
    pub fn touched_lines(&self) -> Vec<usize> {
        self.touched
            .iter()
            .enumerate()
            .filter_map(|(y, t)| t.then_some(y))
            .collect()
    }

    pub fn touch(&mut self, y: usize) {
        if y < self.height {
            self.touched[y] = true;
        }
    }

    pub fn touch_all(&mut self) {
        self.touched.fill(true);
    }

    pub fn clear_touched(&mut self) {
        self.touched.fill(false);
    }

    /// Plain text of one row, trailing blanks trimmed
    pub fn row_text(&self, y: usize) -> String {
        self.row(y).map(row_to_string).unwrap_or_default()
    }
}

/// Plain text of a row of cells, trailing blanks trimmed
pub fn row_to_string(row: &[Cell]) -> String {
    let mut line: String = row.iter().map(|c| c.content.as_str()).collect();
    let trimmed = line.trim_end_matches(' ').len();
    line.truncate(trimmed);
    line
}
