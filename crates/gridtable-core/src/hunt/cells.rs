//! The cell grid: a W×H matrix of edge and content counters, filled from
//! drawn rulings and glyph geometry, then simplified by merging
//! over-segmented columns and rows.
//!
//! Cell `(x, y)` owns the *top* and *left* edges of the rectangle whose
//! top-left corner is `(x_pos[x], y_pos[y])`. The rightmost column and
//! bottommost row exist only to carry the right and bottom border edges of
//! the real cells; they never hold content.

use log::{debug, trace};

use crate::geom::Rect;
use crate::page::{Block, GridPositions};

use super::dividers::envelope;
use super::HuntConfig;

/// Edge and content counters for one grid cell.
///
/// Counters accumulate exact counts for diagnostics; every decision in the
/// pipeline compares them by truthiness only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    /// Drawn rulings coinciding with the cell's top edge.
    pub h_line: u32,
    /// Drawn rulings coinciding with the cell's left edge.
    pub v_line: u32,
    /// Glyphs straddling the cell's top edge.
    pub h_crossed: u32,
    /// Glyphs straddling the cell's left edge.
    pub v_crossed: u32,
    /// Glyphs whose extent covers the cell.
    pub full: u32,
}

/// A dense W×H matrix of [`Cell`]s.
#[derive(Debug, Clone)]
pub struct CellGrid {
    w: usize,
    h: usize,
    cells: Vec<Cell>,
}

impl CellGrid {
    /// Create a zeroed grid.
    #[must_use]
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); w * h],
        }
    }

    /// Grid width, including the padding column.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.w
    }

    /// Grid height, including the padding row.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.h
    }

    /// The cell at `(x, y)`.
    #[inline]
    #[must_use]
    pub fn at(&self, x: usize, y: usize) -> &Cell {
        &self.cells[x + y * self.w]
    }

    #[inline]
    fn at_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        &mut self.cells[x + y * self.w]
    }

    /// Render the grid in the classic debug form: `-`/`|` for drawn edges,
    /// `v`/`>` for crossed edges, `*` for both, `#` for full cells.
    #[must_use]
    pub fn ascii_art(&self) -> String {
        let mut out = String::new();
        for y in 0..self.h {
            for x in 0..self.w.saturating_sub(1) {
                let cell = self.at(x, y);
                out.push('+');
                out.push(match (cell.h_line > 0, cell.h_crossed > 0) {
                    (true, false) => '-',
                    (false, true) => 'v',
                    (true, true) => '*',
                    (false, false) => ' ',
                });
            }
            out.push_str("+\n");
            if y == self.h - 1 {
                break;
            }
            for x in 0..self.w {
                let cell = self.at(x, y);
                out.push(match (cell.v_line > 0, cell.v_crossed > 0) {
                    (true, false) => '|',
                    (false, true) => '>',
                    (true, true) => '*',
                    (false, false) => ' ',
                });
                if x < self.w - 1 {
                    out.push(if cell.full > 0 { '#' } else { ' ' });
                } else {
                    out.push('\n');
                }
            }
        }
        out
    }
}

/// Scratch state of one candidate table: the cell grid plus both axis
/// position lists, which rule harvesting refines in place.
#[derive(Debug)]
pub struct GridAnalysis {
    /// The cell matrix; dimensions track the position lists.
    pub cells: CellGrid,
    /// Column positions.
    pub xpos: GridPositions,
    /// Row positions.
    pub ypos: GridPositions,
}

impl GridAnalysis {
    /// Create a zeroed analysis for the given axis positions.
    #[must_use]
    pub fn new(xpos: GridPositions, ypos: GridPositions) -> Self {
        Self {
            cells: CellGrid::new(xpos.len(), ypos.len()),
            xpos,
            ypos,
        }
    }

    /// Walk the subtree's vector rectangles and stamp ruled-line counters
    /// onto the grid, snapping endpoints onto the axis positions.
    ///
    /// Thin rectangles (under `config.hairline` across) are single rules at
    /// their midline; anything fatter is a framed cell contributing all four
    /// of its edges. A rule whose endpoints fail to snap is retried after
    /// merging it with immediately following vector siblings that continue
    /// it — rulings are often drawn as many short dashes.
    pub fn harvest_rules(&mut self, blocks: &[Block], config: &HuntConfig) {
        let mut i = 0;
        while i < blocks.len() {
            match &blocks[i] {
                Block::Struct(s) => self.harvest_rules(&s.children, config),
                Block::Text(_) | Block::Grid(_) => {}
                Block::Vector(v) => {
                    let r = v.bbox;
                    let (w, h) = (r.width(), r.height());
                    let failed = if w > h && h < config.hairline {
                        self.add_h_rule(r.x0, r.x1, r.y0, r.y1)
                    } else if w < h && w < config.hairline {
                        self.add_v_rule(r.y0, r.y1, r.x0, r.x1)
                    } else {
                        let h_failed = {
                            let top = self.add_h_rule(r.x0, r.x1, r.y0, r.y0);
                            let bottom = self.add_h_rule(r.x0, r.x1, r.y1, r.y1);
                            top || bottom
                        };
                        let v_failed = {
                            let left = self.add_v_rule(r.y0, r.y1, r.x0, r.x0);
                            let right = self.add_v_rule(r.y0, r.y1, r.x1, r.x1);
                            left || right
                        };
                        h_failed && v_failed
                    };
                    if failed {
                        i = self.retry_merged_rule(blocks, i, r, w > h, config);
                    }
                }
            }
            i += 1;
        }
    }

    /// Union a failed rule with the vector siblings continuing it, then
    /// re-stamp. Returns the index of the last sibling consumed.
    fn retry_merged_rule(
        &mut self,
        blocks: &[Block],
        mut i: usize,
        mut r: Rect,
        horizontal: bool,
        config: &HuntConfig,
    ) -> usize {
        let slack = config.stroke_merge_slack;
        while let Some(Block::Vector(next)) = blocks.get(i + 1) {
            let n = next.bbox;
            let continues = if horizontal {
                n.y0 == r.y0 && n.y1 == r.y1 && (n.x0 < r.x1 + slack || n.x1 > r.x0 - slack)
            } else {
                n.x0 == r.x0 && n.x1 == r.x1 && (n.y0 < r.y1 + slack || n.y1 > r.y0 - slack)
            };
            if !continues {
                break;
            }
            r = r.union(n);
            i += 1;
        }
        if horizontal {
            self.add_h_rule(r.x0, r.x1, r.y0, r.y1);
        } else {
            self.add_v_rule(r.y0, r.y1, r.x0, r.x1);
        }
        i
    }

    /// Stamp a horizontal rule spanning `[x0, x1]` at the vertical midline
    /// of `[y0, y1]`. Returns true when the rule failed to snap.
    fn add_h_rule(&mut self, x0: f32, x1: f32, y0: f32, y1: f32) -> bool {
        let start = self.xpos.snap(x0, true);
        let end = self.xpos.snap(x1, true);
        let y_idx = self.ypos.snap((y0 + y1) / 2.0, false);
        let (Some(start), Some(end), Some(y_idx)) = (start, end, y_idx) else {
            return true;
        };
        if start >= end {
            return true;
        }
        for x in start..end {
            self.cells.at_mut(x, y_idx).h_line += 1;
        }
        false
    }

    /// Stamp a vertical rule spanning `[y0, y1]` at the horizontal midline
    /// of `[x0, x1]`. Returns true when the rule failed to snap.
    fn add_v_rule(&mut self, y0: f32, y1: f32, x0: f32, x1: f32) -> bool {
        let start = self.ypos.snap(y0, true);
        let end = self.ypos.snap(y1, true);
        let x_idx = self.xpos.snap((x0 + x1) / 2.0, false);
        let (Some(start), Some(end), Some(x_idx)) = (start, end, x_idx) else {
            return true;
        };
        if start >= end {
            return true;
        }
        for y in start..end {
            self.cells.at_mut(x_idx, y).v_line += 1;
        }
        false
    }

    /// Walk the subtree's text and record, per glyph, which cells it fills
    /// and which candidate dividers it straddles.
    ///
    /// Leading spaces are skipped and space runs coalesced the same way the
    /// projection pass does, so padding never counts as content. Glyph edges
    /// resolving to the padding column or row are clamped onto the last real
    /// cell, keeping the padding free of content counters.
    pub fn record_crossings(&mut self, blocks: &[Block]) {
        let bounds = envelope(&self.xpos, &self.ypos);
        self.record_crossings_in(blocks, bounds);
    }

    fn record_crossings_in(&mut self, blocks: &[Block], bounds: Rect) {
        for block in blocks {
            match block {
                Block::Struct(s) => self.record_crossings_in(&s.children, bounds),
                Block::Vector(_) | Block::Grid(_) => {}
                Block::Text(text) => {
                    let b = text.bbox;
                    if b.x0 >= bounds.x1 || b.y0 >= bounds.y1 || b.x1 <= bounds.x0 || b.y1 <= bounds.y0
                    {
                        continue;
                    }
                    for line in &text.lines {
                        self.record_line(line);
                    }
                }
            }
        }
    }

    fn record_line(&mut self, line: &crate::page::TextLine) {
        let glyphs = &line.glyphs;
        let mut i = 0;
        while i < glyphs.len() && glyphs[i].is_space() {
            i += 1;
        }
        while i < glyphs.len() {
            let glyph = &glyphs[i];
            if glyph.is_space() {
                if i + 1 == glyphs.len() {
                    break; // trailing space
                }
                if glyphs[i + 1].is_space() {
                    while i + 1 < glyphs.len() && glyphs[i + 1].is_space() {
                        i += 1;
                    }
                    i += 1;
                    continue;
                }
                // A single interior space counts as cell content.
            }
            self.record_glyph(glyph.bounds());
            i += 1;
        }
    }

    fn record_glyph(&mut self, r: Rect) {
        let (w, h) = (self.cells.width(), self.cells.height());
        let indices = (
            self.xpos.cell_index(r.x0),
            self.xpos.cell_index(r.x1),
            self.ypos.cell_index(r.y0),
            self.ypos.cell_index(r.y1),
        );
        let (Some(x0), Some(x1), Some(y0), Some(y1)) = indices else {
            return;
        };
        // An edge exactly on the outermost position resolves to the padding
        // column/row; fold it back onto the last real cell.
        let x0 = x0.min(w - 2);
        let x1 = x1.min(w - 2);
        let y0 = y0.min(h - 2);
        let y1 = y1.min(h - 2);

        if x0 < x1 {
            for y in y0..=y1 {
                for x in x0..x1 {
                    self.cells.at_mut(x + 1, y).v_crossed += 1;
                }
            }
        }
        if y0 < y1 {
            for y in y0..y1 {
                for x in x0..=x1 {
                    self.cells.at_mut(x, y + 1).h_crossed += 1;
                }
            }
        }
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.cells.at_mut(x, y).full += 1;
            }
        }
    }

    /// Merge adjacent column pairs whose cells are all pairwise mergeable,
    /// right to left, until no pair qualifies.
    pub fn merge_columns(&mut self) {
        let mut x = self.cells.width() as isize - 3;
        while x >= 0 {
            let xi = x as usize;
            if self.columns_mergeable(xi) {
                debug!("merging column {xi}");
                self.merge_column(xi);
                trace!("cell grid:\n{}", self.cells.ascii_art());
            }
            x -= 1;
        }
    }

    /// Columns `x` and `x + 1` merge only when every cell pair agrees: no
    /// drawn divider between them, and for each row either one side is
    /// empty, or content crosses the shared edge between two cells of equal
    /// h-linedness.
    fn columns_mergeable(&self, x: usize) -> bool {
        for y in 0..self.cells.height() - 1 {
            let a = self.cells.at(x, y);
            let b = self.cells.at(x + 1, y);
            if b.v_line > 0 {
                return false;
            }
            if a.full == 0 || b.full == 0 {
                continue;
            }
            if (a.h_line > 0) != (b.h_line > 0) {
                return false;
            }
            if b.v_crossed == 0 {
                return false;
            }
        }
        true
    }

    fn merge_column(&mut self, x: usize) {
        let (w, h) = (self.cells.width(), self.cells.height());
        let mut cells = Vec::with_capacity((w - 1) * h);
        for y in 0..h {
            for xx in 0..w - 1 {
                if xx == x {
                    let a = self.cells.at(x, y);
                    let b = self.cells.at(x + 1, y);
                    cells.push(Cell {
                        full: u32::from(a.full > 0 || b.full > 0),
                        h_crossed: u32::from(a.h_crossed > 0 || b.h_crossed > 0),
                        h_line: a.h_line, // equal to b's by the merge rule
                        v_crossed: a.v_crossed,
                        v_line: a.v_line,
                    });
                } else if xx < x {
                    cells.push(*self.cells.at(xx, y));
                } else {
                    cells.push(*self.cells.at(xx + 1, y));
                }
            }
        }
        self.cells = CellGrid { w: w - 1, h, cells };
        self.xpos.list.remove(x + 1);
    }

    /// Merge adjacent row pairs, bottom to top; the mirror of
    /// [`merge_columns`](Self::merge_columns).
    pub fn merge_rows(&mut self) {
        let mut y = self.cells.height() as isize - 3;
        while y >= 0 {
            let yi = y as usize;
            if self.rows_mergeable(yi) {
                debug!("merging row {yi}");
                self.merge_row(yi);
                trace!("cell grid:\n{}", self.cells.ascii_art());
            }
            y -= 1;
        }
    }

    fn rows_mergeable(&self, y: usize) -> bool {
        for x in 0..self.cells.width() - 1 {
            let a = self.cells.at(x, y);
            let b = self.cells.at(x, y + 1);
            if b.h_line > 0 {
                return false;
            }
            if a.full == 0 || b.full == 0 {
                continue;
            }
            if (a.v_line > 0) != (b.v_line > 0) {
                return false;
            }
            if b.h_crossed == 0 {
                return false;
            }
        }
        true
    }

    fn merge_row(&mut self, y: usize) {
        let (w, h) = (self.cells.width(), self.cells.height());
        let mut cells = Vec::with_capacity(w * (h - 1));
        for yy in 0..h - 1 {
            for x in 0..w {
                if yy == y {
                    let a = self.cells.at(x, y);
                    let b = self.cells.at(x, y + 1);
                    if x < w - 1 {
                        cells.push(Cell {
                            full: if a.full > 0 { a.full } else { b.full },
                            h_crossed: if a.h_crossed > 0 { a.h_crossed } else { b.h_crossed },
                            h_line: a.h_line,
                            v_crossed: a.v_crossed,
                            v_line: a.v_line,
                        });
                    } else {
                        cells.push(*a); // padding column keeps the top cell
                    }
                } else if yy < y {
                    cells.push(*self.cells.at(x, yy));
                } else {
                    cells.push(*self.cells.at(x, yy + 1));
                }
            }
        }
        self.cells = CellGrid { w, h: h - 1, cells };
        self.ypos.list.remove(y + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Point, Quad};
    use crate::page::{Glyph, GridPosition, TextBlock, TextLine, VectorBlock, WritingMode};

    fn positions(coords: &[f32]) -> GridPositions {
        let n = coords.len();
        GridPositions {
            list: coords
                .iter()
                .enumerate()
                .map(|(i, &pos)| GridPosition {
                    pos,
                    min: if i == 0 { pos } else { pos - 2.0 },
                    max: if i + 1 == n { pos } else { pos + 2.0 },
                    uncertainty: u32::from(i != 0 && i + 1 != n),
                    reinforcement: 0,
                })
                .collect(),
            max_uncertainty: 1,
        }
    }

    fn analysis_3x3() -> GridAnalysis {
        GridAnalysis::new(positions(&[0.0, 10.0, 20.0, 30.0]), positions(&[0.0, 10.0, 20.0, 30.0]))
    }

    fn text_block(rects: &[Rect]) -> Block {
        let mut block = TextBlock::new();
        for &r in rects {
            let mut line = TextLine::new(Point::new(1.0, 0.0), WritingMode::Horizontal);
            line.push_glyph(Glyph::new('x', Quad::from_rect(r)));
            block.push_line(line);
        }
        Block::Text(block)
    }

    #[test]
    fn thin_wide_vector_stamps_a_horizontal_rule() {
        let mut ga = analysis_3x3();
        let blocks = vec![Block::Vector(VectorBlock {
            bbox: Rect::new(0.0, 9.8, 30.0, 10.2),
        })];
        ga.harvest_rules(&blocks, &HuntConfig::default());
        for x in 0..3 {
            assert_eq!(ga.cells.at(x, 1).h_line, 1, "column {x}");
        }
        assert_eq!(ga.cells.at(0, 0).h_line, 0);
    }

    #[test]
    fn framed_rectangle_stamps_all_four_edges() {
        let mut ga = analysis_3x3();
        let blocks = vec![Block::Vector(VectorBlock {
            bbox: Rect::new(0.0, 0.0, 30.0, 30.0),
        })];
        ga.harvest_rules(&blocks, &HuntConfig::default());
        for x in 0..3 {
            assert_eq!(ga.cells.at(x, 0).h_line, 1);
            assert_eq!(ga.cells.at(x, 3).h_line, 1);
        }
        for y in 0..3 {
            assert_eq!(ga.cells.at(0, y).v_line, 1);
            assert_eq!(ga.cells.at(3, y).v_line, 1);
        }
    }

    #[test]
    fn rule_endpoints_reinforce_positions() {
        let mut ga = analysis_3x3();
        let blocks = vec![Block::Vector(VectorBlock {
            bbox: Rect::new(1.0, 10.5, 29.0, 10.9),
        })];
        ga.harvest_rules(&blocks, &HuntConfig::default());
        assert_eq!(ga.xpos.list[0].reinforcement, 1);
        assert_eq!(ga.xpos.list[0].pos, 1.0);
        assert_eq!(ga.xpos.list[3].reinforcement, 1);
        assert_eq!(ga.xpos.list[3].pos, 29.0);
        assert_eq!(ga.ypos.list[1].reinforcement, 1);
    }

    #[test]
    fn dashed_rule_merges_and_retries() {
        let mut ga = analysis_3x3();
        // Three dashes at y = 10. The first spans no column gap on its own
        // (both endpoints snap to position 0), so stamping it fails and the
        // harvester unions it with the dashes continuing it.
        let dash = |x0: f32, x1: f32| {
            Block::Vector(VectorBlock {
                bbox: Rect::new(x0, 9.9, x1, 10.1),
            })
        };
        let blocks = vec![dash(2.5, 4.5), dash(5.0, 12.0), dash(12.5, 28.0)];
        ga.harvest_rules(&blocks, &HuntConfig::default());
        for x in 0..3 {
            assert!(ga.cells.at(x, 1).h_line > 0, "column {x}");
        }
    }

    #[test]
    fn crossing_recorder_marks_full_and_crossed() {
        let mut ga = analysis_3x3();
        // One glyph inside cell (1, 1), one spanning cells (0..=1, 0).
        let blocks = vec![
            text_block(&[Rect::new(14.0, 14.0, 16.0, 16.0)]),
            text_block(&[Rect::new(4.0, 4.0, 16.0, 6.0)]),
        ];
        ga.record_crossings(&blocks);
        assert_eq!(ga.cells.at(1, 1).full, 1);
        assert_eq!(ga.cells.at(0, 0).full, 1);
        assert_eq!(ga.cells.at(1, 0).full, 1);
        assert_eq!(ga.cells.at(1, 0).v_crossed, 1);
        assert_eq!(ga.cells.at(1, 1).v_crossed, 0);
    }

    #[test]
    fn padding_row_and_column_stay_clear() {
        let mut ga = analysis_3x3();
        // A glyph whose right and bottom edges sit exactly on the table's
        // outer positions.
        let blocks = vec![text_block(&[Rect::new(24.0, 24.0, 30.0, 30.0)])];
        ga.record_crossings(&blocks);
        let (w, h) = (ga.cells.width(), ga.cells.height());
        for x in 0..w {
            assert_eq!(ga.cells.at(x, h - 1).full, 0);
            assert_eq!(ga.cells.at(x, h - 1).h_crossed, 0);
            assert_eq!(ga.cells.at(x, h - 1).v_crossed, 0);
        }
        for y in 0..h {
            assert_eq!(ga.cells.at(w - 1, y).full, 0);
            assert_eq!(ga.cells.at(w - 1, y).v_crossed, 0);
            assert_eq!(ga.cells.at(w - 1, y).h_crossed, 0);
        }
        assert_eq!(ga.cells.at(2, 2).full, 1);
    }

    #[test]
    fn text_outside_the_envelope_is_ignored() {
        let mut ga = analysis_3x3();
        let blocks = vec![text_block(&[Rect::new(40.0, 40.0, 50.0, 50.0)])];
        ga.record_crossings(&blocks);
        assert!(ga.cells.cells.iter().all(|c| *c == Cell::default()));
    }

    #[test]
    fn empty_column_merges_into_its_neighbor() {
        let mut ga = analysis_3x3();
        // Content in columns 0 and 2 only; column 1 empty everywhere.
        for y in 0..3 {
            let yc = 5.0 + 10.0 * y as f32;
            ga.record_crossings(&[
                text_block(&[Rect::new(4.0, yc - 1.0, 6.0, yc + 1.0)]),
                text_block(&[Rect::new(24.0, yc - 1.0, 26.0, yc + 1.0)]),
            ]);
        }
        ga.merge_columns();
        assert_eq!(ga.cells.width(), 3);
        assert_eq!(ga.xpos.len(), 3);
        // The shared content survives in the fused column.
        assert_eq!(ga.cells.at(1, 0).full, 1);
    }

    #[test]
    fn full_columns_without_crossing_do_not_merge() {
        let mut ga = analysis_3x3();
        for y in 0..3 {
            let yc = 5.0 + 10.0 * y as f32;
            for x in 0..3 {
                let xc = 5.0 + 10.0 * x as f32;
                ga.record_crossings(&[text_block(&[Rect::new(
                    xc - 1.0,
                    yc - 1.0,
                    xc + 1.0,
                    yc + 1.0,
                )])]);
            }
        }
        ga.merge_columns();
        ga.merge_rows();
        assert_eq!(ga.cells.width(), 4);
        assert_eq!(ga.cells.height(), 4);
    }

    #[test]
    fn drawn_divider_blocks_merging_of_empty_column() {
        let mut ga = analysis_3x3();
        // Column 1 empty but separated from column 2 by a drawn rule.
        let rule = Block::Vector(VectorBlock {
            bbox: Rect::new(19.9, 0.0, 20.1, 30.0),
        });
        ga.harvest_rules(&[rule], &HuntConfig::default());
        for y in 0..3 {
            let yc = 5.0 + 10.0 * y as f32;
            ga.record_crossings(&[
                text_block(&[Rect::new(4.0, yc - 1.0, 6.0, yc + 1.0)]),
                text_block(&[Rect::new(24.0, yc - 1.0, 26.0, yc + 1.0)]),
            ]);
        }
        let w_before = ga.cells.width();
        // Pair (1, 2) is blocked by the v_line on column 2; pair (0, 1) is
        // allowed since column 1 is empty.
        ga.merge_columns();
        assert_eq!(ga.cells.width(), w_before - 1);
        // The drawn divider survives on what is now column 1.
        assert_eq!(ga.cells.at(1, 0).v_line, 1);
    }

    #[test]
    fn ascii_art_renders_lines_crossings_and_content() {
        let mut ga = analysis_3x3();
        ga.cells.at_mut(1, 1).full = 1;
        ga.cells.at_mut(1, 1).v_line = 1;
        ga.cells.at_mut(1, 1).h_crossed = 1;
        let art = ga.cells.ascii_art();
        let lines: Vec<&str> = art.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[2], "+ +v+ +");
        assert_eq!(lines[3], "  |#   ");
    }
}
