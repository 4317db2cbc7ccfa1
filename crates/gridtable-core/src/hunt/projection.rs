//! Projection lists: content extents projected onto one axis.
//!
//! Every text run contributes a `Start` edge at its leading coordinate and an
//! `End` edge at its trailing coordinate. The list stays sorted by position
//! and coalesces identical edges by frequency, so a column of aligned cells
//! shows up as one high-frequency edge pair instead of many singletons.

use crate::page::Block;

/// Which side of a content run an edge marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Leading edge of a run.
    Start,
    /// Trailing edge of a run.
    End,
}

/// One edge of the projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanEdge {
    /// Side of the run this edge marks.
    pub side: Side,
    /// Coordinate on the projection axis.
    pub pos: f32,
    /// How many runs share this exact edge.
    pub freq: u32,
}

/// A sorted projection of run extents onto one axis.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    edges: Vec<SpanEdge>,
}

impl Projection {
    /// Create an empty projection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of edges.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// True when no edges have been pushed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// The edges, sorted by position.
    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[SpanEdge] {
        &self.edges
    }

    /// Insert an edge, keeping the list sorted by position. An edge equal in
    /// both position and side to an existing one coalesces by frequency.
    pub fn push(&mut self, side: Side, pos: f32) {
        let mut insert_at = self.edges.len();
        for (i, edge) in self.edges.iter_mut().enumerate() {
            if edge.pos > pos {
                insert_at = i;
                break;
            }
            if edge.pos == pos && edge.side == side {
                edge.freq += 1;
                return;
            }
        }
        self.edges.insert(insert_at, SpanEdge { side, pos, freq: 1 });
    }

    /// Collapse runs of same-side edges so the list strictly alternates
    /// `Start, End, Start, End, …`.
    ///
    /// A run of `Start`s collapses onto its first member (the outermost
    /// leading edge); a run of `End`s onto its last. Idempotent.
    pub fn sanitize(&mut self) {
        let n = self.edges.len();
        let mut i = 0;
        while i < n {
            match self.edges[i].side {
                Side::Start => {
                    let keep = i;
                    while i + 1 < n && self.edges[i + 1].side == Side::Start {
                        i += 1;
                        let freq = std::mem::take(&mut self.edges[i].freq);
                        self.edges[keep].freq += freq;
                    }
                }
                Side::End => {
                    while i + 1 < n && self.edges[i + 1].side == Side::End {
                        i += 1;
                        let freq = std::mem::take(&mut self.edges[i - 1].freq);
                        self.edges[i].freq += freq;
                    }
                }
            }
            i += 1;
        }
        self.edges.retain(|e| e.freq > 0);
    }
}

/// Project the direct content of `blocks` onto both axes.
///
/// Vertical extents come from line bounding boxes; horizontal extents from
/// runs of non-space glyphs. A run ends at two or more consecutive spaces or
/// at a trailing space; a single interior space continues the run. The
/// trailing-space termination matters for pages that pad cell contents with
/// spaces — without it, adjacent cells fuse into one run.
///
/// `descend` controls recursion into struct children; the driver always
/// passes `false` so each structural level is projected on its own.
pub fn project_blocks(xs: &mut Projection, ys: &mut Projection, blocks: &[Block], descend: bool) {
    for block in blocks {
        match block {
            Block::Struct(s) => {
                if descend {
                    project_blocks(xs, ys, &s.children, descend);
                }
            }
            Block::Vector(_) | Block::Grid(_) => {}
            Block::Text(text) => {
                for line in &text.lines {
                    ys.push(Side::Start, line.bbox.y0);
                    ys.push(Side::End, line.bbox.y1);
                    project_line_runs(xs, line);
                }
            }
        }
    }
}

fn project_line_runs(xs: &mut Projection, line: &crate::page::TextLine) {
    let glyphs = &line.glyphs;
    let mut in_run = false;
    let mut run_end = 0.0f32;
    let mut i = 0;
    while i < glyphs.len() {
        let glyph = &glyphs[i];
        if glyph.is_space() {
            let trailing = i + 1 == glyphs.len();
            let double = !trailing && glyphs[i + 1].is_space();
            if (trailing || double) && in_run {
                xs.push(Side::End, run_end);
                in_run = false;
            }
            if double {
                while i + 1 < glyphs.len() && glyphs[i + 1].is_space() {
                    i += 1;
                }
            }
            // A single interior space neither starts nor ends a run.
        } else {
            if !in_run {
                xs.push(Side::Start, glyph.quad.left_x());
                in_run = true;
            }
            run_end = glyph.quad.right_x();
        }
        i += 1;
    }
    if in_run {
        xs.push(Side::End, run_end);
    }
}

/// Union of the bounding rectangles of `blocks`.
#[must_use]
pub fn bbox_of_blocks(blocks: &[Block]) -> crate::geom::Rect {
    blocks
        .iter()
        .fold(crate::geom::Rect::EMPTY, |acc, b| acc.union(b.bbox()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Point, Quad, Rect};
    use crate::page::{Glyph, TextBlock, TextLine, WritingMode};

    fn glyph(c: char, x0: f32, x1: f32) -> Glyph {
        Glyph::new(c, Quad::from_rect(Rect::new(x0, 0.0, x1, 10.0)))
    }

    fn line_of(glyphs: Vec<Glyph>) -> TextLine {
        let mut line = TextLine::new(Point::new(1.0, 0.0), WritingMode::Horizontal);
        for g in glyphs {
            line.push_glyph(g);
        }
        line
    }

    fn sides(p: &Projection) -> Vec<(Side, f32, u32)> {
        p.edges().iter().map(|e| (e.side, e.pos, e.freq)).collect()
    }

    #[test]
    fn push_keeps_edges_sorted_and_coalesces() {
        let mut p = Projection::new();
        p.push(Side::Start, 10.0);
        p.push(Side::End, 20.0);
        p.push(Side::Start, 10.0);
        p.push(Side::Start, 5.0);
        assert_eq!(
            sides(&p),
            vec![(Side::Start, 5.0, 1), (Side::Start, 10.0, 2), (Side::End, 20.0, 1)]
        );
    }

    #[test]
    fn equal_positions_with_different_sides_stay_separate() {
        let mut p = Projection::new();
        p.push(Side::End, 10.0);
        p.push(Side::Start, 10.0);
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn sanitize_collapses_to_strict_alternation() {
        let mut p = Projection::new();
        p.push(Side::Start, 0.0);
        p.push(Side::Start, 1.0);
        p.push(Side::End, 6.0);
        p.push(Side::Start, 14.0);
        p.push(Side::End, 26.0);
        p.push(Side::End, 30.0);
        p.sanitize();
        assert_eq!(
            sides(&p),
            vec![
                (Side::Start, 0.0, 2),
                (Side::End, 6.0, 1),
                (Side::Start, 14.0, 1),
                (Side::End, 30.0, 2),
            ]
        );
    }

    #[test]
    fn sanitize_is_idempotent() {
        let mut p = Projection::new();
        for (side, pos) in [
            (Side::Start, 0.0),
            (Side::Start, 2.0),
            (Side::End, 3.0),
            (Side::End, 4.0),
            (Side::Start, 9.0),
            (Side::End, 12.0),
        ] {
            p.push(side, pos);
        }
        p.sanitize();
        let once = sides(&p);
        p.sanitize();
        assert_eq!(once, sides(&p));
    }

    #[test]
    fn single_interior_space_does_not_split_a_run() {
        let mut xs = Projection::new();
        let line = line_of(vec![
            glyph('a', 0.0, 4.0),
            glyph(' ', 4.0, 6.0),
            glyph('b', 6.0, 10.0),
        ]);
        project_line_runs(&mut xs, &line);
        assert_eq!(sides(&xs), vec![(Side::Start, 0.0, 1), (Side::End, 10.0, 1)]);
    }

    #[test]
    fn double_space_splits_runs() {
        let mut xs = Projection::new();
        let line = line_of(vec![
            glyph('a', 0.0, 4.0),
            glyph(' ', 4.0, 6.0),
            glyph(' ', 6.0, 8.0),
            glyph('b', 8.0, 12.0),
        ]);
        project_line_runs(&mut xs, &line);
        assert_eq!(
            sides(&xs),
            vec![
                (Side::Start, 0.0, 1),
                (Side::End, 4.0, 1),
                (Side::Start, 8.0, 1),
                (Side::End, 12.0, 1),
            ]
        );
    }

    #[test]
    fn trailing_space_ends_the_run_at_the_last_glyph() {
        let mut xs = Projection::new();
        let line = line_of(vec![glyph('a', 0.0, 4.0), glyph(' ', 4.0, 6.0)]);
        project_line_runs(&mut xs, &line);
        assert_eq!(sides(&xs), vec![(Side::Start, 0.0, 1), (Side::End, 4.0, 1)]);
    }

    #[test]
    fn all_space_line_projects_nothing() {
        let mut xs = Projection::new();
        let line = line_of(vec![glyph(' ', 0.0, 2.0), glyph(' ', 2.0, 4.0)]);
        project_line_runs(&mut xs, &line);
        assert!(xs.is_empty());
    }

    #[test]
    fn struct_children_are_skipped_without_descend() {
        use crate::page::{StructBlock, StructRole};

        let mut inner = TextBlock::new();
        inner.push_line(line_of(vec![glyph('x', 0.0, 4.0)]));
        let mut sect = StructBlock::new(StructRole::Other("Sect".to_string()), 0);
        sect.children.push(Block::Text(inner));
        let blocks = vec![Block::Struct(sect)];

        let (mut xs, mut ys) = (Projection::new(), Projection::new());
        project_blocks(&mut xs, &mut ys, &blocks, false);
        assert!(xs.is_empty() && ys.is_empty());

        project_blocks(&mut xs, &mut ys, &blocks, true);
        assert_eq!(xs.len(), 2);
        assert_eq!(ys.len(), 2);
    }
}
