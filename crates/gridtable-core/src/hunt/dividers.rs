//! Divider inference: compressing a sanitized projection into grid
//! positions with uncertainty scores, plus the snapping used to refine
//! positions against drawn rulings.
//!
//! Walking the projection left to right while summing frequencies gives the
//! winding value `wind(x)`: how many content runs cover `x`. Every local
//! minimum of the trace is a candidate divider, and the residual winding
//! there is its *uncertainty* — zero for a clean gap, positive where content
//! (a spanning title, say) runs through the candidate.

use crate::geom::Rect;
use crate::page::{GridPosition, GridPositions};

use super::projection::{Projection, Side};

impl GridPositions {
    /// Infer the grid positions of one axis from a sanitized projection.
    ///
    /// `min` and `max` are the outer bounds of the subtree being analyzed;
    /// they become the `min` of the first position and the `max` of the
    /// last. Returns `None` for an empty projection.
    pub fn from_projection(proj: &Projection, min: f32, max: f32) -> Option<Self> {
        let edges = proj.edges();
        let (first, last) = (edges.first()?, edges.last()?);
        debug_assert_eq!(first.side, Side::Start, "projection must be sanitized");
        debug_assert_eq!(last.side, Side::End, "projection must be sanitized");

        let mut list = vec![GridPosition {
            pos: first.pos,
            min,
            max: first.pos,
            uncertainty: 0,
            reinforcement: 0,
        }];

        let mut wind: i32 = 0;
        let mut hi: i32 = 0;
        let mut local_min = false;
        let mut prev_end = first.pos;
        for edge in edges {
            match edge.side {
                Side::Start => {
                    if local_min {
                        list.push(GridPosition {
                            pos: (prev_end + edge.pos) / 2.0,
                            min: prev_end,
                            max: edge.pos,
                            uncertainty: wind.max(0) as u32,
                            reinforcement: 0,
                        });
                    }
                    wind += edge.freq as i32;
                    hi = hi.max(wind);
                }
                Side::End => {
                    wind -= edge.freq as i32;
                    local_min = true;
                    prev_end = edge.pos;
                }
            }
        }
        debug_assert_eq!(wind, 0, "start/end frequencies must balance");

        list.push(GridPosition {
            pos: last.pos,
            min: last.pos,
            max,
            uncertainty: 0,
            reinforcement: 0,
        });

        Some(Self {
            list,
            max_uncertainty: hi.max(0) as u32,
        })
    }

    /// Snap a coordinate onto the position whose `[min, max]` gap contains
    /// it, reinforcing that position: its `pos` is pulled toward `v` by a
    /// running mean over everything snapped there so far.
    ///
    /// When the coordinate falls between two gaps and `expand` is set, the
    /// nearer of the two surrounding positions is returned (split at the
    /// midpoint) without reinforcement. Coordinates outside the outermost
    /// gaps never snap.
    pub fn snap(&mut self, v: f32, expand: bool) -> Option<usize> {
        for i in 0..self.list.len() {
            if v > self.list[i].max {
                continue;
            }
            if v < self.list[i].min {
                if expand && i > 0 {
                    let mid = (self.list[i].min + self.list[i - 1].max) / 2.0;
                    return Some(if v < mid { i - 1 } else { i });
                }
                return None;
            }
            let p = &mut self.list[i];
            let r = p.reinforcement;
            p.pos = (p.pos * r as f32 + v) / (r as f32 + 1.0);
            p.reinforcement = r + 1;
            return Some(i);
        }
        None
    }

    /// Index of the cell containing coordinate `v`: the largest `i` with
    /// `pos[i] <= v`. A coordinate exactly on a divider belongs to the cell
    /// to its right; one exactly on the final position resolves to the last
    /// index.
    #[must_use]
    pub fn cell_index(&self, v: f32) -> Option<usize> {
        for (i, p) in self.list.iter().enumerate() {
            if v < p.pos {
                return i.checked_sub(1);
            }
        }
        if self.list.last().is_some_and(|p| p.pos == v) {
            return Some(self.list.len() - 1);
        }
        None
    }
}

/// Envelope spanned by a pair of axis position lists.
#[must_use]
pub fn envelope(xs: &GridPositions, ys: &GridPositions) -> Rect {
    Rect::new(xs.first_pos(), ys.first_pos(), xs.last_pos(), ys.last_pos())
}
