//! Table detection: find grid-shaped regions of a structured page and
//! rewrite them as Table/TableRow/TableCell subtrees.
//!
//! Detection runs bottom-up: every struct child is hunted first, then the
//! blocks at the current level are projected onto both axes, candidate
//! dividers inferred from the winding trace, refined against drawn rulings,
//! simplified, and — when a plausible grid remains — transcribed in place.
//! A degenerate level (too little content, too few dividers, a grid that
//! simplifies away) is simply left untouched.

use log::{debug, trace};

use crate::error::Result;
use crate::page::{Block, GridBlock, GridPositions, StructuredPage};

#[doc(hidden)]
pub mod cells;
#[doc(hidden)]
pub mod dividers;
#[doc(hidden)]
pub mod projection;
#[doc(hidden)]
pub mod transcribe;

use cells::GridAnalysis;
use dividers::envelope;
use projection::{bbox_of_blocks, project_blocks, Projection};
use transcribe::transcribe_table;

/// Tunable thresholds of the detection pipeline.
///
/// The defaults suit pages measured in points; change them only for
/// unusual page metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct HuntConfig {
    /// Vector rectangles thinner than this across are single rules rather
    /// than framed cells.
    pub hairline: f32,
    /// How far apart two strokes may sit and still be merged into one rule
    /// when snapping fails.
    pub stroke_merge_slack: f32,
    /// Minimum grid positions per axis, both before and after
    /// simplification. Below three positions there are not even two rows or
    /// columns — nothing worth calling a table.
    pub min_positions: usize,
}

impl Default for HuntConfig {
    #[inline]
    fn default() -> Self {
        Self {
            hairline: 1.0,
            stroke_merge_slack: 1.0,
            min_positions: 3,
        }
    }
}

/// The table-detection engine.
///
/// Holds only configuration; all per-page state lives on the stack of a
/// single [`hunt`](Self::hunt) call, so one hunter can serve any number of
/// pages (one at a time — fan pages out across threads with one hunter
/// each, or share one: `hunt` takes `&self`).
#[derive(Debug, Clone, Default)]
pub struct TableHunter {
    config: HuntConfig,
}

impl TableHunter {
    /// Create a hunter with the given thresholds.
    #[must_use]
    pub const fn new(config: HuntConfig) -> Self {
        Self { config }
    }

    /// Create a hunter with default thresholds.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Detect tables on `page`, rewriting its block tree in place. Returns
    /// the number of tables created.
    ///
    /// Every detected table becomes a [`StructRole::Table`] struct block
    /// holding a grid annotation plus one [`StructRole::TableRow`] per row
    /// of [`StructRole::TableCell`]s, with the covered content moved into
    /// the cells. Pages without tables come back byte-identical.
    ///
    /// [`StructRole::Table`]: crate::page::StructRole::Table
    /// [`StructRole::TableRow`]: crate::page::StructRole::TableRow
    /// [`StructRole::TableCell`]: crate::page::StructRole::TableCell
    ///
    /// # Errors
    ///
    /// [`GridTableError::MalformedPage`](crate::error::GridTableError) when
    /// the page violates the block-tree preconditions; the page is not
    /// touched in that case.
    pub fn hunt(&self, page: &mut StructuredPage) -> Result<usize> {
        page.validate()?;
        Ok(self.hunt_level(&mut page.blocks))
    }

    /// Recurse into struct children, then try this level.
    fn hunt_level(&self, blocks: &mut Vec<Block>) -> usize {
        let mut found = 0;
        let mut interesting = 0;
        for block in blocks.iter_mut() {
            match block {
                Block::Struct(s) => {
                    found += self.hunt_level(&mut s.children);
                    interesting += 1;
                }
                Block::Text(_) => interesting += 1,
                Block::Vector(_) | Block::Grid(_) => {}
            }
        }
        // A single child can't be tabular on its own.
        if interesting <= 1 {
            return found;
        }
        if self.hunt_one_level(blocks) {
            found += 1;
        }
        found
    }

    /// Run the pipeline over the direct blocks of one level. Returns true
    /// when a table was transcribed.
    fn hunt_one_level(&self, blocks: &mut Vec<Block>) -> bool {
        let mut xs = Projection::new();
        let mut ys = Projection::new();
        project_blocks(&mut xs, &mut ys, blocks, false);
        xs.sanitize();
        ys.sanitize();
        if xs.len() <= 2 || ys.len() <= 2 {
            return false;
        }

        let bounds = bbox_of_blocks(blocks);
        let Some(xpos) = GridPositions::from_projection(&xs, bounds.x0, bounds.x1) else {
            return false;
        };
        let Some(ypos) = GridPositions::from_projection(&ys, bounds.y0, bounds.y1) else {
            return false;
        };
        let min = self.config.min_positions;
        if xpos.len() < min || ypos.len() < min {
            return false;
        }
        debug!(
            "table candidate: {}x{} positions in {:?}",
            xpos.len(),
            ypos.len(),
            bounds
        );

        let mut ga = GridAnalysis::new(xpos, ypos);
        // Drawn rulings refine the positions before content is resolved
        // against them.
        ga.harvest_rules(blocks, &self.config);
        ga.record_crossings(blocks);
        trace!("cell grid:\n{}", ga.cells.ascii_art());

        ga.merge_columns();
        ga.merge_rows();
        // Simplification may have collapsed the candidate entirely.
        if ga.xpos.len() < min || ga.ypos.len() < min {
            debug!("candidate collapsed below {min}x{min}, discarding");
            return false;
        }

        let at = transcribe_table(blocks, &ga);
        if let Block::Struct(table) = &mut blocks[at] {
            table.children.insert(
                0,
                Block::Grid(GridBlock {
                    bbox: envelope(&ga.xpos, &ga.ypos),
                    xs: ga.xpos.clone(),
                    ys: ga.ypos.clone(),
                }),
            );
        }
        debug!(
            "transcribed a {}x{} table",
            ga.xpos.len() - 1,
            ga.ypos.len() - 1
        );
        true
    }
}

/// Detect tables on `page` with default thresholds. See
/// [`TableHunter::hunt`].
///
/// # Errors
///
/// Propagates [`TableHunter::hunt`]'s precondition failures.
pub fn detect_tables(page: &mut StructuredPage) -> Result<usize> {
    TableHunter::with_defaults().hunt(page)
}
