//! # gridtable-core — table detection for structured-text pages
//!
//! A geometric table-detection and reconstruction engine. Given the
//! structured-text rendering of a page — text blocks of lines of glyph
//! quads, plus the vector rectangles of drawn rulings — it finds regions
//! that visually form tables, infers their row and column structure,
//! resolves spanned cells, and rewrites the page's block tree with an
//! explicit Table/TableRow/TableCell hierarchy.
//!
//! ## How it works
//!
//! Each structural level of the page is analyzed independently,
//! children-first:
//!
//! 1. **Projection**: content extents are projected per axis into sorted
//!    start/end lists.
//! 2. **Divider inference**: walking a projection while summing run
//!    frequencies traces a winding value; its local minima are candidate
//!    dividers, scored by how many runs still overlap them (*uncertainty*).
//! 3. **Rule harvest**: drawn rulings snap onto the candidate dividers,
//!    refining their positions and marking ruled cell edges.
//! 4. **Crossing analysis**: glyphs straddling a candidate divider mark the
//!    edge as crossed — evidence that the neighbouring cells are one.
//! 5. **Simplification**: adjacent columns and rows that never genuinely
//!    compete are fused, undoing over-segmentation.
//! 6. **Transcription**: cells (with spans decided from crossings and
//!    uncertainties) are created and the covered content is moved in.
//!
//! ## Quick start
//!
//! ```
//! use gridtable_core::{detect_tables, Glyph, Point, Quad, Rect, StructRole};
//! use gridtable_core::{Block, StructuredPage, TextBlock, TextLine, WritingMode};
//!
//! # fn main() -> gridtable_core::Result<()> {
//! let mut page = StructuredPage::new(Rect::new(0.0, 0.0, 612.0, 792.0));
//!
//! // A 3x3 arrangement of aligned glyph runs, one per cell.
//! for row in 0..3 {
//!     for col in 0..3 {
//!         let (x, y) = (100.0 + 40.0 * col as f32, 100.0 + 20.0 * row as f32);
//!         let mut line = TextLine::new(Point::new(1.0, 0.0), WritingMode::Horizontal);
//!         line.push_glyph(Glyph::new('x', Quad::from_rect(Rect::new(x, y, x + 6.0, y + 10.0))));
//!         let mut block = TextBlock::new();
//!         block.push_line(line);
//!         page.push_block(Block::Text(block));
//!     }
//! }
//!
//! assert_eq!(detect_tables(&mut page)?, 1);
//!
//! // The nine blocks now live inside a Table struct, cell by cell.
//! let Block::Struct(table) = &page.blocks[0] else { unreachable!() };
//! assert_eq!(table.role, StructRole::Table);
//! # Ok(())
//! # }
//! ```
//!
//! ## Scope
//!
//! The engine consumes an already-built [`StructuredPage`] and mutates it;
//! rendering, format parsing, OCR, and semantic interpretation of cell
//! contents are a host's concern. Boxes are assumed axis-aligned — skew and
//! rotation must be corrected upstream.
//!
//! ## Threading
//!
//! Detection is single-threaded and touches nothing outside the page it is
//! given. Pages are independent: fan them out across worker threads with a
//! shared [`TableHunter`].

pub mod error;
pub mod geom;
pub mod hunt;
pub mod page;

pub use error::{GridTableError, Result};
pub use geom::{Point, Quad, Rect};
pub use hunt::{detect_tables, HuntConfig, TableHunter};
pub use page::{
    Block, Glyph, GridBlock, GridPosition, GridPositions, StructBlock, StructRole, StructuredPage,
    TextBlock, TextLine, VectorBlock, WritingMode,
};
