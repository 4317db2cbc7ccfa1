//! The structured-text page model the engine consumes and rewrites.
//!
//! A page is an ordered tree of [`Block`]s. Text blocks own lines, lines own
//! glyphs; vector blocks are filled rectangles left behind by the renderer;
//! struct blocks are structural containers (sections from an upstream layout
//! pass, and the Table/TableRow/TableCell hierarchy this engine creates);
//! grid blocks are annotations carrying the divider positions of a detected
//! table.
//!
//! Sibling order is the `Vec` order. Struct blocks additionally carry an
//! explicit `index` that must stay strictly increasing among the struct
//! siblings of one parent; [`bump_struct_indices`] maintains that when a new
//! struct block is spliced in front of existing ones.

use serde::{Deserialize, Serialize};

use crate::error::{GridTableError, Result};
use crate::geom::{Point, Quad, Rect};

/// Line writing mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WritingMode {
    /// Horizontal writing, the common case.
    #[default]
    Horizontal,
    /// Vertical writing.
    Vertical,
}

/// A single positioned glyph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    /// Unicode code point.
    pub c: char,
    /// Outline of the glyph on the page.
    pub quad: Quad,
}

impl Glyph {
    /// Create a glyph from its code point and outline.
    #[inline]
    #[must_use]
    pub const fn new(c: char, quad: Quad) -> Self {
        Self { c, quad }
    }

    /// Axis-aligned bounding rectangle of the glyph.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.quad.bounds()
    }

    /// True for the plain space character.
    #[inline]
    #[must_use]
    pub const fn is_space(&self) -> bool {
        self.c == ' '
    }
}

/// An ordered run of glyphs sharing a baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// Bounding rectangle of the line.
    pub bbox: Rect,
    /// Reading direction as a unit vector.
    pub dir: Point,
    /// Writing mode.
    pub wmode: WritingMode,
    /// The glyphs, in reading order.
    pub glyphs: Vec<Glyph>,
}

impl TextLine {
    /// Create an empty line with the given direction attributes.
    #[must_use]
    pub const fn new(dir: Point, wmode: WritingMode) -> Self {
        Self {
            bbox: Rect::EMPTY,
            dir,
            wmode,
            glyphs: Vec::new(),
        }
    }

    /// Append a glyph, growing the line's bounding rectangle.
    pub fn push_glyph(&mut self, glyph: Glyph) {
        self.bbox = self.bbox.union(glyph.bounds());
        self.glyphs.push(glyph);
    }
}

/// A block of text lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Bounding rectangle, the union of the lines' rectangles.
    pub bbox: Rect,
    /// The lines, in reading order.
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    /// Create an empty text block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line, growing the block's bounding rectangle.
    pub fn push_line(&mut self, line: TextLine) {
        self.bbox = self.bbox.union(line.bbox);
        self.lines.push(line);
    }

    /// Recompute the bounding rectangle from the lines' declared rectangles.
    pub fn recalc_bbox(&mut self) {
        self.bbox = self
            .lines
            .iter()
            .fold(Rect::EMPTY, |acc, line| acc.union(line.bbox));
    }
}

/// A filled axis-aligned rectangle from the page's vector graphics.
///
/// Hairline rules and cell frames both arrive this way; the engine decides
/// which is which from the rectangle's aspect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorBlock {
    /// The rectangle.
    pub bbox: Rect,
}

/// Structural role of a [`StructBlock`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructRole {
    /// A detected table.
    Table,
    /// A row of a detected table.
    TableRow,
    /// A cell of a detected table.
    TableCell,
    /// A role assigned upstream (section, article, …) that the engine
    /// recurses into but never creates.
    Other(String),
}

impl StructRole {
    /// True for the roles this engine creates.
    #[inline]
    #[must_use]
    pub const fn is_table_part(&self) -> bool {
        matches!(self, Self::Table | Self::TableRow | Self::TableCell)
    }
}

/// A structural container of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructBlock {
    /// Structural role.
    pub role: StructRole,
    /// Sibling index; strictly increasing among the struct siblings of one
    /// parent.
    pub index: usize,
    /// Bounding rectangle.
    pub bbox: Rect,
    /// Child blocks, in order.
    pub children: Vec<Block>,
}

impl StructBlock {
    /// Create an empty struct block.
    #[must_use]
    pub const fn new(role: StructRole, index: usize) -> Self {
        Self {
            role,
            index,
            bbox: Rect::EMPTY,
            children: Vec::new(),
        }
    }
}

/// One inferred divider position on an axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPosition {
    /// The divider coordinate. Refined toward drawn rulings by
    /// reinforcement averaging.
    pub pos: f32,
    /// Left/top end of the gap the divider was inferred from.
    pub min: f32,
    /// Right/bottom end of that gap.
    pub max: f32,
    /// Number of content runs spanning through the divider; 0 is a clean gap.
    pub uncertainty: u32,
    /// Number of vector-rule endpoints snapped onto this divider.
    pub reinforcement: u32,
}

/// The divider positions of one axis, ordered by `pos`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridPositions {
    /// The positions, strictly ordered by `pos`. First and last are the
    /// table's outer edges and always have zero uncertainty.
    pub list: Vec<GridPosition>,
    /// Highest winding value seen while inferring this axis.
    pub max_uncertainty: u32,
}

impl GridPositions {
    /// Number of positions.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// True when no positions were inferred.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Coordinate of the first (outer) position.
    #[inline]
    #[must_use]
    pub fn first_pos(&self) -> f32 {
        self.list.first().map_or(0.0, |p| p.pos)
    }

    /// Coordinate of the last (outer) position.
    #[inline]
    #[must_use]
    pub fn last_pos(&self) -> f32 {
        self.list.last().map_or(0.0, |p| p.pos)
    }
}

/// Grid annotation attached to a detected table: the final divider positions
/// on both axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridBlock {
    /// Envelope of the grid positions.
    pub bbox: Rect,
    /// Column divider positions.
    pub xs: GridPositions,
    /// Row divider positions.
    pub ys: GridPositions,
}

/// A node of the page's block tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    /// Text content.
    Text(TextBlock),
    /// A filled rectangle.
    Vector(VectorBlock),
    /// A structural container.
    Struct(StructBlock),
    /// A table-grid annotation.
    Grid(GridBlock),
}

impl Block {
    /// Bounding rectangle of the block.
    #[must_use]
    pub fn bbox(&self) -> Rect {
        match self {
            Self::Text(b) => b.bbox,
            Self::Vector(b) => b.bbox,
            Self::Struct(b) => b.bbox,
            Self::Grid(b) => b.bbox,
        }
    }
}

/// A structured-text page: the root block list plus the page's media box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredPage {
    /// The page rectangle.
    pub mediabox: Rect,
    /// Top-level blocks, in reading order.
    pub blocks: Vec<Block>,
}

impl StructuredPage {
    /// Create an empty page.
    #[must_use]
    pub const fn new(mediabox: Rect) -> Self {
        Self {
            mediabox,
            blocks: Vec::new(),
        }
    }

    /// Append a top-level block.
    pub fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Check the preconditions of table detection: struct sibling indices
    /// strictly increasing per parent, all bounding geometry finite or empty.
    ///
    /// # Errors
    ///
    /// Returns [`GridTableError::MalformedPage`] naming the first violation.
    pub fn validate(&self) -> Result<()> {
        validate_blocks(&self.blocks, "page")
    }
}

fn validate_blocks(blocks: &[Block], context: &str) -> Result<()> {
    let mut last_index: Option<usize> = None;
    for block in blocks {
        let bbox = block.bbox();
        if !bbox.is_finite() && !bbox.is_empty() {
            return Err(GridTableError::MalformedPage {
                reason: format!("non-finite bbox under {context}"),
            });
        }
        if let Block::Struct(s) = block {
            if last_index.is_some_and(|prev| s.index <= prev) {
                return Err(GridTableError::MalformedPage {
                    reason: format!(
                        "struct index {} follows index {} under {context}",
                        s.index,
                        last_index.unwrap_or(0)
                    ),
                });
            }
            last_index = Some(s.index);
            validate_blocks(&s.children, &format!("{context}/{:?}", s.role))?;
        }
    }
    Ok(())
}

/// Next free struct index for an insertion at position `at`: one past the
/// highest index among preceding struct siblings.
#[must_use]
pub(crate) fn next_struct_index(blocks: &[Block], at: usize) -> usize {
    blocks[..at.min(blocks.len())]
        .iter()
        .filter_map(|b| match b {
            Block::Struct(s) => Some(s.index + 1),
            _ => None,
        })
        .last()
        .unwrap_or(0)
}

/// After inserting a struct block with index `inserted` at some position,
/// renumber the struct siblings that follow so indices stay strictly
/// increasing. Renumbering stops at the first sibling whose index is already
/// clear of the inserted one.
pub(crate) fn bump_struct_indices(blocks: &mut [Block], inserted: usize) {
    let mut next = inserted + 1;
    for block in blocks {
        if let Block::Struct(s) = block {
            if s.index > next {
                break;
            }
            s.index = next;
            next += 1;
        }
    }
}

/// Next free struct index for appending a child to `blocks`.
#[must_use]
pub(crate) fn append_struct_index(blocks: &[Block]) -> usize {
    next_struct_index(blocks, blocks.len())
}
