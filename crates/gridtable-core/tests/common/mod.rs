//! Shared fixtures for building synthetic structured pages.

// Each integration-test binary compiles its own copy of this module and
// uses a different subset of the helpers.
#![allow(dead_code)]

use gridtable_core::{
    Block, Glyph, GridBlock, Point, Quad, Rect, StructBlock, StructRole, StructuredPage, TextBlock,
    TextLine, VectorBlock, WritingMode,
};

/// A letter-sized page.
pub fn page() -> StructuredPage {
    StructuredPage::new(Rect::new(0.0, 0.0, 612.0, 792.0))
}

/// A glyph covering `r` exactly.
pub fn glyph(c: char, r: Rect) -> Glyph {
    Glyph::new(c, Quad::from_rect(r))
}

/// A horizontal line holding `glyphs`.
pub fn line(glyphs: Vec<Glyph>) -> TextLine {
    let mut l = TextLine::new(Point::new(1.0, 0.0), WritingMode::Horizontal);
    for g in glyphs {
        l.push_glyph(g);
    }
    l
}

/// A text block of one line.
pub fn one_line_block(glyphs: Vec<Glyph>) -> Block {
    let mut block = TextBlock::new();
    block.push_line(line(glyphs));
    Block::Text(block)
}

/// A single letter centred in the cell `r`, as its own text block.
pub fn letter_cell(c: char, r: Rect) -> Block {
    let center = r.center();
    one_line_block(vec![glyph(
        c,
        Rect::new(center.x - 1.0, center.y - 1.0, center.x + 1.0, center.y + 1.0),
    )])
}

/// A filled vector rectangle.
pub fn vector(r: Rect) -> Block {
    Block::Vector(VectorBlock { bbox: r })
}

/// One letter block per cell of a `cols`x`rows` grid of `cell`-sized cells
/// with its top-left corner at `origin`; letters run 'a', 'b', … in
/// row-major order.
pub fn letter_grid(origin: Point, cols: usize, rows: usize, cell: f32) -> Vec<Block> {
    let mut blocks = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let x = origin.x + cell * col as f32;
            let y = origin.y + cell * row as f32;
            let letter = (b'a' + ((row * cols + col) % 26) as u8) as char;
            blocks.push(letter_cell(letter, Rect::new(x, y, x + cell, y + cell)));
        }
    }
    blocks
}

/// All struct blocks of the given role, depth-first.
pub fn find_structs<'a>(blocks: &'a [Block], role: &StructRole) -> Vec<&'a StructBlock> {
    let mut out = Vec::new();
    for block in blocks {
        if let Block::Struct(s) = block {
            if s.role == *role {
                out.push(s);
            }
            out.extend(find_structs(&s.children, role));
        }
    }
    out
}

/// The single detected table of a page; panics unless exactly one exists.
pub fn only_table(page: &StructuredPage) -> &StructBlock {
    let tables = find_structs(&page.blocks, &StructRole::Table);
    assert_eq!(tables.len(), 1, "expected exactly one table");
    tables[0]
}

/// The rows of a table, in order.
pub fn rows_of(table: &StructBlock) -> Vec<&StructBlock> {
    table
        .children
        .iter()
        .filter_map(|b| match b {
            Block::Struct(s) if s.role == StructRole::TableRow => Some(s),
            _ => None,
        })
        .collect()
}

/// The cells of a row, in order.
pub fn cells_of(row: &StructBlock) -> Vec<&StructBlock> {
    row.children
        .iter()
        .filter_map(|b| match b {
            Block::Struct(s) if s.role == StructRole::TableCell => Some(s),
            _ => None,
        })
        .collect()
}

/// A table's grid annotation; panics when missing.
pub fn grid_of(table: &StructBlock) -> &GridBlock {
    for block in &table.children {
        if let Block::Grid(g) = block {
            return g;
        }
    }
    panic!("table has no grid annotation");
}

/// Every glyph code point under `blocks`, depth-first.
pub fn glyphs_under(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Text(t) => {
                for l in &t.lines {
                    out.extend(l.glyphs.iter().map(|g| g.c));
                }
            }
            Block::Struct(s) => out.push_str(&glyphs_under(&s.children)),
            Block::Vector(_) | Block::Grid(_) => {}
        }
    }
    out
}
