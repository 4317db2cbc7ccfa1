//! Table transcription: turning a simplified cell grid into a
//! Table/TableRow/TableCell subtree and moving the covered content into it.
//!
//! Spans are decided per cell from the crossing counters: a cell absorbs
//! neighbours to the right while the shared edge is crossed, unruled, and
//! uncertain, then absorbs rows below under the mirrored conditions. Content
//! is claimed by glyph center: a glyph belongs to the cell whose rectangle
//! contains the center of its bounding box.

use log::debug;

use crate::geom::Rect;
use crate::page::{
    append_struct_index, bump_struct_indices, next_struct_index, Block, StructBlock, StructRole,
    TextBlock, TextLine,
};

use super::cells::GridAnalysis;
use super::dividers::envelope;

/// Build the table subtree for a finished analysis, drain the covered
/// content out of `siblings` into its cells, and splice the table in just
/// after the last sibling it overlaps. Returns the table's position in
/// `siblings`.
pub fn transcribe_table(siblings: &mut Vec<Block>, ga: &GridAnalysis) -> usize {
    let w = ga.xpos.len();
    let h = ga.ypos.len();
    let mut sent = vec![false; w * h];

    let bounds = envelope(&ga.xpos, &ga.ypos);
    let mut insert_at = insertion_index(siblings, bounds);
    let table_index = next_struct_index(siblings, insert_at);
    let mut table = StructBlock::new(StructRole::Table, table_index);

    for y in 0..h - 1 {
        if (0..w - 1).all(|x| sent[x + y * w]) {
            continue;
        }
        let mut row = StructBlock::new(StructRole::TableRow, append_struct_index(&table.children));
        for x in 0..w - 1 {
            if sent[x + y * w] {
                continue;
            }
            let (cellw, cellh) = cell_span(ga, x, y);
            let rect = Rect::new(
                ga.xpos.list[x].pos,
                ga.ypos.list[y].pos,
                ga.xpos.list[x + cellw].pos,
                ga.ypos.list[y + cellh].pos,
            );
            debug!("cell ({x}, {y}) spans {cellw}x{cellh}");
            let mut cell =
                StructBlock::new(StructRole::TableCell, append_struct_index(&row.children));
            // The cell keeps the grid rectangle rather than its contents'
            // bbox; spanned rows would otherwise end up empty.
            cell.bbox = rect;
            move_contained_content(siblings, &mut cell.children, rect, &mut insert_at);
            for yy in y..y + cellh {
                for xx in x..x + cellw {
                    sent[xx + yy * w] = true;
                }
            }
            row.children.push(Block::Struct(cell));
        }
        row.bbox = Rect::new(
            ga.xpos.first_pos(),
            ga.ypos.list[y].pos,
            ga.xpos.last_pos(),
            ga.ypos.list[y + 1].pos,
        );
        table.bbox = table.bbox.union(row.bbox);
        table.children.push(Block::Struct(row));
    }

    bump_struct_indices(&mut siblings[insert_at..], table_index);
    siblings.insert(insert_at, Block::Struct(table));
    insert_at
}

/// Column and row span of the cell at `(x, y)`.
fn cell_span(ga: &GridAnalysis, x: usize, y: usize) -> (usize, usize) {
    let w = ga.xpos.len();
    let h = ga.ypos.len();

    let mut cellw = 1;
    for x2 in x + 1..w - 1 {
        let c = ga.cells.at(x2, y);
        if c.v_line > 0 || ga.xpos.list[x2].uncertainty == 0 || c.v_crossed == 0 {
            break;
        }
        cellw += 1;
    }

    let mut cellh = 1;
    'rows: for y2 in y + 1..h - 1 {
        // A certain divider is as good as a line.
        if ga.ypos.list[y2].uncertainty == 0 {
            break;
        }
        let c = ga.cells.at(x, y2);
        if c.h_line > 0 {
            break;
        }
        let mut h_crossed = c.h_crossed > 0;
        for x2 in x + 1..x + cellw {
            let c2 = ga.cells.at(x2, y2);
            if c2.h_line > 0
                || c2.v_line > 0
                || ga.xpos.list[x2].uncertainty == 0
                || c2.v_crossed == 0
            {
                break 'rows;
            }
            if c2.h_crossed > 0 {
                h_crossed = true;
            }
        }
        if !h_crossed {
            break;
        }
        cellh += 1;
    }

    (cellw, cellh)
}

/// Position just after the last sibling whose bbox meets `bounds`; the end
/// of the list when nothing does.
fn insertion_index(siblings: &[Block], bounds: Rect) -> usize {
    let mut after = None;
    for (i, block) in siblings.iter().enumerate() {
        if !block.bbox().intersect(bounds).is_empty() {
            after = Some(i);
        }
    }
    after.map_or(siblings.len(), |i| i + 1)
}

/// Move every piece of content inside `r` from `src` into `dest`.
///
/// Blocks are taken whole when fully covered. A partially covered text block
/// is split: fully covered lines move whole, partially covered lines are
/// divided glyph by glyph on bbox centers, with moved glyphs forming a new
/// line (same direction and writing mode) in a new text block appended to
/// `dest`. `insert_at` is a position in `src` kept stable across removals.
pub fn move_contained_content(
    src: &mut Vec<Block>,
    dest: &mut Vec<Block>,
    r: Rect,
    insert_at: &mut usize,
) {
    let mut i = 0;
    while i < src.len() {
        let bbox = src[i].bbox();
        let covered = bbox.intersect(r);
        if covered.is_empty() {
            i += 1;
            continue;
        }
        if covered == bbox {
            let block = src.remove(i);
            if i < *insert_at {
                *insert_at -= 1;
            }
            dest.push(block);
            continue;
        }
        if let Block::Text(text) = &mut src[i] {
            if let Some(split) = split_text_block(text, r) {
                text.recalc_bbox();
                dest.push(Block::Text(split));
            }
        }
        i += 1;
    }
}

/// Take the lines and glyphs of `text` covered by `r`; `None` when nothing
/// was covered. The caller recomputes the donor's bbox.
fn split_text_block(text: &mut TextBlock, r: Rect) -> Option<TextBlock> {
    let mut taken: Option<TextBlock> = None;
    let mut li = 0;
    while li < text.lines.len() {
        let lbox = text.lines[li].bbox;
        let covered = lbox.intersect(r);
        if covered.is_empty() {
            li += 1;
            continue;
        }
        if covered == lbox {
            let line = text.lines.remove(li);
            taken.get_or_insert_with(TextBlock::new).push_line(line);
            continue;
        }
        if let Some(part) = split_line(&mut text.lines[li], r) {
            taken.get_or_insert_with(TextBlock::new).push_line(part);
        }
        li += 1;
    }
    taken
}

/// Take the glyphs of `line` whose bbox centers fall inside `r`.
fn split_line(line: &mut TextLine, r: Rect) -> Option<TextLine> {
    let mut taken: Option<TextLine> = None;
    let mut gi = 0;
    while gi < line.glyphs.len() {
        let center = line.glyphs[gi].bounds().center();
        if !r.contains(center) {
            gi += 1;
            continue;
        }
        let glyph = line.glyphs.remove(gi);
        taken
            .get_or_insert_with(|| TextLine::new(line.dir, line.wmode))
            .push_glyph(glyph);
    }
    taken
}
