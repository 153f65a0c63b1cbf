//! Grid subdivision of a screen region.
//!
//! A region is split into `k × k` cells numbered `1..=k²` in row-major
//! order starting at the top-left:
//!
//! ```text
//! ┌───┬───┬───┐
//! │ 1 │ 2 │ 3 │
//! ├───┼───┼───┤
//! │ 4 │ 5 │ 6 │
//! ├───┼───┼───┤
//! │ 7 │ 8 │ 9 │
//! └───┴───┴───┘
//! ```
//!
//! # Rounding
//!
//! Base cell sizes use integer division (`width / k`, `height / k`).  The
//! last column and the last row absorb the remainder, so the cells always
//! tile the region exactly.  The overlay draws its lines from the same
//! [`partition`] output, so what the user sees and what a digit selects
//! never disagree.

use crate::command::Rect;

/// Default grid arity (3 × 3 cells).
pub const DEFAULT_ARITY: u32 = 3;

/// Split `region` into `arity²` cells in row-major order.
///
/// Returns an empty list for `arity == 0`.
pub fn partition(region: Rect, arity: u32) -> Vec<Rect> {
    let k = arity as usize;
    let mut cells = Vec::with_capacity(k * k);
    for row in 0..arity {
        for col in 0..arity {
            cells.push(cell_at(region, arity, col, row));
        }
    }
    cells
}

/// Cell number `n` (1-based), or `None` when `n` is outside `1..=arity²`.
pub fn cell(region: Rect, arity: u32, n: u32) -> Option<Rect> {
    let count = arity.checked_mul(arity)?;
    if n == 0 || n > count {
        return None;
    }
    let index = n - 1;
    Some(cell_at(region, arity, index % arity, index / arity))
}

fn cell_at(region: Rect, arity: u32, col: u32, row: u32) -> Rect {
    let (x, width) = span(region.x, region.width, arity, col);
    let (y, height) = span(region.y, region.height, arity, row);
    Rect::new(x, y, width, height)
}

/// Offset and length of slice `i` of `arity` along one axis.
fn span(origin: i32, length: u32, arity: u32, i: u32) -> (i32, u32) {
    let base = length / arity;
    let start = origin + (base * i) as i32;
    if i + 1 == arity {
        (start, length - base * (arity - 1))
    } else {
        (start, base)
    }
}

//  Tests
