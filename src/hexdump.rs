//! Canonical hex + ASCII dump rendering.
//!
//! The row layout is fixed and consumed by downstream tooling, so it must not
//! drift: an 8-digit lowercase hex offset, sixteen two-digit hex cells with a
//! double gap after the eighth, then the printable-ASCII panel between pipes.
//! Short final rows keep the panel aligned by padding the missing hex cells.

use std::{cmp, fmt::Write};

use crate::buffer::LineBuffer;

const ROW_LEN: usize = 16;

fn cell_separator(index: usize) -> &'static str {
    if index == 7 {
        "  "
    } else {
        " "
    }
}

fn printable(byte: u8) -> char {
    if (0x20..=0x7e).contains(&byte) {
        byte as char
    } else {
        '.'
    }
}

/// Renders `data` as dump rows into `buf`, stopping when the input is
/// exhausted or the buffer is full.
pub fn write_rows<const N: usize>(buf: &mut LineBuffer<N>, data: &[u8]) {
    let mut off = 0;
    while off < data.len() && !buf.is_full() {
        let row = &data[off..cmp::min(off + ROW_LEN, data.len())];

        let _ = write!(buf, "{off:08x}  ");
        for (i, byte) in row.iter().enumerate() {
            let _ = write!(buf, "{:02x}{}", byte, cell_separator(i));
        }
        for i in row.len()..ROW_LEN {
            let _ = write!(buf, "  {}", cell_separator(i));
        }

        let _ = buf.write_str("  |");
        for byte in row {
            let _ = buf.write_char(printable(*byte));
        }
        let _ = buf.write_str("|\n");

        off += ROW_LEN;
    }
}
