//! Proptest strategies over synthetic pages

use crate::generators::{SyntheticPage, SyntheticPageBuilder};
use pagelift::page::RawLine;
use pagelift::PageInputBuilder;
use proptest::prelude::*;

/// One piece of page content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Piece {
    Paragraph { lines: usize },
    AlignedTable { rows: usize, cols: usize },
    PrimaryTable { rows: usize, cols: usize, merges: usize },
    Image { recoverable: bool },
    Malformed,
}

pub fn piece() -> impl Strategy<Value = Piece> {
    prop_oneof![
        4 => (1usize..6).prop_map(|lines| Piece::Paragraph { lines }),
        2 => (3usize..5, 2usize..4).prop_map(|(rows, cols)| Piece::AlignedTable { rows, cols }),
        1 => (1usize..5, 1usize..5, 0usize..4)
            .prop_map(|(rows, cols, merges)| Piece::PrimaryTable { rows, cols, merges }),
        1 => any::<bool>().prop_map(|recoverable| Piece::Image { recoverable }),
        1 => Just(Piece::Malformed),
    ]
}

/// Apply `pieces` in order, skipping whatever no longer fits on the page.
pub fn assemble(page_number: u32, seed: u64, pieces: &[Piece]) -> SyntheticPage {
    let mut builder = SyntheticPageBuilder::new(page_number, seed);
    for piece in pieces {
        if builder.remaining() < 140.0 {
            break;
        }
        builder = match *piece {
            Piece::Paragraph { lines } => builder.with_paragraph(lines),
            Piece::AlignedTable { rows, cols } => builder.with_aligned_table(rows, cols),
            Piece::PrimaryTable { rows, cols, merges } => builder.with_primary_table(rows, cols, merges),
            Piece::Image { recoverable } => builder.with_image(recoverable),
            Piece::Malformed => builder.with_malformed_block(),
        };
    }
    builder.build()
}

prop_compose! {
    /// A well-formed page assembled from up to eight pieces.
    pub fn synthetic_page()(
        page_number in 1u32..500,
        seed in any::<u64>(),
        pieces in prop::collection::vec(piece(), 0..8)
    ) -> SyntheticPage {
        assemble(page_number, seed, &pieces)
    }
}

/// Any `f64`, weighted toward the values readers get wrong.
pub fn hostile_coordinate() -> impl Strategy<Value = f64> {
    prop_oneof![
        6 => 0.0f64..800.0,
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
        1 => -1e9f64..1e9,
    ]
}

prop_compose! {
    pub fn hostile_line()(
        bbox in prop::array::uniform4(hostile_coordinate()),
        text in "[ a-zA-Z0-9.\\n•-]{0,24}",
        font_size in prop_oneof![Just(f64::NAN), 0.0f64..40.0]
    ) -> RawLine {
        RawLine::new(bbox, &text).with_font(font_size, false)
    }
}

prop_compose! {
    /// Unchecked reader output: arbitrary boxes, text and fonts.
    pub fn hostile_page()(
        blocks in prop::collection::vec(
            (prop::array::uniform4(hostile_coordinate()), prop::collection::vec(hostile_line(), 0..12), any::<bool>()),
            0..6
        )
    ) -> pagelift::PageInput {
        let mut builder = PageInputBuilder::new(1, 612.0, 792.0);
        for (bbox, lines, tagged) in blocks {
            builder = builder.raw_block(bbox, lines, tagged);
        }
        builder.build()
    }
}
