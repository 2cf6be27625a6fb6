// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use richview_engine::{Decoration, Document, Point, Range, generate_huge_document};

#[allow(dead_code)]
pub fn huge_document() -> Document {
    generate_huge_document(100, 7)
}

#[allow(dead_code)]
pub fn very_large_document() -> Document {
    generate_huge_document(5_000, 7)
}

/// One short decoration per top-level block
#[allow(dead_code)]
pub fn block_decorations(blocks: usize) -> Vec<Decoration> {
    (0..blocks)
        .map(|block| {
            Decoration::new(Range::new(
                Point::new(vec![block, 0], 1),
                Point::new(vec![block, 0], 4),
            ))
            .with_mark("highlight", "search")
        })
        .collect()
}
