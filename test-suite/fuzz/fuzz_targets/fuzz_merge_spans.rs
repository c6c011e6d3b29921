#![no_main]

use libfuzzer_sys::fuzz_target;
use pagelift::table::grid::RawMergeSpan;
use pagelift::CellGridValidator;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let rows = usize::from(data[0] % 16) + 1;
    let cols = usize::from(data[1] % 16) + 1;

    let coords: Vec<f64> = data[2..]
        .chunks_exact(8)
        .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect();
    let spans: Vec<RawMergeSpan> = coords
        .chunks_exact(4)
        .map(|c| RawMergeSpan::new(c[0], c[1], c[2], c[3]))
        .collect();

    let Ok(validator) = CellGridValidator::new(rows, cols) else {
        return;
    };
    let result = validator.validate(&spans).value;
    let spans = result.as_slice();
    for (i, a) in spans.iter().enumerate() {
        assert!(a.row_end < rows && a.col_end < cols);
        assert!(spans[i + 1..].iter().all(|b| !a.overlaps(b)));
    }
});
