#![no_main]

use libfuzzer_sys::fuzz_target;
use pagelift::candidate::ImageValidator;
use pagelift::{CandidateSelector, ExtractionCandidate, SelectionPolicy};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes offered as three competing extractions of one image
    let third = data.len() / 3;
    let candidates = vec![
        ExtractionCandidate::new("xref_1", data[..third].to_vec()),
        ExtractionCandidate::new("rendered", data[third..2 * third].to_vec()).with_quality(0.5),
        ExtractionCandidate::new("inline", data[2 * third..].to_vec()),
    ];

    let selection = CandidateSelector::new(SelectionPolicy::default()).select(candidates, &ImageValidator::default());
    assert!(selection.selected.is_some() || selection.rejected.len() == 3);
});
