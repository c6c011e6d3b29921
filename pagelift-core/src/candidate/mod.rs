//! Multi-strategy candidate selection
//!
//! Ambiguous regions are recovered by several extraction strategies at
//! once; each result is wrapped as an [`ExtractionCandidate`] and this
//! module decides which one survives.
//!
//! Two selection modes are provided:
//!
//! - [`CandidateSelector::select`] ranks an eager set of candidates. Trusted
//!   methods win when they produced a viable payload, otherwise the highest
//!   quality score wins.
//! - [`first_valid`] walks a lazy, priority-ordered sequence and stops at the
//!   first candidate the validator accepts, so later strategies never run.
//!
//! Either way a candidate that fails validation is discarded and the next
//! best one is tried. Running out of candidates is a normal miss, not an
//! error.
//!
//! # Example
//!
//! ```rust
//! use pagelift::candidate::{CandidateSelector, ExtractionCandidate, SelectionPolicy};
//!
//! let selector = CandidateSelector::new(SelectionPolicy::default());
//! let candidates = vec![
//!     ExtractionCandidate::new("xref_direct", vec![0u8; 50]),
//!     ExtractionCandidate::new("high_res", vec![0u8; 5000]),
//! ];
//! let selection = selector.select(candidates, &|_: &Vec<u8>| -> Result<(), String> { Ok(()) });
//! assert_eq!(selection.selected.unwrap().method, "high_res");
//! ```

pub mod image;
pub mod namespace;

pub use self::image::ImageValidator;
pub use namespace::CandidateNamespace;

use crate::error::{Defect, DefectKind};
use tracing::{debug, warn};

/// Size measure used for viability checks and the default quality score.
pub trait CandidatePayload {
    fn byte_size(&self) -> usize;
}

impl CandidatePayload for Vec<u8> {
    fn byte_size(&self) -> usize {
        self.len()
    }
}

/// One strategy's output for a region.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractionCandidate<P> {
    /// Strategy name, e.g. `xref_direct` or `line_alignment`
    pub method: String,
    pub payload: P,
    /// Ranking score; larger is better
    pub quality_score: f64,
}

impl<P: CandidatePayload> ExtractionCandidate<P> {
    /// Creates a candidate scored by its payload size.
    pub fn new(method: impl Into<String>, payload: P) -> Self {
        let quality_score = payload.byte_size() as f64;
        Self {
            method: method.into(),
            payload,
            quality_score,
        }
    }

    pub fn byte_size(&self) -> usize {
        self.payload.byte_size()
    }
}

impl<P> ExtractionCandidate<P> {
    /// Override the default size-based score.
    pub fn with_quality(mut self, quality_score: f64) -> Self {
        self.quality_score = quality_score;
        self
    }
}

/// Accepts or rejects a chosen payload.
pub trait CandidateValidator<P: ?Sized> {
    fn validate(&self, payload: &P) -> Result<(), String>;
}

impl<P: ?Sized, F> CandidateValidator<P> for F
where
    F: Fn(&P) -> Result<(), String>,
{
    fn validate(&self, payload: &P) -> Result<(), String> {
        self(payload)
    }
}

/// How a method name is matched against the trusted list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrustRule {
    Exact(String),
    Prefix(String),
}

impl TrustRule {
    pub fn matches(&self, method: &str) -> bool {
        match self {
            TrustRule::Exact(name) => method == name,
            TrustRule::Prefix(prefix) => method.starts_with(prefix.as_str()),
        }
    }
}

/// Selection policy
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SelectionPolicy {
    /// Methods preferred over raw score when their payload is viable
    pub trusted: Vec<TrustRule>,
    /// Minimum byte size for a trusted candidate to win outright
    pub min_viable_size: usize,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            trusted: vec![
                TrustRule::Prefix("xref".to_string()),
                TrustRule::Exact("extracted".to_string()),
            ],
            min_viable_size: 1000,
        }
    }
}

impl SelectionPolicy {
    pub fn with_trusted(mut self, trusted: Vec<TrustRule>) -> Self {
        self.trusted = trusted;
        self
    }

    pub fn with_min_viable_size(mut self, size: usize) -> Self {
        self.min_viable_size = size;
        self
    }

    pub fn is_trusted(&self, method: &str) -> bool {
        self.trusted.iter().any(|rule| rule.matches(method))
    }
}

/// A candidate dropped by validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub method: String,
    pub reason: String,
}

/// Outcome of a selection round.
#[derive(Debug, Clone)]
pub struct Selection<P> {
    pub selected: Option<ExtractionCandidate<P>>,
    pub rejected: Vec<Rejection>,
}

impl<P> Selection<P> {
    pub fn is_miss(&self) -> bool {
        self.selected.is_none()
    }

    /// Rejections as page defects.
    pub fn defects(&self) -> Vec<Defect> {
        self.rejected
            .iter()
            .map(|r| {
                Defect::new(
                    DefectKind::CandidateRejected,
                    format!("{}: {}", r.method, r.reason),
                )
            })
            .collect()
    }

    pub fn into_payload(self) -> Option<P> {
        self.selected.map(|c| c.payload)
    }
}

/// Picks the surviving candidate for a region.
#[derive(Debug, Clone, Default)]
pub struct CandidateSelector {
    policy: SelectionPolicy,
}

impl CandidateSelector {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    /// Select from an eager candidate set.
    ///
    /// Returns `selected: None` when the input is empty or every candidate
    /// fails validation.
    pub fn select<P, V>(&self, candidates: Vec<ExtractionCandidate<P>>, validator: &V) -> Selection<P>
    where
        P: CandidatePayload,
        V: CandidateValidator<P> + ?Sized,
    {
        let mut remaining = candidates;
        let mut rejected = Vec::new();

        while let Some(index) = self.pick(&remaining) {
            let candidate = remaining.remove(index);
            match validator.validate(&candidate.payload) {
                Ok(()) => {
                    debug!(
                        method = %candidate.method,
                        size = candidate.byte_size(),
                        "selected candidate"
                    );
                    return Selection {
                        selected: Some(candidate),
                        rejected,
                    };
                }
                Err(reason) => {
                    warn!(method = %candidate.method, %reason, "candidate failed validation");
                    rejected.push(Rejection {
                        method: candidate.method,
                        reason,
                    });
                }
            }
        }

        Selection {
            selected: None,
            rejected,
        }
    }

    /// Index of the candidate the policy prefers among `candidates`.
    fn pick<P: CandidatePayload>(&self, candidates: &[ExtractionCandidate<P>]) -> Option<usize> {
        let best_trusted = best_by_score(
            candidates
                .iter()
                .enumerate()
                .filter(|(_, c)| self.policy.is_trusted(&c.method)),
        );

        match best_trusted {
            Some(index) if candidates[index].byte_size() >= self.policy.min_viable_size => {
                Some(index)
            }
            _ => best_by_score(candidates.iter().enumerate()),
        }
    }
}

/// Highest score wins; on ties the earlier candidate is kept.
fn best_by_score<'a, P: 'a>(
    candidates: impl Iterator<Item = (usize, &'a ExtractionCandidate<P>)>,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in candidates {
        match best {
            Some((_, score)) if candidate.quality_score <= score => {}
            _ => best = Some((index, candidate.quality_score)),
        }
    }
    best.map(|(index, _)| index)
}

/// Take the first candidate the validator accepts from a priority-ordered,
/// lazily produced sequence.
pub fn first_valid<P, I, V>(candidates: I, validator: &V) -> Selection<P>
where
    I: IntoIterator<Item = ExtractionCandidate<P>>,
    V: CandidateValidator<P> + ?Sized,
{
    let mut rejected = Vec::new();
    for candidate in candidates {
        match validator.validate(&candidate.payload) {
            Ok(()) => {
                debug!(method = %candidate.method, "first valid candidate");
                return Selection {
                    selected: Some(candidate),
                    rejected,
                };
            }
            Err(reason) => {
                debug!(method = %candidate.method, %reason, "candidate skipped");
                rejected.push(Rejection {
                    method: candidate.method,
                    reason,
                });
            }
        }
    }
    Selection {
        selected: None,
        rejected,
    }
}
