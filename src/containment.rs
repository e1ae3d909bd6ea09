use tracing::instrument;

use crate::{
    error::GeometryError,
    util::{overlap_area, rect_area, within_closed},
    Bounded, ContainmentOptions, DegeneratePolicy,
};

/// Zero-area candidates are resolved by `policy` and never yield NaN.
pub fn containment_ratio<F: Bounded, C: Bounded>(
    frame: &F,
    candidate: &C,
    policy: DegeneratePolicy,
) -> Result<f64, GeometryError> {
    let frame_rect = frame.rect();
    let candidate_rect = candidate.rect();

    let candidate_area = rect_area(&candidate_rect);
    if candidate_area > 0.0 {
        return Ok(overlap_area(&frame_rect, &candidate_rect) / candidate_area);
    }

    match policy {
        DegeneratePolicy::ByPosition => {
            if within_closed(&candidate_rect, &frame_rect) {
                Ok(1.0)
            } else {
                Ok(0.0)
            }
        }
        DegeneratePolicy::Reject => Err(GeometryError::DegenerateCandidate {
            id: candidate.box_id(),
        }),
    }
}

#[instrument(level = "trace", skip_all, fields(candidates = candidates.len()))]
pub fn boxes_inside_frame<'a, F: Bounded, C: Bounded>(
    frame: &F,
    candidates: &'a [C],
    options: &ContainmentOptions,
) -> Result<Vec<&'a C>, GeometryError> {
    let mut inside = Vec::new();
    for candidate in candidates {
        let ratio = containment_ratio(frame, candidate, options.degenerate)?;
        if ratio >= options.threshold {
            inside.push(candidate);
        }
    }
    log::trace!(
        "{} of {} candidates inside frame {:?}",
        inside.len(),
        candidates.len(),
        frame.box_id()
    );
    Ok(inside)
}
