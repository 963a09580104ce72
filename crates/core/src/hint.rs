//! Hint engine - single-step correction toward the canonical prefix
//!
//! All comparisons are positional. Segment values may repeat, so a segment is
//! always identified by where it sits, never by its text alone.

/// Where a hint takes the needed segment from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintMove {
    /// The segment is already placed further right; move it from `from` to `to`.
    Reorder { from: usize, to: usize },
    /// The segment is still in the pool at `pool_index`; insert it at `to`.
    FromPool { pool_index: usize, to: usize },
}

impl HintMove {
    /// Response position that becomes correct once the move is applied.
    pub fn target(&self) -> usize {
        match *self {
            HintMove::Reorder { to, .. } | HintMove::FromPool { to, .. } => to,
        }
    }
}

/// Length of the longest prefix of `response` that matches `segments`.
pub fn correct_prefix_len(response: &[String], segments: &[String]) -> usize {
    response
        .iter()
        .zip(segments)
        .take_while(|(placed, expected)| placed == expected)
        .count()
}

/// Positional sequence equality.
///
/// Joining the segments and comparing strings is not equivalent:
/// `["ab", "c"]` and `["a", "bc"]` concatenate identically.
pub fn is_solved(response: &[String], segments: &[String]) -> bool {
    response == segments
}

/// Work out the next hint without touching anything.
///
/// Returns `None` when the response is already complete and correct, or when
/// the needed segment is nowhere to be found (not reachable while pool and
/// response together hold exactly the puzzle's segments).
pub fn plan_hint(pool: &[String], response: &[String], segments: &[String]) -> Option<HintMove> {
    let k = correct_prefix_len(response, segments);
    let needed = segments.get(k)?;

    if let Some(offset) = response.iter().skip(k).position(|s| s == needed) {
        return Some(HintMove::Reorder {
            from: k + offset,
            to: k,
        });
    }

    pool.iter()
        .position(|s| s == needed)
        .map(|pool_index| HintMove::FromPool { pool_index, to: k })
}

/// Apply a planned move. Each segment is moved, never copied or dropped.
pub fn apply_hint(pool: &mut Vec<String>, response: &mut Vec<String>, hint: HintMove) {
    match hint {
        HintMove::Reorder { from, to } => {
            let segment = response.remove(from);
            response.insert(to, segment);
        }
        HintMove::FromPool { pool_index, to } => {
            let segment = pool.remove(pool_index);
            response.insert(to, segment);
        }
    }
}
