//! Representative selection for duplicate clusters
//!
//! Picks the member most likely to be informative, using text length as a
//! proxy rather than any quality score:
//! 1. longest non-empty `solution`
//! 2. otherwise longest non-empty `problem`
//! 3. otherwise longest `subject`
//!
//! Ties go to the lowest original index. Lengths are counted in characters.

use crate::ticket::TicketRecord;

/// Which field decided the representative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionBasis {
    Solution,
    Problem,
    Subject,
}

/// Longest non-empty field among `indices`, lowest index on ties
fn longest_by(
    indices: &[usize],
    tickets: &[TicketRecord],
    field: impl Fn(&TicketRecord) -> &str,
) -> Option<(usize, usize)> {
    indices
        .iter()
        .map(|&idx| (idx, field(&tickets[idx]).chars().count()))
        .filter(|&(_, len)| len > 0)
        .fold(None, |best: Option<(usize, usize)>, (idx, len)| match best {
            Some((best_idx, best_len))
                if best_len > len || (best_len == len && best_idx < idx) =>
            {
                Some((best_idx, best_len))
            }
            _ => Some((idx, len)),
        })
}

/// Pick the representative index and the field that decided it
///
/// `indices` must be non-empty and every index must be valid for `tickets`.
pub fn select_representative(
    indices: &[usize],
    tickets: &[TicketRecord],
) -> Option<(usize, SelectionBasis)> {
    let fallback = indices.iter().copied().min()?;

    if let Some((idx, _)) = longest_by(indices, tickets, TicketRecord::solution) {
        return Some((idx, SelectionBasis::Solution));
    }
    if let Some((idx, _)) = longest_by(indices, tickets, TicketRecord::problem) {
        return Some((idx, SelectionBasis::Problem));
    }
    let idx = longest_by(indices, tickets, TicketRecord::subject)
        .map(|(idx, _)| idx)
        .unwrap_or(fallback);
    Some((idx, SelectionBasis::Subject))
}

/// Pick the representative index of a cluster
pub fn pick_representative(indices: &[usize], tickets: &[TicketRecord]) -> Option<usize> {
    select_representative(indices, tickets).map(|(idx, _)| idx)
}
