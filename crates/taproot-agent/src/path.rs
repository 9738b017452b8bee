//! Path-lexicographic ordering on root paths.

use taproot_comm::ParticipantId;

/// Outcome of comparing two root paths over their common prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathOrder {
    /// The left path is the more depth-first of the two.
    LeftDf,
    /// The paths agree on their whole common prefix: one is a prefix of
    /// the other, or they are equal.
    Prefix,
    /// The right path is the more depth-first of the two.
    RightDf,
}

/// Compare two paths.
///
/// The first index where the paths differ decides: the path holding the
/// smaller id there is the more depth-first one. Paths that agree across
/// the common prefix are in the prefix relation.
pub fn path_order(a: &[ParticipantId], b: &[ParticipantId]) -> PathOrder {
    for (x, y) in a.iter().zip(b.iter()) {
        if x < y {
            return PathOrder::LeftDf;
        }
        if x > y {
            return PathOrder::RightDf;
        }
    }
    PathOrder::Prefix
}
