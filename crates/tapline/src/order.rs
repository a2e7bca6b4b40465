//! Tap ordering.
//!
//! Positions a newly registered tap among the existing ones with a single
//! backward scan. Everything to the right of the scan cursor is known to
//! belong after the new tap: an element named in the new tap's `before` set
//! strikes that name and keeps the scan moving left, unsatisfied `before`
//! names keep the scan moving left unconditionally, and strictly
//! greater-stage elements are stepped over. The first element that triggers
//! none of those rules marks the insertion point.
//!
//! Equal-stage taps keep their registration order; the scan never moves an
//! element past another unless a constraint forces it. A `before` name that
//! matches no existing tap is not an error — the scan simply runs to the
//! front. Cyclic `before` chains across several taps are likewise accepted
//! and produce whatever order the scans yield.

use std::collections::HashSet;

use crate::types::Tap;

/// Insert `tap` into `taps` at the position its constraints call for.
pub(crate) fn insert<F>(taps: &mut Vec<Tap<F>>, tap: Tap<F>) {
    let stage = tap.stage;
    let mut before: HashSet<&str> = tap.before.iter().map(String::as_str).collect();

    let mut index = taps.len();
    while index > 0 {
        let existing = &taps[index - 1];
        if !before.is_empty() {
            let _ = before.remove(existing.name.as_str());
            index -= 1;
            continue;
        }
        if existing.stage > stage {
            index -= 1;
            continue;
        }
        break;
    }
    taps.insert(index, tap);
}
