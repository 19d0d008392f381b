#![forbid(unsafe_code)]

//! Growing requests from minimum towards natural size.

use crate::SizeRequest;

/// Hand out `extra` units to `sizes`, growing each `minimum` towards its
/// `natural`, and return what is left once every request is natural.
///
/// Requests with the smallest gap (natural − minimum) are served first, each
/// receiving at most an even share of what remains. The result is that as
/// many requests as possible reach natural size, the assignment changes
/// continuously with `extra`, and a request that did not reach natural size
/// got at least as much as any request that did.
///
/// Ties in gap are broken by index: later requests are served first.
///
/// Non-positive `extra` leaves `sizes` untouched and returns 0.
pub fn distribute_natural_allocation(extra: i32, sizes: &mut [SizeRequest]) -> i32 {
    if extra <= 0 || sizes.is_empty() {
        return 0;
    }

    // Descending gap; ties descending by index.
    let mut spreading: Vec<usize> = (0..sizes.len()).collect();
    spreading.sort_by(|&a, &b| {
        sizes[b]
            .gap()
            .cmp(&sizes[a].gap())
            .then_with(|| b.cmp(&a))
    });

    let mut remaining = extra;
    for (i, &slot) in spreading.iter().enumerate().rev() {
        if remaining <= 0 {
            break;
        }
        let share = i as i32 + 1;
        let glue = (remaining + share - 1) / share;
        let grow = glue.min(sizes[slot].gap());
        sizes[slot].minimum += grow;
        remaining -= grow;
    }
    remaining
}
