//! Right-of-way arbitration at shared nodes.
//!
//! A vehicle reaching the end of a leg asks [`can_proceed`] whether it may
//! enter the junction node.  The decision uses only the node's lock, its
//! claim queue, and the requester's approach vector, so repeated calls with
//! the same inputs always agree.
//!
//! # Rules
//!
//! 1. Claims by vehicles that are no longer live are pruned.
//! 2. A lock held by another vehicle denies.
//! 3. With no other claimant the requester is granted.
//! 4. Among all claimants (the requester included, timestamped `now` if it
//!    has not queued yet) a claimant is *outranked* when another claimant
//!    approaches from its right.  The earliest claimant that is not
//!    outranked wins; queue order breaks timestamp ties.
//! 5. When every claimant is outranked the approaches form a cycle, and the
//!    winner is the earliest claimant, then the smallest approach heading,
//!    then the lowest `VehicleId`.
//!
//! The caller reserves the node and dequeues its claim on a grant.

use std::cmp::Ordering;
use std::f32::consts::TAU;

use rustc_hash::FxHashSet;

use mc_core::{Point, SimTime, VehicleId};
use mc_network::{Claim, Node};

/// `contender` approaches from the right of `requester`.
#[inline]
pub fn is_right_of(requester: Point, contender: Point) -> bool {
    requester.cross(contender) < 0.0
}

/// Heading of an approach vector in `[0, 2π)`.
fn heading(v: Point) -> f32 {
    let a = v.y.atan2(v.x);
    if a < 0.0 { a + TAU } else { a }
}

/// Decide whether `requester` may enter `node`.
pub fn can_proceed(
    node: &mut Node,
    requester: VehicleId,
    approach: Point,
    live: &FxHashSet<VehicleId>,
    now: SimTime,
) -> bool {
    node.queue.retain(|c| live.contains(&c.vehicle));

    if node.locked_by.is_some_and(|holder| holder != requester) {
        return false;
    }
    if node.queue.iter().all(|c| c.vehicle == requester) {
        return true;
    }

    let mut claimants: Vec<Claim> = node.queue.clone();
    if node.claim_of(requester).is_none() {
        claimants.push(Claim { vehicle: requester, approach, since: now });
    }

    winner(&claimants) == Some(requester)
}

/// The claimant allowed to go first, or `None` for an empty set.
pub fn winner(claimants: &[Claim]) -> Option<VehicleId> {
    let outranked = |c: &Claim| {
        claimants
            .iter()
            .any(|o| o.vehicle != c.vehicle && is_right_of(c.approach, o.approach))
    };

    // `min_by` keeps the first of equal minima, so queue order breaks ties.
    let earliest_eligible = claimants
        .iter()
        .filter(|c| !outranked(c))
        .min_by(|a, b| a.since.cmp(&b.since));

    earliest_eligible
        .or_else(|| claimants.iter().min_by(|a, b| cycle_order(a, b)))
        .map(|c| c.vehicle)
}

fn cycle_order(a: &Claim, b: &Claim) -> Ordering {
    a.since
        .cmp(&b.since)
        .then_with(|| heading(a.approach).total_cmp(&heading(b.approach)))
        .then_with(|| a.vehicle.cmp(&b.vehicle))
}
