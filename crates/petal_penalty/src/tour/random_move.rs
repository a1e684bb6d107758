use rand::Rng;

use crate::{
    problem::{routing_instance::RoutingInstance, stop::StopIdx},
    tour::{arena_tour::ArenaTour, move_log::MoveLog},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Relocate,
    Reverse,
    ExchangeTails,
    Swap,
}

impl MoveKind {
    pub const ALL: [MoveKind; 4] = [
        MoveKind::Relocate,
        MoveKind::Reverse,
        MoveKind::ExchangeTails,
        MoveKind::Swap,
    ];
}

const MAX_ATTEMPTS: usize = 32;
const MAX_SEGMENT_LEN: usize = 3;

/// Applies one random valid edit to `tour`, pushing its entries onto `log`.
///
/// Draws are retried until an edit actually changes the tour. Returns `None`
/// when the instance is too small or every attempt was invalid.
pub fn apply_random_move<R>(
    instance: &RoutingInstance,
    tour: &mut ArenaTour,
    rng: &mut R,
    log: &mut MoveLog,
) -> Option<MoveKind>
where
    R: Rng + ?Sized,
{
    if instance.customers_len() < 2 {
        return None;
    }

    for _ in 0..MAX_ATTEMPTS {
        let kind = MoveKind::ALL[rng.random_range(0..MoveKind::ALL.len())];
        let logged = log.len();

        let result = match kind {
            MoveKind::Relocate => {
                let first = random_customer(instance, rng);
                let last = extend_segment(instance, tour, first, rng.random_range(0..MAX_SEGMENT_LEN));
                let after = StopIdx::new(rng.random_range(0..instance.dimension()));
                tour.relocate_segment(instance, first, last, after, log)
            }
            MoveKind::Reverse => {
                let first = random_customer(instance, rng);
                let last = extend_segment(instance, tour, first, rng.random_range(1..=MAX_SEGMENT_LEN));
                tour.reverse_segment(instance, first, last, log)
            }
            MoveKind::ExchangeTails => {
                let a = StopIdx::new(rng.random_range(0..instance.dimension()));
                let b = StopIdx::new(rng.random_range(0..instance.dimension()));
                tour.exchange_tails(instance, a, b, log)
            }
            MoveKind::Swap => {
                let a = random_customer(instance, rng);
                let b = random_customer(instance, rng);
                tour.swap_stops(instance, a, b, log)
            }
        };

        if result.is_ok() && log.len() > logged {
            return Some(kind);
        }
    }

    None
}

fn random_customer<R>(instance: &RoutingInstance, rng: &mut R) -> StopIdx
where
    R: Rng + ?Sized,
{
    instance.customer_stop(rng.random_range(0..instance.customers_len()))
}

/// Walks up to `steps` customers past `first` without leaving its route.
fn extend_segment(
    instance: &RoutingInstance,
    tour: &ArenaTour,
    first: StopIdx,
    steps: usize,
) -> StopIdx {
    let mut last = first;
    for _ in 0..steps {
        let next = tour.next_stop(last);
        if instance.is_depot_marker(next) {
            break;
        }
        last = next;
    }
    last
}
