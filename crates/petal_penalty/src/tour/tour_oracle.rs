use crate::problem::stop::StopIdx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    Forward,
    Backward,
}

/// Adjacency primitives of a tour representation.
///
/// `successor` and `predecessor` answer in representation order, which may be
/// the reverse of travel order. `orientation` is the single global test telling
/// in which direction travel order runs; scanning with [`TourOracle::step`] in
/// that direction always visits stops in travel order.
pub trait TourOracle {
    fn orientation(&self) -> ScanDirection;
    fn successor(&self, stop: StopIdx) -> StopIdx;
    fn predecessor(&self, stop: StopIdx) -> StopIdx;

    #[inline(always)]
    fn step(&self, stop: StopIdx, direction: ScanDirection) -> StopIdx {
        match direction {
            ScanDirection::Forward => self.successor(stop),
            ScanDirection::Backward => self.predecessor(stop),
        }
    }
}
