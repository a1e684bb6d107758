use serde::{Deserialize, Serialize};

use super::routing_instance::InstanceError;

pub type Time = i64;
pub type Cost = i64;

/// This matrix uses a flat structure to store the costs between locations.
/// To find the index for a pair of locations, use the formula:
/// `index = from * num_locations + to`, where `num_locations` is the total
/// number of locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelCostMatrix {
    costs: Vec<Cost>,
    num_locations: usize,
    is_symmetric: bool,
}

fn is_flat_matrix_symmetric(matrix: &[Cost], num_locations: usize) -> bool {
    for i in 0..num_locations {
        for j in (i + 1)..num_locations {
            if matrix[i * num_locations + j] != matrix[j * num_locations + i] {
                return false;
            }
        }
    }
    true
}

impl TravelCostMatrix {
    pub fn new(costs: Vec<Vec<Cost>>) -> Result<Self, InstanceError> {
        let num_locations = costs.len();
        if costs.iter().any(|row| row.len() != num_locations) {
            return Err(InstanceError::NonSquareMatrix);
        }

        let costs: Vec<Cost> = costs.into_iter().flatten().collect();
        let is_symmetric = is_flat_matrix_symmetric(&costs, num_locations);

        Ok(TravelCostMatrix {
            costs,
            num_locations,
            is_symmetric,
        })
    }

    /// Euclidean distances scaled by `precision` and rounded to the nearest integer.
    pub fn from_euclidean(coordinates: &[(f64, f64)], precision: Cost) -> Self {
        let num_locations = coordinates.len();
        let mut costs = vec![0; num_locations * num_locations];

        for (i, &(x1, y1)) in coordinates.iter().enumerate() {
            for (j, &(x2, y2)) in coordinates.iter().enumerate() {
                let distance = (x1 - x2).hypot(y1 - y2);
                costs[i * num_locations + j] = (distance * precision as f64).round() as Cost;
            }
        }

        TravelCostMatrix {
            costs,
            num_locations,
            is_symmetric: true,
        }
    }

    #[inline(always)]
    fn index(&self, from: usize, to: usize) -> usize {
        from * self.num_locations + to
    }

    #[inline(always)]
    pub fn cost(&self, from: usize, to: usize) -> Cost {
        self.costs[self.index(from, to)]
    }

    pub fn num_locations(&self) -> usize {
        self.num_locations
    }

    pub fn is_symmetric(&self) -> bool {
        self.is_symmetric
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_non_square_matrix() {
        let result = TravelCostMatrix::new(vec![vec![0, 1], vec![1]]);
        assert_eq!(result.unwrap_err(), InstanceError::NonSquareMatrix);
    }

    #[test]
    fn test_new_detects_asymmetry() {
        let symmetric = TravelCostMatrix::new(vec![vec![0, 4], vec![4, 0]]).unwrap();
        assert!(symmetric.is_symmetric());

        let asymmetric = TravelCostMatrix::new(vec![vec![0, 4], vec![5, 0]]).unwrap();
        assert!(!asymmetric.is_symmetric());
        assert_eq!(asymmetric.cost(1, 0), 5);
    }

    #[test]
    fn test_from_euclidean_scales_and_rounds() {
        let matrix = TravelCostMatrix::from_euclidean(&[(0.0, 0.0), (3.0, 4.0), (1.0, 1.0)], 10);

        assert_eq!(matrix.num_locations(), 3);
        assert_eq!(matrix.cost(0, 1), 50);
        assert_eq!(matrix.cost(1, 0), 50);
        // sqrt(2) * 10 = 14.14...
        assert_eq!(matrix.cost(0, 2), 14);
        assert_eq!(matrix.cost(2, 2), 0);
    }
}
