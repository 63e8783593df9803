pub mod assignment;
pub mod probability;

pub use assignment::{assignment_cost, linear_sum_assignment};
pub use probability::{
    clip_and_normalize, cumulative, is_distribution, normalize_in_place, normalized_or_uniform,
    uniform,
};
