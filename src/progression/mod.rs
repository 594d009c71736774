pub mod rewards;

pub use rewards::{Reward, RewardCalculator};
