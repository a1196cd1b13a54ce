//! Progression logic: group play, advancement, knockout rounds, results and ratings.

mod advancement;
mod group_play;
mod knockout;
mod ranking;
mod rating;
mod results;

pub use advancement::{
    bye_count, largest_power_of_two_at_most, players_advancing, Advancement,
};
pub use group_play::{
    distribute_into_groups, generate_group_stage, group_count, optimal_group_size,
    round_robin_pairs, MAX_GROUP_SIZE, MIN_GROUP_SIZE,
};
pub use knockout::{champion, create_knockout_stage, pair_top_bottom, seed_knockout_stage};
pub use ranking::{compare_players, compare_ranks, sort_by_rating, sort_by_ranking};
pub use rating::{apply_event_ratings, calculate_new_rating, expected_score, k_factor, Outcome};
pub use results::{record_match_result, update_match_scores};
