//! Tournament business logic: setup, group stage, playoff, lifecycle and season stats.

mod lifecycle;
mod playoff;
mod season;
mod setup;
mod standings;

pub use lifecycle::{delete_last_match, is_reapable, last_match, tournament_name, DeletedMatch};
pub use playoff::{
    delete_last_playoff_match, record_playoff_match, start_playoff, PlayoffOutcome, PlayoffResult,
};
pub use season::{
    season_table, tournament_stats, GROUP_TOP_THREE_BONUS, POINTS_FIRST, POINTS_SECOND,
    POINTS_THIRD,
};
pub use setup::{draw_teams, start_tournament};
pub use standings::{
    compare_standings, delete_last_group_match, group_stage_complete, head_to_head,
    rank_standings, ranked_standings, reconcile_standings, recompute_standings,
    record_group_match,
};
