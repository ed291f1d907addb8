// Regular season schedules, playoff brackets and owner mood for a simulated sports league.
pub mod error;
pub mod format;
pub mod game;
pub mod owner_mood;
pub mod season;
pub mod team;
pub mod time;
pub mod types;

pub use error::{ConfigViolation, LeagueError, Result};
pub use format::LeagueConfig;
pub use game::{Game, Outcome, Phase};
pub use owner_mood::{MoodState, OwnerMoodTracker};
pub use season::{PlayoffProgress, Season, SeasonPhase};
pub use team::Team;
