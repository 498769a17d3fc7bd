//! Secret catch mini-game, unlocked by trying every theme.
//!
//! `session` holds the rules and is host-testable; `overlay` owns the DOM,
//! timers and input for the single open session.
mod assets;
mod overlay;
mod session;

pub use assets::{POSE_EMOJI, POSE_IMAGES, SpriteArt, SpriteFace, roll_index};
pub use overlay::{close, is_open, launch};
pub use session::{
    CATCH_TOLERANCE_PX, CATCHER_MARGIN_PX, FALL_SECONDS_MAX, FALL_SECONDS_MIN, GameSession,
    Outcome, POLL_PERIOD_MS, Phase, Probe, Rect, Resolution, SPAWN_EDGE_PX, SPAWN_PERIOD_MS,
    SPRITE_WIDTH_PX, START_DELAY_MS, START_LIVES, SpawnPlan, SpriteId, WIN_CATCHES, probe,
};
