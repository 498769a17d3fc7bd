//! Catch game rules, independent of the DOM.
//!
//! The overlay feeds this session with spawn ticks, bounding boxes and
//! pointer positions; the session decides what a tick means and when the
//! game ends.
use std::collections::BTreeSet;

pub const WIN_CATCHES: u32 = 10;
pub const START_LIVES: u32 = 3;
pub const START_DELAY_MS: u32 = 1000;
pub const SPAWN_PERIOD_MS: u32 = 800;
pub const POLL_PERIOD_MS: u32 = 50;
/// Extra room below the catcher's bottom edge that still counts as a catch.
pub const CATCH_TOLERANCE_PX: f64 = 30.0;
pub const FALL_SECONDS_MIN: f64 = 2.5;
pub const FALL_SECONDS_MAX: f64 = 4.5;
/// Sprites spawn at least this far from either side of the play area.
pub const SPAWN_EDGE_PX: f64 = 40.0;
/// Rendered width of a falling sprite.
pub const SPRITE_WIDTH_PX: f64 = 70.0;
/// Half the catcher's width plus a little air.
pub const CATCHER_MARGIN_PX: f64 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    pub fn overlaps_horizontally(&self, other: &Rect) -> bool {
        self.left < other.right && self.right > other.left
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Running,
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Caught,
    Missed,
    /// The fall animation ended before either check fired.
    Expired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Probe {
    Catch,
    Miss,
    Pending,
}

/// One poll of a falling sprite against the catcher and the play area floor.
pub fn probe(sprite: &Rect, catcher: &Rect, area_bottom: f64) -> Probe {
    let in_band =
        sprite.bottom > catcher.top && sprite.bottom < catcher.bottom + CATCH_TOLERANCE_PX;
    if in_band && sprite.overlaps_horizontally(catcher) {
        Probe::Catch
    } else if sprite.top > area_bottom {
        Probe::Miss
    } else {
        Probe::Pending
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpriteId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPlan {
    pub id: SpriteId,
    pub left: f64,
    pub fall_seconds: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub catches: u32,
    pub lives: u32,
    /// Set when this resolution ended the game.
    pub ended: Option<Phase>,
}

#[derive(Debug)]
pub struct GameSession {
    catches: u32,
    lives: u32,
    phase: Phase,
    catcher_x: f64,
    spawned: u32,
    missed: u32,
    expired: u32,
    next_id: u32,
    falling: BTreeSet<SpriteId>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            catches: 0,
            lives: START_LIVES,
            phase: Phase::Running,
            catcher_x: 0.0,
            spawned: 0,
            missed: 0,
            expired: 0,
            next_id: 0,
            falling: BTreeSet::new(),
        }
    }

    /// Plan a new sprite. `x_roll` and `duration_roll` are uniform in `[0, 1)`.
    pub fn spawn(&mut self, area_width: f64, x_roll: f64, duration_roll: f64) -> Option<SpawnPlan> {
        if self.phase != Phase::Running {
            return None;
        }
        let x_roll = x_roll.clamp(0.0, 1.0);
        let duration_roll = duration_roll.clamp(0.0, 1.0);
        let span = (area_width - 2.0 * SPAWN_EDGE_PX - SPRITE_WIDTH_PX).max(0.0);
        let id = SpriteId(self.next_id);
        self.next_id += 1;
        self.spawned += 1;
        self.falling.insert(id);
        Some(SpawnPlan {
            id,
            left: x_roll * span + SPAWN_EDGE_PX,
            fall_seconds: FALL_SECONDS_MIN + duration_roll * (FALL_SECONDS_MAX - FALL_SECONDS_MIN),
        })
    }

    /// Record a sprite's outcome. Each sprite resolves at most once; later
    /// calls for the same id, and anything arriving after the game ended,
    /// return `None` and change nothing.
    pub fn resolve(&mut self, id: SpriteId, outcome: Outcome) -> Option<Resolution> {
        if !self.falling.remove(&id) || self.phase != Phase::Running {
            return None;
        }
        let mut ended = None;
        match outcome {
            Outcome::Caught => {
                self.catches += 1;
                if self.catches >= WIN_CATCHES {
                    ended = Some(Phase::Won);
                }
            }
            Outcome::Missed => {
                self.missed += 1;
                self.lives = self.lives.saturating_sub(1);
                if self.lives == 0 {
                    ended = Some(Phase::Lost);
                }
            }
            Outcome::Expired => self.expired += 1,
        }
        if let Some(phase) = ended {
            self.phase = phase;
            self.falling.clear();
        }
        Some(Resolution {
            outcome,
            catches: self.catches,
            lives: self.lives,
            ended,
        })
    }

    /// Move the catcher to follow the pointer, kept fully inside the area.
    pub fn move_catcher(&mut self, pointer_x: f64, area_width: f64) -> f64 {
        let max = area_width - CATCHER_MARGIN_PX;
        self.catcher_x = if max < CATCHER_MARGIN_PX {
            area_width / 2.0
        } else {
            pointer_x.clamp(CATCHER_MARGIN_PX, max)
        };
        self.catcher_x
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn catches(&self) -> u32 {
        self.catches
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn catcher_x(&self) -> f64 {
        self.catcher_x
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    pub fn missed(&self) -> u32 {
        self.missed
    }

    pub fn expired(&self) -> u32 {
        self.expired
    }

    pub fn falling(&self) -> usize {
        self.falling.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catcher() -> Rect {
        Rect::new(150.0, 500.0, 100.0, 40.0)
    }

    #[test]
    fn probe_catches_inside_band_with_overlap() {
        let sprite = Rect::new(180.0, 460.0, 70.0, 60.0);
        assert_eq!(probe(&sprite, &catcher(), 700.0), Probe::Catch);
    }

    #[test]
    fn probe_uses_tolerance_below_catcher() {
        // bottom at 565: below catcher bottom (540) but within 30px
        let sprite = Rect::new(180.0, 505.0, 70.0, 60.0);
        assert_eq!(probe(&sprite, &catcher(), 700.0), Probe::Catch);
        // bottom at 575: outside tolerance
        let sprite = Rect::new(180.0, 515.0, 70.0, 60.0);
        assert_eq!(probe(&sprite, &catcher(), 700.0), Probe::Pending);
    }

    #[test]
    fn probe_ignores_sprite_beside_catcher() {
        let sprite = Rect::new(260.0, 460.0, 70.0, 60.0);
        assert_eq!(probe(&sprite, &catcher(), 700.0), Probe::Pending);
        // touching edges do not overlap
        let sprite = Rect::new(250.0, 460.0, 70.0, 60.0);
        assert_eq!(probe(&sprite, &catcher(), 700.0), Probe::Pending);
    }

    #[test]
    fn probe_misses_once_top_passes_floor() {
        let sprite = Rect::new(10.0, 701.0, 70.0, 60.0);
        assert_eq!(probe(&sprite, &catcher(), 700.0), Probe::Miss);
        let sprite = Rect::new(10.0, 700.0, 70.0, 60.0);
        assert_eq!(probe(&sprite, &catcher(), 700.0), Probe::Pending);
    }

    #[test]
    fn spawn_stays_inside_and_duration_in_range() {
        let mut s = GameSession::new();
        let lo = s.spawn(400.0, 0.0, 0.0).unwrap();
        let hi = s.spawn(400.0, 0.999_999, 0.999_999).unwrap();
        assert_eq!(lo.left, SPAWN_EDGE_PX);
        assert!(hi.left + SPRITE_WIDTH_PX <= 400.0 - SPAWN_EDGE_PX);
        assert_eq!(lo.fall_seconds, FALL_SECONDS_MIN);
        assert!(hi.fall_seconds < FALL_SECONDS_MAX && hi.fall_seconds > 4.4);
        assert_ne!(lo.id, hi.id);
        assert_eq!(s.spawned(), 2);
    }

    #[test]
    fn narrow_area_pins_spawn_to_edge_margin() {
        let mut s = GameSession::new();
        let plan = s.spawn(50.0, 0.7, 0.5).unwrap();
        assert_eq!(plan.left, SPAWN_EDGE_PX);
        assert_eq!(plan.fall_seconds, 3.5);
    }

    #[test]
    fn sprite_never_overhangs_the_right_edge() {
        let mut s = GameSession::new();
        for width in [150.0, 400.0, 1280.0] {
            let plan = s.spawn(width, 0.999, 0.5).unwrap();
            assert!(plan.left + SPRITE_WIDTH_PX <= width, "width {width}: left {}", plan.left);
            assert!(plan.left >= SPAWN_EDGE_PX);
        }
    }

    #[test]
    fn sprite_resolves_once() {
        let mut s = GameSession::new();
        let plan = s.spawn(400.0, 0.5, 0.5).unwrap();
        assert!(s.resolve(plan.id, Outcome::Caught).is_some());
        assert!(s.resolve(plan.id, Outcome::Missed).is_none());
        assert!(s.resolve(plan.id, Outcome::Expired).is_none());
        assert_eq!(s.catches(), 1);
        assert_eq!(s.lives(), START_LIVES);
    }

    #[test]
    fn unknown_sprite_is_ignored() {
        let mut s = GameSession::new();
        assert!(s.resolve(SpriteId(42), Outcome::Missed).is_none());
        assert_eq!(s.lives(), START_LIVES);
    }

    #[test]
    fn expiry_costs_nothing() {
        let mut s = GameSession::new();
        let plan = s.spawn(400.0, 0.1, 0.1).unwrap();
        let r = s.resolve(plan.id, Outcome::Expired).unwrap();
        assert_eq!(r.ended, None);
        assert_eq!((s.catches(), s.lives(), s.expired()), (0, START_LIVES, 1));
    }

    #[test]
    fn no_spawns_after_game_ends() {
        let mut s = GameSession::new();
        for _ in 0..START_LIVES {
            let p = s.spawn(400.0, 0.5, 0.5).unwrap();
            s.resolve(p.id, Outcome::Missed);
        }
        assert_eq!(s.phase(), Phase::Lost);
        assert!(s.spawn(400.0, 0.5, 0.5).is_none());
    }

    #[test]
    fn sprites_in_flight_are_discarded_when_game_ends() {
        let mut s = GameSession::new();
        let late = s.spawn(400.0, 0.5, 0.5).unwrap();
        for _ in 0..WIN_CATCHES {
            let p = s.spawn(400.0, 0.5, 0.5).unwrap();
            s.resolve(p.id, Outcome::Caught);
        }
        assert_eq!(s.phase(), Phase::Won);
        assert_eq!(s.falling(), 0);
        assert!(s.resolve(late.id, Outcome::Missed).is_none());
        assert_eq!(s.lives(), START_LIVES);
    }

    #[test]
    fn catcher_is_clamped_to_area() {
        let mut s = GameSession::new();
        assert_eq!(s.move_catcher(-20.0, 400.0), CATCHER_MARGIN_PX);
        assert_eq!(s.move_catcher(395.0, 400.0), 340.0);
        assert_eq!(s.move_catcher(200.0, 400.0), 200.0);
        assert_eq!(s.move_catcher(10.0, 100.0), 50.0);
        assert_eq!(s.catcher_x(), 50.0);
    }
}
