// Native tests for the mini-game rules. No browser APIs are touched.

use weapon_shop_fx::game::{
    GameSession, Outcome, Phase, Probe, Rect, SpriteId, START_LIVES, WIN_CATCHES, probe,
};

fn spawn(session: &mut GameSession) -> SpriteId {
    session.spawn(600.0, 0.5, 0.5).expect("running session spawns").id
}

#[test]
fn ten_catches_win_with_full_lives() {
    let mut session = GameSession::new();
    let mut ended = None;
    for _ in 0..WIN_CATCHES {
        let id = spawn(&mut session);
        ended = session.resolve(id, Outcome::Caught).and_then(|r| r.ended);
    }
    assert_eq!(ended, Some(Phase::Won));
    assert_eq!(session.phase(), Phase::Won);
    assert_eq!(session.catches(), WIN_CATCHES);
    assert_eq!(session.lives(), START_LIVES);
}

#[test]
fn three_misses_lose_without_catches() {
    let mut session = GameSession::new();
    for _ in 0..START_LIVES {
        let id = spawn(&mut session);
        session.resolve(id, Outcome::Missed);
    }
    assert_eq!(session.phase(), Phase::Lost);
    assert_eq!(session.catches(), 0);
    assert_eq!(session.lives(), 0);
    assert!(session.spawn(600.0, 0.1, 0.1).is_none());
}

#[test]
fn finished_session_ignores_stragglers() {
    let mut session = GameSession::new();
    let late = spawn(&mut session);
    for _ in 0..START_LIVES {
        let id = spawn(&mut session);
        session.resolve(id, Outcome::Missed);
    }
    assert_eq!(session.falling(), 0);
    assert!(session.resolve(late, Outcome::Caught).is_none());
    assert_eq!(session.catches(), 0);
    assert_eq!(session.phase(), Phase::Lost);
}

#[test]
fn counters_never_exceed_spawned() {
    let mut session = GameSession::new();
    let outcomes = [
        Outcome::Caught,
        Outcome::Expired,
        Outcome::Missed,
        Outcome::Caught,
        Outcome::Expired,
        Outcome::Missed,
    ];
    let mut ids = Vec::new();
    for outcome in outcomes {
        let id = spawn(&mut session);
        ids.push(id);
        session.resolve(id, outcome);
        // resolving the same sprite twice is a no-op
        assert!(session.resolve(id, Outcome::Caught).is_none());
        assert!(session.catches() + session.missed() + session.expired() <= session.spawned());
    }
    assert_eq!(session.catches(), 2);
    assert_eq!(session.lives(), START_LIVES - 2);
    assert!(session.is_running());
}

#[test]
fn terminal_phases_are_exclusive() {
    let mut session = GameSession::new();
    for _ in 0..WIN_CATCHES - 1 {
        let id = spawn(&mut session);
        session.resolve(id, Outcome::Caught);
    }
    for _ in 0..START_LIVES - 1 {
        let id = spawn(&mut session);
        session.resolve(id, Outcome::Missed);
    }
    let a = spawn(&mut session);
    let b = spawn(&mut session);
    let first = session.resolve(a, Outcome::Caught).and_then(|r| r.ended);
    assert_eq!(first, Some(Phase::Won));
    assert!(session.resolve(b, Outcome::Missed).is_none());
    assert_eq!(session.phase(), Phase::Won);
    assert_eq!(session.lives(), 1);
}

#[test]
fn probe_catches_only_near_the_catcher() {
    let catcher = Rect::new(250.0, 500.0, 100.0, 40.0);
    let over = Rect::new(280.0, 480.0, 40.0, 40.0);
    let aside = Rect::new(20.0, 480.0, 40.0, 40.0);
    let fallen = Rect::new(280.0, 570.0, 40.0, 40.0);
    assert_eq!(probe(&over, &catcher, 560.0), Probe::Catch);
    assert_eq!(probe(&aside, &catcher, 560.0), Probe::Pending);
    assert_eq!(probe(&fallen, &catcher, 560.0), Probe::Miss);
}
