// Native tests for persisted page state and the pure parts of the page
// components. Storage goes through the in-memory backend.

use std::rc::Rc;

use weapon_shop_fx::config::PageConfig;
use weapon_shop_fx::contact::{Delivery, Notice, settle};
use weapon_shop_fx::counter::{CounterAnimation, format_grouped};
use weapon_shop_fx::store::{KeyValueStore, MemoryStore, Records, StoreError, keys};
use weapon_shop_fx::tally::ToolClickTally;
use weapon_shop_fx::theme::{PALETTES, ThemeState};
use weapon_shop_fx::visitor::{VisitorRecord, register_visit};

fn records() -> (Rc<MemoryStore>, Records) {
    let store = Rc::new(MemoryStore::new());
    let records = Records::new(store.clone(), "aiWeaponShop_");
    (store, records)
}

#[test]
fn five_theme_clicks_unlock_the_game_once() {
    let mut theme = ThemeState::restore(None, &[], PALETTES.len());
    let launches = (0..PALETTES.len() - 1)
        .map(|_| theme.cycle())
        .filter(|c| c.unlocked)
        .count();
    assert_eq!(launches, 1);
    assert_eq!(theme.current(), PALETTES.len() - 1);
    assert!(theme.tried().is_empty());
    // the next lap needs every palette again
    assert!(!theme.cycle().unlocked);
}

#[test]
fn theme_progress_survives_a_reload() {
    let (_, records) = records();
    let mut theme = ThemeState::restore(None, &[], PALETTES.len());
    theme.cycle();
    theme.cycle();
    records.save(keys::THEME, &theme.current());
    records.save(keys::TRIED_THEMES, &theme.tried());

    let index: Option<usize> = records.load(keys::THEME);
    let tried: Vec<usize> = records.load(keys::TRIED_THEMES).unwrap_or_default();
    let restored = ThemeState::restore(index, &tried, PALETTES.len());
    assert_eq!(restored, theme);
}

#[test]
fn counter_lands_exactly_on_target() {
    let mut anim = CounterAnimation::new(0, 1234, 1500);
    let mut last = None;
    let mut frames = 0;
    loop {
        let frame = anim.next_frame();
        frames += 1;
        if let Some(prev) = last {
            assert!(frame.value >= prev);
        }
        last = Some(frame.value);
        if frame.finished {
            break;
        }
    }
    assert_eq!(last, Some(1234));
    assert_eq!(frames, anim.ticks_total());
    assert_eq!(format_grouped(1234), "1,234");
}

#[test]
fn visitor_count_increments_once_per_day() {
    let (_, records) = records();
    let (first, dirty) = register_visit(records.load(keys::VISITOR), "2026-10-16");
    assert!(dirty);
    records.save(keys::VISITOR, &first);

    let (same_day, dirty) = register_visit(records.load(keys::VISITOR), "2026-10-16");
    assert!(!dirty);
    assert_eq!(same_day, first);

    let (next_day, _) = register_visit(records.load(keys::VISITOR), "2026-10-17");
    assert_eq!(next_day.visit_streak_days, 2);
    assert!(!next_day.first_visit);
}

#[test]
fn stale_schema_is_treated_as_absent() {
    let (store, records) = records();
    store
        .set_raw("aiWeaponShop_visitorData", r#"{"version":0,"data":{}}"#)
        .unwrap();
    assert!(matches!(
        records.get::<VisitorRecord>(keys::VISITOR),
        Err(StoreError::SchemaMismatch { found: 0, .. })
    ));
    assert_eq!(records.load::<VisitorRecord>(keys::VISITOR), None);

    store.set_raw("aiWeaponShop_toolClicks", "not json").unwrap();
    assert_eq!(records.load::<ToolClickTally>(keys::TOOL_CLICKS), None);
}

#[test]
fn tool_clicks_accumulate_in_the_store() {
    let (_, records) = records();
    for tool in ["GifMojo", "GifMojo", "PromptSmith"] {
        let mut tally: ToolClickTally = records.load(keys::TOOL_CLICKS).unwrap_or_default();
        tally.record(tool);
        records.save(keys::TOOL_CLICKS, &tally);
    }
    let tally: ToolClickTally = records.load(keys::TOOL_CLICKS).unwrap_or_default();
    assert_eq!(tally.count("GifMojo"), 2);
    assert_eq!(tally.total(), 3);

    records.remove(keys::TOOL_CLICKS).unwrap();
    assert_eq!(records.load::<ToolClickTally>(keys::TOOL_CLICKS), None);
}

#[test]
fn contact_fallback_counts_as_sent() {
    let notice = settle(Err("fetch rejected"), || Ok::<(), &str>(()));
    assert_eq!(notice, Notice::Sent(Delivery::Fallback));
    assert!(notice.is_success());
}

#[test]
fn partial_config_keeps_defaults() {
    let config = PageConfig::from_json(Some(r#"{"particles": true, "form_endpoint": null}"#));
    assert!(config.particles);
    assert_eq!(config.form_endpoint, None);
    assert_eq!(config.stats_counter_ms, PageConfig::default().stats_counter_ms);
}
