//! Viewport-triggered effects: card reveal and stat counters.
use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::config::PageConfig;
use crate::{counter, dom};

pub const CARD_STAGGER_MS: u32 = 100;
pub const CARD_THRESHOLD: f64 = 0.1;
pub const STATS_THRESHOLD: f64 = 0.5;

pub fn stagger_delay_ms(index: usize) -> u32 {
    (index as u32).saturating_mul(CARD_STAGGER_MS)
}

/// Leading integer of a `data-target` attribute, the way the page writes them
/// (`"1200"`, `" 98 "`, `"500+"`).
pub fn parse_stat_target(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

fn observer(threshold: f64, callback: &ObserverCallback) -> Result<IntersectionObserver, JsValue> {
    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(threshold));
    IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
}

fn entries(list: &js_sys::Array) -> Vec<IntersectionObserverEntry> {
    list.iter()
        .filter_map(|v| v.dyn_into::<IntersectionObserverEntry>().ok())
        .collect()
}

pub fn init_card_reveal(doc: &Document) -> Result<(), JsValue> {
    let cards = dom::query_all(doc, ".card, .tool-card");
    if cards.is_empty() {
        return Ok(());
    }
    let callback: ObserverCallback = Closure::wrap(Box::new(
        |list: js_sys::Array, obs: IntersectionObserver| {
            for (index, entry) in entries(&list).into_iter().enumerate() {
                if !entry.is_intersecting() {
                    continue;
                }
                let card = entry.target();
                obs.unobserve(&card);
                Timeout::new(stagger_delay_ms(index), move || {
                    dom::set_style_of(&card, "opacity", "1");
                    dom::set_style_of(&card, "transform", "translateY(0)");
                })
                .forget();
            }
        },
    ) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);
    let obs = observer(CARD_THRESHOLD, &callback)?;
    callback.forget();

    for card in &cards {
        dom::set_style_of(card, "opacity", "0");
        dom::set_style_of(card, "transform", "translateY(30px)");
        dom::set_style_of(card, "transition", "all 0.6s ease");
        obs.observe(card);
    }
    Ok(())
}

pub fn init_stats_counter(doc: &Document, config: &PageConfig) -> Result<(), JsValue> {
    let Some(section) = dom::query::<web_sys::Element>(doc, ".stats") else {
        return Ok(());
    };
    let stats = dom::query_all(doc, ".stat-number[data-target]");
    let fired = Rc::new(Cell::new(false));
    let duration = config.stats_counter_ms;

    let callback: ObserverCallback = Closure::wrap(Box::new(
        move |list: js_sys::Array, _obs: IntersectionObserver| {
            if fired.get() || !entries(&list).iter().any(|e| e.is_intersecting()) {
                return;
            }
            fired.set(true);
            for stat in &stats {
                let target = stat
                    .get_attribute("data-target")
                    .as_deref()
                    .and_then(parse_stat_target);
                match target {
                    Some(end) => counter::animate(stat, 0, end, duration),
                    None => log::warn!("stat without a numeric data-target"),
                }
            }
        },
    ) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);
    let obs = observer(STATS_THRESHOLD, &callback)?;
    callback.forget();
    obs.observe(&section);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stagger_grows_by_index() {
        assert_eq!(stagger_delay_ms(0), 0);
        assert_eq!(stagger_delay_ms(3), 300);
    }

    #[test]
    fn stat_targets_parse_like_leading_integers() {
        assert_eq!(parse_stat_target("1200"), Some(1200));
        assert_eq!(parse_stat_target(" 98 "), Some(98));
        assert_eq!(parse_stat_target("500+"), Some(500));
        assert_eq!(parse_stat_target("-4"), Some(-4));
        assert_eq!(parse_stat_target("abc"), None);
        assert_eq!(parse_stat_target(""), None);
    }
}
