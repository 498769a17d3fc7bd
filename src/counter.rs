//! Count-up animation for numeric displays.
//!
//! The interpolation is a pure stepper ([`CounterAnimation`]); the DOM side
//! drives it from a 16ms interval. Each display element owns at most one
//! running animation: starting a new one on the same element cancels the
//! previous interval first ([`AnimationSlots`]).
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use gloo_timers::callback::Interval;
use web_sys::Element;

pub const TICK_MS: u32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub value: i64,
    pub finished: bool,
}

#[derive(Clone, Debug)]
pub struct CounterAnimation {
    start: i64,
    end: i64,
    ticks_total: u32,
    ticks_done: u32,
}

impl CounterAnimation {
    pub fn new(start: i64, end: i64, duration_ms: u32) -> Self {
        Self {
            start,
            end,
            ticks_total: duration_ms.div_ceil(TICK_MS).max(1),
            ticks_done: 0,
        }
    }

    /// Advance one tick. Intermediate values are floored; the last tick is `end`.
    pub fn next_frame(&mut self) -> Frame {
        if self.ticks_done < self.ticks_total {
            self.ticks_done += 1;
        }
        if self.ticks_done >= self.ticks_total {
            return Frame {
                value: self.end,
                finished: true,
            };
        }
        let progress = self.ticks_done as f64 / self.ticks_total as f64;
        let current = self.start as f64 + (self.end as f64 - self.start as f64) * progress;
        Frame {
            value: current.floor() as i64,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.ticks_done >= self.ticks_total
    }

    pub fn ticks_total(&self) -> u32 {
        self.ticks_total
    }
}

/// Thousands grouping as shown on the page (`1234567` -> `1,234,567`).
pub fn format_grouped(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

struct Slot<H> {
    token: u64,
    handle: Option<H>,
}

/// One running animation per display target, identified by a token.
pub struct AnimationSlots<H> {
    slots: HashMap<String, Slot<H>>,
    next_token: u64,
}

impl<H> Default for AnimationSlots<H> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
            next_token: 0,
        }
    }
}

impl<H> AnimationSlots<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `target`. Returns the new token and the previous
    /// owner's handle, which the caller drops to cancel it.
    pub fn claim(&mut self, target: &str) -> (u64, Option<H>) {
        self.next_token += 1;
        let token = self.next_token;
        let previous = self.slots.insert(
            target.to_string(),
            Slot {
                token,
                handle: None,
            },
        );
        (token, previous.and_then(|s| s.handle))
    }

    /// Store the running handle. A stale token gets its handle back.
    pub fn attach(&mut self, target: &str, token: u64, handle: H) -> Option<H> {
        match self.slots.get_mut(target) {
            Some(slot) if slot.token == token => {
                slot.handle = Some(handle);
                None
            }
            _ => Some(handle),
        }
    }

    pub fn owns(&self, target: &str, token: u64) -> bool {
        self.slots.get(target).is_some_and(|s| s.token == token)
    }

    /// Finish `token`'s animation. Only the current owner can release.
    pub fn release(&mut self, target: &str, token: u64) -> Option<H> {
        if self.owns(target, token) {
            self.slots.remove(target).and_then(|s| s.handle)
        } else {
            None
        }
    }

    pub fn running(&self) -> usize {
        self.slots.len()
    }
}

thread_local! {
    static COUNTERS: RefCell<AnimationSlots<Interval>> = RefCell::new(AnimationSlots::new());
    static NEXT_SLOT: Cell<u32> = const { Cell::new(0) };
}

const SLOT_ATTR: &str = "data-counter-slot";

fn slot_key(el: &Element) -> String {
    if let Some(key) = el.get_attribute(SLOT_ATTR) {
        return key;
    }
    let n = NEXT_SLOT.with(|c| {
        c.set(c.get() + 1);
        c.get()
    });
    let key = format!("counter-{n}");
    el.set_attribute(SLOT_ATTR, &key).ok();
    key
}

/// Animate `el`'s text from `start` to `end` over `duration_ms`.
pub fn animate(el: &Element, start: i64, end: i64, duration_ms: u32) {
    let key = slot_key(el);
    let (token, previous) = COUNTERS.with(|c| c.borrow_mut().claim(&key));
    drop(previous);

    let mut anim = CounterAnimation::new(start, end, duration_ms);
    let target = el.clone();
    let tick_key = key.clone();
    let interval = Interval::new(TICK_MS, move || {
        let frame = anim.next_frame();
        target.set_text_content(Some(&format_grouped(frame.value)));
        if frame.finished {
            let done = COUNTERS.with(|c| c.borrow_mut().release(&tick_key, token));
            drop(done);
        }
    });
    let stale = COUNTERS.with(|c| c.borrow_mut().attach(&key, token, interval));
    drop(stale);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(start: i64, end: i64, duration: u32) -> Vec<i64> {
        let mut anim = CounterAnimation::new(start, end, duration);
        let mut values = Vec::new();
        loop {
            let frame = anim.next_frame();
            values.push(frame.value);
            if frame.finished {
                break;
            }
        }
        values
    }

    #[test]
    fn final_value_is_exact_for_many_inputs() {
        for &(s, e) in &[(0, 1), (0, 7), (0, 1234), (5, 5), (100, 3), (-20, 17), (0, 999_999), (-10, i64::MAX), (i64::MAX, i64::MIN)] {
            for &d in &[0, 1, 15, 16, 17, 1500, 2000, 3333] {
                let values = run(s, e, d);
                assert_eq!(*values.last().unwrap(), e, "start {s} end {e} duration {d}");
            }
        }
    }

    #[test]
    fn tick_count_follows_duration() {
        assert_eq!(CounterAnimation::new(0, 10, 1500).ticks_total(), 94);
        assert_eq!(CounterAnimation::new(0, 10, 16).ticks_total(), 1);
        assert_eq!(CounterAnimation::new(0, 10, 0).ticks_total(), 1);
    }

    #[test]
    fn ascending_values_are_monotonic_and_floored() {
        let values = run(0, 100, 160);
        assert_eq!(values.len(), 10);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(values[0], 10);
        let values = run(0, 7, 48);
        assert_eq!(values, vec![2, 4, 7]);
    }

    #[test]
    fn finished_animation_stays_at_end() {
        let mut anim = CounterAnimation::new(0, 3, 32);
        anim.next_frame();
        anim.next_frame();
        assert!(anim.is_finished());
        assert_eq!(anim.next_frame(), Frame { value: 3, finished: true });
    }

    #[test]
    fn grouping() {
        assert_eq!(format_grouped(0), "0");
        assert_eq!(format_grouped(999), "999");
        assert_eq!(format_grouped(1000), "1,000");
        assert_eq!(format_grouped(1234567), "1,234,567");
        assert_eq!(format_grouped(-45000), "-45,000");
    }

    #[test]
    fn second_claim_on_same_target_hands_back_first_handle() {
        let mut slots: AnimationSlots<&'static str> = AnimationSlots::new();
        let (first, prev) = slots.claim("visitorCount");
        assert!(prev.is_none());
        assert_eq!(slots.attach("visitorCount", first, "first-interval"), None);

        let (second, prev) = slots.claim("visitorCount");
        assert_eq!(prev, Some("first-interval"));
        assert!(!slots.owns("visitorCount", first));
        assert!(slots.owns("visitorCount", second));
        assert_eq!(slots.running(), 1);

        // the superseded animation cannot release the new owner
        assert_eq!(slots.release("visitorCount", first), None);
        assert!(slots.owns("visitorCount", second));
    }

    #[test]
    fn stale_attach_returns_handle_and_owner_release_clears() {
        let mut slots: AnimationSlots<u8> = AnimationSlots::new();
        let (old, _) = slots.claim("a");
        let (new, _) = slots.claim("a");
        assert_eq!(slots.attach("a", old, 1), Some(1));
        assert_eq!(slots.attach("a", new, 2), None);
        assert_eq!(slots.release("a", new), Some(2));
        assert_eq!(slots.running(), 0);
    }

    #[test]
    fn targets_are_independent() {
        let mut slots: AnimationSlots<u8> = AnimationSlots::new();
        let (a, _) = slots.claim("a");
        let (b, _) = slots.claim("b");
        slots.attach("a", a, 1);
        slots.attach("b", b, 2);
        assert_eq!(slots.running(), 2);
        assert_eq!(slots.release("a", a), Some(1));
        assert!(slots.owns("b", b));
    }
}
