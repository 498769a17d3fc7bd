//! Click-outside dispatcher.
//!
//! One document-level click listener serves every component that wants to
//! close something when the user clicks elsewhere. Components register a
//! region (the elements that count as "inside") and a callback.
use std::cell::{Cell, RefCell};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MouseEvent, Node};

use crate::dom;

struct Region<R> {
    parts: R,
    on_outside: Box<dyn FnMut()>,
}

pub struct OutsideClicks<R> {
    regions: Vec<Region<R>>,
}

impl<R> Default for OutsideClicks<R> {
    fn default() -> Self {
        Self {
            regions: Vec::new(),
        }
    }
}

impl<R> OutsideClicks<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, parts: R, on_outside: impl FnMut() + 'static) {
        self.regions.push(Region {
            parts,
            on_outside: Box::new(on_outside),
        });
    }

    /// Notify every region the click landed outside of. Returns how many fired.
    pub fn dispatch(&mut self, mut is_inside: impl FnMut(&R) -> bool) -> usize {
        let mut fired = 0;
        for region in &mut self.regions {
            if !is_inside(&region.parts) {
                (region.on_outside)();
                fired += 1;
            }
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

thread_local! {
    static REGIONS: RefCell<OutsideClicks<Vec<Element>>> = RefCell::new(OutsideClicks::new());
    static INSTALLED: Cell<bool> = const { Cell::new(false) };
}

/// Register `parts` as one region; `on_outside` runs for clicks outside all of them.
pub fn register(parts: Vec<Element>, on_outside: impl FnMut() + 'static) -> Result<(), JsValue> {
    if !INSTALLED.with(Cell::get) {
        let doc = dom::document()?;
        dom::listen(&doc, "click", |evt: MouseEvent| {
            let Some(target) = evt.target().and_then(|t| t.dyn_into::<Node>().ok()) else {
                return;
            };
            REGIONS.with(|r| {
                if let Ok(mut regions) = r.try_borrow_mut() {
                    regions.dispatch(|parts| parts.iter().any(|p| p.contains(Some(&target))));
                }
            });
        })?;
        INSTALLED.with(|c| c.set(true));
    }
    REGIONS.with(|r| r.borrow_mut().register(parts, on_outside));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn only_regions_missed_by_the_click_fire() {
        let menu_closed = Rc::new(Cell::new(0));
        let bubble_closed = Rc::new(Cell::new(0));
        let mut clicks: OutsideClicks<&'static str> = OutsideClicks::new();
        let m = menu_closed.clone();
        clicks.register("menu", move || m.set(m.get() + 1));
        let b = bubble_closed.clone();
        clicks.register("bubble", move || b.set(b.get() + 1));

        // click inside the menu
        assert_eq!(clicks.dispatch(|r| *r == "menu"), 1);
        assert_eq!((menu_closed.get(), bubble_closed.get()), (0, 1));

        // click on empty page
        assert_eq!(clicks.dispatch(|_| false), 2);
        assert_eq!((menu_closed.get(), bubble_closed.get()), (1, 2));
        assert_eq!(clicks.len(), 2);
    }
}
