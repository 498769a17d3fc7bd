//! Theme cycler.
//!
//! The toggle button rotates through a fixed palette list. Visiting every
//! palette since the last reset unlocks the mini-game, after which the tried
//! set starts over.
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, MouseEvent};

use crate::store::{Records, keys};
use crate::{dom, game};

const UNLOCK_DELAY_MS: u32 = 500;
const PULSE_MS: u32 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
}

pub const PALETTES: [Palette; 5] = [
    Palette {
        name: "gold",
        primary: "#FFD700",
        secondary: "#FFA500",
        accent: "#00D4FF",
    },
    Palette {
        name: "blue",
        primary: "#00D4FF",
        secondary: "#0088FF",
        accent: "#9D4EDD",
    },
    Palette {
        name: "purple",
        primary: "#9D4EDD",
        secondary: "#7209B7",
        accent: "#FF006E",
    },
    Palette {
        name: "green",
        primary: "#00FF88",
        secondary: "#00CC6A",
        accent: "#FFD700",
    },
    Palette {
        name: "red",
        primary: "#FF3366",
        secondary: "#FF0044",
        accent: "#FFD700",
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cycle {
    pub index: usize,
    /// Size of the tried set after this step, counted before any reset.
    pub tried: usize,
    pub unlocked: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThemeState {
    current: usize,
    tried: BTreeSet<usize>,
    count: usize,
}

impl ThemeState {
    /// Rebuild from persisted values. Out-of-range entries are dropped and
    /// the current palette counts as tried.
    pub fn restore(stored_index: Option<usize>, stored_tried: &[usize], count: usize) -> Self {
        let count = count.max(1);
        let current = stored_index.filter(|&i| i < count).unwrap_or(0);
        let mut tried: BTreeSet<usize> = stored_tried.iter().copied().filter(|&i| i < count).collect();
        tried.insert(current);
        let mut state = Self {
            current,
            tried,
            count,
        };
        state.reset_if_complete();
        state
    }

    fn reset_if_complete(&mut self) -> bool {
        if self.tried.len() >= self.count {
            self.tried.clear();
            true
        } else {
            false
        }
    }

    pub fn cycle(&mut self) -> Cycle {
        self.current = (self.current + 1) % self.count;
        self.tried.insert(self.current);
        let tried = self.tried.len();
        let unlocked = self.reset_if_complete();
        Cycle {
            index: self.current,
            tried,
            unlocked,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn tried(&self) -> Vec<usize> {
        self.tried.iter().copied().collect()
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

fn apply(doc: &Document, toggle: &HtmlElement, palette: &Palette) {
    if let Some(root) = doc
        .document_element()
        .and_then(|e| e.dyn_into::<HtmlElement>().ok())
    {
        dom::set_style(&root, "--primary-gold", palette.primary);
        dom::set_style(&root, "--secondary-gold", palette.secondary);
        dom::set_style(&root, "--accent-blue", palette.accent);
    }
    dom::set_style(toggle, "border-color", palette.primary);
}

pub fn init(doc: &Document, records: &Records) -> Result<(), JsValue> {
    let Some(toggle) = dom::by_id::<HtmlElement>(doc, "themeToggle") else {
        return Ok(());
    };
    let stored_tried: Vec<usize> = records.load(keys::TRIED_THEMES).unwrap_or_default();
    let state = ThemeState::restore(records.load(keys::THEME), &stored_tried, PALETTES.len());
    apply(doc, &toggle, &PALETTES[state.current()]);
    let state = Rc::new(RefCell::new(state));

    let doc = doc.clone();
    let records = records.clone();
    let button = toggle.clone();
    dom::listen(&toggle, "click", move |_evt: MouseEvent| {
        let (step, tried) = {
            let mut st = state.borrow_mut();
            (st.cycle(), st.tried())
        };
        let palette = &PALETTES[step.index];
        apply(&doc, &button, palette);
        records.save(keys::THEME, &step.index);
        records.save(keys::TRIED_THEMES, &tried);

        dom::set_style(&button, "transform", "scale(1.2)");
        let pulsed = button.clone();
        Timeout::new(PULSE_MS, move || dom::set_style(&pulsed, "transform", "scale(1)")).forget();
        log::info!("theme: {} ({}/{})", palette.name, step.tried, PALETTES.len());

        if step.unlocked {
            log::info!("every theme tried, opening the secret stage");
            Timeout::new(UNLOCK_DELAY_MS, || {
                if let Err(err) = game::launch() {
                    log::error!("mini-game failed to start: {err:?}");
                }
            })
            .forget();
        }
    })?;
    Ok(())
}
