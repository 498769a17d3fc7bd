//! Hidden keyboard combo ("god mode").
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use web_sys::{Document, KeyboardEvent};

use crate::dom;
use crate::store::{Records, keys};

pub const CODE: [&str; 10] = [
    "ArrowUp",
    "ArrowUp",
    "ArrowDown",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "ArrowLeft",
    "ArrowRight",
    "b",
    "a",
];
const EFFECT_MS: u32 = 3000;
const STYLE_ID: &str = "godModeStyles";
const RAINBOW_CSS: &str =
    "@keyframes rainbow { 0% { filter: hue-rotate(0deg); } 100% { filter: hue-rotate(360deg); } }";
const GOD_MODE_TEXT: &str =
    "GOD MODE ACTIVATED!\n\nあなたは真の訪問者です！\nLv.99達成おめでとうございます！";

/// Sliding window over the last `CODE.len()` keys.
#[derive(Debug, Default)]
pub struct ComboDetector {
    recent: VecDeque<String>,
}

impl ComboDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one key; true when the window now equals the code.
    pub fn push(&mut self, key: &str) -> bool {
        self.recent.push_back(key.to_string());
        while self.recent.len() > CODE.len() {
            self.recent.pop_front();
        }
        self.recent.len() == CODE.len() && self.recent.iter().zip(CODE).all(|(a, b)| a == b)
    }
}

fn activate(doc: &Document, records: &Records) -> Result<(), JsValue> {
    log::info!("god mode activated");
    if doc.get_element_by_id(STYLE_ID).is_none() {
        if let Some(head) = doc.head() {
            let style = doc.create_element("style")?;
            style.set_id(STYLE_ID);
            style.set_text_content(Some(RAINBOW_CSS));
            head.append_child(&style)?;
        }
    }
    let Some(body) = doc.body() else {
        return Ok(());
    };
    dom::set_style(&body, "animation", "rainbow 2s linear infinite");
    dom::notify(GOD_MODE_TEXT);
    records.save(keys::GOD_MODE, &true);
    Timeout::new(EFFECT_MS, move || dom::set_style(&body, "animation", "")).forget();
    Ok(())
}

pub fn init(doc: &Document, records: &Records) -> Result<(), JsValue> {
    let detector = Rc::new(RefCell::new(ComboDetector::new()));
    let records = records.clone();
    let page = doc.clone();
    dom::listen(doc, "keydown", move |evt: KeyboardEvent| {
        if detector.borrow_mut().push(&evt.key()) {
            if let Err(err) = activate(&page, &records) {
                log::warn!("god mode effect failed: {err:?}");
            }
        }
    })
}
