//! Shopkeeper speech bubble.
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, MouseEvent};

use crate::game::roll_index;
use crate::{dom, outside};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Greeting {
    pub main: &'static str,
    pub sub: &'static str,
}

pub const GREETINGS: [Greeting; 4] = [
    Greeting {
        main: "いらっしゃい！",
        sub: "今日も最強装備、揃ってるよ！",
    },
    Greeting {
        main: "よう、冒険者！",
        sub: "何かお探しかい？",
    },
    Greeting {
        main: "おっ、来たな！",
        sub: "いいツールあるぜ！",
    },
    Greeting {
        main: "へいらっしゃい！",
        sub: "今日のオススメはGifMojoだ！",
    },
];

pub fn pick_greeting(roll: f64) -> &'static Greeting {
    &GREETINGS[roll_index(roll, GREETINGS.len())]
}

pub fn init(doc: &Document) -> Result<(), JsValue> {
    let (Some(area), Some(bubble)) = (
        doc.get_element_by_id("shopkeeperArea"),
        doc.get_element_by_id("shopkeeperBubble"),
    ) else {
        return Ok(());
    };

    let shown = bubble.clone();
    dom::listen(&area, "click", move |_evt: MouseEvent| {
        let visible = shown.class_list().toggle("show").unwrap_or(false);
        if visible {
            log::debug!("shopkeeper: welcome!");
        }
        let greeting = pick_greeting(dom::random());
        if let Some(text) = dom::query_in::<Element>(&shown, ".bubble-text") {
            text.set_text_content(Some(greeting.main));
        }
        if let Some(sub) = dom::query_in::<Element>(&shown, ".bubble-subtext") {
            sub.set_text_content(Some(greeting.sub));
        }
    })?;

    let hidden = bubble.clone();
    outside::register(vec![area, bubble], move || {
        hidden.class_list().remove_1("show").ok();
    })
}
