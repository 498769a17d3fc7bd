//! Navigation: mobile menu, in-page smooth scroll, header scroll effect and
//! the scroll-to-top button.
use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, MouseEvent, ScrollBehavior, ScrollToOptions, Window};

use crate::{dom, outside};

pub const MENU_OPEN_LABEL: &str = "✕";
pub const MENU_CLOSED_LABEL: &str = "☰";
/// Gap left between the sticky header and a scrolled-to section.
pub const ANCHOR_GAP_PX: f64 = 20.0;
pub const HEADER_SOLID_AFTER_PX: f64 = 100.0;
pub const HEADER_HIDE_AFTER_PX: f64 = 500.0;
pub const SCROLL_TOP_VISIBLE_AFTER_PX: f64 = 500.0;

pub fn menu_label(open: bool) -> &'static str {
    if open {
        MENU_OPEN_LABEL
    } else {
        MENU_CLOSED_LABEL
    }
}

/// Scroll position that puts a section just below the header.
pub fn anchor_scroll_top(target_offset_top: f64, header_height: f64) -> f64 {
    target_offset_top - header_height - ANCHOR_GAP_PX
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderState {
    pub solid: bool,
    pub hidden: bool,
}

impl HeaderState {
    pub fn for_scroll(current: f64, last: f64) -> Self {
        Self {
            solid: current > HEADER_SOLID_AFTER_PX,
            hidden: current > last && current > HEADER_HIDE_AFTER_PX,
        }
    }
}

pub fn scroll_top_visible(scroll_y: f64) -> bool {
    scroll_y > SCROLL_TOP_VISIBLE_AFTER_PX
}

fn smooth_scroll_to(win: &Window, top: f64) {
    let opts = ScrollToOptions::new();
    opts.set_top(top);
    opts.set_behavior(ScrollBehavior::Smooth);
    win.scroll_to_with_scroll_to_options(&opts);
}

pub fn init_mobile_menu(doc: &Document) -> Result<(), JsValue> {
    let (Some(toggle), Some(links)) = (
        doc.get_element_by_id("menuToggle"),
        doc.get_element_by_id("navLinks"),
    ) else {
        return Ok(());
    };

    let close = {
        let toggle = toggle.clone();
        let links = links.clone();
        move || {
            links.class_list().remove_1("active").ok();
            toggle.set_text_content(Some(MENU_CLOSED_LABEL));
        }
    };

    {
        let links = links.clone();
        let button = toggle.clone();
        dom::listen(&toggle, "click", move |_evt: MouseEvent| {
            let open = links.class_list().toggle("active").unwrap_or(false);
            button.set_text_content(Some(menu_label(open)));
        })?;
    }

    for link in dom::query_all_in(&links, "a") {
        let close = close.clone();
        dom::listen(&link, "click", move |_evt: MouseEvent| close())?;
    }

    outside::register(vec![links, toggle], close)
}

pub fn init_smooth_scroll(doc: &Document) -> Result<(), JsValue> {
    for anchor in dom::query_all(doc, r##"a[href^="#"]"##) {
        let doc = doc.clone();
        let link = anchor.clone();
        dom::listen(&anchor, "click", move |evt: MouseEvent| {
            let href = link.get_attribute("href").unwrap_or_default();
            if href == "#" {
                evt.prevent_default();
                return;
            }
            let Some(target) = dom::query::<HtmlElement>(&doc, &href) else {
                return;
            };
            evt.prevent_default();
            let header_height = dom::query::<HtmlElement>(&doc, "header")
                .map(|h| h.offset_height() as f64)
                .unwrap_or(0.0);
            if let Some(win) = web_sys::window() {
                smooth_scroll_to(
                    &win,
                    anchor_scroll_top(target.offset_top() as f64, header_height),
                );
            }
        })?;
    }
    Ok(())
}

pub fn init_header_scroll(doc: &Document) -> Result<(), JsValue> {
    let Some(header) = dom::query::<HtmlElement>(doc, "header") else {
        return Ok(());
    };
    let win = dom::window()?;
    let last = Rc::new(Cell::new(0.0_f64));
    let scrolled = win.clone();
    dom::listen(&win, "scroll", move |_evt: web_sys::Event| {
        let current = scrolled.page_y_offset().unwrap_or(0.0);
        let state = HeaderState::for_scroll(current, last.get());
        if state.solid {
            dom::set_style(&header, "background", "rgba(10, 14, 39, 0.98)");
            dom::set_style(&header, "box-shadow", "0 4px 30px rgba(0, 0, 0, 0.5)");
        } else {
            dom::set_style(&header, "background", "rgba(10, 14, 39, 0.9)");
            dom::set_style(&header, "box-shadow", "0 4px 20px rgba(0, 0, 0, 0.3)");
        }
        let shift = if state.hidden {
            "translateY(-100%)"
        } else {
            "translateY(0)"
        };
        dom::set_style(&header, "transform", shift);
        last.set(current);
    })
}

pub fn init_scroll_to_top(doc: &Document) -> Result<(), JsValue> {
    let Some(body) = doc.body() else {
        return Ok(());
    };
    let button: Element = doc.create_element("button")?;
    button.set_class_name("scroll-to-top");
    button.set_text_content(Some("↑"));
    button.set_attribute("style", "position: fixed; bottom: 30px; right: 30px; width: 50px; height: 50px; border-radius: 50%; background: linear-gradient(135deg, var(--primary-gold), var(--accent-blue)); border: none; color: var(--darker-bg); font-size: 1.5rem; font-weight: 700; cursor: pointer; opacity: 0; pointer-events: none; transition: all 0.3s ease; z-index: 999; box-shadow: 0 4px 20px rgba(255, 215, 0, 0.4);")?;
    body.append_child(&button)?;

    let win = dom::window()?;
    {
        let button = button.clone();
        let scrolled = win.clone();
        dom::listen(&win, "scroll", move |_evt: web_sys::Event| {
            let visible = scroll_top_visible(scrolled.page_y_offset().unwrap_or(0.0));
            dom::set_style_of(&button, "opacity", if visible { "1" } else { "0" });
            dom::set_style_of(&button, "pointer-events", if visible { "all" } else { "none" });
        })?;
    }
    dom::listen(&button, "click", move |_evt: MouseEvent| smooth_scroll_to(&win, 0.0))?;
    {
        let hovered = button.clone();
        dom::listen(&button, "mouseenter", move |_evt: MouseEvent| {
            dom::set_style_of(&hovered, "transform", "translateY(-5px) scale(1.1)");
            dom::set_style_of(&hovered, "box-shadow", "0 8px 30px rgba(255, 215, 0, 0.6)");
        })?;
    }
    let left = button.clone();
    dom::listen(&button, "mouseleave", move |_evt: MouseEvent| {
        dom::set_style_of(&left, "transform", "translateY(0) scale(1)");
        dom::set_style_of(&left, "box-shadow", "0 4px 20px rgba(255, 215, 0, 0.4)");
    })
}
