//! Optional drifting-dust background.
//!
//! A fixed, click-through canvas behind the page with a handful of gold dots.
//! The frame loop is a `requestAnimationFrame` chain; it stops while the tab is
//! hidden and picks up again when the tab comes back.
use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, Event, HtmlCanvasElement};

use crate::dom;

pub const PARTICLE_COUNT: usize = 50;
const CANVAS_ID: &str = "particleCanvas";
const CANVAS_STYLE: &str = "position: fixed; top: 0; left: 0; width: 100%; height: 100%; pointer-events: none; z-index: 0; opacity: 0.3;";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub vx: f64,
    pub vy: f64,
    pub opacity: f64,
}

impl Particle {
    /// Build one particle from uniform rolls in `[0, 1)`.
    pub fn from_rolls(width: f64, height: f64, mut roll: impl FnMut() -> f64) -> Self {
        Self {
            x: roll() * width,
            y: roll() * height,
            size: roll() * 2.0 + 1.0,
            vx: roll() * 0.5 - 0.25,
            vy: roll() * 0.5 - 0.25,
            opacity: roll() * 0.5 + 0.2,
        }
    }

    /// Advance one frame, re-entering on the opposite edge.
    pub fn step(&mut self, width: f64, height: f64) {
        self.x += self.vx;
        self.y += self.vy;
        if self.x < 0.0 {
            self.x = width;
        } else if self.x > width {
            self.x = 0.0;
        }
        if self.y < 0.0 {
            self.y = height;
        } else if self.y > height {
            self.y = 0.0;
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Field {
    pub width: f64,
    pub height: f64,
    pub particles: Vec<Particle>,
}

impl Field {
    pub fn seeded(width: f64, height: f64, mut roll: impl FnMut() -> f64) -> Self {
        let particles = (0..PARTICLE_COUNT)
            .map(|_| Particle::from_rolls(width, height, &mut roll))
            .collect();
        Self {
            width,
            height,
            particles,
        }
    }

    pub fn step(&mut self) {
        for p in &mut self.particles {
            p.step(self.width, self.height);
        }
    }
}

struct Backdrop {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    field: Field,
    frame: Option<i32>,
}

impl Backdrop {
    fn reseed(&mut self) {
        let (w, h) = viewport();
        self.canvas.set_width(w as u32);
        self.canvas.set_height(h as u32);
        self.field = Field::seeded(w, h, dom::random);
    }

    fn draw(&mut self) {
        self.field.step();
        self.ctx.clear_rect(0.0, 0.0, self.field.width, self.field.height);
        for p in &self.field.particles {
            self.ctx
                .set_fill_style_str(&format!("rgba(255, 215, 0, {})", p.opacity));
            self.ctx.begin_path();
            self.ctx.arc(p.x, p.y, p.size, 0.0, std::f64::consts::TAU).ok();
            self.ctx.fill();
        }
    }
}

thread_local! {
    static BACKDROP: RefCell<Option<Backdrop>> = const { RefCell::new(None) };
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn viewport() -> (f64, f64) {
    let Some(win) = web_sys::window() else {
        return (0.0, 0.0);
    };
    let w = win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (w, h)
}

fn schedule(callback: &FrameCallback) {
    let id = callback.borrow().as_ref().and_then(|f| {
        web_sys::window()?
            .request_animation_frame(f.as_ref().unchecked_ref())
            .ok()
    });
    BACKDROP.with(|cell| {
        if let Some(b) = cell.borrow_mut().as_mut() {
            b.frame = id;
        }
    });
}

fn halt() {
    let frame = BACKDROP.with(|cell| cell.borrow_mut().as_mut().and_then(|b| b.frame.take()));
    if let (Some(id), Some(win)) = (frame, web_sys::window()) {
        win.cancel_animation_frame(id).ok();
    }
}

pub fn is_running() -> bool {
    BACKDROP.with(|cell| cell.borrow().as_ref().is_some_and(|b| b.frame.is_some()))
}

pub fn init(doc: &Document) -> Result<(), JsValue> {
    if doc.get_element_by_id(CANVAS_ID).is_some() {
        return Ok(());
    }
    let Some(body) = doc.body() else {
        return Ok(());
    };
    let canvas: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
    canvas.set_id(CANVAS_ID);
    canvas.set_attribute("style", CANVAS_STYLE)?;
    body.insert_before(&canvas, body.first_child().as_ref())?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    let mut backdrop = Backdrop {
        canvas,
        ctx,
        field: Field::default(),
        frame: None,
    };
    backdrop.reseed();
    BACKDROP.with(|cell| *cell.borrow_mut() = Some(backdrop));

    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        BACKDROP.with(|cell| {
            if let Some(b) = cell.borrow_mut().as_mut() {
                b.draw();
            }
        });
        schedule(&f);
    }) as Box<dyn FnMut(f64)>));
    schedule(&g);

    let win = dom::window()?;
    dom::listen(&win, "resize", |_evt: Event| {
        BACKDROP.with(|cell| {
            if let Some(b) = cell.borrow_mut().as_mut() {
                b.reseed();
            }
        });
    })?;

    let page = doc.clone();
    dom::listen(doc, "visibilitychange", move |_evt: Event| {
        if page.hidden() {
            log::debug!("page hidden, pausing particles");
            halt();
        } else if !is_running() {
            log::debug!("page visible, resuming particles");
            schedule(&g);
        }
    })
}
