//! Tilt Racer entry point
//!
//! On the web: wires DOM events into the game and paints each frame on a
//! 2D canvas. On native: runs a headless session with a simple autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, DeviceOrientationEvent, HtmlCanvasElement, KeyboardEvent,
        PointerEvent,
    };

    use tilt_racer::audio::WebSoundtrack;
    use tilt_racer::sim::{Direction, PermissionOutcome, SceneryKind, SensorEvent, TiltPermission};
    use tilt_racer::view::{Frame, HUD_TEXT, LANE_PAINT, PLAYER_PAINT, ROAD, SKY, Sprite};
    use tilt_racer::{Game, Rgb, Tuning};

    // Orientation permission lives outside web-sys
    #[wasm_bindgen(inline_js = "
        export function orientation_mode() {
            if (typeof DeviceOrientationEvent === 'undefined') return 'unsupported';
            if (typeof DeviceOrientationEvent.requestPermission === 'function') return 'prompt';
            return 'granted';
        }

        export async function request_orientation_permission() {
            try {
                const orientation = await DeviceOrientationEvent.requestPermission();
                const motion = (typeof DeviceMotionEvent !== 'undefined'
                    && typeof DeviceMotionEvent.requestPermission === 'function')
                    ? await DeviceMotionEvent.requestPermission()
                    : 'granted';
                return orientation === 'granted' && motion === 'granted';
            } catch (e) {
                console.error(e);
                return false;
            }
        }
    ")]
    extern "C" {
        fn orientation_mode() -> String;
        fn request_orientation_permission() -> js_sys::Promise;
    }

    type GameRef = Rc<RefCell<Game<WebSoundtrack>>>;

    fn window_size() -> (f32, f32) {
        let Some(window) = web_sys::window() else {
            return (0.0, 0.0);
        };
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        (w as f32, h as f32)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
        log::info!("Tilt Racer starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document - cannot start");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element");
            return;
        };
        let Some(ctx) = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
        else {
            log::error!("Canvas 2D context unavailable");
            return;
        };

        let (width, height) = window_size();
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);

        let seed = rand::random::<u64>();
        let game = match Game::new(
            Tuning::load(),
            width,
            height,
            seed,
            WebSoundtrack::new("song.mp3"),
        ) {
            Ok(game) => Rc::new(RefCell::new(game)),
            Err(e) => {
                log::error!("Cannot start game: {}", e);
                return;
            }
        };
        log::info!("Game initialized with seed: {}", seed);

        setup_sensors(&game);
        setup_input_handlers(&canvas, game.clone());
        setup_resize(canvas.clone(), game.clone());
        start_frame_loop(ctx, game);
    }

    /// Report tilt capability and forward orientation samples
    fn setup_sensors(game: &GameRef) {
        let tx = game.borrow().sensor_sender();
        match orientation_mode().as_str() {
            "unsupported" => {
                let _ = tx.send(SensorEvent::PermissionResolved(PermissionOutcome::Unsupported));
                return;
            }
            "granted" => {
                let _ = tx.send(SensorEvent::PermissionResolved(PermissionOutcome::Granted));
            }
            // Requested on the first tap
            _ => {}
        }

        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: DeviceOrientationEvent| {
            let _ = tx.send(SensorEvent::Orientation {
                gamma: event.gamma().unwrap_or(0.0) as f32,
                beta: event.beta().unwrap_or(0.0) as f32,
            });
        });
        let _ = window
            .add_event_listener_with_callback("deviceorientation", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_permission(game: &GameRef) {
        let tx = game.borrow().sensor_sender();
        wasm_bindgen_futures::spawn_local(async move {
            let granted = wasm_bindgen_futures::JsFuture::from(request_orientation_permission())
                .await
                .ok()
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            let outcome = if granted {
                PermissionOutcome::Granted
            } else {
                PermissionOutcome::Denied
            };
            let _ = tx.send(SensorEvent::PermissionResolved(outcome));
        });
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: GameRef) {
        let Some(window) = web_sys::window() else { return };

        // Tap/click: screen flow, plus the one-time tilt permission prompt
        {
            let game = game.clone();
            let asked = Rc::new(Cell::new(false));
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                let pending = game.borrow().permission() == TiltPermission::Pending;
                if pending && !asked.get() && orientation_mode() == "prompt" {
                    asked.set(true);
                    request_permission(&game);
                }
                game.borrow_mut().activate();
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Arrow keys / WASD
        for (kind, held) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(direction) = Direction::from_key(&event.key()) {
                    event.prevent_default();
                    game.borrow_mut().set_direction(direction, held);
                }
            });
            let _ = window.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Nothing stays held after focus loss
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().release_keys();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: GameRef) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (width, height) = window_size();
            match game.borrow_mut().resize(width, height) {
                Ok(()) => {
                    canvas.set_width(width as u32);
                    canvas.set_height(height as u32);
                }
                Err(e) => log::warn!("Keeping previous layout: {}", e),
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(callback: &Closure<dyn FnMut(f64)>) {
        if let Some(window) = web_sys::window() {
            let _ = window.request_animation_frame(callback.as_ref().unchecked_ref());
        }
    }

    fn start_frame_loop(ctx: CanvasRenderingContext2d, game: GameRef) {
        let slot: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let next = slot.clone();

        *slot.borrow_mut() = Some(Closure::new(move |_time: f64| {
            let frame = {
                let mut game = game.borrow_mut();
                game.frame();
                game.view()
            };
            paint(&ctx, &frame);
            if let Some(callback) = next.borrow().as_ref() {
                request_animation_frame(callback);
            }
        }));

        if let Some(callback) = slot.borrow().as_ref() {
            request_animation_frame(callback);
        }
        log::info!("Tilt Racer running!");
    }

    fn fill(ctx: &CanvasRenderingContext2d, color: Rgb) {
        ctx.set_fill_style_str(&color.css());
    }

    fn paint(ctx: &CanvasRenderingContext2d, frame: &Frame) {
        let (w, h) = (frame.width as f64, frame.height as f64);

        fill(ctx, SKY);
        ctx.fill_rect(0.0, 0.0, w, h);
        for (rect, color) in &frame.shoulders {
            fill(ctx, *color);
            let o = rect.origin();
            let s = rect.size();
            ctx.fill_rect(o.x as f64, o.y as f64, s.x as f64, s.y as f64);
        }
        fill(ctx, ROAD);
        let (o, s) = (frame.road.origin(), frame.road.size());
        ctx.fill_rect(o.x as f64, o.y as f64, s.x as f64, s.y as f64);

        ctx.set_stroke_style_str(&LANE_PAINT.css());
        ctx.set_line_width(4.0);
        ctx.begin_path();
        for dash in &frame.dashes {
            ctx.move_to(dash.from.x as f64, dash.from.y as f64);
            ctx.line_to(dash.to.x as f64, dash.to.y as f64);
        }
        ctx.stroke();

        for sprite in &frame.sprites {
            paint_sprite(ctx, sprite);
        }

        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        if let Some(hud) = &frame.hud {
            fill(ctx, HUD_TEXT);
            ctx.set_font("22px sans-serif");
            ctx.set_text_align("left");
            let _ = ctx.fill_text(&hud.distance, 30.0, 50.0);
            ctx.set_text_align("right");
            let _ = ctx.fill_text(&hud.best, w - 30.0, 50.0);
            ctx.set_text_align("center");
        }

        if let Some(overlay) = &frame.overlay {
            ctx.set_fill_style_str(&format!("rgba(0, 0, 0, {:.2})", overlay.dim as f64 / 255.0));
            ctx.fill_rect(0.0, 0.0, w, h);
            for line in &overlay.lines {
                fill(ctx, line.color);
                ctx.set_font(&format!("{}px sans-serif", line.size));
                let _ = ctx.fill_text(&line.text, w / 2.0, h / 2.0 + line.offset_y as f64);
            }
        }
    }

    fn paint_sprite(ctx: &CanvasRenderingContext2d, sprite: &Sprite) {
        match sprite {
            Sprite::Player { rect } => {
                fill(ctx, PLAYER_PAINT);
                let (o, s) = (rect.origin(), rect.size());
                ctx.fill_rect(o.x as f64, o.y as f64, s.x as f64, s.y as f64);
                fill(ctx, Rgb(255, 255, 255));
                ctx.set_font("8px sans-serif");
                let _ = ctx.fill_text("midevs", rect.center.x as f64, rect.center.y as f64);
            }
            Sprite::Car { rect, color, label } => {
                fill(ctx, *color);
                let (o, s) = (rect.origin(), rect.size());
                ctx.fill_rect(o.x as f64, o.y as f64, s.x as f64, s.y as f64);
                fill(ctx, Rgb(0, 0, 0));
                ctx.set_font("10px sans-serif");
                let _ = ctx.fill_text(label, rect.center.x as f64, rect.center.y as f64);
            }
            Sprite::Decoration { kind, pos, scale } => {
                let (x, y, k) = (pos.x as f64, pos.y as f64, *scale as f64);
                ctx.begin_path();
                match kind {
                    SceneryKind::Lily { stem_height } => {
                        let top = y - *stem_height as f64 * k;
                        fill(ctx, Rgb(0, 200, 0));
                        ctx.fill_rect(x - 2.5, top, 5.0, y - top);
                        fill(ctx, Rgb(255, 182, 193));
                        let _ = ctx.arc(x, top - 10.0, 12.0 * k, 0.0, TAU);
                    }
                    SceneryKind::Hydrangea => {
                        fill(ctx, Rgb(106, 90, 205));
                        let _ = ctx.arc(x, y, 20.0 * k, 0.0, TAU);
                    }
                    SceneryKind::House => {
                        fill(ctx, Rgb(150, 150, 150));
                        ctx.fill_rect(x - 25.0 * k, y - 20.0 * k, 50.0 * k, 40.0 * k);
                        fill(ctx, Rgb(100, 100, 100));
                        ctx.move_to(x - 25.0 * k, y - 20.0 * k);
                        ctx.line_to(x + 25.0 * k, y - 20.0 * k);
                        ctx.line_to(x, y - 50.0 * k);
                    }
                    SceneryKind::Bird => {
                        fill(ctx, Rgb(0, 0, 0));
                        ctx.move_to(x, y);
                        ctx.line_to(x - 15.0 * k, y - 5.0 * k);
                        ctx.line_to(x - 15.0 * k, y + 5.0 * k);
                    }
                }
                ctx.close_path();
                ctx.fill();
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
use tilt_racer::Tuning;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tilt Racer (native) starting...");
    log::info!("Native mode runs headless - serve the wasm build for the playable version");

    // Usage: tilt-racer [frames] [vertical]
    let args: Vec<String> = std::env::args().skip(1).collect();
    let frames = args
        .first()
        .and_then(|arg| arg.parse::<u32>().ok())
        .unwrap_or(10_000);
    let tuning = if args.iter().any(|arg| arg == "vertical") {
        Tuning::vertical_lanes(3)
    } else {
        Tuning::load()
    };

    if let Err(e) = autopilot::run(tuning, frames) {
        log::error!("Cannot start game: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use tilt_racer::audio::SilentSoundtrack;
    use tilt_racer::sim::{Direction, GameEvent, GamePhase, GameState, Obstacle};
    use tilt_racer::{ConfigError, Game, ScrollAxis, Tuning};

    /// How far ahead the autopilot looks for traffic
    const LOOKAHEAD: f32 = 260.0;

    /// Drive `frames` refreshes, restarting after every crash
    pub fn run(tuning: Tuning, frames: u32) -> Result<(), ConfigError> {
        let seed = rand::random::<u64>();
        let (width, height) = match tuning.axis {
            ScrollAxis::Horizontal => (1280.0, 720.0),
            ScrollAxis::Vertical => (720.0, 1280.0),
        };
        let mut game = Game::new(tuning, width, height, seed, SilentSoundtrack::new())?;
        log::info!("Game initialized with seed: {}", seed);

        game.activate();
        game.activate();

        let mut runs = Vec::new();
        let mut held: Option<Direction> = None;
        for _ in 0..frames {
            let wanted = steer(game.state());
            if wanted != held {
                if let Some(d) = held {
                    game.set_direction(d, false);
                }
                if let Some(d) = wanted {
                    game.set_direction(d, true);
                }
                held = wanted;
            }

            for event in game.frame() {
                if let GameEvent::Crash { score, .. } = event {
                    runs.push(score);
                }
            }
            if game.phase() == GamePhase::GameOver {
                game.activate();
            }
        }

        let state = game.state();
        log::info!(
            "Drove {} frames: {} crash(es), best {}m, current run {}m",
            frames,
            runs.len(),
            state.high_score,
            state.score
        );
        println!("runs: {:?}  best: {}m", runs, state.high_score);
        Ok(())
    }

    /// Nearest car ahead whose path overlaps the player's lateral band
    fn threat(state: &GameState) -> Option<&Obstacle> {
        let p = &state.player;
        state
            .obstacles
            .items()
            .iter()
            .filter(|o| {
                let ahead = o.pos.x - p.pos.x;
                ahead > -(o.half.x + p.half.x) && ahead < LOOKAHEAD
            })
            .filter(|o| (o.pos.y - p.pos.y).abs() < o.half.y + p.half.y + 10.0)
            .min_by(|a, b| a.pos.x.total_cmp(&b.pos.x))
    }

    /// Screen direction that moves the car toward smaller (or larger) `across`
    fn lateral(state: &GameState, toward_far: bool) -> Option<Direction> {
        let axis = state.tuning.axis;
        Direction::ALL.into_iter().find(|d| {
            let across = axis.screen_to_track(d.unit()).y;
            if toward_far { across < -0.5 } else { across > 0.5 }
        })
    }

    fn steer(state: &GameState) -> Option<Direction> {
        let threat = threat(state)?;
        let p = &state.player;
        let bounds = p.bounds(&state.geometry);

        // Dodge away from the car unless that side is walled off
        let mut toward_far = threat.pos.y >= p.pos.y;
        if toward_far && p.pos.y - bounds.min.y < p.half.y {
            toward_far = false;
        } else if !toward_far && bounds.max.y - p.pos.y < p.half.y {
            toward_far = true;
        }
        lateral(state, toward_far)
    }
}
