//! Duel Shooter entry point
//!
//! On the web this hosts the simulation on a 2D canvas and exposes
//! `startGame`, `restartGame`, `exitToMenu` and `configure` to the page.
//! Natively it plays a scripted headless match and logs the outcome.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::f64::consts::TAU;
    use std::rc::{Rc, Weak};

    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent};

    use duel_shooter::platform::{FrameClock, PointerThrottle, normalize_pointer};
    use duel_shooter::sim::{CircleView, Game, GameResult};
    use duel_shooter::{Settings, Variant};

    /// Everything the page-facing callbacks share
    struct Host {
        game: Game,
        ctx: CanvasRenderingContext2d,
        clock: FrameClock,
        throttle: PointerThrottle,
        viewport: (f32, f32),
        /// Set by the end hook, dispatched once the game is no longer borrowed
        ended: Rc<Cell<Option<GameResult>>>,
        /// Attached while a game loop is running
        listeners: Option<PointerListeners>,
    }

    /// Window pointer listeners owned by the running game
    struct PointerListeners {
        mouse: Closure<dyn FnMut(MouseEvent)>,
        touch: Closure<dyn FnMut(TouchEvent)>,
    }

    impl PointerListeners {
        fn attach(host: &Rc<RefCell<Host>>) -> Result<Self, JsValue> {
            let window = window()?;

            let weak = Rc::downgrade(host);
            let mouse = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                pointer_moved(&weak, event.client_x(), event.client_y());
            });
            window.add_event_listener_with_callback("mousemove", mouse.as_ref().unchecked_ref())?;

            let weak = Rc::downgrade(host);
            let touch = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    pointer_moved(&weak, touch.client_x(), touch.client_y());
                }
            });
            if let Err(e) =
                window.add_event_listener_with_callback("touchmove", touch.as_ref().unchecked_ref())
            {
                let _ = window.remove_event_listener_with_callback(
                    "mousemove",
                    mouse.as_ref().unchecked_ref(),
                );
                return Err(e);
            }

            Ok(Self { mouse, touch })
        }

        fn detach(self) {
            let Ok(window) = window() else {
                return;
            };
            let _ = window.remove_event_listener_with_callback(
                "mousemove",
                self.mouse.as_ref().unchecked_ref(),
            );
            let _ = window.remove_event_listener_with_callback(
                "touchmove",
                self.touch.as_ref().unchecked_ref(),
            );
            log::debug!("Pointer listeners detached");
        }
    }

    fn pointer_moved(host: &Weak<RefCell<Host>>, client_x: i32, client_y: i32) {
        let Some(host) = host.upgrade() else {
            return;
        };
        let Ok(mut h) = host.try_borrow_mut() else {
            return;
        };
        let (w, height) = h.viewport;
        let p = normalize_pointer(client_x as f32, client_y as f32, w, height);
        if let Some(p) = h.throttle.offer(now_ms(), p) {
            h.game.set_pointer(p);
        }
    }

    thread_local! {
        static HOST: RefCell<Option<Rc<RefCell<Host>>>> = const { RefCell::new(None) };
    }

    fn host() -> Result<Rc<RefCell<Host>>, JsValue> {
        HOST.with(|cell| cell.borrow().clone())
            .ok_or_else(|| JsValue::from_str("duel shooter is not initialized"))
    }

    fn window() -> Result<web_sys::Window, JsValue> {
        web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn build_game(settings: Settings, ended: &Rc<Cell<Option<GameResult>>>) -> Game {
        let mut game = Game::new(settings);
        let ended = ended.clone();
        game.set_on_game_end(move |result| ended.set(Some(result)));
        game
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Duel Shooter starting...");

        let window = window()?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;

        let width = canvas.client_width().max(1) as u32;
        let height = canvas.client_height().max(1) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;

        let mut settings = Settings::for_viewport(width as f32, height as f32, Variant::Classic);
        settings.seed = js_sys::Date::now() as u64;
        settings
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let ended = Rc::new(Cell::new(None));
        let host = Rc::new(RefCell::new(Host {
            game: build_game(settings, &ended),
            ctx,
            clock: FrameClock::new(),
            throttle: PointerThrottle::default(),
            viewport: (width as f32, height as f32),
            ended,
            listeners: None,
        }));

        HOST.with(|cell| *cell.borrow_mut() = Some(host));

        log::info!("Duel Shooter ready ({width}x{height})");
        Ok(())
    }

    /// Replace the settings with a JSON override and rebuild the game at the menu
    pub fn configure(json: &str) -> Result<(), JsValue> {
        let host = host()?;
        let mut h = host.borrow_mut();
        let settings = h
            .game
            .settings()
            .with_overrides(json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        h.game.reconfigure(settings);
        if let Some(listeners) = h.listeners.take() {
            listeners.detach();
        }
        Ok(())
    }

    /// Start a fresh game and a new animation loop tied to it
    pub fn start() -> Result<(), JsValue> {
        let host = host()?;
        let listeners = PointerListeners::attach(&host)?;
        let generation = {
            let mut h = host.borrow_mut();
            if let Some(old) = h.listeners.replace(listeners) {
                old.detach();
            }
            h.clock.reset();
            h.ended.set(None);
            h.game.start_game()
        };
        request_animation_frame(host, generation)
    }

    pub fn exit() -> Result<(), JsValue> {
        let host = host()?;
        let mut h = host.borrow_mut();
        h.game.exit_to_menu();
        if let Some(listeners) = h.listeners.take() {
            listeners.detach();
        }
        let (w, height) = h.viewport;
        h.ctx.clear_rect(0.0, 0.0, w as f64, height as f64);
        Ok(())
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>, generation: u64) -> Result<(), JsValue> {
        let closure = Closure::once(move |time: f64| {
            game_loop(host, generation, time);
        });
        window()?.request_animation_frame(closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn game_loop(host: Rc<RefCell<Host>>, generation: u64, time: f64) {
        let (running, ended) = {
            let mut h = host.borrow_mut();
            let h = &mut *h;
            if let Some(p) = h.throttle.flush(now_ms()) {
                h.game.set_pointer(p);
            }
            let elapsed = h.clock.tick(time);
            let running = h.game.frame(generation, elapsed);
            if generation == h.game.generation() {
                render(h);
                if !running {
                    if let Some(listeners) = h.listeners.take() {
                        listeners.detach();
                    }
                }
            }
            (running, h.ended.take())
        };

        if let Some(result) = ended {
            if let Err(e) = dispatch_end(result) {
                log::warn!("Could not dispatch game end: {e:?}");
            }
        }

        if running {
            if let Err(e) = request_animation_frame(host, generation) {
                log::error!("Animation loop stopped: {e:?}");
            }
        }
    }

    /// Tell the page how the game went via a `duel:end` event
    fn dispatch_end(result: GameResult) -> Result<(), JsValue> {
        let init = web_sys::CustomEventInit::new();
        init.set_detail(&JsValue::from_str(result.as_str()));
        let event = web_sys::CustomEvent::new_with_event_init_dict("duel:end", &init)?;
        window()?.dispatch_event(&event)?;
        Ok(())
    }

    fn render(host: &Host) {
        let ctx = &host.ctx;
        let snap = host.game.snapshot();
        ctx.set_global_alpha(1.0);
        ctx.clear_rect(0.0, 0.0, snap.width as f64, snap.height as f64);

        for ship in &snap.ships {
            ctx.set_fill_style_str(ship.color);
            ctx.fill_rect(
                (ship.x - ship.width) as f64,
                (ship.y - ship.height) as f64,
                (ship.width * 2.0) as f64,
                (ship.height * 2.0) as f64,
            );
        }

        for circle in snap.bullets.iter().chain(&snap.particles) {
            fill_circle(ctx, circle);
        }
        ctx.set_global_alpha(1.0);
    }

    fn fill_circle(ctx: &CanvasRenderingContext2d, c: &CircleView) {
        ctx.set_global_alpha(c.alpha as f64);
        ctx.set_fill_style_str(c.color);
        ctx.begin_path();
        if ctx.arc(c.x as f64, c.y as f64, c.radius as f64, 0.0, TAU).is_ok() {
            ctx.fill();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = startGame)]
pub fn start_game() -> Result<(), JsValue> {
    wasm_game::start()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = restartGame)]
pub fn restart_game() -> Result<(), JsValue> {
    wasm_game::start()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = exitToMenu)]
pub fn exit_to_menu() -> Result<(), JsValue> {
    wasm_game::exit()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn configure(json: &str) -> Result<(), JsValue> {
    wasm_game::configure(json)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Duel Shooter (native) starting headless match...");

    let mut args = std::env::args().skip(1);
    let variant = match args.next() {
        Some(name) => match duel_shooter::Variant::from_str(&name) {
            Some(v) => v,
            None => {
                log::error!("Unknown variant '{name}' (expected classic, mirror or rapid)");
                return std::process::ExitCode::FAILURE;
            }
        },
        None => duel_shooter::Variant::Classic,
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    match headless::play(variant, seed) {
        Ok(Some(result)) => {
            println!("{}", result.as_str());
            std::process::ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("undecided");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Invalid settings: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use duel_shooter::consts::REFERENCE_FRAME_MS;
    use duel_shooter::sim::{Game, GameResult};
    use duel_shooter::{ConfigError, Settings, Variant};
    use glam::Vec2;

    /// Ten minutes of play at 60 Hz
    const MAX_FRAMES: u64 = 36_000;

    /// Play one match with a pointer sweeping the arena
    pub fn play(variant: Variant, seed: u64) -> Result<Option<GameResult>, ConfigError> {
        let mut settings = Settings::for_viewport(1280.0, 720.0, variant);
        settings.seed = seed;
        settings.validate()?;

        let mut game = Game::new(settings);
        game.set_on_game_end(|result| log::info!("Match finished: {}", result.as_str()));
        let generation = game.start_game();

        for frame in 0..MAX_FRAMES {
            let t = frame as f32 * REFERENCE_FRAME_MS / 1000.0;
            let sweep = Vec2::new((t * 1.7).sin(), (t * 1.3).cos());
            game.set_pointer(Vec2::splat(0.5) + 0.45 * sweep);
            if !game.frame(generation, REFERENCE_FRAME_MS) {
                break;
            }
            if frame % 600 == 0 {
                let state = game.state();
                log::debug!(
                    "frame {frame}: player {} lives, enemy {} lives, {} bullets, {} particles",
                    state.ships.player.lives,
                    state.ships.enemy.lives,
                    state.bullets.len(),
                    state.particle_count()
                );
            }
        }

        if game.result().is_none() {
            log::warn!("No winner after {MAX_FRAMES} frames");
        }
        Ok(game.result())
    }
}
