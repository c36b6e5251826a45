//! Doppler Trains entry point
//!
//! Native: headless run of one scenario, printing the summary.
//! Web: interactive page driven by `requestAnimationFrame`.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlInputElement};

    use doppler_trains::Settings;
    use doppler_trains::consts::*;
    use doppler_trains::platform::{AnimationFrameLoop, LoopControl};
    use doppler_trains::report;
    use doppler_trains::scene;
    use doppler_trains::sim::{ConfigPatch, PlaybackPhase, PulseId, SimEvent, Simulation};

    thread_local! {
        static FRAME_LOOP: RefCell<Option<AnimationFrameLoop>> = const { RefCell::new(None) };
    }

    /// Page state: the simulation plus presentation-only flags
    struct App {
        sim: Simulation,
        settings: Settings,
        summary_visible: bool,
        summary_timer: Option<i32>,
        problem_visible: bool,
    }

    impl App {
        fn new(settings: Settings) -> Self {
            let mut sim = Simulation::new(settings.config);
            if settings.autoplay {
                sim.play();
            }
            Self {
                sim,
                settings,
                summary_visible: false,
                summary_timer: None,
                problem_visible: false,
            }
        }

        fn hide_summary(&mut self) {
            self.summary_visible = false;
            if let (Some(id), Some(window)) = (self.summary_timer.take(), web_sys::window()) {
                window.clear_timeout_with_handle(id);
            }
        }

        /// Slider moved: clamp, re-solve, reset the clock, persist
        fn update_config(&mut self, patch: ConfigPatch) {
            let next = self.sim.config().apply(&patch).clamped();
            self.sim.set_config(next);
            self.hide_summary();
            self.settings.config = next;
            self.settings.save();
        }

        /// Play button: pause, resume, or replay from the end
        fn toggle(&mut self) {
            if self.sim.phase() == PlaybackPhase::Finished {
                self.hide_summary();
            }
            self.sim.toggle();
        }

        fn reset(&mut self) {
            self.sim.reset();
            self.hide_summary();
        }

        fn seek(&mut self, t: f64) {
            self.sim.seek(t);
            self.hide_summary();
        }
    }

    fn element(document: &Document, id: &str) -> Option<Element> {
        let el = document.get_element_by_id(id);
        if el.is_none() {
            log::warn!("Missing element #{}", id);
        }
        el
    }

    fn input(document: &Document, id: &str) -> Option<HtmlInputElement> {
        element(document, id)?.dyn_into::<HtmlInputElement>().ok()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = element(document, id) {
            el.set_text_content(Some(text));
        }
    }

    /// Push the current state into the DOM
    fn render(app: &App, document: &Document) {
        let sim = &app.sim;
        let t = sim.current_time();
        let solution = sim.solution();
        let config = sim.config();
        let frame = scene::build(config, solution, t);

        if let Some(stage) = element(document, "stage") {
            stage.set_inner_html(&scene::to_svg(&frame));
        }

        set_text(document, "time-now", &format!("{:.3}s", t));
        set_text(document, "time-max", &format!("{:.1}s", solution.max_duration));
        if let Some(timeline) = input(document, "timeline") {
            timeline.set_max(&solution.max_duration.to_string());
            timeline.set_value_as_number(t);
        }
        for marker in &frame.timeline {
            let id = match marker.pulse {
                PulseId::First => "marker-1",
                PulseId::Second => "marker-2",
            };
            if let Some(el) = element(document, id) {
                let _ = el.set_attribute("style", &format!("left: {:.2}%", marker.fraction * 100.0));
            }
        }

        let play_label = match sim.phase() {
            PlaybackPhase::Finished => "Replay",
            PlaybackPhase::Playing => "Pause",
            PlaybackPhase::StoppedAtStart | PlaybackPhase::Paused => "Play",
        };
        set_text(document, "play", play_label);

        set_text(document, "speed-a-value", &format!("{} m/s", config.speed_a));
        set_text(document, "speed-b-value", &format!("{} m/s", config.speed_b));
        set_text(document, "distance-value", &format!("{} m", config.initial_distance));
        set_text(document, "interval-value", &format!("{:.1} s", config.pulse_interval));
        set_text(
            document,
            "footer",
            &format!(
                "v_sound = {}m/s | interval = {:.1}s",
                SOUND_SPEED, config.pulse_interval
            ),
        );

        if let Some(panel) = element(document, "summary") {
            let class = if app.summary_visible { "panel" } else { "panel hidden" };
            let _ = panel.set_attribute("class", class);
        }
        if app.summary_visible {
            set_text(document, "summary-body", &sim.summary().to_string());
        }

        if let Some(panel) = element(document, "problem") {
            let class = if app.problem_visible { "panel" } else { "panel hidden" };
            let _ = panel.set_attribute("class", class);
        }
        if app.problem_visible {
            set_text(document, "problem-body", &report::problem(config));
        }
    }

    fn schedule_summary(app: &Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let delay = app.borrow().settings.summary_delay_ms as i32;
        let target = app.clone();
        let callback = Closure::once_into_js(move || {
            let mut app = target.borrow_mut();
            app.summary_timer = None;
            // A seek or restart in the meantime cancels the popup
            if app.sim.phase() == PlaybackPhase::Finished {
                app.summary_visible = true;
            }
        });
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            delay,
        ) {
            Ok(id) => app.borrow_mut().summary_timer = Some(id),
            Err(e) => log::warn!("Failed to schedule summary: {:?}", e),
        }
    }

    fn frame(app: &Rc<RefCell<App>>, document: &Document, now: f64) -> LoopControl {
        let events = app.borrow_mut().sim.tick(now);
        for event in events {
            match event {
                SimEvent::PulseReceived(pulse) => {
                    let time = app.borrow().sim.solution().impact(pulse).time;
                    log::info!("{} received at t = {:.4}s", pulse.label(), time);
                }
                SimEvent::Collision => log::info!("Trains collided"),
                SimEvent::Finished => {
                    if app.borrow().settings.show_summary {
                        schedule_summary(app);
                    }
                }
            }
        }
        render(&app.borrow(), document);
        LoopControl::Continue
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        if let Some(el) = element(document, id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| handler());
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_input(document: &Document, id: &str, mut handler: impl FnMut(f64) + 'static) {
        if let Some(el) = input(document, id) {
            let source = el.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let value = source.value_as_number();
                if value.is_finite() {
                    handler(value);
                }
            });
            let _ = el.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_controls(app: &Rc<RefCell<App>>, document: &Document) {
        let config = *app.borrow().sim.config();
        // (id, current value, [min, max, step], patch)
        type Slider = (&'static str, f64, [f64; 3], fn(f64) -> ConfigPatch);
        let sliders: [Slider; 4] = [
            (
                "speed-a",
                config.speed_a,
                [SPEED_MIN, SPEED_MAX, SPEED_STEP],
                |v| ConfigPatch {
                    speed_a: Some(v),
                    ..Default::default()
                },
            ),
            (
                "speed-b",
                config.speed_b,
                [SPEED_MIN, SPEED_MAX, SPEED_STEP],
                |v| ConfigPatch {
                    speed_b: Some(v),
                    ..Default::default()
                },
            ),
            (
                "distance",
                config.initial_distance,
                [DISTANCE_MIN, DISTANCE_MAX, DISTANCE_STEP],
                |v| ConfigPatch {
                    initial_distance: Some(v),
                    ..Default::default()
                },
            ),
            (
                "interval",
                config.pulse_interval,
                [INTERVAL_MIN, INTERVAL_MAX, INTERVAL_STEP],
                |v| ConfigPatch {
                    pulse_interval: Some(v),
                    ..Default::default()
                },
            ),
        ];

        for (id, initial, [min, max, step], patch) in sliders {
            if let Some(el) = input(document, id) {
                // Range before value, or the browser clamps to the markup range
                el.set_min(&min.to_string());
                el.set_max(&max.to_string());
                el.set_step(&step.to_string());
                el.set_value_as_number(initial);
            }
            let app = app.clone();
            on_input(document, id, move |v| app.borrow_mut().update_config(patch(v)));
        }

        {
            let app = app.clone();
            on_input(document, "timeline", move |t| app.borrow_mut().seek(t));
        }
        {
            let app = app.clone();
            on_click(document, "play", move || app.borrow_mut().toggle());
        }
        {
            let app = app.clone();
            on_click(document, "reset", move || app.borrow_mut().reset());
        }
        {
            let app = app.clone();
            on_click(document, "summary-close", move || app.borrow_mut().hide_summary());
        }
        {
            let app = app.clone();
            on_click(document, "problem-open", move || app.borrow_mut().problem_visible = true);
        }
        {
            let app = app.clone();
            on_click(document, "problem-close", move || {
                app.borrow_mut().problem_visible = false
            });
        }
        {
            let app = app.clone();
            on_click(document, "summary-restart", move || {
                let mut app = app.borrow_mut();
                app.hide_summary();
                app.sim.play();
            });
        }
    }

    /// Release the frame loop when the page goes away
    fn setup_teardown(window: &web_sys::Window) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            FRAME_LOOP.with(|slot| slot.borrow_mut().take());
            log::info!("Frame loop released");
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }
        log::info!("Doppler Trains starting...");

        let Some(window) = web_sys::window() else {
            web_sys::console::error_1(&"No window".into());
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        let settings = Settings::load();
        log::info!("Scenario: {:?}", settings.config);
        let app = Rc::new(RefCell::new(App::new(settings)));

        setup_controls(&app, &document);
        setup_teardown(&window);
        render(&app.borrow(), &document);

        let frame_app = app.clone();
        let frame_loop = AnimationFrameLoop::start(move |now| frame(&frame_app, &document, now));
        FRAME_LOOP.with(|slot| *slot.borrow_mut() = Some(frame_loop));

        log::info!("Doppler Trains running!");
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;

    use doppler_trains::platform::{LoopControl, SyntheticFrames};
    use doppler_trains::report;
    use doppler_trains::scene;
    use doppler_trains::sim::{ConfigPatch, Configuration, PlaybackPhase, SimEvent, Simulation};

    /// Two trains close on one track; train A whistles twice. When does train B hear each whistle?
    #[derive(Parser, Debug)]
    #[command(version)]
    pub struct Args {
        /// JSON scenario file (speed_a, speed_b, initial_distance, pulse_interval)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Train A speed (m/s)
        #[arg(long)]
        speed_a: Option<f64>,
        /// Train B speed (m/s)
        #[arg(long)]
        speed_b: Option<f64>,
        /// Initial separation (m)
        #[arg(long)]
        distance: Option<f64>,
        /// Time between whistles (s)
        #[arg(long)]
        interval: Option<f64>,
        /// Nominal frame interval (ms)
        #[arg(long, default_value_t = 1000.0 / 60.0)]
        frame_ms: f64,
        /// Random variation per frame interval (ms)
        #[arg(long, default_value_t = 0.0)]
        jitter_ms: f64,
        /// Seed for frame jitter
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Write the final frame as SVG
        #[arg(long)]
        svg: Option<PathBuf>,
    }

    fn load_config(args: &Args) -> Result<Configuration> {
        let base = match &args.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&json)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => Configuration::default(),
        };

        let patch = ConfigPatch {
            speed_a: args.speed_a,
            speed_b: args.speed_b,
            initial_distance: args.distance,
            pulse_interval: args.interval,
        };
        let config = base.apply(&patch);
        config.validate().context("invalid scenario")?;
        Ok(config)
    }

    pub fn run() -> Result<()> {
        let args = Args::parse();
        anyhow::ensure!(args.frame_ms > 0.0, "frame_ms must be > 0");
        anyhow::ensure!(args.jitter_ms >= 0.0, "jitter_ms must be >= 0");

        let config = load_config(&args)?;
        let mut sim = Simulation::new(config);
        println!("{}\n", report::problem(&config));
        log::info!(
            "Scenario {:?}: timeline {:.3}s, collision at {:.3}s",
            config,
            sim.solution().max_duration,
            sim.solution().collision_time
        );

        // Generous cap in case jitter keeps frames short
        let budget = (sim.solution().max_duration * 1000.0 / args.frame_ms * 4.0).ceil() as u64 + 16;

        sim.play();
        let frames = SyntheticFrames::new(args.frame_ms)
            .with_jitter(args.seed, args.jitter_ms)
            .with_limit(budget)
            .run(|now| {
                for event in sim.tick(now) {
                    match event {
                        SimEvent::PulseReceived(pulse) => {
                            let imp = sim.solution().impact(pulse);
                            log::info!(
                                "{} received at t = {:.4}s, x = {:.2}m (frame t = {:.4}s)",
                                pulse.label(),
                                imp.time,
                                imp.position,
                                sim.current_time()
                            );
                        }
                        SimEvent::Collision => log::info!(
                            "Trains collided at t = {:.3}s",
                            sim.solution().collision_time
                        ),
                        SimEvent::Finished => log::info!("Run finished"),
                    }
                }
                if sim.phase() == PlaybackPhase::Finished {
                    LoopControl::Stop
                } else {
                    LoopControl::Continue
                }
            });
        log::info!("{} frames", frames);

        if sim.phase() != PlaybackPhase::Finished {
            log::warn!("Frame budget exhausted at t = {:.3}s", sim.current_time());
        }

        println!("{}", sim.summary());

        if let Some(path) = &args.svg {
            let frame = scene::build(sim.config(), sim.solution(), sim.current_time());
            fs::write(path, scene::to_svg(&frame))
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("Final frame written to {}", path.display());
        }

        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Doppler Trains (native) starting...");
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
