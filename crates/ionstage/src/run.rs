use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use directories_next::ProjectDirs;
use gesture::{GestureEngine, InputEvent, InputPort, Subject};
use renderer::{
    FramePacer, FrameTicket, LightningParams, LightningSurface, StageRect, SurfaceError,
    TickDecision,
};
use sceneconfig::{Scene, Section};
use tracing_subscriber::EnvFilter;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::cli::RunArgs;
use crate::input::InputTranslator;
use crate::page::PageViewport;

const DEFAULT_SURFACE_SIZE: (u32, u32) = (1280, 800);

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(args: RunArgs) -> Result<()> {
    let scene = resolve_scene(&args)?;
    let (width, height) = args.size.unwrap_or(DEFAULT_SURFACE_SIZE);
    let target_fps = args.fps.filter(|fps| *fps > 0.0);

    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let window = WindowBuilder::new()
        .with_title("Ion Stage")
        .with_inner_size(PhysicalSize::new(width, height))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create stage window: {err}"))?;
    let window = Arc::new(window);

    let mut stage = StageState::new(window, scene)?;
    let mut pacer = FramePacer::new(target_fps);
    let mut pending: Option<FrameTicket> = None;

    tracing::info!(
        section = %stage.section().id,
        sections = stage.scene.sections.len(),
        animated = stage.surface.is_animated(),
        fps = ?target_fps,
        "ionstage ready"
    );
    stage.window.request_redraw();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == stage.window.id() => {
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        elwt.exit();
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.state == ElementState::Pressed && !event.repeat {
                            match event.logical_key {
                                Key::Named(NamedKey::Escape) => elwt.exit(),
                                Key::Named(NamedKey::ArrowRight) => stage.switch_section(1),
                                Key::Named(NamedKey::ArrowLeft) => stage.switch_section(-1),
                                _ => {}
                            }
                        }
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let event = stage.translator.wheel(delta, stage.page_scale_factor());
                        stage.deliver(event);
                    }
                    WindowEvent::Touch(touch) => {
                        let translated = stage.translator.touch(
                            touch.id,
                            touch.phase,
                            touch.location,
                            stage.page_scale_factor(),
                        );
                        if let Some(event) = translated {
                            stage.deliver(event);
                        }
                    }
                    WindowEvent::Resized(new_size) => {
                        stage.resize(new_size);
                    }
                    WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                        // The matching inner-size change arrives as its own
                        // Resized event.
                        stage.page.set_scale_factor(scale_factor);
                    }
                    WindowEvent::RedrawRequested => {
                        if !stage.surface.is_animated() {
                            stage.present_once();
                            return;
                        }
                        let Some(ticket) = pending.take().or_else(|| pacer.schedule()) else {
                            return;
                        };
                        let now = Instant::now();
                        if pacer.redeem(ticket, now) == TickDecision::Skip {
                            return;
                        }
                        match stage.surface.render_frame(now, stage.stage_placement()) {
                            Ok(()) => {}
                            Err(SurfaceError::Lost) | Err(SurfaceError::Outdated) => {
                                tracing::debug!("surface lost; reconfiguring");
                                stage.surface.resize(stage.window.inner_size());
                            }
                            Err(SurfaceError::Timeout) => {
                                tracing::warn!("surface timeout; retrying next frame");
                            }
                            Err(err) => {
                                // OutOfMemory and anything unexpected: stop
                                // animating, keep the window alive.
                                tracing::error!(error = ?err, "surface unusable; stopping animation");
                                pacer.stop();
                                stage.surface.teardown();
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                if !stage.surface.is_animated() || !pacer.is_running() {
                    elwt.set_control_flow(ControlFlow::Wait);
                    return;
                }
                let now = Instant::now();
                match pacer.next_deadline() {
                    Some(deadline) if deadline > now => {
                        elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                    }
                    _ => {
                        if pending.is_none() {
                            pending = pacer.schedule();
                            if pending.is_some() {
                                stage.window.request_redraw();
                            }
                        }
                        elwt.set_control_flow(ControlFlow::Wait);
                    }
                }
            }
            Event::LoopExiting => {
                shutdown(&mut stage, &mut pacer, &mut pending);
            }
            _ => {}
        })
        .map_err(|err| anyhow!("event loop error: {err}"))?;

    Ok(())
}

/// Everything the event loop mutates: the render surface, the gesture port,
/// the page stand-in, and the active scene section.
struct StageState {
    window: Arc<Window>,
    surface: LightningSurface,
    port: InputPort,
    page: PageViewport,
    translator: InputTranslator,
    scene: Scene,
    section_index: usize,
    reported_offset: f32,
}

impl StageState {
    fn new(window: Arc<Window>, scene: Scene) -> Result<Self> {
        let size = window.inner_size();
        let page = PageViewport::new(size, window.scale_factor());
        let section = scene
            .sections
            .first()
            .context("scene has no sections")?;
        let engine = GestureEngine::new(
            Subject::new(section.media, section.id.clone()),
            scene.gesture,
            page.logical_width(),
        );
        let mut port = InputPort::new(engine);
        port.attach()?;
        let surface = LightningSurface::new(window.clone(), size, &lightning_params(section));
        Ok(Self {
            window,
            surface,
            port,
            page,
            translator: InputTranslator::new(),
            scene,
            section_index: 0,
            reported_offset: 0.0,
        })
    }

    fn section(&self) -> &Section {
        &self.scene.sections[self.section_index]
    }

    fn page_scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }

    /// Feeds one engine event through the port and lets the page react to the
    /// verdict, then reconciles any scroll the page performed.
    fn deliver(&mut self, event: InputEvent) {
        let was_expanded = self.port.engine().is_expanded();
        let was_visible = self.port.engine().content_visible();
        let outcome = self.port.deliver(event);
        self.page.observe(event, outcome);
        self.report_page_offset();
        self.log_transitions(was_expanded, was_visible);
    }

    /// Tells the engine where the page sits now. A report can come back as
    /// RestoreTop, which moves the page again, so loop until both agree.
    fn report_page_offset(&mut self) {
        while (self.page.offset() - self.reported_offset).abs() > f32::EPSILON {
            let offset = self.page.offset();
            self.reported_offset = offset;
            let outcome = self.port.deliver(InputEvent::PageScrolled { offset });
            self.page.observe(InputEvent::PageScrolled { offset }, outcome);
        }
    }

    fn log_transitions(&self, was_expanded: bool, was_visible: bool) {
        let engine = self.port.engine();
        if engine.is_expanded() != was_expanded {
            let layout = engine.layout(&self.scene.media);
            tracing::info!(
                expanded = engine.is_expanded(),
                width = layout.width,
                height = layout.height,
                text_offset = layout.text_offset,
                "stage expansion changed"
            );
        }
        if engine.content_visible() != was_visible {
            tracing::info!(
                visible = engine.content_visible(),
                fade_ms = self.scene.media.reveal_fade.as_millis() as u64,
                section = %self.section().id,
                "content reveal changed"
            );
        }
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.surface.resize(new_size);
        self.page.resize(new_size);
        self.deliver(InputEvent::Resized {
            viewport_width: self.page.logical_width(),
        });
        // The fallback repaints per size; the animated path picks the new
        // size up on its next frame anyway.
        self.window.request_redraw();
    }

    /// Moves `step` sections forward or back, wrapping around the scene.
    fn switch_section(&mut self, step: isize) {
        let count = self.scene.sections.len();
        if count < 2 {
            return;
        }
        self.section_index =
            (self.section_index as isize + step).rem_euclid(count as isize) as usize;
        let section = &self.scene.sections[self.section_index];
        tracing::info!(section = %section.id, title = ?section.title, "switching section");

        self.port
            .engine_mut()
            .set_subject(Subject::new(section.media, section.id.clone()));

        // New lightning parameters mean a full rebuild. Tear the old surface
        // down first; two live swapchains on one window handle is invalid.
        let params = lightning_params(section);
        self.surface.teardown();
        self.surface =
            LightningSurface::new(self.window.clone(), self.window.inner_size(), &params);
        self.window.request_redraw();
    }

    fn stage_placement(&self) -> StageRect {
        let layout = self.port.engine().layout(&self.scene.media);
        self.page.stage_rect(&layout)
    }

    /// One-shot paint for the fallback and disabled modes.
    fn present_once(&mut self) {
        let placement = self.stage_placement();
        if let Err(err) = self.surface.render_frame(Instant::now(), placement) {
            tracing::error!(error = ?err, "fallback paint failed");
        }
    }
}

fn shutdown(stage: &mut StageState, pacer: &mut FramePacer, pending: &mut Option<FrameTicket>) {
    if let Some(ticket) = pending.take() {
        pacer.cancel(ticket);
    }
    pacer.stop();
    stage.surface.teardown();
    stage.port.detach();
    tracing::debug!(
        scheduled = pacer.scheduled(),
        completed = pacer.completed(),
        cancelled = pacer.cancelled(),
        outstanding = pacer.outstanding(),
        "stage shut down"
    );
}

fn lightning_params(section: &Section) -> LightningParams {
    let shader = section.lightning;
    LightningParams {
        hue: shader.hue,
        x_offset: shader.x_offset,
        speed: shader.speed,
        intensity: shader.intensity,
        size: shader.size,
    }
}

/// Scene precedence: explicit path, then command-line overrides on the
/// built-in scene, then `scene.toml` in the config directory, then built-in.
fn resolve_scene(args: &RunArgs) -> Result<Scene> {
    if let Some(path) = args.scene.as_deref() {
        let scene = load_scene_file(path)?;
        tracing::info!(
            path = %path.display(),
            sections = scene.sections.len(),
            "loaded scene file"
        );
        return Ok(scene);
    }

    if has_shader_overrides(args) {
        return overridden_builtin(args);
    }

    if let Some(path) = default_scene_path() {
        if path.exists() {
            let scene = load_scene_file(&path)?;
            tracing::info!(
                path = %path.display(),
                sections = scene.sections.len(),
                "loaded scene from config directory"
            );
            return Ok(scene);
        }
    }

    tracing::debug!("no scene file found; using the built-in scene");
    Ok(Scene::builtin())
}

pub fn load_scene_file(path: &Path) -> Result<Scene> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read scene file at {}", path.display()))?;
    Scene::from_toml_str(&contents)
        .with_context(|| format!("invalid scene file at {}", path.display()))
}

fn default_scene_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ionstage").map(|dirs| dirs.config_dir().join("scene.toml"))
}

fn has_shader_overrides(args: &RunArgs) -> bool {
    args.hue.is_some()
        || args.x_offset.is_some()
        || args.speed.is_some()
        || args.intensity.is_some()
        || args.pattern_size.is_some()
}

fn overridden_builtin(args: &RunArgs) -> Result<Scene> {
    let mut scene = Scene::builtin();
    let lightning = &mut scene.sections[0].lightning;
    if let Some(hue) = args.hue {
        lightning.hue = hue;
    }
    if let Some(x_offset) = args.x_offset {
        lightning.x_offset = x_offset;
    }
    if let Some(speed) = args.speed {
        lightning.speed = speed;
    }
    if let Some(intensity) = args.intensity {
        lightning.intensity = intensity;
    }
    if let Some(size) = args.pattern_size {
        lightning.size = size;
    }
    tracing::debug!(?lightning, "built-in scene with command-line overrides");
    scene
        .validate()
        .context("invalid shader overrides on the command line")?;
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            scene: None,
            size: None,
            fps: None,
            hue: None,
            x_offset: None,
            speed: None,
            intensity: None,
            pattern_size: None,
        }
    }

    #[test]
    fn overrides_apply_to_the_builtin_section() {
        let scene = overridden_builtin(&RunArgs {
            hue: Some(340.0),
            speed: Some(1.6),
            intensity: Some(0.6),
            pattern_size: Some(2.0),
            x_offset: Some(-0.2),
            ..args()
        })
        .expect("valid overrides");

        let lightning = scene.sections[0].lightning;
        assert_eq!(lightning.hue, 340.0);
        assert_eq!(lightning.speed, 1.6);
        assert_eq!(lightning.intensity, 0.6);
        assert_eq!(lightning.size, 2.0);
        assert_eq!(lightning.x_offset, -0.2);
    }

    #[test]
    fn out_of_range_overrides_are_rejected() {
        let err = overridden_builtin(&RunArgs {
            speed: Some(0.0),
            ..args()
        })
        .unwrap_err();
        assert!(err.to_string().contains("invalid shader overrides"));
    }

    #[test]
    fn section_params_convert_field_for_field() {
        let scene = Scene::builtin();
        let params = lightning_params(&scene.sections[0]);
        assert_eq!(params, LightningParams::default());
    }
}
