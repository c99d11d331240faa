use std::sync::Arc;

use glam::Vec2;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{CursorIcon, Window, WindowAttributes, WindowId};

use crate::cat::ProceduralCat;
use crate::ecs::systems::interaction::CursorHint;
use crate::feedback;
use crate::render::instance::{self, PartInstance};
use crate::render::{GpuState, RenderError};
use crate::scene::Scene;
use crate::ui::SettingsPanel;

const WINDOW_TITLE: &str = "Spinning Cats 2";
const INITIAL_WINDOW_SIZE: winit::dpi::LogicalSize<f64> = winit::dpi::LogicalSize::new(1280.0, 800.0);
/// Pixels per wheel "line", matching what browsers report as deltaY.
const PIXELS_PER_LINE: f32 = 100.0;

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state. Everything but `scene` exists only once
/// the window is up.
struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    panel: Option<SettingsPanel>,
    scene: Scene,

    start: Instant,
    last_frame_time: Option<Instant>,
    cursor_pos: Vec2,
    cursor_hint: CursorHint,

    // Reusable instance buffer (avoid per-frame allocation)
    instance_buf: Vec<PartInstance>,

    /// Startup failure to report once the event loop returns.
    fatal: Option<RenderError>,
}

impl App {
    fn new() -> Self {
        Self {
            window: None,
            gpu: None,
            panel: None,
            scene: Scene::new(
                Vec2::ONE,
                Box::new(ProceduralCat),
                feedback::open_default(),
                fastrand::Rng::new(),
            ),
            start: Instant::now(),
            last_frame_time: None,
            cursor_pos: Vec2::ZERO,
            cursor_hint: CursorHint::Default,
            instance_buf: Vec::with_capacity(1024),
            fatal: None,
        }
    }

    /// Host time handed to the scene, in ms since startup.
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    fn redraw(&mut self) {
        let (Some(window), Some(gpu), Some(panel)) =
            (&self.window, &mut self.gpu, &mut self.panel)
        else {
            return;
        };

        // --- Timing ---
        let now = Instant::now();
        if let Some(last) = self.last_frame_time {
            panel.stats.record(now.duration_since(last).as_secs_f64());
        }
        self.last_frame_time = Some(now);

        // --- Simulate ---
        let t = self.start.elapsed().as_secs_f64() * 1000.0;
        if !self.scene.tick(t) {
            return;
        }
        let frame = panel.run_frame(window, &mut self.scene, t);
        if let Some(m) = self.scene.take_metrics_update() {
            log::debug!("active {} / total {}", m.active, m.total_spawned);
        }

        let hint = self.scene.cursor();
        if hint != self.cursor_hint {
            window.set_cursor(cursor_icon(hint));
            self.cursor_hint = hint;
        }

        // --- Render ---
        instance::collect(self.scene.graph(), &mut self.instance_buf);
        gpu.update_scene(self.scene.camera().view_proj(), &self.instance_buf);

        let Some(mut ctx) = gpu.begin_frame() else {
            return;
        };
        gpu.draw_cats(&mut ctx.encoder, &ctx.view);

        let egui_cmds = panel.prepare(&gpu.device, &gpu.queue, &mut ctx.encoder, &frame);
        {
            let mut pass = GpuState::begin_egui_pass(&mut ctx.encoder, &ctx.view);
            panel.render(&mut pass, &frame);
        }
        gpu.finish_frame(ctx.encoder, ctx.output, egui_cmds);
        panel.free_textures(&frame);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(INITIAL_WINDOW_SIZE);

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        let gpu = match GpuState::new(window.clone()) {
            Ok(gpu) => gpu,
            Err(e) => {
                self.fatal = Some(e);
                event_loop.exit();
                return;
            }
        };
        log::info!("wgpu + cat pipeline initialized");

        self.scene.resize(size.width as f32, size.height as f32);
        self.panel = Some(SettingsPanel::new(&window, &gpu));
        self.gpu = Some(gpu);

        // Continuous frame loop
        event_loop.set_control_flow(ControlFlow::Poll);
        self.window = Some(window);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let consumed = match (&self.window, &mut self.panel) {
            (Some(window), Some(panel)) => panel.on_window_event(window, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                self.scene.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
                self.scene
                    .resize(new_size.width as f32, new_size.height as f32);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_pos = Vec2::new(position.x as f32, position.y as f32);
                if !consumed {
                    self.scene.pointer_move(self.cursor_pos);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed if !consumed => {
                    let scale = self.window.as_ref().map_or(1.0, |w| w.scale_factor() as f32);
                    let reserved = self.panel.as_ref().and_then(|p| p.reserved_width(scale));
                    self.scene.set_reserved_width(reserved);
                    self.scene.pointer_down(self.cursor_pos);
                }
                ElementState::Pressed => {}
                // Release anywhere ends a drag, even over the panel.
                ElementState::Released => self.scene.pointer_up(),
            },
            WindowEvent::MouseWheel { delta, .. } if !consumed => {
                self.scene.wheel(wheel_delta_y(delta));
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.scene.teardown();
        log::info!("Exiting after {:.1}s", self.now_ms() / 1000.0);
    }
}

/// Browser-style deltaY: positive when scrolling toward the user.
fn wheel_delta_y(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * PIXELS_PER_LINE,
        MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
    }
}

fn cursor_icon(hint: CursorHint) -> CursorIcon {
    match hint {
        CursorHint::Default => CursorIcon::Default,
        CursorHint::Pointer => CursorIcon::Pointer,
        CursorHint::Grabbing => CursorIcon::Grabbing,
    }
}

/// Entry point: create event loop and run.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new();
    event_loop.run_app(&mut app)?;
    match app.fatal.take() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_up_zooms_in() {
        assert_eq!(wheel_delta_y(MouseScrollDelta::LineDelta(0.0, 1.0)), -100.0);
        assert_eq!(
            wheel_delta_y(MouseScrollDelta::PixelDelta(winit::dpi::PhysicalPosition::new(0.0, -40.0))),
            40.0
        );
    }

    #[test]
    fn cursor_hints_map_to_icons() {
        assert_eq!(cursor_icon(CursorHint::Grabbing), CursorIcon::Grabbing);
        assert_eq!(cursor_icon(CursorHint::Pointer), CursorIcon::Pointer);
        assert_eq!(cursor_icon(CursorHint::Default), CursorIcon::Default);
    }
}
