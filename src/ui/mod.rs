pub mod stats;

use std::ops::RangeInclusive;

use winit::window::Window;

use crate::config::{
    SimConfig, DESPAWN_TIMEOUT_RANGE_MS, ROTATION_MULTIPLIER_RANGE, SPAWN_INTERVAL_RANGE_MS,
};
use crate::render::GpuState;
use crate::scene::{Metrics, Scene};

use self::stats::FrameStats;

/// Logical width of the settings side panel. Pointer-downs over it never
/// reach the scene.
pub const PANEL_WIDTH: f32 = 320.0;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(168, 85, 247);
/// Granularity of the seconds sliders.
const SECONDS_STEP: f64 = 0.1;

/// Something the user asked for this frame that needs the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelAction {
    /// Spawn one cat of the manual-factory selection.
    SpawnSelected,
    RegisterBreed(String),
}

/// Settings panel, stats header and hover tooltip, powered by egui.
pub struct SettingsPanel {
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,

    pub open: bool,
    new_breed: String,
    pub stats: FrameStats,
}

/// Paint output of one egui frame.
pub struct PanelFrame {
    pub primitives: Vec<egui::epaint::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub screen_descriptor: egui_wgpu::ScreenDescriptor,
}

impl SettingsPanel {
    pub fn new(window: &Window, gpu: &GpuState) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            open: false,
            new_breed: String::new(),
            stats: FrameStats::new(),
        }
    }

    /// Forward a winit event to egui. Returns true if egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    /// Width in physical pixels the scene must leave alone, if any.
    pub fn reserved_width(&self, scale_factor: f32) -> Option<f32> {
        self.open.then_some(PANEL_WIDTH * scale_factor)
    }

    /// Run one egui frame against the scene: draw, apply edits and actions,
    /// and return what needs painting.
    pub fn run_frame(&mut self, window: &Window, scene: &mut Scene, t: f64) -> PanelFrame {
        let raw_input = self.egui_state.take_egui_input(window);

        // Snapshot what the UI reads; write edits back after run().
        let view = PanelView {
            metrics: scene.metrics(),
            breeds: scene.catalog().available().to_vec(),
            hover: scene
                .hovered()
                .map(|h| (h.name.clone(), h.breed.clone(), h.screen_pos)),
            fps: self.stats.fps,
        };
        let mut config = scene.config().clone();
        let mut open = self.open;
        let mut new_breed = std::mem::take(&mut self.new_breed);
        let mut actions = Vec::new();

        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| {
            draw_ui(ctx, &view, &mut open, &mut config, &mut new_breed, &mut actions);
        });

        self.open = open;
        self.new_breed = new_breed;
        *scene.config_mut() = config;
        apply_actions(scene, actions, t);

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);
        let size = window.inner_size();

        PanelFrame {
            primitives,
            textures_delta: full_output.textures_delta,
            screen_descriptor: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [size.width, size.height],
                pixels_per_point,
            },
        }
    }

    /// Upload egui textures and buffers. Call before the egui render pass.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        frame: &PanelFrame,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &frame.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        self.egui_renderer.update_buffers(
            device,
            queue,
            encoder,
            &frame.primitives,
            &frame.screen_descriptor,
        )
    }

    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'static>, frame: &PanelFrame) {
        self.egui_renderer
            .render(render_pass, &frame.primitives, &frame.screen_descriptor);
    }

    /// Free textures after present.
    pub fn free_textures(&mut self, frame: &PanelFrame) {
        for id in &frame.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

/// Carry out panel requests against the scene at host time `t`.
pub fn apply_actions(scene: &mut Scene, actions: Vec<PanelAction>, t: f64) {
    for action in actions {
        match action {
            PanelAction::SpawnSelected => {
                let breed = scene.config().manual_selection.clone();
                scene.spawn_now(t, Some(&breed));
            }
            PanelAction::RegisterBreed(name) => {
                scene.register_variant(&name);
            }
        }
    }
}

fn ms_to_secs(range: &RangeInclusive<f64>) -> RangeInclusive<f64> {
    *range.start() / 1000.0..=*range.end() / 1000.0
}

/// Slider seconds back to whole milliseconds, dropping float noise from the step.
fn secs_to_ms(secs: f64) -> f64 {
    (secs * 1000.0).round()
}

// ---------------------------------------------------------------------------
// UI snapshot + free-function draw (avoids borrow conflicts with egui_ctx)
// ---------------------------------------------------------------------------

struct PanelView {
    metrics: Metrics,
    breeds: Vec<String>,
    /// Name, breed and physical-pixel pointer position.
    hover: Option<(String, String, glam::Vec2)>,
    fps: f64,
}

fn draw_ui(
    ctx: &egui::Context,
    view: &PanelView,
    open: &mut bool,
    config: &mut SimConfig,
    new_breed: &mut String,
    actions: &mut Vec<PanelAction>,
) {
    // --- Header + counters ---
    egui::Area::new(egui::Id::new("header"))
        .anchor(egui::Align2::CENTER_TOP, [0.0, 16.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new("Spinning Cats 2")
                        .strong()
                        .size(24.0)
                        .color(egui::Color32::WHITE),
                );
                ui.horizontal(|ui| {
                    ui.label(format!("Active Now: {}", view.metrics.active));
                    ui.separator();
                    ui.label(format!("Total Cats: {}", view.metrics.total_spawned));
                    ui.separator();
                    ui.label(
                        egui::RichText::new(format!("{:.0} fps", view.fps))
                            .small()
                            .color(egui::Color32::from_gray(140)),
                    );
                });
            });
        });

    // --- Gear toggle ---
    egui::Area::new(egui::Id::new("gear"))
        .anchor(egui::Align2::RIGHT_TOP, [-24.0, 24.0])
        .show(ctx, |ui| {
            let gear = egui::Button::new(egui::RichText::new("⚙").size(22.0))
                .fill(if *open { ACCENT } else { egui::Color32::from_gray(40) });
            if ui.add(gear).clicked() {
                *open = !*open;
            }
        });

    // --- Settings panel ---
    if *open {
        let panel_frame = egui::Frame::NONE
            .fill(egui::Color32::from_rgba_unmultiplied(2, 6, 23, 210))
            .inner_margin(24.0);

        egui::SidePanel::left("settings")
            .exact_width(PANEL_WIDTH)
            .resizable(false)
            .frame(panel_frame)
            .show(ctx, |ui| {
                ui.style_mut().visuals.override_text_color = Some(egui::Color32::from_gray(220));
                ui.add_space(64.0);
                ui.heading("Settings");
                ui.add_space(8.0);

                let mut spawn_s = config.spawn_interval_ms() / 1000.0;
                ui.label("Spawn Rate");
                if ui
                    .add(
                        egui::Slider::new(&mut spawn_s, ms_to_secs(&SPAWN_INTERVAL_RANGE_MS))
                            .step_by(SECONDS_STEP)
                            .suffix("s"),
                    )
                    .changed()
                {
                    config.set_spawn_interval_ms(secs_to_ms(spawn_s));
                }

                let mut despawn_s = config.despawn_timeout_ms() / 1000.0;
                ui.label("Despawn Delay");
                if ui
                    .add(
                        egui::Slider::new(&mut despawn_s, ms_to_secs(&DESPAWN_TIMEOUT_RANGE_MS))
                            .step_by(SECONDS_STEP)
                            .suffix("s"),
                    )
                    .changed()
                {
                    config.set_despawn_timeout_ms(secs_to_ms(despawn_s));
                }

                let mut spin = config.rotation_multiplier();
                ui.label("Spin Velocity");
                if ui
                    .add(
                        egui::Slider::new(&mut spin, ROTATION_MULTIPLIER_RANGE)
                            .step_by(0.1)
                            .suffix("x"),
                    )
                    .changed()
                {
                    config.set_rotation_multiplier(spin);
                }

                ui.checkbox(&mut config.auto_spawn, "Auto Spawn");
                ui.add_space(16.0);

                // --- Manual factory ---
                ui.heading("Manual Factory");
                egui::ComboBox::from_id_salt("manual_breed")
                    .selected_text(config.manual_selection.as_str())
                    .width(PANEL_WIDTH - 48.0)
                    .show_ui(ui, |ui| {
                        for breed in &view.breeds {
                            ui.selectable_value(&mut config.manual_selection, breed.clone(), breed);
                        }
                    });
                if ui
                    .add(egui::Button::new("Spawn Breed").fill(ACCENT))
                    .clicked()
                {
                    actions.push(PanelAction::SpawnSelected);
                }
                ui.add_space(16.0);

                // --- New breed ---
                ui.heading("Add New Breed");
                ui.horizontal(|ui| {
                    let edit = ui.add(
                        egui::TextEdit::singleline(new_breed)
                            .hint_text("Breed name")
                            .desired_width(PANEL_WIDTH - 96.0),
                    );
                    let submitted =
                        edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.button("+").clicked() || submitted {
                        let name = std::mem::take(new_breed);
                        if !name.trim().is_empty() {
                            actions.push(PanelAction::RegisterBreed(name));
                        }
                    }
                });
            });
    }

    // --- Cat tooltip (floating near cursor) ---
    if let Some((name, breed, screen_pos)) = &view.hover {
        let ppp = ctx.pixels_per_point();
        let tooltip_frame = egui::Frame::NONE
            .fill(egui::Color32::from_rgba_unmultiplied(2, 6, 23, 230))
            .corner_radius(8.0)
            .inner_margin(8.0);

        egui::Window::new("cat_tooltip")
            .title_bar(false)
            .fixed_pos([screen_pos.x / ppp + 15.0, screen_pos.y / ppp - 10.0])
            .resizable(false)
            .interactable(false)
            .frame(tooltip_frame)
            .show(ctx, |ui| {
                ui.style_mut().visuals.override_text_color = Some(egui::Color32::from_gray(230));
                ui.label(egui::RichText::new(name).strong().size(14.0));
                ui.label(egui::RichText::new(breed).color(ACCENT));
            });
    }
}
