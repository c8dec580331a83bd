//! egui overlay: the "Parameters" panel drawn over the scene.

use std::sync::Arc;

use egui_wgpu::ScreenDescriptor;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::controls::Overlay;
use crate::params::{
    FluidParams, KERNEL_R_RANGE, SIGMA_R_RANGE, SIGMA_Z_RANGE, SMOOTH_NITER_RANGE,
};
use crate::run_control::RunControl;

/// What the user did with the panel during one frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PanelResponse {
    pub params_changed: bool,
    pub run_changed: bool,
    /// "Next Frame" was clicked.
    pub advance_clicked: bool,
}

impl std::ops::BitOrAssign for PanelResponse {
    fn bitor_assign(&mut self, rhs: Self) {
        self.params_changed |= rhs.params_changed;
        self.run_changed |= rhs.run_changed;
        self.advance_clicked |= rhs.advance_clicked;
    }
}

/// Editable snapshot of the parameter store and run flags.
///
/// [`ParameterPanel::refresh`] copies the store in; edits made while drawing
/// are reported through [`PanelResponse`] and copied back by the viewer.
#[derive(Debug, Clone, Default)]
pub struct ParameterPanel {
    params: FluidParams,
    run: RunControl,
    frame: u64,
}

impl ParameterPanel {
    pub fn refresh(&mut self, params: &FluidParams, run: &RunControl, frame: u64) {
        self.params.clone_from(params);
        self.run = *run;
        self.frame = frame;
    }

    pub fn params(&self) -> &FluidParams {
        &self.params
    }

    pub fn run(&self) -> &RunControl {
        &self.run
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn show(&mut self, ctx: &egui::Context) -> PanelResponse {
        let mut response = PanelResponse::default();
        egui::Window::new("Parameters")
            .default_pos([30.0, 50.0])
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("parameters_grid")
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| self.grid(ui, &mut response));

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Next Frame").clicked() {
                        response.advance_clicked = true;
                    }
                    let mut running = self.run.is_running();
                    if ui.toggle_value(&mut running, "Run").changed() {
                        self.run.set_running(running);
                        response.run_changed = true;
                    }
                    if ui
                        .toggle_value(&mut self.run.last_frame, "Last Frame")
                        .changed()
                    {
                        response.run_changed = true;
                    }
                });
            });
        response
    }

    fn grid(&mut self, ui: &mut egui::Ui, response: &mut PanelResponse) {
        let p = &mut self.params;
        let mut changed = false;

        ui.label("# Frame");
        ui.label(self.frame.to_string());
        ui.end_row();

        changed |= row(ui, "# Iter", egui::DragValue::new(&mut p.niter));
        changed |= row(ui, "pho0", egui::DragValue::new(&mut p.pho0).speed(1.0));
        changed |= row(ui, "g", egui::DragValue::new(&mut p.g).speed(0.1));
        changed |= row(ui, "h", egui::DragValue::new(&mut p.h).speed(0.01));
        changed |= row(ui, "dt", egui::DragValue::new(&mut p.dt).speed(0.0001));
        changed |= row(ui, "lambda_eps", egui::DragValue::new(&mut p.lambda_eps));
        changed |= row(ui, "delta_q", egui::DragValue::new(&mut p.delta_q).speed(0.01));
        changed |= row(ui, "k_corr", egui::DragValue::new(&mut p.k_corr).speed(0.0001));
        changed |= row(ui, "n_corr", egui::DragValue::new(&mut p.n_corr).speed(0.1));
        changed |= row(ui, "k_boundary", egui::DragValue::new(&mut p.k_boundary).speed(0.1));
        changed |= row(ui, "c_XSPH", egui::DragValue::new(&mut p.c_xsph).speed(0.01));

        if row(
            ui,
            "Highlight #",
            egui::DragValue::new(&mut self.run.highlight).range(-1..=i32::MAX),
        ) {
            response.run_changed = true;
        }

        changed |= row(
            ui,
            "Smooth # Iter",
            egui::DragValue::new(&mut p.smooth_niter).range(SMOOTH_NITER_RANGE),
        );
        changed |= row(
            ui,
            "kernel_r",
            egui::DragValue::new(&mut p.kernel_r).range(KERNEL_R_RANGE),
        );
        changed |= row(
            ui,
            "sigma_r",
            egui::DragValue::new(&mut p.sigma_r)
                .range(SIGMA_R_RANGE)
                .speed(0.05),
        );
        changed |= row(
            ui,
            "sigma_z",
            egui::DragValue::new(&mut p.sigma_z)
                .range(SIGMA_Z_RANGE)
                .speed(0.005),
        );

        response.params_changed |= changed;
    }
}

fn row(ui: &mut egui::Ui, label: &str, widget: egui::DragValue<'_>) -> bool {
    ui.label(label);
    let changed = ui.add(widget).changed();
    ui.end_row();
    changed
}

/// egui context, winit glue and wgpu renderer for the panel.
pub struct GuiOverlay {
    window: Arc<Window>,
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    panel: ParameterPanel,
}

impl GuiOverlay {
    pub fn new(
        window: Arc<Window>,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            window.theme(),
            Some(device.limits().max_texture_dimension_2d as usize),
        );
        let renderer = egui_wgpu::Renderer::new(
            device,
            surface_format,
            egui_wgpu::RendererOptions::default(),
        );

        Self {
            window,
            ctx,
            state,
            renderer,
            panel: ParameterPanel::default(),
        }
    }

    pub fn panel(&self) -> &ParameterPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut ParameterPanel {
        &mut self.panel
    }

    /// Lay out the panel for this frame.
    pub fn run(&mut self) -> (egui::FullOutput, PanelResponse) {
        let raw_input = self.state.take_egui_input(&self.window);
        let mut response = PanelResponse::default();
        let panel = &mut self.panel;
        // egui may run the closure more than once per frame
        let mut output = self.ctx.run(raw_input, |ctx| {
            response |= panel.show(ctx);
        });
        let platform_output = std::mem::take(&mut output.platform_output);
        self.state.handle_platform_output(&self.window, platform_output);
        (output, response)
    }

    /// Record the panel on top of `view`. Returns command buffers from paint
    /// callbacks that must be submitted before the encoder.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
        output: egui::FullOutput,
    ) -> Vec<wgpu::CommandBuffer> {
        let screen_descriptor = ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: output.pixels_per_point,
        };

        for (id, image_delta) in &output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        let paint_jobs = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        let callback_buffers =
            self.renderer
                .update_buffers(device, queue, encoder, &paint_jobs, &screen_descriptor);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer.render(
                &mut render_pass.forget_lifetime(),
                &paint_jobs,
                &screen_descriptor,
            );
        }

        for id in &output.textures_delta.free {
            self.renderer.free_texture(id);
        }

        callback_buffers
    }
}

impl Overlay for GuiOverlay {
    fn on_event(&mut self, event: &WindowEvent) -> bool {
        self.state.on_window_event(&self.window, event).consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_snapshots_store() {
        let mut panel = ParameterPanel::default();
        let params = FluidParams {
            niter: 9,
            ..Default::default()
        };
        let run = RunControl {
            highlight: 3,
            ..Default::default()
        };
        panel.refresh(&params, &run, 42);
        assert_eq!(panel.params().niter, 9);
        assert_eq!(panel.run().highlight, 3);
        assert_eq!(panel.frame(), 42);
    }

    #[test]
    fn untouched_panel_reports_no_changes() {
        let ctx = egui::Context::default();
        let mut panel = ParameterPanel::default();
        let mut response = PanelResponse::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            response |= panel.show(ctx);
        });
        assert_eq!(response, PanelResponse::default());
        assert_eq!(panel.params(), &FluidParams::default());
    }
}
