use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use egui_wgpu::winit::Painter;
use egui_wgpu::{RendererOptions, WgpuConfiguration, WgpuSetup, WgpuSetupCreateNew};
use tracing::info;
use trestle_view::ViewerConfig;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use super::app::TrestleApp;

const POWER_PREF_ENV: &str = "TRESTLE_POWER_PREF";

pub fn run_gui(config: ViewerConfig) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow!("event loop: {err}"))?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut shell = Shell {
        app: TrestleApp::new(config),
        ctx: egui::Context::default(),
        surface: None,
        error: None,
    };
    event_loop
        .run_app(&mut shell)
        .map_err(|err| anyhow!("event loop: {err}"))?;
    shell.error.map_or(Ok(()), Err)
}

/// Window and the egui/wgpu state bound to it. Created on first resume.
struct Surface {
    window: Arc<Window>,
    painter: Painter,
    input: egui_winit::State,
    clear_color: [f32; 4],
}

struct Shell {
    app: TrestleApp,
    ctx: egui::Context,
    surface: Option<Surface>,
    error: Option<anyhow::Error>,
}

impl Shell {
    fn open(&self, event_loop: &ActiveEventLoop) -> Result<Surface> {
        let attributes = Window::default_attributes()
            .with_title("Trestle")
            .with_min_inner_size(LogicalSize::new(1100.0, 680.0));
        let window = event_loop
            .create_window(attributes)
            .map_err(|err| anyhow!("window: {err}"))?;
        let window = Arc::new(window);

        let mut painter = pollster::block_on(Painter::new(
            self.ctx.clone(),
            wgpu_configuration(),
            false,
            RendererOptions::default(),
        ));
        pollster::block_on(painter.set_window(egui::ViewportId::ROOT, Some(Arc::clone(&window))))
            .map_err(|err| anyhow!("wgpu surface: {err}"))?;
        let render_state = painter
            .render_state()
            .ok_or_else(|| anyhow!("wgpu render state not initialized"))?;
        let adapter = render_state.adapter.get_info();
        info!(adapter = %adapter.name, backend = ?adapter.backend, "wgpu ready");

        let input = egui_winit::State::new(
            self.ctx.clone(),
            egui::ViewportId::ROOT,
            event_loop,
            Some(window.scale_factor() as f32),
            window.theme(),
            painter.max_texture_side(),
        );
        let clear_color = self.ctx.style().visuals.window_fill.to_normalized_gamma_f32();
        Ok(Surface {
            window,
            painter,
            input,
            clear_color,
        })
    }
}

impl Surface {
    fn resize(&mut self) {
        let size = self.window.inner_size();
        if let (Some(width), Some(height)) =
            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        {
            self.painter
                .on_window_resized(egui::ViewportId::ROOT, width, height);
        }
    }

    fn redraw(&mut self, ctx: &egui::Context, app: &mut TrestleApp) {
        let raw_input = self.input.take_egui_input(&self.window);
        let output = ctx.run(raw_input, |ctx| app.ui(ctx));
        self.input
            .handle_platform_output(&self.window, output.platform_output);
        let primitives = ctx.tessellate(output.shapes, output.pixels_per_point);
        self.painter.paint_and_update_textures(
            egui::ViewportId::ROOT,
            output.pixels_per_point,
            self.clear_color,
            &primitives,
            &output.textures_delta,
            Vec::new(),
        );
    }
}

impl ApplicationHandler for Shell {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_some() {
            return;
        }
        match self.open(event_loop) {
            Ok(surface) => self.surface = Some(surface),
            Err(err) => {
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if window_id != surface.window.id() {
            return;
        }
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }
        if surface.input.on_window_event(&surface.window, &event).repaint {
            surface.window.request_redraw();
        }
        match event {
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => surface.resize(),
            WindowEvent::RedrawRequested => surface.redraw(&self.ctx, &mut self.app),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(surface) = &self.surface {
            surface.window.request_redraw();
        }
    }
}

fn wgpu_configuration() -> WgpuConfiguration {
    let preference = std::env::var(POWER_PREF_ENV).ok();
    WgpuConfiguration {
        wgpu_setup: WgpuSetup::CreateNew(WgpuSetupCreateNew {
            power_preference: power_preference(preference.as_deref()),
            device_descriptor: Arc::new(|adapter| wgpu::DeviceDescriptor {
                label: Some("trestle-view"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::default(),
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Low power unless the override asks for the discrete GPU or wgpu's default.
fn power_preference(value: Option<&str>) -> wgpu::PowerPreference {
    match value.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
        Some("high" | "high_performance" | "high-performance") => {
            wgpu::PowerPreference::HighPerformance
        }
        Some("default") => wgpu::PowerPreference::default(),
        _ => wgpu::PowerPreference::LowPower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_override_is_case_insensitive() {
        assert_eq!(power_preference(None), wgpu::PowerPreference::LowPower);
        assert_eq!(
            power_preference(Some(" High-Performance ")),
            wgpu::PowerPreference::HighPerformance
        );
        assert_eq!(
            power_preference(Some("default")),
            wgpu::PowerPreference::default()
        );
        assert_eq!(power_preference(Some("fast")), wgpu::PowerPreference::LowPower);
    }
}
