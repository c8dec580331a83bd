//! Demo driver: owns the particle buffers, steps the animator and hands the
//! buffers to the viewer once per step.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use droplet_gpu::delegates::PointInitData;
use droplet_gpu::{BufferBuildError, BufferUsage, ParticleBuffers};
use droplet_window::{FluidParams, Frame, Viewer, ViewerConfig, ViewerError};
use glam::Vec3;
use tracing::{info, info_span};

use crate::animator::ParticleBlock;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Viewer(#[from] ViewerError),
    #[error("Particle buffer: {0}")]
    Buffer(#[from] BufferBuildError),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid parameter file {path}: {source}")]
    Params {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Logging configuration.
pub struct LoggingConfig {
    pub level: String,
    pub enable_tracy: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_tracy: false,
        }
    }
}

impl LoggingConfig {
    pub fn init(&self) {
        #[cfg(feature = "tracy")]
        {
            if self.enable_tracy {
                use tracing_subscriber::Layer;
                use tracing_subscriber::layer::SubscriberExt;
                use tracing_subscriber::util::SubscriberInitExt;
                tracing_subscriber::registry()
                    .with(tracing_tracy::TracyLayer::default())
                    .with(
                        tracing_subscriber::fmt::layer().with_filter(
                            tracing_subscriber::EnvFilter::try_from_default_env()
                                .unwrap_or_else(|_| self.level.clone().into()),
                        ),
                    )
                    .init();
                return;
            }
        }

        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&self.level)),
            )
            .with_target(false)
            .init();
    }
}

/// Everything the demo needs to start.
pub struct DemoConfig {
    pub viewer: ViewerConfig,
    pub particles: u32,
    pub params: FluidParams,
    /// Domain corners, any order.
    pub upper: Vec3,
    pub lower: Vec3,
    pub color: [f32; 4],
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            viewer: ViewerConfig::default(),
            particles: 4096,
            params: FluidParams::default(),
            upper: Vec3::splat(4.0),
            lower: Vec3::splat(-4.0),
            color: PointInitData::default().color,
        }
    }
}

/// Read a (possibly partial) parameter file. Missing fields keep their defaults.
pub fn load_params(path: &Path) -> Result<FluidParams, AppError> {
    let text = std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_params(&text).map_err(|source| AppError::Params {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_params(text: &str) -> Result<FluidParams, serde_json::Error> {
    let mut params: FluidParams = serde_json::from_str(text)?;
    params.clamp_rendering();
    Ok(params)
}

/// Open the viewer and run until the window closes.
pub fn run(config: DemoConfig) -> Result<(), AppError> {
    let init = PointInitData::default().with_color(config.color);
    let mut viewer: Viewer = Viewer::new(config.viewer, init)?;
    *viewer.params_mut() = config.params;
    viewer.set_limits(config.upper, config.lower);

    let mut block = ParticleBlock::new(config.particles, config.lower, config.upper);
    info!("Animating {} particles", block.len());

    let positions = viewer
        .renderer()
        .create_buffer()
        .label("Particle Positions")
        .with_pod_data(block.positions())
        .usage(BufferUsage::Particle)
        .build()?;
    let ids = viewer
        .renderer()
        .create_buffer()
        .label("Particle Ids")
        .with_pod_data(block.ids())
        .usage(BufferUsage::Particle)
        .build()?;

    let advance = Rc::new(Cell::new(false));
    let requested = advance.clone();
    viewer.on_advance_frame(move || requested.set(true));

    loop {
        let step_once = advance.replace(false);
        if viewer.is_running() || step_once {
            let _span = info_span!("step", n = block.steps()).entered();
            block.step(viewer.params(), viewer.last_frame());
            viewer
                .queue()
                .write_buffer(&positions, 0, bytemuck::cast_slice(block.positions()));
        }

        match viewer.render(ParticleBuffers::new(&positions, &ids, block.len()))? {
            Frame::Shutdown => break,
            Frame::Presented | Frame::Skipped => {}
        }
    }

    info!(
        "Viewer closed after {} frames, {} steps",
        viewer.frame_count(),
        block.steps()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_params_keeps_defaults_and_clamps() {
        let params = parse_params(r#"{ "dt": 0.01, "kernel_r": 99 }"#).unwrap();
        assert_eq!(params.dt, 0.01);
        assert_eq!(params.kernel_r, 20);
        assert_eq!(params.niter, 4);
    }

    #[test]
    fn parse_params_rejects_bad_json() {
        assert!(parse_params("{ niter: }").is_err());
    }

    #[test]
    fn missing_params_file_is_io_error() {
        let err = load_params(Path::new("/nonexistent/droplet-params.json")).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }

    #[test]
    fn default_demo_box_is_centered() {
        let config = DemoConfig::default();
        assert_eq!(config.upper + config.lower, Vec3::ZERO);
        assert!(config.particles > 0);
    }
}
