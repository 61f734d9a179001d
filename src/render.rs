use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{Error, Result};

const BACKGROUND: RGBColor = RGBColor(255, 255, 255);
const TARGET_COLOR: RGBColor = RGBColor(255, 0, 0);
const AGENT_COLOR: RGBColor = RGBColor(0, 0, 255);

/// Everything needed to draw one frame of the arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scene {
    pub window_size: u32,
    pub marker_size: u32,
    pub agent: [f64; 2],
    pub target: [f64; 2],
}

impl Scene {
    /// Inclusive pixel corners of a marker whose top-left sits at `pos`,
    /// clipped to the canvas. `None` if it lies fully outside.
    fn marker_rect(&self, pos: [f64; 2]) -> Option<((i32, i32), (i32, i32))> {
        let max = i64::from(self.window_size) - 1;
        let size = i64::from(self.marker_size);
        let clip = |v: f64| -> Option<(i32, i32)> {
            let lo = v.trunc() as i64;
            let hi = lo.saturating_add(size - 1);
            if hi < 0 || lo > max {
                return None;
            }
            Some((lo.clamp(0, max) as i32, hi.clamp(0, max) as i32))
        };
        let (x0, x1) = clip(pos[0])?;
        let (y0, y1) = clip(pos[1])?;
        Some(((x0, y0), (x1, y1)))
    }
}

/// Row-major RGB pixel buffer, `height` rows of `width` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }
}

fn render_err(e: impl std::fmt::Display) -> Error {
    Error::Render(e.to_string())
}

fn draw_scene(root: &DrawingArea<BitMapBackend<'_>, Shift>, scene: &Scene) -> Result<()> {
    root.fill(&BACKGROUND).map_err(render_err)?;
    // target first so the agent stays visible on top
    for (pos, color) in [(scene.target, TARGET_COLOR), (scene.agent, AGENT_COLOR)] {
        if let Some((top_left, bottom_right)) = scene.marker_rect(pos) {
            root.draw(&Rectangle::new([top_left, bottom_right], color.filled()))
                .map_err(render_err)?;
        }
    }
    Ok(())
}

/// Draws `scene` into a fresh RGB buffer.
pub fn render_rgb(scene: &Scene) -> Result<Frame> {
    let side = scene.window_size;
    let mut pixels = vec![0u8; side as usize * side as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (side, side)).into_drawing_area();
        draw_scene(&root, scene)?;
        root.present().map_err(render_err)?;
    }
    Ok(Frame {
        width: side,
        height: side,
        pixels,
    })
}

/// Observer notified after every state transition.
pub trait RenderSink {
    fn present(&mut self, scene: &Scene) -> Result<()>;

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// "human" mode: writes each frame to an image file and paces the caller to
/// a fixed frame rate.
pub struct HumanDisplay {
    path: PathBuf,
    interval: Duration,
    last_frame: Option<Instant>,
    frames: u64,
}

impl HumanDisplay {
    pub fn new(path: impl Into<PathBuf>, fps: u32) -> Result<Self> {
        if fps == 0 {
            return Err(Error::InvalidConfig("render_fps must be positive".to_string()));
        }
        Ok(Self {
            path: path.into(),
            interval: Duration::from_secs_f64(1.0 / f64::from(fps)),
            last_frame: None,
            frames: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    fn tick(&mut self) {
        if let Some(last) = self.last_frame {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                thread::sleep(self.interval - elapsed);
            }
        }
        self.last_frame = Some(Instant::now());
    }
}

impl RenderSink for HumanDisplay {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        {
            let side = scene.window_size;
            let root = BitMapBackend::new(&self.path, (side, side)).into_drawing_area();
            draw_scene(&root, scene)?;
            root.present().map_err(render_err)?;
        }
        self.frames += 1;
        tracing::trace!(frame = self.frames, path = %self.path.display(), "presented frame");
        self.tick();
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.last_frame = None;
        tracing::debug!(frames = self.frames, "closed human display");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(agent: [f64; 2], target: [f64; 2]) -> Scene {
        Scene {
            window_size: 64,
            marker_size: 10,
            agent,
            target,
        }
    }

    #[test]
    fn marker_is_clipped_at_the_edges() {
        let s = scene([-5.0, 60.0], [0.0, 0.0]);
        assert_eq!(s.marker_rect([-5.0, 60.0]), Some(((0, 60), (4, 63))));
        assert_eq!(s.marker_rect([-20.0, 10.0]), None);
        assert_eq!(s.marker_rect([64.0, 10.0]), None);
    }

    #[test]
    fn agent_is_drawn_over_target() {
        let frame = render_rgb(&scene([20.0, 20.0], [25.0, 25.0])).unwrap();
        assert_eq!(frame.pixel(26, 26), Some([0, 0, 255]));
        assert_eq!(frame.pixel(33, 33), Some([255, 0, 0]));
        assert_eq!(frame.pixel(50, 5), Some([255, 255, 255]));
        assert_eq!(frame.pixel(64, 0), None);
    }
}
