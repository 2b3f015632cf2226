use clap::Parser;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;
use tunnel_core::audio::SoftBackend;
use tunnel_core::{depth_readout, EffectCoordinator, EffectHandle, Rgba, Section};
use winit::event::{ElementState, Event, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::Key;
use winit::window::WindowBuilder;

mod audio;
mod cli;
mod render;

use render::{PresentFx, Renderer};

const LINE_SCROLL_PX: f32 = 100.0; // one wheel notch, in browser deltaY pixels
const SECTION_SPACING: f32 = 2_000.0;
const SECTION_COUNT: usize = 7;
const SECTION_COLOR: Rgba = Rgba::new(0.0, 1.0, 1.0, 0.6);

/// Native stand-in for the page's sections: evenly spaced frames down the tunnel.
fn section_layout() -> Vec<Section> {
    (0..SECTION_COUNT)
        .map(|i| Section {
            depth: -(i as f32) * SECTION_SPACING,
        })
        .collect()
}

/// Wheel delta in the browser's convention (positive moves deeper).
fn scroll_delta(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_SCROLL_PX,
        MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
    }
}

fn on_key(handle: &EffectHandle, key: &Key) {
    let Key::Character(c) = key else {
        return;
    };
    match c.to_ascii_lowercase().as_str() {
        "g" => handle.fire_glitch(),
        "n" => handle.fire_nova(),
        "c" => handle.collapse(),
        "t" => handle.toggle_theme(),
        _ => {}
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::Args::parse();
    let config = args.load_config()?;
    log::info!(
        "[config] seed {} particles {} theme '{}'{}",
        config.seed,
        config.particles.count,
        config.audio.theme,
        if config.audio.muted { " (muted)" } else { "" }
    );

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(format!("tunnel {}", depth_readout(0.0)))
        .build(&event_loop)?;

    let mut renderer = pollster::block_on(Renderer::new(&window))?;

    // The output stream opens on the first gesture and lives until exit.
    let stream_slot: Rc<RefCell<Option<cpal::Stream>>> = Rc::new(RefCell::new(None));
    let mut coord: EffectCoordinator<SoftBackend> = EffectCoordinator::new(
        config,
        section_layout(),
        Some(renderer.viewport()),
        audio::acquirer(stream_slot.clone()),
    );
    let handle = coord.handle();
    let origin = Instant::now();
    let mut title = depth_readout(0.0);

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => {
                renderer.resize(size);
                coord.resize(renderer.viewport());
            }
            WindowEvent::MouseWheel { delta, .. } => {
                handle.gesture();
                handle.scroll(scroll_delta(delta));
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                ..
            } => handle.gesture(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => on_key(&handle, &logical_key),
            _ => {}
        },
        Event::AboutToWait => {
            let now = origin.elapsed();
            let report = coord.tick(now);
            if let Some(target) = &report.navigate {
                log::info!("[effects] collapse finished (target {target}); closing");
                elwt.exit();
                return;
            }

            coord.render_field(&mut renderer.batch);
            let viewport = renderer.viewport();
            for visual in coord.visuals() {
                if visual.opacity <= 0.0 {
                    continue;
                }
                if let Some((center, half)) = render::project_section(viewport, visual.view_z, visual.offset) {
                    let color = Rgba {
                        a: SECTION_COLOR.a * visual.opacity,
                        ..SECTION_COLOR
                    };
                    renderer.sections.frame(center, half, color, 2.0);
                }
            }

            let fx = PresentFx {
                invert: report.invert,
                glitch: report.glitch,
                collapse: report.collapse_progress.unwrap_or(0.0),
                time: now.as_secs_f32(),
            };
            match renderer.render(fx) {
                Ok(_) => renderer.window().request_redraw(),
                Err(wgpu::SurfaceError::Lost) => {
                    renderer.resize(renderer.window().inner_size());
                    coord.resize(renderer.viewport());
                }
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(e) => log::warn!("[render] {e:?}"),
            }

            let readout = depth_readout(report.depth);
            if readout != title {
                renderer.window().set_title(&format!("tunnel {readout}"));
                title = readout;
            }
        }
        _ => {}
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn wheel_down_moves_deeper() {
        assert_eq!(scroll_delta(MouseScrollDelta::LineDelta(0.0, -1.0)), 100.0);
        assert_eq!(scroll_delta(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 40.0))), -40.0);
    }

    #[test]
    fn keys_map_to_commands() {
        let handle = EffectHandle::new();
        for k in ["g", "N", "c", "t", "x"] {
            on_key(&handle, &Key::Character(k.into()));
        }
        assert_eq!(handle.pending(), 4);
    }

    #[test]
    fn sections_recede_from_zero() {
        let layout = section_layout();
        assert_eq!(layout.len(), SECTION_COUNT);
        assert_eq!(layout[0].depth, 0.0);
        assert!(layout.windows(2).all(|w| w[1].depth < w[0].depth));
    }
}
