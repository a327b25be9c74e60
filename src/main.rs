use async_surface::{
    AsyncSurface, BitmapBackend, Colour, Dispatcher, DisplayConfig, DrawTask,
    PixelBuffer, Point, Size, fill_pixel_buffer_parallel_cancelable, write_ppm,
};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const REDRAWS: u32 = 4;
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);
const OUTPUT_PATH: &str = "output/gradient.ppm";

fn gradient(frame: u32, pixel: Point, size: Size) -> Colour {
    let r = (pixel.x * 255 / size.width.max(1)) as u8;
    let g = (pixel.y * 255 / size.height.max(1)) as u8;
    let b = (frame * 60 % 256) as u8;
    Colour::new(r, g, b)
}

fn gradient_task(frame: u32) -> DrawTask<PixelBuffer> {
    DrawTask::empty()
        .on_draw(move |context, _, token| {
            let shader = move |pixel: Point, size: Size| gradient(frame, pixel, size);
            if fill_pixel_buffer_parallel_cancelable(context, &shader, token).is_err() {
                debug!(frame, "gradient superseded mid-fill");
            }
        })
        .on_did_display(move |surface, finished| {
            info!(frame, surface = %surface.id(), finished, "frame settled");
        })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let backend = Arc::new(BitmapBackend::new());
    let config = DisplayConfig::default().with_background(Colour::BLACK);
    let dispatcher = Rc::new(Dispatcher::new(config, Arc::clone(&backend))?);

    let frames = AtomicU32::new(0);
    let surface = AsyncSurface::new(
        &dispatcher,
        move || gradient_task(frames.fetch_add(1, Ordering::Relaxed) + 1),
        Size::new(640, 480),
    );

    for _ in 0..REDRAWS {
        surface.set_needs_display()?;
    }

    let settled = dispatcher.main_queue().run_until(
        || {
            let stats = surface.stats();
            stats.settled() == stats.requested
        },
        SETTLE_TIMEOUT,
    );
    if !settled {
        return Err("timed out waiting for redraws to settle".into());
    }

    let contents = backend
        .contents(surface.id())
        .ok_or("no frame was committed")?;

    std::fs::create_dir_all("output")?;
    write_ppm(&contents, OUTPUT_PATH)?;

    info!(path = OUTPUT_PATH, stats = ?surface.stats(), "wrote final frame");

    Ok(())
}
