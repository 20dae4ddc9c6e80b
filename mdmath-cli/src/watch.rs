//! Polling file watcher for the `watch` command
//!
//! Changes to the input's modification time count as edits. Each edit restarts the
//! debounce period, and the preview is only re-rendered once the file has been quiet for
//! that long, so an editor saving in bursts triggers a single render.

use mdmath_babel::ingest::load_source;
use mdmath_babel::render::Debouncer;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

pub struct WatchOptions {
    pub debounce: Duration,
    /// Render once and return
    pub once: bool,
}

pub fn run<F>(input: &Path, output: &Path, options: WatchOptions, render: F) -> Result<(), String>
where
    F: Fn(&str) -> String,
{
    render_to(input, output, &render)?;
    if options.once {
        return Ok(());
    }

    let mut debouncer = Debouncer::new(options.debounce);
    let mut last_modified = modified(input);
    info!(input = %input.display(), "watching for changes");

    loop {
        let now = Instant::now();
        let current = modified(input);
        if current != last_modified {
            last_modified = current;
            let generation = debouncer.touch(now);
            debug!(generation, "input changed");
        }
        if let Some(generation) = debouncer.poll(now) {
            debug!(generation, "re-rendering preview");
            // A failed render (file briefly missing mid-save) waits for the next change
            if let Err(e) = render_to(input, output, &render) {
                eprintln!("Error: {e}");
            }
        }
        let wait = debouncer
            .remaining(now)
            .map_or(POLL_INTERVAL, |left| left.clamp(Duration::from_millis(1), POLL_INTERVAL));
        thread::sleep(wait);
    }
}

fn render_to<F>(input: &Path, output: &Path, render: &F) -> Result<(), String>
where
    F: Fn(&str) -> String,
{
    let source = load_source(input).map_err(|e| e.to_string())?;
    fs::write(output, render(&source))
        .map_err(|e| format!("Error writing file '{}': {e}", output.display()))?;
    info!(output = %output.display(), "preview written");
    Ok(())
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
