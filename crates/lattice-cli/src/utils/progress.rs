use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use latticert::engine::progress::{Progress, ProgressCallback, Stage};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// What the terminal currently shows for the running pipeline.
struct StageDisplay {
    bar: ProgressBar,
    stage: Option<Stage>,
    started: Instant,
}

impl StageDisplay {
    fn begin(&mut self, stage: Stage) {
        self.stage = Some(stage);
        self.started = Instant::now();
        self.bar.reset();
        self.bar.set_length(0);
        self.bar.set_style(spinner_style());
        self.bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
        self.bar.set_message(stage.label());
    }

    fn finish(&mut self) {
        self.bar.disable_steady_tick();
        let label = self.stage.map_or_else(|| self.bar.message(), |s| s.label());
        let elapsed = self.started.elapsed().as_secs_f64();
        self.bar.finish_with_message(format!("✓ {} ({:.1}s)", label, elapsed));
    }

    /// Switches the current stage to a bar counting lattice planes.
    fn start_planes(&mut self, planes: u64) {
        self.bar.disable_steady_tick();
        self.bar.set_length(planes);
        self.bar.set_position(0);
        self.bar.set_style(plane_bar_style());
    }

    fn finish_planes(&mut self) {
        let planes = self.bar.length().unwrap_or(0);
        self.bar.set_position(planes);
        self.bar.set_style(spinner_style());
        if let Some(stage) = self.stage {
            self.bar.set_message(format!("{} ({} planes scanned)", stage.label(), planes));
        }
    }

    fn note(&self, text: &str) {
        let tag = self
            .stage
            .map(|s| format!("[{}/{}] ", s.step(), Stage::ALL.len()))
            .unwrap_or_default();
        self.bar.println(format!("  {}{}", tag, text));
    }
}

/// Renders pipeline progress on stderr: a spinner per stage, a plane bar while the
/// lattice is laid out, and stage-tagged notes underneath.
#[derive(Clone)]
pub struct CliProgressHandler {
    display: Arc<Mutex<StageDisplay>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0)
            .with_style(spinner_style())
            .with_message("Initializing...");
        bar.set_draw_target(ProgressDrawTarget::stderr());
        bar.finish_and_clear();

        Self {
            display: Arc::new(Mutex::new(StageDisplay {
                bar,
                stage: None,
                started: Instant::now(),
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let display = self.display.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut display) = display.lock() else {
                warn!("Progress display mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { stage } => display.begin(stage),
                Progress::PhaseFinish => display.finish(),
                Progress::TaskStart { total_steps } => display.start_planes(total_steps),
                Progress::TaskIncrement => display.bar.inc(1),
                Progress::TaskFinish => display.finish_planes(),
                Progress::Message(text) => display.note(&text),
            }
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn plane_bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<40} [{bar:40.cyan/blue}] {pos}/{len} planes")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}
