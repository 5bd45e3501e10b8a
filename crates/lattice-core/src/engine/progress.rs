/// The sequential stages of a lattice generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    LoadGeometry,
    ComposeRegions,
    ComputeMargin,
    GenerateLattice,
    ConvertContours,
    RepairRecord,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::LoadGeometry,
        Stage::ComposeRegions,
        Stage::ComputeMargin,
        Stage::GenerateLattice,
        Stage::ConvertContours,
        Stage::RepairRecord,
    ];

    /// One-based position of the stage in the run.
    pub fn step(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).map_or(0, |i| i + 1)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::LoadGeometry => "Loading series geometry",
            Stage::ComposeRegions => "Processing region masks",
            Stage::ComputeMargin => "Computing placement margin",
            Stage::GenerateLattice => "Generating lattice spheres",
            Stage::ConvertContours => "Converting contours",
            Stage::RepairRecord => "Regenerating identifiers and repairing contours",
        }
    }

    /// Label of the form `Step 3/6: Computing placement margin`.
    pub fn label(&self) -> String {
        format!("Step {}/{}: {}", self.step(), Self::ALL.len(), self.name())
    }
}

#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { stage: Stage },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    pub fn message(&self, text: impl Into<String>) {
        self.report(Progress::Message(text.into()));
    }
}
