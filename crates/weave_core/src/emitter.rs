//! Where a finished plan goes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{SynthError, SynthResult};
use crate::plan::SynthesizedPlan;

/// Receives a plan once synthesis has fully succeeded.
#[cfg_attr(test, mockall::automock)]
pub trait PlanEmitter {
    fn emit(&mut self, plan: &SynthesizedPlan) -> SynthResult<()>;
}

/// Writes the plan as pretty JSON to a file.
#[derive(Debug, Clone)]
pub struct JsonFileEmitter {
    path: PathBuf,
}

impl JsonFileEmitter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlanEmitter for JsonFileEmitter {
    fn emit(&mut self, plan: &SynthesizedPlan) -> SynthResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut json = plan.to_json()?;
        json.push('\n');
        fs::write(&self.path, json)?;
        info!("Wrote plan to {}", self.path.display());
        Ok(())
    }
}

/// Writes the plan as pretty JSON to any writer, typically stdout.
pub struct JsonWriterEmitter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriterEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PlanEmitter for JsonWriterEmitter<W> {
    fn emit(&mut self, plan: &SynthesizedPlan) -> SynthResult<()> {
        let json = plan.to_json()?;
        writeln!(self.writer, "{}", json).map_err(|e| SynthError::Emit(e.to_string()))?;
        self.writer.flush()?;
        Ok(())
    }
}
