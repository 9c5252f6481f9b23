use crate::domain::model::Summary;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Result of a full run: the pipeline output plus every location written.
#[derive(Debug, Clone)]
pub struct RunOutcome<O> {
    pub output: O,
    pub written: Vec<String>,
}

pub struct CheckEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P> CheckEngine<P>
where
    P: Pipeline,
    P::Extracted: Summary,
    P::Output: Summary,
{
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn run(&mut self) -> Result<RunOutcome<P::Output>> {
        tracing::info!("🚀 Starting check");

        let extracted = self.extract()?;

        tracing::info!("🔄 Comparing");
        let output = self.pipeline.transform(extracted)?;
        tracing::info!("✅ Compared: {}", output.summary());
        self.monitor.log_stats("transform");

        tracing::info!("💾 Writing reports");
        let written = self.pipeline.load(&output)?;
        for location in &written {
            tracing::info!("📁 {}", location);
        }
        self.monitor.log_stats("load");
        self.monitor.log_final_stats();

        Ok(RunOutcome { output, written })
    }

    /// Reads and maps the inputs without comparing or writing anything.
    pub fn preview(&mut self) -> Result<P::Extracted> {
        let extracted = self.extract()?;
        self.monitor.log_final_stats();
        Ok(extracted)
    }

    fn extract(&mut self) -> Result<P::Extracted> {
        tracing::info!("📥 Reading inputs");
        let extracted = self.pipeline.extract()?;
        tracing::info!("✅ Read {}", extracted.summary());
        self.monitor.log_stats("extract");
        Ok(extracted)
    }
}
