use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;

/// Drives a pipeline through extract, transform and load.
pub struct SwapEngine<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> SwapEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting swap run...");
        self.monitor.log_phase("start");

        let observations = self.pipeline.extract().await?;
        tracing::info!("Extracted {} rate observations", observations.len());
        self.monitor.log_phase("extract");

        let report = self.pipeline.transform(observations).await?;
        tracing::info!(
            "Computed {} quarterly cash flows ({} → {})",
            report.cash_flows.len(),
            report.contract.start_date,
            report.end_date
        );
        self.monitor.log_phase("transform");

        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_phase("load");

        self.monitor.log_summary();
        Ok(output_path)
    }
}
