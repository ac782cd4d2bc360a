//! Plan execution against the workbench
//!
//! Each dispatched step runs to a terminal observation, ok or error. A
//! step's actuation failure is caught and recorded, and the remaining
//! steps still dispatch; only compilation failures abort a command
//! before any motion. Strict sequential semantics: no reordering, no
//! deduplication, one step fully completes before the next starts.

use std::thread;
use std::time::Duration;

use uuid::Uuid;

use crate::bench::{BenchError, Feature, Workbench};
use crate::command::compiler::Plan;
use crate::command::registry::ToolCall;
use crate::core::config::LabConfig;
use crate::core::error::Result;
use crate::trace::observation::Observation;
use crate::trace::sink::ObservationSink;

/// What a completed step contributes to its observation
struct StepOutcome {
    feature: Option<&'static str>,
    sample: Option<u8>,
    value: Option<f64>,
    extra_meta: &'static [(&'static str, &'static str)],
}

/// Runs compiled plans on the workbench, one step at a time.
///
/// The engine owns the only handle to the bench connection for the
/// process lifetime; the connection is established lazily before the
/// first dispatched step.
pub struct ExecutionEngine {
    bench: Workbench,
    sink: Box<dyn ObservationSink>,
    settle: Duration,
}

impl ExecutionEngine {
    pub fn new(bench: Workbench, sink: Box<dyn ObservationSink>, config: &LabConfig) -> Self {
        Self {
            bench,
            sink,
            settle: Duration::from_millis(config.settle_ms),
        }
    }

    /// Bring the bench to a known idle state before the first command
    pub fn startup(&mut self) -> Result<()> {
        self.bench.ensure_connected()?;
        self.bench.park()?;
        tracing::info!("bench parked and ready");
        Ok(())
    }

    /// Run every step of the plan in order.
    ///
    /// Returns the last step's measured value, if it produced one. Step
    /// failures are recorded in the trace and do not stop the plan; a
    /// failed initial connection is the only fatal path here.
    pub fn run(&mut self, plan: &Plan) -> Result<Option<f64>> {
        self.bench.ensure_connected()?;

        let command_id = Uuid::new_v4();
        let mut last_value = None;
        for (k, call) in plan.steps().iter().enumerate() {
            last_value = self.run_step(command_id, k, call);
            if !self.settle.is_zero() {
                thread::sleep(self.settle);
            }
        }
        Ok(last_value)
    }

    fn run_step(&mut self, command_id: Uuid, k: usize, call: &ToolCall) -> Option<f64> {
        let mut obs = Observation::start(call.step_label(), call.name(), call.args_value());
        obs.insert_meta("command_id", command_id.to_string());

        match self.dispatch(call) {
            Ok(outcome) => {
                let value = outcome.value;
                obs.finish_ok(
                    outcome.feature,
                    outcome.sample,
                    outcome.value,
                    outcome.extra_meta,
                );
                tracing::debug!(step = k + 1, tool = call.name(), value = ?value, "step complete");
                self.record(&obs);
                value
            }
            Err(err) => {
                tracing::warn!(
                    step = k + 1,
                    tool = call.name(),
                    error = %err,
                    "step failed, continuing with remaining steps"
                );
                obs.finish_err(&err);
                self.record(&obs);
                None
            }
        }
    }

    fn record(&mut self, obs: &Observation) {
        if let Err(err) = self.sink.record(obs) {
            tracing::warn!(error = %err, "failed to record observation");
        }
    }

    fn dispatch(&mut self, call: &ToolCall) -> std::result::Result<StepOutcome, BenchError> {
        match *call {
            ToolCall::OcpMeasurement { sample } => self.measure(Feature::Ocp, sample),
            ToolCall::CvMeasurement { sample } => self.measure(Feature::Cv, sample),
            ToolCall::CaMeasurement { sample } => self.measure(Feature::Ca, sample),
            ToolCall::BringSampleToUser { sample } => {
                self.bench.pick_from_bed(sample)?;
                self.bench.place_to_user()?;
                Ok(StepOutcome {
                    feature: None,
                    sample: Some(sample),
                    value: None,
                    extra_meta: &[("target", "userarea")],
                })
            }
            ToolCall::CollectSampleFromUser { sample } => {
                self.bench.pick_from_user()?;
                self.bench.place_to_bed(sample)?;
                Ok(StepOutcome {
                    feature: None,
                    sample: Some(sample),
                    value: None,
                    extra_meta: &[("source", "userarea")],
                })
            }
            ToolCall::GoHome => {
                self.bench.go_home()?;
                Ok(StepOutcome {
                    feature: None,
                    sample: None,
                    value: None,
                    extra_meta: &[("pose", "home")],
                })
            }
        }
    }

    /// Shared measurement sequence: fetch the sample, measure at the
    /// station, return it to its slot
    fn measure(
        &mut self,
        feature: Feature,
        sample: u8,
    ) -> std::result::Result<StepOutcome, BenchError> {
        self.bench.pick_from_bed(sample)?;
        self.bench.place_to_station()?;
        let value = self.bench.measure(feature)?;
        self.bench.pick_from_station()?;
        self.bench.place_to_bed(sample)?;
        Ok(StepOutcome {
            feature: Some(feature.label()),
            sample: Some(sample),
            value: Some(value),
            extra_meta: &[("pose", "measurementstation")],
        })
    }
}
