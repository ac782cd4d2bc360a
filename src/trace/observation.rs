//! Lifecycle record of one executed step

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;

/// Terminal status of a dispatched step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// Call-side detail of the record: what ran, with what, how it ended
#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub tool: String,
    pub args: Value,
    pub status: Status,
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// One executed step, from dispatch to terminal completion.
///
/// Opened by [`Observation::start`] when the step is dispatched,
/// completed exactly once by `finish_ok` or `finish_err`, then treated
/// as immutable and handed to the sink. The execution engine is the
/// sole owner until that hand-off.
#[derive(Debug, Clone, Serialize)]
pub struct Observation {
    /// Wall-clock stamp of dispatch, for human scanning of the log
    pub ts: String,
    /// Phase label ("measurement", "interaction", "home")
    pub step: String,
    /// Measured feature label, for measurement steps
    pub feature: Option<String>,
    /// Sample slot the step operated on
    pub sample: Option<u8>,
    /// Numeric reading, for measurement steps
    pub value: Option<f64>,
    /// Derived side metrics (open mapping, currently unused by tools)
    pub metrics: BTreeMap<String, f64>,
    pub t_start: f64,
    pub t_end: Option<f64>,
    pub duration_s: Option<f64>,
    pub meta: Meta,
}

fn now_epoch() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

impl Observation {
    /// Open an observation at dispatch time
    pub fn start(step: &str, tool: &str, args: Value) -> Self {
        Self {
            ts: chrono::Local::now().format("%Y.%m.%d.%H.%M.%S").to_string(),
            step: step.to_string(),
            feature: None,
            sample: None,
            value: None,
            metrics: BTreeMap::new(),
            t_start: now_epoch(),
            t_end: None,
            duration_s: None,
            meta: Meta {
                tool: tool.to_string(),
                args,
                status: Status::Ok,
                error: None,
                extra: BTreeMap::new(),
            },
        }
    }

    pub fn insert_meta(&mut self, key: &str, value: impl Into<String>) {
        self.meta.extra.insert(key.to_string(), value.into());
    }

    /// Complete successfully with the step's outcome
    pub fn finish_ok(
        &mut self,
        feature: Option<&str>,
        sample: Option<u8>,
        value: Option<f64>,
        extra_meta: &[(&str, &str)],
    ) {
        self.close(Status::Ok, None);
        self.feature = feature.map(str::to_string);
        self.sample = sample;
        self.value = value;
        for (k, v) in extra_meta {
            self.meta.extra.insert((*k).to_string(), (*v).to_string());
        }
    }

    /// Complete with a captured failure
    pub fn finish_err<E: std::fmt::Display>(&mut self, err: &E) {
        self.close(Status::Error, Some(err.to_string()));
    }

    fn close(&mut self, status: Status, error: Option<String>) {
        let t_end = now_epoch();
        self.t_end = Some(t_end);
        self.duration_s = Some(t_end - self.t_start);
        self.meta.status = status;
        self.meta.error = error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_finish_ok_closes_timing() {
        let mut obs = Observation::start("measurement", "ocp_measurement", json!({"i": 1}));
        obs.finish_ok(Some("OCP"), Some(1), Some(0.42), &[("pose", "measurementstation")]);

        assert_eq!(obs.meta.status, Status::Ok);
        assert!(obs.meta.error.is_none());
        let t_end = obs.t_end.unwrap();
        assert!(t_end >= obs.t_start);
        assert!(obs.duration_s.unwrap() >= 0.0);
        assert_eq!(obs.feature.as_deref(), Some("OCP"));
        assert_eq!(obs.meta.extra.get("pose").unwrap(), "measurementstation");
    }

    #[test]
    fn test_finish_err_records_description() {
        let mut obs = Observation::start("home", "go_home", json!({}));
        obs.finish_err(&"gripper jammed");

        assert_eq!(obs.meta.status, Status::Error);
        assert_eq!(obs.meta.error.as_deref(), Some("gripper jammed"));
        assert!(obs.t_end.is_some());
        assert!(obs.value.is_none());
    }

    #[test]
    fn test_serializes_with_expected_fields() {
        let mut obs = Observation::start("measurement", "cv_measurement", json!({"i": 3}));
        obs.insert_meta("command_id", "abc");
        obs.finish_ok(Some("CV"), Some(3), Some(0.9), &[]);

        let line = serde_json::to_value(&obs).unwrap();
        assert_eq!(line["step"], "measurement");
        assert_eq!(line["sample"], 3);
        assert_eq!(line["meta"]["tool"], "cv_measurement");
        assert_eq!(line["meta"]["args"]["i"], 3);
        assert_eq!(line["meta"]["status"], "ok");
        assert_eq!(line["meta"]["command_id"], "abc");
    }
}
