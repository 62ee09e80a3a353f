//! # Status Report
//!
//! Values the loop exposes for the operator's status readout each cycle.
//! The loop only supplies content; [`StatusSink`] implementations decide how
//! and how often to show it.

use tracing::info;

use super::arbiter::InputSource;
use super::command::LoopState;
use super::input::{AxisTriple, ButtonState};

/// Number of text lines in a status readout.
pub const STATUS_LINE_COUNT: usize = 6;

/// Snapshot of one cycle for the status readout.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    /// Final (smoothed) axis values.
    pub axes: AxisTriple,
    pub buttons: ButtonState,
    pub pot_raw: Vec<i32>,
    pub digital: Vec<bool>,
    pub source: InputSource,
    pub state: LoopState,
}

impl StatusReport {
    /// Renders the six status lines: x, y, z, buttons, potentiometers, digital inputs.
    ///
    /// ```
    /// use chairbot_teleop::teleop::arbiter::InputSource;
    /// use chairbot_teleop::teleop::command::LoopState;
    /// use chairbot_teleop::teleop::input::{AxisTriple, ButtonState};
    /// use chairbot_teleop::teleop::status::StatusReport;
    ///
    /// let report = StatusReport {
    ///     axes: AxisTriple::new(0.01, -0.5, 0.0),
    ///     buttons: ButtonState::from_bits(0b101),
    ///     pot_raw: vec![512, 498],
    ///     digital: vec![true, false],
    ///     source: InputSource::Joystick,
    ///     state: LoopState::Driving,
    /// };
    /// let lines = report.lines();
    /// assert_eq!(lines[0], "x0.0100");
    /// assert_eq!(lines[1], "y-0.5000");
    /// assert_eq!(lines[3], "s 13");
    /// assert_eq!(lines[4], "p 512 498");
    /// assert_eq!(lines[5], "d 10");
    /// ```
    #[must_use]
    pub fn lines(&self) -> [String; STATUS_LINE_COUNT] {
        let pots = self
            .pot_raw
            .iter()
            .map(|raw| raw.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let digital: String = self
            .digital
            .iter()
            .map(|&high| if high { '1' } else { '0' })
            .collect();

        [
            format!("x{:.4}", self.axes.x),
            format!("y{:.4}", self.axes.y),
            format!("z{:.4}", self.axes.z),
            format!("s {}", self.buttons.bitmap()),
            format!("p {}", pots),
            format!("d {}", digital),
        ]
    }
}

/// Receives the status report each cycle.
#[cfg_attr(test, mockall::automock)]
pub trait StatusSink {
    fn report(&mut self, status: &StatusReport);
}

/// Writes the status readout to the log every `interval` cycles.
#[derive(Debug)]
pub struct LogStatusSink {
    interval: u64,
    cycles: u64,
}

impl LogStatusSink {
    #[must_use]
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            cycles: 0,
        }
    }

    /// Whether the cycle just counted should be logged.
    fn due(&mut self) -> bool {
        let due = self.cycles % self.interval == 0;
        self.cycles += 1;
        due
    }
}

impl StatusSink for LogStatusSink {
    fn report(&mut self, status: &StatusReport) {
        if !self.due() {
            return;
        }

        let [x, y, z, buttons, pots, digital] = status.lines();
        info!(
            source = %status.source,
            state = %status.state,
            "{} {} {} | {} | {} | {}",
            x, y, z, buttons, pots, digital
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> StatusReport {
        StatusReport {
            axes: AxisTriple::ZERO,
            buttons: ButtonState::new(),
            pot_raw: vec![],
            digital: vec![],
            source: InputSource::Potentiometer,
            state: LoopState::Stopped,
        }
    }

    #[test]
    fn test_lines_empty_inputs() {
        let lines = report().lines();
        assert_eq!(lines[0], "x0.0000");
        assert_eq!(lines[2], "z0.0000");
        assert_eq!(lines[3], "s ");
        assert_eq!(lines[4], "p ");
        assert_eq!(lines[5], "d ");
    }

    #[test]
    fn test_lines_all_buttons() {
        let mut r = report();
        r.buttons = ButtonState::from_bits(0x0FFF);
        assert_eq!(r.lines()[3], "s 123456789abc");
    }

    #[test]
    fn test_log_sink_interval() {
        let mut sink = LogStatusSink::new(3);
        let due: Vec<bool> = (0..7).map(|_| sink.due()).collect();
        assert_eq!(due, vec![true, false, false, true, false, false, true]);
    }

    #[test]
    fn test_log_sink_zero_interval_logs_every_cycle() {
        let mut sink = LogStatusSink::new(0);
        assert!(sink.due());
        assert!(sink.due());
        sink.report(&report());
    }
}
