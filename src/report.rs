//! Run summary
//!
//! What the results panel shows at a given simulation time: each reception
//! once it has happened, and the interval heard on train B once both have.
//! Also the question the animation answers, phrased for the current scenario.

use std::fmt;

use serde::Serialize;

use crate::consts::SOUND_SPEED;
use crate::sim::{Configuration, PulseId, Solution};

/// Placeholder shown for a reception time that has not happened yet
pub const TIME_PLACEHOLDER: &str = "--.----";
/// Placeholder shown for a reception position that has not happened yet
pub const POSITION_PLACEHOLDER: &str = "---.--";

/// One reception line, in arrival order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub pulse: PulseId,
    pub recorded: bool,
    pub time: f64,
    pub position: f64,
}

impl SummaryRow {
    pub fn time_text(&self) -> String {
        if self.recorded {
            format!("{:.4}", self.time)
        } else {
            TIME_PLACEHOLDER.to_string()
        }
    }

    pub fn position_text(&self) -> String {
        if self.recorded {
            format!("{:.2}", self.position)
        } else {
            POSITION_PLACEHOLDER.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub rows: [SummaryRow; 2],
    /// Interval between receptions, once both are recorded
    pub received_interval: Option<f64>,
    /// Interval between emissions (the configured whistle gap)
    pub emitted_interval: f64,
}

impl Summary {
    pub fn at(config: &Configuration, solution: &Solution, t: f64) -> Self {
        let row = |i: usize| {
            let imp = &solution.impacts[i];
            SummaryRow {
                pulse: imp.pulse,
                recorded: t >= imp.time,
                time: imp.time,
                position: imp.position,
            }
        };
        let rows = [row(0), row(1)];
        let both = rows.iter().all(|r| r.recorded);

        Self {
            rows,
            received_interval: both.then(|| solution.received_interval()),
            emitted_interval: config.pulse_interval,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.received_interval.is_some()
    }

    /// Received / emitted interval; below 1.0 means the whistles bunched up
    pub fn compression(&self) -> Option<f64> {
        self.received_interval
            .filter(|_| self.emitted_interval > 0.0)
            .map(|received| received / self.emitted_interval)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation results")?;
        for row in &self.rows {
            let mark = if row.recorded { " [recorded]" } else { "" };
            writeln!(
                f,
                "  {} received: {} s at {} m{}",
                row.pulse.label(),
                row.time_text(),
                row.position_text(),
                mark
            )?;
        }
        writeln!(f, "  Emitted interval: {:.1} s", self.emitted_interval)?;
        match self.received_interval {
            Some(interval) => {
                writeln!(f, "  Received interval (train B): {:.4} s", interval)?;
                let change = if interval < self.emitted_interval {
                    "shortens"
                } else {
                    "does not change"
                };
                write!(
                    f,
                    "  Doppler effect: relative motion {} the interval heard on train B.",
                    change
                )
            }
            None => write!(f, "  Received interval (train B): pending"),
        }
    }
}

/// The question being animated, with the scenario's numbers filled in
pub fn problem(config: &Configuration) -> String {
    format!(
        "One track, two trains. Train A runs right at {} m/s and train B runs left \
         at {} m/s, toward each other, {} m apart. Train A whistles once; the sound \
         travels toward train B at a constant {} m/s. {} s later it whistles again. \
         What interval between the two whistles does train B hear?",
        config.speed_a, config.speed_b, config.initial_distance, SOUND_SPEED, config.pulse_interval
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::solve;

    #[test]
    fn test_nothing_recorded_at_start() {
        let config = Configuration::default();
        let summary = Summary::at(&config, &solve(&config), 0.0);

        assert!(summary.rows.iter().all(|r| !r.recorded));
        assert_eq!(summary.rows[0].time_text(), "--.----");
        assert_eq!(summary.rows[0].position_text(), "---.--");
        assert_eq!(summary.received_interval, None);
        assert!(!summary.is_complete());
    }

    #[test]
    fn test_first_recorded_only() {
        let config = Configuration::default();
        let summary = Summary::at(&config, &solve(&config), 2.0);

        assert!(summary.rows[0].recorded);
        assert!(!summary.rows[1].recorded);
        assert_eq!(summary.rows[0].time_text(), "2.0000");
        assert_eq!(summary.rows[0].position_text(), "680.00");
        assert_eq!(summary.received_interval, None);
    }

    #[test]
    fn test_complete_summary() {
        let config = Configuration::default();
        let summary = Summary::at(&config, &solve(&config), 8.5);

        assert!(summary.is_complete());
        let interval = summary.received_interval.unwrap();
        assert!((interval - 0.75).abs() < 1e-12);
        assert!((summary.compression().unwrap() - 0.75).abs() < 1e-12);

        let text = summary.to_string();
        assert!(text.contains("Pulse 1 received: 2.0000 s at 680.00 m [recorded]"));
        assert!(text.contains("Pulse 2 received: 2.7500 s at 635.00 m [recorded]"));
        assert!(text.contains("Received interval (train B): 0.7500 s"));
        assert!(text.contains("relative motion shortens the interval"));
    }

    #[test]
    fn test_pending_summary_has_no_explanation() {
        let config = Configuration::default();
        let text = Summary::at(&config, &solve(&config), 2.5).to_string();
        assert!(text.contains("pending"));
        assert!(!text.contains("Doppler effect"));
    }

    #[test]
    fn test_stationary_trains_hear_the_same_interval() {
        let config = Configuration::new(0.0, 0.0, 340.0, 1.0);
        let text = Summary::at(&config, &solve(&config), 10.0).to_string();
        assert!(text.contains("Received interval (train B): 1.0000 s"));
        assert!(text.contains("relative motion does not change the interval"));
    }

    #[test]
    fn test_problem_for_default_scenario() {
        let text = problem(&Configuration::default());
        assert_eq!(
            text,
            "One track, two trains. Train A runs right at 40 m/s and train B runs left \
             at 60 m/s, toward each other, 800 m apart. Train A whistles once; the sound \
             travels toward train B at a constant 340 m/s. 1 s later it whistles again. \
             What interval between the two whistles does train B hear?"
        );
    }

    #[test]
    fn test_problem_tracks_configuration() {
        let text = problem(&Configuration::new(75.0, 20.0, 450.0, 2.5));
        assert!(text.contains("Train A runs right at 75 m/s"));
        assert!(text.contains("left at 20 m/s"));
        assert!(text.contains("450 m apart"));
        assert!(text.contains("2.5 s later"));
    }

    #[test]
    fn test_rows_follow_arrival_order() {
        let config = Configuration::new(500.0, 10.0, 800.0, 1.0);
        let summary = Summary::at(&config, &solve(&config), 0.0);
        assert_eq!(summary.rows[0].pulse, PulseId::Second);
        assert_eq!(summary.rows[1].pulse, PulseId::First);
    }
}
