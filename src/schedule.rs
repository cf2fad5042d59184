//! Minute-resolution scheduler built on tokio timers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, Timelike, Utc};
use tracing::info;

use crate::dispatch::Dispatcher;

/// A parsed five-field cron expression: minute, hour, day of month,
/// month, day of week. All five fields must match for a firing; there
/// is no either-or rule between the two day fields.
#[derive(Debug, Clone)]
pub struct CronSpec {
    expression: String,
    minute: CronField,
    hour: CronField,
    day_of_month: CronField,
    month: CronField,
    day_of_week: CronField,
}

impl CronSpec {
    pub fn parse(expression: &str) -> Result<Self> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        if fields.len() != 5 {
            bail!(
                "cron expression {:?} has {} fields, expected 5",
                expression,
                fields.len()
            );
        }
        Ok(Self {
            expression: expression.to_string(),
            minute: CronField::parse(fields[0], 0, 59).context("minute field")?,
            hour: CronField::parse(fields[1], 0, 23).context("hour field")?,
            day_of_month: CronField::parse(fields[2], 1, 31).context("day-of-month field")?,
            month: CronField::parse(fields[3], 1, 12).context("month field")?,
            day_of_week: CronField::parse(fields[4], 0, 7)
                .map(CronField::fold_sunday)
                .context("day-of-week field")?,
        })
    }

    /// The original expression text, used to key dispatch decisions.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn matches(&self, at: DateTime<Utc>) -> bool {
        self.minute.matches(at.minute())
            && self.hour.matches(at.hour())
            && self.day_of_month.matches(at.day())
            && self.month.matches(at.month())
            && self.day_of_week.matches(at.weekday().num_days_from_sunday())
    }
}

#[derive(Debug, Clone)]
enum CronField {
    Any,
    Values(Vec<u32>),
}

impl CronField {
    fn parse(text: &str, min: u32, max: u32) -> Result<Self> {
        if text == "*" {
            return Ok(CronField::Any);
        }

        let mut values = Vec::new();
        for part in text.split(',') {
            let (range, step) = match part.split_once('/') {
                Some((range, step)) => (
                    range,
                    step.parse::<u32>()
                        .with_context(|| format!("bad step in {part:?}"))?,
                ),
                None => (part, 1),
            };
            if step == 0 {
                bail!("step must be positive in {part:?}");
            }

            let (lo, hi) = if range == "*" {
                (min, max)
            } else if let Some((a, b)) = range.split_once('-') {
                (
                    a.parse().with_context(|| format!("bad range in {part:?}"))?,
                    b.parse().with_context(|| format!("bad range in {part:?}"))?,
                )
            } else {
                let value: u32 = range
                    .parse()
                    .with_context(|| format!("bad number in {part:?}"))?;
                (value, value)
            };

            if lo < min || hi > max || lo > hi {
                bail!("{part:?} outside {min}-{max}");
            }
            values.extend((lo..=hi).step_by(step as usize));
        }

        values.sort_unstable();
        values.dedup();
        Ok(CronField::Values(values))
    }

    /// 7 is an accepted alias for Sunday in the day-of-week field.
    fn fold_sunday(self) -> Self {
        match self {
            CronField::Values(values) => {
                CronField::Values(values.into_iter().map(|v| v % 7).collect())
            }
            any => any,
        }
    }

    fn matches(&self, value: u32) -> bool {
        match self {
            CronField::Any => true,
            CronField::Values(values) => values.contains(&value),
        }
    }
}

/// Evaluate every schedule once per UTC minute until shutdown.
/// One dispatch runs at a time; a slow dispatch delays, never overlaps,
/// the next evaluation.
pub async fn run_scheduler(dispatcher: Dispatcher, crons: Vec<CronSpec>, shutdown: Arc<AtomicBool>) {
    info!(schedules = crons.len(), "Scheduler running");

    while !shutdown.load(Ordering::SeqCst) {
        let now = Utc::now();
        for cron in &crons {
            if cron.matches(now) {
                dispatcher.handle_tick(cron.expression()).await;
            }
        }

        // Sleep to just past the next minute boundary, in 1s steps so
        // shutdown stays responsive.
        let wait_secs = 60 - (Utc::now().timestamp() % 60);
        for _ in 0..wait_secs {
            if shutdown.load(Ordering::SeqCst) {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    info!("Scheduler stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 21, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_hourly_expression_matches_top_of_hour() {
        let cron = CronSpec::parse("0 * * * *").unwrap();
        assert!(cron.matches(at(14, 0)));
        assert!(cron.matches(at(0, 0)));
        assert!(!cron.matches(at(14, 30)));
    }

    #[test]
    fn test_daily_expression_matches_once_per_day() {
        let cron = CronSpec::parse("0 21 * * *").unwrap();
        assert!(cron.matches(at(21, 0)));
        assert!(!cron.matches(at(20, 0)));
        assert!(!cron.matches(at(21, 1)));
    }

    #[test]
    fn test_step_expression() {
        let cron = CronSpec::parse("*/15 * * * *").unwrap();
        for minute in [0, 15, 30, 45] {
            assert!(cron.matches(at(9, minute)), "minute {minute}");
        }
        assert!(!cron.matches(at(9, 7)));
    }

    #[test]
    fn test_lists_and_ranges() {
        let cron = CronSpec::parse("30 6,18 * * *").unwrap();
        assert!(cron.matches(at(6, 30)));
        assert!(cron.matches(at(18, 30)));
        assert!(!cron.matches(at(12, 30)));

        let cron = CronSpec::parse("0 8-10 * * *").unwrap();
        assert!(cron.matches(at(8, 0)));
        assert!(cron.matches(at(9, 0)));
        assert!(cron.matches(at(10, 0)));
        assert!(!cron.matches(at(11, 0)));
    }

    #[test]
    fn test_day_of_week_with_sunday_alias() {
        // 2026-08-23 is a Sunday, 2026-08-24 a Monday.
        let sunday = Utc.with_ymd_and_hms(2026, 8, 23, 9, 0, 0).unwrap();
        let monday = Utc.with_ymd_and_hms(2026, 8, 24, 9, 0, 0).unwrap();

        let on_monday = CronSpec::parse("0 9 * * 1").unwrap();
        assert!(on_monday.matches(monday));
        assert!(!on_monday.matches(sunday));

        for expr in ["0 9 * * 0", "0 9 * * 7"] {
            let on_sunday = CronSpec::parse(expr).unwrap();
            assert!(on_sunday.matches(sunday), "{expr}");
            assert!(!on_sunday.matches(monday), "{expr}");
        }
    }

    #[test]
    fn test_rejects_malformed_expressions() {
        for expr in [
            "",
            "* * * *",
            "* * * * * *",
            "61 * * * *",
            "* 24 * * *",
            "x * * * *",
            "*/0 * * * *",
            "10-5 * * * *",
        ] {
            assert!(CronSpec::parse(expr).is_err(), "{expr:?} should not parse");
        }
    }

    #[test]
    fn test_expression_text_is_preserved() {
        let cron = CronSpec::parse("0 21 * * *").unwrap();
        assert_eq!(cron.expression(), "0 21 * * *");
    }
}
