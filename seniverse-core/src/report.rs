//! Turns a provider payload into the text shown to the user.

use std::fmt::Write as _;

use chrono::{NaiveDate, Utc};
use chrono_tz::Asia::Shanghai;

use crate::{
    error::ForecastError,
    model::{DailyForecast, ProviderResponse},
};

/// Wind direction text the provider uses when there is no prevailing wind.
pub const NO_PREVAILING_WIND: &str = "无持续风向";

/// Today's calendar date as seen in China.
pub fn today_in_shanghai() -> NaiveDate {
    Utc::now().with_timezone(&Shanghai).date_naive()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastReport {
    pub days: Vec<DailyForecast>,
    /// Fewer days came back than were asked for (free plan window).
    pub truncated: bool,
    pub today: NaiveDate,
}

/// Extract the first location's days from `response`.
pub fn normalize(
    response: &ProviderResponse,
    requested_days: u32,
    today: NaiveDate,
) -> Result<ForecastReport, ForecastError> {
    let days = match response.first_daily() {
        Some(days) if !days.is_empty() => days.to_vec(),
        _ => return Err(ForecastError::EmptyPayload),
    };

    let truncated = days.len() < requested_days as usize;
    if truncated {
        tracing::warn!(
            requested = requested_days,
            returned = days.len(),
            "provider returned fewer days than requested"
        );
    }

    Ok(ForecastReport { days, truncated, today })
}

impl ForecastReport {
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.truncated {
            let shown = self.days.len();
            let _ = writeln!(out, "免费用户只能获取最近{shown}天的信息：");
        }

        let today = self.today.format("%Y-%m-%d").to_string();
        for day in &self.days {
            render_day(&mut out, day, &today);
        }
        out
    }
}

fn render_day(out: &mut String, day: &DailyForecast, today: &str) {
    let _ = write!(out, "{}", day.date);
    if day.date == today {
        out.push_str("（今天）");
    }
    out.push('\n');

    if day.text_day == day.text_night {
        let _ = writeln!(out, "    天气：{}", day.text_day);
    } else {
        let _ = writeln!(out, "    天气：{} 转 {}", day.text_day, day.text_night);
    }
    let _ = writeln!(out, "    温度：{} - {} ℃", day.low, day.high);
    let _ = writeln!(out, "    湿度：{} %", day.humidity);

    let unit = if day.wind_direction.starts_with(NO_PREVAILING_WIND) { "" } else { "风" };
    let _ = writeln!(out, "    {}{}{}级", day.wind_direction, unit, day.wind_scale);
    out.push('\n');
}
