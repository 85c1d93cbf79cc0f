use chrono::{DateTime, FixedOffset, Utc};
use skydash_core::{CurrentConditions, DailyForecastEntry, Report, WeatherCategory};
use std::fmt::Write;

fn category_badge(category: WeatherCategory) -> &'static str {
    match category {
        WeatherCategory::Sunny => "[sun]",
        WeatherCategory::Rainy => "[rain]",
        WeatherCategory::Cloudy => "[cloud]",
        WeatherCategory::Snowy => "[snow]",
    }
}

/// Wall-clock time at the reported location.
fn local_time(now: DateTime<Utc>, utc_offset_seconds: i32) -> Option<String> {
    let offset = FixedOffset::east_opt(utc_offset_seconds)?;
    Some(now.with_timezone(&offset).format("%H:%M").to_string())
}

pub fn current(c: &CurrentConditions, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    let place = if c.country_code.is_empty() {
        c.location_name.clone()
    } else {
        format!("{}, {}", c.location_name, c.country_code)
    };
    let _ = write!(out, "{place}");
    if let Some(time) = local_time(now, c.utc_offset_seconds) {
        let _ = write!(out, "  (local time {time})");
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "  {} {}°C  {} ({})",
        category_badge(c.category),
        c.temperature,
        c.condition_label,
        c.description
    );
    let _ = writeln!(out, "  Feels like {}°C", c.feels_like);
    let _ = writeln!(out, "  Humidity {}%", c.humidity);
    let _ = write!(out, "  Wind {} km/h", c.wind_speed);

    out
}

pub fn forecast_day(day: &DailyForecastEntry) -> String {
    format!(
        "  {}  {:>3}°C / {:>3}°C  {:<7} {}",
        day.date.format("%a %d %b"),
        day.min_temp,
        day.max_temp,
        category_badge(day.category),
        day.description
    )
}

pub fn report(report: &Report, now: DateTime<Utc>) -> String {
    let mut out = current(&report.current, now);

    if !report.forecast.days.is_empty() {
        out.push_str("\n\nForecast\n");
        let days: Vec<_> = report.forecast.days.iter().map(forecast_day).collect();
        out.push_str(&days.join("\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use skydash_core::ForecastSet;

    fn sample_current() -> CurrentConditions {
        CurrentConditions {
            temperature: 7,
            feels_like: 4,
            humidity: 88,
            wind_speed: 18,
            condition_label: "Rain".into(),
            description: "light rain".into(),
            icon_code: "10n".into(),
            category: WeatherCategory::Rainy,
            location_name: "Bergen".into(),
            country_code: "NO".into(),
            utc_offset_seconds: 7200,
        }
    }

    fn sample_day() -> DailyForecastEntry {
        DailyForecastEntry {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            min_temp: -2,
            max_temp: 5,
            condition_label: "Snow".into(),
            description: "light snow".into(),
            icon_code: "13d".into(),
            category: WeatherCategory::Snowy,
        }
    }

    #[test]
    fn current_block_shows_local_time_and_units() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 21, 30, 0).unwrap();
        let text = current(&sample_current(), now);

        assert!(text.starts_with("Bergen, NO  (local time 23:30)"), "{text}");
        assert!(text.contains("[rain] 7°C  Rain (light rain)"));
        assert!(text.contains("Feels like 4°C"));
        assert!(text.contains("Humidity 88%"));
        assert!(text.contains("Wind 18 km/h"));
    }

    #[test]
    fn forecast_line_layout() {
        let line = forecast_day(&sample_day());
        assert_eq!(line, "  Fri 01 Mar   -2°C /   5°C  [snow]  light snow");
    }

    #[test]
    fn report_without_forecast_days_has_no_forecast_header() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let report = Report {
            current: sample_current(),
            forecast: ForecastSet {
                location_name: "Bergen".into(),
                country_code: "NO".into(),
                days: vec![],
            },
        };

        assert!(!report_text_has_forecast(&report, now));

        let with_day = Report {
            forecast: ForecastSet { days: vec![sample_day()], ..report.forecast.clone() },
            ..report
        };
        assert!(report_text_has_forecast(&with_day, now));
    }

    fn report_text_has_forecast(r: &Report, now: DateTime<Utc>) -> bool {
        super::report(r, now).contains("Forecast")
    }
}
