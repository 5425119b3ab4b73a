//! Localized date rendering

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Format used when a localized column sets no date format
pub const DEFAULT_LOCALIZED_FORMAT: &str = "$yyyy/$MM/$dd";

/// Renders dates in a local calendar
pub trait DateLocalizer {
    /// Render `value` using `format`
    fn localize(&self, value: NaiveDateTime, format: &str) -> String;
}

/// Solar Hijri (Jalali) calendar rendering.
///
/// Format tokens: `$yyyy`, `$MM`, `$dd`, `$HH`, `$mm`, `$ss`. Everything else
/// is copied through.
#[derive(Debug, Clone, Copy, Default)]
pub struct JalaliLocalizer;

impl DateLocalizer for JalaliLocalizer {
    fn localize(&self, value: NaiveDateTime, format: &str) -> String {
        let (year, month, day) = to_jalali(value.year(), value.month(), value.day());

        format
            .replace("$yyyy", &format!("{:04}", year))
            .replace("$MM", &format!("{:02}", month))
            .replace("$dd", &format!("{:02}", day))
            .replace("$HH", &format!("{:02}", value.hour()))
            .replace("$mm", &format!("{:02}", value.minute()))
            .replace("$ss", &format!("{:02}", value.second()))
    }
}

/// Convert a Gregorian date to (year, month, day) in the Jalali calendar
pub fn to_jalali(year: i32, month: u32, day: u32) -> (i32, u32, u32) {
    const MONTH_OFFSETS: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

    let gy = i64::from(year);
    let gy2 = if month > 2 { gy + 1 } else { gy };
    let mut days = 355_666 + 365 * gy + (gy2 + 3) / 4 - (gy2 + 99) / 100 + (gy2 + 399) / 400
        + i64::from(day)
        + MONTH_OFFSETS[(month as usize).saturating_sub(1).min(11)];

    let mut jy = -1595 + 33 * (days / 12_053);
    days %= 12_053;
    jy += 4 * (days / 1461);
    days %= 1461;
    if days > 365 {
        jy += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    let (jm, jd) = if days < 186 {
        (1 + days / 31, 1 + days % 31)
    } else {
        (7 + (days - 186) / 30, 1 + (days - 186) % 30)
    };

    (jy as i32, jm as u32, jd as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_new_year() {
        assert_eq!(to_jalali(2024, 3, 20), (1403, 1, 1));
        assert_eq!(to_jalali(2024, 3, 19), (1402, 12, 29));
    }

    #[test]
    fn test_second_half_of_year() {
        // 1 Mehr 1402
        assert_eq!(to_jalali(2023, 9, 23), (1402, 7, 1));
    }

    #[test]
    fn test_localize_with_time_tokens() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 20)
            .unwrap()
            .and_hms_opt(8, 5, 0)
            .unwrap();

        assert_eq!(JalaliLocalizer.localize(dt, DEFAULT_LOCALIZED_FORMAT), "1403/01/01");
        assert_eq!(JalaliLocalizer.localize(dt, "$yyyy-$MM-$dd $HH:$mm"), "1403-01-01 08:05");
    }
}
