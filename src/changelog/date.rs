//! Release dates in the configured calendar, always with ASCII digits.

use chrono::{Datelike, Local, NaiveDate};

/// Locales rendered in the Solar Hijri (Persian) calendar
const PERSIAN_LOCALES: [&str; 3] = ["fa", "fa-ir", "fa_ir"];

fn is_persian(locale: &str) -> bool {
    let locale = locale.trim().to_lowercase();
    PERSIAN_LOCALES.contains(&locale.as_str())
}

/// Convert a Gregorian date to (year, month, day) in the Solar Hijri calendar
pub fn gregorian_to_jalali(date: NaiveDate) -> (i64, i64, i64) {
    const MONTH_OFFSETS: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

    let gy = i64::from(date.year());
    let gm = i64::from(date.month());
    let gd = i64::from(date.day());

    let gy2 = if gm > 2 { gy + 1 } else { gy };
    let mut days = 355_666 + 365 * gy + (gy2 + 3) / 4 - (gy2 + 99) / 100 + (gy2 + 399) / 400
        + gd
        + MONTH_OFFSETS[(gm - 1) as usize];

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
    (jy, jm, jd)
}

/// Format a date: `YYYY/MM/DD` (Solar Hijri) for Persian locales, else `YYYY-MM-DD`
pub fn format_date(date: NaiveDate, locale: &str) -> String {
    if is_persian(locale) {
        let (y, m, d) = gregorian_to_jalali(date);
        format!("{:04}/{:02}/{:02}", y, m, d)
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}

/// Today's date in the local timezone
pub fn today(locale: &str) -> String {
    format_date(Local::now().date_naive(), locale)
}
