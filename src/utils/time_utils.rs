//! Time utilities for astronomical calculations
//!
//! [`Moment`] keeps a Julian Date (UT) as its only source of truth. Calendar
//! fields are derived on first access and cached; every mutation of the
//! Julian value drops the cache so a stale date can never be read back.

use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Timelike, Utc};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::{EphemError, Result};
use crate::utils::config::{DAYS_PER_CENTURY, GREGORIAN_CUTOVER, GREGORIAN_JD, JD_J2000};
use crate::utils::packed;

/// Month abbreviations used by Minor Planet Center date columns
pub const MPC_MONTHS: [&str; 12] = [
    "Jan.", "Feb.", "Mar.", "Apr.", "May", "June", "July", "Aug.", "Sep.", "Oct.", "Nov.", "Dec.",
];

/// JD of the Unix epoch
const JD_UNIX_EPOCH: f64 = 2440587.5;

/// Calendar breakdown of a [`Moment`], UT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gregorian {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

/// A single instant, stored as a Julian Date
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Moment {
    julian: f64,
    gregorian: OnceCell<Gregorian>,
}

impl Moment {
    /// Create a moment from a Julian Date
    pub fn from_julian(julian: f64) -> Self {
        Moment {
            julian,
            gregorian: OnceCell::new(),
        }
    }

    /// The J2000.0 epoch, 2000 Jan 1 12:00 UT
    pub fn j2000() -> Self {
        Self::from_julian(JD_J2000)
    }

    /// Current UT from the system clock
    pub fn now() -> Self {
        Self::from_datetime(&Utc::now())
    }

    /// 0h UT on the given calendar date
    ///
    /// Dates before 1582 Oct 15 are read as Julian-calendar dates. Month must
    /// be 1..=12 and day 1..=31.
    pub fn from_calendar(day: u32, month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(EphemError::MalformedDate(format!(
                "{year:04}-{month:02}-{day:02}"
            )));
        }
        Ok(Self::from_julian(calendar_to_julian(day, month, year)))
    }

    /// Calendar date, falling back to J2000 when month or day is out of range
    pub fn from_calendar_or_default(day: u32, month: u32, year: i32) -> Self {
        Self::from_calendar(day, month, year).unwrap_or_else(|e| {
            log::warn!("{e}; using J2000");
            Self::j2000()
        })
    }

    /// Calendar date plus time of day
    pub fn from_calendar_time(
        day: u32,
        month: u32,
        year: i32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self> {
        let mut moment = Self::from_calendar(day, month, year)?;
        moment.set_time(hour, minute, second);
        Ok(moment)
    }

    /// Convert from a chrono UTC timestamp
    pub fn from_datetime(dt: &DateTime<Utc>) -> Self {
        let date = Self::from_calendar(dt.day(), dt.month(), dt.year())
            .map(|m| m.julian)
            .unwrap_or(JD_J2000);
        let seconds = dt.num_seconds_from_midnight() as f64
            + f64::from(dt.timestamp_subsec_micros()) / 1e6;
        Self::from_julian(date + seconds / 86400.0)
    }

    /// Decode a five-character MPC packed date (e.g. `K14AU` is 2014 Oct 30)
    pub fn from_packed_date(code: &str) -> Result<Self> {
        let (year, month, day) = packed::decode_date(code)?;
        Self::from_calendar(day, month, year)
    }

    /// Decode a packed date, falling back to J2000 when it is malformed
    pub fn from_packed_date_or_default(code: &str) -> Self {
        Self::from_packed_date(code).unwrap_or_else(|e| {
            log::warn!("{e}; using J2000");
            Self::j2000()
        })
    }

    /// Parse an MPC list date such as `2014 Jan. 30` or `2014 June  3`
    pub fn from_mpc_text(text: &str) -> Result<Self> {
        let malformed = || EphemError::MalformedDate(text.to_string());
        let mut fields = text.split_whitespace();
        let year: i32 = fields
            .next()
            .and_then(|y| y.parse().ok())
            .ok_or_else(malformed)?;
        let month_name = fields.next().ok_or_else(malformed)?;
        let month = MPC_MONTHS
            .iter()
            .position(|m| *m == month_name || m.trim_end_matches('.') == month_name)
            .ok_or_else(malformed)? as u32
            + 1;
        // Day may carry a fraction ("30.25"); only the integer day is kept.
        let day: u32 = fields
            .next()
            .and_then(|d| d.split('.').next())
            .and_then(|d| d.parse().ok())
            .ok_or_else(malformed)?;
        Self::from_calendar(day, month, year)
    }

    /// Lenient [`Moment::from_mpc_text`]: an unreadable year or day becomes 1
    /// and an unknown month becomes January, each logged
    pub fn from_mpc_text_or_default(text: &str) -> Self {
        let mut fields = text.split_whitespace();
        let year = field_or(fields.next(), 1, "year", text);
        let month = fields
            .next()
            .and_then(|name| {
                MPC_MONTHS
                    .iter()
                    .position(|m| *m == name || m.trim_end_matches('.') == name)
            })
            .map_or_else(
                || {
                    log::warn!("No month in MPC date '{text}', using January");
                    1
                },
                |i| i as u32 + 1,
            );
        let day = field_or(fields.next().and_then(|d| d.split('.').next()), 1, "day", text);
        Self::from_calendar_or_default(day, month, year)
    }

    /// Parse an ESA risk-list date `yyyy-mm-dd`
    pub fn from_esa_date(text: &str) -> Result<Self> {
        let malformed = || EphemError::MalformedDate(text.to_string());
        let mut parts = text.trim().splitn(3, '-');
        let mut next = || -> Result<&str> { parts.next().ok_or_else(malformed) };
        let year: i32 = next()?.parse().map_err(|_| malformed())?;
        let month: u32 = next()?.parse().map_err(|_| malformed())?;
        let day: u32 = next()?
            .chars()
            .take_while(char::is_ascii_digit)
            .collect::<String>()
            .parse()
            .map_err(|_| malformed())?;
        Self::from_calendar(day, month, year)
    }

    /// Lenient [`Moment::from_esa_date`]: year defaults to 1900, month and
    /// day to 1, each logged
    pub fn from_esa_date_or_default(text: &str) -> Self {
        let mut parts = text.trim().splitn(3, '-');
        let year = field_or(parts.next(), 1900, "year", text);
        let month = field_or(parts.next(), 1, "month", text);
        let day_digits: Option<String> = parts
            .next()
            .map(|d| d.chars().take_while(char::is_ascii_digit).collect());
        let day = field_or(day_digits.as_deref(), 1, "day", text);
        Self::from_calendar_or_default(day, month, year)
    }

    /// Julian Date
    #[inline]
    pub fn julian(&self) -> f64 {
        self.julian
    }

    /// Replace the Julian Date
    pub fn set_julian(&mut self, julian: f64) {
        self.julian = julian;
        self.gregorian = OnceCell::new();
    }

    /// Move by a (possibly fractional or negative) number of days
    pub fn add_days(&mut self, days: f64) {
        self.set_julian(self.julian + days);
    }

    /// A new moment `days` later
    pub fn plus_days(&self, days: f64) -> Self {
        Self::from_julian(self.julian + days)
    }

    /// Days elapsed from `earlier` to `self`
    pub fn days_since(&self, earlier: &Moment) -> f64 {
        self.julian - earlier.julian
    }

    /// 0h UT of this moment's date
    pub fn start_of_day(&self) -> Self {
        Self::from_julian(start_of_day(self.julian))
    }

    /// Keep the date, set the UT time of day
    pub fn set_time(&mut self, hour: u32, minute: u32, second: u32) {
        let fraction = f64::from(hour) / 24.0 + f64::from(minute) / 1440.0 + f64::from(second) / 86400.0;
        self.set_day_fraction(fraction);
    }

    /// Keep the date, set the time of day as a fraction of a day
    pub fn set_day_fraction(&mut self, fraction: f64) {
        self.set_julian(start_of_day(self.julian) + fraction);
    }

    /// Calendar breakdown, computed once per Julian value
    pub fn gregorian(&self) -> Gregorian {
        *self.gregorian.get_or_init(|| julian_to_gregorian(self.julian))
    }

    pub fn year(&self) -> i32 {
        self.gregorian().year
    }

    pub fn month(&self) -> u32 {
        self.gregorian().month
    }

    pub fn day(&self) -> u32 {
        self.gregorian().day
    }

    pub fn hour(&self) -> u32 {
        self.gregorian().hour
    }

    pub fn minute(&self) -> u32 {
        self.gregorian().minute
    }

    pub fn second(&self) -> u32 {
        self.gregorian().second
    }

    /// `YYYY-MM-DD`
    pub fn iso_date(&self) -> String {
        let g = self.gregorian();
        format!("{:04}-{:02}-{:02}", g.year, g.month, g.day)
    }

    /// `HH:MM`
    pub fn hhmm(&self) -> String {
        let g = self.gregorian();
        format!("{:02}:{:02}", g.hour, g.minute)
    }

    /// MPC list style `YYYY Mon. D`
    pub fn mpc_date(&self) -> String {
        let g = self.gregorian();
        format!("{:04} {} {}", g.year, MPC_MONTHS[g.month as usize - 1], g.day)
    }

    /// MPC style with the day right-aligned in two columns
    pub fn mpc_date_padded(&self) -> String {
        let g = self.gregorian();
        format!("{:04} {} {:>2}", g.year, MPC_MONTHS[g.month as usize - 1], g.day)
    }

    /// Julian Date to four decimals
    pub fn julian_text(&self) -> String {
        format!("{:.4}", self.julian)
    }

    /// Five-character MPC packed form of the date
    pub fn packed_date(&self) -> Result<String> {
        let g = self.gregorian();
        packed::encode_date(g.year, g.month, g.day)
    }

    /// Convert to a chrono UTC timestamp (millisecond resolution)
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let millis = ((self.julian - JD_UNIX_EPOCH) * 86_400_000.0).round();
        DateTime::from_timestamp_millis(millis as i64)
    }
}

impl Default for Moment {
    fn default() -> Self {
        Self::j2000()
    }
}

impl From<f64> for Moment {
    fn from(julian: f64) -> Self {
        Self::from_julian(julian)
    }
}

impl From<Moment> for f64 {
    fn from(moment: Moment) -> Self {
        moment.julian
    }
}

impl PartialEq for Moment {
    fn eq(&self, other: &Self) -> bool {
        self.julian == other.julian
    }
}

impl PartialOrd for Moment {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.julian.partial_cmp(&other.julian)
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.iso_date(), self.hhmm())
    }
}

/// Parse one date field, logging and substituting `default` when it is
/// missing or not a number
fn field_or<T: FromStr + fmt::Display>(field: Option<&str>, default: T, name: &str, text: &str) -> T {
    match field.map(str::parse::<T>) {
        Some(Ok(value)) => value,
        _ => {
            log::warn!("Bad {name} in date '{text}', using {default}");
            default
        }
    }
}

/// JD of 0h UT on the date containing `julian`
#[inline]
pub fn start_of_day(julian: f64) -> f64 {
    0.5 + (julian - 0.5).floor()
}

/// Standard Julian-day algorithm with the 1582 Gregorian cutover
pub fn calendar_to_julian(day: u32, month: u32, year: i32) -> f64 {
    let (d, m) = (i64::from(day), i64::from(month));
    let mut jy = i64::from(year);
    if jy < 0 {
        // no year zero
        jy += 1;
    }
    let jm = if m > 2 {
        m + 1
    } else {
        jy -= 1;
        m + 13
    };

    let mut julian =
        (365.25 * jy as f64).floor() + (30.6001 * jm as f64).floor() + d as f64 + 1720995.0;
    if d + 31 * (m + 12 * i64::from(year)) >= GREGORIAN_CUTOVER {
        let ja = (0.01 * jy as f64) as i64;
        julian += (2 - ja + (0.25 * ja as f64) as i64) as f64;
    }
    julian - 0.5
}

/// Calendar date and time of a Julian Date (Montenbruck), rounded to the second
pub fn julian_to_gregorian(julian: f64) -> Gregorian {
    let shifted = julian + 0.5;
    let mut day_number = shifted.floor() as i64;
    let mut seconds = ((shifted - shifted.floor()) * 86400.0).round() as i64;
    if seconds >= 86400 {
        day_number += 1;
        seconds -= 86400;
    }

    let (jc, _jb) = if day_number < GREGORIAN_JD {
        (day_number + 1524, 0)
    } else {
        let jb = ((day_number as f64 - 1867216.25) / 36524.25) as i64;
        (day_number + jb - jb / 4 + 1525, jb)
    };
    let jd = ((jc as f64 - 122.1) / 365.25) as i64;
    let je = 365 * jd + jd / 4;
    let f = ((jc - je) as f64 / 30.6001) as i64;
    let day = jc - je - (30.6001 * f as f64) as i64;
    let month = f - 1 - 12 * (f / 14);
    let year = jd - 4715 - (7 + month) / 10;

    Gregorian {
        year: year as i32,
        month: month as u32,
        day: day as u32,
        hour: (seconds / 3600) as u32,
        minute: ((seconds % 3600) / 60) as u32,
        second: (seconds % 60) as u32,
    }
}

/// Local mean sidereal time in radians, [0, 2π)
///
/// # Arguments
/// * `moment` - UT instant
/// * `longitude` - East longitude of the site in radians
pub fn local_mean_sidereal_time(moment: &Moment, longitude: f64) -> f64 {
    let jd = moment.julian();
    let j0 = start_of_day(jd);
    let t = (j0 - JD_J2000) / DAYS_PER_CENTURY;
    let gmst0 = 1.753_368_56 + 628.331_970_5 * t + 6.770_71e-6 * t * t;
    let ut_fraction = (jd + 0.5).rem_euclid(1.0);
    let gmst = gmst0 + 6.300_388_097 * ut_fraction;
    (gmst + longitude).rem_euclid(TAU)
}

/// Local sidereal time minus UT, in hours [0, 24)
///
/// An object with right ascension `ra_h` crosses the meridian at
/// `(24 + ra_h - offset) mod 24` hours UT, up to the small sidereal drift
/// over the day.
pub fn sidereal_offset_hours(moment: &Moment, longitude: f64) -> f64 {
    let lmst = local_mean_sidereal_time(moment, longitude);
    let ut_angle = TAU * (moment.julian() + 0.5).rem_euclid(1.0);
    ((lmst - ut_angle) * 24.0 / TAU).rem_euclid(24.0)
}
