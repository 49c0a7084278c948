//! Stem-branch pillars (四柱) for a wall-clock timestamp.
//!
//! The engine only needs four stem-branch strings. [`PillarCalendar`] is the
//! seam for swapping in another calendar service; [`SexagenaryCalendar`] is
//! the built-in implementation, using solar terms for the year and month
//! boundaries and civil midnight for the day.

use chrono::{Datelike, NaiveDateTime, Timelike};
use std::f64::consts::PI;
use thiserror::Error;

use gua_types::Pillars;

pub const STEMS: [char; 10] = ['甲', '乙', '丙', '丁', '戊', '己', '庚', '辛', '壬', '癸'];
pub const BRANCHES: [char; 12] = [
    '子', '丑', '寅', '卯', '辰', '巳', '午', '未', '申', '酉', '戌', '亥',
];

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

/// Hours east of UTC that wall-clock input is read in (China Standard Time).
const ZONE_OFFSET_HOURS: f64 = 8.0;
/// Julian day number of 0001-01-01 minus one, for `num_days_from_ce`.
const JDN_CE_OFFSET: i64 = 1_721_425;
/// Solar longitude of 立春, where the 寅 month and the stem-branch year begin.
const SPRING_ONSET_DEG: f64 = 315.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("year {year} is outside the supported range {MIN_YEAR}..={MAX_YEAR}")]
    YearOutOfRange { year: i32 },
}

/// Converts a timestamp into its four pillars.
pub trait PillarCalendar {
    fn pillars(&self, at: NaiveDateTime) -> Result<Pillars, CalendarError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SexagenaryCalendar;

impl PillarCalendar for SexagenaryCalendar {
    fn pillars(&self, at: NaiveDateTime) -> Result<Pillars, CalendarError> {
        let year = at.year();
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CalendarError::YearOutOfRange { year });
        }

        let jdn = julian_day_number(at);

        // 0 = 寅 month, 11 = 丑 month.
        let month_index = solar_month_index(solar_longitude(julian_day_ut(at)));
        let pillar_year = if at.month() <= 2 && month_index >= 10 {
            year - 1
        } else {
            year
        };

        let year_cycle = i64::from(pillar_year - 4).rem_euclid(60) as usize;
        let year_stem = year_cycle % 10;
        let month_stem = (year_stem * 2 + 2 + month_index) % 10;
        let month_branch = (month_index + 2) % 12;

        let day_cycle = (jdn + 49).rem_euclid(60) as usize;
        let day_stem = day_cycle % 10;

        let hour = at.hour() as usize;
        let hour_branch = ((hour + 1) / 2) % 12;
        // The late 子 hour takes its stem from the following day.
        let hour_day_stem = if hour == 23 { (day_stem + 1) % 10 } else { day_stem };
        let hour_stem = (hour_day_stem * 2 + hour_branch) % 10;

        Ok(Pillars {
            year: stem_branch(year_stem, year_cycle % 12),
            month: stem_branch(month_stem, month_branch),
            day: stem_branch(day_stem, day_cycle % 12),
            time: stem_branch(hour_stem, hour_branch),
        })
    }
}

fn julian_day_number(at: NaiveDateTime) -> i64 {
    i64::from(at.date().num_days_from_ce()) + JDN_CE_OFFSET
}

/// Julian date (UT) of a wall-clock timestamp read in China Standard Time.
pub(crate) fn julian_day_ut(at: NaiveDateTime) -> f64 {
    let hours = f64::from(at.hour())
        + f64::from(at.minute()) / 60.0
        + f64::from(at.second()) / 3600.0;
    julian_day_number(at) as f64 - 0.5 + (hours - ZONE_OFFSET_HOURS) / 24.0
}

fn stem_branch(stem: usize, branch: usize) -> String {
    [STEMS[stem], BRANCHES[branch]].iter().collect()
}

fn solar_month_index(longitude_deg: f64) -> usize {
    let offset = (longitude_deg - SPRING_ONSET_DEG).rem_euclid(360.0);
    ((offset / 30.0).floor() as usize).min(11)
}

/// Apparent solar longitude in degrees, low-precision (about 0.01°).
fn solar_longitude(jd: f64) -> f64 {
    let t = (jd - 2_451_545.0) / 36_525.0;
    let mean_longitude = 280.466_46 + 36_000.769_83 * t + 0.000_303_2 * t * t;
    let mean_anomaly = (357.529_11 + 35_999.050_29 * t - 0.000_153_7 * t * t) * PI / 180.0;
    let center = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * mean_anomaly.sin()
        + (0.019_993 - 0.000_101 * t) * (2.0 * mean_anomaly).sin()
        + 0.000_289 * (3.0 * mean_anomaly).sin();
    let omega = (125.04 - 1_934.136 * t) * PI / 180.0;
    (mean_longitude + center - 0.005_69 - 0.004_78 * omega.sin()).rem_euclid(360.0)
}
