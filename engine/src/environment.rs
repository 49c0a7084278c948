//! Synthetic physical environment.
//!
//! Nothing here is measured. Coordinates are hashed out of the seeds, and the
//! weather, sky, and field values are closed-form functions of those
//! coordinates and the calendar, with a little jitter from a dedicated stream.
//! The output only has to be reproducible and varied enough to feed the
//! factor pipeline.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;
use std::f64::consts::{PI, TAU};

use crate::calendar::julian_day_ut;
use crate::mix::mix32;
use crate::rng::{StreamTag, Xorshift32};
use crate::scoring::clamp01;

const SYNODIC_MONTH_DAYS: f64 = 29.530_588_853;
/// New moon of 2000-01-06 18:14 UT.
const REFERENCE_NEW_MOON_JD: f64 = 2_451_550.26;
const TROPICAL_YEAR_DAYS: f64 = 365.2422;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Environment {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
    pub utc_offset_hours: i32,
    pub day_of_year: u32,
    /// Seasonal insolation cycle in `[0, 1]`, highest at the northern summer solstice.
    pub solar_cycle: f64,
    /// Fraction of the synodic month elapsed, `[0, 1)`.
    pub lunar_phase: f64,
    pub lunar_illumination: f64,
    /// Tide height index in `[0, 1]`.
    pub tide: f64,
    pub temperature_c: f64,
    pub pressure_hpa: f64,
    pub humidity: f64,
    pub salinity_psu: f64,
    /// Dipole field strength in microtesla.
    pub geomagnetic_ut: f64,
    /// Radiation index in `[0, 1]`.
    pub radiation: f64,
    /// Gravitational acceleration in m/s².
    pub gravity: f64,
}

impl Environment {
    #[must_use]
    pub fn synthesize(seed: u32, time_seed: u32, entropy: u32, at: NaiveDateTime) -> Self {
        let mut rng = Xorshift32::stream(seed, StreamTag::ENVIRONMENT);

        let latitude = (f64::from(mix32(seed, time_seed, 0x1a7) % 180_000) / 1000.0 - 90.0
            + rng.jitter(0.01))
        .clamp(-90.0, 90.0);
        let longitude = wrap_longitude(
            f64::from(mix32(time_seed, entropy, 0x10c) % 360_000) / 1000.0 - 180.0
                + rng.jitter(0.01),
        );
        let altitude_m = f64::from(mix32(entropy, seed, 0xa17) % 4800) - 200.0 + rng.next_f64() * 12.0;
        let utc_offset_hours = ((longitude / 15.0).round() as i32).clamp(-12, 14);

        let day_of_year = at.ordinal();
        let solar_cycle =
            0.5 + 0.5 * (TAU * (f64::from(day_of_year) - 80.0) / TROPICAL_YEAR_DAYS).sin();

        let since_new_moon = julian_day_ut(at) - REFERENCE_NEW_MOON_JD;
        let lunar_phase = since_new_moon.rem_euclid(SYNODIC_MONTH_DAYS) / SYNODIC_MONTH_DAYS;
        let lunar_illumination = (1.0 - (TAU * lunar_phase).cos()) / 2.0;

        let clock_hours = f64::from(at.hour()) + f64::from(at.minute()) / 60.0;
        let tide = clamp01(
            0.5 + 0.32 * (2.0 * TAU * lunar_phase).cos() + 0.18 * (TAU * clock_hours / 12.42).sin(),
        );

        let lat_rad = latitude * PI / 180.0;
        let hemisphere = if latitude >= 0.0 { 1.0 } else { -1.0 };
        let seasonal_swing = hemisphere * 24.0 * (solar_cycle - 0.5) * latitude.abs() / 90.0;
        let temperature_c =
            27.0 - 0.42 * latitude.abs() + seasonal_swing - 0.0065 * altitude_m + rng.jitter(1.5);

        let pressure_hpa =
            1013.25 * (1.0 - 2.255_77e-5 * altitude_m).max(0.0).powf(5.255_88) + rng.jitter(3.0);
        let humidity = clamp01(0.35 + 0.4 * lat_rad.cos() + rng.jitter(0.1));
        let salinity_psu = 34.5 + 1.5 * (2.0 * lat_rad).sin() + rng.jitter(0.3);

        let geomagnetic_ut = 30.0 * (1.0 + 3.0 * lat_rad.sin().powi(2)).sqrt() + rng.jitter(1.2);

        let radiation = clamp01(
            0.12 + altitude_m.max(0.0) / 6000.0 * 0.35
                + latitude.abs() / 90.0 * 0.18
                + solar_cycle * 0.15
                + rng.next_f64() * 0.2,
        );

        let sin_lat = lat_rad.sin();
        let sin_2lat = (2.0 * lat_rad).sin();
        let gravity = 9.780_327 * (1.0 + 0.005_302_4 * sin_lat * sin_lat - 0.000_005_8 * sin_2lat * sin_2lat)
            - 3.086e-6 * altitude_m;

        Self {
            latitude,
            longitude,
            altitude_m,
            utc_offset_hours,
            day_of_year,
            solar_cycle,
            lunar_phase,
            lunar_illumination,
            tide,
            temperature_c,
            pressure_hpa,
            humidity,
            salinity_psu,
            geomagnetic_ut,
            radiation,
            gravity,
        }
    }

    #[must_use]
    pub fn temperature_k(&self) -> f64 {
        self.temperature_c + 273.15
    }
}

fn wrap_longitude(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn deterministic() {
        let a = Environment::synthesize(1, 2, 3, at(2024, 1, 1, 9));
        let b = Environment::synthesize(1, 2, 3, at(2024, 1, 1, 9));
        assert_eq!(a, b);
    }

    #[test]
    fn ranges_hold_across_seeds() {
        for i in 0..300u32 {
            let seed = i.wrapping_mul(0x9e37_79b9);
            let env = Environment::synthesize(seed, seed ^ 0x55, seed.rotate_left(13), at(2024, 7, 15, i % 24));
            assert!((-90.0..=90.0).contains(&env.latitude));
            assert!((-180.0..180.0).contains(&env.longitude));
            assert!((-200.0..4612.0).contains(&env.altitude_m));
            assert!((-12..=14).contains(&env.utc_offset_hours));
            assert!((0.0..=1.0).contains(&env.solar_cycle));
            assert!((0.0..1.0).contains(&env.lunar_phase));
            assert!((0.0..=1.0).contains(&env.lunar_illumination));
            assert!((0.0..=1.0).contains(&env.tide));
            assert!((0.0..=1.0).contains(&env.humidity));
            assert!((0.0..=1.0).contains(&env.radiation));
            assert!(env.pressure_hpa > 500.0 && env.pressure_hpa < 1045.0);
            assert!(env.gravity > 9.7 && env.gravity < 9.9);
            assert!(env.geomagnetic_ut > 25.0 && env.geomagnetic_ut < 65.0);
            assert!(env.temperature_k() > 0.0);
        }
    }

    #[test]
    fn full_moon_is_bright() {
        // Full moon on 2024-01-25 17:54 UTC.
        let env = Environment::synthesize(1, 2, 3, at(2024, 1, 26, 2));
        assert!(env.lunar_illumination > 0.95, "{}", env.lunar_illumination);
    }

    #[test]
    fn entropy_moves_the_coordinates() {
        let a = Environment::synthesize(7, 7, 1, at(2024, 1, 1, 0));
        let b = Environment::synthesize(7, 7, 2, at(2024, 1, 1, 0));
        assert_ne!(a.longitude, b.longitude);
    }
}
