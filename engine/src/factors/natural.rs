//! Stages modeled on physical and population processes.

use chrono::Timelike;
use std::f64::consts::TAU;

use gua_types::TraceData;

use super::{Factor, FactorContext, Simulation, mean};
use crate::rng::{StreamTag, Xorshift32};
use crate::scoring::clamp01;

/// Principal lunar and solar tidal constituents, (period in hours, amplitude).
const CONSTITUENTS: [(f64, f64); 4] = [(12.42, 0.28), (12.0, 0.12), (23.93, 0.06), (25.82, 0.04)];

const GAS_CONSTANT: f64 = 8.314;
const REFERENCE_EA: f64 = 55_000.0;
const REFERENCE_K: f64 = 298.15;

/// Tidal resonance: sixteen samples of a four-constituent tide curve.
pub struct Tidal;

impl Factor for Tidal {
    fn tag(&self) -> StreamTag {
        StreamTag::TIDAL
    }

    fn label(&self) -> &'static str {
        "潮汐共振"
    }

    fn simulate(&self, ctx: &FactorContext<'_>, rng: &mut Xorshift32) -> Simulation {
        let env = ctx.env;
        let start = f64::from(env.day_of_year) * 24.0
            + f64::from(ctx.at.hour())
            + f64::from(ctx.at.minute()) / 60.0;
        let lunar_offset = TAU * env.lunar_phase;
        let gain = 0.6 + 0.4 * env.lunar_illumination;

        let curve: Vec<f64> = (0..16)
            .map(|k| {
                let t = start + f64::from(k) * 0.75 + rng.next_f64() * 0.1;
                let height: f64 = CONSTITUENTS
                    .iter()
                    .enumerate()
                    .map(|(i, (period, amp))| {
                        let offset = if i == 0 { lunar_offset } else { 0.0 };
                        amp * (TAU * t / period + offset).cos()
                    })
                    .sum();
                clamp01(0.5 + height * gain)
            })
            .collect();

        let high = curve.iter().copied().fold(f64::MIN, f64::max);
        let low = curve.iter().copied().fold(f64::MAX, f64::min);
        let resonance = high - low;

        Simulation {
            scalar: 0.35 + resonance * 0.5 + env.tide * 0.15,
            features: curve,
            detail: TraceData::new()
                .num("resonance", resonance)
                .num("gain", gain),
        }
    }
}

/// Dipole field strength sampled around a small wobble of the latitude.
pub struct Geomagnetic;

impl Factor for Geomagnetic {
    fn tag(&self) -> StreamTag {
        StreamTag::GEOMAGNETIC
    }

    fn label(&self) -> &'static str {
        "地磁势"
    }

    fn simulate(&self, ctx: &FactorContext<'_>, rng: &mut Xorshift32) -> Simulation {
        let lat = ctx.env.latitude.to_radians();
        let field: Vec<f64> = (0..16)
            .map(|k| {
                let wobble = 0.2 * (TAU * f64::from(k) / 16.0).sin();
                let b = 30.0 * (1.0 + 3.0 * (lat + wobble).sin().powi(2)).sqrt();
                clamp01((b - 25.0) / 40.0 + rng.jitter(0.03))
            })
            .collect();
        let potential = mean(&field);
        let anomaly = (ctx.env.geomagnetic_ut - 45.0) / 45.0;

        Simulation {
            scalar: 1.0 - (potential - 0.55).abs() * 1.4 + anomaly * 0.1,
            features: field,
            detail: TraceData::new()
                .num("potential", potential)
                .num("fieldUt", ctx.env.geomagnetic_ut),
        }
    }
}

/// Brownian walk of 12 steps with a temperature-scaled step size,
/// reflected at the unit interval.
pub struct Thermal;

impl Factor for Thermal {
    fn tag(&self) -> StreamTag {
        StreamTag::THERMAL
    }

    fn label(&self) -> &'static str {
        "热噪声"
    }

    fn simulate(&self, ctx: &FactorContext<'_>, rng: &mut Xorshift32) -> Simulation {
        let sigma = 0.08 * (ctx.env.temperature_k().max(1.0) / 300.0).sqrt();
        let mut x = 0.5;
        let mut path = Vec::with_capacity(13);
        path.push(x);
        for _ in 0..12 {
            x += rng.jitter(sigma);
            if x < 0.0 {
                x = -x;
            }
            if x > 1.0 {
                x = 2.0 - x;
            }
            x = clamp01(x);
            path.push(x);
        }

        Simulation {
            scalar: 1.0 - (x - 0.5).abs() * 1.6,
            features: path,
            detail: TraceData::new()
                .num("sigma", sigma)
                .num("drift", x - 0.5),
        }
    }
}

/// First-order conversion under an Arrhenius rate with a random activation
/// energy, relative to a reference reaction at room temperature.
pub struct Kinetics;

impl Factor for Kinetics {
    fn tag(&self) -> StreamTag {
        StreamTag::KINETICS
    }

    fn label(&self) -> &'static str {
        "化学动力学"
    }

    fn simulate(&self, ctx: &FactorContext<'_>, rng: &mut Xorshift32) -> Simulation {
        let activation = 40_000.0 + rng.next_f64() * 30_000.0;
        let kelvin = ctx.env.temperature_k().max(150.0);
        let rate = (-activation / (GAS_CONSTANT * kelvin)).exp()
            / (-REFERENCE_EA / (GAS_CONSTANT * REFERENCE_K)).exp();

        let conversion: Vec<f64> = (1..=16)
            .map(|i| 1.0 - (-rate * f64::from(i) / 16.0 * 3.0).exp())
            .collect();

        Simulation {
            scalar: 0.3 + 0.7 * conversion[7],
            features: conversion,
            detail: TraceData::new()
                .num("eaKj", activation / 1000.0)
                .num("rate", rate),
        }
    }
}

/// Discrete SIR model over 24 steps.
pub struct Epidemic;

impl Factor for Epidemic {
    fn tag(&self) -> StreamTag {
        StreamTag::EPIDEMIC
    }

    fn label(&self) -> &'static str {
        "流行病模型"
    }

    fn simulate(&self, ctx: &FactorContext<'_>, rng: &mut Xorshift32) -> Simulation {
        let beta = 0.18 + rng.next_f64() * 0.3 + ctx.env.humidity * 0.1;
        let gamma = 0.08 + rng.next_f64() * 0.12;
        let (mut s, mut i, mut r) = (0.99, 0.01, 0.0);
        let mut peak = i;
        let mut infected = Vec::with_capacity(24);

        for _ in 0..24 {
            let new_cases = beta * s * i;
            let recoveries = gamma * i;
            s -= new_cases;
            i += new_cases - recoveries;
            r += recoveries;
            peak = f64::max(peak, i);
            infected.push(i);
        }
        let curve = infected.iter().map(|v| v / peak).collect();

        Simulation {
            scalar: 0.25 + r * 0.5 + (1.0 - peak) * 0.25,
            features: curve,
            detail: TraceData::new()
                .num("r0", beta / gamma)
                .num("peak", peak)
                .num("recovered", r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::tests::Fixture;

    fn run(factor: &dyn Factor, seed: u32) -> Simulation {
        let fx = Fixture::new(seed);
        let ctx = fx.ctx(seed, "问");
        let mut rng = Xorshift32::stream(seed, factor.tag());
        factor.simulate(&ctx, &mut rng)
    }

    #[test]
    fn thermal_walk_stays_inside_unit_interval() {
        for seed in 0..200 {
            let sim = run(&Thermal, seed);
            assert_eq!(sim.features.len(), 13);
            assert!(sim.features.iter().all(|x| (0.0..=1.0).contains(x)));
        }
    }

    #[test]
    fn kinetics_conversion_is_monotonic() {
        let sim = run(&Kinetics, 11);
        for w in sim.features.windows(2) {
            assert!(w[1] >= w[0]);
        }
        assert!(sim.features.iter().all(|x| (0.0..=1.0).contains(x)));
    }

    #[test]
    fn epidemic_conserves_population() {
        let sim = run(&Epidemic, 23);
        let recovered = sim.detail.get_number("recovered").unwrap();
        let peak = sim.detail.get_number("peak").unwrap();
        assert!((0.0..=1.0).contains(&recovered));
        assert!(peak >= 0.01 - 1e-6);
        assert!(sim.features.iter().all(|x| (0.0..=1.0 + 1e-12).contains(x)));
    }

    #[test]
    fn tidal_curve_has_sixteen_samples() {
        let sim = run(&Tidal, 4);
        assert_eq!(sim.features.len(), 16);
        assert!(sim.detail.get_number("resonance").unwrap() >= 0.0);
    }

    #[test]
    fn stage_streams_are_independent() {
        let a = run(&Geomagnetic, 8);
        let b = run(&Geomagnetic, 8);
        assert_eq!(a.features, b.features);
        let c = run(&Geomagnetic, 9);
        assert_ne!(a.features, c.features);
    }
}
