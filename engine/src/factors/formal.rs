//! Stages built on information theory, dynamics, and hashing.

use std::f64::consts::TAU;

use gua_types::TraceData;

use super::{Factor, FactorContext, Simulation, mean};
use crate::mix::mix32;
use crate::rng::{StreamTag, Xorshift32};
use crate::scoring::clamp01;

const LOGISTIC_STEPS: usize = 24;
const LORENZ_STEPS: u32 = 80;
const LORENZ_DT: f64 = 0.01;
const LORENZ_SIGMA: f64 = 10.0;
const LORENZ_RHO: f64 = 28.0;
const LORENZ_BETA: f64 = 8.0 / 3.0;

/// Shannon entropy of the question's code points plus a channel capacity
/// estimate driven by humidity.
pub struct Information;

impl Factor for Information {
    fn tag(&self) -> StreamTag {
        StreamTag::INFORMATION
    }

    fn label(&self) -> &'static str {
        "信息熵"
    }

    fn simulate(&self, ctx: &FactorContext<'_>, rng: &mut Xorshift32) -> Simulation {
        let mut histogram = [0u32; 16];
        for c in ctx.question.chars() {
            let code = u32::from(c);
            histogram[((code ^ (code >> 4)) % 16) as usize] += 1;
        }
        let total: u32 = histogram.iter().sum();
        let peak = histogram.iter().copied().max().unwrap_or(0);

        let bits: f64 = if total == 0 {
            0.0
        } else {
            histogram
                .iter()
                .filter(|n| **n > 0)
                .map(|n| {
                    let p = f64::from(*n) / f64::from(total);
                    -p * p.log2()
                })
                .sum()
        };
        let snr = 1.0 + ctx.env.humidity * 30.0 + rng.next_f64() * 5.0;
        let capacity = (1.0 + snr).log2() / 37f64.log2();

        let features = histogram
            .iter()
            .map(|n| if peak == 0 { 0.0 } else { f64::from(*n) / f64::from(peak) })
            .collect();

        Simulation {
            scalar: 0.55 * (bits / 4.0) + 0.45 * capacity,
            features,
            detail: TraceData::new()
                .num("bits", bits)
                .num("snr", snr)
                .num("capacity", capacity),
        }
    }
}

/// Logistic map in its chaotic band, followed by a short Euler integration of
/// the Lorenz system started from the map's final state.
pub struct Chaos;

impl Factor for Chaos {
    fn tag(&self) -> StreamTag {
        StreamTag::CHAOS
    }

    fn label(&self) -> &'static str {
        "混沌动力学"
    }

    fn simulate(&self, _ctx: &FactorContext<'_>, rng: &mut Xorshift32) -> Simulation {
        let r = 3.57 + 0.43 * rng.next_f64();
        let mut x = 0.1 + 0.8 * rng.next_f64();
        let mut lyapunov = 0.0;
        let mut orbit = Vec::with_capacity(LOGISTIC_STEPS);
        for _ in 0..LOGISTIC_STEPS {
            lyapunov += (r * (1.0 - 2.0 * x)).abs().max(1e-12).ln();
            x = r * x * (1.0 - x);
            orbit.push(x);
        }
        lyapunov /= LOGISTIC_STEPS as f64;

        let (mut lx, mut ly, mut lz) = (x * 2.0 - 1.0, rng.next_f64() - 0.5, 20.0 + rng.next_f64());
        let mut lorenz = Vec::with_capacity(8);
        for step in 1..=LORENZ_STEPS {
            let dx = LORENZ_SIGMA * (ly - lx);
            let dy = lx * (LORENZ_RHO - lz) - ly;
            let dz = lx * ly - LORENZ_BETA * lz;
            lx += dx * LORENZ_DT;
            ly += dy * LORENZ_DT;
            lz += dz * LORENZ_DT;
            if step % 10 == 0 {
                lorenz.push(clamp01((lx + 25.0) / 50.0));
            }
        }

        let spread = mean(&lorenz);
        let mut features = orbit[LOGISTIC_STEPS - 8..].to_vec();
        features.extend_from_slice(&lorenz);

        Simulation {
            scalar: clamp01(0.5 + lyapunov * 0.4) * 0.6 + spread * 0.4,
            features,
            detail: TraceData::new()
                .num("r", r)
                .num("lyapunov", lyapunov)
                .num("lorenzZ", lz),
        }
    }
}

/// Interference of 5 to 12 equal-amplitude paths with random phases, read at
/// sixteen detunings.
pub struct Quantum;

impl Factor for Quantum {
    fn tag(&self) -> StreamTag {
        StreamTag::QUANTUM
    }

    fn label(&self) -> &'static str {
        "量子振幅"
    }

    fn simulate(&self, ctx: &FactorContext<'_>, rng: &mut Xorshift32) -> Simulation {
        let paths = rng.range_inclusive(5, 12);
        let n = f64::from(paths);
        let amplitude = 1.0 / n.sqrt();
        let question_turn = f64::from(ctx.question_hash) / 4_294_967_296.0;
        let phases: Vec<f64> = (0..paths)
            .map(|j| TAU * (rng.next_f64() + f64::from(j) * question_turn))
            .collect();

        let probabilities: Vec<f64> = (0..16)
            .map(|k| {
                let detune = f64::from(k) * 0.19;
                let (re, im) = phases.iter().enumerate().fold((0.0, 0.0), |(re, im), (j, phi)| {
                    let theta = phi + detune * j as f64;
                    (re + amplitude * theta.cos(), im + amplitude * theta.sin())
                });
                clamp01((re * re + im * im) / n)
            })
            .collect();

        Simulation {
            scalar: 0.4 + 0.6 * mean(&probabilities),
            features: probabilities.clone(),
            detail: TraceData::new()
                .int("paths", paths)
                .num("p0", probabilities[0]),
        }
    }
}

/// Single-bit avalanche of the mixer over seed, question, time, and entropy
/// words. A good mixer flips about half the output bits.
pub struct Avalanche;

impl Factor for Avalanche {
    fn tag(&self) -> StreamTag {
        StreamTag::AVALANCHE
    }

    fn label(&self) -> &'static str {
        "哈希雪崩"
    }

    fn simulate(&self, ctx: &FactorContext<'_>, rng: &mut Xorshift32) -> Simulation {
        let words = [ctx.seed, ctx.question_hash, ctx.time_seed, ctx.entropy];
        let mut state = ctx.seed;
        let mut diffusion = Vec::with_capacity(16);
        for k in 0..16u32 {
            let word = words[(k % 4) as usize];
            let bit = 1u32 << rng.range_inclusive(0, 31);
            let a = mix32(state, word, k);
            let b = mix32(state ^ bit, word, k);
            diffusion.push(f64::from((a ^ b).count_ones()) / 32.0);
            state = a;
        }
        let mean_flip = mean(&diffusion);

        Simulation {
            scalar: 1.0 - (mean_flip - 0.5).abs() * 2.0,
            features: diffusion,
            detail: TraceData::new()
                .num("diffusion", mean_flip)
                .hex("state", state),
        }
    }
}
