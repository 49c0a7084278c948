//! Multidisciplinary factor pipeline.
//!
//! Nine small numeric processes, each seeded from its own stream, each
//! reduced to the same shape: a scalar, a 16-value feature vector, an 8-value
//! fingerprint, and a signature. The stage vectors are blended into a running
//! vector and the stage signatures chained, giving one aggregate factor that
//! fusion mixes into the final score.

mod formal;
mod natural;

pub use formal::{Avalanche, Chaos, Information, Quantum};
pub use natural::{Epidemic, Geomagnetic, Kinetics, Thermal, Tidal};

use chrono::NaiveDateTime;
use serde::Serialize;

use gua_types::{Fingerprint, TraceData, TracePhase};

use crate::environment::Environment;
use crate::mix::mix32;
use crate::rng::{StreamTag, Xorshift32};
use crate::scoring::{DomainScores, clamp01};
use crate::trace::TraceSink;

pub const FEATURE_LEN: usize = 16;
pub type FeatureVec = [f64; FEATURE_LEN];

/// Message of the group that wraps every stage.
pub const PIPELINE_GROUP: &str = "多学科因子";

/// Inputs every stage may read.
#[derive(Debug, Clone, Copy)]
pub struct FactorContext<'a> {
    pub seed: u32,
    pub time_seed: u32,
    pub entropy: u32,
    pub question_hash: u32,
    pub question: &'a str,
    pub at: NaiveDateTime,
    pub env: &'a Environment,
    pub scores: &'a DomainScores,
}

/// Raw output of one stage, before normalization to the common shape.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub scalar: f64,
    /// Any number of samples; resampled to [`FEATURE_LEN`].
    pub features: Vec<f64>,
    /// Process parameters worth showing in the trace.
    pub detail: TraceData,
}

/// One stylized process.
pub trait Factor: Sync {
    fn tag(&self) -> StreamTag;

    /// Display name used as the trace group message.
    fn label(&self) -> &'static str;

    /// Run the process. `rng` is this stage's own stream.
    fn simulate(&self, ctx: &FactorContext<'_>, rng: &mut Xorshift32) -> Simulation;
}

/// Stages in execution order.
pub static PIPELINE: [&dyn Factor; 9] = [
    &Tidal,
    &Geomagnetic,
    &Thermal,
    &Kinetics,
    &Information,
    &Chaos,
    &Quantum,
    &Epidemic,
    &Avalanche,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorOutput {
    pub label: &'static str,
    pub scalar: f64,
    pub vec: FeatureVec,
    pub fp: Fingerprint,
    pub sig: u32,
}

impl FactorOutput {
    fn from_simulation(factor: &dyn Factor, sim: &Simulation) -> Self {
        let scalar = clamp01(sim.scalar);
        let vec = resample(&sim.features);
        Self {
            label: factor.label(),
            scalar,
            vec,
            fp: fingerprint_of(&vec),
            sig: signature_of(factor.tag(), scalar, &vec),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorAggregate {
    pub score01: f64,
    pub vec_entropy: f64,
    pub vec: FeatureVec,
    /// 8 hex digits chaining every stage signature.
    pub signature: String,
    pub fp: Fingerprint,
    pub stages: Vec<FactorOutput>,
}

/// Run every stage in [`PIPELINE`] order and fold them into one aggregate.
pub fn run_factors<S: TraceSink + ?Sized>(ctx: &FactorContext<'_>, sink: &mut S) -> FactorAggregate {
    let mut blend = Xorshift32::stream(ctx.seed, StreamTag::BLEND);
    let mut vec = [0.5; FEATURE_LEN];
    let mut sum_scalar = 0.0;
    let mut sig_acc = ctx.seed;
    let mut stages = Vec::with_capacity(PIPELINE.len());

    sink.group_start(
        TracePhase::Entropy,
        PIPELINE_GROUP,
        Some(TraceData::new().int("stages", PIPELINE.len() as u32)),
        None,
    );

    for (i, factor) in PIPELINE.iter().enumerate() {
        let mut rng = Xorshift32::stream(ctx.seed, factor.tag());
        let sim = factor.simulate(ctx, &mut rng);
        let out = FactorOutput::from_simulation(*factor, &sim);

        sink.group_start(
            TracePhase::Entropy,
            factor.label(),
            Some(TraceData::new().hex("tag", factor.tag().value())),
            None,
        );
        sink.note(TracePhase::Entropy, "过程参数", sim.detail);
        sink.emit(
            TracePhase::Entropy,
            "特征指纹",
            Some(
                TraceData::new()
                    .num("scalar", out.scalar)
                    .hex("sig", out.sig),
            ),
            Some(out.fp),
        );

        let weight = (0.18 + ctx.env.radiation * 0.34 + blend.jitter(0.06)).clamp(0.05, 0.95);
        for (slot, target) in vec.iter_mut().zip(out.vec) {
            *slot = *slot * (1.0 - weight) + target * weight;
        }
        sum_scalar += out.scalar;
        sig_acc = mix32(sig_acc, out.sig, i as u32);

        sink.note(
            TracePhase::Entropy,
            "向量混合",
            TraceData::new()
                .num("weight", weight)
                .num("sum", sum_scalar)
                .hex("acc", sig_acc),
        );
        sink.group_end(None, None);
        stages.push(out);
    }

    let vec_entropy = vector_entropy(&vec);
    let score01 = clamp01(sum_scalar / PIPELINE.len() as f64 * 0.58 + vec_entropy * 0.42);
    let signature = format!(
        "{:08x}",
        mix32(sig_acc, quantize(score01), quantize(vec_entropy))
    );
    let s = ctx.scores;
    let fp = Fingerprint::new([
        score01,
        vec_entropy,
        s.time,
        s.text,
        s.iching,
        s.numerology,
        s.entropy,
        ctx.env.radiation,
    ]);

    sink.group_end(
        Some(
            TraceData::new()
                .num("score", score01)
                .num("entropy", vec_entropy)
                .text("sig", signature.clone()),
        ),
        None,
    );

    tracing::debug!(score01, vec_entropy, %signature, "factor pipeline");

    FactorAggregate {
        score01,
        vec_entropy,
        vec,
        signature,
        fp,
        stages,
    }
}

/// Shannon entropy of the non-negative part of `values`, normalized by
/// `log2(len)` into `[0, 1]`.
#[must_use]
pub fn vector_entropy(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let total: f64 = values.iter().map(|v| v.max(0.0)).sum();
    if total <= 0.0 || !total.is_finite() {
        return 0.0;
    }
    let bits: f64 = values
        .iter()
        .map(|v| v.max(0.0) / total)
        .filter(|p| *p > 0.0)
        .map(|p| -p * p.log2())
        .sum();
    clamp01(bits / (values.len() as f64).log2())
}

/// Linear resampling onto [`FEATURE_LEN`] points, clamped into `[0, 1]`.
fn resample(samples: &[f64]) -> FeatureVec {
    let n = samples.len();
    match n {
        0 => [0.5; FEATURE_LEN],
        1 => [clamp01(samples[0]); FEATURE_LEN],
        _ => {
            let mut out = [0.0; FEATURE_LEN];
            let step = (n - 1) as f64 / (FEATURE_LEN - 1) as f64;
            for (k, slot) in out.iter_mut().enumerate() {
                let pos = k as f64 * step;
                let i = (pos.floor() as usize).min(n - 1);
                let frac = pos - i as f64;
                let a = samples[i];
                let b = samples[(i + 1).min(n - 1)];
                *slot = clamp01(a + (b - a) * frac);
            }
            out
        }
    }
}

/// Means of adjacent pairs.
fn fingerprint_of(vec: &FeatureVec) -> Fingerprint {
    let mut fp = [0.0; Fingerprint::LEN];
    for (slot, pair) in fp.iter_mut().zip(vec.chunks_exact(2)) {
        *slot = (pair[0] + pair[1]) / 2.0;
    }
    Fingerprint::new(fp)
}

fn quantize(v: f64) -> u32 {
    (clamp01(v) * 1_000_000.0).round() as u32
}

fn signature_of(tag: StreamTag, scalar: f64, vec: &FeatureVec) -> u32 {
    let acc = vec
        .iter()
        .enumerate()
        .fold(tag.value(), |acc, (i, v)| mix32(acc, quantize(*v), i as u32));
    mix32(acc, quantize(scalar), FEATURE_LEN as u32)
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
