//! Entry points: one computation, reported to a trace sink.
//!
//! [`divine`] and [`divine_with_trace`] share [`run`]; only the sink differs,
//! so the two always produce the same result for the same inputs.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gua_types::{
    Carry, DivinationConfig, DivinationInput, DivinationResult, Fingerprint, TraceData,
    TraceEvent, TracePhase,
};

use crate::calendar::{CalendarError, PillarCalendar, SexagenaryCalendar};
use crate::environment::Environment;
use crate::factors::{FactorContext, run_factors};
use crate::fusion::fuse;
use crate::mix::{fnv1a32, mix32, rotl32};
use crate::rng::Xorshift32;
use crate::scoring::{
    DomainScores, Numerology, TextNumbers, cast_hexagram, elements_from_pillars, score_entropy,
    score_iching, score_numerology, score_text, score_time, trigram,
};
use crate::trace::{NullSink, TraceRecorder, TraceSink};
use crate::verdict::{pick_poem, pick_verdict};

#[derive(Debug, Error)]
pub enum DivinationError {
    #[error("calendar conversion failed: {0}")]
    Calendar(#[from] CalendarError),
}

/// A result together with the trace that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracedDivination {
    pub result: DivinationResult,
    pub trace: Vec<TraceEvent>,
}

/// `(y·3721 + m·521 + d·97 + h·23 + min·7 + s) ^ rotl(m·131 + d·17 + h, 9)`,
/// all in wrapping 32-bit arithmetic.
#[must_use]
pub fn time_signature(at: NaiveDateTime) -> u32 {
    let y = at.year() as u32;
    let (m, d) = (at.month(), at.day());
    let (h, min, s) = (at.hour(), at.minute(), at.second());
    let linear = y
        .wrapping_mul(3721)
        .wrapping_add(m * 521)
        .wrapping_add(d * 97)
        .wrapping_add(h * 23)
        .wrapping_add(min * 7)
        .wrapping_add(s);
    linear ^ rotl32(m * 131 + d * 17 + h, 9)
}

pub fn divine(
    input: &DivinationInput,
    entropy: u32,
    config: &DivinationConfig,
) -> Result<DivinationResult, DivinationError> {
    divine_with_calendar(input, entropy, config, &SexagenaryCalendar)
}

pub fn divine_with_trace(
    input: &DivinationInput,
    entropy: u32,
    config: &DivinationConfig,
) -> Result<TracedDivination, DivinationError> {
    divine_with_trace_and_calendar(input, entropy, config, &SexagenaryCalendar)
}

pub fn divine_with_calendar<C: PillarCalendar + ?Sized>(
    input: &DivinationInput,
    entropy: u32,
    config: &DivinationConfig,
    calendar: &C,
) -> Result<DivinationResult, DivinationError> {
    run(input, entropy, config, calendar, &mut NullSink)
}

pub fn divine_with_trace_and_calendar<C: PillarCalendar + ?Sized>(
    input: &DivinationInput,
    entropy: u32,
    config: &DivinationConfig,
    calendar: &C,
) -> Result<TracedDivination, DivinationError> {
    let seed = derive_seed(input, entropy);
    let mut recorder = TraceRecorder::new(seed);
    let result = run(input, entropy, config, calendar, &mut recorder)?;
    Ok(TracedDivination {
        result,
        trace: recorder.finish(),
    })
}

fn derive_seed(input: &DivinationInput, entropy: u32) -> u32 {
    let question_hash = fnv1a32(&input.normalized_question());
    mix32(question_hash, time_signature(input.datetime), entropy)
}

fn run<C, S>(
    input: &DivinationInput,
    entropy: u32,
    config: &DivinationConfig,
    calendar: &C,
    sink: &mut S,
) -> Result<DivinationResult, DivinationError>
where
    C: PillarCalendar + ?Sized,
    S: TraceSink,
{
    let at = input.datetime;
    let question = input.normalized_question();
    let question_hash = fnv1a32(&question);
    let time_seed = time_signature(at);
    let seed = mix32(question_hash, time_seed, entropy);
    let mut rng = Xorshift32::new(seed);

    // Resolved before anything is recorded: a calendar failure leaves no partial trace.
    let pillars = calendar.pillars(at)?;

    // 时间
    sink.group_start(
        TracePhase::Time,
        "时辰排盘",
        Some(TraceData::new().hex("timeSeed", time_seed).hex("seed", seed)),
        None,
    );
    sink.note(
        TracePhase::Time,
        "四柱",
        TraceData::new()
            .text("year", pillars.year.clone())
            .text("month", pillars.month.clone())
            .text("day", pillars.day.clone())
            .text("time", pillars.time.clone()),
    );
    let elements = elements_from_pillars(&pillars);
    let time_score = score_time(&elements);
    sink.note(
        TracePhase::Time,
        "五行分布",
        TraceData::new()
            .num("wood", elements.wood)
            .num("fire", elements.fire)
            .num("earth", elements.earth)
            .num("metal", elements.metal)
            .num("water", elements.water)
            .text("dominant", elements.dominant().glyph()),
    );
    sink.group_end(Some(TraceData::new().num("score", time_score)), None);

    // 文字
    let text = TextNumbers::of(&question);
    sink.group_start(
        TracePhase::Text,
        "字象解析",
        Some(TraceData::new().hex("questionHash", question_hash)),
        None,
    );
    sink.note(
        TracePhase::Text,
        "笔画推演",
        TraceData::new()
            .int("length", text.length)
            .int("unicodeSum", text.unicode_sum)
            .int("strokes", text.pseudo_strokes)
            .hex("chaos", text.chaos),
    );
    let text_score = score_text(&text);
    sink.group_end(Some(TraceData::new().num("score", text_score)), None);

    // 易经
    sink.group_start(TracePhase::IChing, "起卦", None, None);
    let (hexagram, base) = cast_hexagram(time_seed, question_hash, entropy, &mut rng);
    let element_of = |name: &str| trigram(name).map_or("", |t| t.element.glyph());
    sink.note(
        TracePhase::IChing,
        "上下卦",
        TraceData::new()
            .hex("base", base)
            .text("upper", hexagram.upper.clone())
            .text("lower", hexagram.lower.clone())
            .text("upperElement", element_of(&hexagram.upper))
            .text("lowerElement", element_of(&hexagram.lower)),
    );
    sink.note(
        TracePhase::IChing,
        "动爻",
        TraceData::new()
            .text("name", hexagram.name.clone())
            .int("changingLine", hexagram.changing_line),
    );
    let iching_score = score_iching(&hexagram);
    sink.group_end(Some(TraceData::new().num("score", iching_score)), None);

    // 数理
    sink.group_start(TracePhase::Numerology, "数理推演", None, None);
    let numerology = Numerology::of(at.date(), &question, input.nickname_or_empty());
    sink.note(
        TracePhase::Numerology,
        "三数",
        TraceData::new()
            .int("life", numerology.life)
            .int("inquiry", numerology.inquiry)
            .int("bridge", numerology.bridge),
    );
    let numerology_score = score_numerology(&numerology);
    sink.group_end(Some(TraceData::new().num("score", numerology_score)), None);

    // 天机
    let entropy_score = score_entropy(entropy);
    sink.group_start(
        TracePhase::Entropy,
        "天机感应",
        Some(TraceData::new().hex("entropy", entropy)),
        None,
    );
    sink.note(
        TracePhase::Entropy,
        "熵值映射",
        TraceData::new().num("score", entropy_score),
    );
    let env = Environment::synthesize(seed, time_seed, entropy, at);
    record_environment(sink, &env);

    let scores = DomainScores {
        time: time_score,
        text: text_score,
        iching: iching_score,
        numerology: numerology_score,
        entropy: entropy_score,
    };
    let factors = run_factors(
        &FactorContext {
            seed,
            time_seed,
            entropy,
            question_hash,
            question: &question,
            at,
            env: &env,
            scores: &scores,
        },
        sink,
    );
    sink.emit(
        TracePhase::Entropy,
        "多学科因子注入",
        Some(
            TraceData::new()
                .num("score", factors.score01)
                .num("entropy", factors.vec_entropy)
                .text("sig", factors.signature.clone()),
        ),
        Some(factors.fp),
    );
    sink.group_end(None, None);

    // 融合
    sink.group_start(TracePhase::Fusion, "分数融合", None, None);
    let gate_draw = rng.next_f64();
    let jitter_draw = rng.next_f64();
    let fusion = fuse(
        &scores,
        &config.weights,
        factors.score01,
        env.radiation,
        gate_draw,
        jitter_draw,
    );
    sink.emit(
        TracePhase::Fusion,
        "域分数",
        Some(
            TraceData::new()
                .num("time", scores.time)
                .num("text", scores.text)
                .num("iching", scores.iching)
                .num("numerology", scores.numerology)
                .num("entropy", scores.entropy),
        ),
        Some(Fingerprint::new([
            scores.time,
            scores.text,
            scores.iching,
            scores.numerology,
            scores.entropy,
            fusion.base,
            fusion.gate,
            fusion.combined,
        ])),
    );
    sink.note(
        TracePhase::Fusion,
        "因子门控",
        TraceData::new()
            .num("base", fusion.base)
            .num("gate", fusion.gate)
            .num("factor", factors.score01)
            .num("combined", fusion.combined),
    );
    sink.group_end(Some(TraceData::new().int("score", fusion.score)), None);

    // 裁决
    sink.group_start(TracePhase::Verdict, "裁决定签", None, None);
    let verdict = pick_verdict(
        fusion.score,
        &config.verdict_thresholds,
        hexagram.changing_line,
    );
    let dominant = elements.dominant();
    let poem = pick_poem(
        seed,
        verdict,
        &hexagram.name,
        dominant,
        Some(&factors.signature),
    );
    sink.note(
        TracePhase::Verdict,
        "定签",
        TraceData::new()
            .text("verdict", verdict.as_str())
            .int("score", fusion.score)
            .text("element", dominant.glyph()),
    );
    sink.note(TracePhase::Verdict, "诗签", TraceData::new().text("poem", poem));
    sink.chain_check(TracePhase::Verdict);
    sink.group_end(None, None);

    tracing::debug!(
        seed,
        time = time_score,
        text = text_score,
        iching = iching_score,
        numerology = numerology_score,
        entropy = entropy_score,
        factor = factors.score01,
        score = fusion.score,
        verdict = %verdict,
        "divination complete"
    );

    Ok(DivinationResult {
        verdict,
        score: fusion.score,
        poem: poem.to_string(),
        carry: Carry {
            seed,
            pillars,
            elements,
            hexagram,
        },
    })
}

fn record_environment<S: TraceSink + ?Sized>(sink: &mut S, env: &Environment) {
    sink.group_start(TracePhase::Entropy, "环境合成", None, None);
    sink.note(
        TracePhase::Entropy,
        "坐标",
        TraceData::new()
            .num("lat", env.latitude)
            .num("lon", env.longitude)
            .num("altM", env.altitude_m)
            .int("utcOffset", env.utc_offset_hours),
    );
    sink.note(
        TracePhase::Entropy,
        "天象",
        TraceData::new()
            .num("solar", env.solar_cycle)
            .num("lunarPhase", env.lunar_phase)
            .num("illumination", env.lunar_illumination)
            .num("tide", env.tide),
    );
    sink.note(
        TracePhase::Entropy,
        "气象",
        TraceData::new()
            .num("tempC", env.temperature_c)
            .num("pressureHpa", env.pressure_hpa)
            .num("humidity", env.humidity)
            .num("salinity", env.salinity_psu),
    );
    sink.group_end(
        Some(
            TraceData::new()
                .num("geomagUt", env.geomagnetic_ut)
                .num("radiation", env.radiation)
                .num("gravity", env.gravity),
        ),
        None,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gua_types::Pillars;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn time_signature_formula() {
        let t = at(2024, 1, 1, 9, 0, 0);
        let linear = 2024 * 3721 + 521 + 97 + 9 * 23;
        let expected = linear ^ (131u32 + 17 + 9).rotate_left(9);
        assert_eq!(time_signature(t), expected);
    }

    #[test]
    fn seconds_move_the_signature() {
        assert_ne!(
            time_signature(at(2024, 1, 1, 9, 0, 0)),
            time_signature(at(2024, 1, 1, 9, 0, 1))
        );
    }

    struct FixedCalendar;

    impl PillarCalendar for FixedCalendar {
        fn pillars(&self, _at: NaiveDateTime) -> Result<Pillars, CalendarError> {
            Ok(Pillars {
                year: "甲子".into(),
                month: "甲子".into(),
                day: "甲子".into(),
                time: "甲子".into(),
            })
        }
    }

    #[test]
    fn custom_calendar_is_used() {
        let input = DivinationInput::new("问", at(2024, 1, 1, 9, 0, 0));
        let r = divine_with_calendar(&input, 1, &DivinationConfig::default(), &FixedCalendar)
            .unwrap();
        assert_eq!(r.carry.pillars.year, "甲子");
        // 4 wood stems at 1.35 and 4 water branches at 1.0.
        assert!((r.carry.elements.wood - 1.35 / 2.35).abs() < 1e-12);
    }

    #[test]
    fn traced_and_plain_agree() {
        let input = DivinationInput::new("今天适合出门吗", at(2023, 8, 15, 20, 30, 0))
            .with_nickname("阿星");
        let config = DivinationConfig::default();
        let plain = divine(&input, 0xabcdef, &config).unwrap();
        let traced = divine_with_trace(&input, 0xabcdef, &config).unwrap();
        assert_eq!(plain, traced.result);
    }

    #[test]
    fn seed_lands_in_carry() {
        let input = DivinationInput::new("  问  事  ", at(2024, 1, 1, 9, 0, 0));
        let r = divine(&input, 5, &DivinationConfig::default()).unwrap();
        let expected = mix32(fnv1a32("问 事"), time_signature(input.datetime), 5);
        assert_eq!(r.carry.seed, expected);
    }
}
