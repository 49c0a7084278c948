//! Verdict band lookup and poem selection.

use gua_types::{Element, Verdict, VerdictThresholds};

use crate::mix::fnv1a32;
use crate::rng::Xorshift32;

const BASE_POEMS: [&str; 8] = [
    "灯火未明，先守一息。",
    "风起于青萍之末，势成于无声。",
    "一步不让，万步皆空。",
    "欲速不达，欲稳则成。",
    "天机不语，唯人自知。",
    "行到水穷处，坐看云起时。",
    "心有霓虹，脚踏尘埃。",
    "算法在走，命数在变。",
];

const FALLBACK_POEM: &str = "静观其变，勿急于名。";

fn verdict_poems(verdict: Verdict) -> [&'static str; 3] {
    match verdict {
        Verdict::GreatGoodSwift => ["雷动而行，勿失其时。", "今夜金光落指尖，明日可定乾坤。", "乘势而起，一击即中。"],
        Verdict::GreatGoodRide => ["顺风不等人，起念便成章。", "势来如潮，踏浪而上。", "大道已开，莫问归期。"],
        Verdict::GoodAct => ["先声夺人，后势自稳。", "心定则锋利，出手见分晓。", "一步先，步步先。"],
        Verdict::GoodSteady => ["以稳为刃，切开迷雾。", "慢半拍，反得全局。", "稳住气口，再推一寸。"],
        Verdict::FlatWait => ["不争一时，争一势。", "此刻宜藏锋，待明日亮刃。", "按下暂停，胜过盲冲。"],
        Verdict::FlatWatch => ["观其变，守其正。", "风未定，先系好舟。", "静看局面，自有落点。"],
        Verdict::IllStill => ["退一步不是输，是换命。", "此局不宜硬碰，宜断舍离。", "守住底线，即是转机。"],
        Verdict::IllGuarded => ["口为祸门，心为护符。", "慎言可保身，慎行可保局。", "少说一句，多留一线。"],
    }
}

fn element_poems(element: Element) -> [&'static str; 2] {
    match element {
        Element::Wood => ["青木藏锋，先长根再发芽。", "枝叶向上，先稳土再逐风。"],
        Element::Fire => ["火候未足，先蓄热再点燃。", "光可照路，亦可灼人。"],
        Element::Earth => ["厚土不语，能载万物亦能埋雷。", "稳住重心，天地自宽。"],
        Element::Metal => ["金刃需磨，先正其锋再断其物。", "冷光一闪，胜过百句豪言。"],
        Element::Water => ["水善利万物而不争，绕开即是胜。", "深水不响，急流最险。"],
    }
}

/// Score band picks the verdict family; the changing line picks the phrasing.
#[must_use]
pub fn pick_verdict(score: u8, thresholds: &VerdictThresholds, changing_line: u8) -> Verdict {
    let s = f64::from(score) / 100.0;
    if s >= thresholds.great_good {
        if changing_line <= 2 {
            Verdict::GreatGoodSwift
        } else {
            Verdict::GreatGoodRide
        }
    } else if s >= thresholds.good {
        if changing_line <= 3 {
            Verdict::GoodAct
        } else {
            Verdict::GoodSteady
        }
    } else if s >= thresholds.flat {
        if changing_line <= 3 {
            Verdict::FlatWait
        } else {
            Verdict::FlatWatch
        }
    } else if changing_line >= 5 {
        Verdict::IllStill
    } else {
        Verdict::IllGuarded
    }
}

/// Verdict lines, then dominant-element lines, then the shared base lines.
#[must_use]
pub fn poem_pool(verdict: Verdict, dominant: Element) -> Vec<&'static str> {
    let mut pool = Vec::with_capacity(13);
    pool.extend(verdict_poems(verdict));
    pool.extend(element_poems(dominant));
    pool.extend(BASE_POEMS);
    pool
}

/// Deterministic pick from [`poem_pool`]. The stream is keyed by the verdict,
/// the hexagram name, and the factor signature when there is one.
#[must_use]
pub fn pick_poem(
    seed: u32,
    verdict: Verdict,
    hexagram_name: &str,
    dominant: Element,
    signature: Option<&str>,
) -> &'static str {
    let mut key = format!("{}{hexagram_name}", verdict.as_str());
    if let Some(sig) = signature {
        key.push('|');
        key.push_str(sig);
    }
    let mut rng = Xorshift32::new(seed ^ fnv1a32(&key));
    let pool = poem_pool(verdict, dominant);
    let index = (rng.next_f64() * pool.len() as f64).floor() as usize;
    pool.get(index).copied().unwrap_or(FALLBACK_POEM)
}
