use chrono::{Datelike, NaiveDate};

use super::clamp01;
use crate::mix::{digital_root, fnv1a32, sum_digits};

const LIFE_BOOST: [f64; 10] = [0.5, 0.68, 0.62, 0.72, 0.58, 0.66, 0.7, 0.6, 0.74, 0.64];
const INQUIRY_TILT: [f64; 10] = [0.5, 0.7, 0.6, 0.76, 0.58, 0.64, 0.72, 0.62, 0.74, 0.66];
const BRIDGE_BOOST: [f64; 10] = [0.5, 0.66, 0.6, 0.7, 0.58, 0.64, 0.72, 0.62, 0.76, 0.68];

/// Digital roots in `0..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Numerology {
    pub life: u8,
    pub inquiry: u8,
    pub bridge: u8,
}

impl Numerology {
    #[must_use]
    pub fn of(date: NaiveDate, question: &str, nickname: &str) -> Self {
        let y = date.year();
        let m = date.month();
        let d = date.day();

        let life = digital_root(
            sum_digits(u64::from(y.unsigned_abs()))
                + sum_digits(u64::from(m))
                + sum_digits(u64::from(d)),
        );
        let inquiry = digital_root(
            sum_digits(u64::from(fnv1a32(question))) + sum_digits(u64::from(fnv1a32(nickname))),
        );
        let calendar_residue = (i64::from(y) + i64::from(m) + i64::from(d)).rem_euclid(9) as u64;
        let bridge = digital_root(life * 7 + inquiry * 3 + calendar_residue);

        Self {
            life: life as u8,
            inquiry: inquiry as u8,
            bridge: bridge as u8,
        }
    }
}

fn lookup(table: &[f64; 10], index: u8) -> f64 {
    table.get(usize::from(index)).copied().unwrap_or(0.62)
}

#[must_use]
pub fn score_numerology(n: &Numerology) -> f64 {
    clamp01(
        lookup(&LIFE_BOOST, n.life) * 0.45
            + lookup(&INQUIRY_TILT, n.inquiry) * 0.35
            + lookup(&BRIDGE_BOOST, n.bridge) * 0.2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn life_number_for_new_year_2024() {
        let n = Numerology::of(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "", "");
        // 2+0+2+4 + 1 + 1 = 10 -> 1
        assert_eq!(n.life, 1);
    }

    #[test]
    fn roots_are_single_digits() {
        let date = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        for q in ["", "问", "这次面试能过吗", "long question about many things"] {
            let n = Numerology::of(date, q, "nick");
            assert!(n.life <= 9 && n.inquiry <= 9 && n.bridge <= 9);
        }
    }

    #[test]
    fn nickname_changes_inquiry_only() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let a = Numerology::of(date, "问", "");
        let b = Numerology::of(date, "问", "阿星");
        assert_eq!(a.life, b.life);
        let changed = (1..50)
            .map(|i| Numerology::of(date, "问", &format!("n{i}")))
            .any(|n| n.inquiry != a.inquiry);
        assert!(changed);
    }

    #[test]
    fn score_blends_tables() {
        let n = Numerology {
            life: 0,
            inquiry: 0,
            bridge: 0,
        };
        assert!((score_numerology(&n) - 0.5).abs() < 1e-12);
        let n = Numerology {
            life: 8,
            inquiry: 3,
            bridge: 8,
        };
        let expected = 0.74 * 0.45 + 0.76 * 0.35 + 0.76 * 0.2;
        assert!((score_numerology(&n) - expected).abs() < 1e-12);
    }
}
