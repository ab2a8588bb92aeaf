//! Player performance scoring
//!
//! Every sport starts from the same base and adds tiered bonuses for its
//! own statistical thresholds. A free-text performance note can then push
//! the score up or down and sets the trend.

use crate::domain::{PerformanceScore, SportStats, StatsLookup, Trend};

/// Starting score when stats are available
pub const BASE_SCORE: i32 = 50;

/// Generic score used when no stats could be retrieved at all
pub const FALLBACK_SCORE: i32 = 75;

const POSITIVE_BONUS: i32 = 10;
const INJURY_PENALTY: i32 = 15;

const POSITIVE_KEYWORDS: &[&str] = &["excelente", "excellent", "hot", "racha", "streak", "great"];
const INJURY_KEYWORDS: &[&str] = &[
    "lesionado", "lesión", "lesion", "injured", "injury", "malo", "poor",
];

/// Bonus for the first threshold `value` reaches. Tiers are listed highest first.
fn tier<T: PartialOrd + Copy>(value: T, tiers: &[(T, i32)]) -> i32 {
    tiers
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0)
}

/// Which kind of football player a stat line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FootballRole {
    Quarterback,
    Rusher,
    Receiver,
}

impl FootballRole {
    /// Picks the role whose yardage dominates. This is a heuristic: a
    /// low-volume player can be misclassified.
    pub fn infer(passing_yards: u32, rushing_yards: u32, receiving_yards: u32) -> Self {
        if passing_yards > rushing_yards && passing_yards > receiving_yards {
            FootballRole::Quarterback
        } else if rushing_yards > receiving_yards {
            FootballRole::Rusher
        } else {
            FootballRole::Receiver
        }
    }
}

/// Raw (unclamped) score for a stat line
pub fn stats_score(stats: &SportStats) -> i32 {
    let bonus = match *stats {
        SportStats::Basketball {
            points_per_game,
            assists_per_game,
            rebounds_per_game,
            ..
        } => {
            tier(points_per_game, &[(25.0, 20), (20.0, 15), (15.0, 10), (10.0, 5)])
                + tier(assists_per_game, &[(8.0, 10), (5.0, 5)])
                + tier(rebounds_per_game, &[(10.0, 10), (7.0, 5)])
        }
        SportStats::Hockey {
            goals,
            points_per_game,
            ..
        } => {
            tier(points_per_game, &[(1.2, 25), (1.0, 20), (0.8, 15), (0.5, 8)])
                + tier(goals, &[(40, 15), (30, 10), (20, 5)])
        }
        SportStats::Baseball {
            batting_avg,
            home_runs,
            ..
        } => {
            tier(batting_avg, &[(0.320, 20), (0.300, 15), (0.280, 10), (0.260, 5)])
                + tier(home_runs, &[(40, 20), (30, 15), (20, 10), (10, 5)])
        }
        SportStats::Football {
            passing_yards,
            passing_touchdowns,
            interceptions,
            rushing_yards,
            rushing_touchdowns,
            receptions,
            receiving_yards,
            receiving_touchdowns,
        } => match FootballRole::infer(passing_yards, rushing_yards, receiving_yards) {
            FootballRole::Quarterback => {
                let mut bonus = tier(
                    passing_yards,
                    &[(4500, 20), (4000, 15), (3000, 10), (2000, 5)],
                ) + tier(passing_touchdowns, &[(35, 15), (25, 10), (15, 5)]);
                if interceptions >= 15 {
                    bonus -= 5;
                }
                bonus
            }
            FootballRole::Rusher => {
                tier(rushing_yards, &[(1500, 25), (1000, 15), (600, 8)])
                    + tier(rushing_touchdowns, &[(12, 10), (8, 5)])
            }
            FootballRole::Receiver => {
                let mut bonus = tier(receiving_yards, &[(1400, 25), (1000, 15), (600, 8)])
                    + tier(receiving_touchdowns, &[(10, 10), (6, 5)]);
                if receptions >= 100 {
                    bonus += 5;
                }
                bonus
            }
        },
        SportStats::Soccer {
            matches_played,
            minutes_played,
            goals,
            assists,
            red_cards,
            ..
        } => {
            let mut bonus = tier(goals, &[(25, 20), (15, 15), (10, 10), (5, 5)])
                + tier(assists, &[(12, 10), (7, 7), (3, 3)])
                + tier(matches_played, &[(30, 5), (20, 3)]);

            if matches_played > 0 {
                let matches = f64::from(matches_played);
                let contributions = (f64::from(goals) + f64::from(assists)) / matches;
                bonus += tier(contributions, &[(0.8, 10), (0.5, 5)]);
                if f64::from(minutes_played) / matches >= 80.0 {
                    bonus += 5;
                }
            }
            if red_cards > 0 {
                bonus -= 5;
            }
            bonus
        }
    };

    BASE_SCORE + bonus
}

/// Adjusts `score` for a free-text performance note.
///
/// Positive keywords win over injury keywords when both appear.
pub fn apply_performance_note(score: i32, note: Option<&str>) -> (i32, Trend) {
    let Some(note) = note else {
        return (score, Trend::Stable);
    };
    let note = note.to_lowercase();

    if POSITIVE_KEYWORDS.iter().any(|word| note.contains(word)) {
        (score + POSITIVE_BONUS, Trend::Improving)
    } else if INJURY_KEYWORDS.iter().any(|word| note.contains(word)) {
        (score - INJURY_PENALTY, Trend::Declining)
    } else {
        (score, Trend::Stable)
    }
}

/// Final clamped score for a stats lookup plus optional note
pub fn score_player(lookup: &StatsLookup, note: Option<&str>) -> PerformanceScore {
    let raw = match lookup {
        StatsLookup::Found { stats, .. } => stats_score(stats),
        StatsLookup::NotFound { .. } => FALLBACK_SCORE,
    };
    let (adjusted, trend) = apply_performance_note(raw, note);
    PerformanceScore::new(adjusted, trend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rating;

    fn basketball(ppg: f64, apg: f64, rpg: f64) -> SportStats {
        SportStats::Basketball {
            games_played: 60,
            points_per_game: ppg,
            assists_per_game: apg,
            rebounds_per_game: rpg,
            field_goal_pct: 0.5,
        }
    }

    fn football(passing: u32, rushing: u32, receiving: u32) -> SportStats {
        SportStats::Football {
            passing_yards: passing,
            passing_touchdowns: 0,
            interceptions: 0,
            rushing_yards: rushing,
            rushing_touchdowns: 0,
            receptions: 0,
            receiving_yards: receiving,
            receiving_touchdowns: 0,
        }
    }

    #[test]
    fn test_basketball_tiers() {
        // 22.5 ppg (+15), 5.2 apg (+5), 6.8 rpg (+0)
        assert_eq!(stats_score(&basketball(22.5, 5.2, 6.8)), 70);
        assert_eq!(stats_score(&basketball(30.0, 9.0, 11.0)), 90);
        assert_eq!(stats_score(&basketball(2.0, 1.0, 1.0)), BASE_SCORE);
    }

    #[test]
    fn test_score_is_clamped_for_absurd_stats() {
        let lookup = StatsLookup::Found {
            stats: basketball(1e9, 1e9, 1e9),
            simulated: false,
        };
        let score = score_player(&lookup, Some("on an excellent hot streak"));
        assert_eq!(score.overall_score, 100);
        assert_eq!(score.rating, Rating::Elite);

        let hockey = StatsLookup::Found {
            stats: SportStats::Hockey {
                games_played: u32::MAX,
                goals: u32::MAX,
                assists: u32::MAX,
                points: u32::MAX,
                points_per_game: f64::MAX,
                plus_minus: i32::MAX,
            },
            simulated: false,
        };
        assert!(score_player(&hockey, None).overall_score <= 100);
    }

    #[test]
    fn test_football_role_follows_dominant_yardage() {
        assert_eq!(FootballRole::infer(3500, 250, 0), FootballRole::Quarterback);
        assert_eq!(FootballRole::infer(0, 1200, 300), FootballRole::Rusher);
        assert_eq!(FootballRole::infer(0, 100, 1100), FootballRole::Receiver);
        // A backup quarterback with little volume reads as a rusher
        assert_eq!(FootballRole::infer(150, 200, 0), FootballRole::Rusher);

        assert_eq!(stats_score(&football(4600, 0, 0)), 70);
        assert_eq!(stats_score(&football(0, 1600, 0)), 75);
        assert_eq!(stats_score(&football(0, 0, 1000)), 65);
    }

    #[test]
    fn test_soccer_efficiency_and_discipline() {
        let stats = SportStats::Soccer {
            matches_played: 30,
            minutes_played: 2550,
            goals: 20,
            assists: 8,
            shots: 90,
            shots_on_target: 45,
            yellow_cards: 2,
            red_cards: 1,
        };
        // goals +15, assists +7, matches +5, 0.93 contributions +10, 85 min/match +5, red -5
        assert_eq!(stats_score(&stats), 87);
    }

    #[test]
    fn test_performance_note_adjustments() {
        assert_eq!(
            apply_performance_note(60, Some("Está en racha")),
            (70, Trend::Improving)
        );
        assert_eq!(
            apply_performance_note(60, Some("Player INJURED last week")),
            (45, Trend::Declining)
        );
        assert_eq!(
            apply_performance_note(60, Some("quiet week")),
            (60, Trend::Stable)
        );
        assert_eq!(apply_performance_note(60, None), (60, Trend::Stable));
    }

    #[test]
    fn test_missing_stats_uses_fallback() {
        let lookup = StatsLookup::NotFound {
            error: "player not found".into(),
        };
        let score = score_player(&lookup, None);
        assert_eq!(score.overall_score, 75);
        assert_eq!(score.rating, Rating::Excellent);
    }
}
