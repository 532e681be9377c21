//! Scoring, level progression, combo tracking, and the fall-speed curve.
//!
//! Base points are 100/300/500/800 for 1-4 simultaneous clears, multiplied
//! by the current level. Each consecutive clearing lock adds a combo bonus
//! of 50% of the computed points per combo step; a clear-less lock breaks
//! the combo. Level is `total_lines / 10 + 1`, capped at [`MAX_LEVEL`].

use crate::snapshot::ScoreSnapshot;
use blockfall_types::{
    FALL_SPEEDS_MS, HARD_DROP_POINTS, LINES_PER_LEVEL, LINE_CLEAR_SCORES, MAX_LEVEL,
    SOFT_DROP_POINTS,
};
use chrono::{DateTime, Utc};

/// Mutable scoring state for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreState {
    score: u64,
    level: u32,
    total_lines: u32,
    combo: u32,
    max_combo: u32,
}

/// Level transition produced by [`ScoreState::add_lines`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChange {
    pub old_level: u32,
    pub new_level: u32,
    pub fall_speed_ms: u32,
    pub total_lines: u32,
}

/// Outcome of accounting one clearing lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineClearResult {
    /// Points awarded for this clear (level multiplier and combo bonus
    /// included).
    pub points: u64,
    /// Combo counter after this clear.
    pub combo: u32,
    pub level_up: Option<LevelChange>,
}

/// Base points for a simultaneous clear of `lines` rows. More than four
/// (unreachable under standard rules, handled defensively) decomposes into
/// multiples of four plus a remainder.
fn base_points(lines: u32) -> u64 {
    match lines {
        0 => 0,
        1..=4 => LINE_CLEAR_SCORES[lines as usize - 1],
        n => LINE_CLEAR_SCORES[3] * u64::from(n / 4) + base_points(n % 4),
    }
}

/// Points for clearing `lines` rows at `level` with the given combo streak.
///
/// Pure; the combo bonus adds 50% of the computed points per combo step,
/// floored to integer.
pub fn calculate_score(lines: u32, level: u32, combo: u32) -> u64 {
    if lines == 0 {
        return 0;
    }
    let mut points = base_points(lines) * u64::from(level);
    if combo > 0 {
        points += points * u64::from(combo) / 2;
    }
    points
}

/// Fall speed for a level, clamping out-of-range levels to the nearest
/// table entry.
pub fn fall_speed_for_level(level: u32) -> u32 {
    let idx = level.clamp(1, MAX_LEVEL) as usize - 1;
    FALL_SPEEDS_MS[idx]
}

impl ScoreState {
    pub fn new() -> Self {
        Self {
            score: 0,
            level: 1,
            total_lines: 0,
            combo: 0,
            max_combo: 0,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn total_lines(&self) -> u32 {
        self.total_lines
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    /// Fall speed for the current level.
    pub fn fall_speed_ms(&self) -> u32 {
        fall_speed_for_level(self.level)
    }

    /// Account a lock that cleared `count` lines.
    ///
    /// Scores with the pre-level-up level and the pre-increment combo, then
    /// extends the combo streak and recomputes the level. Returns the
    /// awarded points and, when the level rose, the change carrying the new
    /// fall speed.
    pub fn add_lines(&mut self, count: u32) -> LineClearResult {
        if count == 0 {
            return LineClearResult {
                points: 0,
                combo: self.combo,
                level_up: None,
            };
        }

        self.total_lines += count;

        let points = calculate_score(count, self.level, self.combo);
        self.score += points;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);

        let old_level = self.level;
        self.level = (self.total_lines / LINES_PER_LEVEL + 1).min(MAX_LEVEL);
        let level_up = (self.level > old_level).then(|| LevelChange {
            old_level,
            new_level: self.level,
            fall_speed_ms: fall_speed_for_level(self.level),
            total_lines: self.total_lines,
        });

        LineClearResult {
            points,
            combo: self.combo,
            level_up,
        }
    }

    /// +1 point per cell descended under player control.
    pub fn add_soft_drop(&mut self, distance: u32) -> u64 {
        let points = u64::from(distance) * SOFT_DROP_POINTS;
        self.score += points;
        points
    }

    /// +2 points per cell descended by a hard drop.
    pub fn add_hard_drop(&mut self, distance: u32) -> u64 {
        let points = u64::from(distance) * HARD_DROP_POINTS;
        self.score += points;
        points
    }

    /// Break the combo streak after a clear-less lock. Returns whether a
    /// streak was actually broken.
    pub fn reset_combo(&mut self) -> bool {
        let had_combo = self.combo > 0;
        self.combo = 0;
        had_combo
    }

    /// Back to the initial state: score 0, level 1, no lines, no combo.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Serializable snapshot of the progression state.
    pub fn snapshot(&self, timestamp: DateTime<Utc>) -> ScoreSnapshot {
        ScoreSnapshot {
            score: self.score,
            level: self.level,
            total_lines_cleared: self.total_lines,
            combo: self.combo,
            max_combo: self.max_combo,
            timestamp,
        }
    }

    /// Rebuild state from a saved snapshot, clamping the level into the
    /// valid range.
    pub fn restore(snapshot: &ScoreSnapshot) -> Self {
        Self {
            score: snapshot.score,
            level: snapshot.level.clamp(1, MAX_LEVEL),
            total_lines: snapshot.total_lines_cleared,
            combo: snapshot.combo,
            max_combo: snapshot.max_combo,
        }
    }
}

impl Default for ScoreState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_point_table() {
        assert_eq!(calculate_score(1, 1, 0), 100);
        assert_eq!(calculate_score(2, 1, 0), 300);
        assert_eq!(calculate_score(3, 1, 0), 500);
        assert_eq!(calculate_score(4, 1, 0), 800);
        assert_eq!(calculate_score(4, 3, 0), 2400);
        assert_eq!(calculate_score(0, 5, 3), 0);
    }

    #[test]
    fn test_oversized_clear_decomposes() {
        // 5 = 4 + 1, 8 = 4 + 4, 9 = 8 + 1.
        assert_eq!(calculate_score(5, 1, 0), 900);
        assert_eq!(calculate_score(8, 1, 0), 1600);
        assert_eq!(calculate_score(9, 2, 0), 3400);
    }

    #[test]
    fn test_combo_bonus_increases_points() {
        let no_combo = calculate_score(2, 1, 0);
        let combo_one = calculate_score(2, 1, 1);
        let combo_two = calculate_score(2, 1, 2);
        assert!(combo_one > no_combo);
        assert!(combo_two > combo_one);
        // 50% per combo step.
        assert_eq!(combo_one, 450);
        assert_eq!(combo_two, 600);
    }

    #[test]
    fn test_add_lines_progression() {
        let mut state = ScoreState::new();
        let result = state.add_lines(1);
        assert_eq!(result.points, 100);
        assert_eq!(result.combo, 1);
        assert!(result.level_up.is_none());
        assert_eq!(state.score(), 100);
        assert_eq!(state.total_lines(), 1);
    }

    #[test]
    fn test_add_lines_level_up_at_ten() {
        let mut state = ScoreState::new();
        let result = state.add_lines(10);
        let change = result.level_up.expect("expected a level up");
        assert_eq!(change.old_level, 1);
        assert_eq!(change.new_level, 2);
        assert_eq!(change.fall_speed_ms, FALL_SPEEDS_MS[1]);
        assert_eq!(change.total_lines, 10);
        assert_eq!(state.level(), 2);
    }

    #[test]
    fn test_scoring_uses_pre_level_up_level() {
        let mut state = ScoreState::new();
        // 9 lines (8 + 1) keeps us at level 1; the next quad crosses into
        // level 2 but still scores at level 1.
        state.add_lines(8);
        state.reset_combo();
        state.add_lines(1);
        state.reset_combo();
        let before = state.score();
        let result = state.add_lines(4);
        assert_eq!(result.points, 800);
        assert_eq!(state.score(), before + 800);
        assert_eq!(state.level(), 2);
    }

    #[test]
    fn test_level_caps_at_max() {
        let mut state = ScoreState::new();
        state.add_lines(1000);
        assert_eq!(state.level(), MAX_LEVEL);
    }

    #[test]
    fn test_combo_streak_and_reset() {
        let mut state = ScoreState::new();
        state.add_lines(1);
        state.add_lines(1);
        state.add_lines(1);
        assert_eq!(state.combo(), 3);
        assert_eq!(state.max_combo(), 3);

        assert!(state.reset_combo());
        assert_eq!(state.combo(), 0);
        assert_eq!(state.max_combo(), 3);
        // No streak to break the second time.
        assert!(!state.reset_combo());
    }

    #[test]
    fn test_drop_scoring() {
        let mut state = ScoreState::new();
        assert_eq!(state.add_soft_drop(3), 3);
        assert_eq!(state.add_hard_drop(10), 20);
        assert_eq!(state.score(), 23);
    }

    #[test]
    fn test_fall_speed_clamps_out_of_range() {
        assert_eq!(fall_speed_for_level(1), 1000);
        assert_eq!(fall_speed_for_level(2), 900);
        assert_eq!(fall_speed_for_level(20), 70);
        assert_eq!(fall_speed_for_level(0), 1000);
        assert_eq!(fall_speed_for_level(99), 70);
    }

    #[test]
    fn test_reset_returns_initial_state() {
        let mut state = ScoreState::new();
        state.add_lines(12);
        state.add_hard_drop(5);
        state.reset();
        assert_eq!(state, ScoreState::new());
    }
}
