//! Standing order within an event, and rating order across players.

use crate::models::{Player, PlayerRank};
use std::cmp::Ordering;

/// Strongest first: more wins, then fewer losses, then higher score, then lower player id.
///
/// The id tie-break makes this a strict total order over distinct players.
pub fn compare_ranks(a: &PlayerRank, b: &PlayerRank) -> Ordering {
    b.win_count
        .cmp(&a.win_count)
        .then(a.loss_count.cmp(&b.loss_count))
        .then(b.score.cmp(&a.score))
        .then(a.player_id.cmp(&b.player_id))
}

/// Sort entrants in place, strongest first.
pub fn sort_by_ranking(ranks: &mut [PlayerRank]) {
    ranks.sort_by(compare_ranks);
}

/// Highest rating first, lower id on ties.
pub fn compare_players(a: &Player, b: &Player) -> Ordering {
    b.rating.cmp(&a.rating).then(a.id.cmp(&b.id))
}

pub fn sort_by_rating(players: &mut [Player]) {
    players.sort_by(compare_players);
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn rank(id: u128, wins: u32, losses: u32, score: i64) -> PlayerRank {
        let mut player = Player::new(format!("P{id}"));
        player.id = Uuid::from_u128(id);
        let mut r = PlayerRank::new(&player, Uuid::nil());
        r.win_count = wins;
        r.loss_count = losses;
        r.score = score;
        r
    }

    #[test]
    fn wins_come_first() {
        let a = rank(1, 3, 5, -10);
        let b = rank(2, 2, 0, 100);
        assert_eq!(compare_ranks(&a, &b), Ordering::Less);
    }

    #[test]
    fn fewer_losses_break_win_ties() {
        let a = rank(1, 2, 2, 0);
        let b = rank(2, 2, 1, 0);
        assert_eq!(compare_ranks(&a, &b), Ordering::Greater);
    }

    #[test]
    fn score_then_id_break_remaining_ties() {
        let a = rank(1, 2, 1, 5);
        let b = rank(2, 2, 1, 7);
        assert_eq!(compare_ranks(&a, &b), Ordering::Greater);

        let c = rank(3, 2, 1, 7);
        assert_eq!(compare_ranks(&b, &c), Ordering::Less);
    }

    #[test]
    fn distinct_players_never_compare_equal() {
        let a = rank(1, 0, 0, 0);
        let b = rank(2, 0, 0, 0);
        assert_ne!(compare_ranks(&a, &b), Ordering::Equal);
        assert_eq!(compare_ranks(&a, &a), Ordering::Equal);
    }

    #[test]
    fn players_sorted_by_rating_then_id() {
        let mut low = Player::with_rating("low", 1600);
        low.id = Uuid::from_u128(1);
        let mut high_b = Player::with_rating("high b", 1900);
        high_b.id = Uuid::from_u128(3);
        let mut high_a = Player::with_rating("high a", 1900);
        high_a.id = Uuid::from_u128(2);

        let mut players = vec![low.clone(), high_b.clone(), high_a.clone()];
        sort_by_rating(&mut players);
        let names: Vec<_> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["high a", "high b", "low"]);
    }
}
