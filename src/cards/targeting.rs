//! Metric-based target selection for events
//!
//! Ties always go to the lowest player id: players are scanned in id order
//! and a later player only replaces the pick on a strict improvement.

use crate::core::types::PlayerId;
use crate::entity::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Max,
    Min,
}

/// Player with the extreme value of `metric` among `candidates`
pub fn select<'a, I, F>(candidates: I, extreme: Extreme, metric: F) -> Option<PlayerId>
where
    I: IntoIterator<Item = &'a Player>,
    F: Fn(&Player) -> i64,
{
    let mut ordered: Vec<&Player> = candidates.into_iter().collect();
    ordered.sort_by_key(|p| p.id);

    let mut best: Option<(PlayerId, i64)> = None;
    for player in ordered {
        let value = metric(player);
        let better = match best {
            None => true,
            Some((_, current)) => match extreme {
                Extreme::Max => value > current,
                Extreme::Min => value < current,
            },
        };
        if better {
            best = Some((player.id, value));
        }
    }
    best.map(|(id, _)| id)
}

pub fn most<'a, I, F>(candidates: I, metric: F) -> Option<PlayerId>
where
    I: IntoIterator<Item = &'a Player>,
    F: Fn(&Player) -> i64,
{
    select(candidates, Extreme::Max, metric)
}

pub fn least<'a, I, F>(candidates: I, metric: F) -> Option<PlayerId>
where
    I: IntoIterator<Item = &'a Player>,
    F: Fn(&Player) -> i64,
{
    select(candidates, Extreme::Min, metric)
}
