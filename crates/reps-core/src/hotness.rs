use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use reps_types::models::Ticket;

/// Seconds in one decay unit. Tickets younger than this rank by raw votes.
pub const DECAY_UNIT_SECS: f64 = 86_400.0;

/// Score for a ticket with `votes` votes that is `age_secs` old.
///
/// Under one day old the score is the vote count; after that it decays
/// linearly with age in days.
pub fn hot_score(votes: usize, age_secs: f64) -> f64 {
    let t = age_secs / DECAY_UNIT_SECS;
    let votes = votes as f64;
    if t < 1.0 { votes } else { votes / t }
}

pub fn ticket_score(ticket: &Ticket, now: DateTime<Utc>) -> f64 {
    let age = (now - ticket.created_at).num_milliseconds() as f64 / 1000.0;
    hot_score(ticket.votes(), age)
}

/// Sort tickets hottest first. Equal scores fall back to ascending id so the
/// order is stable between requests.
pub fn rank_by_hotness(tickets: &mut [Ticket], now: DateTime<Utc>) {
    tickets.sort_by(|a, b| {
        let sa = ticket_score(a, now);
        let sb = ticket_score(b, now);
        match sb.total_cmp(&sa) {
            Ordering::Equal => a.id.cmp(&b.id),
            other => other,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ticket(id: i64, votes: usize, age: Duration, now: DateTime<Utc>) -> Ticket {
        Ticket {
            id,
            title: format!("ticket {id}"),
            description: "desc".into(),
            category: "General".into(),
            created_at: now - age,
            is_resolved: false,
            voters: (0..votes).map(|v| format!("fp{v}")).collect(),
            comments_count: 0,
        }
    }

    #[test]
    fn young_tickets_score_raw_votes() {
        assert_eq!(hot_score(5, 3600.0), 5.0);
        assert_eq!(hot_score(5, 86_399.0), 5.0);
    }

    #[test]
    fn old_tickets_decay_with_age() {
        assert_eq!(hot_score(10, 2.0 * 86_400.0), 5.0);
        assert_eq!(hot_score(10, 86_400.0), 10.0);
    }

    #[test]
    fn ranking_prefers_fresh_votes() {
        let now = Utc::now();
        let mut tickets = vec![
            ticket(1, 10, Duration::days(10), now), // 1.0
            ticket(2, 3, Duration::hours(2), now),  // 3.0
            ticket(3, 8, Duration::days(2), now),   // 4.0
        ];
        rank_by_hotness(&mut tickets, now);
        let ids: Vec<i64> = tickets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let now = Utc::now();
        let mut tickets = vec![
            ticket(7, 2, Duration::hours(1), now),
            ticket(4, 2, Duration::hours(5), now),
            ticket(5, 2, Duration::minutes(1), now),
        ];
        rank_by_hotness(&mut tickets, now);
        let ids: Vec<i64> = tickets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4, 5, 7]);
    }
}
