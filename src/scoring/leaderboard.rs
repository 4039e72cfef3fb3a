use crate::models::{LeaderboardEntry, LeaderboardRecord, PlayerProfile};

/// Replace the row for `record.address`, or append it.
pub fn upsert(records: &mut Vec<LeaderboardRecord>, record: LeaderboardRecord) {
    match records.iter_mut().find(|r| r.address == record.address) {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
}

/// Sort by total score descending and rank 1..=N.
///
/// Ranks are dense positions, not competition ranks: equal totals keep
/// arrival order and still get distinct ranks.
pub fn project<I>(records: I) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = LeaderboardRecord>,
{
    let mut records: Vec<LeaderboardRecord> = records.into_iter().collect();
    // sort_by is stable
    records.sort_by(|a, b| b.total_score.cmp(&a.total_score));

    records
        .into_iter()
        .enumerate()
        .map(|(index, r)| LeaderboardEntry {
            rank: index as u32 + 1,
            address: r.address,
            display_name: r.display_name,
            total_score: r.total_score,
            tokens_earned: r.tokens_earned,
            badges: r.badges,
        })
        .collect()
}

/// Same projection computed straight from player profiles, in arrival order.
pub fn project_profiles<'a, I>(profiles: I) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = &'a PlayerProfile>,
{
    project(profiles.into_iter().map(LeaderboardRecord::from_profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(address: &str, total_score: i64) -> LeaderboardRecord {
        LeaderboardRecord {
            address: address.to_string(),
            display_name: format!("Player_{}", address),
            total_score,
            tokens_earned: 0,
            badges: 0,
        }
    }

    #[test]
    fn test_single_submission_scenario() {
        let mut records = Vec::new();
        upsert(&mut records, record("A", 100));
        let board = project(records);

        assert_eq!(board.len(), 1);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].address, "A");
        assert_eq!(board[0].total_score, 100);
    }

    #[test]
    fn test_empty_input() {
        assert!(project(Vec::new()).is_empty());
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut records = vec![record("A", 10), record("B", 20)];
        upsert(&mut records, record("A", 30));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].address, "A");
        assert_eq!(records[0].total_score, 30);
    }

    #[test]
    fn test_ties_keep_arrival_order() {
        let board = project(vec![record("A", 50), record("B", 80), record("C", 50)]);
        let order: Vec<_> = board.iter().map(|e| (e.rank, e.address.as_str())).collect();
        assert_eq!(order, vec![(1, "B"), (2, "A"), (3, "C")]);
    }

    #[test]
    fn test_profiles_and_records_project_identically() {
        let mut a = PlayerProfile::new("AAAA");
        a.stats.total_score = 10;
        let mut b = PlayerProfile::new("BBBB");
        b.stats.total_score = 40;
        b.stats.add_badge("First Steps");

        let from_profiles = project_profiles([&a, &b]);
        let mut records = Vec::new();
        upsert(&mut records, LeaderboardRecord::from_profile(&a));
        upsert(&mut records, LeaderboardRecord::from_profile(&b));

        assert_eq!(from_profiles, project(records));
        assert_eq!(from_profiles[0].badges, 1);
    }

    proptest! {
        #[test]
        fn prop_board_is_sorted_and_densely_ranked(
            submissions in prop::collection::vec((0usize..6, 0i64..500), 0..40)
        ) {
            let mut records: Vec<LeaderboardRecord> = Vec::new();
            for (player, score) in submissions {
                let address = format!("P{}", player);
                let total = records
                    .iter()
                    .find(|r| r.address == address)
                    .map_or(0, |r| r.total_score);
                upsert(&mut records, record(&address, total + score));
            }

            let board = project(records.clone());
            prop_assert_eq!(board.len(), records.len());
            for (i, entry) in board.iter().enumerate() {
                prop_assert_eq!(entry.rank as usize, i + 1);
            }
            for pair in board.windows(2) {
                prop_assert!(pair[0].total_score >= pair[1].total_score);
            }
        }
    }
}
