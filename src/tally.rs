use serde::Serialize;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use crate::api_models::Poll;
use crate::error::AppError;

/**
 * The single poll residents are asked about
 */
pub static POLL: Poll = Poll {
    id: 1,
    question: "Do you support the expansion of CapMetro rail services to more areas of Austin?",
    options: ["yes", "no", "unsure"],
    category: "transit",
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteOption {
    Yes,
    No,
    Unsure,
}

impl FromStr for VoteOption {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(VoteOption::Yes),
            "no" => Ok(VoteOption::No),
            "unsure" => Ok(VoteOption::Unsure),
            _ => Err(AppError::InvalidOption),
        }
    }
}

/**
 * Snapshot of the poll results
 */
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub yes: u64,
    pub no: u64,
    pub unsure: u64,
}

impl Tally {
    pub fn total(&self) -> u64 {
        self.yes + self.no + self.unsure
    }
}

/**
 * Running counters for the poll
 */
#[derive(Debug, Default)]
pub struct VoteTally {
    counts: Mutex<Tally>,
}

impl VoteTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Tally {
        *self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /**
     * Record one vote, anything but yes/no/unsure is rejected without touching the counters
     */
    pub fn cast(&self, option: &str) -> Result<Tally, AppError> {
        let option: VoteOption = option.parse()?;
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        match option {
            VoteOption::Yes => counts.yes += 1,
            VoteOption::No => counts.no += 1,
            VoteOption::Unsure => counts.unsure += 1,
        }
        Ok(*counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn total_matches_number_of_votes() {
        let tally = VoteTally::new();
        let ballots = ["yes", "no", "yes", "unsure", "yes", "no", "unsure"];
        for ballot in &ballots {
            tally.cast(ballot).unwrap();
        }

        let state = tally.state();
        assert_eq!(state, Tally { yes: 3, no: 2, unsure: 2 });
        assert_eq!(state.total(), ballots.len() as u64);
    }

    #[test]
    fn invalid_options_never_count() {
        let tally = VoteTally::new();
        tally.cast("yes").unwrap();

        for bogus in &["maybe", "", "YES", " yes"] {
            assert!(matches!(tally.cast(bogus), Err(AppError::InvalidOption)));
        }
        assert_eq!(tally.state(), Tally { yes: 1, no: 0, unsure: 0 });
    }

    #[test]
    fn concurrent_votes_are_all_counted() {
        let tally = Arc::new(VoteTally::new());
        let handles: Vec<_> = ["yes", "no", "unsure", "yes"]
            .iter()
            .map(|option| {
                let tally = tally.clone();
                let option = option.to_string();
                thread::spawn(move || {
                    for _ in 0..500 {
                        tally.cast(&option).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let state = tally.state();
        assert_eq!(state, Tally { yes: 1000, no: 500, unsure: 500 });
        assert_eq!(state.total(), 2000);
    }
}
