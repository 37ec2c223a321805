use std::collections::VecDeque;

use crate::grouping::domain::group_checker::{CheckerError, GroupChecker, MatchOutcome};
use crate::shared::frame::Frame;

pub type GroupId = u32;

/// One comparison made while placing an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchAttempt {
    /// 0 is the most recently retained image.
    pub rank: usize,
    pub outcome: MatchOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub group_id: GroupId,
    pub new_group: bool,
    pub attempts: Vec<MatchAttempt>,
}

/// Sequential grouping state machine.
///
/// Holds the id of the open group and the features of its members. A new
/// image joins the open group when it matches any retained member, checked
/// newest first with the first match winning; otherwise the retained
/// members are dropped and a new group is opened.
pub struct GroupAssigner<C: GroupChecker> {
    checker: C,
    current_group: Option<GroupId>,
    retained: VecDeque<C::Features>,
    history_limit: Option<usize>,
}

impl<C: GroupChecker> GroupAssigner<C> {
    pub fn new(checker: C) -> Self {
        Self {
            checker,
            current_group: None,
            retained: VecDeque::new(),
            history_limit: None,
        }
    }

    /// Keep at most `limit` members of the open group, evicting the oldest.
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn current_group(&self) -> Option<GroupId> {
        self.current_group
    }

    pub fn retained_len(&self) -> usize {
        self.retained.len()
    }

    pub fn assign_frame(&mut self, frame: &Frame) -> Result<Assignment, CheckerError> {
        let features = self.checker.compute_features(frame)?;
        self.assign(features)
    }

    pub fn assign(&mut self, features: C::Features) -> Result<Assignment, CheckerError> {
        let mut attempts = Vec::new();
        let mut matched = false;
        for (rank, previous) in self.retained.iter().rev().enumerate() {
            let outcome = self.checker.is_match(&features, previous)?;
            attempts.push(MatchAttempt { rank, outcome });
            if outcome.is_match {
                matched = true;
                break;
            }
        }

        let group_id = match (matched, self.current_group) {
            (true, Some(id)) => id,
            (_, current) => {
                self.retained.clear();
                current.map_or(0, |id| id + 1)
            }
        };
        let new_group = self.current_group != Some(group_id);
        self.current_group = Some(group_id);

        self.retained.push_back(features);
        if let Some(limit) = self.history_limit {
            while self.retained.len() > limit {
                self.retained.pop_front();
            }
        }

        Ok(Assignment {
            group_id,
            new_group,
            attempts,
        })
    }
}
