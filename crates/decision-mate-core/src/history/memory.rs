use std::collections::HashMap;

use super::{check_user, DecisionHistory, DecisionRecord};
use crate::DecisionResult;

/// Process-local history, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    records: HashMap<String, Vec<DecisionRecord>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> Vec<&str> {
        let mut users: Vec<&str> = self.records.keys().map(String::as_str).collect();
        users.sort_unstable();
        users
    }
}

impl DecisionHistory for InMemoryHistory {
    fn append(&mut self, user: &str, record: DecisionRecord) -> DecisionResult<()> {
        let user = check_user(user)?;
        self.records.entry(user.to_string()).or_default().push(record);
        Ok(())
    }

    fn list(&self, user: &str) -> DecisionResult<Vec<DecisionRecord>> {
        let user = check_user(user)?;
        Ok(self.records.get(user).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::fixtures::business_record;

    #[test]
    fn test_append_then_list_in_order() {
        let mut history = InMemoryHistory::new();
        history.append("ana", business_record(1)).unwrap();
        history.append("ana", business_record(2)).unwrap();

        let records = history.list("ana").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], business_record(2));
    }

    #[test]
    fn test_users_are_isolated() {
        let mut history = InMemoryHistory::new();
        history.append("ana", business_record(1)).unwrap();
        assert!(history.list("ben").unwrap().is_empty());
        assert_eq!(history.users(), vec!["ana"]);
    }

    #[test]
    fn test_blank_user_rejected() {
        let mut history = InMemoryHistory::new();
        assert!(history.append("", business_record(1)).is_err());
    }
}
