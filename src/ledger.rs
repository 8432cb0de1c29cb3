use std::sync::{Mutex, PoisonError};

use crate::types::QueryInfo;

/// Accumulates every query outcome of one collection cycle.
#[derive(Debug, Default)]
pub struct Ledger {
    infos: Mutex<Vec<QueryInfo>>,
}

impl Ledger {
    pub fn new() -> Ledger {
        Ledger::default()
    }

    pub fn extend<I: IntoIterator<Item = QueryInfo>>(&self, infos: I) {
        self.infos
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(infos);
    }

    pub fn snapshot(&self) -> Vec<QueryInfo> {
        self.infos
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_extend_and_snapshot() {
        let ledger = Ledger::new();
        assert!(ledger.snapshot().is_empty());

        ledger.extend(vec![QueryInfo::new("chain", "url")]);
        ledger.extend(vec![
            QueryInfo::new("chain", "url-2"),
            QueryInfo::new("other", "url-3"),
        ]);

        let infos = ledger.snapshot();
        assert_eq!(infos.len(), 3);
        assert_eq!(infos[0].url, "url");
        assert_eq!(infos[2].chain, "other");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_extend() {
        let ledger = Arc::new(Ledger::new());
        let mut handles = vec![];

        for index in 0..50 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger.extend([QueryInfo::new("chain", &index.to_string())]);
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(ledger.snapshot().len(), 50);
    }
}
