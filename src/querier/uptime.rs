use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prometheus::Gauge;

use crate::error::Error;

use super::{opts, Cycle, Querier, QuerierOutput};

#[derive(Debug)]
pub struct UptimeQuerier {
    start_time: DateTime<Utc>,
}

impl UptimeQuerier {
    pub fn new(start_time: DateTime<Utc>) -> UptimeQuerier {
        UptimeQuerier { start_time }
    }
}

#[async_trait]
impl Querier for UptimeQuerier {
    fn name(&self) -> &'static str {
        "uptime"
    }

    async fn get_metrics(&self, _cycle: &Cycle) -> Result<QuerierOutput, Error> {
        let start_time = Gauge::with_opts(opts(
            "start_time",
            "Unix timestamp on when the app was started. Useful for annotations.",
        ))?;
        start_time.set(self.start_time.timestamp() as f64);

        Ok(QuerierOutput::new(vec![Box::new(start_time)], vec![]))
    }
}
