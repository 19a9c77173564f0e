// Historical report-log endpoint

use secrecy::SecretString;
use tracing::debug;

use crate::client::CloudClient;
use crate::error::Error;
use crate::models::{LogEntry, LogPage};

/// Parameters for one report-log query.
#[derive(Debug, Clone)]
pub struct LogQuery<'a> {
    pub codes: &'a [&'a str],
    /// Window start, ms since epoch.
    pub start_time: i64,
    /// Window end, ms since epoch.
    pub end_time: i64,
    pub size: u32,
}

impl LogQuery<'_> {
    fn to_query_string(&self) -> String {
        format!(
            "codes={}&start_time={}&end_time={}&size={}",
            self.codes.join(","),
            self.start_time,
            self.end_time,
            self.size
        )
    }
}

impl CloudClient {
    /// Historical values for the given codes within a time window.
    ///
    /// `GET /v2.0/cloud/thing/{device_id}/report-logs?codes=..&start_time=..&end_time=..&size=..`
    pub async fn report_logs(
        &self,
        device_id: &str,
        query: &LogQuery<'_>,
        access_token: &SecretString,
    ) -> Result<Vec<LogEntry>, Error> {
        debug!(device_id, codes = ?query.codes, "fetching report logs");
        let path = format!(
            "/v2.0/cloud/thing/{device_id}/report-logs?{}",
            query.to_query_string()
        );
        let page: LogPage = self.get(&path, Some(access_token)).await?;
        Ok(page.into_entries())
    }
}
