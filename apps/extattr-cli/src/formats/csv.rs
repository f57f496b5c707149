//! CSV reports of sync results and attribute writes
//!
//! - Sync: subject_name, distinguished_name, status, match_tier, matched_device_id, detail
//! - Writes: target, slot, action, success, diagnostic

use std::io::Write;

use extattr_sync::{SyncResult, WriteOutcome};
use serde::Serialize;

use crate::error::{CliError, CliResult};

/// CSV record for one sync result
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CsvSyncRecord {
    pub subject_name: String,
    pub distinguished_name: String,
    pub status: String,
    /// Empty when no device matched
    pub match_tier: String,
    pub matched_device_id: String,
    pub detail: String,
}

impl From<&SyncResult> for CsvSyncRecord {
    fn from(result: &SyncResult) -> Self {
        Self {
            subject_name: result.subject_name().to_string(),
            distinguished_name: result.distinguished_name().to_string(),
            status: result.status().to_string(),
            match_tier: result
                .match_tier()
                .map(|t| t.to_string())
                .unwrap_or_default(),
            matched_device_id: result.matched_remote_id().unwrap_or_default().to_string(),
            detail: result.detail().to_string(),
        }
    }
}

/// CSV record for one local write
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CsvWriteRecord {
    pub target: String,
    pub slot: u8,
    pub action: &'static str,
    pub success: bool,
    pub diagnostic: String,
}

impl From<&WriteOutcome> for CsvWriteRecord {
    fn from(outcome: &WriteOutcome) -> Self {
        Self {
            target: outcome.target.clone(),
            slot: outcome.slot,
            action: if outcome.cleared { "clear" } else { "set" },
            success: outcome.success,
            diagnostic: outcome.diagnostic.clone().unwrap_or_default(),
        }
    }
}

/// Export sync results to CSV
pub fn export_sync_csv<W: Write>(results: &[SyncResult], writer: W) -> CliResult<()> {
    write_records(results.iter().map(CsvSyncRecord::from), writer)
}

/// Export write outcomes to CSV
pub fn export_writes_csv<W: Write>(outcomes: &[WriteOutcome], writer: W) -> CliResult<()> {
    write_records(outcomes.iter().map(CsvWriteRecord::from), writer)
}

fn write_records<W, R, I>(records: I, writer: W) -> CliResult<()>
where
    W: Write,
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    let mut wtr = csv::Writer::from_writer(writer);

    for record in records {
        wtr.serialize(&record)
            .map_err(|e| CliError::Io(format!("CSV write error: {e}")))?;
    }

    wtr.flush()
        .map_err(|e| CliError::Io(format!("Failed to flush CSV: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use extattr_connector::model::{LocalObject, RemoteDevice};
    use extattr_sync::{MatchTier, RemoteMatch};

    fn local(name: &str) -> LocalObject {
        LocalObject::new(format!("CN={name},DC=corp,DC=example"), name, format!("{name}$"))
    }

    #[test]
    fn test_export_sync_csv() {
        let matched = RemoteMatch {
            device: RemoteDevice::new("dev-1", "WKS01"),
            tier: MatchTier::DisplayName,
        };
        let results = vec![
            SyncResult::success(&local("WKS01"), &matched, "set 1 attribute(s)"),
            SyncResult::no_match(&local("WKS02")),
        ];

        let mut output = Vec::new();
        export_sync_csv(&results, &mut output).unwrap();
        let csv = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "subject_name,distinguished_name,status,match_tier,matched_device_id,detail"
        );
        assert_eq!(
            lines[1],
            "WKS01$,\"CN=WKS01,DC=corp,DC=example\",success,display_name,dev-1,set 1 attribute(s)"
        );
        assert_eq!(
            lines[2],
            "WKS02$,\"CN=WKS02,DC=corp,DC=example\",no_match,,,no matching device found"
        );
    }

    #[test]
    fn test_export_writes_csv() {
        let outcomes = vec![
            WriteOutcome {
                target: "CN=WKS01,DC=corp,DC=example".to_string(),
                slot: 4,
                cleared: true,
                success: false,
                diagnostic: Some("object not found: CN=WKS01,DC=corp,DC=example".to_string()),
            },
        ];

        let mut output = Vec::new();
        export_writes_csv(&outcomes, &mut output).unwrap();
        let csv = String::from_utf8(output).unwrap();

        assert!(csv.starts_with("target,slot,action,success,diagnostic\n"));
        assert!(csv.contains(",4,clear,false,"));
    }

    #[test]
    fn test_export_empty() {
        let mut output = Vec::new();
        export_sync_csv(&[], &mut output).unwrap();
        assert!(output.is_empty());
    }
}
