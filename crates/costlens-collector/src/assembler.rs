//! Report assembly: stamps merged records with the run's reporting context.

use chrono::{DateTime, Utc};
use costlens_types::{AccountId, ReportKind, ReportRecord, ResourceRecord};

/// Stateless converter from [`ResourceRecord`] to [`ReportRecord`].
///
/// Account, timestamp and kind are fixed once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportAssembler {
    account: AccountId,
    report_date: DateTime<Utc>,
    kind: ReportKind,
}

impl ReportAssembler {
    pub fn new(account: AccountId, report_date: DateTime<Utc>, kind: ReportKind) -> Self {
        Self {
            account,
            report_date,
            kind,
        }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn report_date(&self) -> DateTime<Utc> {
        self.report_date
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn assemble(&self, record: ResourceRecord) -> ReportRecord {
        ReportRecord {
            account: self.account.clone(),
            report_date: self.report_date,
            report_type: self.kind,
            instance: record,
        }
    }

    pub fn assemble_all(&self, records: impl IntoIterator<Item = ResourceRecord>) -> Vec<ReportRecord> {
        records.into_iter().map(|r| self.assemble(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use costlens_types::Region;

    #[test]
    fn test_one_report_per_record_with_fixed_stamps() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap();
        let assembler = ReportAssembler::new(AccountId::new("123456789012"), at, ReportKind::Daily);

        let inputs: Vec<ResourceRecord> = (0..3)
            .map(|i| {
                ResourceRecord::new(format!("ri-{i}"), &Region::from("us-east-1"), "m5.large")
                    .with_tag("env", "prod")
                    .with_pricing(100.0 * i as f64, 0.01)
            })
            .collect();

        let reports = assembler.assemble_all(inputs.clone());

        assert_eq!(reports.len(), inputs.len());
        for (report, input) in reports.iter().zip(&inputs) {
            assert_eq!(report.account, AccountId::new("123456789012"));
            assert_eq!(report.report_date, at);
            assert_eq!(report.report_type, ReportKind::Daily);
            assert_eq!(&report.instance, input);
        }
    }

    #[test]
    fn test_empty_input() {
        let assembler = ReportAssembler::new(AccountId::new("1"), Utc::now(), ReportKind::Monthly);
        assert!(assembler.assemble_all(Vec::new()).is_empty());
        assert_eq!(assembler.kind(), ReportKind::Monthly);
    }
}
