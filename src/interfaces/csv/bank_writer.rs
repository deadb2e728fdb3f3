use crate::domain::bank::Bank;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct BankRow<'a> {
    bank_id: &'a str,
    bank_name: &'a str,
    status: &'a str,
}

/// Writes the bank directory as CSV with the header `bank_id,bank_name,status`.
pub struct BankWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BankWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_banks<'a>(&mut self, banks: impl IntoIterator<Item = &'a Bank>) -> Result<()> {
        for bank in banks {
            self.writer.serialize(BankRow {
                bank_id: &bank.bank_id,
                bank_name: &bank.bank_name,
                status: bank.status.as_str(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bank::BankStatus;

    #[test]
    fn test_writes_header_and_rows() {
        let banks = vec![
            Bank {
                bank_id: "natwest".to_string(),
                bank_name: "NatWest".to_string(),
                bank_logo: None,
                status: BankStatus::Online,
            },
            Bank {
                bank_id: "bos".to_string(),
                bank_name: "Bank of Scotland, Personal".to_string(),
                bank_logo: Some("https://cdn/bos.png".to_string()),
                status: BankStatus::Issues,
            },
        ];

        let mut out = Vec::new();
        BankWriter::new(&mut out).write_banks(&banks).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "bank_id,bank_name,status\nnatwest,NatWest,online\nbos,\"Bank of Scotland, Personal\",issues\n"
        );
    }

    #[test]
    fn test_empty_list_writes_nothing() {
        let mut out = Vec::new();
        BankWriter::new(&mut out).write_banks(&[]).unwrap();
        assert!(out.is_empty());
    }
}
