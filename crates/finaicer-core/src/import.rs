//! Import of classified transactions, histories and budgets
//!
//! The external classifier returns one structured record per message. These
//! records carry no id; one is assigned here from the record contents and the
//! time it was received. Unknown transaction types are coerced to `Other`.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, Offset, Utc};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{parse_timestamp, Budgets, Transaction, TransactionType};

/// Entity used when the classifier could not name one
pub const UNKNOWN_ENTITY: &str = "Desconocido";

/// A record as produced by the external classifier
///
/// Field names follow the classifier's schema (`fecha`, `entidad`, `monto`,
/// `tipo`, `categoria`, `subcategoria`); English names are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedTransaction {
    #[serde(rename = "fecha", alias = "timestamp", alias = "date")]
    pub timestamp: String,
    #[serde(rename = "entidad", alias = "entity", default)]
    pub entity: String,
    #[serde(rename = "monto", alias = "amount")]
    pub amount: f64,
    #[serde(rename = "tipo", alias = "type")]
    pub transaction_type: String,
    #[serde(rename = "categoria", alias = "category")]
    pub category: String,
    #[serde(
        rename = "subcategoria",
        alias = "subcategory",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub subcategory: Option<String>,
    #[serde(
        rename = "rawSms",
        alias = "raw_text",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_text: Option<String>,
}

impl ClassifiedTransaction {
    /// Validate the record and turn it into a transaction with a fresh id
    ///
    /// `seq` distinguishes records received in the same instant.
    pub fn into_transaction(self, received_at: DateTime<Utc>, seq: usize) -> Result<Transaction> {
        let transaction_type = TransactionType::coerce(&self.transaction_type);
        let entity = match self.entity.trim() {
            "" => UNKNOWN_ENTITY.to_string(),
            name => name.to_string(),
        };

        let id = generate_id(
            &self.timestamp,
            &entity,
            self.amount,
            &self.category,
            received_at,
            seq,
        );

        let transaction = Transaction {
            id,
            timestamp: self.timestamp.trim().to_string(),
            entity,
            amount: self.amount,
            transaction_type,
            category: self.category.trim().to_string(),
            subcategory: self.subcategory.filter(|s| !s.trim().is_empty()),
            raw_text: self.raw_text,
        };

        validate_transaction(&transaction)?;
        Ok(transaction)
    }
}

/// Check the invariants every transaction must hold before reaching the engine
pub fn validate_transaction(tx: &Transaction) -> Result<()> {
    if tx.id.trim().is_empty() {
        return Err(Error::Import("Transaction id is empty".into()));
    }
    if !tx.amount.is_finite() || tx.amount < 0.0 {
        return Err(Error::Import(format!(
            "Transaction {}: amount must be a non-negative number (got {})",
            tx.id, tx.amount
        )));
    }
    if parse_timestamp(&tx.timestamp, Utc.fix()).is_none() {
        return Err(Error::Import(format!(
            "Transaction {}: unreadable date '{}'",
            tx.id, tx.timestamp
        )));
    }
    if tx.category.trim().is_empty() {
        return Err(Error::Import(format!(
            "Transaction {}: category is empty",
            tx.id
        )));
    }
    Ok(())
}

/// `tx_<millis>_<16 hex of sha256 over the record>`
fn generate_id(
    timestamp: &str,
    entity: &str,
    amount: f64,
    category: &str,
    received_at: DateTime<Utc>,
    seq: usize,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(timestamp.as_bytes());
    hasher.update(entity.as_bytes());
    hasher.update(amount.to_be_bytes());
    hasher.update(category.as_bytes());
    hasher.update(received_at.timestamp_nanos_opt().unwrap_or_default().to_be_bytes());
    hasher.update((seq as u64).to_be_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("tx_{}_{}", received_at.timestamp_millis(), &digest[..16])
}

/// Turn one JSON value into a transaction
///
/// Objects with an `id` are full transactions; anything else is read as a
/// classifier record and assigned an id.
pub fn transaction_from_value(
    value: Value,
    received_at: DateTime<Utc>,
    seq: usize,
) -> Result<Transaction> {
    if value.get("id").is_some() {
        let tx: Transaction = serde_json::from_value(value)?;
        validate_transaction(&tx)?;
        Ok(tx)
    } else {
        let record: ClassifiedTransaction = serde_json::from_value(value)?;
        record.into_transaction(received_at, seq)
    }
}

/// Parse a JSON array of transactions or classifier records
pub fn parse_json<R: Read>(reader: R, received_at: DateTime<Utc>) -> Result<Vec<Transaction>> {
    let values: Vec<Value> = serde_json::from_reader(reader)?;
    let transactions = values
        .into_iter()
        .enumerate()
        .map(|(seq, value)| transaction_from_value(value, received_at, seq))
        .collect::<Result<Vec<_>>>()?;

    ensure_unique_ids(&transactions)?;
    debug!(count = transactions.len(), "Parsed JSON transactions");
    Ok(transactions)
}

/// Parse classifier records from CSV (Spanish or English headers)
pub fn parse_csv<R: Read>(reader: R, received_at: DateTime<Utc>) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut transactions = Vec::new();
    for (seq, result) in rdr.deserialize::<ClassifiedTransaction>().enumerate() {
        let record = result?;
        transactions.push(record.into_transaction(received_at, seq)?);
    }

    ensure_unique_ids(&transactions)?;
    debug!(count = transactions.len(), "Parsed CSV transactions");
    Ok(transactions)
}

fn ensure_unique_ids(transactions: &[Transaction]) -> Result<()> {
    let mut seen = HashSet::new();
    for tx in transactions {
        if !seen.insert(tx.id.as_str()) {
            return Err(Error::InvalidData(format!(
                "Duplicate transaction id: {}",
                tx.id
            )));
        }
    }
    Ok(())
}

fn open(path: &Path) -> Result<BufReader<File>> {
    if !path.exists() {
        return Err(Error::NotFound(path.display().to_string()));
    }
    Ok(BufReader::new(File::open(path)?))
}

/// Load a history file; `.csv` files are read as CSV, anything else as JSON
pub fn load_history(path: &Path) -> Result<Vec<Transaction>> {
    let reader = open(path)?;
    let received_at = Utc::now();
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        parse_csv(reader, received_at)
    } else {
        parse_json(reader, received_at)
    }
}

/// Load a single transaction or classifier record from a JSON file
pub fn load_transaction(path: &Path) -> Result<Transaction> {
    let value: Value = serde_json::from_reader(open(path)?)?;
    transaction_from_value(value, Utc::now(), 0)
}

/// Parse a JSON object of category → monthly goal
pub fn parse_budgets<R: Read>(reader: R) -> Result<Budgets> {
    let budgets: Budgets = serde_json::from_reader(reader)?;
    validate_budgets(&budgets)?;
    Ok(budgets)
}

pub fn load_budgets(path: &Path) -> Result<Budgets> {
    parse_budgets(open(path)?)
}

/// Goals must be finite and non-negative
pub fn validate_budgets(budgets: &Budgets) -> Result<()> {
    for (category, goal) in budgets {
        if !goal.is_finite() || *goal < 0.0 {
            warn!(category = %category, goal, "Rejecting budget goal");
            return Err(Error::InvalidData(format!(
                "Budget goal for '{}' must be a non-negative number",
                category
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn received() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-15T17:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn record() -> ClassifiedTransaction {
        ClassifiedTransaction {
            timestamp: "2024-03-15".to_string(),
            entity: "Éxito".to_string(),
            amount: 120_000.0,
            transaction_type: "Gasto".to_string(),
            category: "Compras".to_string(),
            subcategory: Some("Supermercado".to_string()),
            raw_text: Some("Compra aprobada por $120.000 en Éxito".to_string()),
        }
    }

    #[test]
    fn test_into_transaction() {
        let tx = record().into_transaction(received(), 0).unwrap();
        assert!(tx.id.starts_with("tx_1710522000000_"));
        assert_eq!(tx.transaction_type, TransactionType::Expense);
        assert_eq!(tx.entity, "Éxito");
        assert_eq!(tx.subcategory.as_deref(), Some("Supermercado"));
    }

    #[test]
    fn test_ids_differ_by_sequence_and_time() {
        let a = record().into_transaction(received(), 0).unwrap();
        let b = record().into_transaction(received(), 1).unwrap();
        let c = record()
            .into_transaction(received() + chrono::Duration::milliseconds(1), 0)
            .unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_unknown_type_and_missing_entity() {
        let mut rec = record();
        rec.transaction_type = "Préstamo".to_string();
        rec.entity = "  ".to_string();
        let tx = rec.into_transaction(received(), 0).unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Other);
        assert_eq!(tx.entity, UNKNOWN_ENTITY);
    }

    #[test]
    fn test_rejects_invalid_records() {
        let mut negative = record();
        negative.amount = -5.0;
        assert!(matches!(
            negative.into_transaction(received(), 0),
            Err(Error::Import(_))
        ));

        let mut nan = record();
        nan.amount = f64::NAN;
        assert!(nan.into_transaction(received(), 0).is_err());

        let mut bad_date = record();
        bad_date.timestamp = "ayer".to_string();
        assert!(bad_date.into_transaction(received(), 0).is_err());

        let mut no_category = record();
        no_category.category = "".to_string();
        assert!(no_category.into_transaction(received(), 0).is_err());
    }

    #[test]
    fn test_parse_json_mixed() {
        let json = r#"[
            {"fecha": "2024-03-01", "entidad": "NOMINA EMPRESA", "monto": 1200000, "tipo": "Ingreso", "categoria": "Nómina"},
            {"id": "tx_fixed", "timestamp": "2024-03-02", "entity": "Claro", "amount": 95300, "type": "expense", "category": "Servicios"}
        ]"#;
        let txs = parse_json(json.as_bytes(), received()).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].transaction_type, TransactionType::Income);
        assert_eq!(txs[1].id, "tx_fixed");
    }

    #[test]
    fn test_parse_json_rejects_duplicate_ids() {
        let json = r#"[
            {"id": "same", "timestamp": "2024-03-02", "entity": "A", "amount": 1, "type": "expense", "category": "X"},
            {"id": "same", "timestamp": "2024-03-03", "entity": "B", "amount": 2, "type": "expense", "category": "X"}
        ]"#;
        assert!(matches!(
            parse_json(json.as_bytes(), received()),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_parse_csv_spanish_headers() {
        let csv = "fecha,entidad,monto,tipo,categoria,subcategoria\n\
                   2024-03-01,NOMINA EMPRESA,2000000,Ingreso,Nómina,\n\
                   2024-03-02,Éxito,120000,Gasto,Compras,Supermercado\n\
                   2024-03-03,Cajero,200000,Retiro,Retiro en efectivo,\n";
        let txs = parse_csv(csv.as_bytes(), received()).unwrap();
        assert_eq!(txs.len(), 3);
        assert_eq!(txs[0].subcategory, None);
        assert_eq!(txs[1].subcategory.as_deref(), Some("Supermercado"));
        assert_eq!(txs[2].transaction_type, TransactionType::Withdrawal);
    }

    #[test]
    fn test_parse_csv_english_headers() {
        let csv = "timestamp,entity,amount,type,category\n2024-03-02,Uber,18000,expense,Transporte\n";
        let txs = parse_csv(csv.as_bytes(), received()).unwrap();
        assert_eq!(txs[0].entity, "Uber");
        assert_eq!(txs[0].amount, 18_000.0);
    }

    #[test]
    fn test_parse_budgets() {
        let budgets = parse_budgets(r#"{"Compras": 480000, "Transporte": 320000}"#.as_bytes()).unwrap();
        assert_eq!(budgets["Compras"], 480_000.0);

        assert!(parse_budgets(r#"{"Compras": -1}"#.as_bytes()).is_err());
        assert!(parse_budgets(r#"["Compras"]"#.as_bytes()).is_err());
    }

    #[test]
    fn test_load_history_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("history.csv");
        let mut file = File::create(&csv_path).unwrap();
        writeln!(file, "fecha,entidad,monto,tipo,categoria").unwrap();
        writeln!(file, "2024-03-02,Uber,18000,Gasto,Transporte").unwrap();
        assert_eq!(load_history(&csv_path).unwrap().len(), 1);

        let json_path = dir.path().join("history.json");
        std::fs::write(&json_path, "[]").unwrap();
        assert!(load_history(&json_path).unwrap().is_empty());

        let missing = dir.path().join("missing.json");
        assert!(matches!(load_history(&missing), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_load_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tx.json");
        std::fs::write(
            &path,
            r#"{"fecha": "2024-03-02", "entidad": "Uber", "monto": 18000, "tipo": "Gasto", "categoria": "Transporte"}"#,
        )
        .unwrap();
        let tx = load_transaction(&path).unwrap();
        assert_eq!(tx.category, "Transporte");
    }
}
