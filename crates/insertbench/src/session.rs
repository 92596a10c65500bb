//! The capability every driver implements, and the rows it hands back.

use std::fmt;

use crate::backend::BackendKind;
use crate::error::DriverError;

/// A live, exclusively owned database session.
///
/// Implementations block until the driver call completes.
pub trait Session {
    /// Backend this session talks to.
    fn backend(&self) -> BackendKind;

    /// Run a statement that changes data or schema and commit it.
    fn execute_mutation(&mut self, sql: &str) -> Result<(), DriverError>;

    /// Run a statement that returns rows.
    ///
    /// The returned [`RowSet`] borrows the session, so it has to be consumed
    /// or dropped before the next statement.
    fn query<'c>(&'c mut self, sql: &'c str) -> Result<RowSet<'c>, DriverError>;

    /// Close the session, releasing its file handle or socket.
    fn close(self) -> Result<(), DriverError>
    where
        Self: Sized;
}

/// A single column value, as decoded from any backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Uuid(uuid::Uuid),
    /// A value of a type the decoder does not map; holds the type name.
    Other(String),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => f.write_str(s),
            Value::Blob(b) => write!(f, "<{} bytes>", b.len()),
            Value::Uuid(u) => write!(f, "{u}"),
            Value::Other(type_name) => write!(f, "<{type_name}>"),
        }
    }
}

/// One row of a result set.
pub type Row = Vec<Value>;

/// Rows produced by a read statement.
///
/// Iterating pulls rows from the driver; a driver failure mid-stream is
/// yielded as an `Err` item.
pub struct RowSet<'c> {
    columns: Vec<String>,
    rows: Box<dyn Iterator<Item = Result<Row, DriverError>> + 'c>,
}

impl<'c> RowSet<'c> {
    pub fn new(
        columns: Vec<String>,
        rows: Box<dyn Iterator<Item = Result<Row, DriverError>> + 'c>,
    ) -> Self {
        Self { columns, rows }
    }

    /// Column names, in select-list order.
    ///
    /// Streaming drivers learn the names from the first row, so a result
    /// with no rows may report no columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Drain the remaining rows.
    pub fn collect_rows(self) -> Result<Vec<Row>, DriverError> {
        self.collect()
    }
}

impl Iterator for RowSet<'_> {
    type Item = Result<Row, DriverError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}

impl fmt::Debug for RowSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowSet")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_set_yields_rows_in_order() {
        let rows: Vec<Result<Row, DriverError>> = vec![
            Ok(vec![Value::Integer(1), Value::Text("a".into())]),
            Ok(vec![Value::Integer(2), Value::Null]),
        ];
        let set = RowSet::new(
            vec!["id".into(), "name".into()],
            Box::new(rows.into_iter()),
        );

        assert_eq!(set.columns(), ["id", "name"]);
        let collected = set.collect_rows().unwrap();
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[1][0].as_integer(), Some(2));
        assert_eq!(collected[0][1].as_text(), Some("a"));
    }

    #[test]
    fn test_row_set_surfaces_stream_errors() {
        let rows = vec![Ok(vec![Value::Integer(1)]), Err(DriverError::new("connection reset"))];
        let set = RowSet::new(vec!["id".into()], Box::new(rows.into_iter()));
        assert_eq!(
            set.collect_rows().unwrap_err(),
            DriverError::new("connection reset")
        );
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Blob(vec![1, 2, 3]).to_string(), "<3 bytes>");
        assert_eq!(Value::Other("money".into()).to_string(), "<money>");
    }
}
