//! Blocking adapters for the async networked drivers.
//!
//! Each networked connection owns a current-thread runtime and drives every
//! driver future to completion with `block_on`. No tasks are spawned.

use futures::stream::{LocalBoxStream, StreamExt};
use tokio::runtime::{Builder, Runtime};

use crate::backend::BackendKind;
use crate::error::{ConnectionError, DriverError};
use crate::session::{Row, RowSet};

/// Build the runtime a networked connection runs on.
pub(crate) fn runtime(backend: BackendKind) -> Result<Runtime, ConnectionError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ConnectionError::driver(backend, e))
}

/// Wrap a driver row stream into a [`RowSet`].
///
/// The first row is fetched immediately so that statement errors surface
/// from the call that ran the statement; the rest are pulled on demand.
pub(crate) fn row_set<'c, R: 'c>(
    runtime: &'c Runtime,
    mut stream: LocalBoxStream<'c, Result<R, DriverError>>,
    column_names: fn(&R) -> Vec<String>,
    decode: fn(R) -> Row,
) -> Result<RowSet<'c>, DriverError> {
    let first = runtime.block_on(stream.next()).transpose()?;
    let columns = first.as_ref().map(column_names).unwrap_or_default();

    let rest = std::iter::from_fn(move || runtime.block_on(stream.next()));
    let rows = first
        .map(Ok)
        .into_iter()
        .chain(rest)
        .fuse()
        .map(move |row| row.map(decode));

    Ok(RowSet::new(columns, Box::new(rows)))
}
