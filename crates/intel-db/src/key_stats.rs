use intel_core::KeyStat;

use crate::record::{map_records, ColumnSpec, Record, RowError};

pub const PROCEDURE: &str = "GetConsumerHomePageKeyStats";
pub(crate) const STATEMENT: &str = "EXEC GetConsumerHomePageKeyStats @SiteName = @P1";

const NAME: ColumnSpec = ColumnSpec::text("Name");
const VALUE: ColumnSpec = ColumnSpec::integer("Value");

pub const COLUMNS: [ColumnSpec; 2] = [NAME, VALUE];

/// # Errors
///
/// Returns [`RowError`] if either column holds a value of the wrong kind.
pub fn map_row(record: &Record) -> Result<KeyStat, RowError> {
    Ok(KeyStat {
        name: record.text(NAME)?,
        value: record.integer(VALUE)?,
    })
}

/// Maps readable rows in result-set order.
#[must_use]
pub fn map_rows(records: Vec<Record>) -> Vec<KeyStat> {
    map_records(PROCEDURE, records, map_row)
}
