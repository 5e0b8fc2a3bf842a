//! osmChange parsing.

use crate::reader::{walk, Layout};
use crate::{OscError, OscResult};
use adiff_types::ChangeRecord;
use tracing::debug;

/// Parses an osmChange document into change records, in document order.
///
/// Repeated edits to one element are kept as separate records; collapsing
/// them is the deduplicator's job.
pub fn parse_change_list(xml: &str) -> OscResult<Vec<ChangeRecord>> {
    let mut records = Vec::new();
    walk(xml, Layout::Change, |operation, element| {
        let operation = operation
            .ok_or_else(|| OscError::Malformed(format!("{} outside a change bucket", element.key())))?;
        records.push(ChangeRecord::new(operation, element));
        Ok(())
    })?;
    debug!("Parsed {} change records", records.len());
    Ok(records)
}
