//! Parser for BSD `netstat -ibdn` interface tables.
//!
//! ```text
//! Name    Mtu Network       Address              Ipkts Ierrs Idrop     Ibytes    Opkts Oerrs     Obytes  Coll  Drop
//! em0    1500 <Link#1>      08:00:27:aa:bb:cc    12345     0     0    9876543     6789     0     543210     0     0
//! em0       - 10.0.2.0/24   10.0.2.15            11000     -     -    9000000     6000     -     500000     -     -
//! lo0   16384 <Link#2>                             100     0     0       5000      100     0       5000     0     0
//! ```

use std::collections::HashSet;

use crate::collector::procfs::ParseError;
use crate::model::NetIOCountersStat;

/// Column count of a row that includes the link-layer address.
const FULL_ROW_COLUMNS: usize = 13;

/// Placeholder printed for counters the driver does not keep.
const NO_VALUE: &str = "-";

/// Parses `netstat -ibdn` output into one row per interface.
///
/// The first row seen for an interface wins; later rows for the same name
/// (one per address family) are skipped.
///
/// The Address column is blank for some interfaces, which drops a column.
/// That is detected purely by column count, which is brittle: a format
/// change in netstat would shift every counter silently.
pub fn parse_netstat_ibdn(content: &str) -> Result<Vec<NetIOCountersStat>, ParseError> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for line in content.lines() {
        let values: Vec<&str> = line.split_whitespace().collect();
        let Some(&name) = values.first() else {
            continue;
        };
        if name == "Name" || !seen.insert(name) {
            continue;
        }

        let base = usize::from(values.len() >= FULL_ROW_COLUMNS);
        if values.len() < FULL_ROW_COLUMNS - 1 {
            return Err(ParseError::new(format!(
                "not enough columns for {}: expected {}+, got {}",
                name,
                FULL_ROW_COLUMNS - 1,
                values.len()
            )));
        }

        let get_val = |idx: usize| -> Result<u64, ParseError> {
            let raw = values[base + idx];
            if raw == NO_VALUE {
                return Ok(0);
            }
            raw.parse()
                .map_err(|_| ParseError::new(format!("invalid counter {:?} for {}", raw, name)))
        };

        rows.push(NetIOCountersStat {
            name: name.to_string(),
            packets_recv: get_val(3)?,
            errin: get_val(4)?,
            dropin: get_val(5)?,
            bytes_recv: get_val(6)?,
            packets_sent: get_val(7)?,
            errout: get_val(8)?,
            bytes_sent: get_val(9)?,
            dropout: get_val(11)?,
        });
    }

    Ok(rows)
}
