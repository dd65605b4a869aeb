use std::collections::BTreeMap;

use bytes::Bytes;

use crate::error::{RadioError, Result};

/// Key under which the terminating, unkeyed `RPRM` line is stored.
pub const CATCH_ALL_KEY: &str = "_";
/// Parameter holding the node number.
pub const NODE_ID_KEY: &str = "STNN";
/// Flag in the terminating line that means text mode is on.
pub const TEXT_MODE_FLAG: &str = "ECIO";

/// Parameters dumped by `RPRM`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleParams {
    entries: BTreeMap<String, Bytes>,
}

impl ModuleParams {
    /// Record one response line. Returns `true` once the dump is complete.
    ///
    /// `KEY:VALUE` lines are split at the first colon. A line with no colon,
    /// or keyed with [`CATCH_ALL_KEY`] itself, ends the dump and is stored
    /// under [`CATCH_ALL_KEY`].
    pub fn push_line(&mut self, line: &[u8]) -> bool {
        let Some(colon) = line.iter().position(|&b| b == b':') else {
            self.entries
                .insert(CATCH_ALL_KEY.to_string(), Bytes::copy_from_slice(line));
            return true;
        };

        let key = String::from_utf8_lossy(&line[..colon]).into_owned();
        let value = Bytes::copy_from_slice(&line[colon + 1..]);
        let done = key == CATCH_ALL_KEY;
        self.entries.insert(key, value);
        done
    }

    /// Raw value of `key`.
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Bytes::as_ref)
    }

    /// Value of `key` as text, with invalid UTF-8 replaced.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|value| String::from_utf8_lossy(value).into_owned())
    }

    /// The terminating line.
    pub fn catch_all(&self) -> Option<&[u8]> {
        self.get(CATCH_ALL_KEY)
    }

    /// Whether the terminating line reports text mode.
    pub fn text_mode(&self) -> bool {
        self.catch_all()
            .map(|flags| {
                flags
                    .windows(TEXT_MODE_FLAG.len())
                    .any(|window| window == TEXT_MODE_FLAG.as_bytes())
            })
            .unwrap_or(false)
    }

    /// Node number from `STNN`, as decimal.
    pub fn node_id(&self) -> Result<u32> {
        let value = self
            .get_str(NODE_ID_KEY)
            .ok_or_else(|| RadioError::MissingParameter(NODE_ID_KEY.to_string()))?;
        value
            .trim()
            .parse::<u32>()
            .map_err(|_| RadioError::InvalidNodeId(value))
    }

    /// Iterate over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_ref()))
    }

    /// Number of entries, the terminating line included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(lines: &[&str]) -> ModuleParams {
        let mut params = ModuleParams::default();
        for line in lines {
            params.push_line(line.as_bytes());
        }
        params
    }

    #[test]
    fn keyed_lines_continue() {
        let mut params = ModuleParams::default();
        assert!(!params.push_line(b"ID:0001"));
        assert!(!params.push_line(b"STNN:7"));
        assert_eq!(params.get("ID"), Some(&b"0001"[..]));
    }

    #[test]
    fn unkeyed_line_terminates() {
        let mut params = ModuleParams::default();
        assert!(params.push_line(b"ECIO DSRX"));
        assert_eq!(params.catch_all(), Some(&b"ECIO DSRX"[..]));
    }

    #[test]
    fn reserved_key_terminates() {
        let mut params = ModuleParams::default();
        assert!(params.push_line(b"_:ECIO"));
        assert_eq!(params.catch_all(), Some(&b"ECIO"[..]));
        assert!(params.text_mode());
    }

    #[test]
    fn split_at_first_colon_only() {
        let params = params(&["RDVR:01:02"]);
        assert_eq!(params.get_str("RDVR").as_deref(), Some("01:02"));
    }

    #[test]
    fn node_id_and_text_mode() {
        let params = params(&["STNN:7", "_:ECIO"]);
        assert_eq!(params.node_id().unwrap(), 7);
        assert!(params.text_mode());
    }

    #[test]
    fn node_id_accepts_leading_zeros() {
        let params = params(&["STNN:0042", "DCIO"]);
        assert_eq!(params.node_id().unwrap(), 42);
        assert!(!params.text_mode());
    }

    #[test]
    fn node_id_missing() {
        let params = params(&["DCIO"]);
        assert!(matches!(
            params.node_id(),
            Err(RadioError::MissingParameter(key)) if key == NODE_ID_KEY
        ));
    }

    #[test]
    fn node_id_not_decimal() {
        let params = params(&["STNN:00ff", "DCIO"]);
        assert!(matches!(
            params.node_id(),
            Err(RadioError::InvalidNodeId(value)) if value == "00ff"
        ));
    }

    #[test]
    fn iter_in_key_order() {
        let params = params(&["STNN:7", "ID:1", "ECIO"]);
        let keys: Vec<_> = params.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["ID", "STNN", "_"]);
        assert_eq!(params.len(), 3);
        assert!(!params.is_empty());
    }
}
