//! Decision memory: ticket id → last applied resolution.
//!
//! Backed by an append-only text store, one line per write:
//! `TICKET|STATE_NAME|STATE_VALUE|SHORT_DESC`. The store is read once at
//! startup; later lines for the same ticket overwrite earlier ones in the
//! resulting map (log compaction on read). Writes append, never rewrite
//! history. `put` is advisory persistence: any I/O failure is dropped and
//! the in-memory map stays authoritative for the rest of the run.
//!
//! The map only grows: one entry per distinct ticket ever resolved in the
//! process lifetime, which bounds its size.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Last resolution applied to a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRecord {
    pub state_value: String,
    pub state_name: String,
    /// Assignee chosen at resolution time. Kept in memory only; replay
    /// never changes the assignee, so the store does not carry it.
    pub assignee: Option<String>,
}

pub struct DecisionMemory {
    path: PathBuf,
    map: HashMap<String, MemoryRecord>,
}

impl DecisionMemory {
    /// Read the store line by line, skipping lines with fewer than 3 fields.
    pub fn load(path: PathBuf) -> Self {
        let mut map = HashMap::new();
        if let Ok(contents) = std::fs::read_to_string(&path) {
            for line in contents.lines() {
                let parts: Vec<&str> = line.split('|').collect();
                if parts.len() < 3 {
                    continue;
                }
                map.insert(
                    parts[0].trim().to_string(),
                    MemoryRecord {
                        state_name: parts[1].trim().to_string(),
                        state_value: parts[2].trim().to_string(),
                        assignee: None,
                    },
                );
            }
        }
        Self { path, map }
    }

    pub fn lookup(&self, ticket_id: &str) -> Option<&MemoryRecord> {
        self.map.get(ticket_id)
    }

    /// Append to the store and update the map. The description is sanitized
    /// so it cannot break the line format.
    pub fn put(&mut self, ticket_id: &str, record: MemoryRecord, short_desc: &str) {
        let line = format!(
            "{ticket_id}|{}|{}|{}",
            record.state_name,
            record.state_value,
            sanitize(short_desc)
        );
        self.append(&line);
        self.map.insert(ticket_id.to_string(), record);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MemoryRecord)> {
        self.map.iter()
    }

    fn append(&self, line: &str) {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(file, "{line}");
        }
    }
}

fn sanitize(desc: &str) -> String {
    desc.replace('|', "-").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(value: &str, name: &str) -> MemoryRecord {
        MemoryRecord {
            state_value: value.to_string(),
            state_name: name.to_string(),
            assignee: None,
        }
    }

    #[test]
    fn put_then_fresh_load_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decisions.log");

        let mut memory = DecisionMemory::load(path.clone());
        memory.put(
            "INC001",
            MemoryRecord {
                state_value: "22".into(),
                state_name: "Pending Tasks".into(),
                assignee: Some("Alice".into()),
            },
            "printer on fire",
        );

        let reloaded = DecisionMemory::load(path);
        let rec = reloaded.lookup("INC001").unwrap();
        assert_eq!(rec.state_value, "22");
        assert_eq!(rec.state_name, "Pending Tasks");
        // The store does not carry the assignee.
        assert_eq!(rec.assignee, None);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decisions.log");
        std::fs::write(
            &path,
            "INC001|Pending Tasks|22|desc\nnot-a-record\nINC002|WIP\n",
        )
        .unwrap();

        let memory = DecisionMemory::load(path);
        assert_eq!(memory.len(), 1);
        assert!(memory.lookup("INC001").is_some());
        assert!(memory.lookup("INC002").is_none());
    }

    #[test]
    fn later_lines_overwrite_earlier_ones() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decisions.log");
        std::fs::write(
            &path,
            "INC001|Pending Tasks|22|first\nINC001|Pending Vendor|21|second\n",
        )
        .unwrap();

        let memory = DecisionMemory::load(path);
        assert_eq!(memory.lookup("INC001").unwrap().state_value, "21");
        assert_eq!(memory.lookup("INC001").unwrap().state_name, "Pending Vendor");
    }

    #[test]
    fn description_is_sanitized_in_the_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decisions.log");

        let mut memory = DecisionMemory::load(path.clone());
        memory.put("INC009", record("4", "Work in Progress"), "a|b\nc");

        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents, "INC009|Work in Progress|4|a-b c\n");
    }

    #[test]
    fn unwritable_store_keeps_map_authoritative() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let mut memory = DecisionMemory::load(blocker.join("decisions.log"));
        memory.put("INC003", record("4", "Work in Progress"), "desc");

        assert_eq!(memory.lookup("INC003").unwrap().state_value, "4");
    }

    #[test]
    fn memory_only_grows() {
        let dir = tempdir().unwrap();
        let mut memory = DecisionMemory::load(dir.path().join("decisions.log"));
        memory.put("INC001", record("4", "Work in Progress"), "a");
        memory.put("INC001", record("22", "Pending Tasks"), "a");
        memory.put("INC002", record("21", "Pending Vendor"), "b");
        assert_eq!(memory.len(), 2);
    }
}
