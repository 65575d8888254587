//! SQLite schema definition.

/// Complete database schema for pillsync.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Registered Medicines
-- ============================================================================

CREATE TABLE IF NOT EXISTS medicines (
    medicine_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    name TEXT NOT NULL CHECK (length(name) > 0),
    dosage TEXT,
    photo_ref TEXT,
    photo_sha256 TEXT,
    ocr_text TEXT NOT NULL DEFAULT '',           -- Registration-time OCR, possibly empty
    registered_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_medicines_user ON medicines(user_id);

-- ============================================================================
-- Verifications (Append-Only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS verifications (
    verification_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    photo_ref TEXT,
    photo_sha256 TEXT,
    patient_ocr_text TEXT NOT NULL DEFAULT '',
    results TEXT NOT NULL DEFAULT '[]',          -- JSON array of CandidateMatch
    best TEXT NOT NULL,                          -- JSON CandidateMatch
    verified INTEGER NOT NULL,
    verified_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_verifications_user ON verifications(user_id);

-- ============================================================================
-- Care Contacts
-- ============================================================================

CREATE TABLE IF NOT EXISTS care_contacts (
    contact_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('doctor', 'family')),
    name TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_contacts_user ON care_contacts(user_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_is_reentrant() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_empty_medicine_name_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            "INSERT INTO medicines (medicine_id, user_id, name, registered_at) VALUES (?, ?, ?, ?)",
            ["m1", "u1", "", "2024-01-01T00:00:00Z"],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_contact_role_checked() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            "INSERT INTO care_contacts (user_id, role, name) VALUES (?, ?, ?)",
            ["u1", "nurse", "Sam"],
        );
        assert!(result.is_err());
    }
}
