//! Care contact database operations.

use rusqlite::params;

use super::{Database, DbError, DbResult};
use crate::models::{CareTeam, Contact, ContactRole};

impl Database {
    /// Add a contact to a user's care team. Returns the contact ID.
    pub fn add_contact(&self, user_id: &str, role: ContactRole, contact: &Contact) -> DbResult<i64> {
        if !contact.is_reachable() {
            return Err(DbError::Constraint(format!(
                "Contact {} has neither email nor phone",
                contact.name
            )));
        }

        self.conn.execute(
            "INSERT INTO care_contacts (user_id, role, name, email, phone) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                role.as_str(),
                contact.name,
                contact.email(),
                contact.phone(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Load a user's care team. The earliest doctor added is the team doctor.
    pub fn care_team(&self, user_id: &str) -> DbResult<CareTeam> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT role, name, email, phone
            FROM care_contacts
            WHERE user_id = ?
            ORDER BY contact_id
            "#,
        )?;
        let rows = stmt.query_map([user_id], |row| {
            let role: String = row.get(0)?;
            let contact = Contact {
                name: row.get(1)?,
                email: row.get(2)?,
                phone: row.get(3)?,
            };
            Ok((role, contact))
        })?;

        let mut team = CareTeam::default();
        for row in rows {
            let (role, contact) = row?;
            match ContactRole::parse(&role) {
                Some(ContactRole::Doctor) if team.doctor.is_none() => team.doctor = Some(contact),
                Some(ContactRole::Doctor) => {}
                Some(ContactRole::Family) => team.family.push(contact),
                None => return Err(DbError::Constraint(format!("Unknown contact role: {}", role))),
            }
        }
        Ok(team)
    }
}
