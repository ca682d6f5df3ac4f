//! Fragment identifiers and the department ↔ fragment map.
//!
//! Table names, constraint names and database names cannot be bound as
//! query parameters, so they are built only from the parsed types in this
//! module. Each type restricts its input to a small character set that
//! never needs quoting or escaping.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::CoreError;

/// Longest fragment suffix. Keeps `fk_participation_<fragment>_...`
/// well inside PostgreSQL's 63-byte identifier limit.
pub const MAX_FRAGMENT_LEN: usize = 16;

/// Longest department code.
pub const MAX_DEPARTMENT_LEN: usize = 50;

/// PostgreSQL truncates identifiers beyond 63 bytes.
pub const MAX_DATABASE_NAME_LEN: usize = 63;

/// Short name of a fragment, used as the table-name suffix (`p1`, `p2`).
///
/// Must match `^[a-z][a-z0-9_]*$` and be at most [`MAX_FRAGMENT_LEN`] bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FragmentId(String);

impl FragmentId {
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let invalid = |reason| CoreError::InvalidIdentifier {
            kind: "fragment",
            value: value.to_string(),
            reason,
        };

        let mut chars = value.chars();
        match chars.next() {
            None => return Err(invalid("must not be empty")),
            Some(c) if !c.is_ascii_lowercase() => {
                return Err(invalid("must start with a lowercase ASCII letter"))
            }
            Some(_) => {}
        }
        if value.len() > MAX_FRAGMENT_LEN {
            return Err(invalid("too long"));
        }
        if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
            return Err(invalid("only lowercase letters, digits and '_' are allowed"));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Physical table name of `kind` in this fragment, e.g. `nhomnc_p1`.
    pub fn table(&self, kind: TableKind) -> String {
        format!("{}_{}", kind.base_name(), self.0)
    }

    /// Uppercased form used for environment variable prefixes (`P1`).
    pub fn env_key(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Department code a fragment's groups are constrained to (`P1`, `P2`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Department(String);

impl Department {
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let invalid = |reason| CoreError::InvalidIdentifier {
            kind: "department",
            value: value.to_string(),
            reason,
        };

        if value.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if value.len() > MAX_DEPARTMENT_LEN {
            return Err(invalid("too long"));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(invalid("only ASCII letters, digits and '_' are allowed"));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Single-quoted SQL string literal for DDL check constraints.
    ///
    /// The parse rules exclude quotes and backslashes, so no escaping applies.
    pub fn sql_literal(&self) -> String {
        format!("'{}'", self.0)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of the database holding one fragment (`ResearchDB_P1`).
///
/// Case is preserved, so the name is always double-quoted in DDL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DatabaseName(String);

impl DatabaseName {
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let invalid = |reason| CoreError::InvalidIdentifier {
            kind: "database",
            value: value.to_string(),
            reason,
        };

        let mut chars = value.chars();
        match chars.next() {
            None => return Err(invalid("must not be empty")),
            Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
                return Err(invalid("must start with an ASCII letter or '_'"))
            }
            Some(_) => {}
        }
        if value.len() > MAX_DATABASE_NAME_LEN {
            return Err(invalid("too long"));
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid("only ASCII letters, digits and '_' are allowed"));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted identifier for `CREATE DATABASE`.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The four per-fragment tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Group,
    Employee,
    Project,
    Participation,
}

impl TableKind {
    /// Creation and insertion order. Later tables reference earlier ones.
    pub const ALL: [TableKind; 4] = [
        TableKind::Group,
        TableKind::Employee,
        TableKind::Project,
        TableKind::Participation,
    ];

    pub fn base_name(self) -> &'static str {
        match self {
            TableKind::Group => "nhomnc",
            TableKind::Employee => "nhanvien",
            TableKind::Project => "dean",
            TableKind::Participation => "thamgia",
        }
    }
}

/// Bidirectional department ↔ fragment mapping.
///
/// Each department lives in exactly one fragment and each fragment holds
/// exactly one department.
#[derive(Debug, Clone, Default)]
pub struct FragmentMap {
    by_department: BTreeMap<Department, FragmentId>,
    by_fragment: BTreeMap<FragmentId, Department>,
}

impl FragmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fragment. Fails if either side is already mapped.
    pub fn insert(&mut self, fragment: FragmentId, department: Department) -> Result<(), CoreError> {
        if let Some(existing) = self.by_fragment.get(&fragment) {
            return Err(CoreError::Conflict(format!(
                "fragment {fragment} is already mapped to department {existing}"
            )));
        }
        if let Some(existing) = self.by_department.get(&department) {
            return Err(CoreError::Conflict(format!(
                "department {department} is already held by fragment {existing}"
            )));
        }
        self.by_department.insert(department.clone(), fragment.clone());
        self.by_fragment.insert(fragment, department);
        Ok(())
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (FragmentId, Department)>,
    {
        let mut map = Self::new();
        for (fragment, department) in pairs {
            map.insert(fragment, department)?;
        }
        Ok(map)
    }

    pub fn fragment_for_department(&self, department: &Department) -> Option<&FragmentId> {
        self.by_department.get(department)
    }

    pub fn department_for_fragment(&self, fragment: &FragmentId) -> Option<&Department> {
        self.by_fragment.get(fragment)
    }

    pub fn is_valid_fragment(&self, fragment: &FragmentId) -> bool {
        self.by_fragment.contains_key(fragment)
    }

    pub fn is_valid_department(&self, department: &Department) -> bool {
        self.by_department.contains_key(department)
    }

    /// All fragments in name order.
    pub fn fragments(&self) -> impl Iterator<Item = &FragmentId> {
        self.by_fragment.keys()
    }

    pub fn len(&self) -> usize {
        self.by_fragment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_fragment.is_empty()
    }
}
