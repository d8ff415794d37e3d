//! In-memory platform records: tools, courses, users, placements.
//!
//! The catalog stands in for the record-keeping side of a real
//! platform. It hands the launch builder its domain records and
//! answers the outcomes handler's "does this placement exist"
//! question; everything lives behind a `RwLock` so request handlers
//! can share one instance. Persistence technology is out of scope.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::launch::{Role, SourcedKey, ToolCredential};
use crate::domains::outcomes::PlacementResolver;

/// A registered external tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub id: u64,
    pub name: String,
    pub credential: ToolCredential,
    /// Extra launch parameters configured for this tool.
    #[serde(default)]
    pub custom_params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    pub code: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// A tool placed into a course, with its stable resource link id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    pub id: u64,
    pub course_id: u64,
    pub tool_id: u64,
    pub resource_link_id: String,
    pub resource_link_title: String,
}

#[derive(Default)]
struct Records {
    tools: Vec<Tool>,
    courses: Vec<Course>,
    users: Vec<User>,
    placements: Vec<Placement>,
    next_id: u64,
}

impl Records {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// The platform's record store.
pub struct Catalog {
    records: RwLock<Records>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Records::default()),
        }
    }

    /// Create a catalog seeded with demo data: two teachers, four
    /// students, three courses, everyone enrolled everywhere.
    pub fn demo() -> Self {
        let catalog = Self::new();
        let teachers = [
            ("Dr. Alice Smith", "alice.smith@example.edu"),
            ("Prof. Bob Johnson", "bob.johnson@example.edu"),
        ];
        let students = [
            ("Charlie Brown", "charlie.brown@example.edu"),
            ("Diana Prince", "diana.prince@example.edu"),
            ("Edward Norton", "edward.norton@example.edu"),
            ("Fiona Green", "fiona.green@example.edu"),
        ];
        for (name, email) in teachers {
            catalog.add_user(name, email, Role::Teacher);
        }
        for (name, email) in students {
            catalog.add_user(name, email, Role::Student);
        }

        catalog.add_course("CS101", "Introduction to Python");
        catalog.add_course("WEB201", "Web Development");
        catalog.add_course("DS301", "Data Science Fundamentals");
        catalog
    }

    pub fn add_user(&self, name: &str, email: &str, role: Role) -> u64 {
        let mut records = self.write();
        let id = records.next_id();
        records.users.push(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role,
        });
        id
    }

    pub fn add_course(&self, code: &str, title: &str) -> u64 {
        let mut records = self.write();
        let id = records.next_id();
        records.courses.push(Course {
            id,
            code: code.to_string(),
            title: title.to_string(),
        });
        id
    }

    pub fn add_tool(
        &self,
        name: &str,
        credential: ToolCredential,
        custom_params: BTreeMap<String, String>,
    ) -> u64 {
        let mut records = self.write();
        let id = records.next_id();
        records.tools.push(Tool {
            id,
            name: name.to_string(),
            credential,
            custom_params,
        });
        id
    }

    /// Place a tool into a course, minting a fresh resource link id.
    pub fn place_tool(&self, course_id: u64, tool_id: u64) -> Option<Placement> {
        let mut records = self.write();
        let title = records
            .tools
            .iter()
            .find(|t| t.id == tool_id)?
            .name
            .clone();
        records.courses.iter().find(|c| c.id == course_id)?;
        let id = records.next_id();
        let placement = Placement {
            id,
            course_id,
            tool_id,
            resource_link_id: Uuid::new_v4().to_string(),
            resource_link_title: title,
        };
        records.placements.push(placement.clone());
        Some(placement)
    }

    pub fn tool(&self, id: u64) -> Option<Tool> {
        self.read().tools.iter().find(|t| t.id == id).cloned()
    }

    pub fn course(&self, id: u64) -> Option<Course> {
        self.read().courses.iter().find(|c| c.id == id).cloned()
    }

    pub fn user(&self, id: u64) -> Option<User> {
        self.read().users.iter().find(|u| u.id == id).cloned()
    }

    pub fn placement(&self, id: u64) -> Option<Placement> {
        self.read().placements.iter().find(|p| p.id == id).cloned()
    }

    pub fn courses(&self) -> Vec<Course> {
        self.read().courses.clone()
    }

    pub fn users(&self) -> Vec<User> {
        self.read().users.clone()
    }

    pub fn placements(&self) -> Vec<Placement> {
        self.read().placements.clone()
    }

    /// Look up a placement by its course and resource link ids, the
    /// correlation the outcomes handler needs.
    pub fn find_placement(&self, course_id: &str, resource_link_id: &str) -> Option<Placement> {
        self.read()
            .placements
            .iter()
            .find(|p| p.course_id.to_string() == course_id && p.resource_link_id == resource_link_id)
            .cloned()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Records> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Records> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacementResolver for Catalog {
    fn resolve(&self, key: &SourcedKey) -> bool {
        self.find_placement(&key.course_id, &key.resource_link_id)
            .is_some()
    }
}
