#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin,
    Hr,
    DeptHead,
    Employee,
}

impl Role {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "admin" => Some(Role::Admin),
            "hr" => Some(Role::Hr),
            "dept-head" => Some(Role::DeptHead),
            "employee" => Some(Role::Employee),
            _ => None,
        }
    }
}
