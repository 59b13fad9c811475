use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

use crate::model::role::Role;

/// Identity of the caller as asserted by the upstream gateway.
///
/// Session management and token verification live outside this service; the
/// gateway forwards the resolved identity in headers (`X-Caller-Id`,
/// `X-Caller-Role`, `X-Caller-Department`). This extractor only enforces the
/// role/department contract.
pub struct Caller {
    pub actor_id: u64,
    pub role: Role,
    /// Present for department-scoped roles.
    pub department_id: Option<u64>,
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|h| h.to_str().ok())
}

impl FromRequest for Caller {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let actor_id = match header(req, "X-Caller-Id").and_then(|v| v.parse::<u64>().ok()) {
            Some(id) => id,
            None => return ready(Err(ErrorUnauthorized("Missing caller id"))),
        };

        let role = match header(req, "X-Caller-Role").and_then(Role::from_name) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Missing or invalid caller role"))),
        };

        let department_id = header(req, "X-Caller-Department").and_then(|v| v.parse::<u64>().ok());

        ready(Ok(Caller {
            actor_id,
            role,
            department_id,
        }))
    }
}

impl Caller {
    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Admin only"))
        }
    }

    pub fn require_hr_or_admin(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Admin | Role::Hr) {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("HR/Admin only"))
        }
    }

    /// Admin and HR act on any department; a department head only on their
    /// own. Plain employees cannot submit or query sheets.
    pub fn require_department(&self, department_id: u64) -> actix_web::Result<()> {
        match self.role {
            Role::Admin | Role::Hr => Ok(()),
            Role::DeptHead if self.department_id == Some(department_id) => Ok(()),
            Role::DeptHead => Err(actix_web::error::ErrorForbidden(
                "Department head of another department",
            )),
            Role::Employee => Err(actix_web::error::ErrorForbidden("Insufficient role")),
        }
    }
}
