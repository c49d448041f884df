//! Fixed allow-lists. Declared once, immutable at runtime.

use campus_gate_core_types::{Role, RoleSet};

pub const ADMIN_ONLY: RoleSet = RoleSet::of(&[Role::Admin]);

pub const MENTOR_OR_ADMIN: RoleSet = RoleSet::of(&[Role::Mentor, Role::Admin]);

/// Student-area pages carry shared content, so every authenticated role is
/// admitted. Recruiter and partner_agency membership is pending product
/// confirmation; do not narrow without it.
pub const STUDENT_AREA: RoleSet = RoleSet::of(&[
    Role::Student,
    Role::Mentor,
    Role::Recruiter,
    Role::PartnerAgency,
    Role::Admin,
]);

pub const RECRUITER_OR_ADMIN: RoleSet = RoleSet::of(&[Role::Recruiter, Role::Admin]);

pub const ANY_AUTHENTICATED: RoleSet = RoleSet::ALL;
