/// Router Module Index
///
/// Routing is split by who may reach a route. Each protected module is mounted
/// behind its own `protected_route` guard carrying the role set declared here,
/// and the sidebar navigation is filtered by the same sets.
use crate::models::Role;

/// Routes accessible to anyone: health, login, logout and the unauthorized view.
pub mod public;

/// Routes for any authenticated user.
pub mod authenticated;

/// Routes for admin and HR.
pub mod management;

/// Routes for admins only.
pub mod admin;

/// No restriction beyond being authenticated.
pub const ANY_ROLE: &[Role] = &[];
pub const MANAGEMENT: &[Role] = &[Role::Admin, Role::Hr];
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
