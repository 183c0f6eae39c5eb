use mbg::context::{Identity, RequestContext};
use mbg::middleware::role::{RoleDenied, check_roles};
use mbg::policy::{RouteGroup, RouteGroupPolicy};
use mbg_auth::{Role, RoleSet};

fn context_for(role: Role) -> RequestContext {
    let identity = Identity {
        user_id: format!("{}-1", role.as_str()),
        role,
        email: format!("{}@mbg.test", role.as_str()),
    };
    RequestContext::authenticated("unit-trace", identity)
}

#[test]
fn test_each_group_admits_exactly_its_roles() {
    let policy = RouteGroupPolicy::default();
    let expected = [
        (RouteGroup::SuperAdmin, vec![Role::SuperAdmin]),
        (RouteGroup::Admin, vec![Role::Admin, Role::SuperAdmin]),
        (RouteGroup::Supplier, vec![Role::Supplier, Role::SuperAdmin]),
        (RouteGroup::Parent, vec![Role::Parent, Role::SuperAdmin]),
    ];

    for (group, admitted) in expected {
        for role in Role::ALL {
            let result = check_roles(Some(&context_for(role)), policy.roles(group));
            assert_eq!(result.is_ok(), admitted.contains(&role), "{group} / {role}");
        }
    }
}

#[test]
fn test_denial_lists_required_roles() {
    let allowed = RoleSet::from([Role::Admin, Role::SuperAdmin]);
    let err = check_roles(Some(&context_for(Role::Parent)), &allowed).unwrap_err();
    assert_eq!(err, RoleDenied::Insufficient(allowed));
    assert_eq!(err.to_string(), "Access denied. Required roles: [admin super_admin]");
}

#[test]
fn test_unauthenticated_context_has_no_role() {
    let ctx = RequestContext::new("unit-trace");
    let err = check_roles(Some(&ctx), &RoleSet::from(Role::ALL)).unwrap_err();
    assert_eq!(err.to_string(), "User role not found in token");
}

#[test]
fn test_empty_role_set_admits_nobody() {
    for role in Role::ALL {
        assert!(check_roles(Some(&context_for(role)), &RoleSet::default()).is_err());
    }
}
