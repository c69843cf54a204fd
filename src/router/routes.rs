use serde::{Deserialize, Serialize};

use crate::api::types::HttpMethod;
use crate::errors::{WhippyError, WhippyResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Contacts,
    Messages,
    Conversations,
    Campaigns,
    Sequences,
    Health,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Contacts,
        Resource::Messages,
        Resource::Conversations,
        Resource::Campaigns,
        Resource::Sequences,
        Resource::Health,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Contacts => "contacts",
            Resource::Messages => "messages",
            Resource::Conversations => "conversations",
            Resource::Campaigns => "campaigns",
            Resource::Sequences => "sequences",
            Resource::Health => "health",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Upsert,
    List,
    GetAll,
    Get,
    Send,
    AddContacts,
    Check,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Create,
        Action::Upsert,
        Action::List,
        Action::GetAll,
        Action::Get,
        Action::Send,
        Action::AddContacts,
        Action::Check,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Upsert => "upsert",
            Action::List => "list",
            Action::GetAll => "get_all",
            Action::Get => "get",
            Action::Send => "send",
            Action::AddContacts => "add_contacts",
            Action::Check => "check",
        }
    }
}

/// One row of the route table. `path` may contain an `{id}` placeholder.
#[derive(Debug, Clone, Copy)]
pub struct RouteRule {
    pub resource: Resource,
    pub action: Action,
    pub requires_id: bool,
    pub method: HttpMethod,
    pub path: &'static str,
}

const fn rule(
    resource: Resource,
    action: Action,
    requires_id: bool,
    method: HttpMethod,
    path: &'static str,
) -> RouteRule {
    RouteRule {
        resource,
        action,
        requires_id,
        method,
        path,
    }
}

pub static ROUTES: &[RouteRule] = &[
    rule(Resource::Contacts, Action::Create, false, HttpMethod::Post, "/contacts"),
    rule(Resource::Contacts, Action::Upsert, false, HttpMethod::Post, "/contacts"),
    rule(Resource::Contacts, Action::List, false, HttpMethod::Get, "/contacts"),
    rule(Resource::Contacts, Action::GetAll, false, HttpMethod::Get, "/contacts"),
    rule(Resource::Contacts, Action::Get, true, HttpMethod::Get, "/contacts/{id}"),
    rule(Resource::Messages, Action::Send, false, HttpMethod::Post, "/messages"),
    rule(Resource::Messages, Action::Create, false, HttpMethod::Post, "/messages"),
    rule(Resource::Messages, Action::List, false, HttpMethod::Get, "/messages"),
    rule(Resource::Messages, Action::GetAll, false, HttpMethod::Get, "/messages"),
    rule(Resource::Conversations, Action::List, false, HttpMethod::Get, "/conversations"),
    rule(Resource::Conversations, Action::GetAll, false, HttpMethod::Get, "/conversations"),
    rule(Resource::Conversations, Action::Get, true, HttpMethod::Get, "/conversations/{id}"),
    rule(Resource::Campaigns, Action::Create, false, HttpMethod::Post, "/campaigns"),
    rule(Resource::Campaigns, Action::List, false, HttpMethod::Get, "/campaigns"),
    rule(Resource::Campaigns, Action::GetAll, false, HttpMethod::Get, "/campaigns"),
    rule(Resource::Campaigns, Action::Get, true, HttpMethod::Get, "/campaigns/{id}"),
    rule(Resource::Sequences, Action::List, false, HttpMethod::Get, "/sequences"),
    rule(Resource::Sequences, Action::GetAll, false, HttpMethod::Get, "/sequences"),
    rule(Resource::Sequences, Action::Get, true, HttpMethod::Get, "/sequences/{id}"),
    rule(
        Resource::Sequences,
        Action::AddContacts,
        true,
        HttpMethod::Post,
        "/sequences/{id}/contacts",
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    pub method: HttpMethod,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    HealthCheck,
    Api(RouteDecision),
}

/// Maps `(resource, action, resource_id present)` to a route. Exact, case-sensitive matching.
/// An empty `resource_id` counts as missing.
pub fn resolve(resource: &str, action: &str, resource_id: Option<&str>) -> WhippyResult<Route> {
    let Some(res) = Resource::parse(resource) else {
        return Err(WhippyError::UnknownResource(resource.to_string()));
    };
    let invalid = || WhippyError::InvalidAction {
        resource: resource.to_string(),
        action: action.to_string(),
    };
    let act = Action::parse(action).ok_or_else(invalid)?;

    if res == Resource::Health {
        return match act {
            Action::Check => Ok(Route::HealthCheck),
            _ => Err(invalid()),
        };
    }

    let id = resource_id.filter(|id| !id.is_empty());
    let rule = ROUTES
        .iter()
        .find(|r| r.resource == res && r.action == act && (!r.requires_id || id.is_some()))
        .ok_or_else(invalid)?;

    let path = match id {
        Some(id) if rule.requires_id => rule.path.replace("{id}", id),
        _ => rule.path.to_string(),
    };
    Ok(Route::Api(RouteDecision {
        method: rule.method,
        path,
    }))
}
