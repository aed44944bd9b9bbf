//! Route-pattern authorization.
//!
//! An [`AuthorizationPolicy`] is a set of public patterns plus an ordered list of
//! `{pattern, roles}` rules. Evaluation order:
//!
//! 1. a public pattern matches: allow, no identity needed;
//! 2. no security context: `Unauthenticated`;
//! 3. the first matching rule decides: allow if the role is listed, otherwise `Forbidden`;
//! 4. nothing matches: allow any authenticated identity.
//!
//! Patterns use `**` for "zero or more path segments" and `*` for "anything
//! within one segment". A trailing slash on the request path is ignored.

use regex::Regex;

use crate::auth::context::SecurityContext;
use crate::error::AppError;
use crate::models::Role;

/// A compiled route pattern such as `/api/tasks/**`.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    regex: Regex,
}

impl RoutePattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let mut expr = String::from("^");
        for segment in pattern.split('/').filter(|s| !s.is_empty()) {
            if segment == "**" {
                expr.push_str("(?:/.*)?");
                continue;
            }
            expr.push('/');
            let literals: Vec<String> = segment.split('*').map(regex::escape).collect();
            expr.push_str(&literals.join("[^/]*"));
        }
        expr.push_str("/?$");

        Ok(Self {
            source: pattern.to_string(),
            regex: Regex::new(&expr)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

#[derive(Debug, Clone)]
pub struct AuthorizationRule {
    pub pattern: RoutePattern,
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Default)]
pub struct AuthorizationPolicy {
    public: Vec<RoutePattern>,
    rules: Vec<AuthorizationRule>,
}

impl AuthorizationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// The application's route table.
    pub fn standard() -> Result<Self, regex::Error> {
        Self::new()
            .permit_all(&[
                "/api/auth/**",
                "/",
                "/login",
                "/register",
                "/aboutus",
                "/features",
                "/contact",
                "/img/**",
                "/vid/**",
                "/css/**",
                "/js/**",
                "/favicon.ico",
                "/health",
            ])?
            .require(&["/admin/**"], &[Role::Admin])?
            .require(
                &[
                    "/api/users/**",
                    "/api/tasks/**",
                    "/api/categories/**",
                    "/api/taskcategories/**",
                    "/user/**",
                ],
                &[Role::User, Role::Admin],
            )
    }

    /// Adds patterns that need no authentication at all.
    pub fn permit_all(mut self, patterns: &[&str]) -> Result<Self, regex::Error> {
        for pattern in patterns {
            self.public.push(RoutePattern::new(pattern)?);
        }
        Ok(self)
    }

    /// Appends one rule per pattern. Rules are evaluated in insertion order.
    pub fn require(mut self, patterns: &[&str], roles: &[Role]) -> Result<Self, regex::Error> {
        for pattern in patterns {
            self.rules.push(AuthorizationRule {
                pattern: RoutePattern::new(pattern)?,
                roles: roles.to_vec(),
            });
        }
        Ok(self)
    }

    pub fn is_public(&self, path: &str) -> bool {
        let path = normalize(path);
        if has_dot_segment(&path) {
            return false;
        }
        self.public.iter().any(|pattern| pattern.matches(&path))
    }

    /// First rule whose pattern matches `path`.
    pub fn rule_for(&self, path: &str) -> Option<&AuthorizationRule> {
        let path = normalize(path);
        self.rules.iter().find(|rule| rule.pattern.matches(&path))
    }

    /// Decides whether a request to `path` with the given context may proceed.
    pub fn check(&self, path: &str, context: Option<&SecurityContext>) -> Result<(), AppError> {
        if self.is_public(path) {
            return Ok(());
        }
        let context = context.ok_or(AppError::Unauthenticated)?;
        match self.rule_for(path) {
            Some(rule) if !context.has_any_role(&rule.roles) => {
                log::info!(
                    "User {} with role {} denied access to {} (requires {:?})",
                    context.subject,
                    context.role,
                    path,
                    rule.roles
                );
                Err(AppError::Forbidden)
            }
            _ => Ok(()),
        }
    }
}

/// Collapses runs of `/` so `//admin` cannot slip past `/admin/**`.
fn normalize(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len() + 1);
    if !path.starts_with('/') {
        normalized.push('/');
    }
    for ch in path.chars() {
        if ch == '/' && normalized.ends_with('/') {
            continue;
        }
        normalized.push(ch);
    }
    normalized
}

fn has_dot_segment(path: &str) -> bool {
    path.split('/').any(|segment| segment == "." || segment == "..")
}
