//! Resolve an entity to its repositories and drop the ones the session ignores.

use tracing::{debug, info};

use crate::context::{ReleaseSession, TrainContext};
use crate::error::TrainError;
use crate::github::{Account, AccountKind, Repository};

/// Repositories requested per listing page.
pub const PAGE_SIZE: u8 = 100;

/// Look `entity` up as an organization, then as a user.
pub async fn resolve_entity(ctx: &TrainContext<'_>, entity: &str) -> Result<Account, TrainError> {
    ctx.throttle().await?;
    match ctx.api.get_org(entity).await {
        Ok(account) => return Ok(account),
        Err(e) if e.is_not_found() => debug!(entity, "no organization, trying user"),
        Err(e) => return Err(TrainError::github("get organization", e)),
    }

    ctx.throttle().await?;
    match ctx.api.get_user(entity).await {
        Ok(account) => Ok(account),
        Err(e) if e.is_not_found() => Err(TrainError::EntityNotFound(entity.to_string())),
        Err(e) => Err(TrainError::github("get user", e)),
    }
}

/// Every non-excluded repository of `entity`, in API order.
pub async fn locate_repositories(
    ctx: &TrainContext<'_>,
    session: &ReleaseSession,
    entity: &str,
) -> Result<Vec<Repository>, TrainError> {
    let account = resolve_entity(ctx, entity).await?;
    let total = account.total_repos();
    if total < 1 {
        return Err(TrainError::NoReposFound(entity.to_string()));
    }

    debug!(entity, kind = ?account.kind, total, "listing repositories");

    let mut repositories = Vec::new();
    let mut seen: u64 = 0;
    let mut page: u32 = 1;

    loop {
        ctx.throttle().await?;
        let listing = match account.kind {
            AccountKind::Organization => ctx.api.list_org_repos(&account.login, page, PAGE_SIZE).await,
            AccountKind::User => ctx.api.list_user_repos(&account.login, page, PAGE_SIZE).await,
        }
        .map_err(|e| TrainError::github("list repositories", e))?;

        for repo in listing.repositories {
            seen += 1;
            ctx.progress.on_progress(seen, total, &repo.full_name());

            if is_excluded(&repo, session) {
                debug!(repository = %repo.full_name(), "excluded");
                continue;
            }
            repositories.push(repo);
        }

        if !listing.has_next {
            break;
        }
        page += 1;
    }

    info!(entity, listed = seen, kept = repositories.len(), "located repositories");
    Ok(repositories)
}

/// The authenticated login followed by the organizations it belongs to.
pub async fn list_logins(ctx: &TrainContext<'_>) -> Result<Vec<String>, TrainError> {
    ctx.throttle().await?;
    let login = ctx
        .api
        .authenticated_login()
        .await
        .map_err(|e| TrainError::github("get authenticated user", e))?;

    ctx.throttle().await?;
    let orgs = ctx
        .api
        .list_own_orgs()
        .await
        .map_err(|e| TrainError::github("list organizations", e))?;

    let mut logins = Vec::with_capacity(orgs.len() + 1);
    logins.push(login);
    logins.extend(orgs);
    Ok(logins)
}

/// Archived, ignored by name or `owner/name`, or tagged with an ignored topic.
pub fn is_excluded(repo: &Repository, session: &ReleaseSession) -> bool {
    if repo.archived {
        return true;
    }

    let name = repo.name.to_lowercase();
    let full_name = repo.full_name().to_lowercase();
    if session.ignore_repos.contains(&name) || session.ignore_repos.contains(&full_name) {
        return true;
    }

    repo.topics
        .iter()
        .any(|topic| session.ignore_topics.contains(&topic.to_lowercase()))
}
