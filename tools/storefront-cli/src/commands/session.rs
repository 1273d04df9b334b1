//! Login, logout and whoami.

use anyhow::Result;
use storefront_commerce::{Session, UserId};
use storefront_kv::SessionId;

use super::LoginArgs;
use crate::context::Context;

/// Sign in, replacing any session already active on this device.
pub async fn login(args: LoginArgs, ctx: &Context) -> Result<()> {
    let cache = ctx.cache()?;
    let sessions = ctx.sessions(&cache);

    if let Some((id, previous)) = sessions.current()? {
        sessions.delete(&id)?;
        previous.logout();
    }

    let name = args.name.unwrap_or_else(|| args.user_id.clone());
    let session = Session::login(UserId::new(args.user_id), name);
    let id = SessionId::generate();
    sessions.create(&id, &session)?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "session_id": id.as_str(),
            "user_id": session.user_id,
            "username": session.username,
        }));
    } else {
        ctx.output
            .success(&format!("Logged in as {} ({})", session.username, session.user_id));
    }
    Ok(())
}

/// Sign out. The cart stays persisted for the next login.
pub async fn logout(ctx: &Context) -> Result<()> {
    let cache = ctx.cache()?;
    let sessions = ctx.sessions(&cache);

    match sessions.current()? {
        Some((id, session)) => {
            sessions.delete(&id)?;
            let username = session.username.clone();
            session.logout();
            ctx.output.success(&format!("Logged out {}", username));
        }
        None => ctx.output.info("Not logged in"),
    }
    Ok(())
}

/// Show the active session.
pub async fn whoami(ctx: &Context) -> Result<()> {
    let cache = ctx.cache()?;
    let session = ctx.require_session(&cache)?;

    if ctx.output.is_json() {
        ctx.output.json(&session);
        return Ok(());
    }

    ctx.output.kv("user", session.user_id.as_str());
    ctx.output.kv("name", &session.username);
    ctx.output.kv("since", &session.logged_in_at.to_rfc3339());
    Ok(())
}
