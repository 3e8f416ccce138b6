//! Session read, write and teardown against a [`SessionJar`].
//!
//! Operations that end the current request return an [`Outcome`] instead of
//! failing, and the inbound adapter turns [`Outcome::Redirect`] into a 302.

use std::convert::Infallible;

use tracing::{debug, warn};

use crate::domain::Error;
use crate::domain::error::SessionInvalid;
use crate::domain::ports::SessionJar;
use crate::domain::session::{Outcome, Redirect, Session};
use crate::domain::session_codec::SessionCodec;

/// Decode and validate a stored session without touching the network.
///
/// # Errors
/// [`SessionInvalid`] when the stored value cannot be trusted.
pub fn validate_session(codec: &SessionCodec, raw: &str) -> Result<Session, SessionInvalid> {
    codec.decode(raw)
}

/// Load the session from `jar`, or ask for a redirect to the login route.
///
/// A stored value that fails validation is removed from the jar.
pub fn require_session<J>(jar: &mut J, codec: &SessionCodec) -> Outcome<Session>
where
    J: SessionJar + ?Sized,
{
    let Some(raw) = jar.get() else {
        debug!("no session stored");
        return Outcome::Redirect(Redirect::login());
    };
    match validate_session(codec, &raw) {
        Ok(session) => Outcome::Continue(session),
        Err(err) => {
            warn!(reason = %err.reason(), "discarding invalid session");
            jar.delete();
            Outcome::Redirect(Redirect::login())
        }
    }
}

/// Encode `session` and place it in `jar`.
///
/// # Errors
/// Propagates [`SessionCodec::encode`] failures; the jar is untouched then.
pub fn store_session<J>(jar: &mut J, codec: &SessionCodec, session: &Session) -> Result<(), Error>
where
    J: SessionJar + ?Sized,
{
    let encoded = codec.encode(session)?;
    jar.set(encoded);
    Ok(())
}

/// Destroy the stored session and send the client to the login route.
pub fn logout<J>(jar: &mut J) -> Outcome<Infallible>
where
    J: SessionJar + ?Sized,
{
    jar.delete();
    Outcome::Redirect(Redirect::login())
}
