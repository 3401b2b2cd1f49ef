//! Per-request "has this client already voted" decisions.
//!
//! Exactly one [`VoteTracker`] is active per process, picked from
//! [`VoteStrategy`] at startup. The tracker never touches storage itself: it
//! inspects the request, answers membership questions against a loaded
//! [`CounterState`], and hands the handler a [`Ballot`] describing what to
//! record and which cookie to send back.

use crate::models::CounterState;
use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use std::{fmt, net::SocketAddr, str::FromStr, sync::Arc};
use uuid::Uuid;

pub const VOTER_COOKIE: &str = "be_there_voter";
pub const CLICKED_HEADER: &str = "x-be-there-clicked";
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

const COOKIE_MAX_AGE_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VoteStrategy {
    /// Trust the page's own local flag.
    Client,
    /// Long-lived unsigned cookie holding a random voter id.
    #[default]
    Cookie,
    /// Forwarded or peer network address.
    Address,
}

impl FromStr for VoteStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "cookie" => Ok(Self::Cookie),
            "address" | "ip" => Ok(Self::Address),
            other => Err(format!(
                "unknown vote strategy '{other}', expected 'client', 'cookie' or 'address'"
            )),
        }
    }
}

impl fmt::Display for VoteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Client => "client",
            Self::Cookie => "cookie",
            Self::Address => "address",
        };
        f.write_str(name)
    }
}

/// What the tracker sees of an incoming request.
#[derive(Debug, Clone, Copy)]
pub struct ClientRequest<'a> {
    pub headers: &'a HeaderMap,
    pub peer: Option<SocketAddr>,
}

impl<'a> ClientRequest<'a> {
    pub fn new(headers: &'a HeaderMap, peer: Option<SocketAddr>) -> Self {
        Self { headers, peer }
    }

    pub fn cookie(&self, name: &str) -> Option<&'a str> {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// First hop of `x-forwarded-for`, else the transport peer.
    pub fn address(&self) -> Option<String> {
        let forwarded = self
            .headers
            .get(FORWARDED_FOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match forwarded {
            Some(addr) => Some(addr.to_string()),
            None => self.peer.map(|peer| peer.ip().to_string()),
        }
    }
}

/// The identity to record for an accepted vote and the cookie to return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ballot {
    pub voter_key: Option<String>,
    pub set_cookie: Option<String>,
}

pub trait VoteTracker: Send + Sync {
    fn strategy(&self) -> VoteStrategy;

    fn has_voted(&self, client: &ClientRequest<'_>, state: &CounterState) -> bool;

    fn ballot(&self, client: &ClientRequest<'_>) -> Ballot;
}

pub fn tracker_for(strategy: VoteStrategy) -> Arc<dyn VoteTracker> {
    match strategy {
        VoteStrategy::Client => Arc::new(ClientFlagTracker),
        VoteStrategy::Cookie => Arc::new(CookieTracker),
        VoteStrategy::Address => Arc::new(AddressTracker),
    }
}

pub struct ClientFlagTracker;

impl VoteTracker for ClientFlagTracker {
    fn strategy(&self) -> VoteStrategy {
        VoteStrategy::Client
    }

    fn has_voted(&self, client: &ClientRequest<'_>, _state: &CounterState) -> bool {
        client
            .headers
            .get(CLICKED_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }

    fn ballot(&self, _client: &ClientRequest<'_>) -> Ballot {
        Ballot::default()
    }
}

pub struct CookieTracker;

impl VoteTracker for CookieTracker {
    fn strategy(&self) -> VoteStrategy {
        VoteStrategy::Cookie
    }

    // A cookie whose id is gone from the voter set (after a reset) no longer counts.
    fn has_voted(&self, client: &ClientRequest<'_>, state: &CounterState) -> bool {
        client
            .cookie(VOTER_COOKIE)
            .is_some_and(|id| state.voters.contains(id))
    }

    fn ballot(&self, _client: &ClientRequest<'_>) -> Ballot {
        let id = Uuid::new_v4().to_string();
        Ballot {
            set_cookie: Some(voter_cookie(&id)),
            voter_key: Some(id),
        }
    }
}

pub struct AddressTracker;

impl VoteTracker for AddressTracker {
    fn strategy(&self) -> VoteStrategy {
        VoteStrategy::Address
    }

    fn has_voted(&self, client: &ClientRequest<'_>, state: &CounterState) -> bool {
        client
            .address()
            .is_some_and(|addr| state.voters.contains(&addr))
    }

    fn ballot(&self, client: &ClientRequest<'_>) -> Ballot {
        Ballot {
            voter_key: client.address(),
            set_cookie: None,
        }
    }
}

fn voter_cookie(id: &str) -> String {
    let expires = Utc::now() + Duration::days(COOKIE_MAX_AGE_DAYS);
    format!(
        "{VOTER_COOKIE}={id}; Path=/; Max-Age={}; Expires={}; HttpOnly; SameSite=Lax",
        COOKIE_MAX_AGE_DAYS * 24 * 60 * 60,
        expires.format("%a, %d %b %Y %H:%M:%S GMT"),
    )
}
