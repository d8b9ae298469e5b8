// ── Selector resolution ──
//
// Turns a spoken or typed token into the set of strips it addresses.
// Names win over groups: a token that matches both a strip's name and
// some group label resolves to the single named strip.

use std::sync::Arc;

use crate::error::CoreError;
use crate::model::{Strip, StripId};

/// The outcome of resolving a selector token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The token named a single strip.
    Strip(StripId),
    /// The token matched a group label; every member is listed.
    Group(Vec<StripId>),
}

impl Resolution {
    /// All strip ids addressed by this resolution.
    pub fn ids(&self) -> Vec<StripId> {
        match self {
            Resolution::Strip(id) => vec![id.clone()],
            Resolution::Group(ids) => ids.clone(),
        }
    }
}

/// Resolve `token` against a snapshot of strips.
///
/// Matching is case-insensitive. Name matches take priority; when two
/// strips share a name, the first in snapshot (id) order wins. If no
/// name matches, every strip whose group label matches is returned.
pub fn resolve(token: &str, strips: &[Arc<Strip>]) -> Result<Resolution, CoreError> {
    let wanted = token.to_lowercase();

    for strip in strips {
        if let Some(name) = strip.name() {
            if name.to_lowercase() == wanted {
                return Ok(Resolution::Strip(strip.id.clone()));
            }
        }
    }

    let members: Vec<StripId> = strips
        .iter()
        .filter(|s| {
            s.group()
                .is_some_and(|g| g.to_lowercase() == wanted)
        })
        .map(|s| s.id.clone())
        .collect();

    if members.is_empty() {
        Err(CoreError::NoSuchSelector {
            token: token.to_owned(),
        })
    } else {
        Ok(Resolution::Group(members))
    }
}
